//! TOML configuration file loading
//!
//! Values from the file only fill options the command line left unset.

use crate::core::validation::ValidationError;
use std::path::{Path, PathBuf};

use super::args::Args;

/// Keys accepted in the configuration file
pub const CONFIG_KEYS: [&str; 13] = [
    "resolution",
    "color",
    "deskew",
    "trim",
    "jobs",
    "work-dir",
    "fuzz",
    "deskew-threshold",
    "vendor-id",
    "sane-model",
    "log-level",
    "log-format",
    "log-file",
];

/// Default configuration file location, `<config dir>/Scanpipe/scanpipe.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Scanpipe").join("scanpipe.toml"))
}

impl Args {
    /// Load the configuration file and merge it into these arguments.
    ///
    /// An explicit path must exist; the default path is used only when
    /// present. Returns the path that was loaded.
    pub async fn load_config_file(&mut self) -> Result<Option<PathBuf>, ValidationError> {
        let path = match self.config_file.clone() {
            Some(path) => {
                if !path.exists() {
                    return Err(ValidationError::new(&format!(
                        "The specified configuration file does not exist: {}",
                        path.display()
                    )));
                }
                path
            }
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(None),
            },
        };

        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ValidationError::new(&format!(
                "Error reading configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        self.apply_config_str(&contents, &path)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(Some(path))
    }

    /// Parse `contents` as TOML and apply it
    pub fn apply_config_str(&mut self, contents: &str, origin: &Path) -> Result<(), ValidationError> {
        let config = toml::from_str::<toml::Table>(contents).map_err(|e| {
            ValidationError::new(&format!(
                "Error parsing configuration file {}: {}",
                origin.display(),
                e
            ))
        })?;
        self.apply_toml_values(&config).map_err(|e| {
            ValidationError::new(&format!(
                "Error in configuration file {}: {}",
                origin.display(),
                e
            ))
        })
    }

    /// Apply TOML configuration values where the command line gave none
    pub fn apply_toml_values(&mut self, config: &toml::Table) -> Result<(), ValidationError> {
        if let Some(unknown) = config.keys().find(|k| !CONFIG_KEYS.contains(&k.as_str())) {
            return Err(ValidationError::new(&format!(
                "Unknown configuration key '{}'",
                unknown
            )));
        }

        if self.resolution.is_none() {
            self.resolution = integer_field(config, "resolution")?;
        }
        if self.color.is_none() {
            if let Some(color) = string_field(config, "color")? {
                self.color = Some(color.parse().map_err(|_| {
                    ValidationError::new(&format!(
                        "'color' must be monochrome, grayscale or truecolor, got '{}'",
                        color
                    ))
                })?);
            }
        }
        // Mutually exclusive flag pairs: the file only applies when neither flag was given
        if self.deskew_flag().is_none() {
            if let Some(deskew) = bool_field(config, "deskew")? {
                self.deskew = deskew;
                self.no_deskew = !deskew;
            }
        }
        if self.trim_flag().is_none() {
            if let Some(trim) = bool_field(config, "trim")? {
                self.trim = trim;
                self.no_trim = !trim;
            }
        }
        if self.jobs.is_none() {
            self.jobs = integer_field(config, "jobs")?;
        }
        if self.fuzz.is_none() {
            self.fuzz = integer_field(config, "fuzz")?;
        }
        if self.deskew_threshold.is_none() {
            self.deskew_threshold = integer_field(config, "deskew-threshold")?;
        }
        if self.vendor_id.is_none() {
            self.vendor_id = string_field(config, "vendor-id")?;
        }
        if self.sane_model.is_none() {
            self.sane_model = string_field(config, "sane-model")?;
        }
        if self.work_dir.is_none() {
            self.work_dir = string_field(config, "work-dir")?.map(PathBuf::from);
        }
        if self.log_level.is_none() {
            self.log_level = string_field(config, "log-level")?;
        }
        if self.log_format.is_none() {
            self.log_format = string_field(config, "log-format")?;
        }
        if self.log_file.is_none() {
            self.log_file = string_field(config, "log-file")?.map(PathBuf::from);
        }

        Ok(())
    }
}

fn string_field(config: &toml::Table, key: &str) -> Result<Option<String>, ValidationError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| ValidationError::new(&format!("'{}' must be a string", key))),
    }
}

fn bool_field(config: &toml::Table, key: &str) -> Result<Option<bool>, ValidationError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| ValidationError::new(&format!("'{}' must be true or false", key))),
    }
}

fn integer_field<T: TryFrom<i64>>(
    config: &toml::Table,
    key: &str,
) -> Result<Option<T>, ValidationError> {
    let Some(value) = config.get(key) else {
        return Ok(None);
    };
    value
        .as_integer()
        .and_then(|n| T::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| {
            ValidationError::new(&format!("'{}' must be a non-negative integer", key))
        })
}

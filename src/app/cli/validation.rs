//! Argument validation and resolution into a pipeline configuration
//!
//! Runs after the configuration file has been merged and before any
//! device I/O. Built-in defaults fill whatever is still unset.

use crate::core::validation::{
    validate_percent, validate_resolution, validate_vendor_id, ValidationError,
};
use crate::pipeline::settings::{
    PipelineConfig, DEFAULT_CONCURRENCY, DEFAULT_RESOLUTION, DEFAULT_SANE_MODEL,
    DEFAULT_VENDOR_ID,
};
use crate::pipeline::task::{CleanupOptions, DEFAULT_DESKEW_THRESHOLD, DEFAULT_FUZZ_PERCENT};

use super::args::Args;

impl Args {
    /// Validate every value and build the pipeline configuration
    pub fn to_pipeline_config(&self) -> Result<PipelineConfig, ValidationError> {
        let resolution = validate_resolution(self.resolution.unwrap_or(DEFAULT_RESOLUTION))?;

        let concurrency = self.jobs.unwrap_or(DEFAULT_CONCURRENCY);
        if concurrency == 0 {
            return Err(ValidationError::new("Jobs must be at least 1"));
        }

        let fuzz_percent = validate_percent("Fuzz", self.fuzz.unwrap_or(DEFAULT_FUZZ_PERCENT))?;
        let threshold = validate_percent(
            "Deskew threshold",
            self.deskew_threshold.unwrap_or(DEFAULT_DESKEW_THRESHOLD),
        )?;
        let cleanup = CleanupOptions {
            fuzz_percent,
            trim: self.trim_flag().unwrap_or(true),
            deskew_threshold: self.deskew_flag().unwrap_or(true).then_some(threshold),
        };

        let vendor_id = validate_vendor_id(self.vendor_id.as_deref().unwrap_or(DEFAULT_VENDOR_ID))?;
        let sane_model = self
            .sane_model
            .clone()
            .unwrap_or_else(|| DEFAULT_SANE_MODEL.to_string());
        if sane_model.trim().is_empty() || sane_model.contains(':') {
            return Err(ValidationError::new(&format!(
                "SANE model '{}' must be a non-empty name without ':'",
                sane_model
            )));
        }

        if let Some(dir) = &self.work_dir {
            if !dir.is_dir() {
                return Err(ValidationError::new(&format!(
                    "Working directory parent is not a directory: '{}'",
                    dir.display()
                )));
            }
        }

        Ok(PipelineConfig {
            vendor_id,
            sane_model,
            resolution,
            color: self.color.unwrap_or_default(),
            duplex: self.duplex,
            batch: self.batch,
            cleanup,
            concurrency,
            work_dir_parent: self.work_dir.clone(),
        })
    }
}

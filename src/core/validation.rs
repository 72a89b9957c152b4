//! Validation utilities for CLI arguments and configuration values

use crate::core::error_handling::ContextualError;
use thiserror::Error;

/// Resolutions (dpi) the scanner driver accepts
pub const SUPPORTED_RESOLUTIONS: [u32; 6] = [100, 150, 200, 300, 400, 600];

/// A rejected argument or configuration value
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<String> {
        Some(self.message.clone())
    }
}

/// Validate a scan resolution in dpi
pub fn validate_resolution(value: u32) -> Result<u32, ValidationError> {
    if SUPPORTED_RESOLUTIONS.contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::new(&format!(
            "Resolution {} is not supported (expected one of {})",
            value,
            SUPPORTED_RESOLUTIONS
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

/// clap value parser for `--resolution`
pub fn parse_resolution(value: &str) -> Result<u32, String> {
    let parsed = value
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("'{}' is not a valid resolution", value))?;
    validate_resolution(parsed).map_err(|e| e.to_string())
}

/// Validate positive integer value
pub fn validate_positive_int(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("Value must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a valid positive integer", value)),
    }
}

/// Validate a percentage handed to the cleanup tool (fuzz, deskew threshold)
pub fn validate_percent(name: &str, value: u32) -> Result<u32, ValidationError> {
    if value <= 100 {
        Ok(value)
    } else {
        Err(ValidationError::new(&format!(
            "{} must be a percentage between 0 and 100, got {}",
            name, value
        )))
    }
}

/// Validate a USB vendor id (four hex digits, e.g. `04f9`)
pub fn validate_vendor_id(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim().trim_end_matches(':');
    if trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(trimmed.to_lowercase())
    } else {
        Err(ValidationError::new(&format!(
            "Vendor id '{}' must be four hexadecimal digits",
            value
        )))
    }
}

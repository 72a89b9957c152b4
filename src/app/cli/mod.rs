//! Command-line surface: arguments, configuration file and validation

pub mod args;
pub mod config;
pub mod validation;

pub use args::Args;

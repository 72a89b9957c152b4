//! Application module

pub mod cli;
pub mod prompt;
pub mod spinner;
pub mod startup;

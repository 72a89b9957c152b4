//! Pipeline Integration Test Modules

pub mod parser;
pub mod session;

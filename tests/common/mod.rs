//! Common test utilities and helpers
//!
//! In-memory stand-ins for the external tools so whole sessions can run
//! without a scanner attached.
#![allow(dead_code)]

pub mod fakes;

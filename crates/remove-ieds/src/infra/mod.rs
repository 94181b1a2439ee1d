//! Infrastructure adapters for file IO, configuration, and logging.

pub mod config;
pub mod logging;
pub mod scl;

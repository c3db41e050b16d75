//! Host side of the jrnmaint tool
//!
//! - Configuration loading
//! - Console and message queue report sinks
//! - Filesystem-backed journaling subsystem

pub mod config;
pub mod output;
pub mod store;

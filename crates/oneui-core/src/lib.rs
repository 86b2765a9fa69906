//! OneUI Core - Shared configuration for the OneUI app
//!
//! This crate holds the typed configuration consumed by the crash logging
//! subsystem and the host binary:
//! - **`Config`** - top-level YAML configuration (`crash_logs`, `logging`)
//! - **`ConfigBuilder`** - programmatic construction with validation

pub mod config;

pub use config::{expand_tilde, Config, ConfigBuilder, CrashLogConfig, LoggingConfig, ValidationError};

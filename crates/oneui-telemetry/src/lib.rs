//! OneUI Telemetry - Crash capture and crash log retention
//!
//! Provides:
//! - `CrashLogger`: process panic hook that writes `crash_log_*.txt` reports
//! - `log_error`: manual `error_log_*.txt` reports for handled errors
//! - `CrashLogStore`: listing, deletion, age/count pruning and status reports
//! - `DeviceInfo`: non-identifying hardware/OS details for reports

pub mod crash_report;
pub mod device_info;
pub mod error;
pub mod error_report;
pub mod format;
pub mod store;

pub use crash_report::{ensure_log_dir, save_crash_report, CrashLogger, CrashReport, PanicHook};
pub use device_info::DeviceInfo;
pub use error::CrashLogError;
pub use error_report::{log_error, save_error_report, ErrorReport};
pub use format::format_size;
pub use store::{CrashLogStore, LogFile, LogFileInfo, RetentionPolicy};

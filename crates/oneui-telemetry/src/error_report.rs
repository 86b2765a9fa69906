//! Manual (non-fatal) error reports
//!
//! Any code may record an error it has already handled. Reports are written
//! as `error_log_<yyyy-mm-dd_HH-MM-SS>.txt` next to the crash reports.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use crate::crash_report::write_report;
use crate::error::Result;
use crate::format::{report_file_name, DISPLAY_TIME_FORMAT};

/// File name prefix for manually logged errors.
pub const ERROR_LOG_PREFIX: &str = "error_log";

/// A manually logged error report
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub timestamp: DateTime<Local>,
    pub tag: String,
    pub message: String,
    /// `Display` of the error followed by each `source()` in order.
    /// Empty when no error was supplied.
    pub chain: Vec<String>,
    pub backtrace: String,
}

impl ErrorReport {
    /// Create a new error report, capturing the caller's backtrace.
    pub fn new(tag: &str, message: &str, err: Option<&(dyn std::error::Error + 'static)>) -> Self {
        Self {
            timestamp: Local::now(),
            tag: tag.to_string(),
            message: message.to_string(),
            chain: err.map(error_chain).unwrap_or_default(),
            backtrace: std::backtrace::Backtrace::force_capture().to_string(),
        }
    }

    /// File name derived from the report timestamp.
    pub fn file_name(&self) -> String {
        report_file_name(ERROR_LOG_PREFIX, self.timestamp)
    }

    /// Render the report as plain text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "======== Manual Error Report ========");
        let _ = writeln!(out, "Date/Time: {}", self.timestamp.format(DISPLAY_TIME_FORMAT));
        let _ = writeln!(out, "Tag: {}", self.tag);
        let _ = writeln!(out, "Message: {}", self.message);
        let _ = writeln!(out);

        if let Some((head, causes)) = self.chain.split_first() {
            let _ = writeln!(out, "======== Error Details ========");
            let _ = writeln!(out, "Error: {head}");
            for cause in causes {
                let _ = writeln!(out, "Caused by: {cause}");
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "======== Stack Trace ========");
        let _ = writeln!(out, "{}", self.backtrace);
        out
    }
}

/// Flatten an error and its `source()` chain into display strings.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}

/// Save an error report to the log directory.
pub fn save_error_report(log_dir: &Path, report: &ErrorReport) -> Result<PathBuf> {
    write_report(log_dir, &report.file_name(), &report.render())
}

/// Log an error through `tracing` and persist it as an `error_log_*.txt` file.
///
/// Never fails: write errors are logged and `None` is returned.
pub fn log_error(
    log_dir: &Path,
    tag: &str,
    message: &str,
    err: Option<&(dyn std::error::Error + 'static)>,
) -> Option<PathBuf> {
    match err {
        Some(e) => error!(tag = %tag, error = %e, "{message}"),
        None => error!(tag = %tag, "{message}"),
    }

    let report = ErrorReport::new(tag, message, err);
    match save_error_report(log_dir, &report) {
        Ok(path) => {
            info!(path = %path.display(), "Error report saved");
            Some(path)
        }
        Err(e) => {
            warn!(error = %e, "Failed to save error report");
            None
        }
    }
}

//! Formatting helpers shared by reports and the status summary.

use std::time::SystemTime;

use chrono::{DateTime, Local};

/// Timestamp format used in report bodies and the status report.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format embedded in report file names.
pub const FILE_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Format a byte count as bytes, KB or MB with one decimal.
///
/// Units switch at 1024 and 1024 * 1024; anything larger stays in MB.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / MB)
    }
}

/// Render a filesystem timestamp in local time.
pub fn format_system_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format(DISPLAY_TIME_FORMAT)
        .to_string()
}

/// Current local time, formatted for report bodies.
pub fn now_display() -> String {
    Local::now().format(DISPLAY_TIME_FORMAT).to_string()
}

/// Build a report file name: `<prefix>_<yyyy-mm-dd_HH-MM-SS>.txt`.
pub fn report_file_name(prefix: &str, at: DateTime<Local>) -> String {
    format!("{prefix}_{}.txt", at.format(FILE_TIME_FORMAT))
}

//! Crash report generation and persistence
//!
//! Captures panic information and saves plain-text reports named
//! `crash_log_<yyyy-mm-dd_HH-MM-SS>.txt` into the crash log directory.
//!
//! [`CrashLogger::install`] registers a process-wide panic hook that writes
//! the report and then hands the panic to whichever hook was registered
//! before it, so the default output and unwinding behavior are unchanged.

use std::fmt::Write as _;
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local};
use oneui_core::CrashLogConfig;
use tracing::{debug, error, info, warn};

use crate::device_info::DeviceInfo;
use crate::error::{CrashLogError, Result};
use crate::error_report;
use crate::format::{report_file_name, DISPLAY_TIME_FORMAT};

/// File name prefix for reports written by the panic hook.
pub const CRASH_LOG_PREFIX: &str = "crash_log";

/// Separator that closes the report header block.
const HEADER_RULE: &str = "============================";

/// Signature of a process panic hook, as returned by [`std::panic::take_hook`].
pub type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// A crash report for a single panic
#[derive(Debug, Clone)]
pub struct CrashReport {
    pub timestamp: DateTime<Local>,
    pub app_name: String,
    pub app_version: String,
    pub thread_name: String,
    pub thread_id: String,
    pub message: String,
    pub location: String,
    pub backtrace: String,
    pub device: DeviceInfo,
}

impl CrashReport {
    /// Create a new crash report stamped with the current local time.
    pub fn new(
        app_name: &str,
        app_version: &str,
        thread_name: &str,
        thread_id: &str,
        message: &str,
        location: &str,
        backtrace: &str,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            app_name: app_name.to_string(),
            app_version: app_version.to_string(),
            thread_name: thread_name.to_string(),
            thread_id: thread_id.to_string(),
            message: message.to_string(),
            location: location.to_string(),
            backtrace: backtrace.to_string(),
            device: DeviceInfo::collect(),
        }
    }

    /// File name derived from the report timestamp.
    pub fn file_name(&self) -> String {
        report_file_name(CRASH_LOG_PREFIX, self.timestamp)
    }

    /// Render the report as the fixed-section text body.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "======== Application Crash Report ========");
        let _ = writeln!(out, "Date/Time: {}", self.timestamp.format(DISPLAY_TIME_FORMAT));
        let _ = writeln!(out, "Application: {}", self.app_name);
        let _ = writeln!(out, "Version: {}", self.app_version);
        let _ = writeln!(out, "Thread name: {}", self.thread_name);
        let _ = writeln!(out, "Thread ID: {}", self.thread_id);
        let _ = writeln!(out, "{HEADER_RULE}");
        let _ = writeln!(out);

        let _ = writeln!(out, "======== Error Details ========");
        let _ = writeln!(out, "Error type: panic");
        let _ = writeln!(out, "Message: {}", self.message);
        let _ = writeln!(out, "Location: {}", self.location);
        let _ = writeln!(out);

        let _ = writeln!(out, "======== Stack Trace ========");
        let _ = writeln!(out, "{}", self.backtrace);
        let _ = writeln!(out);

        let _ = writeln!(out, "======== Device Info ========");
        out.push_str(&self.device.to_report_lines());
        out
    }
}

/// Create the log directory (and parents) if it does not exist yet.
pub fn ensure_log_dir(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir).map_err(|source| CrashLogError::CreateDir {
        path: log_dir.to_path_buf(),
        source,
    })
}

/// Write `body` to `log_dir/file_name`, creating the directory inline.
///
/// An existing file with the same name is overwritten.
pub(crate) fn write_report(log_dir: &Path, file_name: &str, body: &str) -> Result<PathBuf> {
    ensure_log_dir(log_dir)?;
    let path = log_dir.join(file_name);
    std::fs::write(&path, body).map_err(|source| CrashLogError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Save a crash report to the log directory.
///
/// Creates the directory if needed. File name: `crash_log_{timestamp}.txt`
pub fn save_crash_report(log_dir: &Path, report: &CrashReport) -> Result<PathBuf> {
    write_report(log_dir, &report.file_name(), &report.render())
}

/// Process-wide crash logger.
///
/// Built once by the host at startup and installed with
/// [`CrashLogger::install`]. Holds only immutable state, so the hook may run
/// concurrently on several panicking threads.
#[derive(Debug, Clone)]
pub struct CrashLogger {
    log_dir: PathBuf,
    app_name: String,
    app_version: String,
}

impl CrashLogger {
    /// Creates a logger writing into the configured crash log directory.
    pub fn new(config: &CrashLogConfig) -> Self {
        Self {
            log_dir: config.directory.clone(),
            app_name: config.app_name.clone(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Overrides the version string written into report headers.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = version.into();
        self
    }

    /// Returns the crash log directory.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Installs the crash logger as the process panic hook.
    ///
    /// Creates the log directory first; a failure there is logged and the
    /// hook is installed anyway. Only the first call in a process installs
    /// anything; later calls return `false`.
    pub fn install(self: &Arc<Self>) -> bool {
        if INSTALLED.swap(true, Ordering::SeqCst) {
            debug!("Crash logger already installed");
            return false;
        }

        if self.log_dir.is_dir() {
            debug!(path = %self.log_dir.display(), "Crash log directory present");
        } else {
            match ensure_log_dir(&self.log_dir) {
                Ok(()) => {
                    info!(path = %self.log_dir.display(), "Created crash log directory")
                }
                Err(e) => warn!(error = %e, "Failed to create crash log directory"),
            }
        }

        let previous = std::panic::take_hook();
        std::panic::set_hook(Arc::clone(self).chain(previous));
        info!(path = %self.log_dir.display(), "Crash logger installed");
        true
    }

    /// Wraps `previous` in a hook that writes a crash report first.
    ///
    /// `previous` is always invoked after the report attempt, whether or not
    /// the write succeeded.
    pub fn chain(self: Arc<Self>, previous: PanicHook) -> PanicHook {
        Box::new(move |panic_info| {
            self.report_panic(panic_info);
            previous(panic_info);
        })
    }

    /// Writes a report for a panic in progress. Never panics.
    fn report_panic(&self, panic_info: &PanicHookInfo<'_>) {
        let message = panic_message(panic_info);
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_default();

        let thread = std::thread::current();
        let thread_name = thread.name().unwrap_or("<unnamed>").to_string();
        let thread_id = format!("{:?}", thread.id());

        let backtrace = std::backtrace::Backtrace::force_capture().to_string();

        let report = CrashReport::new(
            &self.app_name,
            &self.app_version,
            &thread_name,
            &thread_id,
            &message,
            &location,
            &backtrace,
        );

        match save_crash_report(&self.log_dir, &report) {
            Ok(path) => info!(path = %path.display(), "Crash report saved"),
            Err(e) => warn!(error = %e, "Failed to save crash report"),
        }

        error!(
            thread = %thread_name,
            location = %location,
            "Unhandled panic: {message}"
        );
    }

    /// Records a non-fatal error into this logger's directory.
    ///
    /// See [`error_report::log_error`].
    pub fn log_error(
        &self,
        tag: &str,
        message: &str,
        err: Option<&(dyn std::error::Error + 'static)>,
    ) -> Option<PathBuf> {
        error_report::log_error(&self.log_dir, tag, message, err)
    }
}

fn panic_message(panic_info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> CrashReport {
        CrashReport::new(
            "com.example.oneuiapp",
            "1.2.3",
            "worker",
            "ThreadId(7)",
            "boom",
            "src/main.rs:10:5",
            "fake backtrace",
        )
    }

    #[test]
    fn test_crash_report_creation() {
        let report = sample_report();
        assert_eq!(report.thread_name, "worker");
        assert_eq!(report.message, "boom");
        assert_eq!(report.location, "src/main.rs:10:5");
        assert!(report.file_name().starts_with("crash_log_"));
        assert!(report.file_name().ends_with(".txt"));
    }

    #[test]
    fn test_render_has_sections_in_order() {
        let body = sample_report().render();
        let sections = [
            "======== Application Crash Report ========",
            "Thread ID: ThreadId(7)",
            HEADER_RULE,
            "======== Error Details ========",
            "Message: boom",
            "======== Stack Trace ========",
            "fake backtrace",
            "======== Device Info ========",
            "Architecture: ",
        ];
        let mut cursor = 0;
        for section in sections {
            let found = body[cursor..]
                .find(section)
                .unwrap_or_else(|| panic!("missing or out of order: {section}"));
            cursor += found + section.len();
        }
        assert!(body.contains("Application: com.example.oneuiapp\n"));
        assert!(body.contains("Version: 1.2.3\n"));
    }

    #[test]
    fn test_save_crash_report_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("nested").join("crash_logs");
        let report = sample_report();

        let path = save_crash_report(&log_dir, &report).unwrap();
        assert!(path.exists());
        assert_eq!(path.parent(), Some(log_dir.as_path()));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Message: boom"));
    }

    #[test]
    fn test_save_crash_report_same_second_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let first = sample_report();
        let mut second = first.clone();
        second.message = "second".to_string();

        let a = save_crash_report(dir.path(), &first).unwrap();
        let b = save_crash_report(dir.path(), &second).unwrap();
        assert_eq!(a, b);
        let content = std::fs::read_to_string(&b).unwrap();
        assert!(content.contains("Message: second"));
    }

    #[test]
    fn test_save_crash_report_fails_when_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = save_crash_report(&blocker.join("logs"), &sample_report()).unwrap_err();
        assert!(matches!(err, CrashLogError::CreateDir { .. }));
    }

    #[test]
    fn test_logger_uses_config_directory() {
        let config = CrashLogConfig {
            directory: PathBuf::from("/tmp/oneui-test-logs"),
            ..CrashLogConfig::default()
        };
        let logger = CrashLogger::new(&config).with_version("9.9.9");
        assert_eq!(logger.log_dir(), Path::new("/tmp/oneui-test-logs"));
        assert_eq!(logger.app_version, "9.9.9");
    }
}

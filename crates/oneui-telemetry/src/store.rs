//! Crash log storage and retention
//!
//! Manages the report files in the crash log directory: listing, deletion,
//! age/count pruning and a human-readable status summary. The directory
//! listing is the only source of truth; nothing is cached between calls.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use oneui_core::CrashLogConfig;
use tracing::{debug, info, warn};

use crate::error::CrashLogError;
use crate::format::{format_size, format_system_time, now_display};

/// Extension of files managed by the store.
pub const LOG_EXTENSION: &str = "txt";

/// Placeholder used for dates when no report exists.
pub const UNSPECIFIED: &str = "unspecified";

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Limits applied by [`CrashLogStore::cleanup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Keep at most this many of the newest reports.
    pub max_files: usize,
    /// Delete reports older than this many days.
    pub max_age_days: u64,
}

impl RetentionPolicy {
    /// Maximum file age as a duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_days.saturating_mul(SECONDS_PER_DAY))
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_files: 50,
            max_age_days: 30,
        }
    }
}

impl From<&CrashLogConfig> for RetentionPolicy {
    fn from(config: &CrashLogConfig) -> Self {
        Self {
            max_files: config.max_files,
            max_age_days: config.max_age_days,
        }
    }
}

/// A report file as seen at listing time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
    pub modified: SystemTime,
}

impl LogFile {
    /// Age relative to `now`; zero when the file is dated in the future.
    pub fn age_at(&self, now: SystemTime) -> Duration {
        now.duration_since(self.modified).unwrap_or_default()
    }
}

/// Aggregate statistics over the current set of reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFileInfo {
    pub total_files: usize,
    pub total_size_bytes: u64,
    pub oldest: Option<LogFile>,
    pub newest: Option<LogFile>,
}

impl LogFileInfo {
    /// Total size as `B`, `KB` or `MB`.
    pub fn total_size_formatted(&self) -> String {
        format_size(self.total_size_bytes)
    }

    /// Modification time of the oldest report, or `"unspecified"`.
    pub fn oldest_date(&self) -> String {
        format_file_date(self.oldest.as_ref())
    }

    /// Modification time of the newest report, or `"unspecified"`.
    pub fn newest_date(&self) -> String {
        format_file_date(self.newest.as_ref())
    }
}

fn format_file_date(file: Option<&LogFile>) -> String {
    file.map(|f| format_system_time(f.modified))
        .unwrap_or_else(|| UNSPECIFIED.to_string())
}

/// Manages the crash log directory.
///
/// Every operation is synchronous and touches the filesystem directly;
/// failures are logged and reported through the return value, never raised.
#[derive(Debug, Clone)]
pub struct CrashLogStore {
    log_dir: PathBuf,
    policy: RetentionPolicy,
}

impl CrashLogStore {
    /// Creates a store over `log_dir` with the given retention policy.
    pub fn new(log_dir: PathBuf, policy: RetentionPolicy) -> Self {
        Self { log_dir, policy }
    }

    /// Creates a store from the `crash_logs` config section.
    pub fn from_config(config: &CrashLogConfig) -> Self {
        Self::new(config.directory.clone(), RetentionPolicy::from(config))
    }

    /// Returns the crash log directory path.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Returns the retention policy.
    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// List all `.txt` report files, newest first.
    ///
    /// Files with equal modification times are ordered by name, descending.
    /// A missing or unreadable directory yields an empty list.
    pub fn list(&self) -> Vec<LogFile> {
        if !self.log_dir.exists() {
            return Vec::new();
        }

        match self.try_list() {
            Ok(files) => files,
            Err(e) => {
                warn!(error = %e, "Failed to list crash logs");
                Vec::new()
            }
        }
    }

    fn try_list(&self) -> Result<Vec<LogFile>, CrashLogError> {
        let read_dir = std::fs::read_dir(&self.log_dir).map_err(|source| CrashLogError::ReadDir {
            path: self.log_dir.clone(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == LOG_EXTENSION) {
                continue;
            }

            // Follows symlinks. Entries can vanish between read_dir and stat.
            let Ok(metadata) = std::fs::metadata(&path) else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            files.push(LogFile {
                file_name: entry.file_name().to_string_lossy().to_string(),
                size_bytes: metadata.len(),
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                path,
            });
        }

        files.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| b.file_name.cmp(&a.file_name))
        });
        Ok(files)
    }

    /// Delete a single report. Returns `true` only if the file was removed.
    pub fn delete(&self, file: &LogFile) -> bool {
        match std::fs::remove_file(&file.path) {
            Ok(()) => {
                debug!(file = %file.file_name, "Deleted crash log");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!(file = %file.file_name, error = %e, "Failed to delete crash log");
                false
            }
        }
    }

    /// Delete every report. Returns how many were actually removed.
    pub fn delete_all(&self) -> usize {
        let count = self
            .list()
            .iter()
            .filter(|file| self.delete(file))
            .count();
        debug!(count, "Deleted all crash logs");
        count
    }

    /// Apply the retention policy as of now. Returns how many files were removed.
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(SystemTime::now())
    }

    /// Apply the retention policy relative to `now`.
    ///
    /// First removes every file older than `max_age_days`, then re-lists and
    /// removes everything ranked after the newest `max_files`.
    pub fn cleanup_at(&self, now: SystemTime) -> usize {
        let max_age = self.policy.max_age();

        let mut deleted = self
            .list()
            .iter()
            .filter(|file| file.age_at(now) > max_age)
            .filter(|file| self.delete(file))
            .count();

        let remaining = self.list();
        if remaining.len() > self.policy.max_files {
            deleted += remaining[self.policy.max_files..]
                .iter()
                .filter(|file| self.delete(file))
                .count();
        }

        if deleted > 0 {
            info!(deleted, "Removed old crash logs");
        }
        deleted
    }

    /// Compute aggregate statistics from a single listing.
    pub fn info(&self) -> LogFileInfo {
        let files = self.list();
        LogFileInfo {
            total_files: files.len(),
            total_size_bytes: files.iter().map(|f| f.size_bytes).sum(),
            newest: files.first().cloned(),
            oldest: files.last().cloned(),
        }
    }

    /// Render a multi-line status summary of the crash log directory.
    pub fn status_report(&self) -> String {
        let info = self.info();
        let log_dir = std::path::absolute(&self.log_dir).unwrap_or_else(|_| self.log_dir.clone());

        let mut report = String::new();
        let _ = writeln!(report, "======== Application Status Report ========");
        let _ = writeln!(report, "Date/Time: {}", now_display());
        let _ = writeln!(report, "Log files: {}", info.total_files);
        let _ = writeln!(report, "Total size: {}", info.total_size_formatted());
        let _ = writeln!(report, "Oldest file: {}", info.oldest_date());
        let _ = writeln!(report, "Newest file: {}", info.newest_date());
        let _ = writeln!(report, "Log directory: {}", log_dir.display());
        let _ = writeln!(report, "================================");
        report
    }
}

#[cfg(test)]
mod tests {
    use filetime::FileTime;

    use super::*;

    const DAY: Duration = Duration::from_secs(SECONDS_PER_DAY);

    fn write_log(dir: &Path, name: &str, modified: SystemTime) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "report").unwrap();
        filetime::set_file_mtime(&path, FileTime::from_system_time(modified)).unwrap();
        path
    }

    fn store(dir: &Path) -> CrashLogStore {
        CrashLogStore::new(dir.to_path_buf(), RetentionPolicy::default())
    }

    #[test]
    fn test_list_nonexistent_dir() {
        let store = store(Path::new("/nonexistent/path"));
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_list_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(dir.path()).list().is_empty());
    }

    #[test]
    fn test_list_filters_extension_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        write_log(dir.path(), "crash_log_a.txt", now);
        write_log(dir.path(), "notes.json", now);
        std::fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let files = store(dir.path()).list();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "crash_log_a.txt");
        assert_eq!(files[0].size_bytes, 6);
    }

    #[test]
    fn test_list_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        write_log(dir.path(), "b.txt", now - DAY * 2);
        write_log(dir.path(), "a.txt", now);
        write_log(dir.path(), "c.txt", now - DAY);

        let names: Vec<String> = store(dir.path())
            .list()
            .into_iter()
            .map(|f| f.file_name)
            .collect();
        assert_eq!(names, vec!["a.txt", "c.txt", "b.txt"]);
    }

    #[test]
    fn test_list_ties_ordered_by_name_descending() {
        let dir = tempfile::tempdir().unwrap();
        let at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        write_log(dir.path(), "crash_log_2023-11-14_22-13-20.txt", at);
        write_log(dir.path(), "error_log_2023-11-14_22-13-20.txt", at);

        let files = store(dir.path()).list();
        assert_eq!(files[0].file_name, "error_log_2023-11-14_22-13-20.txt");
        assert_eq!(files[1].file_name, "crash_log_2023-11-14_22-13-20.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_list_follows_symlinks_to_files() {
        let dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        let target = write_log(target_dir.path(), "target.txt", SystemTime::now());
        std::os::unix::fs::symlink(&target, dir.path().join("crash_log_link.txt")).unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("missing.txt"),
            dir.path().join("crash_log_dangling.txt"),
        )
        .unwrap();

        let files = store(dir.path()).list();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "crash_log_link.txt");
        assert_eq!(files[0].size_bytes, 6);
    }

    #[test]
    fn test_delete_nonexistent_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let ghost = LogFile {
            path: dir.path().join("ghost.txt"),
            file_name: "ghost.txt".into(),
            size_bytes: 0,
            modified: SystemTime::now(),
        };
        assert!(!store(dir.path()).delete(&ghost));
    }

    #[test]
    fn test_delete_all() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        for i in 0..3 {
            write_log(dir.path(), &format!("crash_log_{i}.txt"), now);
        }
        let store = store(dir.path());

        assert_eq!(store.list().len(), 3);
        assert_eq!(store.delete_all(), 3);
        assert!(store.list().is_empty());
        assert_eq!(store.delete_all(), 0);
    }

    #[test]
    fn test_cleanup_age_boundary_is_strict() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let max_age = RetentionPolicy::default().max_age();
        write_log(dir.path(), "boundary.txt", now - max_age);
        write_log(dir.path(), "expired.txt", now - max_age - Duration::from_secs(1));
        write_log(dir.path(), "fresh.txt", now - DAY);

        let store = store(dir.path());
        assert_eq!(store.cleanup_at(now), 1);

        let names: Vec<String> = store.list().into_iter().map(|f| f.file_name).collect();
        assert_eq!(names, vec!["fresh.txt", "boundary.txt"]);
    }

    #[test]
    fn test_cleanup_ignores_future_files() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        write_log(dir.path(), "future.txt", now + DAY);

        assert_eq!(store(dir.path()).cleanup_at(now), 0);
    }

    #[test]
    fn test_info_empty() {
        let info = store(Path::new("/nonexistent/path")).info();
        assert_eq!(info, LogFileInfo::default());
        assert_eq!(info.total_size_formatted(), "0 B");
        assert_eq!(info.oldest_date(), UNSPECIFIED);
        assert_eq!(info.newest_date(), UNSPECIFIED);
    }

    #[test]
    fn test_info_aggregates() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        write_log(dir.path(), "old.txt", now - DAY * 3);
        write_log(dir.path(), "mid.txt", now - DAY);
        write_log(dir.path(), "new.txt", now);

        let info = store(dir.path()).info();
        assert_eq!(info.total_files, 3);
        assert_eq!(info.total_size_bytes, 18);
        assert_eq!(info.total_size_formatted(), "18 B");
        assert_eq!(info.newest.unwrap().file_name, "new.txt");
        assert_eq!(info.oldest.unwrap().file_name, "old.txt");
    }

    #[test]
    fn test_status_report_contents() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), "crash_log_x.txt", SystemTime::now());

        let report = store(dir.path()).status_report();
        assert!(report.starts_with("======== Application Status Report ========\n"));
        assert!(report.contains("Log files: 1\n"));
        assert!(report.contains("Total size: 6 B\n"));
        assert!(report.contains(&format!("Log directory: {}\n", dir.path().display())));
        assert!(!report.contains(UNSPECIFIED));
    }

    #[test]
    fn test_policy_from_config() {
        let config = CrashLogConfig {
            max_files: 7,
            max_age_days: 2,
            ..CrashLogConfig::default()
        };
        let policy = RetentionPolicy::from(&config);
        assert_eq!(policy.max_files, 7);
        assert_eq!(policy.max_age(), DAY * 2);
    }
}

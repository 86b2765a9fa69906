//! Configuration module for the OneUI app.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the crash log folder created under the downloads directory.
pub const CRASH_LOG_FOLDER: &str = "OneUiApp_CrashLogs";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for the OneUI app.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crash_logs: CrashLogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Crash log capture and retention settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrashLogConfig {
    /// Directory that receives `crash_log_*.txt` and `error_log_*.txt` files.
    pub directory: PathBuf,
    /// Maximum number of report files kept by automatic cleanup.
    pub max_files: usize,
    /// Reports older than this many days are removed by automatic cleanup.
    pub max_age_days: u64,
    /// Application identity written into crash report headers.
    pub app_name: String,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        config.crash_logs.directory = expand_tilde(&config.crash_logs.directory);
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/oneuiapp/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| expand_tilde(Path::new("~/.config")))
            .join("oneuiapp")
            .join("config.yaml")
    }
}

impl CrashLogConfig {
    /// The well-known crash log directory: a fixed folder under the user's
    /// downloads directory.
    pub fn default_directory() -> PathBuf {
        dirs::download_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
            .unwrap_or_else(|| std::env::temp_dir().join("Downloads"))
            .join(CRASH_LOG_FOLDER)
    }
}

/// Expand a leading `~` in `path` to the user's home directory.
///
/// Paths without a leading `~` (or with no known home) are returned unchanged.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(home) = dirs::home_dir() else {
        return path.to_path_buf();
    };
    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home,
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

impl Default for CrashLogConfig {
    fn default() -> Self {
        Self {
            directory: Self::default_directory(),
            max_files: 50,
            max_age_days: 30,
            app_name: "com.example.oneuiapp".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"crash_logs.max_files"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- crash_logs ---
        if self.crash_logs.max_files == 0 {
            errors.push(ValidationError {
                field: "crash_logs.max_files".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.crash_logs.max_age_days == 0 {
            errors.push(ValidationError {
                field: "crash_logs.max_age_days".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.crash_logs.directory.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "crash_logs.directory".into(),
                message: "must not be empty".into(),
            });
        } else if !self.crash_logs.directory.is_absolute() {
            errors.push(ValidationError {
                field: "crash_logs.directory".into(),
                message: format!(
                    "must be an absolute path: {}",
                    self.crash_logs.directory.display()
                ),
            });
        }
        if self.crash_logs.app_name.trim().is_empty() {
            errors.push(ValidationError {
                field: "crash_logs.app_name".into(),
                message: "must not be empty".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use oneui_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .crash_log_directory(PathBuf::from("/tmp/crash-logs"))
///     .crash_log_max_files(10)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- crash_logs ---

    pub fn crash_log_directory(mut self, directory: PathBuf) -> Self {
        self.config.crash_logs.directory = expand_tilde(&directory);
        self
    }

    pub fn crash_log_max_files(mut self, n: usize) -> Self {
        self.config.crash_logs.max_files = n;
        self
    }

    pub fn crash_log_max_age_days(mut self, days: u64) -> Self {
        self.config.crash_logs.max_age_days = days;
        self
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.config.crash_logs.app_name = name.into();
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

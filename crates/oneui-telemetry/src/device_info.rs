//! Device information collector
//!
//! Gathers non-identifying hardware and OS details for crash reports.
//! Never includes hostname or username.

use std::fmt::Write as _;

const UNKNOWN: &str = "unknown";

/// Non-identifying device information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub brand: String,
    pub model: String,
    pub manufacturer: String,
    pub os_version: String,
    pub kernel: String,
    pub arch: String,
    pub cpus: usize,
}

impl DeviceInfo {
    /// Collect device information from the current system.
    ///
    /// Every probe is best-effort; missing sources yield `"unknown"`.
    pub fn collect() -> Self {
        Self {
            brand: read_dmi("board_vendor"),
            model: read_dmi("product_name"),
            manufacturer: read_dmi("sys_vendor"),
            os_version: read_os_release(),
            kernel: read_kernel_version(),
            arch: std::env::consts::ARCH.to_string(),
            cpus: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }

    /// Render the device section body, one `Label: value` per line.
    pub fn to_report_lines(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Brand: {}", self.brand);
        let _ = writeln!(out, "Model: {}", self.model);
        let _ = writeln!(out, "Manufacturer: {}", self.manufacturer);
        let _ = writeln!(out, "OS version: {}", self.os_version);
        let _ = writeln!(out, "Kernel: {}", self.kernel);
        let _ = writeln!(out, "Architecture: {}", self.arch);
        let _ = writeln!(out, "CPUs: {}", self.cpus);
        out
    }
}

fn read_dmi(field: &str) -> String {
    std::fs::read_to_string(format!("/sys/devices/virtual/dmi/id/{field}"))
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn read_os_release() -> String {
    std::fs::read_to_string("/etc/os-release")
        .ok()
        .and_then(|content| parse_pretty_name(&content))
        .unwrap_or_else(|| std::env::consts::OS.to_string())
}

fn parse_pretty_name(os_release: &str) -> Option<String> {
    os_release
        .lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|v| v.trim().trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
}

fn read_kernel_version() -> String {
    std::fs::read_to_string("/proc/version")
        .ok()
        .and_then(|v| v.split_whitespace().nth(2).map(String::from))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

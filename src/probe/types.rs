use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::config;
use crate::desktop::DesktopError;

/// Configuration for a single probe run
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Path of the executable to launch
    pub app_path: PathBuf,

    /// Arguments to pass to the executable
    pub args: Vec<String>,

    /// Title fragment identifying the application's window
    pub window_title: String,

    /// Maximum time to wait for the window to appear
    pub window_timeout: Duration,

    /// Pause between window queries
    pub poll_interval: Duration,

    /// Directory where the evidence screenshot and report are written
    pub output_dir: PathBuf,

    /// Where the best-effort diagnostic screenshot goes on query failures
    pub debug_screenshot: PathBuf,

    /// Whether to write `launch_report.json` next to the evidence
    pub write_report: bool,

    /// Suppress per-stage progress lines (failures still go to stderr)
    pub quiet: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        let cfg = config::get();
        Self {
            app_path: PathBuf::from(&cfg.app.path),
            args: Vec::new(),
            window_title: cfg.app.window_title.clone(),
            window_timeout: Duration::from_secs(cfg.discovery.window_timeout_secs),
            poll_interval: Duration::from_millis(cfg.discovery.poll_interval_ms),
            output_dir: PathBuf::from("./probe_evidence"),
            debug_screenshot: PathBuf::from(config::DEBUG_SCREENSHOT_NAME),
            write_report: true,
            quiet: false,
        }
    }
}

/// Outcome record for one probe run
///
/// On an error-free run `exit_code` is `0` exactly when `launched` and
/// `window_found` both hold; any automation failure forces `1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchResult {
    /// Whether the target process was started
    pub launched: bool,

    /// Whether a matching window was discovered
    pub window_found: bool,

    /// Path of the evidence screenshot (success path only)
    pub screenshot_path: Option<PathBuf>,

    /// Process exit status for the probe: 0 = pass, 1 = fail
    pub exit_code: i32,

    /// Failure description, if any stage failed
    pub error: Option<String>,

    /// When the run finished
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

impl LaunchResult {
    /// A fresh result with every stage still pending (fails until proven otherwise)
    pub fn pending() -> Self {
        Self {
            launched: false,
            window_found: false,
            screenshot_path: None,
            exit_code: 1,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Record a stage failure and keep the failing exit status
    pub fn fail(mut self, error: &ProbeError) -> Self {
        self.error = Some(error.to_string());
        self.exit_code = 1;
        self.timestamp = Utc::now();
        self
    }

    /// Mark the run as fully successful
    pub fn pass(mut self) -> Self {
        self.exit_code = 0;
        self.timestamp = Utc::now();
        self
    }
}

/// Result type for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Error types for probe operations
#[derive(Debug)]
pub enum ProbeError {
    /// The executable could not be started
    Launch(String),

    /// No matching window appeared within the discovery timeout
    WindowNotFound { title: String, waited: Duration },

    /// The automation tool failed while probing, capturing or closing
    WindowQuery(DesktopError),

    /// I/O error while writing evidence
    Io(std::io::Error),
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeError::Launch(msg) => write!(f, "could not start application: {}", msg),
            ProbeError::WindowNotFound { title, waited } => write!(
                f,
                "no window matching '{}' after {:.1}s",
                title,
                waited.as_secs_f64()
            ),
            ProbeError::WindowQuery(err) => write!(f, "error checking window: {}", err),
            ProbeError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::WindowQuery(err) => Some(err),
            ProbeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DesktopError> for ProbeError {
    fn from(err: DesktopError) -> Self {
        match err {
            DesktopError::Launch(msg) => ProbeError::Launch(msg),
            other => ProbeError::WindowQuery(other),
        }
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        ProbeError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_result_fails_by_default() {
        let result = LaunchResult::pending();
        assert!(!result.launched);
        assert!(!result.window_found);
        assert!(result.screenshot_path.is_none());
        assert_eq!(result.exit_code, 1);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_pass_and_fail_set_exit_code() {
        let result = LaunchResult::pending().pass();
        assert_eq!(result.exit_code, 0);

        let err = ProbeError::Launch("missing".to_string());
        let result = LaunchResult::pending().fail(&err);
        assert_eq!(result.exit_code, 1);
        assert!(result.error.unwrap().contains("missing"));
    }

    #[test]
    fn test_window_not_found_display() {
        let err = ProbeError::WindowNotFound {
            title: "Labelle".to_string(),
            waited: Duration::from_secs(10),
        };
        assert_eq!(err.to_string(), "no window matching 'Labelle' after 10.0s");
    }

    #[test]
    fn test_desktop_error_conversion() {
        let err: ProbeError = DesktopError::Launch("denied".to_string()).into();
        assert!(matches!(err, ProbeError::Launch(_)));

        let err: ProbeError = DesktopError::Query("display gone".to_string()).into();
        assert!(matches!(err, ProbeError::WindowQuery(_)));

        let err: ProbeError = DesktopError::Capture("no tool".to_string()).into();
        assert!(matches!(err, ProbeError::WindowQuery(_)));
    }

    #[test]
    fn test_launch_result_serde_roundtrip() {
        let result = LaunchResult {
            launched: true,
            window_found: true,
            screenshot_path: Some(PathBuf::from("/tmp/x.png")),
            exit_code: 0,
            error: None,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: LaunchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.exit_code, 0);
        assert_eq!(back.screenshot_path, result.screenshot_path);
    }
}

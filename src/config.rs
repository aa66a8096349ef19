//! Configuration management with environment variable support.
//!
//! This module provides centralized configuration for the launch probe,
//! supporting:
//! - Environment variables for all configurable values
//! - Sensible defaults that match the original hardcoded values
//! - A cached global configuration for the common path
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `LABELLE_APP_PATH` | Path of the executable under test | `./zig-out/bin/labelle-gui` |
//! | `LABELLE_PROBE_TITLE` | Window-title fragment to match | `Labelle` |
//! | `LABELLE_PROBE_TIMEOUT` | Window-discovery timeout (seconds) | `10` |
//! | `LABELLE_PROBE_POLL_MS` | Poll interval while waiting for the window (ms) | `250` |
//! | `LABELLE_PROBE_SESSION_DIR` | Base directory for probe sessions | `/tmp/labelle-probe` |
//!
//! # Example
//!
//! ```bash
//! # Probe a locally built binary with a longer startup allowance
//! export LABELLE_APP_PATH="./target/release/labelle-gui"
//! export LABELLE_PROBE_TIMEOUT="30"
//! ```

use std::env;
use std::sync::OnceLock;

// ============================================================================
// Default Values (matching original hardcoded values)
// ============================================================================

/// Default path of the executable under test
pub const DEFAULT_APP_PATH: &str = "./zig-out/bin/labelle-gui";

/// Default window-title fragment to look for
pub const DEFAULT_WINDOW_TITLE: &str = "Labelle";

/// Default window-discovery timeout (seconds)
pub const DEFAULT_WINDOW_TIMEOUT_SECS: u64 = 10;

/// Default poll interval while waiting for the window (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Default session base directory
pub const DEFAULT_SESSION_DIR: &str = "/tmp/labelle-probe";

/// File name of the best-effort diagnostic screenshot
pub const DEBUG_SCREENSHOT_NAME: &str = "debug_screenshot.png";

// ============================================================================
// Environment Variable Names
// ============================================================================

/// Environment variable for the executable path
pub const ENV_APP_PATH: &str = "LABELLE_APP_PATH";

/// Environment variable for the window-title fragment
pub const ENV_WINDOW_TITLE: &str = "LABELLE_PROBE_TITLE";

/// Environment variable for the window-discovery timeout
pub const ENV_WINDOW_TIMEOUT: &str = "LABELLE_PROBE_TIMEOUT";

/// Environment variable for the poll interval
pub const ENV_POLL_INTERVAL: &str = "LABELLE_PROBE_POLL_MS";

/// Environment variable for the session base directory
pub const ENV_SESSION_DIR: &str = "LABELLE_PROBE_SESSION_DIR";

// ============================================================================
// Configuration Getters (with caching)
// ============================================================================

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Centralized configuration for the launch probe
#[derive(Debug, Clone)]
pub struct Config {
    /// Target application settings
    pub app: AppSettings,
    /// Window-discovery settings
    pub discovery: DiscoverySettings,
    /// Session configuration
    pub session: SessionSettings,
}

/// Settings for the application under test
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Path of the executable to launch
    pub path: String,
    /// Title fragment identifying the application's window
    pub window_title: String,
}

/// Settings for the window-discovery poll loop
#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    /// Maximum time to wait for the window (seconds)
    pub window_timeout_secs: u64,
    /// Interval between window queries (milliseconds)
    pub poll_interval_ms: u64,
}

/// Session-related settings
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Base directory for session storage
    pub base_dir: String,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            app: AppSettings::from_env(),
            discovery: DiscoverySettings::from_env(),
            session: SessionSettings::from_env(),
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            app: AppSettings::defaults(),
            discovery: DiscoverySettings::defaults(),
            session: SessionSettings::defaults(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl AppSettings {
    /// Create app settings from environment variables
    pub fn from_env() -> Self {
        Self {
            path: env::var(ENV_APP_PATH).unwrap_or_else(|_| DEFAULT_APP_PATH.to_string()),
            window_title: env::var(ENV_WINDOW_TITLE)
                .unwrap_or_else(|_| DEFAULT_WINDOW_TITLE.to_string()),
        }
    }

    /// Create app settings with defaults
    pub fn defaults() -> Self {
        Self {
            path: DEFAULT_APP_PATH.to_string(),
            window_title: DEFAULT_WINDOW_TITLE.to_string(),
        }
    }
}

impl DiscoverySettings {
    /// Create discovery settings from environment variables
    pub fn from_env() -> Self {
        Self {
            window_timeout_secs: env::var(ENV_WINDOW_TIMEOUT)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_WINDOW_TIMEOUT_SECS),
            poll_interval_ms: env::var(ENV_POLL_INTERVAL)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Create discovery settings with defaults
    pub fn defaults() -> Self {
        Self {
            window_timeout_secs: DEFAULT_WINDOW_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl SessionSettings {
    /// Create session settings from environment variables
    pub fn from_env() -> Self {
        Self {
            base_dir: env::var(ENV_SESSION_DIR)
                .unwrap_or_else(|_| DEFAULT_SESSION_DIR.to_string()),
        }
    }

    /// Create session settings with defaults
    pub fn defaults() -> Self {
        Self {
            base_dir: DEFAULT_SESSION_DIR.to_string(),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Get the target application path (convenience function)
pub fn app_path() -> String {
    get().app.path.clone()
}

/// Get the window-title fragment (convenience function)
pub fn window_title() -> String {
    get().app.window_title.clone()
}

/// Get the window-discovery timeout in seconds (convenience function)
pub fn window_timeout_secs() -> u64 {
    get().discovery.window_timeout_secs
}

/// Get the poll interval in milliseconds (convenience function)
pub fn poll_interval_ms() -> u64 {
    get().discovery.poll_interval_ms
}

/// Get the session base directory (convenience function)
pub fn session_base_dir() -> String {
    get().session.base_dir.clone()
}

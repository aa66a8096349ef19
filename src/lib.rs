//! Labelle Probe - end-to-end launch smoke testing for desktop applications.
//!
//! This crate provides:
//! - A launch probe that starts a target executable, waits for its window,
//!   captures screenshot evidence and requests a clean close
//! - A desktop backend abstraction over process/window/screenshot primitives
//! - An X11 backend (xdotool + ImageMagick) and a MockDesktop for testing
//! - Session management for organized evidence files
//!
//! # Example
//!
//! ```rust,no_run
//! use labelle_probe::desktop::MockDesktop;
//! use labelle_probe::probe::{ProbeConfig, run_probe};
//!
//! let mut desktop = MockDesktop::new(800, 600).with_window("Labelle Designer");
//! let result = run_probe(&mut desktop, &ProbeConfig::default());
//! assert_eq!(result.exit_code, 0);
//! ```

pub mod config;
pub mod desktop;
pub mod probe;
pub mod session;

// Re-export desktop types and backends
pub use desktop::{
    DesktopBackend, DesktopError, DesktopResult, MockDesktop, ScreenCapture, WindowRef,
    XdotoolBackend,
};

// Re-export probe types
pub use probe::{LaunchResult, ProbeConfig, ProbeError, ProbeResult, run_probe};

// Re-export session management
pub use session::{Session, cleanup_old_sessions, list_sessions};

//! Desktop backend abstraction over process, window and screenshot primitives.
//!
//! The probe itself never talks to a windowing system directly; it drives one
//! of these backends:
//! - `XdotoolBackend` for real X11 desktops
//! - `MockDesktop` for testing

use std::path::Path;

use super::types::{DesktopResult, ScreenCapture, WindowRef};

/// Trait for desktop automation backends
///
/// Implementations provide the four primitives the probe needs:
/// launching the target process, looking up a top-level window by title
/// fragment, capturing the full screen, and requesting a window close.
pub trait DesktopBackend: Send {
    /// Start the target executable as a child process, returning its pid
    fn launch(&mut self, path: &Path, args: &[String]) -> DesktopResult<u32>;

    /// Look up a visible top-level window whose title contains `fragment`.
    ///
    /// `Ok(None)` means "no match yet"; `Err` means the windowing system
    /// itself could not be queried.
    fn find_window(&mut self, fragment: &str) -> DesktopResult<Option<WindowRef>>;

    /// Capture the full screen as a PNG
    fn capture_screen(&mut self) -> DesktopResult<ScreenCapture>;

    /// Ask the windowing system to close the given window.
    ///
    /// This is a request only; whether the process exits is not observed.
    fn close_window(&mut self, window: &WindowRef) -> DesktopResult<()>;

    /// Get the source type identifier (e.g. "x11", "mock")
    fn source_type(&self) -> &str;
}

// Core types for desktop automation primitives

use serde::{Deserialize, Serialize};

/// A top-level window discovered on the desktop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRef {
    /// Windowing-system identifier
    pub id: u64,

    /// Full window title
    pub title: String,
}

impl WindowRef {
    /// Create a new window reference
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// Result of a full-screen capture
#[derive(Debug, Clone)]
pub struct ScreenCapture {
    /// PNG-encoded image data
    pub image_data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Optional metadata about the capture
    pub metadata: Option<serde_json::Value>,
}

/// Result type for desktop operations
pub type DesktopResult<T> = Result<T, DesktopError>;

/// Error types for desktop operations
#[derive(Debug)]
pub enum DesktopError {
    /// The target executable could not be started
    Launch(String),

    /// The windowing system could not be queried
    Query(String),

    /// Screen capture failed
    Capture(String),

    /// I/O error
    Io(std::io::Error),
}

impl std::fmt::Display for DesktopError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DesktopError::Launch(msg) => write!(f, "Launch error: {}", msg),
            DesktopError::Query(msg) => write!(f, "Window query error: {}", msg),
            DesktopError::Capture(msg) => write!(f, "Capture error: {}", msg),
            DesktopError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for DesktopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DesktopError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DesktopError {
    fn from(err: std::io::Error) -> Self {
        DesktopError::Io(err)
    }
}

impl From<image::ImageError> for DesktopError {
    fn from(err: image::ImageError) -> Self {
        DesktopError::Capture(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_ref_new() {
        let window = WindowRef::new(42, "Labelle Designer");
        assert_eq!(window.id, 42);
        assert_eq!(window.title, "Labelle Designer");
    }

    #[test]
    fn test_error_display() {
        let err = DesktopError::Launch("no such file".to_string());
        assert_eq!(err.to_string(), "Launch error: no such file");

        let err = DesktopError::Query("display unavailable".to_string());
        assert!(err.to_string().contains("display unavailable"));
    }
}

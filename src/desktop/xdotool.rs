//! X11 desktop backend driven by external automation tools.
//!
//! Window lookup and teardown go through `xdotool`; the full-screen capture
//! shells out to ImageMagick's `import` with a `scrot` fallback. Both tools
//! are treated as opaque capabilities: any non-zero exit or missing binary
//! surfaces as a query/capture error, never a panic.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use super::backend::DesktopBackend;
use super::types::{DesktopError, DesktopResult, ScreenCapture, WindowRef};

/// Desktop backend for real X11 sessions
pub struct XdotoolBackend {
    /// The launched application, held so the child is not reaped early
    child: Option<Child>,
    /// Directory for transient capture files
    scratch_dir: PathBuf,
}

impl XdotoolBackend {
    /// Create a backend writing transient captures under the system temp dir
    pub fn new() -> Self {
        Self {
            child: None,
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Create a backend with a specific scratch directory
    pub fn with_scratch_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            child: None,
            scratch_dir: dir.into(),
        }
    }

    /// Pid of the launched application, if any
    pub fn child_pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    fn scratch_capture_path(&self) -> PathBuf {
        self.scratch_dir
            .join(format!("labelle_probe_screen_{}.png", std::process::id()))
    }
}

impl Default for XdotoolBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopBackend for XdotoolBackend {
    fn launch(&mut self, path: &Path, args: &[String]) -> DesktopResult<u32> {
        let child = Command::new(path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                DesktopError::Launch(format!("failed to start '{}': {}", path.display(), e))
            })?;
        let pid = child.id();
        self.child = Some(child);
        Ok(pid)
    }

    fn find_window(&mut self, fragment: &str) -> DesktopResult<Option<WindowRef>> {
        let output = Command::new("xdotool")
            .args(["search", "--onlyvisible", "--name", fragment])
            .output()
            .map_err(|e| DesktopError::Query(format!("xdotool unavailable: {}", e)))?;

        // No match is a plain non-zero exit; an unusable display also reports
        // on stderr, and that distinction is what separates "not yet" from a
        // query failure
        if !output.status.success() && !output.stderr.is_empty() {
            return Err(DesktopError::Query(format!(
                "xdotool search failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let Some(id) = stdout.lines().find_map(|line| line.trim().parse::<u64>().ok()) else {
            return Ok(None);
        };

        let name_output = Command::new("xdotool")
            .args(["getwindowname", &id.to_string()])
            .output()
            .map_err(|e| DesktopError::Query(format!("xdotool unavailable: {}", e)))?;
        let title = String::from_utf8_lossy(&name_output.stdout).trim().to_string();

        Ok(Some(WindowRef::new(id, title)))
    }

    fn capture_screen(&mut self) -> DesktopResult<ScreenCapture> {
        let capture_path = self.scratch_capture_path();
        let _ = std::fs::remove_file(&capture_path);

        let import_status = Command::new("import")
            .args(["-window", "root", "-silent"])
            .arg(&capture_path)
            .status();

        let captured = match import_status {
            Ok(status) if status.success() => true,
            _ => {
                // ImageMagick missing or failed; scrot is the usual fallback
                let scrot_status = Command::new("scrot")
                    .arg(&capture_path)
                    .status()
                    .map_err(|e| {
                        DesktopError::Capture(format!("no screenshot tool available: {}", e))
                    })?;
                scrot_status.success()
            }
        };
        if !captured {
            return Err(DesktopError::Capture(
                "screenshot tool exited with failure".to_string(),
            ));
        }

        let image_data = std::fs::read(&capture_path)?;
        let _ = std::fs::remove_file(&capture_path);

        use image::GenericImageView;
        let decoded = image::load_from_memory(&image_data)
            .map_err(|e| DesktopError::Capture(format!("unreadable screenshot: {}", e)))?;

        Ok(ScreenCapture {
            width: decoded.width(),
            height: decoded.height(),
            image_data,
            metadata: Some(serde_json::json!({
                "display": std::env::var("DISPLAY").unwrap_or_default(),
            })),
        })
    }

    fn close_window(&mut self, window: &WindowRef) -> DesktopResult<()> {
        let status = Command::new("xdotool")
            .args(["windowclose", &window.id.to_string()])
            .status()
            .map_err(|e| DesktopError::Query(format!("xdotool unavailable: {}", e)))?;
        if !status.success() {
            return Err(DesktopError::Query(format!(
                "xdotool windowclose {} failed",
                window.id
            )));
        }
        Ok(())
    }

    fn source_type(&self) -> &str {
        "x11"
    }
}

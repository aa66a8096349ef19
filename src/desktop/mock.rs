//! A simulated desktop for testing and fixture generation.
//!
//! `MockDesktop` keeps an RGB framebuffer and a registry of fake windows.
//! Capturing paints every visible window onto the framebuffer (frame, title
//! bar, title text) and encodes the result as PNG, so tests exercise the same
//! evidence path as a real desktop. Windows can be configured to appear only
//! after a number of queries, and each primitive can be made to fail, which
//! is how the probe's timeout and error paths are tested.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{ImageBuffer, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use super::backend::DesktopBackend;
use super::types::{DesktopError, DesktopResult, ScreenCapture, WindowRef};

const TITLE_BAR_HEIGHT: u32 = 24;
const WINDOW_CASCADE_STEP: u32 = 30;

/// A fake window on the mock desktop
#[derive(Debug, Clone)]
struct MockWindow {
    id: u64,
    title: String,
    /// Number of `find_window` calls remaining before this window is visible
    appears_after: u32,
}

/// A simulated desktop with a drawable framebuffer and a window registry
///
/// Drawing API for creating test fixtures:
/// - `fill()` - Fill the whole screen with a color
/// - `draw_rect()` - Draw a filled rectangle
/// - `draw_text()` - Draw text using font8x8 glyphs
/// - `get_pixel()` / `set_pixel()` - Direct pixel access
#[derive(Debug, Clone)]
pub struct MockDesktop {
    /// Screen width in pixels
    width: u32,
    /// Screen height in pixels
    height: u32,
    /// RGB pixel buffer (row-major, 3 bytes per pixel)
    buffer: Vec<u8>,
    /// Desktop background color
    wallpaper: [u8; 3],
    /// Registered windows, in creation order
    windows: Vec<MockWindow>,
    next_window_id: u64,
    /// Number of `find_window` calls seen so far
    query_count: u32,
    /// Executables "launched" on this desktop
    launched: Vec<PathBuf>,
    /// Window ids that received a close request
    closed: Vec<u64>,
    fail_launch: Option<String>,
    fail_query: Option<String>,
    fail_capture: Option<String>,
}

impl MockDesktop {
    /// Create a mock desktop with the given screen dimensions
    pub fn new(width: u32, height: u32) -> Self {
        let wallpaper = [16, 32, 48];
        let buffer = vec![0u8; (width * height * 3) as usize];
        let mut desktop = Self {
            width,
            height,
            buffer,
            wallpaper,
            windows: Vec::new(),
            next_window_id: 1,
            query_count: 0,
            launched: Vec::new(),
            closed: Vec::new(),
            fail_launch: None,
            fail_query: None,
            fail_capture: None,
        };
        desktop.fill(wallpaper);
        desktop
    }

    /// Set the desktop background color
    pub fn with_wallpaper(mut self, color: [u8; 3]) -> Self {
        self.wallpaper = color;
        self.fill(color);
        self
    }

    /// Add a window that is visible immediately
    pub fn with_window(self, title: impl Into<String>) -> Self {
        self.with_window_after(title, 0)
    }

    /// Add a window that becomes visible only after `queries` window lookups
    pub fn with_window_after(mut self, title: impl Into<String>, queries: u32) -> Self {
        let id = self.next_window_id;
        self.next_window_id += 1;
        self.windows.push(MockWindow {
            id,
            title: title.into(),
            appears_after: queries,
        });
        self
    }

    /// Make every launch attempt fail with the given message
    pub fn failing_launch(mut self, message: impl Into<String>) -> Self {
        self.fail_launch = Some(message.into());
        self
    }

    /// Make every window query fail with the given message
    pub fn failing_query(mut self, message: impl Into<String>) -> Self {
        self.fail_query = Some(message.into());
        self
    }

    /// Make every screen capture fail with the given message
    pub fn failing_capture(mut self, message: impl Into<String>) -> Self {
        self.fail_capture = Some(message.into());
        self
    }

    /// Executables launched on this desktop, in order
    pub fn launched(&self) -> &[PathBuf] {
        &self.launched
    }

    /// Window ids that received a close request, in order
    pub fn closed(&self) -> &[u64] {
        &self.closed
    }

    /// Number of window queries performed so far
    pub fn query_count(&self) -> u32 {
        self.query_count
    }

    /// Screen width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Screen height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    fn visible_windows(&self) -> impl Iterator<Item = &MockWindow> {
        self.windows
            .iter()
            .filter(|w| w.appears_after <= self.query_count)
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Fill the entire screen with a color
    pub fn fill(&mut self, color: [u8; 3]) {
        for chunk in self.buffer.chunks_exact_mut(3) {
            chunk.copy_from_slice(&color);
        }
    }

    /// Draw a filled rectangle
    pub fn draw_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
        for py in y..(y + h).min(self.height) {
            for px in x..(x + w).min(self.width) {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Draw text using font8x8 glyphs
    ///
    /// Each character is 8x8 pixels. Text does not wrap.
    pub fn draw_text(&mut self, x: u32, y: u32, text: &str, fg: [u8; 3], bg: [u8; 3]) {
        let mut cursor_x = x;
        for ch in text.chars() {
            self.draw_char(cursor_x, y, ch, fg, bg);
            cursor_x += 8;
            if cursor_x >= self.width {
                break;
            }
        }
    }

    fn draw_char(&mut self, x: u32, y: u32, ch: char, fg: [u8; 3], bg: [u8; 3]) {
        let glyph = BASIC_FONTS.get(ch).unwrap_or([0u8; 8]);
        for (row_idx, row) in glyph.iter().enumerate() {
            let py = y + row_idx as u32;
            if py >= self.height {
                break;
            }
            for bit in 0..8 {
                let px = x + bit;
                if px >= self.width {
                    break;
                }
                // font8x8 stores LSB as leftmost pixel
                let is_fg = (row >> bit) & 1 == 1;
                let color = if is_fg { fg } else { bg };
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Get the color of a pixel
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0];
        }
        let idx = ((y * self.width + x) * 3) as usize;
        [self.buffer[idx], self.buffer[idx + 1], self.buffer[idx + 2]]
    }

    /// Set the color of a pixel
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        self.buffer[idx..idx + 3].copy_from_slice(&color);
    }

    /// Paint every visible window onto the framebuffer as cascading frames
    /// with a title bar and title text
    pub fn paint_windows(&mut self) {
        self.fill(self.wallpaper);
        let frame_w = (self.width / 2).max(1);
        let frame_h = (self.height / 2).max(1);
        let visible: Vec<(u64, String)> = self
            .visible_windows()
            .map(|w| (w.id, w.title.clone()))
            .collect();
        for (index, (_, title)) in visible.iter().enumerate() {
            let offset = WINDOW_CASCADE_STEP * index as u32;
            let x = (40 + offset).min(self.width.saturating_sub(1));
            let y = (40 + offset).min(self.height.saturating_sub(1));
            self.draw_rect(x, y, frame_w, frame_h, [230, 230, 230]);
            self.draw_rect(x, y, frame_w, TITLE_BAR_HEIGHT, [52, 86, 120]);
            self.draw_text(x + 8, y + 8, title, [255, 255, 255], [52, 86, 120]);
        }
    }

    /// Convert the framebuffer to an image buffer
    pub fn to_image(&self) -> RgbImage {
        ImageBuffer::from_raw(self.width, self.height, self.buffer.clone())
            .expect("Buffer size should match dimensions")
    }

    /// Encode the framebuffer as PNG bytes
    pub fn to_png(&self) -> DesktopResult<Vec<u8>> {
        let img = self.to_image();
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| DesktopError::Capture(format!("Failed to encode PNG: {}", e)))?;
        Ok(bytes)
    }
}

impl DesktopBackend for MockDesktop {
    fn launch(&mut self, path: &Path, _args: &[String]) -> DesktopResult<u32> {
        if let Some(msg) = &self.fail_launch {
            return Err(DesktopError::Launch(msg.clone()));
        }
        self.launched.push(path.to_path_buf());
        Ok(10_000 + self.launched.len() as u32)
    }

    fn find_window(&mut self, fragment: &str) -> DesktopResult<Option<WindowRef>> {
        if let Some(msg) = &self.fail_query {
            return Err(DesktopError::Query(msg.clone()));
        }
        self.query_count += 1;
        Ok(self
            .visible_windows()
            .find(|w| w.title.contains(fragment))
            .map(|w| WindowRef::new(w.id, w.title.clone())))
    }

    fn capture_screen(&mut self) -> DesktopResult<ScreenCapture> {
        if let Some(msg) = &self.fail_capture {
            return Err(DesktopError::Capture(msg.clone()));
        }
        self.paint_windows();
        let image_data = self.to_png()?;
        Ok(ScreenCapture {
            image_data,
            width: self.width,
            height: self.height,
            metadata: Some(serde_json::json!({
                "mock": true,
                "windows": self.visible_windows().count(),
            })),
        })
    }

    fn close_window(&mut self, window: &WindowRef) -> DesktopResult<()> {
        let Some(pos) = self.windows.iter().position(|w| w.id == window.id) else {
            return Err(DesktopError::Query(format!(
                "no window with id {}",
                window.id
            )));
        };
        self.windows.remove(pos);
        self.closed.push(window.id);
        Ok(())
    }

    fn source_type(&self) -> &str {
        "mock"
    }
}

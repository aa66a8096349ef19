//! Session management for organized evidence handling.
//!
//! Provides centralized management of probe sessions with:
//! - Unique session directories under a global base location
//! - Automatic cleanup of scratch sessions unless explicitly preserved
//! - Session metadata tracking

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config;

/// A probe session with organized file management
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session ID
    pub id: String,
    /// Root directory for this session
    pub dir: PathBuf,
    /// Whether to keep files after the session ends
    pub keep: bool,
}

impl Session {
    /// Create a new session with a unique ID
    pub fn new() -> Self {
        let id = generate_session_id();
        let dir = PathBuf::from(config::session_base_dir()).join(&id);

        Self {
            id,
            dir,
            keep: false,
        }
    }

    /// Create a session with a specific name/prefix
    pub fn with_name(name: &str) -> Self {
        let timestamp = generate_timestamp_suffix();
        let id = format!("{}_{}", sanitize_name(name), timestamp);
        let dir = PathBuf::from(config::session_base_dir()).join(&id);

        Self {
            id,
            dir,
            keep: false,
        }
    }

    /// Create a session in a specific directory
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let id = dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(generate_session_id);

        Self {
            id,
            dir,
            // User-specified directories are kept by default
            keep: true,
        }
    }

    /// Set whether to keep files after the session ends
    pub fn keep(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }

    /// Initialize the session directory
    pub fn init(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let metadata = serde_json::json!({
            "id": self.id,
            "created": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_path = self.dir.join(".session.json");
        fs::write(metadata_path, serde_json::to_string_pretty(&metadata)?)?;

        Ok(())
    }

    /// Get the path for a named capture file
    pub fn capture_path(&self, name: &str) -> PathBuf {
        let filename = format!("{}.png", sanitize_name(name));
        self.dir.join(filename)
    }

    /// List all PNG files in the session
    pub fn list_captures(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut captures = Vec::new();
        if self.dir.exists() {
            for entry in fs::read_dir(&self.dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.extension().map(|e| e == "png").unwrap_or(false) {
                    captures.push(path);
                }
            }
        }
        captures.sort();
        Ok(captures)
    }

    /// Clean up the session directory
    pub fn cleanup(&self) -> std::io::Result<()> {
        if self.dir.exists() && !self.keep {
            fs::remove_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.keep {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }
}

/// Generate a unique session ID
fn generate_session_id() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let pid = std::process::id();
    format!("session_{}_{}", timestamp, pid)
}

/// Generate a timestamp suffix
fn generate_timestamp_suffix() -> String {
    chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Sanitize a name for use in filenames
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

/// Clean up sessions older than the specified duration
pub fn cleanup_old_sessions(max_age: std::time::Duration) -> std::io::Result<usize> {
    let base = PathBuf::from(config::session_base_dir());
    if !base.exists() {
        return Ok(0);
    }

    let now = SystemTime::now();
    let mut cleaned = 0;

    for entry in fs::read_dir(&base)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            if let Ok(metadata) = entry.metadata() {
                if let Ok(modified) = metadata.modified() {
                    if let Ok(age) = now.duration_since(modified) {
                        if age > max_age && fs::remove_dir_all(&path).is_ok() {
                            cleaned += 1;
                        }
                    }
                }
            }
        }
    }

    Ok(cleaned)
}

/// List all existing sessions
pub fn list_sessions() -> std::io::Result<Vec<PathBuf>> {
    let base = PathBuf::from(config::session_base_dir());
    if !base.exists() {
        return Ok(Vec::new());
    }

    let mut sessions = Vec::new();
    for entry in fs::read_dir(&base)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            sessions.push(path);
        }
    }
    sessions.sort();
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_new() {
        let session = Session::new();
        assert!(session.id.starts_with("session_"));
        assert!(!session.keep);
    }

    #[test]
    fn test_session_with_name() {
        let session = Session::with_name("labelle-gui");
        assert!(session.id.starts_with("labelle-gui_"));
    }

    #[test]
    fn test_in_dir_keeps_by_default() {
        let session = Session::in_dir("/tmp/some-evidence");
        assert!(session.keep);
        assert_eq!(session.id, "some-evidence");
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("labelle gui"), "labelle_gui");
        assert_eq!(sanitize_name("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_name("probe-1"), "probe-1");
    }

    #[test]
    fn test_capture_path() {
        let session = Session::new();
        assert!(session.capture_path("desktop").ends_with("desktop.png"));
        assert!(session.capture_path("a b").ends_with("a_b.png"));
    }

    #[test]
    fn test_list_captures_finds_only_pngs() {
        let base = tempfile::tempdir().unwrap();
        let session = Session::in_dir(base.path().join("run")).keep(true);
        session.init().unwrap();

        fs::write(session.capture_path("desktop"), b"png-bytes").unwrap();
        fs::write(session.dir.join("notes.txt"), b"text").unwrap();

        let captures = session.list_captures().unwrap();
        assert_eq!(captures.len(), 1);
        assert!(captures[0].ends_with("desktop.png"));
    }

    #[test]
    fn test_scratch_session_cleanup_on_drop() {
        let base = tempfile::tempdir().unwrap();
        let dir = base.path().join("scratch");
        {
            let session = Session::in_dir(&dir).keep(false);
            session.init().unwrap();
            assert!(dir.exists());
        }
        assert!(!dir.exists(), "scratch sessions are removed on drop");
    }
}

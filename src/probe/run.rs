//! The launch probe itself.
//!
//! One run walks a fixed sequence: launch the target, poll for a window
//! whose title contains the configured fragment, capture a full-screen
//! evidence shot, request the window to close, and report the verdict.
//! Every failure is terminal; nothing is retried. The only suspension points
//! are the blocking sleeps of the poll loop.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

use crate::desktop::{DesktopBackend, WindowRef};

use super::report::{generate_filename, generate_timestamp, write_report};
use super::types::{LaunchResult, ProbeConfig, ProbeError, ProbeResult};

/// Run the launch probe against the given backend.
///
/// Always returns a [`LaunchResult`]; failures are encoded in its
/// `exit_code` and `error` fields rather than propagated, because every
/// failure mode maps to the same terminal verdict.
pub fn run_probe(backend: &mut dyn DesktopBackend, config: &ProbeConfig) -> LaunchResult {
    let mut result = LaunchResult::pending();

    // Stage 1: launch
    match backend.launch(&config.app_path, &config.args) {
        Ok(pid) => {
            result.launched = true;
            if !config.quiet {
                println!("Launched: {} (pid {})", config.app_path.display(), pid);
            }
        }
        Err(err) => {
            let err = ProbeError::from(err);
            eprintln!("FAILED: {}", err);
            return finish(result.fail(&err), config);
        }
    }

    // Stage 2+3: bounded poll for the window
    let window = match wait_for_window(backend, config) {
        Ok(window) => window,
        Err(err) => {
            eprintln!("FAILED: {}", err);
            if matches!(err, ProbeError::WindowQuery(_)) {
                attempt_debug_screenshot(backend, &config.debug_screenshot);
            }
            return finish(result.fail(&err), config);
        }
    };
    result.window_found = true;
    if !config.quiet {
        println!("SUCCESS: Found window '{}'", window.title);
    }

    // Stage 4: evidence capture
    match capture_evidence(backend, config) {
        Ok(path) => {
            if !config.quiet {
                println!("Screenshot saved: {}", path.display());
            }
            result.screenshot_path = Some(path);
        }
        Err(err) => {
            eprintln!("FAILED: {}", err);
            attempt_debug_screenshot(backend, &config.debug_screenshot);
            return finish(result.fail(&err), config);
        }
    }

    // Stage 5: teardown (close request only; process exit is not observed)
    if let Err(err) = backend.close_window(&window) {
        let err = ProbeError::from(err);
        eprintln!("FAILED: {}", err);
        attempt_debug_screenshot(backend, &config.debug_screenshot);
        return finish(result.fail(&err), config);
    }
    if !config.quiet {
        println!("Application close requested.");
    }

    finish(result.pass(), config)
}

/// Poll for a matching window until found or the timeout elapses.
///
/// `Ok(None)` from the backend keeps the loop going; a query error ends the
/// run immediately.
fn wait_for_window(
    backend: &mut dyn DesktopBackend,
    config: &ProbeConfig,
) -> ProbeResult<WindowRef> {
    let start = Instant::now();
    loop {
        thread::sleep(config.poll_interval);
        match backend.find_window(&config.window_title) {
            Ok(Some(window)) => return Ok(window),
            Ok(None) => {
                if start.elapsed() >= config.window_timeout {
                    return Err(ProbeError::WindowNotFound {
                        title: config.window_title.clone(),
                        waited: start.elapsed(),
                    });
                }
            }
            Err(err) => return Err(ProbeError::WindowQuery(err)),
        }
    }
}

/// Capture the screen and write the evidence PNG into the output directory
fn capture_evidence(
    backend: &mut dyn DesktopBackend,
    config: &ProbeConfig,
) -> ProbeResult<PathBuf> {
    let capture = backend
        .capture_screen()
        .map_err(ProbeError::WindowQuery)?;
    fs::create_dir_all(&config.output_dir)?;
    let filename = generate_filename(backend.source_type(), &generate_timestamp());
    let path = config.output_dir.join(filename);
    fs::write(&path, &capture.image_data)?;
    Ok(path)
}

/// Best-effort diagnostic capture on the failure path.
///
/// A secondary failure here must not change the probe's verdict, so every
/// error is swallowed.
fn attempt_debug_screenshot(backend: &mut dyn DesktopBackend, path: &Path) {
    let Ok(capture) = backend.capture_screen() else {
        return;
    };
    if fs::write(path, &capture.image_data).is_ok() {
        eprintln!("Debug screenshot saved: {}", path.display());
    }
}

fn finish(result: LaunchResult, config: &ProbeConfig) -> LaunchResult {
    if config.write_report {
        if let Err(err) = write_report(&result, &config.output_dir) {
            eprintln!("Warning: could not write run report: {}", err);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::MockDesktop;
    use std::time::Duration;

    fn fast_config(output_dir: &Path) -> ProbeConfig {
        ProbeConfig {
            app_path: PathBuf::from("/opt/labelle/labelle-gui"),
            args: Vec::new(),
            window_title: "Labelle".to_string(),
            window_timeout: Duration::from_millis(50),
            poll_interval: Duration::from_millis(1),
            output_dir: output_dir.to_path_buf(),
            debug_screenshot: output_dir.join("debug_screenshot.png"),
            write_report: false,
            quiet: true,
        }
    }

    #[test]
    fn test_success_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut desktop = MockDesktop::new(320, 200).with_window("Labelle Designer");
        let result = run_probe(&mut desktop, &fast_config(dir.path()));

        assert!(result.launched);
        assert!(result.window_found);
        assert_eq!(result.exit_code, 0);
        assert!(result.error.is_none());
        assert!(result.screenshot_path.unwrap().exists());
        assert_eq!(desktop.closed().len(), 1);
    }

    #[test]
    fn test_launch_failure_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let mut desktop = MockDesktop::new(320, 200)
            .with_window("Labelle")
            .failing_launch("no such file");
        let result = run_probe(&mut desktop, &fast_config(dir.path()));

        assert!(!result.launched);
        assert!(!result.window_found);
        assert_eq!(result.exit_code, 1);
        assert!(result.screenshot_path.is_none());
        // No close is ever attempted when the launch fails
        assert!(desktop.closed().is_empty());
        assert_eq!(desktop.query_count(), 0);
    }

    #[test]
    fn test_window_never_appears_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut desktop = MockDesktop::new(320, 200);
        let result = run_probe(&mut desktop, &fast_config(dir.path()));

        assert!(result.launched);
        assert!(!result.window_found);
        assert_eq!(result.exit_code, 1);
        assert!(result.error.unwrap().contains("no window matching"));
        assert!(desktop.closed().is_empty());
        assert!(desktop.query_count() > 1, "the probe should keep polling");
    }

    #[test]
    fn test_slow_window_is_found_by_polling() {
        let dir = tempfile::tempdir().unwrap();
        let mut desktop = MockDesktop::new(320, 200).with_window_after("Labelle", 5);
        let result = run_probe(&mut desktop, &fast_config(dir.path()));

        assert!(result.window_found);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn test_query_error_writes_debug_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let config = fast_config(dir.path());
        let mut desktop = MockDesktop::new(320, 200).failing_query("display gone");
        let result = run_probe(&mut desktop, &config);

        assert_eq!(result.exit_code, 1);
        assert!(result.error.unwrap().contains("display gone"));
        // The diagnostic capture itself succeeded here
        assert!(config.debug_screenshot.exists());
    }

    #[test]
    fn test_debug_screenshot_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let config = fast_config(dir.path());
        let mut desktop = MockDesktop::new(320, 200)
            .failing_query("display gone")
            .failing_capture("also gone");
        let result = run_probe(&mut desktop, &config);

        assert_eq!(result.exit_code, 1);
        assert!(result.error.unwrap().contains("display gone"));
        assert!(!config.debug_screenshot.exists());
    }

    #[test]
    fn test_capture_failure_after_discovery_fails_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut desktop = MockDesktop::new(320, 200)
            .with_window("Labelle")
            .failing_capture("no tool");
        let result = run_probe(&mut desktop, &fast_config(dir.path()));

        assert!(result.window_found);
        assert_eq!(result.exit_code, 1);
        assert!(result.screenshot_path.is_none());
    }

    #[test]
    fn test_report_written_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = fast_config(dir.path());
        config.write_report = true;
        let mut desktop = MockDesktop::new(320, 200).with_window("Labelle");
        let result = run_probe(&mut desktop, &config);

        assert_eq!(result.exit_code, 0);
        assert!(dir.path().join("launch_report.json").exists());
    }

    #[test]
    fn test_idempotent_across_runs() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let mut first = MockDesktop::new(320, 200).with_window("Labelle");
        let mut second = MockDesktop::new(320, 200).with_window("Labelle");

        let a = run_probe(&mut first, &fast_config(dir_a.path()));
        let b = run_probe(&mut second, &fast_config(dir_b.path()));

        assert_eq!(a.exit_code, b.exit_code);
        assert_eq!(a.launched, b.launched);
        assert_eq!(a.window_found, b.window_found);
    }
}

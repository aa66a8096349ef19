//! Integration tests for the full launch-probe workflow

use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::time::Duration;

use labelle_probe::desktop::MockDesktop;
use labelle_probe::probe::{LaunchResult, ProbeConfig, REPORT_FILENAME, run_probe};

fn probe_config(output_dir: &std::path::Path) -> ProbeConfig {
    ProbeConfig {
        app_path: PathBuf::from("/opt/labelle/labelle-gui"),
        args: Vec::new(),
        window_title: "Labelle".to_string(),
        window_timeout: Duration::from_millis(60),
        poll_interval: Duration::from_millis(1),
        output_dir: output_dir.to_path_buf(),
        debug_screenshot: output_dir.join("debug_screenshot.png"),
        write_report: true,
        quiet: true,
    }
}

#[test]
fn test_full_probe_pass() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut desktop = MockDesktop::new(640, 400).with_window("Labelle Designer 1.2");

    let result = run_probe(&mut desktop, &probe_config(dir.path()));

    assert_eq!(result.exit_code, 0);
    assert!(result.launched);
    assert!(result.window_found);
    assert!(result.error.is_none());

    // Evidence screenshot exists and is a PNG
    let screenshot = result.screenshot_path.expect("screenshot path recorded");
    let bytes = std::fs::read(&screenshot).expect("screenshot readable");
    assert_eq!(&bytes[0..4], &[0x89, 0x50, 0x4E, 0x47]);

    // The close request reached the window
    assert_eq!(desktop.closed().len(), 1);
}

#[test]
fn test_probe_report_roundtrip() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut desktop = MockDesktop::new(640, 400).with_window("Labelle");

    let result = run_probe(&mut desktop, &probe_config(dir.path()));
    assert_eq!(result.exit_code, 0);

    let report_path = dir.path().join(REPORT_FILENAME);
    let body = std::fs::read_to_string(&report_path).expect("report readable");
    let report: LaunchResult = serde_json::from_str(&body).expect("report parses");

    assert_eq!(report.exit_code, 0);
    assert!(report.launched);
    assert!(report.window_found);
    assert_eq!(report.screenshot_path, result.screenshot_path);
}

#[test]
fn test_missing_executable_fails_without_close() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut desktop = MockDesktop::new(640, 400)
        .with_window("Labelle")
        .failing_launch("No such file or directory");

    let result = run_probe(&mut desktop, &probe_config(dir.path()));

    assert_eq!(result.exit_code, 1);
    assert!(!result.launched);
    assert!(result.screenshot_path.is_none());
    assert!(desktop.closed().is_empty());
    // No evidence screenshot was produced either
    let pngs: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|x| x == "png").unwrap_or(false))
        .collect();
    assert!(pngs.is_empty());
}

#[test]
fn test_headless_target_times_out() {
    // The /bin/true scenario: the process starts but never opens a window
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut desktop = MockDesktop::new(640, 400);

    let result = run_probe(&mut desktop, &probe_config(dir.path()));

    assert_eq!(result.exit_code, 1);
    assert!(result.launched);
    assert!(!result.window_found);
    assert!(desktop.query_count() > 1);
    assert!(desktop.closed().is_empty());
}

#[test]
fn test_query_error_leaves_debug_screenshot() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = probe_config(dir.path());
    let mut desktop = MockDesktop::new(640, 400).failing_query("cannot open display :0");

    let result = run_probe(&mut desktop, &config);

    assert_eq!(result.exit_code, 1);
    assert!(config.debug_screenshot.exists());
}

#[test]
fn test_query_error_with_broken_capture_still_exits_one() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = probe_config(dir.path());
    let mut desktop = MockDesktop::new(640, 400)
        .failing_query("cannot open display :0")
        .failing_capture("capture backend offline");

    let result = run_probe(&mut desktop, &config);

    // The diagnostic capture failed, which must not mask the verdict
    assert_eq!(result.exit_code, 1);
    assert!(!config.debug_screenshot.exists());
}

#[test]
fn test_exit_code_matches_stage_outcomes() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let scenarios: Vec<(MockDesktop, bool, bool)> = vec![
        (MockDesktop::new(320, 200).with_window("Labelle"), true, true),
        (MockDesktop::new(320, 200).failing_launch("denied"), false, false),
        (MockDesktop::new(320, 200), true, false),
    ];

    for (i, (mut desktop, launched, window_found)) in scenarios.into_iter().enumerate() {
        let sub = dir.path().join(format!("run_{}", i));
        let result = run_probe(&mut desktop, &probe_config(&sub));
        assert_eq!(result.launched, launched);
        assert_eq!(result.window_found, window_found);
        let expected = if launched && window_found { 0 } else { 1 };
        assert_eq!(result.exit_code, expected);
    }
}

#[test]
fn test_two_runs_from_same_conditions_agree() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let run = |subdir: &str| {
        let mut desktop = MockDesktop::new(320, 200).with_window_after("Labelle", 2);
        run_probe(&mut desktop, &probe_config(&dir.path().join(subdir)))
    };

    let first = run("first");
    let second = run("second");

    assert_eq!(first.exit_code, second.exit_code);
    assert_eq!(first.launched, second.launched);
    assert_eq!(first.window_found, second.window_found);
    assert_eq!(
        first.screenshot_path.is_some(),
        second.screenshot_path.is_some()
    );
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use labelle_probe::desktop::{DesktopBackend, MockDesktop, XdotoolBackend};
use labelle_probe::probe::{ProbeConfig, run_probe};
use labelle_probe::session::{Session, cleanup_old_sessions};

/// Sessions older than this are purged before a probe run
const SESSION_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Labelle Probe - launch smoke testing with window discovery and screenshot evidence
#[derive(Parser, Debug)]
#[command(
    name = "labelle-probe",
    about = "Launch a desktop app, confirm its window appears, capture evidence",
    after_help = "ENVIRONMENT VARIABLES:\n\
        LABELLE_APP_PATH           Path of the executable under test\n\
        LABELLE_PROBE_TITLE        Window-title fragment to match\n\
        LABELLE_PROBE_TIMEOUT      Window-discovery timeout (seconds)\n\
        LABELLE_PROBE_POLL_MS      Poll interval while waiting (ms)\n\
        LABELLE_PROBE_SESSION_DIR  Base directory for probe sessions\n\
        \nEXIT STATUS:\n\
        0  window confirmed open and close requested\n\
        1  any failure (launch, window not found, windowing error)"
)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch the app and verify its window appears
    Probe {
        /// Path of the executable under test
        #[arg(short, long, env = "LABELLE_APP_PATH", default_value = "./zig-out/bin/labelle-gui")]
        app: PathBuf,

        /// Window-title fragment to match
        #[arg(short, long, env = "LABELLE_PROBE_TITLE", default_value = "Labelle")]
        title: String,

        /// Window-discovery timeout in seconds
        #[arg(long, env = "LABELLE_PROBE_TIMEOUT", default_value = "10")]
        timeout: u64,

        /// Poll interval in milliseconds
        #[arg(long, env = "LABELLE_PROBE_POLL_MS", default_value = "250")]
        poll_ms: u64,

        /// Output directory for evidence (default: auto-generated session dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output the run report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Arguments to pass to the executable
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Render a fake desktop screenshot for testing
    Mock {
        /// Width in pixels
        #[arg(short = 'W', long, default_value = "800")]
        width: u32,

        /// Height in pixels
        #[arg(short = 'H', long, default_value = "600")]
        height: u32,

        /// Output file path
        #[arg(short, long, default_value = "./mock_desktop.png")]
        output: PathBuf,

        /// Wallpaper color as hex (e.g., "102030")
        #[arg(short, long, default_value = "102030")]
        color: String,

        /// Title of a window to paint onto the desktop
        #[arg(short, long, default_value = "Labelle Designer")]
        title: String,
    },
}

fn main() {
    let args = Args::parse();

    let code = match args.command {
        Some(Commands::Probe {
            app,
            title,
            timeout,
            poll_ms,
            output,
            json,
            args: app_args,
        }) => probe_command(app, app_args, title, timeout, poll_ms, output, json),

        Some(Commands::Mock {
            width,
            height,
            output,
            color,
            title,
        }) => mock_command(width, height, output, &color, &title),

        // Bare invocation: probe with env-derived settings, as the original
        // smoke script is driven
        None => {
            let config = ProbeConfig::default();
            probe_command(
                config.app_path,
                Vec::new(),
                config.window_title,
                config.window_timeout.as_secs(),
                config.poll_interval.as_millis() as u64,
                None,
                false,
            )
        }
    };

    std::process::exit(code);
}

fn probe_command(
    app: PathBuf,
    app_args: Vec<String>,
    title: String,
    timeout: u64,
    poll_ms: u64,
    output: Option<PathBuf>,
    json: bool,
) -> i32 {
    if !json {
        println!("=== Labelle GUI launch probe ===");
    }

    // Housekeeping: drop sessions from old runs, best-effort
    let _ = cleanup_old_sessions(SESSION_MAX_AGE);

    // Evidence is the deliverable, so probe sessions are always kept
    let session = match output {
        Some(dir) => Session::in_dir(dir),
        None => {
            let app_name = app
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "probe".to_string());
            Session::with_name(&app_name).keep(true)
        }
    };
    if let Err(err) = session.init() {
        eprintln!("FAILED: could not create session dir: {}", err);
        return 1;
    }

    let config = ProbeConfig {
        app_path: app,
        args: app_args,
        window_title: title,
        window_timeout: Duration::from_secs(timeout),
        poll_interval: Duration::from_millis(poll_ms),
        output_dir: session.dir.clone(),
        debug_screenshot: PathBuf::from(labelle_probe::config::DEBUG_SCREENSHOT_NAME),
        write_report: true,
        quiet: json,
    };

    let mut backend = XdotoolBackend::new();
    let result = run_probe(&mut backend, &config);

    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(body) => println!("{}", body),
            Err(err) => eprintln!("Warning: could not serialize report: {}", err),
        }
    } else {
        println!("Session: {}", session.dir.display());
    }

    result.exit_code
}

fn mock_command(width: u32, height: u32, output: PathBuf, color: &str, title: &str) -> i32 {
    let wallpaper = match parse_hex_color(color) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("Invalid color '{}': {}", color, err);
            return 1;
        }
    };

    let mut desktop = MockDesktop::new(width, height)
        .with_wallpaper(wallpaper)
        .with_window(title);

    // A query makes the window visible to the capture pass
    if let Err(err) = desktop.find_window(title) {
        eprintln!("Mock query failed: {}", err);
        return 1;
    }

    let capture = match desktop.capture_screen() {
        Ok(capture) => capture,
        Err(err) => {
            eprintln!("Mock capture failed: {}", err);
            return 1;
        }
    };

    if let Err(err) = std::fs::write(&output, &capture.image_data) {
        eprintln!("Could not write {}: {}", output.display(), err);
        return 1;
    }

    println!("Created mock desktop screenshot: {}", output.display());
    println!("  Size: {}x{}", capture.width, capture.height);
    0
}

fn parse_hex_color(hex: &str) -> Result<[u8; 3], String> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return Err("color must be 6 hex digits (e.g., '102030')".to_string());
    }
    let parse = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|e| e.to_string())
    };
    Ok([parse(0..2)?, parse(2..4)?, parse(4..6)?])
}

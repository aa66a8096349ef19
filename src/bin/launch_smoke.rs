use labelle_probe::desktop::XdotoolBackend;
use labelle_probe::probe::{ProbeConfig, run_probe};
use labelle_probe::session::Session;

fn main() {
    println!("=== Labelle GUI launch probe ===");

    let mut config = ProbeConfig::default();

    let session = Session::with_name("launch_smoke").keep(true);
    if let Err(err) = session.init() {
        eprintln!("FAILED: could not create session dir: {}", err);
        std::process::exit(1);
    }
    config.output_dir = session.dir.clone();

    let mut backend = XdotoolBackend::new();
    let result = run_probe(&mut backend, &config);

    println!("Session: {}", session.dir.display());
    std::process::exit(result.exit_code);
}

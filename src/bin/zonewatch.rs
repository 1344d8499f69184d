//! zonewatch replay tool
//!
//! Feeds `"lat, lng"` samples from stdin through either execution context
//! against a file-backed store. Run it once as `--context foreground` and
//! again as `--context background` on the same `--data-dir` to watch the two
//! contexts share one detector.

use std::io::{self, BufRead};
use std::path::PathBuf;

use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use zonewatch::alert::LoggingAlertChannel;
use zonewatch::storage::open_store;
use zonewatch::{
    BackgroundTask, CheckOutcome, Coordinate, MonitoringSession, ProximityConfig, ProximityStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Foreground,
    Background,
}

/// Replay configuration
struct Config {
    /// Directory holding the proximity records
    data_dir: PathBuf,
    /// New target as "lat, lng"
    target: Option<String>,
    /// Raw radius input (parsed with fallback)
    radius: String,
    /// Raw interval input (parsed with fallback)
    interval: String,
    context: Context,
    /// Clear the records and exit
    stop: bool,
    verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./zonewatch-data"),
            target: None,
            radius: String::new(),
            interval: String::new(),
            context: Context::Foreground,
            stop: false,
            verbose: false,
        }
    }
}

fn take_value(args: &[String], i: usize, flag: &str) -> String {
    if i + 1 < args.len() {
        args[i + 1].clone()
    } else {
        eprintln!("error: {flag} requires a value");
        std::process::exit(1);
    }
}

fn parse_args() -> Config {
    let args: Vec<String> = std::env::args().collect();
    let mut config = Config::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--data-dir" | "-d" => {
                config.data_dir = PathBuf::from(take_value(&args, i, "--data-dir"));
                i += 2;
            }
            "--target" | "-t" => {
                config.target = Some(take_value(&args, i, "--target"));
                i += 2;
            }
            "--radius" | "-r" => {
                config.radius = take_value(&args, i, "--radius");
                i += 2;
            }
            "--interval" | "-i" => {
                config.interval = take_value(&args, i, "--interval");
                i += 2;
            }
            "--context" | "-c" => {
                config.context = match take_value(&args, i, "--context").as_str() {
                    "foreground" | "fg" => Context::Foreground,
                    "background" | "bg" => Context::Background,
                    other => {
                        eprintln!("error: unknown context: {other}");
                        std::process::exit(1);
                    }
                };
                i += 2;
            }
            "--stop" => {
                config.stop = true;
                i += 1;
            }
            "--verbose" | "-v" => {
                config.verbose = true;
                i += 1;
            }
            "--help" | "-h" => {
                println!("zonewatch - proximity alert replay");
                println!();
                println!("USAGE:");
                println!("    zonewatch [OPTIONS] < samples.txt");
                println!();
                println!("OPTIONS:");
                println!("    -d, --data-dir <DIR>       Record directory [default: ./zonewatch-data]");
                println!("    -t, --target <LAT, LNG>    Set a new target and start monitoring");
                println!("    -r, --radius <METERS>      Zone radius [default: 500]");
                println!("    -i, --interval <METERS>    Approach interval [default: 100]");
                println!("    -c, --context <CONTEXT>    foreground | background [default: foreground]");
                println!("        --stop                 Stop monitoring (clear records) and exit");
                println!("    -v, --verbose              Debug logging");
                println!("    -h, --help                 Print help information");
                std::process::exit(0);
            }
            arg => {
                eprintln!("error: unknown argument: {arg}");
                std::process::exit(1);
            }
        }
    }

    config
}

fn read_samples() -> io::Result<Vec<Coordinate>> {
    let mut samples = Vec::new();
    for (n, line) in io::stdin().lock().lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        match Coordinate::parse_query(&line) {
            Ok(c) => samples.push(c),
            Err(e) => warn!(line = n + 1, error = %e, "skipping sample"),
        }
    }
    Ok(samples)
}

fn report(sample: &Coordinate, outcome: &CheckOutcome) {
    let event = outcome.event.as_ref().map_or("-", |e| e.kind());
    println!("{sample}\t{}m\t{event}", outcome.distance);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args();

    let default_level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let kv = open_store(&config.data_dir, None)?;

    if config.stop {
        ProximityStore::new(&kv).clear()?;
        println!("monitoring stopped; records cleared in {}", config.data_dir.display());
        return Ok(());
    }

    match config.context {
        Context::Foreground => {
            let mut session = MonitoringSession::new(&kv, LoggingAlertChannel);
            if let Some(query) = &config.target {
                let target = Coordinate::parse_query(query)?;
                session.set_target(ProximityConfig::from_inputs(
                    target,
                    &config.radius,
                    &config.interval,
                )?)?;
                session.start()?;
            } else {
                session.resume()?;
            }

            if !session.is_monitoring() {
                error!("no active target; pass --target \"lat, lng\"");
                std::process::exit(1);
            }

            for sample in read_samples()? {
                if let Some(outcome) = session.on_position(&sample)? {
                    report(&sample, &outcome);
                }
            }
        }
        Context::Background => {
            if config.target.is_some() {
                warn!("--target is ignored in the background context");
            }
            let samples = read_samples()?;
            let task = BackgroundTask::new(&kv, LoggingAlertChannel);
            let outcomes = task.handle_locations(&samples)?;
            for (sample, outcome) in samples.iter().zip(&outcomes) {
                report(sample, outcome);
            }
        }
    }

    Ok(())
}

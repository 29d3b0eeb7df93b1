//! Open-loop direct start of an induction motor drive.
//!
//! Usage: `im-drive-app [config.json] [datalog.csv]`
//!
//! Without a configuration file the 45-kW preset is used. The run applies a
//! rotating stator voltage and writes the datalog as CSV and the drive summary
//! (configuration plus component parameters) as JSON next to it.

use std::env;
use std::f64::consts::PI;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use drive::DriveConfig;
use log::{info, LevelFilter};
use num_complex::Complex64;
use serde::Serialize;
use simcore::Summary;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

/// Stator voltage magnitude (V)
const U_S: f64 = 300.0;
/// Supply frequency (Hz)
const F_S: f64 = 50.0;
/// Simulated time (s)
const T_END: f64 = 2.0;

#[derive(Serialize)]
struct RunSummary<'a> {
    config: &'a DriveConfig,
    components: Vec<Summary>,
}

fn log_level() -> LevelFilter {
    env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

fn load_config(path: Option<&Path>) -> Result<DriveConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            info!("loading drive configuration from {}", path.display());
            Ok(serde_json::from_reader(File::open(path)?)?)
        }
        None => {
            info!("no configuration given, using the 45-kW preset");
            Ok(DriveConfig::im_45kw())
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    TermLogger::init(log_level(), Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;

    let mut args = env::args().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let csv_path = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("im_drive.csv"));

    let config = load_config(config_path.as_deref())?;
    let mut drive = config.build()?;
    let components = drive.describe_all();
    for summary in &components {
        info!("{}", summary);
    }

    let steps = (T_END / config.sample_period).round() as usize;
    let w_s = 2.0 * PI * F_S;
    drive.run(steps, |t| (Complex64::from_polar(U_S, w_s * t), 0.0))?;

    if let Some(last) = drive.datalog().last() {
        info!(
            "t = {:.3} s: w_m = {:.2} rad/s, |i_s| = {:.1} A, tau_m = {:.1} Nm",
            last.t,
            last.w_m,
            last.i_s.norm(),
            last.tau_m
        );
    }

    drive.datalog().write_csv(BufWriter::new(File::create(&csv_path)?))?;
    let summary_path = csv_path.with_extension("json");
    serde_json::to_writer_pretty(
        BufWriter::new(File::create(&summary_path)?),
        &RunSummary {
            config: &config,
            components,
        },
    )?;

    println!("Wrote {} and {}", csv_path.display(), summary_path.display());
    Ok(())
}

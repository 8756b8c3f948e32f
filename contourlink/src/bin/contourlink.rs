//! Command-line entry point
//!
//! Retrieves all stored results from a connected meter and writes them
//! to a CSV file. The protocol engine lives in the library crates; this
//! is argument plumbing, logging setup and error categorization.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use contourlink::{normalize, CsvOutput, Meter, Preferences};
use contourlink_transport::HidTransport;
use contourlink_types::{CarbUnit, GlucoseUnit};

#[derive(Parser)]
#[command(
    name = "contourlink",
    version,
    about = "Retrieve data from a connected Contour Next USB meter and write to a CSV file",
    after_help = "NOTE: This program is experimental software, not developed or supported \
                  by the meter's manufacturer. It might damage your meter or render it \
                  unreliable. See the README for bug reporting instructions."
)]
struct Args {
    /// Output file (default stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Preferred glucose units for output
    #[arg(long, value_name = "UNIT", default_value = "mmol/l")]
    glucose_units: GlucoseUnit,

    /// Preferred carb units for output
    #[arg(long, value_name = "UNIT", default_value = "g")]
    carb_units: CarbUnit,

    /// Grams per carbohydrate point
    #[arg(long, value_name = "GRAMS", default_value_t = 10.0)]
    g_per_point: f64,

    /// Grams per carbohydrate choice
    #[arg(long, value_name = "GRAMS", default_value_t = 15.0)]
    g_per_choice: f64,

    /// Increase verbosity (repeat for more, up to -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbosity: u8,

    /// Show the header record on stderr
    #[arg(long)]
    info: bool,

    /// Dump raw ASTM frames to this file
    #[arg(long, value_name = "FILE")]
    astm_dump: Option<PathBuf>,
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> contourlink::Result<()> {
    let prefs = Preferences {
        glucose_unit: args.glucose_units,
        carb_unit: args.carb_units,
        grams_per_point: args.g_per_point,
        grams_per_choice: args.g_per_choice,
    };

    let mut meter = Meter::new(HidTransport::open()?);
    if let Some(path) = &args.astm_dump {
        meter = meter.with_frame_dump(Box::new(File::create(path)?));
    }

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };
    let mut out = CsvOutput::new(sink)?;

    let info = meter.handshake()?;
    if args.info {
        eprintln!("Product: {}", info.product);
        eprintln!(
            "Versions: {}, {}, {}",
            info.versions[0], info.versions[1], info.versions[2]
        );
        eprintln!("Serial: {}", info.serial);
        eprintln!("SKU: {}", info.sku);
        eprintln!("{} results on meter", info.nr_results);
    }

    meter.stream_results(|result| {
        if let Some(record) = normalize(&result, &prefs)? {
            out.write_record(&record)?;
        }
        Ok(())
    })?;

    out.flush()
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbosity);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}: {err}", err.category());
            if err.wants_bug_report() {
                eprintln!("Please report a bug (with --astm-dump if possible). Thanks!");
            }
            ExitCode::FAILURE
        }
    }
}

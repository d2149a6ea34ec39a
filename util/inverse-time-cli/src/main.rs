use std::{fs, path::{Path, PathBuf}, time::Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use clap_stdin::FileOrStdin;
use inverse_time::{
    config::{ConversionConfiguration, ConversionMode, Units},
    convert::ConversionSummary,
    convert_gcode_file,
    events::ConversionEvent,
    statistics::{Advisory, Statistics},
};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert 4-axis G-code from G94 feed rates to G93 inverse time.", long_about = None)]
struct Args {
    /// The file to process.
    #[arg()]
    input: FileOrStdin,

    /// Where to write the converted program. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    configuration: ConfigurationArgs,

    /// Print the final statistics as JSON instead of the text report.
    #[arg(long)]
    json_report: bool,
}

#[derive(clap::Args, Debug, Default)]
struct ConfigurationArgs {
    /// A JSON conversion configuration. Flags given here override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    #[arg(long, value_enum)]
    units: Option<UnitsArg>,

    /// Distance from Z zero to the A axis of rotation.
    #[arg(long, allow_hyphen_values = true)]
    z_zero_offset: Option<f64>,

    /// Digits written after the decimal point of inverse time F words.
    #[arg(long)]
    feed_precision: Option<u8>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ModeArg {
    WholeFile,
    WrapEachRotaryMove,
}
impl From<ModeArg> for ConversionMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::WholeFile => ConversionMode::WholeFile,
            ModeArg::WrapEachRotaryMove => ConversionMode::WrapEachRotaryMove,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum UnitsArg {
    Inches,
    Millimeters,
}
impl From<UnitsArg> for Units {
    fn from(value: UnitsArg) -> Self {
        match value {
            UnitsArg::Inches => Units::Inches,
            UnitsArg::Millimeters => Units::Millimeters,
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    configuration: &'a ConversionConfiguration,
    lines_processed: usize,
    statistics: &'a Statistics,
    rotary_fraction: f64,
    advisories: Vec<Advisory>,
    events: &'a [ConversionEvent],
    seconds: f64,
}

fn load_configuration(flags: &ConfigurationArgs) -> anyhow::Result<ConversionConfiguration> {
    let mut config = match &flags.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("Failed to read configuration {:?}", path))?;
            serde_json::from_str(&text).context("Failed while parsing JSON configuration")?
        },
        None => ConversionConfiguration::default(),
    };
    if let Some(mode) = flags.mode {
        config.conversion_mode = mode.into();
    }
    if let Some(units) = flags.units {
        config.units = units.into();
    }
    if let Some(z_zero_offset) = flags.z_zero_offset {
        config.z_zero_offset = z_zero_offset;
    }
    if let Some(feed_precision) = flags.feed_precision {
        config.feed_precision = feed_precision;
    }
    Ok(config)
}

/// Converts the whole program before anything is written, so a failure leaves no partial output.
fn convert_to_output(config: &ConversionConfiguration, input: &str, path: Option<&Path>) -> anyhow::Result<ConversionSummary> {
    let program = convert_gcode_file(config, input).context("Failed to convert program; no output was written")?;
    write_output(path, &program.output)?;
    Ok(program.summary)
}

fn write_output(path: Option<&Path>, output: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
            }
            fs::write(path, output).with_context(|| format!("Failed to write {:?}", path))
        },
        None => {
            print!("{}", output);
            Ok(())
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let config = load_configuration(&args.configuration)?;

    warn!("WARNING: Review and test this program for your machine and setup.");
    warn!("Use the converted G-code at your own risk.");
    let input: &str = &args.input;
    info!(lines = input.lines().count(), "Total lines in input file");

    let start = Instant::now();
    let summary = convert_to_output(&config, input, args.output.as_deref())?;
    let seconds = start.elapsed().as_secs_f64();

    if args.json_report {
        let report = JsonReport {
            configuration: &summary.config,
            lines_processed: summary.lines_processed,
            statistics: &summary.statistics,
            rotary_fraction: summary.statistics.rotary_fraction(),
            advisories: summary.advisories(),
            events: &summary.events,
            seconds,
        };
        eprintln!("{}", serde_json::to_string_pretty(&report).context("Failed to serialize report")?);
    } else {
        eprintln!("{}", summary.report());
        eprintln!("Completed! [{:.2} seconds]", seconds);
    }
    Ok(())
}

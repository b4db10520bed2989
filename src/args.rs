use crate::bursts::BurstOptions;
use crate::config::OwhlConfig;
use crate::error::{OwhlError, Result};
use crate::stats::{Method, PressureCorrection};
use crate::util::{latitude_parser, method_parser, positive_parser, timestamp_parser, timezone_parser};
use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Wave statistics from Open Wave Height Logger pressure records.")]
#[command(allow_negative_numbers = true)]
pub struct Cli {
    /// KDL config file; defaults to the per-user config if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Join logger files and write per-burst wave statistics.
    Process(ProcessArgs),
    /// Join logger files into one cleaned pressure record.
    Join(JoinArgs),
    /// Print burst boundary indices for a record.
    Bounds(BoundsArgs),
    /// Convert a single pressure reading to depth.
    Depth(DepthArgs),
}

/// Options shared by every subcommand that reads logger files.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// OWHL CSV files or directories containing them.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    #[arg(long, value_parser = timezone_parser)]
    pub timezone: Option<Tz>,
    /// Drop samples before this time (RFC 3339 or `YYYY-MM-DD HH:MM:SS` UTC).
    #[arg(long, value_parser = timestamp_parser)]
    pub start: Option<DateTime<FixedOffset>>,
    /// Drop samples after this time.
    #[arg(long, value_parser = timestamp_parser)]
    pub end: Option<DateTime<FixedOffset>>,
}

#[derive(Args, Debug, Clone)]
pub struct ProcessArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[arg(short, long)]
    pub output: PathBuf,
    #[arg(long, value_parser = latitude_parser)]
    pub latitude: Option<f64>,
    #[arg(long, value_parser = positive_parser)]
    pub sampling_rate: Option<f64>,
    /// Burst length in minutes.
    #[arg(long, value_parser = positive_parser)]
    pub burst_length: Option<f64>,
    #[arg(long, value_parser = method_parser)]
    pub method: Option<Method>,
    /// Atmospheric pressure in millibar subtracted before depth conversion.
    #[arg(long, value_parser = positive_parser)]
    pub atmospheric: Option<f64>,
    /// Apply the pressure response correction even if the config disables it.
    #[arg(long)]
    pub correct: bool,
}

#[derive(Args, Debug, Clone)]
pub struct JoinArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct BoundsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[arg(long, value_parser = positive_parser)]
    pub sampling_rate: Option<f64>,
    #[arg(long, value_parser = positive_parser)]
    pub burst_length: Option<f64>,
}

#[derive(Args, Debug, Clone)]
pub struct DepthArgs {
    /// Sea pressure in millibar; pass `--atmospheric` if it is absolute.
    pub mbar: f64,
    #[arg(long, value_parser = latitude_parser)]
    pub latitude: Option<f64>,
    #[arg(long, value_parser = positive_parser)]
    pub atmospheric: Option<f64>,
}

/// Input selection with command-line values merged over the config.
#[derive(Debug, Clone)]
pub struct InputSettings {
    pub inputs: Vec<PathBuf>,
    pub timezone: Tz,
    pub start: Option<DateTime<Tz>>,
    pub end: Option<DateTime<Tz>>,
}

pub struct ProcessSettings {
    pub input: InputSettings,
    pub output: PathBuf,
    pub latitude: Option<f64>,
    pub atmospheric_mbar: f64,
    pub bursts: BurstOptions,
}

pub struct BoundsSettings {
    pub input: InputSettings,
    pub sampling_rate: f64,
    pub burst_length_minutes: Option<f64>,
}

impl InputArgs {
    pub fn resolve(self, config: &OwhlConfig) -> Result<InputSettings> {
        let timezone = match self.timezone {
            Some(tz) => tz,
            None => config.timezone()?,
        };
        Ok(InputSettings {
            inputs: self.inputs,
            timezone,
            start: self.start.map(|t| t.with_timezone(&timezone)),
            end: self.end.map(|t| t.with_timezone(&timezone)),
        })
    }
}

impl ProcessArgs {
    pub fn resolve(self, config: &OwhlConfig) -> Result<ProcessSettings> {
        let input = self.input.resolve(config)?;
        let burst_length_minutes = self
            .burst_length
            .or(config.burst_length())
            .ok_or(OwhlError::MissingBurstLength)?;
        let method = match self.method {
            Some(m) => m,
            None => config.method()?,
        };

        let mut stats = config.stats_settings();
        if self.correct && stats.correction.is_none() {
            stats.correction = Some(PressureCorrection {
                sensor_height_m: config
                    .site
                    .as_ref()
                    .and_then(|s| s.sensor_height)
                    .unwrap_or(0.0),
                ..PressureCorrection::default()
            });
        }

        Ok(ProcessSettings {
            bursts: BurstOptions {
                sampling_rate: self.sampling_rate.unwrap_or(config.sampling_rate()),
                burst_length_minutes,
                method,
                timezone: input.timezone,
                stats,
            },
            input,
            output: self.output,
            latitude: self.latitude.or(config.latitude()),
            atmospheric_mbar: self.atmospheric.unwrap_or(config.atmospheric_pressure()),
        })
    }
}

impl BoundsArgs {
    pub fn resolve(self, config: &OwhlConfig) -> Result<BoundsSettings> {
        Ok(BoundsSettings {
            input: self.input.resolve(config)?,
            sampling_rate: self.sampling_rate.unwrap_or(config.sampling_rate()),
            burst_length_minutes: self.burst_length.or(config.burst_length()),
        })
    }
}

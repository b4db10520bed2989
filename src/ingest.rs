//! OWHL CSV ingestion.
//!
//! A logger deployment produces many daily CSV files with the columns
//! `POSIXt,DateTime,frac.seconds,Pressure.mbar,TempC`. Files are joined
//! into one ordered record, duplicate timestamps dropped and missing
//! pressure values filled by linear interpolation.

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use log::{debug, info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{OwhlError, Result};
use crate::series::TimeSeries;
use crate::util::lerp;

#[derive(Debug, Deserialize)]
struct OwhlRecord {
    #[serde(rename = "POSIXt")]
    posix: String,
    #[serde(rename = "frac.seconds", default, deserialize_with = "csv::invalid_option")]
    frac_seconds: Option<u32>,
    #[serde(rename = "Pressure.mbar", default, deserialize_with = "csv::invalid_option")]
    pressure_mbar: Option<f64>,
    #[serde(rename = "TempC", default, deserialize_with = "csv::invalid_option")]
    temp_c: Option<f64>,
}

/// One logger sample; either measurement may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub time: DateTime<Tz>,
    pub pressure_mbar: Option<f64>,
    pub temperature_c: Option<f64>,
}

/// A cleaned, joined logger record.
#[derive(Debug, Clone, PartialEq)]
pub struct Joined {
    /// Pressure in millibar with gaps filled.
    pub pressure: TimeSeries,
    pub temperature_c: Vec<Option<f64>>,
}

impl Joined {
    /// Keeps samples whose timestamp lies in the inclusive window.
    pub fn trim(self, start: Option<DateTime<Tz>>, end: Option<DateTime<Tz>>) -> Self {
        let keep: Vec<bool> = self
            .pressure
            .times()
            .iter()
            .map(|t| start.map_or(true, |s| *t >= s) && end.map_or(true, |e| *t <= e))
            .collect();
        let temperature_c = self
            .temperature_c
            .into_iter()
            .zip(&keep)
            .filter_map(|(t, &k)| k.then_some(t))
            .collect();
        Self {
            pressure: self.pressure.trim(start, end),
            temperature_c,
        }
    }
}

fn to_time(posix: &str, frac_seconds: Option<u32>, tz: Tz) -> Result<DateTime<Tz>> {
    let secs: i64 = posix
        .trim()
        .parse()
        .map_err(|_| OwhlError::InvalidTimestamp(format!("POSIXt '{}'", posix)))?;
    let frac = frac_seconds.unwrap_or(0);
    if frac > 99 {
        return Err(OwhlError::InvalidTimestamp(format!(
            "frac.seconds {} is not in hundredths (0-99)",
            frac
        )));
    }
    tz.timestamp_opt(secs, frac * 10_000_000)
        .single()
        .ok_or_else(|| OwhlError::InvalidTimestamp(format!("POSIXt {} out of range", secs)))
}

/// Reads a single OWHL CSV file, timestamps expressed in `tz`.
pub fn read_file<P: AsRef<Path>>(path: P, tz: Tz) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    debug!("Reading {}", path.display());

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut samples = Vec::new();
    for record in reader.deserialize() {
        let record: OwhlRecord = record?;
        samples.push(Sample {
            time: to_time(&record.posix, record.frac_seconds, tz)?,
            pressure_mbar: record.pressure_mbar,
            temperature_c: record.temp_c,
        });
    }
    Ok(samples)
}

/// Expands directories into the `.csv` files they contain, sorted by name.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| {
                    p.is_file()
                        && p.extension()
                            .and_then(|e| e.to_str())
                            .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
                })
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

/// Fills `None` entries by linear interpolation between the nearest valid
/// neighbours; leading and trailing runs take the nearest valid value.
/// Returns `None` if nothing is valid.
pub fn interpolate_missing(values: &[Option<f64>]) -> Option<Vec<f64>> {
    let valid: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();
    let (&(first_i, first_v), &(last_i, last_v)) = (valid.first()?, valid.last()?);

    let mut out = vec![0.0; values.len()];
    out[..=first_i].fill(first_v);
    out[last_i..].fill(last_v);
    for pair in valid.windows(2) {
        let ((i0, v0), (i1, v1)) = (pair[0], pair[1]);
        for (i, slot) in out.iter_mut().enumerate().take(i1 + 1).skip(i0) {
            *slot = lerp(v0, v1, (i - i0) as f64 / (i1 - i0) as f64);
        }
    }
    Some(out)
}

/// Sorts samples by time and drops repeated timestamps, keeping the first.
/// Returns the number dropped.
pub fn sort_and_dedup(samples: &mut Vec<Sample>) -> usize {
    samples.sort_by_key(|s| s.time);
    let before = samples.len();
    samples.dedup_by_key(|s| s.time);
    before - samples.len()
}

/// Joins samples from several sources into one cleaned record.
pub fn join_samples(mut samples: Vec<Sample>) -> Result<Joined> {
    let dropped = sort_and_dedup(&mut samples);
    if dropped > 0 {
        warn!("Dropped {} samples with duplicate timestamps", dropped);
    }

    let raw: Vec<Option<f64>> = samples
        .iter()
        .map(|s| s.pressure_mbar.filter(|p| p.is_finite()))
        .collect();
    let missing = raw.iter().filter(|p| p.is_none()).count();
    let pressure = interpolate_missing(&raw).ok_or(OwhlError::EmptySeries)?;
    if missing > 0 {
        info!("Interpolated {} missing pressure values", missing);
    }

    let temperature_c = samples.iter().map(|s| s.temperature_c).collect();
    let times = samples.into_iter().map(|s| s.time).collect();
    Ok(Joined {
        pressure: TimeSeries::new(times, pressure)?,
        temperature_c,
    })
}

/// Reads and joins every input file (directories are expanded).
pub fn join_files(inputs: &[PathBuf], tz: Tz) -> Result<Joined> {
    let files = expand_inputs(inputs)?;
    if files.is_empty() {
        return Err(OwhlError::EmptySeries);
    }
    let mut samples = Vec::new();
    for file in &files {
        samples.extend(read_file(file, tz)?);
    }
    info!("Read {} samples from {} files", samples.len(), files.len());
    join_samples(samples)
}

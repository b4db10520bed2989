//! Per-burst statistics over a segmented elevation record.

use chrono::DateTime;
use chrono_tz::Tz;
use log::{debug, info, warn};

use super::bounds::find_bounds;
use super::table::{BurstTable, Columns};
use crate::error::{OwhlError, Result};
use crate::series::{minutes_between, TimeSeries};
use crate::stats::{Method, SpectralStats, StatsSettings, WaveStatistics, ZeroCrossingStats};

/// Allowed absolute difference between a burst's duration and the target
/// burst length, in minutes.
pub const BURST_TOLERANCE_MINUTES: f64 = 0.01;

/// Absorbs rounding in the duration arithmetic at the tolerance edge.
const EPSILON_MINUTES: f64 = 1e-9;

/// Everything a burst analysis needs besides the data itself.
#[derive(Debug, Clone)]
pub struct BurstOptions {
    pub sampling_rate: f64,
    pub burst_length_minutes: f64,
    pub method: Method,
    /// Zone of the result's end timestamps.
    pub timezone: Tz,
    pub stats: StatsSettings,
}

pub fn within_tolerance(duration_minutes: f64, burst_length_minutes: f64) -> bool {
    (duration_minutes - burst_length_minutes).abs() <= BURST_TOLERANCE_MINUTES + EPSILON_MINUTES
}

/// Time covered by the samples `first..=last` including the last sample's
/// interval. Used only to decide whether a whole record holds one burst.
pub fn chunk_minutes(first: &DateTime<Tz>, last: &DateTime<Tz>, sampling_rate: f64) -> f64 {
    minutes_between(first, last) + 1.0 / sampling_rate / 60.0
}

fn check_bounds(bounds: &[usize], len: usize) -> Result<()> {
    if bounds.is_empty() {
        return Err(OwhlError::InvalidBounds("boundary list is empty".to_string()));
    }
    if bounds[0] != 0 {
        return Err(OwhlError::InvalidBounds(format!(
            "first boundary must be 0, got {}",
            bounds[0]
        )));
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(OwhlError::InvalidBounds("boundaries must be strictly increasing".to_string()));
    }
    if bounds[bounds.len() - 1] >= len {
        return Err(OwhlError::InvalidBounds(format!(
            "boundary {} is past the last sample {}",
            bounds[bounds.len() - 1],
            len - 1
        )));
    }
    Ok(())
}

fn burst_stats<S: WaveStatistics>(heights: &[f64], options: &BurstOptions) -> Result<S> {
    match &options.stats.correction {
        Some(correction) => {
            let corrected = correction.apply(heights, options.sampling_rate);
            S::compute(&corrected, options.sampling_rate, &options.stats)
        }
        None => S::compute(heights, options.sampling_rate, &options.stats),
    }
}

fn collect<S: WaveStatistics>(
    series: &TimeSeries,
    bounds: &[usize],
    options: &BurstOptions,
) -> Result<Columns<S>> {
    let times = series.times();
    let heights = series.values();
    let target = options.burst_length_minutes;
    let mut table = Columns::new(options.timezone);

    if bounds.len() <= 2 {
        let last = times.len() - 1;
        let duration = chunk_minutes(&times[0], &times[last], options.sampling_rate);
        if duration < target {
            return Err(OwhlError::SeriesTooShort {
                duration_minutes: duration,
                burst_length_minutes: target,
            });
        }
        table.push(&burst_stats::<S>(heights, options)?, times[last]);
        return Ok(table);
    }

    for (i, pair) in bounds.windows(2).enumerate() {
        let (start, end) = (pair[0], pair[1]);
        let duration = minutes_between(&times[start], &times[end]);
        if !within_tolerance(duration, target) {
            debug!(
                "Skipping burst {} ({}..={}): {:.4} min, expected {} min",
                i, start, end, duration, target
            );
            continue;
        }
        let stats = burst_stats::<S>(&heights[start..=end], options)?;
        table.push(&stats, times[end]);
    }

    Ok(table)
}

/// Computes one row of statistics per qualifying burst.
///
/// Consecutive pairs of `bounds` delimit candidate bursts (both ends
/// inclusive). With more than one candidate, bursts whose duration is not
/// within [`BURST_TOLERANCE_MINUTES`] of the target are skipped. With a
/// single candidate the whole series is used and must be at least one
/// burst long. If no burst qualifies the table has no rows.
pub fn process_bursts(
    series: &TimeSeries,
    bounds: &[usize],
    options: &BurstOptions,
) -> Result<BurstTable> {
    if series.is_empty() {
        return Err(OwhlError::EmptySeries);
    }
    if !(options.sampling_rate.is_finite() && options.sampling_rate > 0.0) {
        return Err(OwhlError::InvalidSamplingRate(options.sampling_rate));
    }
    if !(options.burst_length_minutes.is_finite() && options.burst_length_minutes > 0.0) {
        return Err(OwhlError::InvalidBurstLength(options.burst_length_minutes));
    }
    check_bounds(bounds, series.len())?;

    info!(
        "Processing {} candidate bursts [{}]: {} min at {} Hz",
        bounds.len().saturating_sub(1).max(1),
        options.method,
        options.burst_length_minutes,
        options.sampling_rate
    );

    let table: BurstTable = match options.method {
        Method::Spectral => collect::<SpectralStats>(series, bounds, options)?.into(),
        Method::ZeroCrossing => collect::<ZeroCrossingStats>(series, bounds, options)?.into(),
    };

    if table.is_empty() {
        warn!("No burst matched the {} minute burst length", options.burst_length_minutes);
    } else {
        info!("Computed statistics for {} bursts", table.len());
    }
    Ok(table)
}

/// Finds burst boundaries in `series` and processes them.
pub fn analyze(series: &TimeSeries, options: &BurstOptions) -> Result<BurstTable> {
    let bounds = find_bounds(
        series.times(),
        options.sampling_rate,
        Some(options.burst_length_minutes),
    )?;
    process_bursts(series, &bounds, options)
}

//! Burst boundary detection.
//!
//! Boundaries come either from natural gaps in the sampling (duty-cycled
//! loggers leave a pause between bursts) or, for a continuous record, from
//! fixed-length windows.

use chrono::DateTime;
use chrono_tz::Tz;
use log::debug;

use crate::error::{OwhlError, Result};

/// Nominal spacing between samples, in nanoseconds.
fn nominal_interval_ns(sampling_rate: f64) -> i64 {
    (1e9 / sampling_rate).round() as i64
}

/// Samples per burst; fractional values truncate.
pub fn step_size(burst_length_minutes: f64, sampling_rate: f64) -> usize {
    (burst_length_minutes * 60.0 * sampling_rate) as usize
}

/// Indices `i` where the step from `times[i]` to `times[i + 1]` is longer
/// than one sample interval.
pub fn natural_gaps(times: &[DateTime<Tz>], sampling_rate: f64) -> Vec<usize> {
    let nominal = nominal_interval_ns(sampling_rate);
    times
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| {
            let delta = pair[1] - pair[0];
            match delta.num_nanoseconds() {
                Some(ns) => ns > nominal,
                None => true,
            }
        })
        .map(|(i, _)| i)
        .collect()
}

/// Returns burst boundary indices into `times`.
///
/// The list starts at 0, ends at the last index and is strictly increasing.
/// Each natural gap contributes the index on both sides of it; without gaps
/// a `burst_length_minutes` is required and boundaries are spaced one burst
/// apart, with the last index appended for a possibly-short trailing burst.
pub fn find_bounds(
    times: &[DateTime<Tz>],
    sampling_rate: f64,
    burst_length_minutes: Option<f64>,
) -> Result<Vec<usize>> {
    if !(sampling_rate.is_finite() && sampling_rate > 0.0) {
        return Err(OwhlError::InvalidSamplingRate(sampling_rate));
    }
    if let Some(len) = burst_length_minutes {
        if !(len.is_finite() && len > 0.0) {
            return Err(OwhlError::InvalidBurstLength(len));
        }
    }
    if times.is_empty() {
        return Err(OwhlError::EmptySeries);
    }

    let last = times.len() - 1;
    let gaps = natural_gaps(times, sampling_rate);

    let mut bounds = vec![0];
    if !gaps.is_empty() {
        debug!("Found {} natural gaps in {} samples", gaps.len(), times.len());
        for g in gaps {
            bounds.push(g);
            bounds.push(g + 1);
        }
    } else {
        let burst_length = burst_length_minutes.ok_or(OwhlError::MissingBurstLength)?;
        let step = step_size(burst_length, sampling_rate);
        if step == 0 {
            return Err(OwhlError::BurstShorterThanSample {
                burst_length_minutes: burst_length,
                sampling_rate,
            });
        }
        debug!("Continuous series: {} samples per burst", step);
        bounds.extend((step..last).step_by(step));
    }
    bounds.push(last);
    bounds.dedup();

    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use chrono_tz::UTC;

    fn continuous(n: usize, fs: f64) -> Vec<DateTime<Tz>> {
        let t0 = UTC.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let dt = (1e9 / fs) as i64;
        (0..n).map(|i| t0 + Duration::nanoseconds(dt * i as i64)).collect()
    }

    /// `sessions` bursts of `n` samples each, starting every `spacing_min`.
    fn sessions(sessions: usize, n: usize, fs: f64, spacing_min: i64) -> Vec<DateTime<Tz>> {
        let t0 = UTC.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let dt = (1e9 / fs) as i64;
        (0..sessions)
            .flat_map(|s| {
                let start = t0 + Duration::minutes(spacing_min * s as i64);
                (0..n).map(move |i| start + Duration::nanoseconds(dt * i as i64))
            })
            .collect()
    }

    #[test]
    fn test_single_continuous_burst() {
        let times = continuous(1200, 4.0);
        let bounds = find_bounds(&times, 4.0, Some(5.0)).unwrap();
        assert_eq!(bounds, vec![0, 1199]);
    }

    #[test]
    fn test_continuous_bounds_are_one_burst_apart() {
        let times = continuous(4 * 60 * 17, 4.0);
        let bounds = find_bounds(&times, 4.0, Some(5.0)).unwrap();
        assert_eq!(bounds, vec![0, 1200, 2400, 3600, 4079]);
        for pair in bounds[..bounds.len() - 1].windows(2) {
            assert_eq!(pair[1] - pair[0], 1200);
        }
    }

    #[test]
    fn test_continuous_exact_multiple_does_not_repeat_last() {
        let times = continuous(2401, 4.0);
        let bounds = find_bounds(&times, 4.0, Some(5.0)).unwrap();
        assert_eq!(bounds, vec![0, 1200, 2400]);
    }

    #[test]
    fn test_fractional_step_truncates() {
        // 0.01 min * 60 s * 3 Hz = 1.8 samples -> 1
        assert_eq!(step_size(0.01, 3.0), 1);
        assert_eq!(step_size(5.0, 4.0), 1200);
    }

    #[test]
    fn test_two_sessions_give_both_sides_of_gap() {
        let times = sessions(2, 1200, 4.0, 15);
        let bounds = find_bounds(&times, 4.0, None).unwrap();
        assert_eq!(bounds, vec![0, 1199, 1200, 2399]);
    }

    #[test]
    fn test_gap_count_drives_bound_count() {
        let times = sessions(4, 100, 2.0, 10);
        let gaps = natural_gaps(&times, 2.0);
        assert_eq!(gaps.len(), 3);
        let bounds = find_bounds(&times, 2.0, Some(1.0)).unwrap();
        assert_eq!(bounds.len(), 2 + 2 * gaps.len());
        assert_eq!(bounds[0], 0);
        assert_eq!(*bounds.last().unwrap(), times.len() - 1);
    }

    #[test]
    fn test_gap_after_first_sample_stays_strictly_increasing() {
        let mut times = continuous(10, 4.0);
        times[0] = times[0] - Duration::seconds(30);
        let bounds = find_bounds(&times, 4.0, None).unwrap();
        assert_eq!(bounds, vec![0, 1, 9]);
    }

    #[test]
    fn test_continuous_without_burst_length_is_an_error() {
        let times = continuous(100, 4.0);
        let result = find_bounds(&times, 4.0, None);
        assert!(matches!(result, Err(OwhlError::MissingBurstLength)));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let times = continuous(100, 4.0);
        assert!(matches!(
            find_bounds(&times, 0.0, Some(5.0)),
            Err(OwhlError::InvalidSamplingRate(_))
        ));
        assert!(matches!(
            find_bounds(&times, 4.0, Some(-1.0)),
            Err(OwhlError::InvalidBurstLength(_))
        ));
        assert!(matches!(
            find_bounds(&[], 4.0, Some(5.0)),
            Err(OwhlError::EmptySeries)
        ));
        assert!(matches!(
            find_bounds(&times, 4.0, Some(0.001)),
            Err(OwhlError::BurstShorterThanSample { .. })
        ));
    }

    #[test]
    fn test_idempotent() {
        let times = sessions(3, 240, 4.0, 5);
        let a = find_bounds(&times, 4.0, Some(1.0)).unwrap();
        let b = find_bounds(&times, 4.0, Some(1.0)).unwrap();
        assert_eq!(a, b);
    }
}

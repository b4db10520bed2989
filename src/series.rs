use chrono::DateTime;
use chrono_tz::Tz;

use crate::error::{OwhlError, Result};

/// Timestamps paired 1:1 with a numeric value.
///
/// The time zone travels with every timestamp, so slicing or converting a
/// series never loses it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    times: Vec<DateTime<Tz>>,
    values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(times: Vec<DateTime<Tz>>, values: Vec<f64>) -> Result<Self> {
        if times.len() != values.len() {
            return Err(OwhlError::LengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        Ok(Self { times, values })
    }

    pub fn times(&self) -> &[DateTime<Tz>] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Zone of the first timestamp, `None` for an empty series.
    pub fn timezone(&self) -> Option<Tz> {
        self.times.first().map(|t| t.timezone())
    }

    /// Same instants, re-expressed in `tz`.
    pub fn with_timezone(self, tz: Tz) -> Self {
        let times = self.times.iter().map(|t| t.with_timezone(&tz)).collect();
        Self {
            times,
            values: self.values,
        }
    }

    /// Replaces the values, keeping the timestamps.
    pub fn map_values(self, values: Vec<f64>) -> Result<Self> {
        Self::new(self.times, values)
    }

    /// Keeps samples whose timestamp lies in the inclusive window.
    pub fn trim(self, start: Option<DateTime<Tz>>, end: Option<DateTime<Tz>>) -> Self {
        let (times, values) = self
            .times
            .into_iter()
            .zip(self.values)
            .filter(|(t, _)| start.map_or(true, |s| *t >= s) && end.map_or(true, |e| *t <= e))
            .unzip();
        Self { times, values }
    }
}

/// Minutes between two instants, at microsecond resolution.
pub fn minutes_between(start: &DateTime<Tz>, end: &DateTime<Tz>) -> f64 {
    let delta = *end - *start;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 60_000_000.0,
        None => delta.num_milliseconds() as f64 / 60_000.0,
    }
}

//! Zero-crossing (wave-by-wave) statistics.

use log::warn;

use super::{StatsSettings, WaveStatistics};
use crate::error::Result;
use crate::util::detrend_linear;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZeroCrossingStats {
    /// Mean height of the highest third of waves.
    pub h_sig: f64,
    pub h_mean: f64,
    /// Mean height of the highest tenth of waves.
    pub h10: f64,
    pub h_max: f64,
    /// Mean period, s.
    pub t_mean: f64,
    /// Mean period of the highest third of waves, s.
    pub t_sig: f64,
}

impl ZeroCrossingStats {
    pub fn nan() -> Self {
        Self {
            h_sig: f64::NAN,
            h_mean: f64::NAN,
            h10: f64::NAN,
            h_max: f64::NAN,
            t_mean: f64::NAN,
            t_sig: f64::NAN,
        }
    }
}

/// A single wave between two successive up-crossings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wave {
    pub height: f64,
    pub period: f64,
}

/// Fractional sample positions where `x` crosses zero going up.
fn upcrossings(x: &[f64]) -> Vec<(usize, f64)> {
    x.windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] < 0.0 && w[1] >= 0.0)
        .map(|(i, w)| (i, i as f64 + -w[0] / (w[1] - w[0])))
        .collect()
}

/// Splits a zero-mean record into individual waves.
pub fn waves(x: &[f64], sampling_rate: f64) -> Vec<Wave> {
    upcrossings(x)
        .windows(2)
        .map(|pair| {
            let (start, t_start) = pair[0];
            let (end, t_end) = pair[1];
            let segment = &x[start + 1..=end];
            let crest = segment.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let trough = segment.iter().cloned().fold(f64::INFINITY, f64::min);
            Wave {
                height: crest - trough,
                period: (t_end - t_start) / sampling_rate,
            }
        })
        .collect()
}

fn mean_of<F: Fn(&Wave) -> f64>(waves: &[Wave], f: F) -> f64 {
    waves.iter().map(f).sum::<f64>() / waves.len() as f64
}

impl WaveStatistics for ZeroCrossingStats {
    const FIELDS: &'static [&'static str] = &["h_sig", "h_mean", "h10", "h_max", "t_mean", "t_sig"];

    fn compute(heights: &[f64], sampling_rate: f64, _settings: &StatsSettings) -> Result<Self> {
        let mut waves = waves(&detrend_linear(heights), sampling_rate);
        if waves.is_empty() {
            warn!("No complete waves in a burst of {} samples", heights.len());
            return Ok(Self::nan());
        }
        waves.sort_by(|a, b| b.height.total_cmp(&a.height));

        let third = &waves[..(waves.len() / 3).max(1)];
        let tenth = &waves[..(waves.len() / 10).max(1)];

        Ok(Self {
            h_sig: mean_of(third, |w| w.height),
            h_mean: mean_of(&waves, |w| w.height),
            h10: mean_of(tenth, |w| w.height),
            h_max: waves[0].height,
            t_mean: mean_of(&waves, |w| w.period),
            t_sig: mean_of(third, |w| w.period),
        })
    }

    fn values(&self) -> Vec<f64> {
        vec![self.h_sig, self.h_mean, self.h10, self.h_max, self.t_mean, self.t_sig]
    }
}

//! Spectral wave statistics.
//!
//! The burst is linearly detrended, a one-sided power spectral density is
//! estimated with Welch's method (Hann window, 50% overlap), and the
//! statistics are derived from the spectral moments inside the wave band.

use rustfft::{num_complex::Complex, FftPlanner};

use super::{StatsSettings, WaveStatistics};
use crate::error::Result;
use crate::util::{detrend_linear, hann, mean};

#[derive(Debug, Clone, PartialEq)]
pub struct SpectralSettings {
    /// Lowest frequency counted as wave energy, Hz.
    pub lower_band_hz: f64,
    /// Highest frequency counted as wave energy, Hz.
    pub upper_band_hz: f64,
    /// Number of half-overlapping Welch segments.
    pub segments: usize,
}

impl Default for SpectralSettings {
    fn default() -> Self {
        Self {
            lower_band_hz: 1.0 / 30.0,
            upper_band_hz: 0.3,
            segments: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralStats {
    /// Mean height of the highest tenth of waves, 5.1 sqrt(m0).
    pub h10: f64,
    /// Significant wave height, 4 sqrt(m0).
    pub hm0: f64,
    /// Peak period, s.
    pub tp: f64,
    pub m0: f64,
    /// Mean period m0/m1, s.
    pub t_0_1: f64,
    /// Zero-crossing period sqrt(m0/m2), s.
    pub t_0_2: f64,
    /// Spectral width from m0, m1, m2.
    pub eps2: f64,
    /// Spectral width from m0, m2, m4.
    pub eps4: f64,
}

impl SpectralStats {
    pub fn nan() -> Self {
        Self {
            h10: f64::NAN,
            hm0: f64::NAN,
            tp: f64::NAN,
            m0: f64::NAN,
            t_0_1: f64::NAN,
            t_0_2: f64::NAN,
            eps2: f64::NAN,
            eps4: f64::NAN,
        }
    }
}

/// One-sided power spectral density.
#[derive(Debug, Clone)]
pub struct Psd {
    pub frequencies: Vec<f64>,
    pub density: Vec<f64>,
    pub df: f64,
}

/// Welch estimate of the one-sided PSD of `x`, in units²/Hz.
pub fn welch_psd(x: &[f64], sampling_rate: f64, segments: usize) -> Psd {
    let n = x.len();
    let segments = segments.max(1);
    let seg_len = (2 * n / (segments + 1)).max(8).min(n);
    let step = (seg_len / 2).max(1);
    let num_segments = (n - seg_len) / step + 1;

    let window = hann(seg_len);
    let window_power: f64 = window.iter().map(|w| w * w).sum();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(seg_len);

    let bins = seg_len / 2 + 1;
    let mut accum = vec![0.0; bins];
    let mut buffer = vec![Complex::new(0.0, 0.0); seg_len];

    for seg in 0..num_segments {
        let chunk = &x[seg * step..seg * step + seg_len];
        let seg_mean = mean(chunk);
        for (slot, (&v, &w)) in buffer.iter_mut().zip(chunk.iter().zip(&window)) {
            *slot = Complex::new((v - seg_mean) * w, 0.0);
        }
        fft.process(&mut buffer);
        for (acc, c) in accum.iter_mut().zip(&buffer) {
            *acc += c.norm_sqr();
        }
    }

    let scale = 1.0 / (sampling_rate * window_power * num_segments as f64);
    let nyquist_bin = if seg_len % 2 == 0 { Some(seg_len / 2) } else { None };
    let density = accum
        .iter()
        .enumerate()
        .map(|(k, &p)| {
            let one_sided = if k == 0 || Some(k) == nyquist_bin { 1.0 } else { 2.0 };
            p * scale * one_sided
        })
        .collect();

    let df = sampling_rate / seg_len as f64;
    Psd {
        frequencies: (0..bins).map(|k| k as f64 * df).collect(),
        density,
        df,
    }
}

impl WaveStatistics for SpectralStats {
    const FIELDS: &'static [&'static str] =
        &["h10", "hm0", "tp", "m0", "t_0_1", "t_0_2", "eps2", "eps4"];

    fn compute(heights: &[f64], sampling_rate: f64, settings: &StatsSettings) -> Result<Self> {
        if heights.len() < 8 {
            return Ok(Self::nan());
        }
        let band = &settings.spectral;
        let psd = welch_psd(&detrend_linear(heights), sampling_rate, band.segments);

        let in_band: Vec<(f64, f64)> = psd
            .frequencies
            .iter()
            .zip(&psd.density)
            .filter(|(&f, _)| f >= band.lower_band_hz && f <= band.upper_band_hz)
            .map(|(&f, &s)| (f, s))
            .collect();
        if in_band.is_empty() {
            return Ok(Self::nan());
        }

        let moment = |order: i32| -> f64 {
            in_band.iter().map(|&(f, s)| f.powi(order) * s * psd.df).sum()
        };
        let (m0, m1, m2, m4) = (moment(0), moment(1), moment(2), moment(4));

        let (f_peak, _) = in_band
            .iter()
            .fold((f64::NAN, f64::NEG_INFINITY), |best, &(f, s)| {
                if s > best.1 {
                    (f, s)
                } else {
                    best
                }
            });

        Ok(Self {
            h10: 5.1 * m0.sqrt(),
            hm0: 4.0 * m0.sqrt(),
            tp: 1.0 / f_peak,
            m0,
            t_0_1: m0 / m1,
            t_0_2: (m0 / m2).sqrt(),
            eps2: (m0 * m2 / (m1 * m1) - 1.0).max(0.0).sqrt(),
            eps4: (1.0 - m2 * m2 / (m0 * m4)).max(0.0).sqrt(),
        })
    }

    fn values(&self) -> Vec<f64> {
        vec![
            self.h10, self.hm0, self.tp, self.m0, self.t_0_1, self.t_0_2, self.eps2, self.eps4,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(n: usize, fs: f64, freq: f64, amplitude: f64, offset: f64) -> Vec<f64> {
        (0..n)
            .map(|i| offset + amplitude * (2.0 * PI * freq * i as f64 / fs + 0.3).sin())
            .collect()
    }

    #[test]
    fn test_psd_integrates_to_variance() {
        let x = sine(4800, 4.0, 0.1, 0.5, 0.0);
        let psd = welch_psd(&x, 4.0, 8);
        let total: f64 = psd.density.iter().map(|s| s * psd.df).sum();
        assert!((total - 0.125).abs() / 0.125 < 0.03, "variance {}", total);
    }

    #[test]
    fn test_monochromatic_wave() {
        let x = sine(4800, 4.0, 0.1, 0.5, 20.0);
        let stats = SpectralStats::compute(&x, 4.0, &StatsSettings::default()).unwrap();
        let expected_hm0 = 4.0 * (0.125f64).sqrt();
        assert!((stats.hm0 - expected_hm0).abs() / expected_hm0 < 0.03, "hm0 {}", stats.hm0);
        assert!((stats.h10 / stats.hm0 - 5.1 / 4.0).abs() < 1e-12);
        assert!((stats.tp - 10.0).abs() < 0.5, "tp {}", stats.tp);
        assert!((stats.t_0_2 - 10.0).abs() < 0.5, "t_0_2 {}", stats.t_0_2);
        assert!(stats.eps2 < 0.2);
    }

    #[test]
    fn test_energy_outside_band_is_ignored() {
        // 60 s swell is below the default 1/30 Hz cutoff.
        let x = sine(4800, 4.0, 1.0 / 60.0, 1.0, 0.0);
        let stats = SpectralStats::compute(&x, 4.0, &StatsSettings::default()).unwrap();
        assert!(stats.hm0 < 0.5, "hm0 {}", stats.hm0);
    }

    #[test]
    fn test_short_burst_is_nan() {
        let stats = SpectralStats::compute(&[1.0, 2.0, 3.0], 4.0, &StatsSettings::default()).unwrap();
        assert!(stats.values().iter().all(|v| v.is_nan()));
    }
}

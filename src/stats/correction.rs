//! Pressure response correction.
//!
//! A bottom-mounted pressure sensor sees the surface wave attenuated by
//! `Kp = cosh(k z) / cosh(k h)` (linear wave theory). Inside the
//! correction band every Fourier component is divided by `Kp`; above the
//! band components are removed, since their amplification is mostly noise.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::util::{detrend_linear, mean};

pub const GRAVITY: f64 = 9.81;

#[derive(Debug, Clone, PartialEq)]
pub struct PressureCorrection {
    /// Height of the sensor above the sea bed, m.
    pub sensor_height_m: f64,
    pub min_freq_hz: f64,
    pub max_freq_hz: f64,
    /// Upper limit on `1/Kp`.
    pub max_gain: f64,
}

impl Default for PressureCorrection {
    fn default() -> Self {
        Self {
            sensor_height_m: 0.0,
            min_freq_hz: 0.05,
            max_freq_hz: 0.33,
            max_gain: 5.0,
        }
    }
}

/// Solves `omega^2 = g k tanh(k h)` for the wave number `k`.
pub fn wave_number(freq_hz: f64, depth_m: f64) -> f64 {
    let omega = 2.0 * std::f64::consts::PI * freq_hz;
    if omega <= 0.0 || depth_m <= 0.0 {
        return 0.0;
    }
    let deep = omega * omega / GRAVITY;
    let mut k = deep / (deep * depth_m).tanh().sqrt();
    for _ in 0..50 {
        let th = (k * depth_m).tanh();
        let f = GRAVITY * k * th - omega * omega;
        let df = GRAVITY * th + GRAVITY * k * depth_m * (1.0 - th * th);
        let next = k - f / df;
        if (next - k).abs() < 1e-12 * k {
            return next;
        }
        k = next;
    }
    k
}

impl PressureCorrection {
    /// Gain applied to a component of frequency `freq_hz`.
    pub fn gain(&self, freq_hz: f64, water_depth_m: f64) -> f64 {
        if freq_hz < self.min_freq_hz {
            return 1.0;
        }
        if freq_hz > self.max_freq_hz {
            return 0.0;
        }
        let k = wave_number(freq_hz, water_depth_m);
        let kp = (k * self.sensor_height_m).cosh() / (k * water_depth_m).cosh();
        (1.0 / kp).min(self.max_gain)
    }

    /// Corrects a burst of depth above the sensor, in meters.
    pub fn apply(&self, depth: &[f64], sampling_rate: f64) -> Vec<f64> {
        let n = depth.len();
        if n < 2 {
            return depth.to_vec();
        }
        let water_depth = mean(depth) + self.sensor_height_m;
        let detrended = detrend_linear(depth);

        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(n);
        let inverse = planner.plan_fft_inverse(n);

        let mut buffer: Vec<Complex<f64>> = detrended.iter().map(|&x| Complex::new(x, 0.0)).collect();
        forward.process(&mut buffer);
        for (k, c) in buffer.iter_mut().enumerate() {
            let bin = k.min(n - k);
            let freq = bin as f64 * sampling_rate / n as f64;
            *c *= self.gain(freq, water_depth);
        }
        inverse.process(&mut buffer);

        depth
            .iter()
            .zip(&detrended)
            .zip(&buffer)
            .map(|((&orig, &flat), c)| (orig - flat) + c.re / n as f64)
            .collect()
    }
}

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use std::str::FromStr;

use crate::stats::Method;

pub fn positive_parser(s: &str) -> Result<f64, String> {
    let s = s.trim();
    f64::from_str(s)
        .map_err(|e| format!("Invalid value '{}': {}", s, e))
        .and_then(|v| {
            if v.is_finite() && v > 0.0 {
                Ok(v)
            } else {
                Err(format!("Value must be positive, got {}", v))
            }
        })
}

pub fn latitude_parser(s: &str) -> Result<f64, String> {
    let s = s.trim();
    let lat = f64::from_str(s).map_err(|e| format!("Invalid latitude '{}': {}", s, e))?;
    if (-90.0..=90.0).contains(&lat) {
        Ok(lat)
    } else {
        Err(format!("Latitude must be within [-90, 90], got {}", lat))
    }
}

pub fn timezone_parser(s: &str) -> Result<Tz, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Time zone cannot be empty".to_string());
    }
    s.parse::<Tz>().map_err(|_| format!("Unknown time zone: {}", s))
}

pub fn method_parser(s: &str) -> Result<Method, String> {
    Method::from_str(s).map_err(|e| e.to_string())
}

/// Accepts RFC 3339 (`2024-05-01T12:00:00-07:00`) or a bare
/// `YYYY-MM-DD HH:MM:SS`, which is read as UTC.
pub fn timestamp_parser(s: &str) -> Result<DateTime<FixedOffset>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|e| format!("Invalid timestamp '{}': {}", s, e))
}

pub fn mean(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    x.iter().sum::<f64>() / x.len() as f64
}

/// Removes the least-squares line from `x`, indexing samples 0..n.
pub fn detrend_linear(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n < 2 {
        return x.iter().map(|v| v - mean(x)).collect();
    }
    let t_mean = (n - 1) as f64 / 2.0;
    let x_mean = mean(x);
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &v) in x.iter().enumerate() {
        let dt = i as f64 - t_mean;
        num += dt * (v - x_mean);
        den += dt * dt;
    }
    let slope = num / den;
    x.iter()
        .enumerate()
        .map(|(i, &v)| v - (x_mean + slope * (i as f64 - t_mean)))
        .collect()
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

pub fn hann(n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![1.0; n];
    }
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / (n - 1) as f64).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_parser() {
        assert_eq!(positive_parser("4"), Ok(4.0));
        assert_eq!(positive_parser(" 17.5 "), Ok(17.5));
        assert!(positive_parser("0").is_err());
        assert!(positive_parser("-1").is_err());
        assert!(positive_parser("abc").is_err());
    }

    #[test]
    fn test_latitude_parser() {
        assert_eq!(latitude_parser("33.72"), Ok(33.72));
        assert!(latitude_parser("91").is_err());
    }

    #[test]
    fn test_timezone_parser() {
        assert_eq!(timezone_parser("UTC"), Ok(chrono_tz::UTC));
        assert_eq!(
            timezone_parser("America/Los_Angeles"),
            Ok(chrono_tz::America::Los_Angeles)
        );
        assert!(timezone_parser("Mars/Olympus_Mons").is_err());
        assert!(timezone_parser("").is_err());
    }

    #[test]
    fn test_timestamp_parser() {
        let a = timestamp_parser("2024-05-01T12:00:00-07:00").unwrap();
        let b = timestamp_parser("2024-05-01 19:00:00").unwrap();
        assert_eq!(a, b);
        assert!(timestamp_parser("yesterday").is_err());
    }

    #[test]
    fn test_detrend_removes_line() {
        let x: Vec<f64> = (0..50).map(|i| 3.0 + 0.5 * i as f64).collect();
        let d = detrend_linear(&x);
        assert!(d.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_math_helpers() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        let w = hann(5);
        assert_eq!(w[0], 0.0);
        assert!((w[2] - 1.0).abs() < 1e-12);
    }
}

//! KDL configuration file.
//!
//! ```kdl
//! site latitude=33.72 timezone="America/Los_Angeles" sensor-height=0.2
//! bursts sampling-rate=4.0 burst-length=60.0 method="spectral"
//! spectral lower-band=0.0333 upper-band=0.3 segments=8
//! correction enabled=true min-freq=0.05 max-freq=0.33 max-gain=5.0
//! ingest atmospheric-pressure=1013.25
//! ```
//!
//! Every node and property is optional.

use chrono_tz::Tz;
use directories::ProjectDirs;
use knuffel::Decode;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::depth::STANDARD_ATMOSPHERE_MBAR;
use crate::error::OwhlError;
use crate::stats::{Method, PressureCorrection, SpectralSettings, StatsSettings};
use crate::util::timezone_parser;

pub const DEFAULT_SAMPLING_RATE: f64 = 4.0;

#[derive(Decode, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwhlConfig {
    #[knuffel(child)]
    pub site: Option<SiteConfig>,
    #[knuffel(child)]
    pub bursts: Option<BurstConfig>,
    #[knuffel(child)]
    pub spectral: Option<SpectralConfig>,
    #[knuffel(child)]
    pub correction: Option<CorrectionConfig>,
    #[knuffel(child)]
    pub ingest: Option<IngestConfig>,
}

#[derive(Decode, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    #[knuffel(property)]
    pub latitude: Option<f64>,
    #[knuffel(property)]
    pub timezone: Option<String>,
    #[knuffel(property(name = "sensor-height"))]
    pub sensor_height: Option<f64>,
}

#[derive(Decode, Debug, Clone, Default, Serialize, Deserialize)]
pub struct BurstConfig {
    #[knuffel(property(name = "sampling-rate"))]
    pub sampling_rate: Option<f64>,
    #[knuffel(property(name = "burst-length"))]
    pub burst_length: Option<f64>,
    #[knuffel(property)]
    pub method: Option<String>,
}

#[derive(Decode, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpectralConfig {
    #[knuffel(property(name = "lower-band"))]
    pub lower_band: Option<f64>,
    #[knuffel(property(name = "upper-band"))]
    pub upper_band: Option<f64>,
    #[knuffel(property)]
    pub segments: Option<usize>,
}

#[derive(Decode, Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrectionConfig {
    #[knuffel(property)]
    pub enabled: Option<bool>,
    #[knuffel(property(name = "min-freq"))]
    pub min_freq: Option<f64>,
    #[knuffel(property(name = "max-freq"))]
    pub max_freq: Option<f64>,
    #[knuffel(property(name = "max-gain"))]
    pub max_gain: Option<f64>,
}

#[derive(Decode, Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    #[knuffel(property(name = "atmospheric-pressure"))]
    pub atmospheric_pressure: Option<f64>,
}

impl OwhlConfig {
    pub fn parse(name: &str, content: &str) -> crate::error::Result<Self> {
        knuffel::parse(name, content).map_err(|e| OwhlError::Config(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::parse(&path.display().to_string(), &content)
    }

    /// `<config dir>/config.kdl` for this user.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "owhl", "owhl").map(|dirs| dirs.config_dir().join("config.kdl"))
    }

    /// Loads `path` if given, otherwise the per-user file if it exists,
    /// otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> crate::error::Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                debug!("Using config {}", path.display());
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn latitude(&self) -> Option<f64> {
        self.site.as_ref().and_then(|s| s.latitude)
    }

    pub fn timezone(&self) -> crate::error::Result<Tz> {
        match self.site.as_ref().and_then(|s| s.timezone.as_deref()) {
            Some(name) => timezone_parser(name).map_err(|_| OwhlError::UnknownTimeZone(name.to_string())),
            None => Ok(chrono_tz::UTC),
        }
    }

    pub fn sampling_rate(&self) -> f64 {
        self.bursts
            .as_ref()
            .and_then(|b| b.sampling_rate)
            .unwrap_or(DEFAULT_SAMPLING_RATE)
    }

    pub fn burst_length(&self) -> Option<f64> {
        self.bursts.as_ref().and_then(|b| b.burst_length)
    }

    pub fn method(&self) -> crate::error::Result<Method> {
        match self.bursts.as_ref().and_then(|b| b.method.as_deref()) {
            Some(name) => name.parse(),
            None => Ok(Method::default()),
        }
    }

    pub fn atmospheric_pressure(&self) -> f64 {
        self.ingest
            .as_ref()
            .and_then(|i| i.atmospheric_pressure)
            .unwrap_or(STANDARD_ATMOSPHERE_MBAR)
    }

    pub fn stats_settings(&self) -> StatsSettings {
        let defaults = SpectralSettings::default();
        let spectral = match &self.spectral {
            Some(s) => SpectralSettings {
                lower_band_hz: s.lower_band.unwrap_or(defaults.lower_band_hz),
                upper_band_hz: s.upper_band.unwrap_or(defaults.upper_band_hz),
                segments: s.segments.unwrap_or(defaults.segments),
            },
            None => defaults,
        };

        let correction = self
            .correction
            .as_ref()
            .filter(|c| c.enabled.unwrap_or(false))
            .map(|c| {
                let defaults = PressureCorrection::default();
                PressureCorrection {
                    sensor_height_m: self
                        .site
                        .as_ref()
                        .and_then(|s| s.sensor_height)
                        .unwrap_or(defaults.sensor_height_m),
                    min_freq_hz: c.min_freq.unwrap_or(defaults.min_freq_hz),
                    max_freq_hz: c.max_freq.unwrap_or(defaults.max_freq_hz),
                    max_gain: c.max_gain.unwrap_or(defaults.max_gain),
                }
            });

        StatsSettings { spectral, correction }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OwhlConfig::default();
        assert_eq!(config.latitude(), None);
        assert_eq!(config.timezone().unwrap(), chrono_tz::UTC);
        assert_eq!(config.sampling_rate(), 4.0);
        assert_eq!(config.burst_length(), None);
        assert_eq!(config.method().unwrap(), Method::Spectral);
        assert_eq!(config.atmospheric_pressure(), STANDARD_ATMOSPHERE_MBAR);
        assert_eq!(config.stats_settings(), StatsSettings::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config = OwhlConfig::parse(
            "test.kdl",
            r#"
            site latitude=33.72 timezone="America/Los_Angeles" sensor-height=0.2
            bursts sampling-rate=2.0 burst-length=17.0 method="zero-crossing"
            spectral lower-band=0.05 segments=4
            correction enabled=true max-gain=3.0
            ingest atmospheric-pressure=1010.0
            "#,
        )
        .unwrap();

        assert_eq!(config.latitude(), Some(33.72));
        assert_eq!(config.timezone().unwrap(), chrono_tz::America::Los_Angeles);
        assert_eq!(config.sampling_rate(), 2.0);
        assert_eq!(config.burst_length(), Some(17.0));
        assert_eq!(config.method().unwrap(), Method::ZeroCrossing);
        assert_eq!(config.atmospheric_pressure(), 1010.0);

        let stats = config.stats_settings();
        assert_eq!(stats.spectral.lower_band_hz, 0.05);
        assert_eq!(stats.spectral.upper_band_hz, 0.3);
        assert_eq!(stats.spectral.segments, 4);
        let correction = stats.correction.unwrap();
        assert_eq!(correction.sensor_height_m, 0.2);
        assert_eq!(correction.max_gain, 3.0);
        assert_eq!(correction.min_freq_hz, 0.05);
    }

    #[test]
    fn test_disabled_correction_is_none() {
        let config = OwhlConfig::parse("test.kdl", "correction enabled=false max-gain=3.0").unwrap();
        assert!(config.stats_settings().correction.is_none());
    }

    #[test]
    fn test_bad_values_are_reported() {
        let config = OwhlConfig::parse("test.kdl", r#"site timezone="Nowhere/Special""#).unwrap();
        assert!(matches!(config.timezone(), Err(OwhlError::UnknownTimeZone(_))));
        let config = OwhlConfig::parse("test.kdl", r#"bursts method="fourier""#).unwrap();
        assert!(matches!(config.method(), Err(OwhlError::UnknownMethod(_))));
        assert!(OwhlConfig::parse("test.kdl", "site latitude=").is_err());
    }
}

// src/config.rs
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::drivers::PlotterError;
use crate::types::{ChannelStyle, Rgb};

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "PLOTTER_CONFIG";

// Optional per-channel overrides; unset fields keep the defaults
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub title: Option<String>,
    pub color: Option<Rgb>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub max_points: Option<usize>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PlotterConfig {
    pub num_channels: usize,
    pub max_points: usize,
    pub refresh_hz: f64,
    pub read_timeout_ms: u64,
    pub max_line_len: usize,
    pub baud_rate: String,
    pub port: Option<String>,
    pub channels: Vec<ChannelConfig>,
}

impl Default for PlotterConfig {
    fn default() -> Self {
        Self {
            num_channels: 4,
            max_points: 500,
            refresh_hz: 60.0,
            read_timeout_ms: 100,
            max_line_len: 4096,
            baud_rate: "115200".to_owned(),
            port: None,
            channels: Vec::new(),
        }
    }
}

impl PlotterConfig {
    /// Reads the file named by `PLOTTER_CONFIG`, or returns the defaults.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                log::info!("{CONFIG_ENV} not set, using default configuration");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PlotterError> {
        if self.num_channels == 0 {
            return Err(PlotterError::InvalidConfig("num_channels must be at least 1".into()));
        }
        if self.capacities().contains(&0) {
            return Err(PlotterError::InvalidConfig("max_points must be at least 1".into()));
        }
        if !self.refresh_hz.is_finite() || self.refresh_hz <= 0.0 {
            return Err(PlotterError::InvalidConfig(format!(
                "refresh_hz must be positive, got {}",
                self.refresh_hz
            )));
        }
        if self.read_timeout_ms == 0 {
            return Err(PlotterError::InvalidConfig("read_timeout_ms must be at least 1".into()));
        }
        if self.channels.len() > self.num_channels {
            log::warn!(
                "config lists {} channel overrides for {} channels; extras ignored",
                self.channels.len(),
                self.num_channels
            );
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Initial capacity of every channel, overrides applied.
    pub fn capacities(&self) -> Vec<usize> {
        (0..self.num_channels)
            .map(|i| {
                self.channels
                    .get(i)
                    .and_then(|c| c.max_points)
                    .unwrap_or(self.max_points)
            })
            .collect()
    }

    pub fn styles(&self) -> Vec<ChannelStyle> {
        (0..self.num_channels)
            .map(|i| {
                let mut style = ChannelStyle::default_for(i);
                if let Some(over) = self.channels.get(i) {
                    if let Some(title) = &over.title {
                        style.title = title.clone();
                    }
                    if let Some(color) = over.color {
                        style.color = color;
                    }
                    if let Some(x_label) = &over.x_label {
                        style.x_label = x_label.clone();
                    }
                    if let Some(y_label) = &over.y_label {
                        style.y_label = y_label.clone();
                    }
                }
                style
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_four_channel_layout() {
        let config = PlotterConfig::default();
        config.validate().unwrap();
        assert_eq!(config.capacities(), vec![500; 4]);
        let styles = config.styles();
        assert_eq!(styles[0].color, Rgb(0, 255, 255));
        assert_eq!(styles[3].title, "Channel 4");
        assert_eq!(styles[1].y_label, "Amplitude");
    }

    #[test]
    fn partial_json_overrides_defaults() {
        let config = PlotterConfig::from_json(
            r#"{ "num_channels": 2, "refresh_hz": 30,
                 "channels": [ {}, { "title": "Pressure", "color": [1, 2, 3], "max_points": 50 } ] }"#,
        )
        .unwrap();
        assert_eq!(config.capacities(), vec![500, 50]);
        assert_eq!(config.read_timeout(), Duration::from_millis(100));
        let styles = config.styles();
        assert_eq!(styles[0].title, "Channel 1");
        assert_eq!(styles[1].title, "Pressure");
        assert_eq!(styles[1].color, Rgb(1, 2, 3));
    }

    #[test]
    fn rejects_unusable_values() {
        assert!(PlotterConfig::from_json(r#"{ "num_channels": 0 }"#).is_err());
        assert!(PlotterConfig::from_json(r#"{ "max_points": 0 }"#).is_err());
        assert!(PlotterConfig::from_json(r#"{ "refresh_hz": -5 }"#).is_err());
        assert!(PlotterConfig::from_json(r#"{ "read_timeout_ms": 0 }"#).is_err());
        assert!(PlotterConfig::from_json("not json").is_err());
    }
}

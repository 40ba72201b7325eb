//! Controller configuration schema and loader
//!
//! Configuration is stored as YAML in the user's config directory.
//! Default location: ~/.config/inpulse-midi/inpulse500.yaml (Linux)

use crate::leds::color;
use crate::types::{DeckChannel, DeckSlot};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Smallest slicer domain (one beat per pad)
pub const MIN_SLICER_DOMAIN: u32 = 8;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("slicer domain {0} must be a power of two and a multiple of 8")]
    InvalidDomain(u32),

    #[error("tempo tick interval must be non-zero")]
    ZeroTickInterval,

    #[error("{channel} cannot be bound to {slot}")]
    ChannelOnWrongSide { slot: DeckSlot, channel: DeckChannel },

    #[error("port_match must not be empty")]
    EmptyPortMatch,
}

/// Root controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Port name substring to match (case-insensitive)
    pub port_match: String,

    /// Tempo/phase indicator refresh period in milliseconds
    pub tempo_tick_ms: u64,

    /// Beat slicer settings
    pub slicer: SlicerConfig,

    /// Channels bound to each side at startup
    pub initial_channels: InitialChannels,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            port_match: "DJControl Inpulse 500".to_string(),
            tempo_tick_ms: 250,
            slicer: SlicerConfig::default(),
            initial_channels: InitialChannels::default(),
        }
    }
}

impl ControllerConfig {
    /// Tempo tick period
    pub fn tempo_tick(&self) -> Duration {
        Duration::from_millis(self.tempo_tick_ms)
    }

    /// Check the configuration for values the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port_match.trim().is_empty() {
            return Err(ConfigError::EmptyPortMatch);
        }
        if self.tempo_tick_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if !is_valid_domain(self.slicer.domain) {
            return Err(ConfigError::InvalidDomain(self.slicer.domain));
        }
        for (slot, channel) in [
            (DeckSlot::A, self.initial_channels.a),
            (DeckSlot::B, self.initial_channels.b),
        ] {
            if channel.slot() != slot {
                return Err(ConfigError::ChannelOnWrongSide { slot, channel });
            }
        }
        Ok(())
    }
}

/// Beat slicer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicerConfig {
    /// Beats per slicer cycle (8 pads share the domain equally)
    pub domain: u32,
    /// Pad colors
    pub colors: SlicerColors,
}

impl Default for SlicerConfig {
    fn default() -> Self {
        Self {
            domain: MIN_SLICER_DOMAIN,
            colors: SlicerColors::default(),
        }
    }
}

/// Pad color values used by the slicer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicerColors {
    /// Pad of the section under the playhead
    pub playhead: u8,
    /// Every other pad
    pub idle: u8,
    /// Pad whose slice is playing after a press
    pub triggered: u8,
}

impl Default for SlicerColors {
    fn default() -> Self {
        Self {
            playhead: color::WHITE,
            idle: color::BLUE,
            triggered: color::TRIGGERED,
        }
    }
}

/// Startup channel for each side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialChannels {
    pub a: DeckChannel,
    pub b: DeckChannel,
}

impl Default for InitialChannels {
    fn default() -> Self {
        Self {
            a: DeckChannel::CHANNEL_1,
            b: DeckChannel::CHANNEL_2,
        }
    }
}

/// Directory under the platform config dir holding the controller config
const CONFIG_DIR_NAME: &str = "inpulse-midi";

/// Config file name
const CONFIG_FILE_NAME: &str = "inpulse500.yaml";

/// Valid slicer domains are powers of two that are multiples of 8
pub fn is_valid_domain(domain: u32) -> bool {
    domain >= MIN_SLICER_DOMAIN && domain.is_power_of_two()
}

/// Get the default config file path
///
/// Returns: <config dir>/inpulse-midi/inpulse500.yaml, falling back to the
/// working directory when the platform has no config directory
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Load controller configuration from a YAML file
///
/// If the file doesn't exist, returns the defaults.
/// If the file exists but is unreadable or invalid, logs a warning and
/// returns the defaults.
pub fn load_config(path: &Path) -> ControllerConfig {
    log::info!("load_config: Loading from {:?}", path);

    if !path.exists() {
        log::info!("load_config: Config file doesn't exist, using defaults");
        return ControllerConfig::default();
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            log::warn!("load_config: Failed to read config file: {}", e);
            return ControllerConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            log::info!(
                "load_config: port '{}', tick {}ms, slicer domain {}, channels {} / {}",
                config.port_match,
                config.tempo_tick_ms,
                config.slicer.domain,
                config.initial_channels.a,
                config.initial_channels.b
            );
            config
        }
        Err(e) => {
            log::warn!("load_config: {:#}", e);
            ControllerConfig::default()
        }
    }
}

/// Parse and validate configuration YAML
pub fn parse_config(yaml: &str) -> anyhow::Result<ControllerConfig> {
    use anyhow::Context;

    let config: ControllerConfig = serde_yaml::from_str(yaml).context("Failed to parse config")?;
    config.validate().context("Invalid config")?;
    Ok(config)
}

/// Save controller configuration to a YAML file
///
/// Creates parent directories if they don't exist.
pub fn save_config(config: &ControllerConfig, path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    log::info!("save_config: Saving to {:?}", path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    std::fs::write(path, yaml).with_context(|| format!("Failed to write config file: {:?}", path))?;

    log::info!("save_config: Config saved successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ControllerConfig::default();
        assert_eq!(config.tempo_tick(), Duration::from_millis(250));
        assert_eq!(config.slicer.domain, 8);
        assert_eq!(config.slicer.colors.triggered, 0x62);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_path_is_crate_specific() {
        let path = default_config_path();
        assert!(path.ends_with("inpulse-midi/inpulse500.yaml"));
        assert!(!path.components().any(|c| c.as_os_str() == "mesh-collection"));
    }

    #[test]
    fn test_yaml_parsing_partial() {
        let yaml = r#"
tempo_tick_ms: 100
slicer:
  domain: 16
initial_channels:
  a: 3
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.tempo_tick_ms, 100);
        assert_eq!(config.slicer.domain, 16);
        assert_eq!(config.slicer.colors, SlicerColors::default());
        assert_eq!(config.initial_channels.a, DeckChannel::CHANNEL_3);
        assert_eq!(config.initial_channels.b, DeckChannel::CHANNEL_2);
        assert_eq!(config.port_match, "DJControl Inpulse 500");
    }

    #[test]
    fn test_validation() {
        let mut config = ControllerConfig::default();
        config.slicer.domain = 12;
        assert_eq!(config.validate(), Err(ConfigError::InvalidDomain(12)));
        config.slicer.domain = 4;
        assert_eq!(config.validate(), Err(ConfigError::InvalidDomain(4)));
        config.slicer.domain = 32;
        assert!(config.validate().is_ok());

        config.tempo_tick_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTickInterval));
        config.tempo_tick_ms = 250;

        config.initial_channels.a = DeckChannel::CHANNEL_2;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ChannelOnWrongSide {
                slot: DeckSlot::A,
                channel: DeckChannel::CHANNEL_2
            })
        );
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        assert!(parse_config("slicer:\n  domain: 6\n").is_err());
        assert!(parse_config("initial_channels:\n  b: 9\n").is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("inpulse-midi-missing-config-test.yaml");
        let _ = std::fs::remove_file(&path);
        assert_eq!(load_config(&path), ControllerConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("inpulse-midi-config-{}", std::process::id()));
        let path = dir.join("inpulse500.yaml");

        let mut config = ControllerConfig::default();
        config.slicer.domain = 16;
        config.initial_channels.b = DeckChannel::CHANNEL_4;
        save_config(&config, &path).unwrap();

        assert_eq!(load_config(&path), config);
        let _ = std::fs::remove_dir_all(&dir);
    }
}

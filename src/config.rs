//! TOML configuration for the daemon, plus a small duration-string parser
//! for the four durations the state machine needs.

use crate::core::state_machine::PowerStateMachineConfig;
use crate::core::types::InactivityTimeout;
use serde::Deserialize;
use std::num::ParseIntError;
use std::time::Duration;
use thiserror::Error;

/// Errors arising while parsing a daemon configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration as TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("syntax error in duration: component {0} has no recognised unit (s/m/h)")]
    UnrecognisedUnit(String),

    #[error("syntax error in duration: empty component")]
    EmptyComponent,

    #[error("duration component {0} overflows")]
    Overflow(String),

    #[error("numeric component of {0} couldn't be parsed: {1}")]
    NotNumeric(String, ParseIntError),
}

type Result<T> = std::result::Result<T, ConfigError>;

/// Raw, serde-deserialized shape of the configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    power_button_long_press_timeout: String,
    user_inactivity_normal_display_dim_duration: String,
    user_inactivity_reduced_display_off_timeout: String,
    user_inactivity_normal_display_off_timeout: String,
    #[serde(default)]
    user_inactivity_normal_display_off_timeout_infinite: bool,
    #[serde(default = "default_backlight_device")]
    backlight_device: String,
}

fn default_backlight_device() -> String {
    "intel_backlight".to_owned()
}

/// Parsed, ready-to-use daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_machine: PowerStateMachineConfigOwned,
    pub backlight_device: String,
}

/// [PowerStateMachineConfig] plus the initial, possibly-infinite normal
/// off timeout, which the state machine stores as mutable state rather
/// than fixed configuration (`handle_set_inactivity_timeout` can change it
/// at runtime).
#[derive(Debug, Clone, Copy)]
pub struct PowerStateMachineConfigOwned {
    pub fixed: PowerStateMachineConfig,
    pub initial_normal_display_off_timeout: InactivityTimeout,
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Config> {
        let raw: RawConfig = toml::from_str(contents)?;
        Config::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Config> {
        let fixed = PowerStateMachineConfig {
            power_button_long_press_timeout: parse_duration(
                &raw.power_button_long_press_timeout,
            )?,
            user_inactivity_normal_display_dim_duration: parse_duration(
                &raw.user_inactivity_normal_display_dim_duration,
            )?,
            user_inactivity_reduced_display_off_timeout: parse_duration(
                &raw.user_inactivity_reduced_display_off_timeout,
            )?,
        };
        let initial_normal_display_off_timeout = if raw.user_inactivity_normal_display_off_timeout_infinite
        {
            InactivityTimeout::Infinite
        } else {
            InactivityTimeout::Finite(parse_duration(
                &raw.user_inactivity_normal_display_off_timeout,
            )?)
        };
        Ok(Config {
            state_machine: PowerStateMachineConfigOwned {
                fixed,
                initial_normal_display_off_timeout,
            },
            backlight_device: raw.backlight_device,
        })
    }

    pub fn default_for_testing() -> Config {
        Config {
            state_machine: PowerStateMachineConfigOwned {
                fixed: PowerStateMachineConfig {
                    power_button_long_press_timeout: Duration::from_secs(2),
                    user_inactivity_normal_display_dim_duration: Duration::from_secs(10),
                    user_inactivity_reduced_display_off_timeout: Duration::from_secs(3),
                },
                initial_normal_display_off_timeout: InactivityTimeout::Finite(Duration::from_secs(
                    60,
                )),
            },
            backlight_device: default_backlight_device(),
        }
    }
}

/// Parse a whitespace-separated duration string like `"1h 30s"`.
pub fn parse_duration(string: &str) -> Result<Duration> {
    let mut seconds: u64 = 0;
    for component in string.split_ascii_whitespace() {
        seconds += match component.chars().last() {
            Some('s') => parse_duration_numeric(component)?,
            Some('m') => parse_duration_numeric(component)?
                .checked_mul(60)
                .ok_or_else(|| ConfigError::Overflow(component.to_owned()))?,
            Some('h') => parse_duration_numeric(component)?
                .checked_mul(3600)
                .ok_or_else(|| ConfigError::Overflow(component.to_owned()))?,
            Some(_) => return Err(ConfigError::UnrecognisedUnit(component.to_owned())),
            None => return Err(ConfigError::EmptyComponent),
        };
    }
    Ok(Duration::from_secs(seconds))
}

fn parse_duration_numeric(component: &str) -> Result<u64> {
    component[0..component.len() - 1]
        .parse()
        .map_err(|e| ConfigError::NotNumeric(component.to_owned(), e))
}

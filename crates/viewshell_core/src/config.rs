//! Shell configuration.
//!
//! # Responsibility
//! - Carry every selector name, delay and threshold the shell uses.
//! - Load overrides from JSON and reject inconsistent values up front.
//!
//! # Invariants
//! - Every field has a default, so `{}` is a valid configuration.
//! - The enter delay is strictly shorter than the exit delay.
//! - The default view ends with the fragment extension.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    /// View loaded when the address carries no (or an empty) hash.
    pub default_view: String,
    /// `id` of the mount point element in the shell.
    pub mount_id: String,
    /// Anchor attribute that opts a link into routing.
    pub route_attribute: String,
    /// Attribute naming the view on a fragment's `<main>` container.
    pub view_attribute: String,
    /// `id` of the legacy container used when a fragment has no view container.
    pub legacy_container_id: String,
    pub fragment_extension: String,
    pub exit_delay_ms: u64,
    pub enter_delay_ms: u64,
    pub splash_timeout_ms: u64,
    pub carousel_fallback_ms: u64,
    pub desktop_min_width: f64,
    pub reveal_threshold: f64,
    /// Bottom root margin of the reveal observer, in percent of viewport height.
    pub reveal_bottom_margin_pct: f64,
    pub cursor_offset_px: f64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            default_view: "views/hero.html".to_string(),
            mount_id: "view".to_string(),
            route_attribute: "data-route".to_string(),
            view_attribute: "data-view".to_string(),
            legacy_container_id: "page".to_string(),
            fragment_extension: ".html".to_string(),
            exit_delay_ms: 1000,
            enter_delay_ms: 240,
            splash_timeout_ms: 2200,
            carousel_fallback_ms: 500,
            desktop_min_width: 1024.0,
            reveal_threshold: 0.12,
            reveal_bottom_margin_pct: 10.0,
            cursor_offset_px: 12.0,
        }
    }
}

impl ShellConfig {
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_view.trim().is_empty() {
            return Err(ConfigError::invalid("default_view", "must not be empty"));
        }
        for (field, value) in [
            ("mount_id", &self.mount_id),
            ("route_attribute", &self.route_attribute),
            ("view_attribute", &self.view_attribute),
            ("legacy_container_id", &self.legacy_container_id),
        ] {
            if !is_valid_name(value) {
                return Err(ConfigError::invalid(
                    field,
                    "must be a non-empty [A-Za-z0-9_-] name",
                ));
            }
        }
        if !self.fragment_extension.starts_with('.') || self.fragment_extension.len() < 2 {
            return Err(ConfigError::invalid(
                "fragment_extension",
                "must start with `.` followed by an extension",
            ));
        }
        if !self.default_view.ends_with(&self.fragment_extension)
            || self.default_view.len() <= self.fragment_extension.len()
        {
            return Err(ConfigError::invalid(
                "default_view",
                "must end with fragment_extension",
            ));
        }
        if !(self.desktop_min_width.is_finite()
            && self.desktop_min_width > 0.0
            && self.desktop_min_width <= f64::from(u32::MAX))
        {
            return Err(ConfigError::invalid(
                "desktop_min_width",
                "must be a finite positive width",
            ));
        }
        if self.enter_delay_ms >= self.exit_delay_ms {
            return Err(ConfigError::invalid(
                "enter_delay_ms",
                "must be shorter than exit_delay_ms",
            ));
        }
        if !(0.0..=1.0).contains(&self.reveal_threshold) {
            return Err(ConfigError::invalid("reveal_threshold", "must be within 0..=1"));
        }
        if !(0.0..100.0).contains(&self.reveal_bottom_margin_pct) {
            return Err(ConfigError::invalid(
                "reveal_bottom_margin_pct",
                "must be within 0..100",
            ));
        }
        Ok(())
    }

    pub fn exit_delay(&self) -> Duration {
        Duration::from_millis(self.exit_delay_ms)
    }

    pub fn enter_delay(&self) -> Duration {
        Duration::from_millis(self.enter_delay_ms)
    }

    pub fn splash_timeout(&self) -> Duration {
        Duration::from_millis(self.splash_timeout_ms)
    }

    pub fn carousel_fallback(&self) -> Duration {
        Duration::from_millis(self.carousel_fallback_ms)
    }

    /// Desktop breakpoint in whole pixels, as the slide library expects it.
    pub fn desktop_breakpoint(&self) -> u32 {
        self.desktop_min_width.round() as u32
    }
}

fn is_valid_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid config `{field}`: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

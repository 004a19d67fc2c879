//! Bridge configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional JSON file, and
//! `PICOMAC_*` environment variables.

use std::path::{Path, PathBuf};

use picomac_input::keycode::raw_key;
use picomac_input::{InputConfig, PointerBindings};
use picomac_shared::InputMode;
use picomac_video::{GeometryError, ScreenGeometry, VISIBLE_HEIGHT, VISIBLE_WIDTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::machine::TickTimings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value {value:?} for env var {var}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("unknown key name {0:?}")]
    UnknownKey(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("{0} must be non-zero")]
    ZeroPeriod(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartMode {
    Key,
    #[default]
    Pointer,
}

impl From<StartMode> for InputMode {
    fn from(mode: StartMode) -> Self {
        match mode {
            StartMode::Key => InputMode::Key,
            StartMode::Pointer => InputMode::Pointer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormatKind {
    #[default]
    Rgb565,
    Rgb111,
}

/// Pointer-mode key assignments, by key name (see `raw_key::from_name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BindingNames {
    pub mode_toggle: String,
    pub left: String,
    pub right: String,
    pub up: String,
    pub down: String,
    pub button: String,
    pub speed: String,
}

impl Default for BindingNames {
    fn default() -> Self {
        Self {
            mode_toggle: "right_shift".into(),
            left: "left".into(),
            right: "right".into(),
            up: "up".into(),
            down: "down".into(),
            button: "enter".into(),
            speed: "space".into(),
        }
    }
}

impl BindingNames {
    pub fn resolve(&self) -> Result<PointerBindings, ConfigError> {
        let key = |name: &String| {
            raw_key::from_name(name).ok_or_else(|| ConfigError::UnknownKey(name.clone()))
        };
        Ok(PointerBindings {
            mode_toggle: key(&self.mode_toggle)?,
            left: key(&self.left)?,
            right: key(&self.right)?,
            up: key(&self.up)?,
            down: key(&self.down)?,
            button: key(&self.button)?,
            speed: key(&self.speed)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub initial_mode: StartMode,
    pub bindings: BindingNames,
    pub pixel_format: PixelFormatKind,
    pub virtual_width: u32,
    pub virtual_height: u32,
    pub viewport_margin: u32,
    /// Scanlines drawn between keyboard polls during scan-out. Zero disables interleaving.
    pub rows_per_poll: u32,
    pub vsync_period_us: u64,
    pub one_hz_period_us: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let geometry = ScreenGeometry::default();
        let timings = TickTimings::default();
        Self {
            initial_mode: StartMode::default(),
            bindings: BindingNames::default(),
            pixel_format: PixelFormatKind::default(),
            virtual_width: geometry.virtual_width,
            virtual_height: geometry.virtual_height,
            viewport_margin: geometry.margin,
            rows_per_poll: picomac_video::ROWS_PER_POLL,
            vsync_period_us: timings.vsync_period_us,
            one_hz_period_us: timings.one_hz_period_us,
        }
    }
}

impl BridgeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Defaults, then `path` if given, then the process environment. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PICOMAC_*` overrides. `lookup` returns the value of an env var, if set.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup("PICOMAC_INITIAL_MODE") {
            self.initial_mode = match raw.trim() {
                "key" => StartMode::Key,
                "pointer" => StartMode::Pointer,
                _ => return Err(invalid("PICOMAC_INITIAL_MODE", raw.clone())),
            };
        }
        if let Some(raw) = lookup("PICOMAC_PIXEL_FORMAT") {
            self.pixel_format = match raw.trim() {
                "rgb565" => PixelFormatKind::Rgb565,
                "rgb111" => PixelFormatKind::Rgb111,
                _ => return Err(invalid("PICOMAC_PIXEL_FORMAT", raw.clone())),
            };
        }
        if let Some(raw) = lookup("PICOMAC_MODE_TOGGLE_KEY") {
            self.bindings.mode_toggle = raw.trim().to_owned();
        }
        parse_env(&lookup, "PICOMAC_VIRTUAL_WIDTH", &mut self.virtual_width)?;
        parse_env(&lookup, "PICOMAC_VIRTUAL_HEIGHT", &mut self.virtual_height)?;
        parse_env(&lookup, "PICOMAC_VIEWPORT_MARGIN", &mut self.viewport_margin)?;
        parse_env(&lookup, "PICOMAC_ROWS_PER_POLL", &mut self.rows_per_poll)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.geometry().validate()?;
        self.bindings.resolve()?;
        if self.vsync_period_us == 0 {
            return Err(ConfigError::ZeroPeriod("vsync_period_us"));
        }
        if self.one_hz_period_us == 0 {
            return Err(ConfigError::ZeroPeriod("one_hz_period_us"));
        }
        Ok(())
    }

    pub fn geometry(&self) -> ScreenGeometry {
        ScreenGeometry {
            virtual_width: self.virtual_width,
            virtual_height: self.virtual_height,
            visible_width: VISIBLE_WIDTH,
            visible_height: VISIBLE_HEIGHT,
            margin: self.viewport_margin,
        }
    }

    pub fn input(&self) -> Result<InputConfig, ConfigError> {
        Ok(InputConfig {
            initial_mode: self.initial_mode.into(),
            bindings: self.bindings.resolve()?,
        })
    }

    pub fn timings(&self) -> TickTimings {
        TickTimings {
            vsync_period_us: self.vsync_period_us,
            one_hz_period_us: self.one_hz_period_us,
        }
    }
}

fn invalid(var: &'static str, value: String) -> ConfigError {
    ConfigError::InvalidEnv { var, value }
}

fn parse_env<T: std::str::FromStr>(
    lookup: &impl Fn(&'static str) -> Option<String>,
    var: &'static str,
    slot: &mut T,
) -> Result<(), ConfigError> {
    if let Some(raw) = lookup(var) {
        *slot = raw.trim().parse().map_err(|_| invalid(var, raw))?;
    }
    Ok(())
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::flow::types::{ArrowheadSize, Bend, GridCell, LayoutOptions, RouteOptions, ShapeSize};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "flowgrid";

pub const DEFAULT_START: &str = "G6";
pub const DEFAULT_WIDTH: f64 = 120.0;
pub const DEFAULT_HEIGHT: f64 = 60.0;
pub const DEFAULT_PAD: f64 = 20.0;
pub const DEFAULT_GAP: u32 = 1;

pub const VALID_KEYS: &[&str] = &[
    "defaults.start",
    "defaults.width",
    "defaults.height",
    "defaults.pad",
    "defaults.gap",
    "routing.true_bend",
    "routing.false_bend",
    "routing.arrow_length",
    "routing.arrowhead",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingConfig>,
}

/// Defaults for layout requests that leave a value out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Cell of the first node, e.g. `G6`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pad: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_bend: Option<Bend>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub false_bend: Option<Bend>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrow_length: Option<f64>,

    /// Draw arrowheads (default true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrowhead: Option<bool>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `flowgrid config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(error = %e, "using built-in defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# flowgrid configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.start" => {
                let cell: GridCell = value.parse()?;
                self.defaults_mut().start = Some(cell.to_string());
            }
            "defaults.width" => self.defaults_mut().width = Some(parse_pixels(key, value)?),
            "defaults.height" => self.defaults_mut().height = Some(parse_pixels(key, value)?),
            "defaults.pad" => {
                let pad: f64 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid pad: {value}. Must be a number."))?;
                self.defaults_mut().pad = Some(check_pad(pad)?);
            }
            "defaults.gap" => {
                let gap: u32 = value.parse().map_err(|_| {
                    anyhow::anyhow!("Invalid gap: {value}. Must be a whole number of rows, at least 1.")
                })?;
                self.defaults_mut().gap = Some(check_gap(gap)?);
            }
            "routing.true_bend" | "routing.false_bend" => {
                let bend = Bend::from_name(value).ok_or_else(|| {
                    anyhow::anyhow!("Invalid bend: {value}. Must be 'up' or 'down'.")
                })?;
                let routing = self.routing_mut();
                if key == "routing.true_bend" {
                    routing.true_bend = Some(bend);
                } else {
                    routing.false_bend = Some(bend);
                }
            }
            "routing.arrow_length" => {
                self.routing_mut().arrow_length = Some(parse_pixels(key, value)?)
            }
            "routing.arrowhead" => {
                let on = match value {
                    "true" | "on" | "yes" => true,
                    "false" | "off" | "no" => false,
                    _ => anyhow::bail!("Invalid arrowhead: {value}. Must be 'true' or 'false'."),
                };
                self.routing_mut().arrowhead = Some(on);
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: {}",
                VALID_KEYS.join(", ")
            ),
        }
        Ok(())
    }

    fn defaults_mut(&mut self) -> &mut DefaultsConfig {
        self.defaults.get_or_insert_with(DefaultsConfig::default)
    }

    fn routing_mut(&mut self) -> &mut RoutingConfig {
        self.routing.get_or_insert_with(RoutingConfig::default)
    }

    pub fn start(&self) -> Result<GridCell> {
        let start = self
            .defaults
            .as_ref()
            .and_then(|d| d.start.as_deref())
            .unwrap_or(DEFAULT_START);
        start
            .parse()
            .context("Invalid defaults.start in config")
    }

    pub fn shape_size(&self) -> Result<ShapeSize> {
        let defaults = self.defaults.clone().unwrap_or_default();
        Ok(ShapeSize::new(
            check_pixels("defaults.width", defaults.width.unwrap_or(DEFAULT_WIDTH))?,
            check_pixels("defaults.height", defaults.height.unwrap_or(DEFAULT_HEIGHT))?,
        ))
    }

    pub fn pad(&self) -> Result<f64> {
        let pad = self
            .defaults
            .as_ref()
            .and_then(|d| d.pad)
            .unwrap_or(DEFAULT_PAD);
        check_pad(pad).context("Invalid defaults.pad in config")
    }

    pub fn gap(&self) -> Result<u32> {
        let gap = self
            .defaults
            .as_ref()
            .and_then(|d| d.gap)
            .unwrap_or(DEFAULT_GAP);
        check_gap(gap).context("Invalid defaults.gap in config")
    }

    pub fn route_options(&self) -> Result<RouteOptions> {
        let base = RouteOptions::default();
        let Some(routing) = &self.routing else {
            return Ok(base);
        };
        let arrow_length = routing
            .arrow_length
            .map(|length| check_pixels("routing.arrow_length", length))
            .transpose()?;
        Ok(RouteOptions {
            true_bend: routing.true_bend.unwrap_or(base.true_bend),
            false_bend: routing.false_bend.unwrap_or(base.false_bend),
            arrow_length: arrow_length.or(base.arrow_length),
            arrowhead: match routing.arrowhead {
                Some(false) => None,
                _ => Some(ArrowheadSize::default()),
            },
        })
    }

    /// Layout options with every unset value filled from the built-in defaults.
    /// Hand-edited values are held to the same rules as `set`.
    pub fn layout_options(&self) -> Result<LayoutOptions> {
        Ok(LayoutOptions {
            start: self.start()?,
            vertical_gap: self.gap()?,
            cell_padding: self.pad()?,
            routing: self.route_options()?,
        })
    }
}

fn parse_pixels(key: &str, value: &str) -> Result<f64> {
    let px = value
        .parse::<f64>()
        .map_err(|_| anyhow::anyhow!("Invalid {key}: {value}. Must be a positive number of pixels."))?;
    check_pixels(key, px)
}

fn check_pixels(key: &str, px: f64) -> Result<f64> {
    if !px.is_finite() || px <= 0.0 {
        anyhow::bail!("Invalid {key}: {px}. Must be a positive number of pixels.");
    }
    Ok(px)
}

fn check_pad(pad: f64) -> Result<f64> {
    if !pad.is_finite() || pad < 0.0 {
        anyhow::bail!("Invalid pad: {pad}. Must be zero or more pixels.");
    }
    Ok(pad)
}

fn check_gap(gap: u32) -> Result<u32> {
    if gap == 0 {
        anyhow::bail!("Invalid gap: 0. Must be a whole number of rows, at least 1.");
    }
    Ok(gap)
}

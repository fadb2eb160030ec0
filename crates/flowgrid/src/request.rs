use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::flow::types::{ArrowheadSize, Bend, GridCell, LayoutOptions, ShapeSize};

/// A layout request as read from a file or assembled from command-line flags.
///
/// Every setting is optional; unset values fall back to the user's config and then
/// to the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowRequest {
    #[serde(default)]
    pub shapes: Vec<String>,

    /// One order spec per shape: `"<lane>"` or, for decisions, `"<lane>:<t>,<f>"`.
    #[serde(default)]
    pub orders: Vec<String>,

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

    /// `origin:target` pairs, e.g. `"1:2,4:6"`, for decisions whose order spec
    /// carries only a lane.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_branches: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub false_branches: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_bend: Option<Bend>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub false_bend: Option<Bend>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrow_length: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrowheads: Option<bool>,
}

/// A request with every value filled in, ready for the layout engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub shapes: Vec<String>,
    pub orders: Vec<String>,
    pub size: ShapeSize,
    pub options: LayoutOptions,
}

impl FlowRequest {
    /// Read a request file. `.json` files are parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let request = if is_json {
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid request file {}", path.display()))?
        } else {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid request file {}", path.display()))?
        };
        Ok(request)
    }

    /// Layer `over` on top of `self`: any value set in `over` wins.
    pub fn overlay(self, over: FlowRequest) -> FlowRequest {
        FlowRequest {
            shapes: if over.shapes.is_empty() {
                self.shapes
            } else {
                over.shapes
            },
            orders: if over.orders.is_empty() {
                self.orders
            } else {
                over.orders
            },
            start: over.start.or(self.start),
            width: over.width.or(self.width),
            height: over.height.or(self.height),
            pad: over.pad.or(self.pad),
            gap: over.gap.or(self.gap),
            true_branches: over.true_branches.or(self.true_branches),
            false_branches: over.false_branches.or(self.false_branches),
            true_bend: over.true_bend.or(self.true_bend),
            false_bend: over.false_bend.or(self.false_bend),
            arrow_length: over.arrow_length.or(self.arrow_length),
            arrowheads: over.arrowheads.or(self.arrowheads),
        }
    }

    /// Fill unset values from `config`, validate them, and fold branch pairs into
    /// the order specs.
    pub fn resolve(&self, config: &Config) -> Result<ResolvedRequest> {
        if self.shapes.is_empty() {
            anyhow::bail!("No shapes given. Pass --shapes or a request file with `shapes`.");
        }

        let mut options = config.layout_options()?;
        if let Some(start) = &self.start {
            options.start = start
                .parse::<GridCell>()
                .with_context(|| format!("Invalid start cell '{start}'"))?;
        }
        if let Some(gap) = self.gap {
            if gap == 0 {
                anyhow::bail!("Invalid gap: 0. Must be at least 1 row.");
            }
            options.vertical_gap = gap;
        }
        if let Some(pad) = self.pad {
            if !pad.is_finite() || pad < 0.0 {
                anyhow::bail!("Invalid pad: {pad}. Must be zero or more pixels.");
            }
            options.cell_padding = pad;
        }
        if let Some(bend) = self.true_bend {
            options.routing.true_bend = bend;
        }
        if let Some(bend) = self.false_bend {
            options.routing.false_bend = bend;
        }
        if let Some(length) = self.arrow_length {
            options.routing.arrow_length = Some(positive("arrow length", length)?);
        }
        match self.arrowheads {
            Some(false) => options.routing.arrowhead = None,
            Some(true) if options.routing.arrowhead.is_none() => {
                options.routing.arrowhead = Some(ArrowheadSize::default())
            }
            _ => {}
        }

        let fallback = config.shape_size()?;
        let size = ShapeSize::new(
            positive("width", self.width.unwrap_or(fallback.width))?,
            positive("height", self.height.unwrap_or(fallback.height))?,
        );

        let on_true = self
            .true_branches
            .as_deref()
            .map(parse_branch_pairs)
            .transpose()
            .context("Invalid true branches")?
            .unwrap_or_default();
        let on_false = self
            .false_branches
            .as_deref()
            .map(parse_branch_pairs)
            .transpose()
            .context("Invalid false branches")?
            .unwrap_or_default();
        let orders = merge_branches(&self.orders, &on_true, &on_false)?;

        Ok(ResolvedRequest {
            shapes: self.shapes.clone(),
            orders,
            size,
            options,
        })
    }
}

fn positive(name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        anyhow::bail!("Invalid {name}: {value}. Must be a positive number of pixels.");
    }
    Ok(value)
}

/// Parse `origin:target` pairs separated by commas, e.g. `"1:2, 4:6"`.
pub fn parse_branch_pairs(raw: &str) -> Result<BTreeMap<usize, usize>> {
    let mut pairs = BTreeMap::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (origin, target) = pair
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("'{pair}' is not an origin:target pair"))?;
        let origin: usize = origin
            .trim()
            .parse()
            .with_context(|| format!("'{pair}': bad origin index"))?;
        let target: usize = target
            .trim()
            .parse()
            .with_context(|| format!("'{pair}': bad target index"))?;
        if pairs.insert(origin, target).is_some() {
            anyhow::bail!("node {origin} is given more than one target");
        }
    }
    Ok(pairs)
}

/// Append branch targets to the order specs of the listed origins.
///
/// An origin named on only one side gets a single target, which the compiler then
/// rejects as an arity mismatch for the node.
pub fn merge_branches(
    orders: &[String],
    on_true: &BTreeMap<usize, usize>,
    on_false: &BTreeMap<usize, usize>,
) -> Result<Vec<String>> {
    let mut merged = orders.to_vec();
    let origins: std::collections::BTreeSet<usize> =
        on_true.keys().chain(on_false.keys()).copied().collect();

    for origin in origins {
        let Some(order) = merged.get_mut(origin) else {
            anyhow::bail!(
                "branch origin {origin} is out of range ({} order specs)",
                orders.len()
            );
        };
        if order.contains(':') {
            anyhow::bail!("node {origin} already lists branch targets in '{order}'");
        }
        let target = |map: &BTreeMap<usize, usize>| {
            map.get(&origin).map(usize::to_string).unwrap_or_default()
        };
        *order = format!("{}:{},{}", order.trim(), target(on_true), target(on_false));
    }
    Ok(merged)
}

use anyhow::{Context, Result};
use colored::Colorize;

use crate::cli::{LayoutArgs, OutputFormat};
use crate::config::Config;
use crate::flow::compile::compile_lists;
use crate::flow::serialize::layout_to_string;
use crate::flow::types::{FlowLayout, NodeKind};
use crate::flow::{self, FlowError};
use crate::render::draw_list::DrawList;
use crate::render::render_layout;
use crate::request::{FlowRequest, ResolvedRequest};

/// Run the layout command.
pub fn run(args: LayoutArgs) -> Result<()> {
    let base = match &args.file {
        Some(path) => FlowRequest::load(path)?,
        None => FlowRequest::default(),
    };
    let format = args.format;
    let draw_list = args.draw_list;
    let output = args.output.clone();

    let request = base.overlay(request_from_args(args));
    let resolved = request.resolve(&Config::load_or_default())?;
    tracing::debug!(
        nodes = resolved.shapes.len(),
        start = %resolved.options.start,
        "resolved layout request"
    );

    let layout = build_layout(&resolved)?;
    let rendered = if draw_list {
        format_draw_list(&layout, format)?
    } else {
        format_layout(&layout, format)?
    };

    match output {
        Some(path) => {
            std::fs::write(&path, format!("{rendered}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} {}", "Wrote".green().bold(), path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Compile, place and route a resolved request.
pub fn build_layout(resolved: &ResolvedRequest) -> Result<FlowLayout, FlowError> {
    let flow = compile_lists(&resolved.shapes, &resolved.orders, resolved.size)?;
    flow::layout_compiled(flow, &resolved.options)
}

fn request_from_args(args: LayoutArgs) -> FlowRequest {
    FlowRequest {
        shapes: args.shapes,
        orders: args.orders,
        start: args.start,
        width: args.width,
        height: args.height,
        pad: args.pad,
        gap: args.gap,
        true_branches: args.true_branches,
        false_branches: args.false_branches,
        true_bend: args.true_bend.map(Into::into),
        false_bend: args.false_bend.map(Into::into),
        arrow_length: args.arrow_length,
        arrowheads: args.no_arrowheads.then_some(false),
    }
}

fn format_layout(layout: &FlowLayout, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => layout_to_string(layout),
        OutputFormat::Json => serde_json::to_string_pretty(layout)?,
        OutputFormat::Yaml => serde_yaml::to_string(layout)?,
    })
}

fn format_draw_list(layout: &FlowLayout, format: OutputFormat) -> Result<String> {
    let mut list = DrawList::new();
    render_layout(layout, &mut list)?;
    Ok(match format {
        OutputFormat::Text => list.to_text(),
        OutputFormat::Json => serde_json::to_string_pretty(&list)?,
        OutputFormat::Yaml => serde_yaml::to_string(&list)?,
    })
}

/// Print every shape kind with its accepted name and sheet preset.
pub fn print_shapes() {
    println!("{}", "Shapes".bold());
    for kind in NodeKind::all() {
        let note = if kind.is_decision() {
            "  order spec lane:true,false".dimmed().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:<20} {}{note}",
            kind.short_name().green(),
            kind.preset_name().dimmed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::types::{EdgeLabel, GridCell};

    fn args(shapes: &[&str], orders: &[&str]) -> LayoutArgs {
        LayoutArgs {
            shapes: shapes.iter().map(|s| s.to_string()).collect(),
            orders: orders.iter().map(|s| s.to_string()).collect(),
            ..LayoutArgs::default()
        }
    }

    fn resolve(args: LayoutArgs) -> ResolvedRequest {
        request_from_args(args).resolve(&Config::default()).unwrap()
    }

    #[test]
    fn lays_out_a_decision_flow() {
        let resolved = resolve(args(
            &["terminator", "decision", "process", "process"],
            &["1", "1:2,3", "1", "2"],
        ));
        let layout = build_layout(&resolved).unwrap();
        assert_eq!(layout.placements.len(), 4);
        assert_eq!(layout.placement_of(3).unwrap().cell, GridCell::new(7, 8));
        let labels: Vec<EdgeLabel> = layout.connectors_from(1).map(|c| c.edge.label).collect();
        assert_eq!(labels, vec![EdgeLabel::True, EdgeLabel::False]);
    }

    #[test]
    fn no_arrowheads_flag_clears_heads() {
        let mut a = args(&["process", "process"], &["1", "1"]);
        a.no_arrowheads = true;
        let layout = build_layout(&resolve(a)).unwrap();
        assert!(layout.connectors.iter().all(|c| c.arrowhead.is_none()));
    }

    #[test]
    fn user_errors_are_not_internal() {
        let resolved = resolve(args(&["process", "hexagon"], &["1", "1"]));
        let err = build_layout(&resolved).unwrap_err();
        assert!(!err.is_internal());
    }

    #[test]
    fn json_output_carries_connectors() {
        let layout = build_layout(&resolve(args(&["process", "process"], &["1", "1"]))).unwrap();
        let json = format_layout(&layout, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["connectors"].as_array().unwrap().len(), 1);
        assert_eq!(value["connectors"][0]["orientation"], "down");
    }

    #[test]
    fn draw_list_text_lists_every_command() {
        let layout = build_layout(&resolve(args(&["process", "process"], &["1", "1"]))).unwrap();
        let text = format_draw_list(&layout, OutputFormat::Text).unwrap();
        // One column, two rows, two shapes, one connector.
        assert_eq!(text.lines().count(), 6);
    }
}

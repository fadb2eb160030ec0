use super::types::{
    ArrowDirection, Axis, ConnectorGeometry, FlowLayout, Orientation, Placement, Segment,
};

/// Serialize a connector to a compact one-line form.
///
/// Format: `0->1:next rightward @G6 H(120,40)+80 V(190,40)+60 >down@H7(70,20)`
///
/// Offsets and lengths are pixels; whole numbers are printed without decimals.
/// A connector without an arrowhead ends in `-`.
pub fn connector_to_string(connector: &ConnectorGeometry) -> String {
    let mut parts = Vec::with_capacity(connector.segments.len() + 3);
    parts.push(format!(
        "{}->{}:{}",
        connector.edge.origin, connector.edge.target, connector.edge.label
    ));
    parts.push(orientation_name(connector.orientation).to_string());
    parts.push(format!("@{}", connector.anchor));
    parts.extend(connector.segments.iter().map(format_segment));
    parts.push(match &connector.arrowhead {
        Some(head) => format!(
            ">{}@{}({},{})",
            direction_name(head.direction),
            head.cell,
            format_px(head.offset_x),
            format_px(head.offset_y)
        ),
        None => "-".to_string(),
    });
    parts.join(" ")
}

/// Serialize a placement: `#2 decision G8`.
pub fn placement_to_string(placement: &Placement, layout: &FlowLayout) -> String {
    let kind = layout
        .nodes
        .get(placement.node)
        .map_or("?", |n| n.kind.short_name());
    format!("#{} {} {}", placement.node, kind, placement.cell)
}

/// Multi-line listing of a whole layout: placements first, then connectors.
pub fn layout_to_string(layout: &FlowLayout) -> String {
    let mut lines = Vec::with_capacity(layout.placements.len() + layout.connectors.len());
    lines.extend(
        layout
            .placements
            .iter()
            .map(|p| placement_to_string(p, layout)),
    );
    lines.extend(layout.connectors.iter().map(connector_to_string));
    lines.join("\n")
}

fn format_segment(segment: &Segment) -> String {
    let axis = match segment.axis {
        Axis::Horizontal => 'H',
        Axis::Vertical => 'V',
    };
    format!(
        "{}({},{})+{}",
        axis,
        format_px(segment.offset_x),
        format_px(segment.offset_y),
        format_px(segment.length)
    )
}

pub(crate) fn orientation_name(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::Down => "down",
        Orientation::Up => "up",
        Orientation::Rightward => "rightward",
        Orientation::Leftward => "leftward",
    }
}

pub(crate) fn direction_name(direction: ArrowDirection) -> &'static str {
    match direction {
        ArrowDirection::Up => "up",
        ArrowDirection::Down => "down",
        ArrowDirection::Left => "left",
        ArrowDirection::Right => "right",
    }
}

/// Pixel value with at most two decimals and no trailing zeros.
fn format_px(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let text = format!("{rounded:.2}");
        text.trim_end_matches('0').to_string()
    }
}

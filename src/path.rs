//! SVG path builders for connections and node shapes.
//!
//! All functions take screen-space coordinates and return path command strings
//! (e.g. `"M 10 20 C 60 20 90 80 140 80"`) for [`Surface`](crate::surface::Surface)
//! calls.

use crate::theme::ConnectionStyle;

/// Horizontal lead-in of the buffered and Z styles, in world units
const LEAD_IN: f32 = 25.0;
/// Distance of the vertical segment from the plug in the early/late sharp styles
const SHARP_OFFSET: f32 = 30.0;

/// Generate the SVG path for a connection in the given style
///
/// # Arguments
/// * `style` - Connection shape
/// * `a` - Output plug anchor (screen space)
/// * `b` - Input plug anchor (screen space)
/// * `zoom` - Current smoothed zoom, scales the fixed offsets
pub fn connection_path(style: &ConnectionStyle, a: (f32, f32), b: (f32, f32), zoom: f32) -> String {
    let mid = (a.0 + b.0) / 2.0;
    let off = LEAD_IN * zoom;

    match style {
        ConnectionStyle::Linear => format!("M {} {} L {} {}", a.0, a.1, b.0, b.1),
        ConnectionStyle::ZLinear => format!(
            "M {} {} L {} {} L {} {} L {} {}",
            a.0,
            a.1,
            a.0 + off,
            a.1,
            b.0 - off,
            b.1,
            b.0,
            b.1
        ),
        ConnectionStyle::Bezier => format!(
            "M {} {} C {} {} {} {} {} {}",
            a.0, a.1, b.0, a.1, a.0, b.1, b.0, b.1
        ),
        ConnectionStyle::SoftBezier => format!(
            "M {} {} C {} {} {} {} {} {}",
            a.0, a.1, mid, a.1, mid, b.1, b.0, b.1
        ),
        ConnectionStyle::BufferedBezier => format!(
            "M {} {} L {} {} C {} {} {} {} {} {} L {} {}",
            a.0,
            a.1,
            a.0 + off,
            a.1,
            b.0,
            a.1,
            a.0,
            b.1,
            b.0 - off,
            b.1,
            b.0,
            b.1
        ),
        ConnectionStyle::BufferedSoftBezier => format!(
            "M {} {} L {} {} C {} {} {} {} {} {} L {} {}",
            a.0,
            a.1,
            a.0 + off,
            a.1,
            mid,
            a.1,
            mid,
            b.1,
            b.0 - off,
            b.1,
            b.0,
            b.1
        ),
        ConnectionStyle::Sharp => elbow_path(a, b, mid),
        ConnectionStyle::LateSharp => elbow_path(a, b, b.0 - SHARP_OFFSET * zoom),
        ConnectionStyle::EarlySharp => elbow_path(a, b, a.0 + SHARP_OFFSET * zoom),
        ConnectionStyle::Custom(build) => build(a, b, zoom),
    }
}

/// Three axis-aligned segments with the vertical one at `turn_x`
fn elbow_path(a: (f32, f32), b: (f32, f32), turn_x: f32) -> String {
    format!(
        "M {} {} L {} {} L {} {} L {} {}",
        a.0, a.1, turn_x, a.1, turn_x, b.1, b.0, b.1
    )
}

/// Generate a closed rounded rectangle using quadratic corners
///
/// # Arguments
/// * `x`, `y` - Top-left corner
/// * `width`, `height` - Size
/// * `radius` - Corner radius; 0 gives square corners
pub fn rounded_rect_path(x: f32, y: f32, width: f32, height: f32, radius: f32) -> String {
    let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
    let right = x + width;
    let bottom = y + height;
    format!(
        "M {} {} L {} {} Q {} {} {} {} L {} {} Q {} {} {} {} L {} {} Q {} {} {} {} L {} {} Q {} {} {} {} Z",
        x + r, y,
        right - r, y,
        right, y, right, y + r,
        right, bottom - r,
        right, bottom, right - r, bottom,
        x + r, bottom,
        x, bottom, x, bottom - r,
        x, y + r,
        x, y, x + r, y
    )
}

/// Generate the header band of a node: rounded top corners, square bottom
///
/// # Arguments
/// * `x`, `y` - Top-left corner of the node
/// * `width` - Node width
/// * `radius` - Corner radius
/// * `header` - Header height
pub fn header_path(x: f32, y: f32, width: f32, radius: f32, header: f32) -> String {
    let r = radius.min(width / 2.0).min(header).max(0.0);
    let right = x + width;
    format!(
        "M {} {} L {} {} Q {} {} {} {} L {} {} L {} {} L {} {} Q {} {} {} {} Z",
        x + r, y,
        right - r, y,
        right, y, right, y + r,
        right, y + header,
        x, y + header,
        x, y + r,
        x, y, x + r, y
    )
}

/// Generate a closed circle from two arcs
pub fn circle_path(cx: f32, cy: f32, radius: f32) -> String {
    format!(
        "M {} {} A {} {} 0 1 0 {} {} A {} {} 0 1 0 {} {} Z",
        cx - radius,
        cy,
        radius,
        radius,
        cx + radius,
        cy,
        radius,
        radius,
        cx - radius,
        cy
    )
}

//! Visual and behavioural settings for a graph.
//!
//! A [`Theme`] is a flat, passive settings object. It deserializes from any
//! serde format; missing keys fall back to the defaults below, and colors are
//! written as `"#RRGGBB"` or `"#RRGGBBAA"` strings.
//!
//! # Example
//!
//! ```ignore
//! let theme: Theme = serde_json::from_str(r#"{ "grid_size": 0, "node_color": "#223355" }"#)?;
//! assert!(!theme.should_render_grid());
//! ```

use crate::surface::Font;
use serde::{Deserialize, Serialize};
use slint::Color;

/// Builds the screen-space SVG path for a connection.
///
/// Receives the output anchor, the input anchor and the current zoom.
pub type ConnectionPathFn = fn((f32, f32), (f32, f32), f32) -> String;

/// Stroke shape used for connections.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum ConnectionStyle {
    /// Straight line between the plugs
    Linear,
    /// Straight line with short horizontal lead-ins
    ZLinear,
    /// Cubic bezier with crossed control points
    Bezier,
    /// Shallow cubic bezier with control points at the horizontal midpoint
    #[default]
    SoftBezier,
    /// [`ConnectionStyle::Bezier`] with short straight lead-ins
    BufferedBezier,
    /// [`ConnectionStyle::SoftBezier`] with short straight lead-ins
    BufferedSoftBezier,
    /// Three axis-aligned segments, turning at the horizontal midpoint
    Sharp,
    /// Three axis-aligned segments, turning just before the input
    LateSharp,
    /// Three axis-aligned segments, turning just after the output
    EarlySharp,
    /// Host-supplied path builder
    #[serde(skip)]
    Custom(ConnectionPathFn),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Camera easing time constant in seconds
    pub camera_smoothing: f32,
    /// Node easing time constant in seconds
    pub node_smoothing: f32,

    /// Header font size in world units
    pub header_font_size: f32,
    /// Field label font size in world units
    pub plug_font_size: f32,
    pub header_font_family: String,
    pub plug_font_family: String,
    #[serde(with = "hex_color")]
    pub header_font_color: Color,
    #[serde(with = "hex_color")]
    pub plug_font_color: Color,

    pub node_min_width: f32,
    pub node_min_height: f32,
    pub node_header_size: f32,
    pub node_border_thickness: f32,
    /// Corner radius; 0 draws square corners
    pub node_border_radius: f32,
    #[serde(with = "hex_color")]
    pub node_color: Color,
    #[serde(with = "hex_color")]
    pub node_border_color: Color,
    #[serde(with = "hex_color")]
    pub node_border_highlight: Color,
    #[serde(with = "hex_color")]
    pub node_border_select: Color,
    #[serde(with = "hex_color")]
    pub node_header_color: Color,

    pub connection_width: f32,
    #[serde(with = "hex_color")]
    pub connection_color: Color,
    pub connection_style: ConnectionStyle,

    pub plug_radius: f32,
    pub plug_border_size: f32,
    #[serde(with = "hex_color")]
    pub plug_color: Color,
    #[serde(with = "hex_color")]
    pub plug_border_color: Color,
    #[serde(with = "hex_color")]
    pub plug_border_highlight: Color,

    #[serde(with = "hex_color")]
    pub background_color: Color,

    /// Grid cell size in world units; 0 disables the grid entirely
    pub grid_size: f32,
    /// Draw the grid without snapping nodes to it
    pub grid_render_only: bool,
    /// Minor cells per major cell; 0 disables major lines
    pub grid_major_segments: u32,
    #[serde(with = "hex_color")]
    pub grid_color: Color,
    #[serde(with = "hex_color")]
    pub grid_major_color: Color,
    /// Smallest on-screen cell size before the grid coarsens; 0 disables
    pub grid_min_render_size: f32,
    /// Largest on-screen cell size before the grid refines; 0 disables
    pub grid_max_render_size: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            camera_smoothing: 0.08,
            node_smoothing: 0.03,
            header_font_size: 20.0,
            plug_font_size: 16.0,
            header_font_family: "Calibri".into(),
            plug_font_family: "Calibri".into(),
            header_font_color: Color::from_rgb_u8(0xCC, 0xCC, 0xCC),
            plug_font_color: Color::from_rgb_u8(0xAA, 0xAA, 0xAA),
            node_min_width: 100.0,
            node_min_height: 50.0,
            node_header_size: 37.0,
            node_border_thickness: 2.0,
            node_border_radius: 8.0,
            node_color: Color::from_rgb_u8(0x55, 0x22, 0x22),
            node_border_color: Color::from_rgb_u8(0x55, 0x55, 0x55),
            node_border_highlight: Color::from_rgb_u8(0x77, 0x77, 0x77),
            node_border_select: Color::from_rgb_u8(0x99, 0x99, 0x55),
            node_header_color: Color::from_rgb_u8(0x44, 0x11, 0x11),
            connection_width: 2.0,
            connection_color: Color::from_rgb_u8(0xFF, 0x7F, 0x50),
            connection_style: ConnectionStyle::SoftBezier,
            plug_radius: 8.0,
            plug_border_size: 1.5,
            plug_color: Color::from_rgb_u8(0x77, 0x77, 0x77),
            plug_border_color: Color::from_rgb_u8(0x55, 0x55, 0x55),
            plug_border_highlight: Color::from_rgb_u8(0x99, 0x99, 0x99),
            background_color: Color::from_rgb_u8(0x12, 0x12, 0x12),
            grid_size: 50.0,
            grid_render_only: true,
            grid_major_segments: 4,
            grid_color: Color::from_rgb_u8(0x24, 0x24, 0x24),
            grid_major_color: Color::from_rgb_u8(0x36, 0x36, 0x36),
            grid_min_render_size: 25.0,
            grid_max_render_size: 100.0,
        }
    }
}

impl Theme {
    /// True when any grid lines should be drawn.
    pub fn should_render_grid(&self) -> bool {
        self.grid_size > 0.0
    }

    /// True when node positions and sizes snap to the grid.
    pub fn has_grid_behavior(&self) -> bool {
        self.grid_size > 0.0 && !self.grid_render_only
    }

    pub fn has_major_grid(&self) -> bool {
        self.should_render_grid() && self.grid_major_segments > 0
    }

    /// True when zooming in refines the drawn grid step.
    pub fn should_zoom_in_grid(&self) -> bool {
        self.has_major_grid() && self.grid_max_render_size > 0.0
    }

    /// True when zooming out coarsens the drawn grid step.
    pub fn should_zoom_out_grid(&self) -> bool {
        self.has_major_grid() && self.grid_min_render_size > 0.0
    }

    /// Header font at world scale.
    pub fn header_font(&self) -> Font {
        Font::new(self.header_font_size, &self.header_font_family)
    }

    /// Field label font at world scale.
    pub fn plug_font(&self) -> Font {
        Font::new(self.plug_font_size, &self.plug_font_family)
    }
}

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` into a color.
pub fn parse_hex_color(text: &str) -> Option<Color> {
    let hex = text.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some(Color::from_rgb_u8(nibble(0)?, nibble(1)?, nibble(2)?))
        }
        6 => Some(Color::from_rgb_u8(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::from_argb_u8(byte(6)?, byte(0)?, byte(2)?, byte(4)?)),
        _ => None,
    }
}

/// Format a color as `#RRGGBB`, or `#RRGGBBAA` when it is not opaque.
pub fn format_hex_color(color: Color) -> String {
    if color.alpha() == 0xFF {
        format!("#{:02X}{:02X}{:02X}", color.red(), color.green(), color.blue())
    } else {
        format!(
            "#{:02X}{:02X}{:02X}{:02X}",
            color.red(),
            color.green(),
            color.blue(),
            color.alpha()
        )
    }
}

/// Serde adapter for hex color strings.
pub mod hex_color {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use slint::Color;

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_hex_color(*color))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_hex_color(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid color '{}'", text)))
    }
}

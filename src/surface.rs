//! Host drawing surface.
//!
//! The [`Surface`] trait is the only thing the engine draws through. Shapes
//! are handed over as SVG path command strings, the same format Slint `Path`
//! elements accept, so a Slint host can forward them unchanged.
//!
//! [`DisplayList`] records every call instead of drawing. Hosts that render
//! from a model (and the test-suite) use it directly.

use slint::Color;

/// Font request. Sizes are in surface pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub size: f32,
    pub family: String,
}

impl Font {
    pub fn new(size: f32, family: &str) -> Self {
        Self {
            size,
            family: family.to_string(),
        }
    }

    /// Same family at `size * zoom`.
    pub fn scaled(&self, zoom: f32) -> Font {
        Font {
            size: self.size * zoom,
            family: self.family.clone(),
        }
    }
}

/// Horizontal anchor for [`Surface::fill_text`]. Text is always vertically centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Stroke paint.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Two-stop gradient along the segment `from` → `to`
    LinearGradient {
        from: (f32, f32),
        to: (f32, f32),
        start: Color,
        end: Color,
    },
}

/// A canvas the engine can draw to.
pub trait Surface {
    /// Current size in pixels.
    fn size(&self) -> (f32, f32);

    /// Width of `text` rendered with `font`.
    fn measure_text(&self, text: &str, font: &Font) -> f32;

    /// Called once before every rendered frame.
    fn begin_frame(&mut self);

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);

    fn fill_path(&mut self, commands: &str, color: Color);

    fn stroke_path(&mut self, commands: &str, paint: &Paint, width: f32);

    /// Draw `text` vertically centered on `y`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &Font, color: Color, align: TextAlign);
}

/// One recorded [`Surface`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    FillPath {
        commands: String,
        color: Color,
    },
    StrokePath {
        commands: String,
        paint: Paint,
        width: f32,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        font: Font,
        color: Color,
        align: TextAlign,
    },
}

/// Recording surface.
///
/// Holds the commands of the most recent frame. Text is measured with a fixed
/// advance of half the font size per character.
#[derive(Debug, Clone)]
pub struct DisplayList {
    size: (f32, f32),
    commands: Vec<DrawCommand>,
    frames: usize,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl DisplayList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: (width, height),
            commands: Vec::new(),
            frames: 0,
        }
    }

    /// Resize the surface. The owning tree repaints on its next frame.
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = (width, height);
    }

    /// Commands of the last frame, in paint order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of frames begun so far.
    pub fn frame_count(&self) -> usize {
        self.frames
    }

    /// All text drawn in the last frame.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// All stroked paths of the last frame.
    pub fn strokes(&self) -> impl Iterator<Item = (&str, &Paint, f32)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::StrokePath {
                commands,
                paint,
                width,
            } => Some((commands.as_str(), paint, *width)),
            _ => None,
        })
    }
}

impl Surface for DisplayList {
    fn size(&self) -> (f32, f32) {
        self.size
    }

    fn measure_text(&self, text: &str, font: &Font) -> f32 {
        text.chars().count() as f32 * font.size * 0.5
    }

    fn begin_frame(&mut self) {
        self.commands.clear();
        self.frames += 1;
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.commands.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn fill_path(&mut self, commands: &str, color: Color) {
        self.commands.push(DrawCommand::FillPath {
            commands: commands.to_string(),
            color,
        });
    }

    fn stroke_path(&mut self, commands: &str, paint: &Paint, width: f32) {
        self.commands.push(DrawCommand::StrokePath {
            commands: commands.to_string(),
            paint: paint.clone(),
            width,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &Font, color: Color, align: TextAlign) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            font: font.clone(),
            color,
            align,
        });
    }
}

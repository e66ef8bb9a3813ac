//! Vertical layout of a node's field widgets.
//!
//! Fields stack top to bottom below the node header. Row `i` starts at
//! `header + 3 + Σ(line_height * 24 + 3)` of the rows above it and is inset 10
//! units from both sides. Plug anchors sit on the node edges at the vertical
//! center of the first line of their field.

use crate::camera::Camera;
use crate::field::{FieldWidget, Placement, ROW_HEIGHT};
use crate::hit_test::Rect;
use crate::position::Position;

/// Gap between consecutive rows, in world units
pub const ROW_BUFFER: f32 = 3.0;
/// Horizontal inset of rows from the node edges
pub const ROW_INSET: f32 = 10.0;
/// Gap between the header and the first row
pub const HEADER_GAP: f32 = 3.0;

const CHECKBOX_SIZE: f32 = 16.0;

#[derive(Debug, Clone, Default)]
pub struct FieldLayout {
    fields: Vec<FieldWidget>,
}

impl FieldLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, returning its index.
    pub fn push(&mut self, field: FieldWidget) -> usize {
        self.fields.push(field);
        self.fields.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&FieldWidget> {
        self.fields.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut FieldWidget> {
        self.fields.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldWidget> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total stacked height in world units.
    pub fn height(&self) -> f32 {
        self.fields
            .iter()
            .map(|f| f.line_height() as f32 * ROW_HEIGHT + ROW_BUFFER)
            .sum()
    }

    /// Widest minimum width among the fields, or 0 when empty.
    pub fn min_width(&self) -> f32 {
        self.fields.iter().map(FieldWidget::min_width).fold(0.0, f32::max)
    }

    /// Widest recommended width among the fields, or 0 when empty.
    ///
    /// # Arguments
    /// * `measure` - Measures a field name in the label font
    pub fn recommended_width(&self, measure: impl Fn(&str) -> f32) -> f32 {
        self.fields
            .iter()
            .map(|f| f.recommended_width(measure(f.name())))
            .fold(0.0, f32::max)
    }

    /// World-space plug anchor for every field, by field index.
    ///
    /// # Arguments
    /// * `origin` - Node top-left corner (world space)
    /// * `width` - Node width
    /// * `header` - Header height
    pub fn plug_anchors(&self, origin: Position, width: f32, header: f32) -> Vec<Position> {
        let x = origin.x;
        let mut y = origin.y + header + HEADER_GAP + ROW_HEIGHT / 2.0;

        self.fields
            .iter()
            .map(|field| {
                let anchor = if field.is_output() {
                    Position::world(x + width, y)
                } else {
                    Position::world(x, y)
                };
                y += field.line_height() as f32 * ROW_HEIGHT + ROW_BUFFER;
                anchor
            })
            .collect()
    }

    /// Screen-space row rects, one per field.
    ///
    /// # Arguments
    /// * `origin` - Node top-left corner (world space)
    /// * `width` - Node width in world units
    /// * `header` - Header height in world units
    /// * `camera` - Camera for the world→screen transform
    pub fn row_rects(&self, origin: Position, width: f32, header: f32, camera: &Camera) -> Vec<Rect> {
        let zoom = camera.zoom_smooth;
        let mut top_left = origin;
        top_left.shift(ROW_INSET, header + HEADER_GAP);
        let top_left = top_left.to_screen(camera);

        let row = ROW_HEIGHT * zoom;
        let buffer = ROW_BUFFER * zoom;
        let mut y = top_left.y;

        self.fields
            .iter()
            .map(|field| {
                let lines = field.line_height() as f32;
                let rect = Rect::new(top_left.x, y, (width - 2.0 * ROW_INSET) * zoom, row * lines);
                y += lines * row + buffer;
                rect
            })
            .collect()
    }

    /// Placements for every field with a live control.
    ///
    /// When the field name shares the row, the control takes the right two
    /// thirds. Checkboxes are drawn as a fixed square.
    ///
    /// # Arguments
    /// * `rows` - Output of [`FieldLayout::row_rects`]
    /// * `zoom` - Current smoothed zoom
    /// * `font_size` - Label font size in world units
    pub fn placements(&self, rows: &[Rect], zoom: f32, font_size: f32) -> Vec<(usize, Placement)> {
        self.fields
            .iter()
            .zip(rows)
            .enumerate()
            .filter(|(_, (field, _))| field.has_control())
            .map(|(index, (field, row))| {
                let mut rect = *row;
                if field.has_name() {
                    let label = rect.width / 3.0;
                    rect.x += label;
                    rect.width -= label;
                }
                if matches!(field.kind(), crate::field::WidgetKind::Checkbox { .. }) {
                    rect.width = CHECKBOX_SIZE * zoom;
                    rect.height = CHECKBOX_SIZE * zoom;
                }
                let placement = Placement {
                    rect,
                    font_size: font_size * zoom,
                    border_radius: 4.0 * zoom,
                    padding: 3.0 * zoom,
                };
                (index, placement)
            })
            .collect()
    }

    /// Apply a focus state to every field.
    pub fn set_focusable(&mut self, focusable: bool) {
        for field in &mut self.fields {
            field.set_focusable(focusable);
        }
    }
}

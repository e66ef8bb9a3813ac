//! Inline field widget descriptors and the host widget interface.
//!
//! Every plug owns one [`FieldWidget`]: a read-only label, or an editable
//! control supplied by the plug type. The engine only tracks layout metrics
//! and focus; a [`WidgetHost`] maps descriptors onto real toolkit widgets.

use crate::hit_test::Rect;
use crate::tree::NodeId;
use slint::Color;

/// Height of one field row in world units
pub const ROW_HEIGHT: f32 = 24.0;

const DEFAULT_MIN_WIDTH: f32 = 80.0;

/// Control shown for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    /// Plain text, no control
    Label,
    /// Single line text input
    Text,
    /// Multi-line text input, `rows` rows tall
    TextBlock { rows: u32 },
    Color { value: Color },
    Range { min: f32, max: f32, value: f32, step: f32 },
    Dropdown { options: Vec<String> },
    Checkbox { value: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldWidget {
    name: String,
    kind: WidgetKind,
    is_output: bool,
    filled: bool,
    focusable: bool,
    unfocusable: bool,
}

impl FieldWidget {
    pub fn new(name: &str, kind: WidgetKind, is_output: bool) -> Self {
        Self {
            name: name.to_string(),
            kind,
            is_output,
            filled: false,
            focusable: true,
            unfocusable: false,
        }
    }

    /// Read-only name label. Used for every output plug.
    pub fn label(name: &str, is_output: bool) -> Self {
        Self::new(name, WidgetKind::Label, is_output)
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, WidgetKind::Text, false)
    }

    pub fn text_block(name: &str, rows: u32) -> Self {
        Self::new(name, WidgetKind::TextBlock { rows: rows.max(1) }, false)
    }

    pub fn color(name: &str, value: Color) -> Self {
        Self::new(name, WidgetKind::Color { value }, false)
    }

    pub fn range(name: &str, min: f32, max: f32, value: f32, step: f32) -> Self {
        Self::new(name, WidgetKind::Range { min, max, value, step }, false)
    }

    pub fn dropdown(name: &str, options: Vec<String>) -> Self {
        Self::new(name, WidgetKind::Dropdown { options }, false)
    }

    pub fn checkbox(name: &str, value: bool) -> Self {
        Self::new(name, WidgetKind::Checkbox { value }, false)
    }

    /// Never accept focus, regardless of [`FieldWidget::set_focusable`].
    pub fn unfocusable(mut self) -> Self {
        self.unfocusable = true;
        self.focusable = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &WidgetKind {
        &self.kind
    }

    pub fn is_output(&self) -> bool {
        self.is_output
    }

    /// True while a connection feeds this field.
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    pub fn is_focusable(&self) -> bool {
        self.focusable
    }

    /// Rows occupied by the field.
    pub fn line_height(&self) -> u32 {
        match self.kind {
            WidgetKind::TextBlock { rows } if !self.filled => rows,
            _ => 1,
        }
    }

    pub fn min_width(&self) -> f32 {
        match self.kind {
            WidgetKind::Text => 150.0,
            WidgetKind::TextBlock { .. } => 200.0,
            WidgetKind::Checkbox { .. } => 30.0,
            _ => DEFAULT_MIN_WIDTH,
        }
    }

    /// Preferred node width for this field.
    ///
    /// # Arguments
    /// * `label_width` - Measured width of the field name
    pub fn recommended_width(&self, label_width: f32) -> f32 {
        ((label_width + 20.0) * 3.0).max(self.min_width() / 2.0 * 3.0)
    }

    /// True when the host should show a live control.
    pub fn has_control(&self) -> bool {
        self.kind != WidgetKind::Label && !self.filled
    }

    /// True when the field name is drawn next to (or instead of) the control.
    pub fn has_name(&self) -> bool {
        !self.has_control() || !self.is_output
    }

    /// Mark the field as fed by a connection.
    ///
    /// Filling hides the control and disables focus. Un-filling restores both.
    pub fn set_filled(&mut self, filled: bool) {
        self.filled = filled;
        self.focusable = !filled && !self.unfocusable;
    }

    /// Enable or disable focus. Ignored for unfocusable and filled fields.
    pub fn set_focusable(&mut self, focusable: bool) {
        self.focusable = focusable && !self.unfocusable && !self.filled;
    }
}

/// Identifies a field widget across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetKey {
    pub node: NodeId,
    /// Field index within the node
    pub index: usize,
}

/// Screen-space geometry for a live control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub rect: Rect,
    pub font_size: f32,
    pub border_radius: f32,
    pub padding: f32,
}

/// Binds field descriptors to real widgets.
pub trait WidgetHost {
    /// Show or move the control for `key`.
    fn place(&mut self, key: WidgetKey, widget: &FieldWidget, placement: &Placement);

    fn set_focusable(&mut self, key: WidgetKey, focusable: bool);

    /// Destroy the control for `key`. The key may be placed again later.
    fn release(&mut self, key: WidgetKey);
}

/// Widget host for trees without inline controls.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullWidgetHost;

impl WidgetHost for NullWidgetHost {
    fn place(&mut self, _key: WidgetKey, _widget: &FieldWidget, _placement: &Placement) {}

    fn set_focusable(&mut self, _key: WidgetKey, _focusable: bool) {}

    fn release(&mut self, _key: WidgetKey) {}
}

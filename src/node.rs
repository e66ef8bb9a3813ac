//! Nodes: movable, resizable boxes carrying plugs and field widgets.
//!
//! A node keeps three positions, all in world space:
//!
//! - `position` is where the node is (the target),
//! - `snap_pos` is where it will land on release while a drag is grid-snapped,
//! - `pos_smooth` is where it is drawn; it eases toward the target each frame.
//!
//! Geometry that depends on text measurement takes a [`Metrics`] context
//! holding the theme and the drawing surface.

use crate::camera::Camera;
use crate::field::FieldWidget;
use crate::fields::FieldLayout;
use crate::grid::{snap, snap_up};
use crate::hit_test::{classify_resize, is_in_bounds, plug_hit, Rect, ResizeDir};
use crate::plug::{Direction, Plug, PlugId, PlugType};
use crate::position::Position;
use crate::surface::Surface;
use crate::theme::Theme;
use crate::tree::{NodeId, TreeId};
use slint::Color;
use std::fmt;
use std::rc::Rc;

/// Behaviour shared by all nodes of one kind.
///
/// # Example
///
/// ```ignore
/// struct Add;
///
/// impl NodeType for Add {
///     fn name(&self) -> &str { "Add" }
///     fn on_init(&self, node: &mut Node) {
///         node.add_input("A", None);
///         node.add_input("B", None);
///         node.add_output("Sum", None);
///     }
/// }
/// ```
pub trait NodeType {
    /// Display name; replaces the name passed to `add_node`.
    fn name(&self) -> &str;

    /// Called once when the node is created, before its width is fitted.
    fn on_init(&self, _node: &mut Node) {}
}

/// Theme and surface needed for geometry queries.
#[derive(Clone, Copy)]
pub struct Metrics<'a> {
    pub theme: &'a Theme,
    pub surface: &'a dyn Surface,
}

impl<'a> Metrics<'a> {
    pub fn new(theme: &'a Theme, surface: &'a dyn Surface) -> Self {
        Self { theme, surface }
    }
}

pub struct Node {
    id: NodeId,
    tree: TreeId,
    name: String,
    kind: Option<Rc<dyn NodeType>>,

    /// Target position
    pub position: Position,
    /// Rendered position
    pub pos_smooth: Position,
    /// Grid-snapped drop position during a drag
    pub snap_pos: Position,

    width: f32,
    height: f32,

    inputs: Vec<Plug>,
    outputs: Vec<Plug>,
    fields: FieldLayout,

    pub dragging: bool,
    pub resizing: bool,
    pub resize_dir: ResizeDir,
    pub hover: bool,

    /// Body color override
    pub node_color: Option<Color>,
    pub header_color: Option<Color>,
    pub border_color: Option<Color>,
    pub border_highlight: Option<Color>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("position", &self.position)
            .field("pos_smooth", &self.pos_smooth)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

impl Node {
    /// Create a node. Grid behaviour snaps the initial position.
    pub(crate) fn new(id: NodeId, tree: TreeId, position: Position, name: &str, theme: &Theme) -> Self {
        let mut position = position;
        if theme.has_grid_behavior() {
            position.x = snap(position.x, theme.grid_size);
            position.y = snap(position.y, theme.grid_size);
        }

        Self {
            id,
            tree,
            name: name.to_string(),
            kind: None,
            position,
            pos_smooth: position,
            snap_pos: position,
            width: 0.0,
            height: 0.0,
            inputs: Vec::new(),
            outputs: Vec::new(),
            fields: FieldLayout::new(),
            dragging: false,
            resizing: false,
            resize_dir: ResizeDir::None,
            hover: false,
            node_color: None,
            header_color: None,
            border_color: None,
            border_highlight: None,
        }
    }

    /// Attach a node type: adopt its name and run its initializer.
    pub(crate) fn init_with(&mut self, kind: Rc<dyn NodeType>) {
        self.name = kind.name().to_string();
        kind.on_init(self);
        self.kind = Some(kind);
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> TreeId {
        self.tree
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Option<&Rc<dyn NodeType>> {
        self.kind.as_ref()
    }

    pub fn inputs(&self) -> &[Plug] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Plug] {
        &self.outputs
    }

    pub fn fields(&self) -> &FieldLayout {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut FieldLayout {
        &mut self.fields
    }

    /// Add an input plug and its field widget.
    pub fn add_input(&mut self, name: &str, kind: Option<Rc<dyn PlugType>>) -> PlugId {
        self.add_plug(name, Direction::Input, kind)
    }

    /// Add an output plug and its label.
    pub fn add_output(&mut self, name: &str, kind: Option<Rc<dyn PlugType>>) -> PlugId {
        self.add_plug(name, Direction::Output, kind)
    }

    fn add_plug(&mut self, name: &str, direction: Direction, kind: Option<Rc<dyn PlugType>>) -> PlugId {
        let field = self.fields.push(Plug::make_field(name, direction, kind.as_ref()));
        let plug = Plug::new(name, direction, kind, field);
        let list = match direction {
            Direction::Input => &mut self.inputs,
            Direction::Output => &mut self.outputs,
        };
        list.push(plug);
        PlugId {
            tree: self.tree,
            node: self.id,
            direction,
            index: list.len() - 1,
        }
    }

    pub fn plug(&self, direction: Direction, index: usize) -> Option<&Plug> {
        match direction {
            Direction::Input => self.inputs.get(index),
            Direction::Output => self.outputs.get(index),
        }
    }

    pub(crate) fn plug_mut(&mut self, direction: Direction, index: usize) -> Option<&mut Plug> {
        match direction {
            Direction::Input => self.inputs.get_mut(index),
            Direction::Output => self.outputs.get_mut(index),
        }
    }

    /// Handles for every plug: inputs first, then outputs.
    pub fn plug_ids(&self) -> impl Iterator<Item = PlugId> + '_ {
        let inputs = (0..self.inputs.len()).map(move |index| PlugId {
            tree: self.tree,
            node: self.id,
            direction: Direction::Input,
            index,
        });
        let outputs = (0..self.outputs.len()).map(move |index| PlugId {
            tree: self.tree,
            node: self.id,
            direction: Direction::Output,
            index,
        });
        inputs.chain(outputs)
    }

    // === Geometry ===

    /// Set the explicit size. The effective size never drops below the minimum.
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Explicit size as last set, before minimums and grid rounding.
    pub fn explicit_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn min_width(&self, m: Metrics<'_>) -> f32 {
        let title = m.surface.measure_text(&self.name, &m.theme.header_font()) + 20.0;
        m.theme
            .node_min_width
            .max(self.fields.min_width())
            .max(title)
    }

    pub fn width(&self, m: Metrics<'_>) -> f32 {
        let width = self.width.max(self.min_width(m));
        if m.theme.has_grid_behavior() {
            snap_up(width, m.theme.grid_size)
        } else {
            width
        }
    }

    pub fn min_height(&self, theme: &Theme) -> f32 {
        theme
            .node_min_height
            .max(theme.node_header_size + self.fields.height())
            + 3.0
    }

    pub fn height(&self, theme: &Theme) -> f32 {
        let height = self.height.max(self.min_height(theme));
        if theme.has_grid_behavior() {
            snap_up(height, theme.grid_size)
        } else {
            height
        }
    }

    /// Raise the explicit width to what the fields recommend.
    pub fn fit_width(&mut self, m: Metrics<'_>) {
        let font = m.theme.plug_font();
        let recommended = self
            .fields
            .recommended_width(|text| m.surface.measure_text(text, &font));
        self.width = self.width(m).max(recommended);
    }

    /// Screen-space rect at the rendered position.
    pub fn screen_rect(&self, m: Metrics<'_>, camera: &Camera) -> Rect {
        let zoom = camera.zoom_smooth;
        let pos = self.pos_smooth.to_screen(camera);
        Rect::new(pos.x, pos.y, self.width(m) * zoom, self.height(m.theme) * zoom)
    }

    /// World-space anchor of one of this node's plugs.
    pub fn plug_anchor(&self, direction: Direction, index: usize, m: Metrics<'_>) -> Option<Position> {
        let field = self.plug(direction, index)?.field();
        let anchors = self
            .fields
            .plug_anchors(self.pos_smooth, self.width(m), m.theme.node_header_size);
        anchors.get(field).copied()
    }

    /// Screen-space anchors of all plugs, inputs first.
    pub fn plug_anchors_screen(&self, m: Metrics<'_>, camera: &Camera) -> Vec<(PlugId, (f32, f32))> {
        let anchors = self
            .fields
            .plug_anchors(self.pos_smooth, self.width(m), m.theme.node_header_size);
        self.plug_ids()
            .filter_map(|id| {
                let field = self.plug(id.direction, id.index)?.field();
                let p = anchors.get(field)?.to_screen(camera);
                Some((id, (p.x, p.y)))
            })
            .collect()
    }

    /// Check whether a screen point is over the node, with `r` pixels of slack.
    pub fn is_in_bounds(&self, x: f32, y: f32, r: f32, m: Metrics<'_>, camera: &Camera) -> bool {
        is_in_bounds(&self.screen_rect(m, camera), x, y, r)
    }

    /// Edge under a screen point, or [`ResizeDir::None`].
    pub fn resize_dir_at(&self, x: f32, y: f32, r: f32, m: Metrics<'_>, camera: &Camera) -> ResizeDir {
        let rect = self.screen_rect(m, camera);
        let radius = m.theme.plug_radius * camera.zoom_smooth;
        let over_plug = self
            .plug_anchors_screen(m, camera)
            .iter()
            .any(|(_, anchor)| plug_hit(*anchor, x, y, radius));
        classify_resize(&rect, x, y, r, over_plug)
    }

    /// Resize along `resize_dir` by a world-space delta.
    ///
    /// Edges on the north and west sides move the origin, shifting
    /// `position`, `snap_pos` and `pos_smooth` together. Deltas are clamped so
    /// the size never drops below the minimum.
    pub fn apply_resize(&mut self, dx: f32, dy: f32, m: Metrics<'_>) {
        let min_w = self.min_width(m);
        let min_h = self.min_height(m.theme);
        self.width = self.width.max(min_w);
        self.height = self.height.max(min_h);

        let (north, east, south, west) = match self.resize_dir {
            ResizeDir::None => return,
            ResizeDir::N => (true, false, false, false),
            ResizeDir::NE => (true, true, false, false),
            ResizeDir::E => (false, true, false, false),
            ResizeDir::SE => (false, true, true, false),
            ResizeDir::S => (false, false, true, false),
            ResizeDir::SW => (false, false, true, true),
            ResizeDir::W => (false, false, false, true),
            ResizeDir::NW => (true, false, false, true),
        };

        if north {
            let dy = dy.min(self.height - min_h);
            self.shift_origin(0.0, dy);
            self.height -= dy;
        }
        if south {
            self.height += dy.max(min_h - self.height);
        }
        if west {
            let dx = dx.min(self.width - min_w);
            self.shift_origin(dx, 0.0);
            self.width -= dx;
        }
        if east {
            self.width += dx.max(min_w - self.width);
        }
    }

    fn shift_origin(&mut self, dx: f32, dy: f32) {
        self.position.shift(dx, dy);
        self.snap_pos.shift(dx, dy);
        self.pos_smooth.shift(dx, dy);
    }

    // === Smoothing ===

    fn smoothing_target(&self) -> Position {
        if self.dragging {
            self.snap_pos
        } else {
            self.position
        }
    }

    /// Ease the rendered position toward its target.
    ///
    /// # Arguments
    /// * `delta` - Seconds since the previous frame
    /// * `smoothing` - Time constant from the theme
    pub fn update(&mut self, delta: f32, smoothing: f32) {
        let t = if smoothing > 0.0 { delta / smoothing } else { 1.0 };
        let target = self.smoothing_target();
        self.pos_smooth.x = crate::position::lerp(self.pos_smooth.x, target.x, t);
        self.pos_smooth.y = crate::position::lerp(self.pos_smooth.y, target.y, t);
    }

    /// True while the rendered position is more than one pixel from its target.
    pub fn needs_update(&self, camera: &Camera) -> bool {
        let target = self.smoothing_target().to_screen(camera);
        let drawn = self.pos_smooth.to_screen(camera);
        let dx = target.x - drawn.x;
        let dy = target.y - drawn.y;
        dx * dx + dy * dy > 1.0
    }

    /// Snap the rendered position onto the target.
    pub fn jump_to_target(&mut self) {
        self.pos_smooth = self.smoothing_target();
    }

    // === Colors ===

    pub fn body_color(&self, theme: &Theme) -> Color {
        self.node_color.unwrap_or(theme.node_color)
    }

    pub fn header_fill(&self, theme: &Theme) -> Color {
        self.header_color.unwrap_or(theme.node_header_color)
    }

    pub fn border(&self, theme: &Theme) -> Color {
        self.border_color.unwrap_or(theme.node_border_color)
    }

    pub fn border_hover(&self, theme: &Theme) -> Color {
        self.border_highlight.unwrap_or(theme.node_border_highlight)
    }

    /// Field widget bound to a plug.
    pub fn plug_field(&self, direction: Direction, index: usize) -> Option<&FieldWidget> {
        let field = self.plug(direction, index)?.field();
        self.fields.get(field)
    }
}

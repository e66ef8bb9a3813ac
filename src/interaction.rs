//! Pointer and keyboard handling.
//!
//! Each press starts exactly one [`Gesture`]. The gesture is chosen on
//! pointer down from what lies under the pointer, upgraded once on the first
//! move (a pressed plug turns into a pending connection), and finished on
//! pointer up.

use crate::camera::Camera;
use crate::grid::snap;
use crate::hit_test::{find_plug_at, plug_hit, ResizeDir, EDGE_TOLERANCE};
use crate::node::Metrics;
use crate::plug::PlugId;
use crate::position::Position;
use crate::surface::Surface;
use crate::tree::{NodeId, Tree};
use log::debug;
use slint::platform::PointerEventButton;
use std::time::{Duration, Instant};

/// Longest press that still counts as a click
pub const CLICK_TIME: Duration = Duration::from_millis(200);

const DELETE_KEY: &str = "\u{7f}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

impl From<PointerEventButton> for PointerButton {
    fn from(button: PointerEventButton) -> Self {
        match button {
            PointerEventButton::Left => PointerButton::Primary,
            PointerEventButton::Middle => PointerButton::Middle,
            _ => PointerButton::Secondary,
        }
    }
}

/// A pointer event in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub button: PointerButton,
    pub shift: bool,
    pub at: Instant,
}

impl PointerEvent {
    /// Primary-button event at `(x, y)`, stamped now.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            button: PointerButton::Primary,
            shift: false,
            at: Instant::now(),
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn at(mut self, at: Instant) -> Self {
        self.at = at;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Other,
}

impl Key {
    /// Map key text as delivered by Slint key events.
    pub fn from_text(text: &str) -> Self {
        if text == DELETE_KEY {
            Key::Delete
        } else {
            Key::Other
        }
    }
}

/// A connection being dragged out of an output plug.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingConnection {
    /// Output plug the connection starts from
    pub from: PlugId,
    /// Pointer in world space
    pub cursor: Position,
    /// Plug under the pointer, if any
    pub target: Option<PlugId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    CameraPan,
    /// A plug was pressed; becomes [`Gesture::Connecting`] on the first move
    PlugPress { plug: PlugId },
    Drag,
    Resize { node: NodeId },
    Connecting(PendingConnection),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct InteractionState {
    pub gesture: Gesture,
    pub button_down: bool,
    /// Set once the first move after a press has been handled
    pub moved: bool,
    pub last: (f32, f32),
    pub pressed_at: Option<Instant>,
    pub toggled_on_down: Option<NodeId>,
    pub cursor: ResizeDir,
}

impl InteractionState {
    /// Drop references to a removed node.
    pub(crate) fn forget_node(&mut self, id: NodeId) {
        let stale = match self.gesture {
            Gesture::PlugPress { plug } => plug.node == id,
            Gesture::Resize { node } => node == id,
            Gesture::Connecting(pending) => {
                pending.from.node == id || pending.target.is_some_and(|t| t.node == id)
            }
            _ => false,
        };
        if stale {
            self.gesture = Gesture::Idle;
        }
        if self.toggled_on_down == Some(id) {
            self.toggled_on_down = None;
        }
    }
}

impl<S: Surface> Tree<S> {
    pub fn gesture(&self) -> &Gesture {
        &self.interaction.gesture
    }

    /// Resize zone under the pointer while no button is down.
    pub fn cursor(&self) -> ResizeDir {
        self.interaction.cursor
    }

    /// Plug whose anchor is within `plug_radius * zoom` of a screen point.
    ///
    /// Nodes are searched topmost first.
    pub fn plug_at(&self, x: f32, y: f32) -> Option<PlugId> {
        let metrics = Metrics::new(&self.theme, &self.surface);
        let radius = self.theme.plug_radius * self.camera.zoom_smooth;
        self.order.iter().rev().find_map(|id| {
            let node = self.nodes.get(*id)?;
            find_plug_at(x, y, node.plug_anchors_screen(metrics, &self.camera), radius)
        })
    }

    fn select_and_raise(&mut self, id: NodeId, shift: bool) {
        self.select(id, shift);
        self.raise_node(id);
    }

    pub fn pointer_down(&mut self, event: PointerEvent) {
        self.set_fields_focusable(false);
        for node in self.nodes.values_mut() {
            node.dragging = false;
            node.resizing = false;
        }

        let state = &mut self.interaction;
        state.button_down = true;
        state.moved = false;
        state.last = (event.x, event.y);
        state.pressed_at = Some(event.at);
        state.toggled_on_down = None;
        state.gesture = Gesture::Idle;

        let gesture = match event.button {
            PointerButton::Middle => Gesture::CameraPan,
            PointerButton::Secondary => Gesture::Idle,
            PointerButton::Primary => self.primary_press(event),
        };
        debug!("Pointer down at ({}, {}): {:?}", event.x, event.y, gesture);
        self.interaction.gesture = gesture;
        self.repaint = true;
    }

    fn primary_press(&mut self, event: PointerEvent) -> Gesture {
        if let Some(plug) = self.plug_at(event.x, event.y) {
            if plug.is_output() || self.input_connection(plug).is_some() {
                return Gesture::PlugPress { plug };
            }
        }

        let Some(hit) = self.node_at(event.x, event.y, EDGE_TOLERANCE) else {
            if !event.shift {
                self.clear_selection();
            }
            return Gesture::Idle;
        };

        if event.shift {
            self.interaction.toggled_on_down = Some(hit);
        }
        self.select_and_raise(hit, event.shift);

        let metrics = Metrics::new(&self.theme, &self.surface);
        let dir = self
            .nodes
            .get(hit)
            .map(|n| n.resize_dir_at(event.x, event.y, EDGE_TOLERANCE, metrics, &self.camera))
            .unwrap_or_default();

        match (dir, self.nodes.get_mut(hit)) {
            (ResizeDir::None, _) | (_, None) => Gesture::Drag,
            (dir, Some(node)) => {
                node.resize_dir = dir;
                node.resizing = true;
                Gesture::Resize { node: hit }
            }
        }
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        let (x, y) = (event.x, event.y);
        let (dx, dy) = (x - self.interaction.last.0, y - self.interaction.last.1);
        self.interaction.last = (x, y);

        let hovered_plug = self.update_hover(x, y);

        if !self.interaction.button_down {
            self.interaction.cursor = self.resize_zone_at(x, y);
            return;
        }

        if !self.interaction.moved {
            // A move that lands on the press point is still a click
            if dx == 0.0 && dy == 0.0 {
                return;
            }
            self.interaction.moved = true;
            if let Gesture::PlugPress { plug } = self.interaction.gesture {
                self.start_connection(plug, x, y);
            }
        }

        let zoom = self.camera.zoom_smooth;
        match self.interaction.gesture {
            Gesture::CameraPan => {
                self.camera.pan(dx, dy);
                self.repaint = true;
            }
            Gesture::Resize { node } => {
                let metrics = Metrics::new(&self.theme, &self.surface);
                if let Some(node) = self.nodes.get_mut(node) {
                    node.apply_resize(dx / zoom, dy / zoom, metrics);
                    self.repaint = true;
                }
            }
            Gesture::Drag => self.drag_selected(dx / zoom, dy / zoom),
            Gesture::Connecting(mut pending) => {
                pending.cursor = Position::screen(x, y).to_world(&self.camera);
                pending.target = hovered_plug.filter(|p| *p != pending.from);
                self.interaction.gesture = Gesture::Connecting(pending);
                self.repaint = true;
            }
            Gesture::Idle | Gesture::PlugPress { .. } => {}
        }
    }

    fn start_connection(&mut self, plug: PlugId, x: f32, y: f32) {
        let from = if plug.is_output() {
            Some(plug)
        } else {
            self.input_connection(plug)
                .and_then(|c| self.remove_connection(c))
                .map(|c| c.output())
        };
        let Some(from) = from else {
            self.interaction.gesture = Gesture::Idle;
            return;
        };

        debug!("Dragging connection from {:?}", from);
        self.interaction.gesture = Gesture::Connecting(PendingConnection {
            from,
            cursor: Position::screen(x, y).to_world(&self.camera),
            target: None,
        });
    }

    fn drag_selected(&mut self, dx: f32, dy: f32) {
        let grid = self.theme.has_grid_behavior().then_some(self.theme.grid_size);
        for id in self.selection.iter() {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            node.dragging = true;
            node.position.shift(dx, dy);
            node.snap_pos = match grid {
                Some(step) => Position::world(snap(node.position.x, step), snap(node.position.y, step)),
                None => node.position,
            };
        }
        self.repaint = true;
    }

    /// Recompute hover flags. Returns the plug under the pointer.
    fn update_hover(&mut self, x: f32, y: f32) -> Option<PlugId> {
        let metrics = Metrics::new(&self.theme, &self.surface);
        let camera: &Camera = &self.camera;
        let radius = self.theme.plug_radius * camera.zoom_smooth;
        let mut hovered_plug = None;
        let mut changed = false;

        for id in &self.order {
            let Some(node) = self.nodes.get_mut(*id) else {
                continue;
            };
            let mut hover = node.is_in_bounds(x, y, EDGE_TOLERANCE, metrics, camera);
            for (plug, anchor) in node.plug_anchors_screen(metrics, camera) {
                let hit = plug_hit(anchor, x, y, radius);
                if hit {
                    hovered_plug = Some(plug);
                    hover = true;
                }
                if let Some(p) = node.plug_mut(plug.direction, plug.index) {
                    if p.hover != hit {
                        p.hover = hit;
                        changed = true;
                    }
                }
            }
            if node.hover != hover {
                node.hover = hover;
                changed = true;
            }
        }

        if changed {
            self.repaint = true;
        }
        hovered_plug
    }

    fn resize_zone_at(&self, x: f32, y: f32) -> ResizeDir {
        let metrics = Metrics::new(&self.theme, &self.surface);
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.nodes.get(*id))
            .map(|n| n.resize_dir_at(x, y, EDGE_TOLERANCE, metrics, &self.camera))
            .find(|dir| *dir != ResizeDir::None)
            .unwrap_or_default()
    }

    pub fn pointer_up(&mut self, event: PointerEvent) {
        self.set_fields_focusable(true);

        let clicked = !self.interaction.moved
            && self
                .interaction
                .pressed_at
                .is_some_and(|t| event.at.saturating_duration_since(t) <= CLICK_TIME);
        if clicked && event.button == PointerButton::Primary {
            self.click(event);
        }

        if let Gesture::Connecting(pending) = self.interaction.gesture {
            self.finish_connection(pending, event.x, event.y);
        }

        self.commit_drag();
        let state = &mut self.interaction;
        state.gesture = Gesture::Idle;
        state.button_down = false;
        state.pressed_at = None;
        state.toggled_on_down = None;
        self.repaint = true;
    }

    fn click(&mut self, event: PointerEvent) {
        match self.node_at(event.x, event.y, EDGE_TOLERANCE) {
            Some(hit) if event.shift => {
                if self.interaction.toggled_on_down != Some(hit) {
                    self.select_and_raise(hit, true);
                }
            }
            Some(hit) => self.select_and_raise(hit, false),
            None if !event.shift => self.clear_selection(),
            None => {}
        }
    }

    fn finish_connection(&mut self, pending: PendingConnection, x: f32, y: f32) {
        let Some(target) = self.plug_at(x, y) else {
            debug!("Dropped connection from {:?} on empty space", pending.from);
            return;
        };
        if let Err(err) = self.check_plugs(pending.from, target, true) {
            debug!("Rejected connection {:?} -> {:?}: {}", pending.from, target, err);
            return;
        }
        let (output, input) = if target.is_input() {
            (pending.from, target)
        } else {
            (target, pending.from)
        };
        if let Err(err) = self.add_connection(output, input) {
            debug!("Rejected connection {:?} -> {:?}: {}", output, input, err);
        }
    }

    fn commit_drag(&mut self) {
        for node in self.nodes.values_mut() {
            if node.dragging {
                node.position = node.snap_pos;
            }
            node.dragging = false;
            node.resizing = false;
            node.resize_dir = ResizeDir::None;
        }
    }

    /// Pointer left the canvas: abandon the press and clear hover.
    pub fn pointer_exit(&mut self) {
        self.commit_drag();
        for node in self.nodes.values_mut() {
            node.hover = false;
            for plug in node.plug_ids().collect::<Vec<_>>() {
                if let Some(p) = node.plug_mut(plug.direction, plug.index) {
                    p.hover = false;
                }
            }
        }
        if self.interaction.button_down {
            self.set_fields_focusable(true);
        }
        self.interaction = Default::default();
        self.repaint = true;
    }

    /// Zoom around a screen point. Positive notches zoom in.
    pub fn scroll(&mut self, x: f32, y: f32, notches: f32) {
        if notches == 0.0 {
            return;
        }
        self.camera.zoom_at(x, y, Camera::scroll_factor(notches));
        self.repaint = true;
    }

    pub fn key_up(&mut self, key: Key) {
        if key == Key::Delete {
            let removed = self.remove_selected();
            if removed > 0 {
                debug!("Deleted {} selected nodes", removed);
            }
        }
    }
}

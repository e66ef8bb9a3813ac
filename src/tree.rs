//! The graph container.
//!
//! A [`Tree`] owns its nodes and connections in generational arenas and keeps
//! the camera, theme, drawing surface, widget host and selection. Nodes,
//! plugs and connections are addressed from outside through copyable handles
//! ([`NodeId`], [`PlugId`], [`ConnectionId`]); a handle from another tree or to
//! a removed item simply fails to resolve.
//!
//! Pointer and keyboard handling lives in [`crate::interaction`], drawing in
//! [`crate::render`]. Both operate on the tree through `impl` blocks there.

use crate::camera::Camera;
use crate::connection::{Connection, ConnectionFilter};
use crate::error::{ConnectionError, GraphError};
use crate::field::{NullWidgetHost, WidgetHost, WidgetKey};
use crate::interaction::InteractionState;
use crate::node::{Metrics, Node, NodeType};
use crate::plug::{Direction, Plug, PlugId, PlugRef, PlugType};
use crate::position::Position;
use crate::selection::SelectionManager;
use crate::surface::{DisplayList, Surface};
use crate::theme::Theme;
use log::{debug, trace, warn};
use slotmap::SlotMap;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use uuid::Uuid;

slotmap::new_key_type! {
    /// Handle to a node in a [`Tree`].
    pub struct NodeId;
    /// Handle to a connection in a [`Tree`].
    pub struct ConnectionId;
}

/// Unique identity of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(Uuid);

impl TreeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TreeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Model changes queued for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    NodeAdded(NodeId),
    NodeRemoved(NodeId),
    ConnectionAdded(ConnectionId),
    ConnectionRemoved(ConnectionId, Connection),
    SelectionChanged,
}

pub struct Tree<S: Surface = DisplayList> {
    pub(crate) id: TreeId,
    pub(crate) theme: Theme,
    pub(crate) camera: Camera,
    pub(crate) surface: S,
    pub(crate) widgets: Box<dyn WidgetHost>,

    pub(crate) nodes: SlotMap<NodeId, Node>,
    /// Z-order, last is topmost
    pub(crate) order: Vec<NodeId>,
    pub(crate) connections: SlotMap<ConnectionId, Connection>,
    pub(crate) connection_order: Vec<ConnectionId>,

    pub(crate) selection: SelectionManager,
    pub(crate) interaction: InteractionState,
    events: Vec<GraphEvent>,

    pub(crate) repaint: bool,
    last_size: Option<(f32, f32)>,
    alive: bool,
    placed: HashSet<WidgetKey>,
}

impl<S: Surface> Tree<S> {
    /// Create an empty tree drawing to `surface`.
    ///
    /// The camera takes its smoothing from the theme.
    pub fn new(surface: S, theme: Theme) -> Self {
        Self {
            id: TreeId::new(),
            camera: Camera::new(theme.camera_smoothing),
            theme,
            surface,
            widgets: Box::new(NullWidgetHost),
            nodes: SlotMap::with_key(),
            order: Vec::new(),
            connections: SlotMap::with_key(),
            connection_order: Vec::new(),
            selection: SelectionManager::new(),
            interaction: InteractionState::default(),
            events: Vec::new(),
            repaint: true,
            last_size: None,
            alive: true,
            placed: HashSet::new(),
        }
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self.repaint = true;
        self
    }

    /// Route field widgets to a host toolkit.
    pub fn with_widget_host(mut self, host: impl WidgetHost + 'static) -> Self {
        self.widgets = Box::new(host);
        self
    }

    // === Accessors ===

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera access; schedules a repaint.
    pub fn camera_mut(&mut self) -> &mut Camera {
        self.repaint = true;
        &mut self.camera
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.contains(id)
    }

    pub fn metrics(&self) -> Metrics<'_> {
        Metrics::new(&self.theme, &self.surface)
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutable node access; schedules a repaint.
    pub fn node_by_id_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let node = self.nodes.get_mut(id)?;
        self.repaint = true;
        Some(node)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn contains_connection(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// Nodes bottom to top.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(*id))
    }

    /// Node handles bottom to top.
    pub fn node_order(&self) -> &[NodeId] {
        &self.order
    }

    /// Connections in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = (ConnectionId, &Connection)> {
        self.connection_order
            .iter()
            .filter_map(|id| self.connections.get(*id).map(|c| (*id, c)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Take all queued events.
    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GraphEvent) {
        self.events.push(event);
    }

    // === Nodes ===

    /// Add a node at `position`.
    ///
    /// A screen-space position is converted through the camera. With a node
    /// type, the type's name replaces `name` and its initializer adds plugs.
    pub fn add_node(&mut self, position: Position, kind: Option<Rc<dyn NodeType>>, name: &str) -> NodeId {
        let position = position.to_world(&self.camera);
        let tree = self.id;
        let theme = &self.theme;
        let id = self
            .nodes
            .insert_with_key(|id| Node::new(id, tree, position, name, theme));

        let metrics = Metrics::new(&self.theme, &self.surface);
        if let Some(node) = self.nodes.get_mut(id) {
            if let Some(kind) = kind {
                node.init_with(kind);
            }
            node.fit_width(metrics);
            debug!("Added node {:?} '{}' at ({}, {})", id, node.name(), position.x, position.y);
        }

        self.order.push(id);
        self.repaint = true;
        self.emit(GraphEvent::NodeAdded(id));
        id
    }

    /// Add an input plug to a node and refit its width.
    pub fn add_input(&mut self, node: NodeId, name: &str, kind: Option<Rc<dyn PlugType>>) -> Result<PlugId, GraphError> {
        self.add_plug(node, name, Direction::Input, kind)
    }

    /// Add an output plug to a node and refit its width.
    pub fn add_output(&mut self, node: NodeId, name: &str, kind: Option<Rc<dyn PlugType>>) -> Result<PlugId, GraphError> {
        self.add_plug(node, name, Direction::Output, kind)
    }

    fn add_plug(
        &mut self,
        node: NodeId,
        name: &str,
        direction: Direction,
        kind: Option<Rc<dyn PlugType>>,
    ) -> Result<PlugId, GraphError> {
        let metrics = Metrics::new(&self.theme, &self.surface);
        let target = self.nodes.get_mut(node).ok_or(GraphError::UnknownNode(node))?;
        let plug = match direction {
            Direction::Input => target.add_input(name, kind),
            Direction::Output => target.add_output(name, kind),
        };
        target.fit_width(metrics);
        self.repaint = true;
        Ok(plug)
    }

    /// Remove a node together with its connections and field widgets.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        if !self.nodes.contains_key(id) {
            warn!("remove_node: {:?} is not part of this tree", id);
            return None;
        }

        let attached: Vec<ConnectionId> = self
            .connection_order
            .iter()
            .copied()
            .filter(|c| {
                self.connections
                    .get(*c)
                    .is_some_and(|c| c.output_node() == id || c.input_node() == id)
            })
            .collect();
        for connection in attached {
            self.remove_connection(connection);
        }

        let node = self.nodes.remove(id)?;
        for index in 0..node.fields().len() {
            self.release_widget(WidgetKey { node: id, index });
        }
        self.order.retain(|n| *n != id);
        if self.selection.remove(id) {
            self.emit(GraphEvent::SelectionChanged);
        }
        self.interaction.forget_node(id);

        debug!("Removed node {:?} '{}'", id, node.name());
        self.repaint = true;
        self.emit(GraphEvent::NodeRemoved(id));
        Some(node)
    }

    /// Move a node to the top of the z-order.
    pub fn raise_node(&mut self, id: NodeId) {
        if let Some(index) = self.order.iter().position(|n| *n == id) {
            let node = self.order.remove(index);
            self.order.push(node);
            self.repaint = true;
        }
    }

    /// Set a node's target position, keeping its drop position in sync.
    pub fn move_node(&mut self, id: NodeId, position: Position) -> Result<(), GraphError> {
        let position = position.to_world(&self.camera);
        let node = self.nodes.get_mut(id).ok_or(GraphError::UnknownNode(id))?;
        node.position = position;
        node.snap_pos = position;
        self.repaint = true;
        Ok(())
    }

    /// Topmost node whose inflated screen rect contains the point.
    pub fn node_at(&self, x: f32, y: f32, r: f32) -> Option<NodeId> {
        let metrics = self.metrics();
        self.order.iter().rev().copied().find(|id| {
            self.nodes
                .get(*id)
                .is_some_and(|n| n.is_in_bounds(x, y, r, metrics, &self.camera))
        })
    }

    // === Selection ===

    /// Select a node, exclusively or as a shift-toggle.
    pub fn select(&mut self, id: NodeId, shift: bool) {
        if !self.nodes.contains_key(id) {
            return;
        }
        if self.selection.handle_interaction(id, shift) {
            self.repaint = true;
            self.emit(GraphEvent::SelectionChanged);
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.repaint = true;
            self.emit(GraphEvent::SelectionChanged);
        }
    }

    /// Remove every selected node. Returns how many were removed.
    pub fn remove_selected(&mut self) -> usize {
        let selected: Vec<NodeId> = self
            .order
            .iter()
            .copied()
            .filter(|id| self.selection.contains(*id))
            .collect();
        selected
            .into_iter()
            .filter_map(|id| self.remove_node(id))
            .count()
    }

    // === Plugs ===

    pub fn plug(&self, id: PlugId) -> Option<&Plug> {
        if id.tree != self.id {
            return None;
        }
        self.nodes.get(id.node)?.plug(id.direction, id.index)
    }

    pub(crate) fn plug_mut(&mut self, id: PlugId) -> Option<&mut Plug> {
        if id.tree != self.id {
            return None;
        }
        self.nodes.get_mut(id.node)?.plug_mut(id.direction, id.index)
    }

    /// World-space anchor of a plug at the node's rendered position.
    pub fn plug_position(&self, id: PlugId) -> Option<Position> {
        if id.tree != self.id {
            return None;
        }
        self.nodes
            .get(id.node)?
            .plug_anchor(id.direction, id.index, self.metrics())
    }

    pub fn plug_ref(&self, id: PlugId) -> PlugRef<'_, S> {
        PlugRef::new(self, id)
    }

    /// Connection currently feeding an input plug.
    pub fn input_connection(&self, input: PlugId) -> Option<ConnectionId> {
        self.connection_order
            .iter()
            .copied()
            .find(|c| self.connections.get(*c).is_some_and(|c| c.input() == input))
    }

    // === Connections ===

    /// Check whether `output` may feed `input`.
    ///
    /// With `replace`, an occupied input is not an error.
    pub fn check_connection(&self, output: PlugId, input: PlugId, replace: bool) -> Result<(), ConnectionError> {
        self.check_plugs(output, input, replace)
    }

    /// Legality check for a plug pair in either order.
    pub(crate) fn check_plugs(&self, a: PlugId, b: PlugId, replace: bool) -> Result<(), ConnectionError> {
        if a.direction == b.direction {
            return Err(ConnectionError::SameDirection);
        }
        let (output, input) = if a.is_input() { (b, a) } else { (a, b) };

        if output.tree != self.id || input.tree != self.id {
            return Err(ConnectionError::ForeignTree);
        }

        let out_plug = self.plug(output).ok_or(ConnectionError::UnknownPlug(output))?;
        let in_plug = self.plug(input).ok_or(ConnectionError::UnknownPlug(input))?;

        if self.is_ancestor_of(input.node, output.node) {
            return Err(ConnectionError::Cycle);
        }

        if let (Some(out_kind), Some(in_kind)) = (out_plug.kind(), in_plug.kind()) {
            if !out_kind.can_connect_to(in_kind.as_ref()) {
                return Err(ConnectionError::TypeMismatch {
                    output: out_kind.name().to_string(),
                    input: in_kind.name().to_string(),
                });
            }
        }

        if !replace && self.input_connection(input).is_some() {
            return Err(ConnectionError::InputOccupied(input));
        }

        Ok(())
    }

    /// Connect `output` to `input`, replacing whatever fed `input` before.
    pub fn add_connection(&mut self, output: PlugId, input: PlugId) -> Result<ConnectionId, GraphError> {
        if output.direction == input.direction {
            return Err(ConnectionError::SameDirection.into());
        }
        if !output.is_output() {
            return Err(ConnectionError::WrongDirection.into());
        }
        self.check_plugs(output, input, true)?;

        if let Some(previous) = self.input_connection(input) {
            self.remove_connection(previous);
        }

        let connection = Connection::new(self, output, input)?;
        let id = self.connections.insert(connection);
        self.connection_order.push(id);
        self.set_field_filled(input, true);

        debug!("Connected {:?} -> {:?} as {:?}", output, input, id);
        self.repaint = true;
        self.emit(GraphEvent::ConnectionAdded(id));
        Ok(id)
    }

    /// Remove a connection and re-open its input field.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let Some(connection) = self.connections.remove(id) else {
            warn!("remove_connection: {:?} is not part of this tree", id);
            return None;
        };
        self.connection_order.retain(|c| *c != id);
        self.set_field_filled(connection.input(), false);

        debug!("Removed connection {:?}", id);
        self.repaint = true;
        self.emit(GraphEvent::ConnectionRemoved(id, connection));
        Some(connection)
    }

    /// Connections matching `filter`, in insertion order.
    pub fn find_connections(&self, filter: &ConnectionFilter) -> Vec<ConnectionId> {
        self.connections()
            .filter(|(_, c)| filter.matches(c))
            .map(|(id, _)| id)
            .collect()
    }

    fn set_field_filled(&mut self, input: PlugId, filled: bool) {
        let Some(field) = self.plug(input).map(Plug::field) else {
            return;
        };
        if let Some(widget) = self
            .nodes
            .get_mut(input.node)
            .and_then(|n| n.fields_mut().get_mut(field))
        {
            widget.set_filled(filled);
        }
        if filled {
            self.release_widget(WidgetKey { node: input.node, index: field });
        }
    }

    // === Graph queries ===

    /// Whether `b` is reachable from `a` along connections. A node is its own
    /// ancestor.
    pub fn is_ancestor_of(&self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return true;
        }
        if !self.connections.values().any(|c| c.output_node() == a) {
            return false;
        }
        let edges = self.adjacency();
        let mut visited = HashSet::new();
        let mut stack = vec![a];
        while let Some(node) = stack.pop() {
            if node == b {
                return true;
            }
            if visited.insert(node) {
                if let Some(next) = edges.get(&node) {
                    stack.extend(next.iter().copied());
                }
            }
        }
        false
    }

    /// Output node to input nodes, built fresh from the connection arena.
    fn adjacency(&self) -> HashMap<NodeId, Vec<NodeId>> {
        let mut edges: HashMap<NodeId, Vec<NodeId>> = HashMap::with_capacity(self.nodes.len());
        for c in self.connections.values() {
            edges.entry(c.output_node()).or_default().push(c.input_node());
        }
        edges
    }

    /// Kahn's algorithm over the whole graph. Returns false when some node
    /// never reaches in-degree zero.
    fn is_acyclic(&self) -> bool {
        let edges = self.adjacency();
        let mut in_degree: HashMap<NodeId, usize> = self.nodes.keys().map(|id| (id, 0)).collect();
        for targets in edges.values() {
            for target in targets {
                *in_degree.entry(*target).or_default() += 1;
            }
        }

        let mut ready: Vec<NodeId> = in_degree.iter().filter(|(_, d)| **d == 0).map(|(id, _)| *id).collect();
        let mut visited = 0;
        while let Some(node) = ready.pop() {
            visited += 1;
            for target in edges.get(&node).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(target) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(*target);
                    }
                }
            }
        }
        visited == in_degree.len()
    }

    /// Nodes feeding into `node`, deduplicated.
    pub fn parents(&self, node: NodeId) -> Vec<NodeId> {
        let mut parents = Vec::new();
        for (_, c) in self.connections() {
            if c.input_node() == node && !parents.contains(&c.output_node()) {
                parents.push(c.output_node());
            }
        }
        parents
    }

    /// Nodes fed by `node`, deduplicated.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        let mut children = Vec::new();
        for (_, c) in self.connections() {
            if c.output_node() == node && !children.contains(&c.input_node()) {
                children.push(c.input_node());
            }
        }
        children
    }

    /// Check the tree-wide invariants.
    ///
    /// Every connection must resolve to live plugs of this tree, no input may
    /// hold more than one connection, the graph must be acyclic and the
    /// order lists must match the arenas.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.order.len() != self.nodes.len() || self.order.iter().any(|id| !self.nodes.contains_key(*id)) {
            return Err(GraphError::InvariantViolation("z-order does not match nodes".into()));
        }
        if self.connection_order.len() != self.connections.len() {
            return Err(GraphError::InvariantViolation(
                "connection order does not match connections".into(),
            ));
        }

        let mut inputs = HashSet::new();
        for (id, c) in self.connections() {
            if self.plug(c.output()).is_none() || self.plug(c.input()).is_none() {
                return Err(GraphError::InvariantViolation(format!("{:?} has a dangling plug", id)));
            }
            if !inputs.insert(c.input()) {
                return Err(GraphError::InvariantViolation(format!(
                    "input {:?} has more than one connection",
                    c.input()
                )));
            }
        }
        if !self.is_acyclic() {
            return Err(GraphError::InvariantViolation("connections form a cycle".into()));
        }
        Ok(())
    }

    // === Frame loop ===

    /// Force a redraw on the next frame.
    pub fn request_repaint(&mut self) {
        self.repaint = true;
    }

    /// Whether the next frame has work to do.
    pub fn needs_update(&self) -> bool {
        if !self.alive {
            return false;
        }
        self.repaint
            || self.last_size != Some(self.surface.size())
            || self.camera.needs_update()
            || self.nodes.values().any(|n| n.needs_update(&self.camera))
    }

    /// Per-frame poll. Returns whether a frame was rendered.
    pub fn frame(&mut self, delta: f32) -> bool {
        if !self.needs_update() {
            return false;
        }
        self.update(delta);
        true
    }

    /// Advance smoothing, place widgets and render, unconditionally.
    pub fn update(&mut self, delta: f32) {
        self.camera.update(delta);
        let smoothing = self.theme.node_smoothing;
        for node in self.nodes.values_mut() {
            node.update(delta, smoothing);
        }

        self.place_widgets();
        self.render();

        self.repaint = false;
        self.last_size = Some(self.surface.size());
        trace!("Rendered frame: {} nodes, {} connections", self.nodes.len(), self.connections.len());
    }

    /// Release every widget, empty the graph and stop the frame loop.
    pub fn destroy(&mut self) {
        let keys: Vec<WidgetKey> = self.placed.iter().copied().collect();
        for key in keys {
            self.release_widget(key);
        }
        self.nodes.clear();
        self.order.clear();
        self.connections.clear();
        self.connection_order.clear();
        self.selection.clear();
        self.interaction = InteractionState::default();
        self.alive = false;
        debug!("Tree {:?} destroyed", self.id);
    }

    // === Widgets ===

    fn place_widgets(&mut self) {
        let metrics = Metrics::new(&self.theme, &self.surface);
        let zoom = self.camera.zoom_smooth;
        let header = self.theme.node_header_size;
        let font_size = self.theme.plug_font_size;

        for id in &self.order {
            let Some(node) = self.nodes.get(*id) else {
                continue;
            };
            let fields = node.fields();
            let rows = fields.row_rects(node.pos_smooth, node.width(metrics), header, &self.camera);
            for (index, placement) in fields.placements(&rows, zoom, font_size) {
                let Some(widget) = fields.get(index) else {
                    continue;
                };
                let key = WidgetKey { node: *id, index };
                self.widgets.place(key, widget, &placement);
                self.placed.insert(key);
            }
        }
    }

    fn release_widget(&mut self, key: WidgetKey) {
        if self.placed.remove(&key) {
            self.widgets.release(key);
        }
    }

    /// Enable or disable focus on every field widget.
    pub(crate) fn set_fields_focusable(&mut self, focusable: bool) {
        for node in self.nodes.values_mut() {
            node.fields_mut().set_focusable(focusable);
        }
        for key in &self.placed {
            let Some(field) = self.nodes.get(key.node).and_then(|n| n.fields().get(key.index)) else {
                continue;
            };
            self.widgets.set_focusable(*key, field.is_focusable());
        }
    }

    /// Widgets currently placed with the host.
    pub fn placed_widgets(&self) -> impl Iterator<Item = WidgetKey> + '_ {
        self.placed.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldWidget, Placement};
    use std::cell::RefCell;

    fn tree() -> Tree {
        Tree::new(DisplayList::default(), Theme::default())
    }

    fn chain(tree: &mut Tree, count: usize) -> Vec<(NodeId, PlugId, PlugId)> {
        (0..count)
            .map(|i| {
                let node = tree.add_node(Position::world(i as f32 * 200.0, 0.0), None, "N");
                let input = tree.add_input(node, "in", None).unwrap();
                let output = tree.add_output(node, "out", None).unwrap();
                (node, input, output)
            })
            .collect()
    }

    struct Float;

    impl PlugType for Float {
        fn name(&self) -> &str {
            "Float"
        }

        fn create_setting(&self, name: &str) -> Option<FieldWidget> {
            Some(FieldWidget::range(name, 0.0, 1.0, 0.5, 0.1))
        }
    }

    struct Text;

    impl PlugType for Text {
        fn name(&self) -> &str {
            "Text"
        }
    }

    #[derive(Default)]
    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl WidgetHost for Recorder {
        fn place(&mut self, key: WidgetKey, _widget: &FieldWidget, _placement: &Placement) {
            self.log.borrow_mut().push(format!("place {}", key.index));
        }

        fn set_focusable(&mut self, key: WidgetKey, focusable: bool) {
            self.log.borrow_mut().push(format!("focus {} {}", key.index, focusable));
        }

        fn release(&mut self, key: WidgetKey) {
            self.log.borrow_mut().push(format!("release {}", key.index));
        }
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    #[test]
    fn test_add_node_emits_event_and_orders() {
        let mut tree = tree();
        let a = tree.add_node(Position::world(0.0, 0.0), None, "A");
        let b = tree.add_node(Position::world(10.0, 0.0), None, "B");

        assert_eq!(tree.node_order(), &[a, b]);
        assert_eq!(tree.node_by_id(a).unwrap().name(), "A");
        assert_eq!(
            tree.drain_events(),
            vec![GraphEvent::NodeAdded(a), GraphEvent::NodeAdded(b)]
        );
        assert!(tree.drain_events().is_empty());
    }

    #[test]
    fn test_add_node_converts_screen_position() {
        let mut tree = tree();
        tree.camera_mut().zoom = 2.0;
        tree.camera_mut().x = 100.0;
        tree.camera_mut().jump_to_target();
        let id = tree.add_node(Position::screen(300.0, 0.0), None, "N");
        assert_eq!(tree.node_by_id(id).unwrap().position, Position::world(200.0, 0.0));
    }

    #[test]
    fn test_add_plug_to_unknown_node() {
        let mut tree = tree();
        let id = tree.add_node(Position::world(0.0, 0.0), None, "N");
        tree.remove_node(id);
        assert_eq!(tree.add_input(id, "in", None), Err(GraphError::UnknownNode(id)));
    }

    #[test]
    fn test_add_plug_refits_width() {
        let mut tree = tree();
        let id = tree.add_node(Position::world(0.0, 0.0), None, "N");
        tree.add_input(id, "a long input name", None).unwrap();
        // 17 chars * 8 = 136 -> (136 + 20) * 3
        assert_eq!(tree.node_by_id(id).unwrap().explicit_size().0, 468.0);
    }

    #[test]
    fn test_raise_node() {
        let mut tree = tree();
        let nodes = chain(&mut tree, 3);
        tree.raise_node(nodes[0].0);
        assert_eq!(tree.node_order(), &[nodes[1].0, nodes[2].0, nodes[0].0]);
    }

    #[test]
    fn test_node_at_prefers_topmost() {
        let mut tree = tree();
        let a = tree.add_node(Position::world(0.0, 0.0), None, "A");
        let b = tree.add_node(Position::world(20.0, 20.0), None, "B");
        assert_eq!(tree.node_at(30.0, 30.0, 0.0), Some(b));
        tree.raise_node(a);
        assert_eq!(tree.node_at(30.0, 30.0, 0.0), Some(a));
        assert_eq!(tree.node_at(500.0, 500.0, 5.0), None);
    }

    #[test]
    fn test_remove_unknown_node_is_none() {
        let mut tree = tree();
        let id = tree.add_node(Position::world(0.0, 0.0), None, "N");
        assert!(tree.remove_node(id).is_some());
        assert!(tree.remove_node(id).is_none());
    }

    // ========================================================================
    // Connections
    // ========================================================================

    #[test]
    fn test_add_connection_fills_input_field() {
        let mut tree = tree();
        let nodes = chain(&mut tree, 2);
        let id = tree.add_connection(nodes[0].2, nodes[1].1).unwrap();

        assert!(tree.contains_connection(id));
        let field = tree.node_by_id(nodes[1].0).unwrap().plug_field(Direction::Input, 0).unwrap();
        assert!(field.is_filled());

        tree.remove_connection(id);
        let field = tree.node_by_id(nodes[1].0).unwrap().plug_field(Direction::Input, 0).unwrap();
        assert!(!field.is_filled());
    }

    #[test]
    fn test_cycle_rejected() {
        let mut tree = tree();
        let nodes = chain(&mut tree, 3);
        tree.add_connection(nodes[0].2, nodes[1].1).unwrap();
        tree.add_connection(nodes[1].2, nodes[2].1).unwrap();

        assert_eq!(
            tree.add_connection(nodes[2].2, nodes[0].1),
            Err(GraphError::Construction(ConnectionError::Cycle))
        );
        assert_eq!(
            tree.add_connection(nodes[0].2, nodes[0].1),
            Err(GraphError::Construction(ConnectionError::Cycle))
        );
        assert_eq!(tree.connection_count(), 2);
    }

    #[test]
    fn test_input_exclusivity_by_replacement() {
        let mut tree = tree();
        let nodes = chain(&mut tree, 3);
        let first = tree.add_connection(nodes[0].2, nodes[2].1).unwrap();
        let second = tree.add_connection(nodes[1].2, nodes[2].1).unwrap();

        assert!(!tree.contains_connection(first));
        assert!(tree.contains_connection(second));
        assert_eq!(tree.input_connection(nodes[2].1), Some(second));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_check_connection_reports_occupied() {
        let mut tree = tree();
        let nodes = chain(&mut tree, 3);
        tree.add_connection(nodes[0].2, nodes[2].1).unwrap();

        assert_eq!(
            tree.check_connection(nodes[1].2, nodes[2].1, false),
            Err(ConnectionError::InputOccupied(nodes[2].1))
        );
        assert!(tree.check_connection(nodes[1].2, nodes[2].1, true).is_ok());
    }

    #[test]
    fn test_check_is_symmetric() {
        let mut tree = tree();
        let nodes = chain(&mut tree, 2);
        assert!(tree.plug_ref(nodes[0].2).can_connect_to(nodes[1].1));
        assert!(tree.plug_ref(nodes[1].1).can_connect_to(nodes[0].2));
        assert!(!tree.plug_ref(nodes[1].1).can_connect_to(nodes[0].1));
    }

    #[test]
    fn test_type_mismatch() {
        let mut tree = tree();
        let a = tree.add_node(Position::world(0.0, 0.0), None, "A");
        let b = tree.add_node(Position::world(200.0, 0.0), None, "B");
        let out = tree.add_output(a, "out", Some(Rc::new(Text))).unwrap();
        let typed = tree.add_input(b, "x", Some(Rc::new(Float))).unwrap();
        let untyped = tree.add_input(b, "y", None).unwrap();

        assert_eq!(
            tree.check_connection(out, typed, false),
            Err(ConnectionError::TypeMismatch {
                output: "Text".into(),
                input: "Float".into()
            })
        );
        assert!(tree.check_connection(out, untyped, false).is_ok());
    }

    #[test]
    fn test_foreign_tree_rejected() {
        let mut one = tree();
        let mut two = tree();
        let a = chain(&mut one, 1);
        let b = chain(&mut two, 1);
        assert_eq!(
            one.add_connection(a[0].2, b[0].1),
            Err(GraphError::Construction(ConnectionError::ForeignTree))
        );
    }

    #[test]
    fn test_swapped_direction_leaves_graph_unchanged() {
        let mut tree = tree();
        let nodes = chain(&mut tree, 2);
        tree.drain_events();
        assert_eq!(
            tree.add_connection(nodes[1].1, nodes[0].2),
            Err(GraphError::Construction(ConnectionError::WrongDirection))
        );
        assert_eq!(tree.connection_count(), 0);
        assert!(tree.drain_events().is_empty());
    }

    #[test]
    fn test_stale_plug() {
        let mut tree = tree();
        let nodes = chain(&mut tree, 2);
        tree.remove_node(nodes[1].0);
        assert_eq!(
            tree.check_connection(nodes[0].2, nodes[1].1, false),
            Err(ConnectionError::UnknownPlug(nodes[1].1))
        );
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut tree = tree();
        let nodes = chain(&mut tree, 3);
        let c1 = tree.add_connection(nodes[0].2, nodes[1].1).unwrap();
        let c2 = tree.add_connection(nodes[1].2, nodes[2].1).unwrap();
        let c3 = tree.add_connection(nodes[0].2, nodes[2].1).unwrap();
        assert!(!tree.contains_connection(c2));

        tree.remove_node(nodes[1].0);
        assert!(!tree.contains_connection(c1));
        assert!(tree.contains_connection(c3));
        assert!(tree.find_connections(&ConnectionFilter::new().input_node(nodes[1].0)).is_empty());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_find_connections_in_insertion_order() {
        let mut tree = tree();
        let nodes = chain(&mut tree, 3);
        let c1 = tree.add_connection(nodes[0].2, nodes[2].1).unwrap();
        let c2 = tree.add_connection(nodes[0].2, nodes[1].1).unwrap();
        assert_eq!(
            tree.find_connections(&ConnectionFilter::new().output_node(nodes[0].0)),
            vec![c1, c2]
        );
    }

    #[test]
    fn test_parents_children_and_ancestry() {
        let mut tree = tree();
        let nodes = chain(&mut tree, 3);
        let second_in = tree.add_input(nodes[2].0, "in2", None).unwrap();
        tree.add_connection(nodes[0].2, nodes[1].1).unwrap();
        tree.add_connection(nodes[1].2, nodes[2].1).unwrap();
        tree.add_connection(nodes[1].2, second_in).unwrap();

        assert_eq!(tree.children(nodes[1].0), vec![nodes[2].0]);
        assert_eq!(tree.parents(nodes[2].0), vec![nodes[1].0]);
        assert!(tree.is_ancestor_of(nodes[0].0, nodes[2].0));
        assert!(tree.is_ancestor_of(nodes[2].0, nodes[2].0));
        assert!(!tree.is_ancestor_of(nodes[2].0, nodes[0].0));
    }

    // ========================================================================
    // Selection
    // ========================================================================

    #[test]
    fn test_remove_selected() {
        let mut tree = tree();
        let nodes = chain(&mut tree, 3);
        tree.select(nodes[0].0, false);
        tree.select(nodes[2].0, true);
        assert_eq!(tree.remove_selected(), 2);
        assert_eq!(tree.node_order(), &[nodes[1].0]);
        assert!(tree.selection().is_empty());
    }

    // ========================================================================
    // Frame loop and widgets
    // ========================================================================

    #[test]
    fn test_frame_renders_once_then_idles() {
        let mut tree = tree();
        tree.add_node(Position::world(0.0, 0.0), None, "N");
        assert!(tree.frame(0.016));
        assert!(!tree.needs_update());
        assert!(!tree.frame(0.016));
        assert_eq!(tree.surface().frame_count(), 1);
    }

    #[test]
    fn test_surface_resize_triggers_frame() {
        let mut tree = tree();
        tree.frame(0.016);
        tree.surface_mut().set_size(1024.0, 768.0);
        assert!(tree.needs_update());
    }

    #[test]
    fn test_zoom_only_change_needs_update() {
        let mut tree = tree();
        tree.frame(0.016);
        tree.camera_mut().zoom = 2.0;
        tree.frame(0.016);
        assert!(tree.needs_update());
        tree.camera_mut().jump_to_target();
        tree.frame(0.016);
        assert!(!tree.needs_update());
    }

    #[test]
    fn test_widgets_placed_and_released() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut tree = Tree::new(DisplayList::default(), Theme::default())
            .with_widget_host(Recorder { log: log.clone() });
        let a = tree.add_node(Position::world(0.0, 0.0), None, "A");
        let out = tree.add_output(a, "out", None).unwrap();
        let b = tree.add_node(Position::world(400.0, 0.0), None, "B");
        let input = tree.add_input(b, "x", Some(Rc::new(Float))).unwrap();

        tree.frame(0.016);
        assert_eq!(*log.borrow(), vec!["place 0".to_string()]);

        log.borrow_mut().clear();
        tree.add_connection(out, input).unwrap();
        assert_eq!(*log.borrow(), vec!["release 0".to_string()]);
        assert_eq!(tree.placed_widgets().count(), 0);
    }

    #[test]
    fn test_destroy_stops_frames() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut tree = Tree::new(DisplayList::default(), Theme::default())
            .with_widget_host(Recorder { log: log.clone() });
        let b = tree.add_node(Position::world(400.0, 0.0), None, "B");
        tree.add_input(b, "x", Some(Rc::new(Float))).unwrap();
        tree.frame(0.016);

        tree.destroy();
        assert!(!tree.is_alive());
        assert_eq!(tree.node_count(), 0);
        assert!(log.borrow().contains(&"release 0".to_string()));
        tree.request_repaint();
        assert!(!tree.frame(0.016));
    }

    #[test]
    fn test_validate_detects_cycle_in_arena() {
        let mut tree = tree();
        let nodes = chain(&mut tree, 3);
        // Built while still legal, inserted after the forward edges exist
        let back = Connection::new(&tree, nodes[2].2, nodes[0].1).unwrap();
        tree.add_connection(nodes[0].2, nodes[1].1).unwrap();
        tree.add_connection(nodes[1].2, nodes[2].1).unwrap();
        tree.validate().unwrap();

        let id = tree.connections.insert(back);
        tree.connection_order.push(id);
        assert!(matches!(tree.validate(), Err(GraphError::InvariantViolation(_))));
    }

    #[test]
    fn test_ancestry_on_long_chain_and_diamond() {
        let mut tree = tree();
        let nodes = chain(&mut tree, 400);
        for pair in nodes.windows(2) {
            tree.add_connection(pair[0].2, pair[1].1).unwrap();
        }
        assert!(tree.is_ancestor_of(nodes[0].0, nodes[399].0));
        assert!(!tree.is_ancestor_of(nodes[399].0, nodes[0].0));

        // Two paths into the same sink are not a cycle
        let extra = tree.add_input(nodes[399].0, "side", None).unwrap();
        tree.add_connection(nodes[0].2, extra).unwrap();
        tree.validate().unwrap();
    }

    #[test]
    fn test_validate_detects_broken_order() {
        let mut tree = tree();
        tree.add_node(Position::world(0.0, 0.0), None, "N");
        tree.order.clear();
        assert!(matches!(tree.validate(), Err(GraphError::InvariantViolation(_))));
    }
}

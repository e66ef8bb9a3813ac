//! Directed connections between an output plug and an input plug.

use crate::error::{ConnectionError, GraphError};
use crate::plug::{Direction, PlugId, PlugType};
use crate::surface::{Paint, Surface};
use crate::theme::Theme;
use crate::tree::{NodeId, Tree};
use slint::Color;

/// A validated, immutable edge from `output` to `input`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    output: PlugId,
    input: PlugId,
}

impl Connection {
    /// Validate and build a connection.
    ///
    /// Fails when either handle is stale, when `output` is not an output plug,
    /// or when the pair is illegal (cycle, foreign tree, type mismatch or an
    /// occupied input).
    pub fn new<S: Surface>(tree: &Tree<S>, output: PlugId, input: PlugId) -> Result<Self, GraphError> {
        if output.direction == input.direction {
            return Err(ConnectionError::SameDirection.into());
        }
        if output.direction != Direction::Output {
            return Err(ConnectionError::WrongDirection.into());
        }
        tree.check_plugs(output, input, false)?;
        Ok(Self { output, input })
    }

    pub fn output(&self) -> PlugId {
        self.output
    }

    pub fn input(&self) -> PlugId {
        self.input
    }

    pub fn output_node(&self) -> NodeId {
        self.output.node
    }

    pub fn input_node(&self) -> NodeId {
        self.input.node
    }

    /// Resolve start and end stroke colors.
    ///
    /// # Arguments
    /// * `kind` - Type of the output plug, if any
    /// * `theme` - Supplies the default color
    pub fn colors(&self, kind: Option<&dyn PlugType>, theme: &Theme) -> (Color, Color) {
        let start = kind
            .and_then(|k| k.connection_color())
            .unwrap_or(theme.connection_color);
        let end = kind.and_then(|k| k.connection_end_color(self)).unwrap_or(start);
        (start, end)
    }
}

/// Stroke paint for a connection: solid, or a gradient between the anchors
/// when the two colors differ.
pub fn stroke_paint(start: Color, end: Color, from: (f32, f32), to: (f32, f32)) -> Paint {
    if start == end {
        Paint::Solid(start)
    } else {
        Paint::LinearGradient { from, to, start, end }
    }
}

/// Search criteria for [`Tree::find_connections`]. Unset fields match anything.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConnectionFilter {
    pub output_node: Option<NodeId>,
    pub input_node: Option<NodeId>,
    pub output_plug: Option<PlugId>,
    pub input_plug: Option<PlugId>,
}

impl ConnectionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_node(mut self, node: NodeId) -> Self {
        self.output_node = Some(node);
        self
    }

    pub fn input_node(mut self, node: NodeId) -> Self {
        self.input_node = Some(node);
        self
    }

    pub fn output_plug(mut self, plug: PlugId) -> Self {
        self.output_plug = Some(plug);
        self
    }

    pub fn input_plug(mut self, plug: PlugId) -> Self {
        self.input_plug = Some(plug);
        self
    }

    pub fn matches(&self, connection: &Connection) -> bool {
        self.output_node.map_or(true, |n| connection.output.node == n)
            && self.input_node.map_or(true, |n| connection.input.node == n)
            && self.output_plug.map_or(true, |p| connection.output == p)
            && self.input_plug.map_or(true, |p| connection.input == p)
    }
}

//! Plugs: typed connection endpoints on a node.
//!
//! A plug is owned by its node and addressed from outside through a
//! [`PlugId`] handle. Plug types are capability objects implementing
//! [`PlugType`]; only [`PlugType::name`] is required.

use crate::connection::Connection;
use crate::error::ConnectionError;
use crate::field::FieldWidget;
use crate::position::Position;
use crate::surface::Surface;
use crate::tree::{NodeId, Tree, TreeId};
use slint::Color;
use std::fmt;
use std::rc::Rc;

/// Which side of a connection a plug sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

/// Non-owning handle to a plug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlugId {
    pub tree: TreeId,
    pub node: NodeId,
    pub direction: Direction,
    /// Index among the node's plugs of the same direction
    pub index: usize,
}

impl PlugId {
    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }

    pub fn is_output(&self) -> bool {
        self.direction == Direction::Output
    }
}

/// Capabilities of a plug type.
///
/// # Example
///
/// ```ignore
/// struct Float;
///
/// impl PlugType for Float {
///     fn name(&self) -> &str { "Float" }
///     fn connection_color(&self) -> Option<Color> { Some(Color::from_rgb_u8(80, 160, 255)) }
///     fn create_setting(&self, name: &str) -> Option<FieldWidget> {
///         Some(FieldWidget::range(name, 0.0, 1.0, 0.5, 0.01))
///     }
/// }
/// ```
pub trait PlugType {
    fn name(&self) -> &str;

    /// Whether an output of this type may feed an input of type `input`.
    fn can_connect_to(&self, input: &dyn PlugType) -> bool {
        self.name() == input.name()
    }

    fn plug_color(&self) -> Option<Color> {
        None
    }

    fn plug_border_color(&self) -> Option<Color> {
        None
    }

    fn plug_border_highlight(&self) -> Option<Color> {
        None
    }

    /// Stroke color of connections leaving an output of this type.
    fn connection_color(&self) -> Option<Color> {
        None
    }

    /// Gradient end color for a specific connection.
    fn connection_end_color(&self, _connection: &Connection) -> Option<Color> {
        None
    }

    /// Editable widget for an input of this type. `None` gives a plain label.
    fn create_setting(&self, _name: &str) -> Option<FieldWidget> {
        None
    }
}

/// A connection endpoint owned by a node.
#[derive(Clone)]
pub struct Plug {
    name: String,
    direction: Direction,
    kind: Option<Rc<dyn PlugType>>,
    field: usize,
    /// Pointer is over the plug
    pub hover: bool,
}

impl fmt::Debug for Plug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plug")
            .field("name", &self.name)
            .field("direction", &self.direction)
            .field("kind", &self.kind.as_ref().map(|k| k.name().to_string()))
            .field("field", &self.field)
            .field("hover", &self.hover)
            .finish()
    }
}

impl Plug {
    pub(crate) fn new(name: &str, direction: Direction, kind: Option<Rc<dyn PlugType>>, field: usize) -> Self {
        Self {
            name: name.to_string(),
            direction,
            kind,
            field,
            hover: false,
        }
    }

    /// Build the field widget a new plug should own.
    pub(crate) fn make_field(name: &str, direction: Direction, kind: Option<&Rc<dyn PlugType>>) -> FieldWidget {
        match (direction, kind) {
            (Direction::Input, Some(kind)) => kind
                .create_setting(name)
                .unwrap_or_else(|| FieldWidget::label(name, false)),
            (Direction::Input, None) => FieldWidget::label(name, false),
            (Direction::Output, _) => FieldWidget::label(name, true),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }

    pub fn kind(&self) -> Option<&Rc<dyn PlugType>> {
        self.kind.as_ref()
    }

    /// Index of the bound widget in the node's field layout.
    pub fn field(&self) -> usize {
        self.field
    }
}

/// Borrowed view of a plug together with its tree.
///
/// Answers the legality questions that need graph context.
pub struct PlugRef<'a, S: Surface> {
    tree: &'a Tree<S>,
    id: PlugId,
}

impl<'a, S: Surface> PlugRef<'a, S> {
    pub(crate) fn new(tree: &'a Tree<S>, id: PlugId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> PlugId {
        self.id
    }

    pub fn plug(&self) -> Option<&'a Plug> {
        self.tree.plug(self.id)
    }

    /// World-space anchor of the plug.
    pub fn position(&self) -> Option<Position> {
        self.tree.plug_position(self.id)
    }

    /// Full legality check, including input occupancy.
    ///
    /// Symmetric: the argument order of the two plugs does not matter.
    pub fn can_connect_to(&self, other: PlugId) -> bool {
        self.check(other, false).is_ok()
    }

    /// Legality check that ignores whether the input is already occupied.
    pub fn can_replace_connection(&self, other: PlugId) -> bool {
        self.check(other, true).is_ok()
    }

    /// Reason why a connection to `other` would be rejected.
    pub fn check(&self, other: PlugId, replace: bool) -> Result<(), ConnectionError> {
        self.tree.check_plugs(self.id, other, replace)
    }
}

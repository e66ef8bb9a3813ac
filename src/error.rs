//! Error types for graph construction and coordinate math.

use crate::plug::PlugId;
use crate::position::Space;
use crate::tree::NodeId;

/// Reasons why two plugs cannot be joined by a connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// The plug handle does not resolve to a live plug
    #[error("Plug {0:?} not found")]
    UnknownPlug(PlugId),
    /// The first plug of a connection must be an output
    #[error("Connection must start at an output plug")]
    WrongDirection,
    /// Both plugs are inputs or both are outputs
    #[error("Must connect input to output")]
    SameDirection,
    /// The plugs live in different trees
    #[error("Plugs belong to different trees")]
    ForeignTree,
    /// The input node is already upstream of the output node
    #[error("Connection would create a cycle")]
    Cycle,
    /// The output plug type refuses the input plug type
    #[error("Type mismatch: {output} cannot feed {input}")]
    TypeMismatch { output: String, input: String },
    /// The input plug already has a connection
    #[error("Input plug {0:?} is already connected")]
    InputOccupied(PlugId),
}

/// Errors raised synchronously by the graph API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// A connection could not be built from the given plugs
    #[error("cannot create connection: {0}")]
    Construction(#[from] ConnectionError),
    /// Two positions from different coordinate spaces were combined
    #[error("cannot combine a {left:?} position with a {right:?} position")]
    SpaceMismatch { left: Space, right: Space },
    /// The caller broke a tree-wide invariant
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    /// The node handle is stale or belongs to another tree
    #[error("node {0:?} is not part of this tree")]
    UnknownNode(NodeId),
}

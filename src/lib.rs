//! # Slint Node Graph
//!
//! Interaction and layout engine for canvas-based node graph editors.
//!
//! A [`Tree`] owns nodes, their typed plugs and the connections between them,
//! plus a [`Camera`] and a [`Theme`]. It turns pointer, scroll and key input
//! into graph edits and renders itself as [`DrawCommand`]s onto any
//! [`Surface`]. Editable plug fields are placed as overlay widgets through a
//! [`WidgetHost`].
//!
//! ## Quick Start
//!
//! ```
//! use slint_node_graph::{DisplayList, Position, Theme, Tree};
//!
//! let mut tree = Tree::new(DisplayList::default(), Theme::default());
//! let a = tree.add_node(Position::world(0.0, 0.0), None, "Source");
//! let b = tree.add_node(Position::world(300.0, 0.0), None, "Sink");
//! let out = tree.add_output(a, "value", None).unwrap();
//! let input = tree.add_input(b, "value", None).unwrap();
//! tree.add_connection(out, input).unwrap();
//!
//! assert!(tree.frame(1.0 / 60.0));
//! assert!(!tree.surface().commands().is_empty());
//! ```
//!
//! ## Modules
//!
//! - [`tree`] - Graph ownership, connection rules and the frame loop
//! - [`interaction`] - Pointer, scroll and keyboard gestures
//! - [`render`] - Scene generation as draw commands
//! - [`controller`] - Slint callback factories and a timer-driven frame loop
//! - [`layout`] - Sugiyama auto-layout (requires the `layout` feature)

pub mod camera;
pub mod connection;
pub mod controller;
pub mod error;
pub mod field;
pub mod fields;
pub mod grid;
pub mod interaction;
#[cfg(feature = "layout")]
pub mod layout;
pub mod node;
pub mod path;
pub mod plug;
pub mod position;
pub mod render;
pub mod selection;
pub mod surface;
pub mod theme;
pub mod tree;

pub use camera::Camera;
pub use connection::{Connection, ConnectionFilter};
pub use controller::GraphController;
pub use error::{ConnectionError, GraphError};
pub use field::{FieldWidget, NullWidgetHost, Placement, WidgetHost, WidgetKey, WidgetKind};
pub use hit_test::{Rect, ResizeDir};
pub use interaction::{Gesture, Key, PendingConnection, PointerButton, PointerEvent};
#[cfg(feature = "layout")]
pub use layout::{sugiyama_layout, SugiyamaConfig};
pub use node::{Metrics, Node, NodeType};
pub use plug::{Direction, Plug, PlugId, PlugRef, PlugType};
pub use position::{Position, Space};
pub use render::replay;
pub use selection::SelectionManager;
pub use surface::{DisplayList, DrawCommand, Font, Paint, Surface, TextAlign};
pub use theme::{ConnectionStyle, Theme};
pub use tree::{ConnectionId, GraphEvent, NodeId, Tree, TreeId};

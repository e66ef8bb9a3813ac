//! Sugiyama hierarchical graph layout.
//!
//! Wraps the `rust-sugiyama` crate. The free function works on any hashable
//! key; [`Tree::arrange`] feeds it the tree's nodes and connections and moves
//! every node to its computed place.
//!
//! Layout coordinates are `f64` because `rust-sugiyama` works in `f64`.
//!
//! Requires the `layout` feature to be enabled.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use log::debug;

use crate::position::Position;
use crate::surface::Surface;
use crate::tree::{NodeId, Tree};

/// Layout direction for the Sugiyama algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Direction {
    #[default]
    TopToBottom,
    /// Layers flow left to right, following connection direction.
    LeftToRight,
}

/// A positioned node returned by [`sugiyama_layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePosition<K> {
    pub id: K,
    /// Top-left corner.
    pub x: f64,
    pub y: f64,
}

/// Configuration for the Sugiyama layout algorithm.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct SugiyamaConfig {
    /// Minimum spacing between vertices. Zero keeps the `rust-sugiyama`
    /// default of 10.
    pub vertex_spacing: f64,
    /// Minimum edge length between layers. Zero keeps the default of 1.
    pub minimum_length: u32,
    pub dummy_vertices: bool,
    pub direction: Direction,
}

impl SugiyamaConfig {
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_vertex_spacing(mut self, spacing: f64) -> Self {
        self.vertex_spacing = spacing;
        self
    }
}

/// Compute layered positions for a directed graph.
///
/// Edges naming keys absent from `node_sizes` are skipped, and duplicate keys
/// in `node_sizes` keep their first size.
pub fn sugiyama_layout<K>(
    edges: &[(K, K)],
    node_sizes: &[(K, (f64, f64))],
    config: &SugiyamaConfig,
) -> Vec<NodePosition<K>>
where
    K: Copy + Eq + Hash,
{
    if node_sizes.is_empty() {
        return Vec::new();
    }

    let horizontal = config.direction == Direction::LeftToRight;

    let mut index: HashMap<K, u32> = HashMap::with_capacity(node_sizes.len());
    let mut keys: Vec<K> = Vec::with_capacity(node_sizes.len());
    let mut vertices: Vec<(u32, (f64, f64))> = Vec::with_capacity(node_sizes.len());

    for &(key, (w, h)) in node_sizes {
        if index.contains_key(&key) {
            continue;
        }
        let idx = keys.len() as u32;
        index.insert(key, idx);
        keys.push(key);
        // Layers are spaced along y, so swap axes for horizontal flow.
        vertices.push((idx, if horizontal { (h, w) } else { (w, h) }));
    }

    let mapped_edges: Vec<(u32, u32)> = edges
        .iter()
        .filter_map(|(src, dst)| Some((*index.get(src)?, *index.get(dst)?)))
        .collect();

    let mut sg_config = rust_sugiyama::configure::Config {
        dummy_vertices: config.dummy_vertices,
        ..Default::default()
    };
    if config.vertex_spacing > 0.0 {
        sg_config.vertex_spacing = config.vertex_spacing;
    }
    if config.minimum_length > 0 {
        sg_config.minimum_length = config.minimum_length;
    }

    let subgraphs = rust_sugiyama::from_vertices_and_edges(&vertices, &mapped_edges, &sg_config);

    let mut results = Vec::with_capacity(keys.len());
    for (layout, _width, _height) in &subgraphs {
        for &(idx, (x, y)) in layout {
            if let Some(&id) = keys.get(idx) {
                let (x, y) = if horizontal { (y, x) } else { (x, y) };
                results.push(NodePosition { id, x, y });
            }
        }
    }
    results
}

impl<S: Surface> Tree<S> {
    /// Lay out every node in layers following connection direction.
    ///
    /// Positions are in world space and take effect immediately for the
    /// target; the drawn position eases toward it as usual. Returns the
    /// number of nodes moved.
    pub fn arrange(&mut self, config: &SugiyamaConfig) -> usize {
        let metrics = self.metrics();
        let sizes: Vec<(NodeId, (f64, f64))> = self
            .nodes()
            .map(|node| {
                let size = (node.width(metrics) as f64, node.height(&self.theme) as f64);
                (node.id(), size)
            })
            .collect();

        let edges: Vec<(NodeId, NodeId)> = self
            .connections()
            .map(|(_, c)| (c.output_node(), c.input_node()))
            .filter(|(a, b)| a != b)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let placed = sugiyama_layout(&edges, &sizes, config);
        for p in &placed {
            if let Some(node) = self.nodes.get_mut(p.id) {
                let target = Position::world(p.x as f32, p.y as f32);
                node.position = target;
                node.snap_pos = target;
            }
        }

        debug!("Arranged {} nodes along {} edges", placed.len(), edges.len());
        self.repaint = true;
        placed.len()
    }
}

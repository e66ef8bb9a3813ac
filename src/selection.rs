use crate::tree::NodeId;
use std::collections::HashSet;

/// Set of selected nodes.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    selected: HashSet<NodeId>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a click on a node based on interaction modifiers.
    ///
    /// Shift toggles membership; a plain click selects the node exclusively.
    /// Returns whether the selection changed.
    pub fn handle_interaction(&mut self, id: NodeId, shift_held: bool) -> bool {
        if shift_held {
            self.toggle(id);
            true
        } else {
            self.select_exclusive(id)
        }
    }

    /// Make `id` the only selected node. Returns whether anything changed.
    pub fn select_exclusive(&mut self, id: NodeId) -> bool {
        if self.selected.len() == 1 && self.selected.contains(&id) {
            return false;
        }
        self.selected.clear();
        self.selected.insert(id);
        true
    }

    /// Flip membership of `id`, returning whether it is now selected.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Clear the current selection. Returns whether anything was selected.
    pub fn clear(&mut self) -> bool {
        let had_any = !self.selected.is_empty();
        self.selected.clear();
        had_any
    }

    /// Drop a single node, e.g. after it was removed from the graph.
    pub fn remove(&mut self, id: NodeId) -> bool {
        self.selected.remove(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.selected.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

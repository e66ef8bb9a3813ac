//! Test harness driving a tree through simulated pointer input.
//!
//! Event timestamps come from a virtual clock so click detection is
//! deterministic.

#![allow(dead_code)]

use super::WidgetLog;
use slint_node_graph::{
    DisplayList, GraphController, NodeId, PlugId, PlugType, PointerButton, PointerEvent, Position,
    Rect, Theme, Tree,
};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Initialize the testing backend for this thread.
/// Uses thread_local to ensure each thread only initializes once.
pub fn init_testing_backend() {
    use std::cell::Cell;
    thread_local! {
        static INITIALIZED: Cell<bool> = const { Cell::new(false) };
    }

    INITIALIZED.with(|init| {
        if !init.get() {
            i_slint_backend_testing::init_no_event_loop();
            init.set(true);
        }
    });
}

/// A node with its plugs, in creation order.
#[derive(Debug, Clone)]
pub struct TestNode {
    pub id: NodeId,
    pub inputs: Vec<PlugId>,
    pub outputs: Vec<PlugId>,
}

/// Tree on a recording surface plus a virtual clock.
pub struct GraphHarness {
    pub tree: Tree,
    pub widgets: WidgetLog,
    clock: Instant,
}

impl GraphHarness {
    pub fn new() -> Self {
        Self::with_theme(Theme::default())
    }

    pub fn with_theme(theme: Theme) -> Self {
        let widgets = WidgetLog::new();
        let tree = Tree::new(DisplayList::default(), theme).with_widget_host(widgets.clone());
        Self {
            tree,
            widgets,
            clock: Instant::now(),
        }
    }

    /// Two connected nodes: `N1.out -> N2.in`.
    pub fn pair() -> (Self, TestNode, TestNode) {
        let mut h = Self::new();
        let n1 = h.node("N1", 100.0, 100.0, &[], &["out"]);
        let n2 = h.node("N2", 400.0, 100.0, &["in"], &[]);
        h.tree
            .add_connection(n1.outputs[0], n2.inputs[0])
            .expect("connect N1.out -> N2.in");
        h.tree.drain_events();
        (h, n1, n2)
    }

    /// Add an untyped node with the named plugs.
    pub fn node(&mut self, name: &str, x: f32, y: f32, inputs: &[&str], outputs: &[&str]) -> TestNode {
        self.typed_node(name, x, y, inputs, outputs, None)
    }

    pub fn typed_node(
        &mut self,
        name: &str,
        x: f32,
        y: f32,
        inputs: &[&str],
        outputs: &[&str],
        kind: Option<Rc<dyn PlugType>>,
    ) -> TestNode {
        let id = self.tree.add_node(Position::world(x, y), None, name);
        let inputs = inputs
            .iter()
            .map(|n| self.tree.add_input(id, n, kind.clone()).expect("add input"))
            .collect();
        let outputs = outputs
            .iter()
            .map(|n| self.tree.add_output(id, n, kind.clone()).expect("add output"))
            .collect();
        TestNode { id, inputs, outputs }
    }

    // === Geometry ===

    pub fn rect(&self, id: NodeId) -> Rect {
        let node = self.tree.node_by_id(id).expect("live node");
        node.screen_rect(self.tree.metrics(), self.tree.camera())
    }

    /// A point inside the node's header, clear of edges and plugs.
    pub fn grab_point(&self, id: NodeId) -> (f32, f32) {
        let r = self.rect(id);
        (r.x + r.width / 2.0, r.y + 15.0)
    }

    pub fn plug_screen(&self, plug: PlugId) -> (f32, f32) {
        let p = self
            .tree
            .plug_position(plug)
            .expect("live plug")
            .to_screen(self.tree.camera());
        (p.x, p.y)
    }

    /// Run frames until smoothing has converged.
    pub fn settle(&mut self) {
        for _ in 0..16 {
            if !self.tree.frame(1.0) {
                break;
            }
        }
    }

    // === Pointer input ===

    fn tick(&mut self, ms: u64) -> Instant {
        self.clock += Duration::from_millis(ms);
        self.clock
    }

    pub fn press(&mut self, x: f32, y: f32) {
        let at = self.tick(10);
        self.tree.pointer_down(PointerEvent::new(x, y).at(at));
    }

    pub fn press_with(&mut self, x: f32, y: f32, button: PointerButton, shift: bool) {
        let at = self.tick(10);
        self.tree
            .pointer_down(PointerEvent::new(x, y).with_button(button).with_shift(shift).at(at));
    }

    pub fn release(&mut self, x: f32, y: f32) {
        let at = self.tick(10);
        self.tree.pointer_up(PointerEvent::new(x, y).at(at));
    }

    pub fn release_with(&mut self, x: f32, y: f32, button: PointerButton, shift: bool) {
        let at = self.tick(10);
        self.tree
            .pointer_up(PointerEvent::new(x, y).with_button(button).with_shift(shift).at(at));
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        let at = self.tick(5);
        self.tree.pointer_move(PointerEvent::new(x, y).at(at));
    }

    pub fn click(&mut self, x: f32, y: f32) {
        self.press(x, y);
        self.release(x, y);
    }

    pub fn shift_click(&mut self, x: f32, y: f32) {
        self.press_with(x, y, PointerButton::Primary, true);
        self.release_with(x, y, PointerButton::Primary, true);
    }

    /// Press, move in `steps` increments, release.
    pub fn drag(&mut self, from: (f32, f32), to: (f32, f32), steps: u32) {
        self.drag_with(from, to, steps, PointerButton::Primary);
    }

    pub fn drag_with(&mut self, from: (f32, f32), to: (f32, f32), steps: u32, button: PointerButton) {
        self.press_with(from.0, from.1, button, false);
        let steps = steps.max(1);
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            self.move_to(from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t);
        }
        self.release_with(to.0, to.1, button, false);
    }

    /// Drag from one plug onto another.
    pub fn drag_connection(&mut self, from: PlugId, to: PlugId) {
        let a = self.plug_screen(from);
        let b = self.plug_screen(to);
        self.drag(a, b, 4);
    }

    pub fn scroll(&mut self, x: f32, y: f32, notches: f32) {
        self.tree.scroll(x, y, notches);
    }
}

/// Controller over a fresh tree with the testing backend installed.
pub fn controller() -> GraphController {
    init_testing_backend();
    GraphController::new(Tree::new(DisplayList::default(), Theme::default()))
}

//! Slint glue for a [`Tree`].
//!
//! The [`GraphController`] shares one tree between the window callbacks and a
//! repeating [`slint::Timer`] that drives the frame loop.
//!
//! # Example
//!
//! ```ignore
//! use slint_node_graph::{GraphController, Tree, Theme};
//!
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let tree = Tree::new(SlintCanvas::new(window.as_weak()), Theme::default());
//!     let ctrl = GraphController::new(tree);
//!
//!     window.on_pointer_down(ctrl.pointer_down_callback());
//!     window.on_pointer_up(ctrl.pointer_up_callback());
//!     window.on_pointer_move(ctrl.pointer_move_callback());
//!     window.on_pointer_exit(ctrl.pointer_exit_callback());
//!     window.on_scroll(ctrl.scroll_callback());
//!     window.on_key_released(ctrl.key_released_callback());
//!
//!     ctrl.start_frame_loop(std::time::Duration::from_millis(16));
//!     window.run().unwrap();
//! }
//! ```

use crate::interaction::{Key, PointerEvent};
use crate::surface::{DisplayList, Surface};
use crate::tree::{GraphEvent, Tree};
use slint::platform::PointerEventButton;
use slint::{SharedString, Timer, TimerMode};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Shared handle to a tree plus its frame timer.
///
/// Clone this controller to share it across callbacks.
pub struct GraphController<S: Surface = DisplayList> {
    tree: Rc<RefCell<Tree<S>>>,
    timer: Rc<Timer>,
    last_tick: Rc<Cell<Option<Instant>>>,
}

impl<S: Surface> Clone for GraphController<S> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            timer: self.timer.clone(),
            last_tick: self.last_tick.clone(),
        }
    }
}

impl<S: Surface> GraphController<S> {
    pub fn new(tree: Tree<S>) -> Self {
        Self {
            tree: Rc::new(RefCell::new(tree)),
            timer: Rc::new(Timer::default()),
            last_tick: Rc::new(Cell::new(None)),
        }
    }

    /// Get access to the shared tree.
    pub fn tree(&self) -> Rc<RefCell<Tree<S>>> {
        self.tree.clone()
    }

    /// Run `f` with the tree mutably borrowed.
    pub fn with_tree<R>(&self, f: impl FnOnce(&mut Tree<S>) -> R) -> R {
        f(&mut self.tree.borrow_mut())
    }

    /// Take the tree's queued events.
    pub fn drain_events(&self) -> Vec<GraphEvent> {
        self.tree.borrow_mut().drain_events()
    }

    // === Callback factories ===

    /// Returns a callback for `pointer-down(x, y, button, shift)`.
    pub fn pointer_down_callback(&self) -> impl Fn(f32, f32, PointerEventButton, bool) {
        let tree = self.tree.clone();
        move |x, y, button, shift| {
            let event = PointerEvent::new(x, y).with_button(button.into()).with_shift(shift);
            tree.borrow_mut().pointer_down(event);
        }
    }

    /// Returns a callback for `pointer-up(x, y, button, shift)`.
    pub fn pointer_up_callback(&self) -> impl Fn(f32, f32, PointerEventButton, bool) {
        let tree = self.tree.clone();
        move |x, y, button, shift| {
            let event = PointerEvent::new(x, y).with_button(button.into()).with_shift(shift);
            tree.borrow_mut().pointer_up(event);
        }
    }

    /// Returns a callback for `pointer-move(x, y)`.
    pub fn pointer_move_callback(&self) -> impl Fn(f32, f32) {
        let tree = self.tree.clone();
        move |x, y| tree.borrow_mut().pointer_move(PointerEvent::new(x, y))
    }

    /// Returns a callback for `pointer-exit()`.
    pub fn pointer_exit_callback(&self) -> impl Fn() {
        let tree = self.tree.clone();
        move || tree.borrow_mut().pointer_exit()
    }

    /// Returns a callback for `scroll(x, y, notches)`.
    pub fn scroll_callback(&self) -> impl Fn(f32, f32, f32) {
        let tree = self.tree.clone();
        move |x, y, notches| tree.borrow_mut().scroll(x, y, notches)
    }

    /// Returns a callback for `key-released(text)`.
    pub fn key_released_callback(&self) -> impl Fn(SharedString) {
        let tree = self.tree.clone();
        move |text| tree.borrow_mut().key_up(Key::from_text(&text))
    }

    // === Frame loop ===

    /// Run one frame now. Returns whether anything was rendered.
    ///
    /// Stops the frame timer once the tree has been destroyed.
    pub fn tick(&self) -> bool {
        step(&self.tree, &self.timer, &self.last_tick)
    }

    pub fn is_running(&self) -> bool {
        self.timer.running()
    }

    pub fn stop_frame_loop(&self) {
        self.timer.stop();
    }
}

impl<S: Surface + 'static> GraphController<S> {
    /// Drive [`Tree::frame`] from a repeating timer.
    pub fn start_frame_loop(&self, interval: Duration) {
        let tree = Rc::downgrade(&self.tree);
        let timer = Rc::downgrade(&self.timer);
        let last_tick = self.last_tick.clone();
        self.last_tick.set(None);

        self.timer.start(TimerMode::Repeated, interval, move || {
            if let (Some(tree), Some(timer)) = (tree.upgrade(), timer.upgrade()) {
                step(&tree, &timer, &last_tick);
            }
        });
    }
}

fn step<S: Surface>(tree: &RefCell<Tree<S>>, timer: &Timer, last_tick: &Cell<Option<Instant>>) -> bool {
    let mut tree = tree.borrow_mut();
    if !tree.is_alive() {
        timer.stop();
        return false;
    }

    let now = Instant::now();
    let delta = last_tick
        .replace(Some(now))
        .map(|last| now.duration_since(last).as_secs_f32())
        .unwrap_or_else(|| timer.interval().as_secs_f32());
    tree.frame(delta)
}

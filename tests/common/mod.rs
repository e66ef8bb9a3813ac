//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use slint::Color;
use slint_node_graph::{FieldWidget, GraphEvent, Placement, PlugType, WidgetHost, WidgetKey};
use std::cell::RefCell;
use std::rc::Rc;

/// Records widget host calls as readable strings.
///
/// Clones share the same log.
#[derive(Default, Clone)]
pub struct WidgetLog {
    pub calls: Rc<RefCell<Vec<String>>>,
}

impl WidgetLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

impl WidgetHost for WidgetLog {
    fn place(&mut self, _key: WidgetKey, widget: &FieldWidget, _placement: &Placement) {
        self.calls.borrow_mut().push(format!("place {}", widget.name()));
    }

    fn set_focusable(&mut self, _key: WidgetKey, focusable: bool) {
        self.calls.borrow_mut().push(format!("focus {}", focusable));
    }

    fn release(&mut self, key: WidgetKey) {
        self.calls.borrow_mut().push(format!("release {}", key.index));
    }
}

/// A numeric plug type whose inputs carry a slider.
pub struct Float;

impl PlugType for Float {
    fn name(&self) -> &str {
        "Float"
    }

    fn plug_color(&self) -> Option<Color> {
        Some(Color::from_rgb_u8(120, 200, 120))
    }

    fn connection_color(&self) -> Option<Color> {
        Some(Color::from_rgb_u8(120, 200, 120))
    }

    fn create_setting(&self, name: &str) -> Option<FieldWidget> {
        Some(FieldWidget::range(name, 0.0, 1.0, 0.5, 0.1))
    }
}

/// A plain text plug type.
pub struct Text;

impl PlugType for Text {
    fn name(&self) -> &str {
        "Text"
    }

    fn create_setting(&self, name: &str) -> Option<FieldWidget> {
        Some(FieldWidget::text(name))
    }
}

/// Count events matching a predicate.
pub fn count_events(events: &[GraphEvent], pred: impl Fn(&GraphEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

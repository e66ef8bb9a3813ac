//! Frame rendering.
//!
//! A frame is built as a list of [`DrawCommand`]s from an immutable view of the
//! tree and then replayed onto the surface. Layers, bottom to top: background,
//! minor grid, major grid, connections, nodes in z-order, and the connection
//! being dragged.

use crate::connection::{stroke_paint, Connection};
use crate::field::ROW_HEIGHT;
use crate::grid::grid_lines;
use crate::interaction::Gesture;
use crate::node::Node;
use crate::path::{circle_path, connection_path, header_path, rounded_rect_path};
use crate::plug::{PlugId, PlugType};
use crate::surface::{DrawCommand, Paint, Surface, TextAlign};
use crate::tree::Tree;
use slint::Color;

/// Width of grid lines in pixels
const GRID_LINE_WIDTH: f32 = 1.0;
/// Header text sits slightly below the band's center
const HEADER_TEXT_DROP: f32 = 1.05;

impl<S: Surface> Tree<S> {
    pub(crate) fn render(&mut self) {
        let commands = self.scene();
        self.surface.begin_frame();
        replay(&commands, &mut self.surface);
    }

    /// Draw commands for the current state, without touching the surface.
    pub fn scene(&self) -> Vec<DrawCommand> {
        let mut out = Vec::new();
        let (width, height) = self.surface.size();

        out.push(DrawCommand::Rect {
            x: 0.0,
            y: 0.0,
            width,
            height,
            color: self.theme.background_color,
        });

        if let Some(grid) = grid_lines(&self.theme, &self.camera, width, height) {
            push_stroke(&mut out, grid.minor, Paint::Solid(self.theme.grid_color), GRID_LINE_WIDTH);
            if let Some(major) = grid.major {
                push_stroke(&mut out, major, Paint::Solid(self.theme.grid_major_color), GRID_LINE_WIDTH);
            }
        }

        for (_, connection) in self.connections() {
            if let Some(end) = self.plug_position(connection.input()) {
                let end = end.to_screen(&self.camera);
                self.connection_stroke(&mut out, connection.output(), (end.x, end.y), Some(connection));
            }
        }

        for id in &self.order {
            if let Some(node) = self.nodes.get(*id) {
                self.node_commands(&mut out, node);
            }
        }

        if let Gesture::Connecting(pending) = self.interaction.gesture {
            let end = pending
                .target
                .and_then(|t| self.plug_position(t))
                .unwrap_or(pending.cursor)
                .to_screen(&self.camera);
            self.connection_stroke(&mut out, pending.from, (end.x, end.y), None);
        }

        out
    }

    fn connection_stroke(
        &self,
        out: &mut Vec<DrawCommand>,
        output: PlugId,
        end: (f32, f32),
        connection: Option<&Connection>,
    ) {
        let Some(start) = self.plug_position(output) else {
            return;
        };
        let start = start.to_screen(&self.camera);
        let start = (start.x, start.y);
        let kind = self.plug(output).and_then(|p| p.kind()).map(|k| &**k);

        let from = kind
            .and_then(|k| k.connection_color())
            .unwrap_or(self.theme.connection_color);
        let to = match connection {
            Some(c) => c.colors(kind, &self.theme).1,
            None => from,
        };

        let zoom = self.camera.zoom_smooth;
        out.push(DrawCommand::StrokePath {
            commands: connection_path(&self.theme.connection_style, start, end, zoom),
            paint: stroke_paint(from, to, start, end),
            width: self.theme.connection_width * zoom,
        });
    }

    fn node_commands(&self, out: &mut Vec<DrawCommand>, node: &Node) {
        let theme = &self.theme;
        let camera = &self.camera;
        let metrics = self.metrics();
        let zoom = camera.zoom_smooth;
        let rect = node.screen_rect(metrics, camera);
        let radius = theme.node_border_radius * zoom;
        let header = theme.node_header_size * zoom;

        let body = rounded_rect_path(rect.x, rect.y, rect.width, rect.height, radius);
        out.push(DrawCommand::FillPath {
            commands: body.clone(),
            color: node.body_color(theme),
        });
        out.push(DrawCommand::FillPath {
            commands: header_path(rect.x, rect.y, rect.width, radius, header),
            color: node.header_fill(theme),
        });

        let border = if self.selection.contains(node.id()) {
            theme.node_border_select
        } else if node.hover {
            node.border_hover(theme)
        } else {
            node.border(theme)
        };
        out.push(DrawCommand::StrokePath {
            commands: body,
            paint: Paint::Solid(border),
            width: theme.node_border_thickness * zoom,
        });

        for (id, (x, y)) in node.plug_anchors_screen(metrics, camera) {
            let Some(plug) = node.plug(id.direction, id.index) else {
                continue;
            };
            let kind = plug.kind().map(|k| &**k);
            let circle = circle_path(x, y, theme.plug_radius * zoom);
            out.push(DrawCommand::FillPath {
                commands: circle.clone(),
                color: plug_color(kind, |k| k.plug_color(), theme.plug_color),
            });
            let outline = if plug.hover {
                plug_color(kind, |k| k.plug_border_highlight(), theme.plug_border_highlight)
            } else {
                plug_color(kind, |k| k.plug_border_color(), theme.plug_border_color)
            };
            out.push(DrawCommand::StrokePath {
                commands: circle,
                paint: Paint::Solid(outline),
                width: theme.plug_border_size * zoom,
            });
        }

        out.push(DrawCommand::Text {
            text: node.name().to_string(),
            x: rect.x + rect.width / 2.0,
            y: rect.y + header / 2.0 * HEADER_TEXT_DROP,
            font: theme.header_font().scaled(zoom),
            color: theme.header_font_color,
            align: TextAlign::Center,
        });

        let label_font = theme.plug_font().scaled(zoom);
        let rows = node
            .fields()
            .row_rects(node.pos_smooth, node.width(metrics), theme.node_header_size, camera);
        for (field, row) in node.fields().iter().zip(&rows) {
            if !field.has_name() {
                continue;
            }
            let (x, align) = if field.is_output() {
                (row.right(), TextAlign::Right)
            } else {
                (row.x, TextAlign::Left)
            };
            out.push(DrawCommand::Text {
                text: field.name().to_string(),
                x,
                y: row.y + ROW_HEIGHT * zoom / 2.0,
                font: label_font.clone(),
                color: theme.plug_font_color,
                align,
            });
        }
    }
}

fn plug_color(kind: Option<&dyn PlugType>, pick: fn(&dyn PlugType) -> Option<Color>, fallback: Color) -> Color {
    kind.and_then(pick).unwrap_or(fallback)
}

fn push_stroke(out: &mut Vec<DrawCommand>, commands: String, paint: Paint, width: f32) {
    if !commands.is_empty() {
        out.push(DrawCommand::StrokePath { commands, paint, width });
    }
}

/// Replay recorded commands onto a surface.
pub fn replay<S: Surface + ?Sized>(commands: &[DrawCommand], surface: &mut S) {
    for command in commands {
        match command {
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                color,
            } => surface.fill_rect(*x, *y, *width, *height, *color),
            DrawCommand::FillPath { commands, color } => surface.fill_path(commands, *color),
            DrawCommand::StrokePath { commands, paint, width } => surface.stroke_path(commands, paint, *width),
            DrawCommand::Text {
                text,
                x,
                y,
                font,
                color,
                align,
            } => surface.fill_text(text, *x, *y, font, *color, *align),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::PointerEvent;
    use crate::position::Position;
    use crate::surface::DisplayList;
    use crate::theme::Theme;
    use std::rc::Rc;

    struct Warm;

    impl PlugType for Warm {
        fn name(&self) -> &str {
            "Warm"
        }

        fn connection_color(&self) -> Option<Color> {
            Some(Color::from_rgb_u8(255, 0, 0))
        }

        fn connection_end_color(&self, _connection: &Connection) -> Option<Color> {
            Some(Color::from_rgb_u8(0, 0, 255))
        }

        fn plug_color(&self) -> Option<Color> {
            Some(Color::from_rgb_u8(1, 2, 3))
        }
    }

    fn no_grid() -> Theme {
        Theme {
            grid_size: 0.0,
            ..Theme::default()
        }
    }

    fn stroke_count(tree: &Tree) -> usize {
        tree.surface()
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokePath { .. }))
            .count()
    }

    // ========================================================================
    // Layers
    // ========================================================================

    #[test]
    fn test_empty_frame_is_background_and_grid() {
        let mut tree = Tree::new(DisplayList::default(), Theme::default());
        tree.frame(0.016);
        let commands = tree.surface().commands();

        assert!(matches!(
            commands[0],
            DrawCommand::Rect { width, height, .. } if width == 800.0 && height == 600.0
        ));
        // Minor and major lines
        assert_eq!(stroke_count(&tree), 2);
    }

    #[test]
    fn test_grid_disabled() {
        let mut tree = Tree::new(DisplayList::default(), no_grid());
        tree.frame(0.016);
        assert_eq!(tree.surface().commands().len(), 1);
    }

    #[test]
    fn test_node_layers_and_labels() {
        let mut tree = Tree::new(DisplayList::default(), no_grid());
        let a = tree.add_node(Position::world(0.0, 0.0), None, "Source");
        tree.add_output(a, "value", None).unwrap();
        tree.frame(0.016);

        let commands = tree.surface().commands();
        // background, body, header, border, plug fill, plug border, title, label
        assert_eq!(commands.len(), 8);
        assert!(matches!(&commands[1], DrawCommand::FillPath { color, .. } if *color == tree.theme().node_color));
        assert!(matches!(&commands[2], DrawCommand::FillPath { color, .. } if *color == tree.theme().node_header_color));

        let texts: Vec<&str> = tree.surface().texts().collect();
        assert_eq!(texts, vec!["Source", "value"]);
        match &commands[7] {
            DrawCommand::Text { align, x, .. } => {
                assert_eq!(*align, TextAlign::Right);
                let width = tree.node_by_id(a).unwrap().width(tree.metrics());
                assert_eq!(*x, width - 10.0);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_selected_border() {
        let mut tree = Tree::new(DisplayList::default(), no_grid());
        let a = tree.add_node(Position::world(0.0, 0.0), None, "A");
        tree.select(a, false);
        tree.frame(0.016);
        let select = tree.theme().node_border_select;
        assert!(tree
            .surface()
            .strokes()
            .any(|(_, paint, _)| *paint == Paint::Solid(select)));
    }

    #[test]
    fn test_plug_type_colors() {
        let mut tree = Tree::new(DisplayList::default(), no_grid());
        let a = tree.add_node(Position::world(0.0, 0.0), None, "A");
        tree.add_output(a, "out", Some(Rc::new(Warm))).unwrap();
        tree.frame(0.016);
        assert!(tree.surface().commands().iter().any(
            |c| matches!(c, DrawCommand::FillPath { color, .. } if *color == Color::from_rgb_u8(1, 2, 3))
        ));
    }

    // ========================================================================
    // Connections
    // ========================================================================

    #[test]
    fn test_connection_gradient() {
        let mut tree = Tree::new(DisplayList::default(), no_grid());
        let a = tree.add_node(Position::world(0.0, 0.0), None, "A");
        let b = tree.add_node(Position::world(300.0, 0.0), None, "B");
        let out = tree.add_output(a, "out", Some(Rc::new(Warm))).unwrap();
        let input = tree.add_input(b, "in", None).unwrap();
        tree.add_connection(out, input).unwrap();
        tree.frame(0.016);

        let (_, paint, width) = tree.surface().strokes().next().unwrap();
        assert_eq!(width, 2.0);
        match paint {
            Paint::LinearGradient { start, end, from, .. } => {
                assert_eq!(*start, Color::from_rgb_u8(255, 0, 0));
                assert_eq!(*end, Color::from_rgb_u8(0, 0, 255));
                let anchor = tree.plug_position(out).unwrap();
                assert_eq!(*from, (anchor.x, anchor.y));
            }
            other => panic!("unexpected paint {:?}", other),
        }
    }

    #[test]
    fn test_pending_connection_drawn_last() {
        let mut tree = Tree::new(DisplayList::default(), no_grid());
        let a = tree.add_node(Position::world(0.0, 0.0), None, "A");
        let out = tree.add_output(a, "out", None).unwrap();
        let anchor = tree.plug_position(out).unwrap();

        tree.pointer_down(PointerEvent::new(anchor.x, anchor.y));
        tree.pointer_move(PointerEvent::new(400.0, 300.0));
        tree.frame(0.016);

        match tree.surface().commands().last() {
            Some(DrawCommand::StrokePath { commands, paint, .. }) => {
                assert!(commands.ends_with("400 300"));
                assert_eq!(*paint, Paint::Solid(tree.theme().connection_color));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_replay_matches_scene() {
        let mut tree = Tree::new(DisplayList::default(), Theme::default());
        tree.add_node(Position::world(10.0, 10.0), None, "A");
        let scene = tree.scene();
        let mut copy = DisplayList::default();
        replay(&scene, &mut copy);
        assert_eq!(copy.commands(), scene.as_slice());
    }
}

//! Grid snapping and background grid line generation.

use crate::camera::Camera;
use crate::theme::Theme;

/// Round `value` to the nearest multiple of `step`.
pub fn snap(value: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

/// Round `value` up to the next multiple of `step`.
pub fn snap_up(value: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return value;
    }
    (value / step).ceil() * step
}

/// World-space step of the minor grid lines at the given zoom.
///
/// Zooming out multiplies the step by the major segment count while a cell
/// would be drawn smaller than `grid_min_render_size` pixels; zooming in
/// divides it while a cell would exceed `grid_max_render_size`.
pub fn render_step(theme: &Theme, zoom: f32) -> f32 {
    let mut step = theme.grid_size;
    let segments = theme.grid_major_segments as f32;
    if step <= 0.0 || zoom <= 0.0 || segments <= 1.0 {
        return step;
    }

    if theme.should_zoom_out_grid() {
        while zoom * step < theme.grid_min_render_size {
            step *= segments;
        }
    }

    if theme.should_zoom_in_grid() {
        while zoom * step > theme.grid_max_render_size {
            step /= segments;
        }
    }

    step
}

/// Minor and major grid line paths for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLines {
    pub minor: String,
    /// Present when the theme enables major lines
    pub major: Option<String>,
}

/// Compute the visible grid for the camera's smoothed state.
///
/// Returns `None` when the theme disables the grid.
///
/// # Arguments
/// * `theme` - Grid settings
/// * `camera` - Camera whose smoothed state defines the viewport
/// * `width`, `height` - Surface size in pixels
pub fn grid_lines(theme: &Theme, camera: &Camera, width: f32, height: f32) -> Option<GridLines> {
    if !theme.should_render_grid() {
        return None;
    }

    let step = render_step(theme, camera.zoom_smooth);
    let minor = generate_grid_commands(camera, width, height, step);
    let major = theme
        .has_major_grid()
        .then(|| generate_grid_commands(camera, width, height, step * theme.grid_major_segments as f32));

    Some(GridLines { minor, major })
}

/// Generate SVG path commands for grid lines
///
/// Lines sit on world-space multiples of `step` and span the whole surface.
///
/// # Arguments
/// * `camera` - Camera used for the world→screen transform
/// * `width` - Surface width in pixels
/// * `height` - Surface height in pixels
/// * `step` - World-space distance between lines
///
/// # Returns
/// SVG path commands string (e.g., "M 24 0 L 24 600 M 48 0 L 48 600...")
pub fn generate_grid_commands(camera: &Camera, width: f32, height: f32, step: f32) -> String {
    if step <= 0.0 || camera.zoom_smooth * step < 1.0 {
        return String::new();
    }

    let min_x = snap_up(camera.acam_x(0.0), step);
    let max_x = snap_up(camera.acam_x(width), step);
    let min_y = snap_up(camera.acam_y(0.0), step);
    let max_y = snap_up(camera.acam_y(height), step);

    let mut commands = String::with_capacity(10000);

    // Vertical lines
    let mut i = 0.0;
    while min_x + i * step < max_x {
        let x = camera.cam_x(min_x + i * step);
        if !commands.is_empty() {
            commands.push(' ');
        }
        commands.push_str(&format!("M {} 0 L {} {}", x, x, height));
        i += 1.0;
    }

    // Horizontal lines
    let mut i = 0.0;
    while min_y + i * step < max_y {
        let y = camera.cam_y(min_y + i * step);
        if !commands.is_empty() {
            commands.push(' ');
        }
        commands.push_str(&format!("M 0 {} L {} {}", y, width, y));
        i += 1.0;
    }

    commands
}

//! Pan/zoom camera with exponential smoothing.
//!
//! The camera keeps a *target* state (`x`, `y`, `zoom`) that input handlers
//! mutate, and a *smoothed* state (`x_smooth`, `y_smooth`, `zoom_smooth`) that
//! eases toward the target every frame. All world/screen transforms use the
//! smoothed state so that what is hit-tested matches what is drawn.
//!
//! # Example
//!
//! ```ignore
//! let mut camera = Camera::default();
//! camera.zoom_at(400.0, 300.0, Camera::scroll_factor(1.0));
//! while camera.needs_update() {
//!     camera.update(1.0 / 60.0);
//! }
//! ```

use crate::position::lerp;

/// Smallest allowed zoom factor
pub const MIN_ZOOM: f32 = 0.2;
/// Largest allowed zoom factor
pub const MAX_ZOOM: f32 = 5.0;
/// Zoom multiplier for one scroll notch outward
pub const ZOOM_STEP: f32 = 0.92;

const CONVERGENCE_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Target horizontal offset in screen pixels
    pub x: f32,
    /// Target vertical offset in screen pixels
    pub y: f32,
    /// Target zoom factor
    pub zoom: f32,
    pub x_smooth: f32,
    pub y_smooth: f32,
    pub zoom_smooth: f32,
    /// Time constant in seconds; larger is slower
    pub smoothing: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(0.08)
    }
}

impl Camera {
    /// Create a camera at the origin with zoom 1.
    pub fn new(smoothing: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
            x_smooth: 0.0,
            y_smooth: 0.0,
            zoom_smooth: 1.0,
            smoothing,
        }
    }

    /// Zoom multiplier for a scroll of `notches`.
    ///
    /// Negative notches zoom out by [`ZOOM_STEP`] each, positive notches zoom
    /// in by its reciprocal.
    pub fn scroll_factor(notches: f32) -> f32 {
        ZOOM_STEP.powf(-notches)
    }

    /// Ease the smoothed state toward the target.
    ///
    /// # Arguments
    /// * `delta` - Seconds since the previous frame
    pub fn update(&mut self, delta: f32) {
        let t = if self.smoothing > 0.0 {
            delta / self.smoothing
        } else {
            1.0
        };
        self.x_smooth = lerp(self.x_smooth, self.x, t);
        self.y_smooth = lerp(self.y_smooth, self.y, t);
        self.zoom_smooth = lerp(self.zoom_smooth, self.zoom, t);
    }

    /// True while the smoothed state has not converged on the target.
    pub fn needs_update(&self) -> bool {
        (self.x - self.x_smooth).abs()
            + (self.y - self.y_smooth).abs()
            + (self.zoom - self.zoom_smooth).abs()
            > CONVERGENCE_EPSILON
    }

    /// Snap the smoothed state onto the target.
    pub fn jump_to_target(&mut self) {
        self.x_smooth = self.x;
        self.y_smooth = self.y;
        self.zoom_smooth = self.zoom;
    }

    /// Zoom the target state around a screen point.
    ///
    /// The world point under `(pointer_x, pointer_y)` is computed from the
    /// target state, so repeated zooms within one frame stay anchored.
    ///
    /// # Arguments
    /// * `pointer_x`, `pointer_y` - Anchor in screen space
    /// * `factor` - Multiplier applied to the target zoom before clamping
    pub fn zoom_at(&mut self, pointer_x: f32, pointer_y: f32, factor: f32) {
        let world_x = (pointer_x + self.x) / self.zoom;
        let world_y = (pointer_y + self.y) / self.zoom;

        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);

        self.x = world_x * self.zoom - pointer_x;
        self.y = world_y * self.zoom - pointer_y;
    }

    /// Offset the target by a screen-space delta.
    ///
    /// Dragging the canvas right by `dx` moves the content right, so the
    /// camera offset decreases.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.x -= dx;
        self.y -= dy;
    }

    /// World x to screen x.
    pub fn cam_x(&self, x: f32) -> f32 {
        x * self.zoom_smooth - self.x_smooth
    }

    /// World y to screen y.
    pub fn cam_y(&self, y: f32) -> f32 {
        y * self.zoom_smooth - self.y_smooth
    }

    /// Screen x to world x.
    pub fn acam_x(&self, x: f32) -> f32 {
        (x + self.x_smooth) / self.zoom_smooth
    }

    /// Screen y to world y.
    pub fn acam_y(&self, y: f32) -> f32 {
        (y + self.y_smooth) / self.zoom_smooth
    }
}

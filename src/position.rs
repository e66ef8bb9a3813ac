//! Space-tagged 2D points.
//!
//! Every point in the editor is either in **world space** (graph content,
//! independent of pan/zoom) or **screen space** (surface pixels after the
//! camera transform). Combining points from different spaces is rejected
//! with [`GraphError::SpaceMismatch`].

use crate::camera::Camera;
use crate::error::GraphError;
use serde::{Deserialize, Serialize};

/// Coordinate frame of a [`Position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Space {
    /// Graph content coordinates.
    #[default]
    World,
    /// Surface pixel coordinates.
    Screen,
}

/// Clamped linear interpolation.
///
/// Returns `a` for `t <= 0` and `b` for `t >= 1`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    if t <= 0.0 {
        return a;
    }
    if t >= 1.0 {
        return b;
    }
    a * (1.0 - t) + b * t
}

/// A point tagged with the space it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub space: Space,
}

impl Position {
    pub fn new(x: f32, y: f32, space: Space) -> Self {
        Self { x, y, space }
    }

    /// A world space point.
    pub fn world(x: f32, y: f32) -> Self {
        Self::new(x, y, Space::World)
    }

    /// A screen space point.
    pub fn screen(x: f32, y: f32) -> Self {
        Self::new(x, y, Space::Screen)
    }

    pub fn is_world(&self) -> bool {
        self.space == Space::World
    }

    /// Convert to world space using the camera's rendered (smoothed) state.
    ///
    /// Returns a copy if the point is already in world space.
    pub fn to_world(&self, camera: &Camera) -> Position {
        match self.space {
            Space::World => *self,
            Space::Screen => Position::world(camera.acam_x(self.x), camera.acam_y(self.y)),
        }
    }

    /// Convert to screen space using the camera's rendered (smoothed) state.
    ///
    /// Returns a copy if the point is already in screen space.
    pub fn to_screen(&self, camera: &Camera) -> Position {
        match self.space {
            Space::Screen => *self,
            Space::World => Position::screen(camera.cam_x(self.x), camera.cam_y(self.y)),
        }
    }

    /// Move towards `target` by the clamped fraction `t`.
    pub fn lerp_to(&mut self, target: &Position, t: f32) -> Result<(), GraphError> {
        self.check_space(target)?;
        self.x = lerp(self.x, target.x, t);
        self.y = lerp(self.y, target.y, t);
        Ok(())
    }

    /// Squared euclidean distance to another point in the same space.
    pub fn distance_squared(&self, other: &Position) -> Result<f32, GraphError> {
        self.check_space(other)?;
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        Ok(dx * dx + dy * dy)
    }

    /// Euclidean distance to another point in the same space.
    pub fn distance_to(&self, other: &Position) -> Result<f32, GraphError> {
        self.distance_squared(other).map(f32::sqrt)
    }

    /// Translate by a delta, keeping the space.
    pub fn shift(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Assign both coordinates, keeping the space.
    pub fn set_to(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    fn check_space(&self, other: &Position) -> Result<(), GraphError> {
        if self.space != other.space {
            return Err(GraphError::SpaceMismatch {
                left: self.space,
                right: other.space,
            });
        }
        Ok(())
    }
}

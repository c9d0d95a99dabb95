//! Grid snapping for moving, rotating and scaling objects.

use crate::config::{ANGLE_SNAP_INCREMENT, GRID_SIZE};
use crate::scene::SceneObject;
use kurbo::Point;

/// Which continuous transform is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Move,
    Rotate,
    Scale,
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate moved.
    pub snapped_x: bool,
    /// Whether the Y coordinate moved.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> SnapResult {
    let x = snap_value(point.x, grid_size);
    let y = snap_value(point.y, grid_size);

    SnapResult {
        point: Point::new(x, y),
        snapped_x: x != point.x,
        snapped_y: y != point.y,
    }
}

fn snap_value(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

/// Snap an angle to the nearest increment.
/// Returns the snapped angle in degrees (0-360).
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    snap_value(angle_degrees, increment).rem_euclid(360.0)
}

/// Snap a length to a multiple of the grid, never below one grid unit.
pub fn snap_length(length: f64, grid_size: f64) -> f64 {
    snap_value(length, grid_size).max(grid_size)
}

/// Move the object so its centre sits on the grid.
pub fn snap_translation(obj: &mut SceneObject, grid_size: f64) {
    let center = obj.center();
    let result = snap_to_grid(center, grid_size);
    if result.is_snapped() {
        obj.set_center(result.point);
    }
}

/// Quantise the rotation angle.
pub fn snap_rotation(obj: &mut SceneObject, increment: f64) {
    if obj.supports_transform() {
        obj.rotation = snap_angle(obj.rotation, increment);
    }
}

/// Quantise the scaled size to grid multiples, recomputing the scale factors.
pub fn snap_scale(obj: &mut SceneObject, grid_size: f64) {
    if !obj.supports_transform() || obj.width <= 0.0 || obj.height <= 0.0 {
        return;
    }
    let size = obj.scaled_size();
    obj.scale_x = snap_length(size.width, grid_size) / obj.width;
    obj.scale_y = snap_length(size.height, grid_size) / obj.height;
}

/// Grid snapping parameters applied during continuous transforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSnap {
    pub grid_size: f64,
    pub angle_step: f64,
}

impl Default for GridSnap {
    fn default() -> Self {
        Self::new(GRID_SIZE, ANGLE_SNAP_INCREMENT)
    }
}

impl GridSnap {
    pub fn new(grid_size: f64, angle_step: f64) -> Self {
        Self { grid_size, angle_step }
    }

    /// Snap `obj` for the given transform. Does nothing when disabled.
    pub fn apply(&self, obj: &mut SceneObject, kind: TransformKind, enabled: bool) {
        if !enabled {
            return;
        }
        match kind {
            TransformKind::Move => snap_translation(obj, self.grid_size),
            TransformKind::Rotate => snap_rotation(obj, self.angle_step),
            TransformKind::Scale => snap_scale(obj, self.grid_size),
        }
    }
}

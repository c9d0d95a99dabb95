//! Editor tuning knobs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::scene::SceneError;

/// Grid unit in pixels.
pub const GRID_SIZE: f64 = 20.0;
/// Rotation snap step in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;
/// Radius within which a terminal captures the pointer.
pub const SNAP_DISTANCE: f64 = 15.0;
/// Offset applied to pasted clones.
pub const PASTE_OFFSET: f64 = 20.0;
/// Maximum number of history entries.
pub const MAX_UNDO_HISTORY: usize = 50;
/// Quiet period before an edit is recorded.
pub const HISTORY_DEBOUNCE_MS: u64 = 200;

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub grid_size: f64,
    pub angle_step: f64,
    pub snap_radius: f64,
    pub paste_offset: f64,
    pub history_depth: usize,
    pub history_debounce_ms: u64,
    /// Whether grid snapping starts enabled.
    pub grid_enabled: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            angle_step: ANGLE_SNAP_INCREMENT,
            snap_radius: SNAP_DISTANCE,
            paste_offset: PASTE_OFFSET,
            history_depth: MAX_UNDO_HISTORY,
            history_debounce_ms: HISTORY_DEBOUNCE_MS,
            grid_enabled: true,
        }
    }
}

impl EditorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.history_debounce_ms)
    }

    /// Parse a config, filling unspecified fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    /// Replace grid and angle steps that cannot quantise with their defaults.
    pub fn validated(mut self) -> Self {
        if !(self.grid_size.is_finite() && self.grid_size > 0.0) {
            log::warn!("Invalid grid size {}, using {}", self.grid_size, GRID_SIZE);
            self.grid_size = GRID_SIZE;
        }
        if !(self.angle_step.is_finite() && self.angle_step > 0.0) {
            log::warn!("Invalid angle step {}, using {}", self.angle_step, ANGLE_SNAP_INCREMENT);
            self.angle_step = ANGLE_SNAP_INCREMENT;
        }
        self
    }
}

//! Linear undo/redo over whole-scene snapshots.
//!
//! Edits are recorded through a debounce: `schedule` pushes a deadline back,
//! `poll` commits once the deadline passes. Restoring a snapshot runs under an
//! "applying" flag so the restoration itself is never recorded.

use crate::config::EditorConfig;
use crate::scene::{Scene, SceneError};
use std::time::Duration;

// Use web-time on WASM, std::time otherwise
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Snapshot log with a cursor.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
    max_depth: usize,
    debounce: Duration,
    deadline: Option<Instant>,
    applying: bool,
}

impl Default for History {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl History {
    pub fn new(max_depth: usize, debounce: Duration) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            max_depth: max_depth.max(1),
            debounce,
            deadline: None,
            applying: false,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.history_depth, config.debounce())
    }

    /// Start over with `scene` as the only entry.
    pub fn reset(&mut self, scene: &Scene) -> Result<(), SceneError> {
        self.entries = vec![scene.snapshot()?];
        self.cursor = 0;
        self.deadline = None;
        self.applying = false;
        Ok(())
    }

    /// Debounce a commit to `now + delay`, replacing any earlier deadline.
    pub fn schedule(&mut self, now: Instant) {
        if self.is_applying() {
            log::debug!("History commit suppressed while applying");
            return;
        }
        self.deadline = Some(now + self.debounce);
    }

    /// Whether a debounced commit is waiting.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Timer callback: commit once the debounce deadline has passed.
    pub fn poll(&mut self, now: Instant, scene: &Scene) -> Result<bool, SceneError> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.commit(scene),
            _ => Ok(false),
        }
    }

    /// Commit a pending debounced edit right away.
    pub fn flush(&mut self, scene: &Scene) -> Result<bool, SceneError> {
        if self.deadline.is_some() {
            self.commit(scene)
        } else {
            Ok(false)
        }
    }

    /// Record the current scene. Returns whether an entry was added.
    pub fn commit(&mut self, scene: &Scene) -> Result<bool, SceneError> {
        self.deadline = None;
        if self.is_applying() {
            return Ok(false);
        }

        let snapshot = scene.snapshot()?;
        if self.entries.get(self.cursor) == Some(&snapshot) {
            return Ok(false);
        }

        // A new edit discards the redo branch
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot);

        if self.entries.len() > self.max_depth {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len() - 1;

        log::debug!("History committed ({}/{})", self.cursor + 1, self.entries.len());
        Ok(true)
    }

    /// Move the cursor back and enter the applying state.
    ///
    /// Returns the snapshot to restore, or `None` at the start of the log.
    fn step_back(&mut self) -> Option<String> {
        if self.cursor == 0 || self.entries.is_empty() {
            return None;
        }
        self.cursor -= 1;
        self.applying = true;
        Some(self.entries[self.cursor].clone())
    }

    /// Move the cursor forward and enter the applying state.
    fn step_forward(&mut self) -> Option<String> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.applying = true;
        Some(self.entries[self.cursor].clone())
    }

    fn finish_apply(&mut self) {
        self.applying = false;
    }

    fn is_applying(&self) -> bool {
        self.applying
    }

    /// Undo into `scene`. Returns false when there is nothing to undo.
    pub fn undo(&mut self, scene: &mut Scene) -> Result<bool, SceneError> {
        self.flush(scene)?;
        let Some(snapshot) = self.step_back() else {
            return Ok(false);
        };
        let result = scene.restore(&snapshot);
        self.finish_apply();
        result.map(|_| true)
    }

    /// Redo into `scene`. Returns false when there is nothing to redo.
    pub fn redo(&mut self, scene: &mut Scene) -> Result<bool, SceneError> {
        self.flush(scene)?;
        let Some(snapshot) = self.step_forward() else {
            return Ok(false);
        };
        let result = scene.restore(&snapshot);
        self.finish_apply();
        result.map(|_| true)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

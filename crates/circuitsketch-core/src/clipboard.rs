//! Copy/paste of scene objects.

use crate::scene::{ObjectId, Scene, SceneObject};
use kurbo::Vec2;
use std::collections::HashMap;

/// Single-slot clipboard holding deep copies of objects.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    slot: Option<Vec<SceneObject>>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot with clones of `objects`. An empty selection leaves it alone.
    pub fn copy<'a>(&mut self, objects: impl IntoIterator<Item = &'a SceneObject>) -> usize {
        let copied: Vec<SceneObject> = objects.into_iter().cloned().collect();
        if copied.is_empty() {
            return 0;
        }
        let count = copied.len();
        self.slot = Some(copied);
        log::info!("Copied {} object(s)", count);
        count
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn contents(&self) -> Option<&[SceneObject]> {
        self.slot.as_deref()
    }

    /// Add fresh clones of the slot to `scene`, shifted by `offset`.
    ///
    /// Wire terminals pointing into the pasted set follow the clones; terminals
    /// pointing elsewhere are detached. Returns the new ids.
    pub fn paste(&self, scene: &mut Scene, offset: Vec2) -> Vec<ObjectId> {
        let Some(objects) = &self.slot else {
            return Vec::new();
        };

        let mut clones: Vec<SceneObject> = objects.clone();
        let mut remap: HashMap<ObjectId, ObjectId> = HashMap::new();
        for obj in &mut clones {
            let old = obj.id.clone();
            obj.regenerate_id();
            obj.translate(offset);
            remap.insert(old, obj.id.clone());
        }

        for wire in clones.iter_mut().filter_map(SceneObject::as_wire_mut) {
            for end in [&mut wire.source, &mut wire.target] {
                *end = end.take().and_then(|mut terminal| {
                    let id = remap.get(&terminal.object)?;
                    terminal.object = id.clone();
                    Some(terminal)
                });
            }
        }

        let ids: Vec<ObjectId> = clones.into_iter().map(|obj| scene.add(obj)).collect();
        log::info!("Pasted {} object(s)", ids.len());
        ids
    }
}

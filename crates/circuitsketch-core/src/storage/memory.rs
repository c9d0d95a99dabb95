//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::scene::Scene;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

fn lock_error<T>(err: PoisonError<T>) -> StorageError {
    StorageError::Other(format!("Lock error: {}", err))
}

/// In-memory storage for tests and throwaway sessions.
///
/// Holds serialized snapshots rather than live scenes so a load always
/// returns an independent copy.
#[derive(Default)]
pub struct MemoryStorage {
    scenes: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, scene: &Scene) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let snapshot = scene.snapshot();
        Box::pin(async move {
            let snapshot = snapshot?;
            self.scenes.write().map_err(lock_error)?.insert(id, snapshot);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Scene>> {
        let id = id.to_string();
        Box::pin(async move {
            let scenes = self.scenes.read().map_err(lock_error)?;
            let snapshot = scenes.get(&id).ok_or_else(|| StorageError::NotFound(id.clone()))?;
            Ok(Scene::from_json(snapshot)?)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.scenes.write().map_err(lock_error)?.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let scenes = self.scenes.read().map_err(lock_error)?;
            Ok(scenes.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let scenes = self.scenes.read().map_err(lock_error)?;
            Ok(scenes.contains_key(&id))
        })
    }
}

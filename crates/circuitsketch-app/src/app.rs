//! Headless application shell: configuration, a scripted editing session and
//! persistence.

use crate::demo::demo_circuit;
use circuitsketch_core::{
    Action, BuiltinSymbols, Editor, EditorConfig, FileStorage, KeyEvent, MemoryStorage, Modifiers,
    MouseButton, ObjectId, PointerEvent, ResolvedWire, SceneError, Storage, StorageError, SymbolKind,
    ToolKind,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub editor: EditorConfig,
    /// Where scenes are written; the platform data directory when unset.
    pub storage_dir: Option<PathBuf>,
    /// Keep scenes in memory only.
    pub in_memory: bool,
    /// Id the session's scene is saved under.
    pub scene_id: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "CircuitSketch".to_string(),
            editor: EditorConfig::default(),
            storage_dir: None,
            in_memory: false,
            scene_id: "demo".to_string(),
        }
    }
}

impl AppConfig {
    /// Read a JSON config file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Simulated clock for the scripted session.
struct Clock {
    now: Instant,
}

impl Clock {
    fn advance(&mut self, by: Duration) -> Instant {
        self.now += by;
        self.now
    }
}

fn press(at: Point) -> PointerEvent {
    PointerEvent::Down {
        position: at,
        button: MouseButton::Left,
    }
}

fn release(at: Point) -> PointerEvent {
    PointerEvent::Up {
        position: at,
        button: MouseButton::Left,
    }
}

/// The application.
pub struct App {
    config: AppConfig,
    editor: Editor,
    storage: Box<dyn Storage>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let storage: Box<dyn Storage> = if config.in_memory {
            Box::new(MemoryStorage::new())
        } else {
            match &config.storage_dir {
                Some(dir) => Box::new(FileStorage::new(dir.clone())?),
                None => Box::new(FileStorage::default_location()?),
            }
        };

        let mut editor = Editor::new(config.editor.clone());
        editor.load_scene(demo_circuit(&BuiltinSymbols))?;

        Ok(Self {
            config,
            editor,
            storage,
        })
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Drive the editor through a typical handout edit.
    ///
    /// Moves the switch, adds a lamp wired to a resistor, exercises undo/redo
    /// and duplicates the lamp. Returns the resolved wires afterwards.
    pub fn run_session(&mut self) -> Result<Vec<ResolvedWire>, AppError> {
        let debounce = self.config.editor.debounce();
        let frame = Duration::from_millis(16);
        let mut clock = Clock { now: Instant::now() };
        let editor = &mut self.editor;

        // Small symbols sit inside their own terminal radius; select first so
        // the press drags instead of starting a wire.
        let switch = ObjectId::from("switch");
        editor.select(switch.clone());
        editor.handle_pointer(press(Point::new(500.0, 100.0)), clock.now);
        for step in 1..=4 {
            let at = Point::new(500.0, 100.0 + 10.0 * step as f64);
            editor.handle_pointer(PointerEvent::Move { position: at }, clock.advance(frame));
            editor.animation_frame();
        }
        editor.handle_pointer(release(Point::new(500.0, 140.0)), clock.now);
        editor.tick(clock.advance(debounce))?;
        log::info!("Moved switch to {:?}", editor.scene().get(&switch).map(|o| o.position));

        editor.set_tool(ToolKind::Symbol(SymbolKind::Lamp));
        editor.handle_pointer(press(Point::new(400.0, 460.0)), clock.now);
        editor.handle_pointer(release(Point::new(400.0, 460.0)), clock.now);
        let lamp = editor.selection().first().cloned();
        editor.set_tool(ToolKind::Select);
        editor.tick(clock.advance(debounce))?;

        // Click the bottom of r2, then the top of the new lamp.
        editor.handle_pointer(press(Point::new(300.0, 330.0)), clock.now);
        editor.handle_pointer(release(Point::new(300.0, 330.0)), clock.now);
        editor.handle_pointer(press(Point::new(400.0, 441.0)), clock.advance(frame));
        editor.handle_pointer(release(Point::new(400.0, 441.0)), clock.now);
        editor.tick(clock.advance(debounce))?;

        editor.undo()?;
        editor.redo()?;

        if let Some(lamp) = lamp {
            editor.select(lamp);
            for (key, action) in [("c", Action::Copy), ("v", Action::Paste)] {
                let performed = editor.handle_key(KeyEvent::pressed(key, Modifiers::COMMAND), clock.now)?;
                debug_assert_eq!(performed, Some(action));
            }
            editor.tick(clock.advance(debounce))?;
        }

        log::info!(
            "Session finished: {} objects, {} history entries",
            editor.scene().len(),
            editor.history().len()
        );
        Ok(editor.export_wires())
    }

    /// Save the current scene, then read it back to confirm it round-trips.
    pub fn save(&self) -> Result<(), AppError> {
        let id = &self.config.scene_id;
        let scene = self.editor.scene();
        pollster::block_on(self.storage.save(id, scene))?;

        let reloaded = pollster::block_on(self.storage.load(id))?;
        if reloaded.len() != scene.len() {
            return Err(StorageError::Other(format!(
                "Scene '{}' reloaded with {} objects, expected {}",
                id,
                reloaded.len(),
                scene.len()
            ))
            .into());
        }
        log::info!("Saved scene '{}' ({} objects)", id, scene.len());
        Ok(())
    }

    /// Replace the editor's scene with a stored one.
    pub fn open(&mut self, id: &str) -> Result<(), AppError> {
        let scene = pollster::block_on(self.storage.load(id))?;
        self.editor.load_scene(scene)?;
        Ok(())
    }

    /// Run the session and persist the result.
    pub fn run(config: AppConfig) -> Result<Vec<ResolvedWire>, AppError> {
        log::info!("Starting {}", config.title);
        let mut app = App::new(config)?;
        let wires = app.run_session()?;
        app.save()?;
        Ok(wires)
    }
}

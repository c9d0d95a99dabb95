//! CircuitSketch Core Library
//!
//! Platform-agnostic schematic editing engine: circuit symbols on a snapping
//! grid, orthogonally routed wires between symbol terminals, undo/redo and
//! copy/paste, with a wire-anchoring overlay kept in step with the scene.

pub mod clipboard;
pub mod config;
pub mod connection;
pub mod editor;
pub mod history;
pub mod input;
pub mod overlay;
pub mod routing;
pub mod scene;
pub mod shortcuts;
pub mod snap;
pub mod storage;
pub mod symbols;

pub use clipboard::Clipboard;
pub use config::EditorConfig;
pub use connection::{ConnectionPoint, CursorHint, WireDrawing, nearest_connection_point, terminals};
pub use editor::{Editor, EditorFlags, PrimitiveTool, ToolKind, Transform};
pub use history::History;
pub use input::{InputState, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use overlay::{FrameRequest, Overlay, OverlayEdge, OverlayNode, ResolvedWire};
pub use routing::route;
pub use scene::{ObjectId, ObjectKind, Primitive, Scene, SceneError, SceneObject, Side, Terminal, Wire};
pub use shortcuts::{Action, ShortcutRegistry};
pub use snap::{GridSnap, TransformKind, snap_to_grid};
pub use storage::{MemoryStorage, Storage, StorageError, StorageResult};
pub use symbols::{BuiltinSymbols, Symbol, SymbolFactory, SymbolKind};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;

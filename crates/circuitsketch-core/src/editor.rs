//! Interactive editing session.
//!
//! The editor owns the scene and everything derived from it, and routes
//! pointer and keyboard input to placement, selection, transforms, wire
//! drawing, history and the clipboard. Time is supplied by the host so the
//! history debounce is driven through [`Editor::tick`] and overlay frame
//! rebuilds through [`Editor::animation_frame`].

use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::connection::{WireDrawing, nearest_connection_point, terminal_at};
use crate::history::History;
use crate::input::{InputState, KeyEvent, MouseButton, PointerEvent};
use crate::overlay::{Overlay, ResolvedWire};
use crate::routing::route;
use crate::scene::{ObjectId, Primitive, Scene, SceneError, SceneObject};
use crate::shortcuts::{Action, ShortcutRegistry};
use crate::snap::{GridSnap, TransformKind};
use crate::symbols::{BuiltinSymbols, SymbolFactory, SymbolKind, create_primitive, default_text};
use kurbo::{Point, Vec2};
use std::str::FromStr;

// Use web-time on WASM, std::time otherwise
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Pointer hit tolerance for thin objects such as wires.
const HIT_TOLERANCE: f64 = 4.0;
/// Minimum drag distance before a release can complete a wire.
const DRAG_CONNECT_THRESHOLD: f64 = 4.0;

/// Primitive placement tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTool {
    Rectangle,
    Ellipse,
    Circle,
    Text,
}

impl PrimitiveTool {
    pub fn primitive(self) -> Primitive {
        match self {
            PrimitiveTool::Rectangle => Primitive::Rectangle,
            PrimitiveTool::Ellipse => Primitive::Ellipse,
            PrimitiveTool::Circle => Primitive::Circle,
            PrimitiveTool::Text => default_text(),
        }
    }
}

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Symbol(SymbolKind),
    Shape(PrimitiveTool),
}

impl ToolKind {
    /// Whether pressing the canvas places a new object.
    pub fn is_placement(self) -> bool {
        !matches!(self, ToolKind::Select)
    }
}

impl FromStr for ToolKind {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "select" => ToolKind::Select,
            "rect" | "rectangle" => ToolKind::Shape(PrimitiveTool::Rectangle),
            "ellipse" => ToolKind::Shape(PrimitiveTool::Ellipse),
            "circle" => ToolKind::Shape(PrimitiveTool::Circle),
            "text" => ToolKind::Shape(PrimitiveTool::Text),
            other => ToolKind::Symbol(other.parse()?),
        })
    }
}

/// Toggles read at the moment each event is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorFlags {
    /// Snap transforms to the grid.
    pub grid_enabled: bool,
    /// A text field has keyboard focus; shortcuts are ignored.
    pub text_input_focused: bool,
}

/// A continuous transform request, relative to the start of the gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Offset from the gesture start.
    Move(Vec2),
    /// Degrees added to the starting rotation.
    Rotate(f64),
    /// Factors applied to the starting scale.
    Scale(f64, f64),
}

impl Transform {
    pub fn kind(&self) -> TransformKind {
        match self {
            Transform::Move(_) => TransformKind::Move,
            Transform::Rotate(_) => TransformKind::Rotate,
            Transform::Scale(..) => TransformKind::Scale,
        }
    }

    fn apply(&self, obj: &mut SceneObject) {
        match *self {
            Transform::Move(offset) => obj.translate(offset),
            Transform::Rotate(degrees) if obj.supports_transform() => obj.rotation += degrees,
            Transform::Scale(fx, fy) if obj.supports_transform() => {
                obj.scale_x *= fx;
                obj.scale_y *= fy;
            }
            _ => {}
        }
    }
}

/// Objects being transformed, captured when the gesture began.
#[derive(Debug, Clone)]
struct Gesture {
    start: Point,
    originals: Vec<SceneObject>,
    changed: bool,
}

/// The editing session.
pub struct Editor {
    scene: Scene,
    overlay: Overlay,
    history: History,
    clipboard: Clipboard,
    wiring: WireDrawing,
    input: InputState,
    pub flags: EditorFlags,
    config: EditorConfig,
    grid: GridSnap,
    factory: Box<dyn SymbolFactory>,
    tool: ToolKind,
    selection: Vec<ObjectId>,
    gesture: Option<Gesture>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Create an editor with the built-in symbols.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_factory(config, Box::new(BuiltinSymbols))
    }

    pub fn with_factory(config: EditorConfig, factory: Box<dyn SymbolFactory>) -> Self {
        let config = config.validated();
        let scene = Scene::new();
        let mut history = History::from_config(&config);
        // An empty scene always serializes.
        if let Err(err) = history.reset(&scene) {
            log::error!("Failed to initialise history: {}", err);
        }
        Self {
            scene,
            overlay: Overlay::new(),
            history,
            clipboard: Clipboard::new(),
            wiring: WireDrawing::new(),
            input: InputState::new(),
            flags: EditorFlags {
                grid_enabled: config.grid_enabled,
                text_input_focused: false,
            },
            grid: GridSnap::new(config.grid_size, config.angle_step),
            config,
            factory,
            tool: ToolKind::default(),
            selection: Vec::new(),
            gesture: None,
        }
    }

    /// Replace the scene and start a fresh history from it.
    pub fn load_scene(&mut self, scene: Scene) -> Result<(), SceneError> {
        self.history.reset(&scene)?;
        self.scene = scene;
        self.selection.clear();
        self.gesture = None;
        self.wiring.reset();
        self.overlay.cancel_frame();
        self.overlay.rebuild(&self.scene);
        log::info!("Loaded scene '{}' with {} objects", self.scene.name, self.scene.len());
        Ok(())
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// The in-progress wire gesture (preview, highlight, cursor).
    pub fn wiring(&self) -> &WireDrawing {
        &self.wiring
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Whether a wire is being drawn.
    pub fn is_connecting(&self) -> bool {
        self.wiring.is_active()
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Set the current tool. Placement tools abandon any wire in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool.is_placement() {
            self.wiring.reset();
        }
        log::debug!("Tool set to {:?}", tool);
        self.tool = tool;
    }

    // --- Selection ---

    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    /// Select an object (clears previous selection).
    pub fn select(&mut self, id: ObjectId) {
        self.selection.clear();
        self.add_to_selection(id);
    }

    pub fn add_to_selection(&mut self, id: ObjectId) {
        if self.scene.contains(&id) && !self.selection.contains(&id) {
            self.selection.push(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Select every object in z-order.
    pub fn select_all(&mut self) {
        self.selection = self.scene.iter().map(|o| o.id.clone()).collect();
    }

    pub fn is_selected(&self, id: &ObjectId) -> bool {
        self.selection.contains(id)
    }

    // --- Objects ---

    /// Add an object and record the change.
    pub fn add_object(&mut self, object: SceneObject, now: Instant) -> ObjectId {
        let id = self.scene.add(object);
        self.objects_changed(now);
        id
    }

    /// Place a circuit symbol centred at `at` and select it.
    pub fn place_symbol(&mut self, kind: SymbolKind, at: Point, now: Instant) -> ObjectId {
        let object = self.factory.create(kind, at);
        let id = self.add_object(object, now);
        self.select(id.clone());
        log::info!("Placed {} at ({}, {})", kind.display_name(), at.x, at.y);
        id
    }

    /// Place a primitive centred at `at` and select it.
    pub fn place_primitive(&mut self, primitive: Primitive, at: Point, now: Instant) -> ObjectId {
        let id = self.add_object(create_primitive(primitive, at), now);
        self.select(id.clone());
        id
    }

    /// Delete the selection together with wires attached to it.
    pub fn delete_selected(&mut self, now: Instant) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let mut doomed = std::mem::take(&mut self.selection);
        for id in doomed.clone() {
            for wire in self.scene.wires_attached_to(&id) {
                if !doomed.contains(&wire) {
                    doomed.push(wire);
                }
            }
        }

        let mut removed = 0;
        for id in &doomed {
            if self.scene.remove(id).is_some() {
                removed += 1;
            }
        }
        self.objects_changed(now);
        log::info!("Deleted {} object(s)", removed);
        removed
    }

    /// Remove everything.
    pub fn clear(&mut self, now: Instant) {
        self.scene.clear();
        self.selection.clear();
        self.gesture = None;
        self.wiring.reset();
        self.objects_changed(now);
        log::info!("Scene cleared");
    }

    // --- Clipboard ---

    /// Copy the selection. Returns the number of objects copied.
    pub fn copy(&mut self) -> usize {
        let objects = self.selection.iter().filter_map(|id| self.scene.get(id));
        self.clipboard.copy(objects)
    }

    /// Paste the clipboard, offset from the originals, and select the result.
    pub fn paste(&mut self, now: Instant) -> Vec<ObjectId> {
        let offset = Vec2::new(self.config.paste_offset, self.config.paste_offset);
        let ids = self.clipboard.paste(&mut self.scene, offset);
        if ids.is_empty() {
            return ids;
        }
        self.selection = ids.clone();
        self.objects_changed(now);
        ids
    }

    /// Copy then paste the selection.
    pub fn duplicate(&mut self, now: Instant) -> Vec<ObjectId> {
        if self.copy() == 0 {
            return Vec::new();
        }
        self.paste(now)
    }

    // --- History ---

    pub fn undo(&mut self) -> Result<bool, SceneError> {
        if !self.history.undo(&mut self.scene)? {
            log::info!("Nothing to undo");
            return Ok(false);
        }
        self.scene_restored();
        log::info!("Undo performed");
        Ok(true)
    }

    pub fn redo(&mut self) -> Result<bool, SceneError> {
        if !self.history.redo(&mut self.scene)? {
            log::info!("Nothing to redo");
            return Ok(false);
        }
        self.scene_restored();
        log::info!("Redo performed");
        Ok(true)
    }

    /// Bring derived state in line with a restored scene without recording it.
    fn scene_restored(&mut self) {
        self.selection.retain(|id| self.scene.contains(id));
        self.gesture = None;
        self.wiring.reset();
        self.overlay.cancel_frame();
        self.overlay.rebuild(&self.scene);
    }

    /// Timer callback: commits a debounced edit once due.
    ///
    /// Held while a transform gesture is in progress; `finish_transform`
    /// schedules the commit of the final state.
    pub fn tick(&mut self, now: Instant) -> Result<bool, SceneError> {
        if self.gesture.is_some() {
            return Ok(false);
        }
        self.history.poll(now, &self.scene)
    }

    /// Animation frame callback: runs a throttled overlay rebuild.
    pub fn animation_frame(&mut self) -> bool {
        self.overlay.on_animation_frame(&self.scene)
    }

    fn objects_changed(&mut self, now: Instant) {
        self.overlay.cancel_frame();
        self.overlay.rebuild(&self.scene);
        self.history.schedule(now);
    }

    // --- Transforms ---

    fn begin_gesture(&mut self, start: Point) {
        // Record the pre-gesture state before anything moves.
        if let Err(e) = self.history.flush(&self.scene) {
            log::warn!("Failed to record history before transform: {}", e);
        }
        let originals = self
            .selection
            .iter()
            .filter_map(|id| self.scene.get(id))
            .cloned()
            .collect();
        self.gesture = Some(Gesture {
            start,
            originals,
            changed: false,
        });
    }

    /// Move, rotate or scale the selection (moving/rotating/scaling event).
    ///
    /// Values are relative to the state when the gesture began. Grid snapping
    /// follows `flags.grid_enabled` at the time of the call; the overlay is
    /// rebuilt on the next animation frame.
    pub fn transform_selected(&mut self, transform: Transform) {
        if self.selection.is_empty() {
            return;
        }
        if self.gesture.is_none() {
            self.begin_gesture(self.input.pointer_position);
        }
        let Some(gesture) = &mut self.gesture else {
            return;
        };

        let kind = transform.kind();
        for original in &gesture.originals {
            let Some(obj) = self.scene.get_mut(&original.id) else {
                continue;
            };
            *obj = original.clone();
            transform.apply(obj);
            self.grid.apply(obj, kind, self.flags.grid_enabled);
        }
        gesture.changed = true;
        self.overlay.request_frame();
    }

    /// End the current transform (modified event). Returns whether anything changed.
    pub fn finish_transform(&mut self, now: Instant) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        if !gesture.changed {
            return false;
        }
        let moved: Vec<ObjectId> = gesture.originals.into_iter().map(|o| o.id).collect();
        self.reroute_wires(&moved);
        self.objects_changed(now);
        true
    }

    /// Re-anchor connected wires that moved or touch `moved` to their terminals.
    fn reroute_wires(&mut self, moved: &[ObjectId]) {
        let updates: Vec<(ObjectId, Vec<Point>)> = self
            .scene
            .iter()
            .filter_map(|obj| {
                let wire = obj.as_wire()?;
                if !moved.contains(&obj.id) && !moved.iter().any(|id| wire.touches(id)) {
                    return None;
                }
                let (source, target) = (wire.source.as_ref()?, wire.target.as_ref()?);
                let start = terminal_at(self.scene.get(&source.object)?, source.side);
                let end = terminal_at(self.scene.get(&target.object)?, target.side);
                Some((obj.id.clone(), route(&start, end.point)))
            })
            .collect();

        for (id, points) in updates {
            if let Some(obj) = self.scene.get_mut(&id) {
                obj.set_wire_points(points);
            }
        }
    }

    // --- Input ---

    /// Handle a pointer event at world position.
    pub fn handle_pointer(&mut self, event: PointerEvent, now: Instant) {
        self.input.handle_pointer_event(&event);
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => self.pointer_down(position, now),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up {
                position,
                button: MouseButton::Left,
            } => self.pointer_up(position, now),
            _ => {}
        }
    }

    fn pointer_down(&mut self, position: Point, now: Instant) {
        match self.tool {
            ToolKind::Symbol(kind) => {
                self.place_symbol(kind, position, now);
                return;
            }
            ToolKind::Shape(tool) => {
                self.place_primitive(tool.primitive(), position, now);
                return;
            }
            ToolKind::Select => {}
        }

        let radius = self.config.snap_radius;
        if self.wiring.is_active() {
            // Pressing away from a terminal keeps the preview alive.
            if let Some(wire) = self.wiring.finish(&self.scene, position, radius) {
                let id = self.add_object(SceneObject::wire(wire), now);
                log::info!("Wire {} added", id);
            }
            return;
        }

        let hit = self.scene.objects_at_point(position, HIT_TOLERANCE).into_iter().next();
        let on_active = hit.as_ref().is_some_and(|id| self.is_selected(id));
        if !on_active {
            if let Some(point) = nearest_connection_point(&self.scene, position, None, radius) {
                self.clear_selection();
                self.wiring.begin(point);
                return;
            }
        }

        match hit {
            Some(id) => {
                if !on_active {
                    self.select(id);
                }
                self.begin_gesture(position);
            }
            None => self.clear_selection(),
        }
    }

    fn pointer_move(&mut self, position: Point) {
        if self.tool.is_placement() {
            self.wiring.clear_highlight();
            return;
        }

        if self.input.is_dragging {
            if let Some(gesture) = &self.gesture {
                let offset = position - gesture.start;
                self.transform_selected(Transform::Move(offset));
                return;
            }
        }

        let radius = self.config.snap_radius;
        if self.wiring.is_active() {
            self.wiring.update(&self.scene, position, radius);
        } else {
            self.wiring.hover(&self.scene, position, radius);
        }
    }

    fn pointer_up(&mut self, position: Point, now: Instant) {
        if self.wiring.is_active() {
            if self.input.drag_distance() > DRAG_CONNECT_THRESHOLD {
                if let Some(wire) = self.wiring.finish(&self.scene, position, self.config.snap_radius) {
                    let id = self.add_object(SceneObject::wire(wire), now);
                    log::info!("Wire {} added", id);
                }
            }
            return;
        }
        self.finish_transform(now);
    }

    /// Handle a key event. Returns the action performed, if any.
    pub fn handle_key(&mut self, event: KeyEvent, now: Instant) -> Result<Option<Action>, SceneError> {
        self.input.handle_key_event(&event);
        let KeyEvent::Pressed { key, modifiers } = &event else {
            return Ok(None);
        };
        if self.flags.text_input_focused {
            return Ok(None);
        }
        let Some(action) = ShortcutRegistry::resolve(key, modifiers) else {
            return Ok(None);
        };
        self.perform(action, now)?;
        Ok(Some(action))
    }

    /// Run an editor action.
    pub fn perform(&mut self, action: Action, now: Instant) -> Result<(), SceneError> {
        match action {
            Action::Delete => {
                self.delete_selected(now);
            }
            Action::Copy => {
                self.copy();
            }
            Action::Paste => {
                self.paste(now);
            }
            Action::Duplicate => {
                self.duplicate(now);
            }
            Action::SelectAll => {
                self.select_all();
            }
            Action::Undo => {
                self.undo()?;
            }
            Action::Redo => {
                self.redo()?;
            }
            Action::CancelWire => {
                if self.wiring.is_active() {
                    log::debug!("Wire drawing cancelled");
                }
                self.wiring.reset();
            }
        }
        Ok(())
    }

    // --- Export ---

    /// Wires with endpoints resolved against current object geometry.
    pub fn export_wires(&mut self) -> Vec<ResolvedWire> {
        self.overlay.on_animation_frame(&self.scene);
        self.overlay.resolved_wires()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::routing::is_orthogonal;
    use crate::scene::{Side, Terminal};
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    fn mv(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(x, y),
        }
    }

    fn key(k: &str, modifiers: Modifiers) -> KeyEvent {
        KeyEvent::pressed(k, modifiers)
    }

    /// Lamp at (100, 100), resistor at (300, 100).
    fn editor_with_pair(now: Instant) -> (Editor, ObjectId, ObjectId) {
        let mut editor = Editor::default();
        let lamp = editor.place_symbol(SymbolKind::Lamp, Point::new(100.0, 100.0), now);
        let resistor = editor.place_symbol(SymbolKind::Resistor, Point::new(300.0, 100.0), now);
        editor.clear_selection();
        (editor, lamp, resistor)
    }

    #[test]
    fn test_tool_ids() {
        assert_eq!("select".parse::<ToolKind>().unwrap(), ToolKind::Select);
        assert_eq!("meter_a".parse::<ToolKind>().unwrap(), ToolKind::Symbol(SymbolKind::Ammeter));
        assert_eq!("rect".parse::<ToolKind>().unwrap(), ToolKind::Shape(PrimitiveTool::Rectangle));
        assert!("spline".parse::<ToolKind>().is_err());
    }

    #[test]
    fn test_place_tool_adds_and_selects() {
        let t0 = Instant::now();
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Symbol(SymbolKind::Switch));
        editor.handle_pointer(down(200.0, 200.0), t0);

        assert_eq!(editor.scene().len(), 1);
        assert_eq!(editor.selection().len(), 1);
        assert_eq!(editor.overlay().nodes().len(), 1);
        assert!(editor.history().is_pending());

        assert!(editor.tick(t0 + ms(200)).unwrap());
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_place_tool_suppresses_wiring() {
        let t0 = Instant::now();
        let (mut editor, _, _) = editor_with_pair(t0);
        editor.set_tool(ToolKind::Shape(PrimitiveTool::Rectangle));
        editor.handle_pointer(mv(120.0, 100.0), t0);
        assert!(editor.wiring().highlight().is_none());

        editor.handle_pointer(down(600.0, 600.0), t0);
        assert!(!editor.is_connecting());
        assert_eq!(editor.scene().len(), 3);
    }

    #[test]
    fn test_drag_to_connect() {
        let t0 = Instant::now();
        let (mut editor, lamp, resistor) = editor_with_pair(t0);

        editor.handle_pointer(down(122.0, 100.0), t0);
        assert!(editor.is_connecting());
        assert!(!editor.wiring().selection_enabled());

        editor.handle_pointer(mv(200.0, 140.0), t0);
        let preview = editor.wiring().preview().unwrap();
        assert_eq!(preview.len(), 4);
        assert!(is_orthogonal(preview));

        editor.handle_pointer(mv(273.0, 100.0), t0);
        assert_eq!(editor.wiring().highlight().unwrap().owner, resistor);

        editor.handle_pointer(up(273.0, 100.0), t0);
        assert!(!editor.is_connecting());
        assert_eq!(editor.scene().len(), 3);

        let edge = &editor.overlay().edges()[0];
        assert_eq!((&edge.source, edge.source_side), (&lamp, Side::Right));
        assert_eq!((&edge.target, edge.target_side), (&resistor, Side::Left));

        let wires = editor.export_wires();
        assert_eq!(wires[0].source, Point::new(120.0, 100.0));
        assert_eq!(wires[0].target, Point::new(275.0, 100.0));
        assert!(is_orthogonal(&wires[0].path));
    }

    #[test]
    fn test_click_to_connect() {
        let t0 = Instant::now();
        let (mut editor, _, _) = editor_with_pair(t0);

        editor.handle_pointer(down(120.0, 100.0), t0);
        editor.handle_pointer(up(120.0, 100.0), t0);
        assert!(editor.is_connecting());

        // Pressing on empty canvas keeps the gesture.
        editor.handle_pointer(down(200.0, 300.0), t0);
        editor.handle_pointer(up(200.0, 300.0), t0);
        assert!(editor.is_connecting());
        assert_eq!(editor.scene().len(), 2);

        editor.handle_pointer(down(276.0, 101.0), t0);
        assert!(!editor.is_connecting());
        assert_eq!(editor.overlay().edges().len(), 1);
    }

    #[test]
    fn test_escape_cancels_wire_without_touching_scene() {
        let t0 = Instant::now();
        let (mut editor, _, _) = editor_with_pair(t0);
        let before = editor.scene().clone();

        editor.handle_pointer(down(120.0, 100.0), t0);
        editor.handle_pointer(mv(200.0, 200.0), t0);
        let action = editor.handle_key(key("Escape", Modifiers::NONE), t0).unwrap();

        assert_eq!(action, Some(Action::CancelWire));
        assert!(!editor.is_connecting());
        assert!(editor.wiring().preview().is_none());
        assert!(editor.wiring().selection_enabled());
        assert_eq!(editor.scene(), &before);
    }

    #[test]
    fn test_drag_snaps_to_grid_and_throttles_overlay() {
        let t0 = Instant::now();
        let (mut editor, lamp, _) = editor_with_pair(t0);

        editor.handle_pointer(down(100.0, 100.0), t0);
        assert!(editor.is_selected(&lamp));
        assert!(!editor.is_connecting());

        editor.handle_pointer(mv(113.0, 104.0), t0);
        assert_eq!(editor.scene().get(&lamp).unwrap().position, Point::new(120.0, 100.0));
        // Overlay waits for the next frame.
        assert_eq!(editor.overlay().node(&lamp).unwrap().center, Point::new(100.0, 100.0));
        assert!(editor.animation_frame());
        assert_eq!(editor.overlay().node(&lamp).unwrap().center, Point::new(120.0, 100.0));

        editor.handle_pointer(mv(157.0, 131.0), t0);
        editor.handle_pointer(up(157.0, 131.0), t0 + ms(10));
        assert_eq!(editor.scene().get(&lamp).unwrap().position, Point::new(160.0, 140.0));
        assert_eq!(editor.overlay().node(&lamp).unwrap().center, Point::new(160.0, 140.0));
        assert!(editor.overlay().pending_frame().is_none());
        assert!(editor.history().is_pending());
    }

    #[test]
    fn test_grid_flag_read_at_event_time() {
        let t0 = Instant::now();
        let (mut editor, lamp, _) = editor_with_pair(t0);
        editor.handle_pointer(down(100.0, 100.0), t0);

        editor.flags.grid_enabled = false;
        editor.handle_pointer(mv(113.0, 104.0), t0);
        assert_eq!(editor.scene().get(&lamp).unwrap().position, Point::new(113.0, 104.0));

        editor.flags.grid_enabled = true;
        editor.handle_pointer(mv(114.0, 104.0), t0);
        assert_eq!(editor.scene().get(&lamp).unwrap().position, Point::new(120.0, 100.0));
    }

    #[test]
    fn test_rotate_and_scale_snap() {
        let t0 = Instant::now();
        let (mut editor, lamp, _) = editor_with_pair(t0);
        editor.select(lamp.clone());

        editor.transform_selected(Transform::Rotate(20.0));
        assert_eq!(editor.scene().get(&lamp).unwrap().rotation, 15.0);
        editor.transform_selected(Transform::Rotate(25.0));
        assert_eq!(editor.scene().get(&lamp).unwrap().rotation, 30.0);
        assert!(editor.finish_transform(t0));

        editor.transform_selected(Transform::Scale(1.6, 1.0));
        let size = editor.scene().get(&lamp).unwrap().scaled_size();
        assert!((size.width - 60.0).abs() < 1e-9);
        assert!(editor.finish_transform(t0));
        assert!(!editor.finish_transform(t0));
    }

    #[test]
    fn test_finish_transform_reroutes_wires() {
        let t0 = Instant::now();
        let (mut editor, lamp, _) = editor_with_pair(t0);
        editor.handle_pointer(down(122.0, 100.0), t0);
        editor.handle_pointer(down(275.0, 100.0), t0);
        let wire_id = editor.overlay().edges()[0].id.clone();

        editor.select(lamp);
        editor.transform_selected(Transform::Move(Vec2::new(0.0, 100.0)));
        editor.finish_transform(t0);

        let wire = editor.scene().get(&wire_id).unwrap().as_wire().unwrap();
        assert_eq!(wire.points[0], Point::new(120.0, 200.0));
        assert_eq!(*wire.points.last().unwrap(), Point::new(275.0, 100.0));
        assert!(is_orthogonal(&wire.points));
    }

    #[test]
    fn test_commit_waits_for_gesture_to_finish() {
        let t0 = Instant::now();
        let mut editor = Editor::default();
        let lamp = editor.place_symbol(SymbolKind::Lamp, Point::new(100.0, 100.0), t0);

        // The placement is recorded before the drag moves anything.
        editor.handle_pointer(down(100.0, 100.0), t0);
        assert_eq!(editor.history().len(), 2);

        editor.handle_pointer(mv(160.0, 100.0), t0 + ms(50));
        assert!(!editor.tick(t0 + ms(250)).unwrap());
        editor.handle_pointer(mv(200.0, 100.0), t0 + ms(300));
        editor.handle_pointer(up(200.0, 100.0), t0 + ms(300));
        assert!(editor.tick(t0 + ms(500)).unwrap());
        assert_eq!(editor.history().len(), 3);

        assert!(editor.undo().unwrap());
        assert_eq!(editor.scene().get(&lamp).unwrap().position, Point::new(100.0, 100.0));
        assert!(editor.redo().unwrap());
        assert_eq!(editor.scene().get(&lamp).unwrap().position, Point::new(200.0, 100.0));
    }

    #[test]
    fn test_dragged_wire_stays_on_terminals() {
        let t0 = Instant::now();
        let (mut editor, _, _) = editor_with_pair(t0);
        editor.handle_pointer(down(122.0, 100.0), t0);
        editor.handle_pointer(down(275.0, 100.0), t0);
        let wire_id = editor.overlay().edges()[0].id.clone();

        editor.select(wire_id.clone());
        editor.transform_selected(Transform::Move(Vec2::new(0.0, 40.0)));
        assert!(editor.finish_transform(t0));

        let points = editor.scene().get(&wire_id).unwrap().as_wire().unwrap().points.clone();
        assert_eq!(points[0], Point::new(120.0, 100.0));
        assert_eq!(*points.last().unwrap(), Point::new(275.0, 100.0));
        let exported = editor.export_wires();
        assert_eq!(exported[0].path, points);
    }

    #[test]
    fn test_select_all_shortcut() {
        let t0 = Instant::now();
        let (mut editor, _, _) = editor_with_pair(t0);
        let action = editor.handle_key(key("a", Modifiers::COMMAND), t0).unwrap();
        assert_eq!(action, Some(Action::SelectAll));
        assert_eq!(editor.selection().len(), 2);
    }

    #[test]
    fn test_delete_cascades_and_undo_restores() {
        let t0 = Instant::now();
        let (mut editor, lamp, resistor) = editor_with_pair(t0);
        editor.handle_pointer(down(122.0, 100.0), t0);
        editor.handle_pointer(down(275.0, 100.0), t0);
        editor.tick(t0 + ms(200)).unwrap();
        assert_eq!(editor.scene().len(), 3);

        editor.select(lamp.clone());
        let action = editor.handle_key(key("Delete", Modifiers::NONE), t0 + ms(300)).unwrap();
        assert_eq!(action, Some(Action::Delete));
        assert_eq!(editor.scene().len(), 1);
        assert!(editor.scene().contains(&resistor));
        assert!(editor.overlay().edges().is_empty());

        let t1 = t0 + ms(400);
        editor.handle_key(key("z", Modifiers::COMMAND), t1).unwrap();
        assert_eq!(editor.scene().len(), 3);
        assert_eq!(editor.overlay().edges().len(), 1);
        // The restoration does not record itself.
        assert!(!editor.history().is_pending());

        editor.handle_key(key("Z", Modifiers::COMMAND.with_shift()), t1).unwrap();
        assert_eq!(editor.scene().len(), 1);
    }

    #[test]
    fn test_undo_at_bounds_is_noop() {
        let t0 = Instant::now();
        let mut editor = Editor::default();
        assert!(!editor.undo().unwrap());
        assert!(!editor.redo().unwrap());
        assert!(editor.scene().is_empty());
    }

    #[test]
    fn test_copy_paste_shortcuts() {
        let t0 = Instant::now();
        let (mut editor, lamp, _) = editor_with_pair(t0);
        editor.select(lamp.clone());

        editor.handle_key(key("c", Modifiers::COMMAND), t0).unwrap();
        editor.handle_key(key("v", Modifiers::COMMAND), t0).unwrap();
        assert_eq!(editor.scene().len(), 3);

        let pasted = editor.selection()[0].clone();
        assert_ne!(pasted, lamp);
        assert_eq!(editor.scene().get(&pasted).unwrap().position, Point::new(120.0, 120.0));
        assert_eq!(editor.overlay().nodes().len(), 3);

        editor.handle_key(key("d", Modifiers::COMMAND), t0).unwrap();
        assert_eq!(editor.scene().len(), 4);
        let duplicated = &editor.selection()[0];
        assert_eq!(editor.scene().get(duplicated).unwrap().position, Point::new(140.0, 140.0));
    }

    #[test]
    fn test_paste_with_empty_clipboard() {
        let t0 = Instant::now();
        let mut editor = Editor::default();
        assert!(editor.paste(t0).is_empty());
        assert!(!editor.history().is_pending());
    }

    #[test]
    fn test_text_focus_suppresses_shortcuts() {
        let t0 = Instant::now();
        let (mut editor, lamp, _) = editor_with_pair(t0);
        editor.select(lamp);
        editor.flags.text_input_focused = true;

        let action = editor.handle_key(key("Backspace", Modifiers::NONE), t0).unwrap();
        assert_eq!(action, None);
        assert_eq!(editor.scene().len(), 2);
    }

    #[test]
    fn test_clear_is_undoable() {
        let t0 = Instant::now();
        let (mut editor, _, _) = editor_with_pair(t0);
        editor.tick(t0 + ms(200)).unwrap();

        editor.clear(t0 + ms(300));
        assert!(editor.scene().is_empty());
        assert!(editor.overlay().nodes().is_empty());

        assert!(editor.undo().unwrap());
        assert_eq!(editor.scene().len(), 2);
    }

    #[test]
    fn test_load_scene_resets_history() {
        let t0 = Instant::now();
        let (editor, _, _) = editor_with_pair(t0);
        let scene = editor.scene().clone();

        let mut fresh = Editor::default();
        fresh.load_scene(scene).unwrap();
        assert_eq!(fresh.history().len(), 1);
        assert!(!fresh.undo().unwrap());
        assert_eq!(fresh.overlay().nodes().len(), 2);
    }

    #[test]
    fn test_export_flushes_pending_frame() {
        let t0 = Instant::now();
        let (mut editor, lamp, resistor) = editor_with_pair(t0);
        editor.add_object(
            SceneObject::wire(crate::scene::Wire::connected(
                vec![Point::new(120.0, 100.0), Point::new(275.0, 100.0)],
                Terminal::new(lamp.clone(), Side::Right),
                Terminal::new(resistor, Side::Left),
            )),
            t0,
        );
        editor.select(lamp);
        editor.transform_selected(Transform::Move(Vec2::new(0.0, 40.0)));

        let wires = editor.export_wires();
        assert_eq!(wires[0].source, Point::new(120.0, 140.0));
    }
}

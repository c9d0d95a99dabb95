//! Terminal resolution and the wire-drawing gesture.

use crate::routing::route;
use crate::scene::{ObjectId, Scene, SceneObject, Side, Terminal, Wire};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Radius of the highlight circle drawn over a hovered terminal.
pub const HIGHLIGHT_RADIUS: f64 = 6.0;

/// A terminal location derived from an object's bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPoint {
    pub point: Point,
    pub side: Side,
    pub owner: ObjectId,
}

impl ConnectionPoint {
    /// The symbolic reference stored on a committed wire.
    pub fn terminal(&self) -> Terminal {
        Terminal::new(self.owner.clone(), self.side)
    }
}

/// The four terminals of an object: top, bottom, left, right.
pub fn terminals(obj: &SceneObject) -> [ConnectionPoint; 4] {
    let bounds = obj.bounds();
    let center = bounds.center();
    Side::ALL.map(|side| {
        let point = match side {
            Side::Top => Point::new(center.x, bounds.y0),
            Side::Bottom => Point::new(center.x, bounds.y1),
            Side::Left => Point::new(bounds.x0, center.y),
            Side::Right => Point::new(bounds.x1, center.y),
        };
        ConnectionPoint {
            point,
            side,
            owner: obj.id.clone(),
        }
    })
}

/// Terminal of a specific side.
pub fn terminal_at(obj: &SceneObject, side: Side) -> ConnectionPoint {
    let [top, bottom, left, right] = terminals(obj);
    match side {
        Side::Top => top,
        Side::Bottom => bottom,
        Side::Left => left,
        Side::Right => right,
    }
}

/// Find the closest terminal within `radius` of `at`.
///
/// Objects are scanned in z-order; on equal distance the first one found wins.
pub fn nearest_connection_point(
    scene: &Scene,
    at: Point,
    exclude: Option<&ObjectId>,
    radius: f64,
) -> Option<ConnectionPoint> {
    let mut best: Option<(f64, ConnectionPoint)> = None;
    for obj in scene.connectable() {
        if exclude == Some(&obj.id) {
            continue;
        }
        for candidate in terminals(obj) {
            let dist = candidate.point.distance(at);
            if dist > radius {
                continue;
            }
            if best.as_ref().is_none_or(|(d, _)| dist < *d) {
                best = Some((dist, candidate));
            }
        }
    }
    best.map(|(_, point)| point)
}

/// Cursor shape requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Crosshair,
}

/// State of an in-progress connection gesture.
#[derive(Debug, Clone)]
pub struct WireDrawing {
    start: Option<ConnectionPoint>,
    highlight: Option<ConnectionPoint>,
    preview: Option<Vec<Point>>,
    cursor: CursorHint,
    selection_enabled: bool,
}

impl Default for WireDrawing {
    fn default() -> Self {
        Self::new()
    }
}

impl WireDrawing {
    pub fn new() -> Self {
        Self {
            start: None,
            highlight: None,
            preview: None,
            cursor: CursorHint::Default,
            selection_enabled: true,
        }
    }

    /// Whether a connection has been started.
    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }

    pub fn start(&self) -> Option<&ConnectionPoint> {
        self.start.as_ref()
    }

    pub fn highlight(&self) -> Option<&ConnectionPoint> {
        self.highlight.as_ref()
    }

    /// Centre and radius of the highlight circle, if one is shown.
    pub fn highlight_circle(&self) -> Option<(Point, f64)> {
        self.highlight.as_ref().map(|h| (h.point, HIGHLIGHT_RADIUS))
    }

    /// Preview polyline from the start terminal to the pointer.
    pub fn preview(&self) -> Option<&[Point]> {
        self.preview.as_deref()
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    /// Whether ordinary object selection is allowed.
    pub fn selection_enabled(&self) -> bool {
        self.selection_enabled
    }

    /// Pointer moved while idle: highlight a terminal under the pointer.
    pub fn hover(&mut self, scene: &Scene, at: Point, radius: f64) {
        self.highlight = nearest_connection_point(scene, at, None, radius);
        self.cursor = if self.highlight.is_some() {
            CursorHint::Crosshair
        } else {
            CursorHint::Default
        };
    }

    /// Drop any hover highlight without touching an active gesture.
    pub fn clear_highlight(&mut self) {
        self.highlight = None;
        self.cursor = CursorHint::Default;
    }

    /// Start a connection at `point`.
    pub fn begin(&mut self, point: ConnectionPoint) {
        log::debug!("Wire started at {} {}", point.owner, point.side.as_str());
        self.preview = Some(vec![point.point, point.point]);
        self.start = Some(point);
        self.highlight = None;
        self.cursor = CursorHint::Crosshair;
        self.selection_enabled = false;
    }

    /// Pointer moved while connecting: refresh the highlight and preview.
    pub fn update(&mut self, scene: &Scene, at: Point, radius: f64) {
        let Some(start) = &self.start else {
            return;
        };
        let near = nearest_connection_point(scene, at, Some(&start.owner), radius);
        let end = near.as_ref().map_or(at, |n| n.point);
        self.preview = Some(route(start, end));
        self.cursor = if near.is_some() {
            CursorHint::Crosshair
        } else {
            CursorHint::Default
        };
        self.highlight = near;
    }

    /// Try to complete the connection at `at`.
    ///
    /// Returns the committed wire when `at` is near another object's terminal
    /// and resets the gesture. Otherwise the gesture continues.
    pub fn finish(&mut self, scene: &Scene, at: Point, radius: f64) -> Option<Wire> {
        let start = self.start.as_ref()?;
        let end = nearest_connection_point(scene, at, Some(&start.owner), radius)?;
        let wire = Wire::connected(route(start, end.point), start.terminal(), end.terminal());
        log::debug!(
            "Wire committed {} {} -> {} {}",
            start.owner,
            start.side.as_str(),
            end.owner,
            end.side.as_str()
        );
        self.reset();
        Some(wire)
    }

    /// Abandon the gesture and restore normal selection.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ObjectKind, Primitive};
    use crate::symbols::{BuiltinSymbols, SymbolFactory, SymbolKind};

    /// Lamp centred at (100, 100) and resistor centred at (300, 100).
    fn lamp_and_resistor() -> (Scene, ObjectId, ObjectId) {
        let mut scene = Scene::new();
        let lamp = scene.add(BuiltinSymbols.create(SymbolKind::Lamp, Point::new(100.0, 100.0)));
        let resistor = scene.add(BuiltinSymbols.create(SymbolKind::Resistor, Point::new(300.0, 100.0)));
        (scene, lamp, resistor)
    }

    #[test]
    fn test_terminal_formula() {
        let obj = SceneObject::new(ObjectKind::Shape(Primitive::Rectangle), Point::new(50.0, 40.0), 100.0, 60.0);
        let [top, bottom, left, right] = terminals(&obj);
        assert_eq!((top.point, top.side), (Point::new(50.0, 10.0), Side::Top));
        assert_eq!((bottom.point, bottom.side), (Point::new(50.0, 70.0), Side::Bottom));
        assert_eq!((left.point, left.side), (Point::new(0.0, 40.0), Side::Left));
        assert_eq!((right.point, right.side), (Point::new(100.0, 40.0), Side::Right));
    }

    #[test]
    fn test_terminals_follow_scale() {
        let mut obj = SceneObject::new(ObjectKind::Shape(Primitive::Rectangle), Point::ZERO, 20.0, 20.0);
        obj.scale_x = 2.0;
        assert_eq!(terminal_at(&obj, Side::Right).point, Point::new(20.0, 0.0));
    }

    #[test]
    fn test_nearest_out_of_range() {
        let (scene, _, _) = lamp_and_resistor();
        // The lamp's right terminal (120, 100) is 20 away.
        assert!(nearest_connection_point(&scene, Point::new(140.0, 100.0), None, 15.0).is_none());
    }

    #[test]
    fn test_nearest_in_range() {
        let (scene, lamp, _) = lamp_and_resistor();
        let hit = nearest_connection_point(&scene, Point::new(125.0, 100.0), None, 15.0).unwrap();
        assert_eq!(hit.owner, lamp);
        assert_eq!(hit.side, Side::Right);
        assert_eq!(hit.point, Point::new(120.0, 100.0));
    }

    #[test]
    fn test_nearest_boundary_is_inclusive() {
        let (scene, lamp, _) = lamp_and_resistor();
        let hit = nearest_connection_point(&scene, Point::new(135.0, 100.0), None, 15.0).unwrap();
        assert_eq!(hit.owner, lamp);
    }

    #[test]
    fn test_nearest_respects_exclude() {
        let (scene, lamp, _) = lamp_and_resistor();
        assert!(nearest_connection_point(&scene, Point::new(125.0, 100.0), Some(&lamp), 15.0).is_none());
    }

    #[test]
    fn test_nearest_tie_first_found_wins() {
        let mut scene = Scene::new();
        // Two squares whose left/right terminals coincide at (20, 0).
        let first = scene.add(SceneObject::new(ObjectKind::Shape(Primitive::Rectangle), Point::new(0.0, 0.0), 40.0, 40.0));
        scene.add(SceneObject::new(ObjectKind::Shape(Primitive::Rectangle), Point::new(40.0, 0.0), 40.0, 40.0));
        let hit = nearest_connection_point(&scene, Point::new(20.0, 5.0), None, 15.0).unwrap();
        assert_eq!(hit.owner, first);
    }

    #[test]
    fn test_nearest_skips_markers_and_wires() {
        let mut scene = Scene::new();
        scene.add(SceneObject::new(ObjectKind::Shape(Primitive::Circle), Point::ZERO, 12.0, 12.0));
        scene.add(SceneObject::wire(Wire::new(vec![Point::new(-10.0, 0.0), Point::new(10.0, 0.0)])));
        assert!(nearest_connection_point(&scene, Point::ZERO, None, 15.0).is_none());
    }

    #[test]
    fn test_gesture_commit() {
        let (scene, lamp, resistor) = lamp_and_resistor();
        let mut drawing = WireDrawing::new();
        let start = nearest_connection_point(&scene, Point::new(122.0, 100.0), None, 15.0).unwrap();
        drawing.begin(start);
        assert!(drawing.is_active());
        assert!(!drawing.selection_enabled());

        drawing.update(&scene, Point::new(200.0, 150.0), 15.0);
        assert_eq!(drawing.preview().unwrap().len(), 4);
        assert!(drawing.highlight().is_none());

        drawing.update(&scene, Point::new(273.0, 100.0), 15.0);
        assert_eq!(drawing.highlight().unwrap().owner, resistor);
        assert_eq!(drawing.cursor(), CursorHint::Crosshair);

        let wire = drawing.finish(&scene, Point::new(273.0, 100.0), 15.0).unwrap();
        assert_eq!(wire.source, Some(Terminal::new(lamp, Side::Right)));
        assert_eq!(wire.target, Some(Terminal::new(resistor, Side::Left)));
        assert_eq!(wire.points.first(), Some(&Point::new(120.0, 100.0)));
        assert_eq!(wire.points.last(), Some(&Point::new(275.0, 100.0)));
        assert!(crate::routing::is_orthogonal(&wire.points));

        assert!(!drawing.is_active());
        assert!(drawing.selection_enabled());
        assert_eq!(drawing.cursor(), CursorHint::Default);
    }

    #[test]
    fn test_finish_elsewhere_keeps_gesture() {
        let (scene, _, _) = lamp_and_resistor();
        let mut drawing = WireDrawing::new();
        drawing.begin(nearest_connection_point(&scene, Point::new(120.0, 100.0), None, 15.0).unwrap());

        assert!(drawing.finish(&scene, Point::new(200.0, 300.0), 15.0).is_none());
        assert!(drawing.is_active());

        // Releasing on the start object's own terminal does not connect.
        assert!(drawing.finish(&scene, Point::new(100.0, 80.0), 15.0).is_none());
        assert!(drawing.is_active());
    }

    #[test]
    fn test_reset_clears_everything() {
        let (scene, _, _) = lamp_and_resistor();
        let mut drawing = WireDrawing::new();
        drawing.begin(nearest_connection_point(&scene, Point::new(120.0, 100.0), None, 15.0).unwrap());
        drawing.update(&scene, Point::new(276.0, 100.0), 15.0);
        drawing.reset();

        assert!(!drawing.is_active());
        assert!(drawing.preview().is_none());
        assert!(drawing.highlight_circle().is_none());
        assert!(drawing.selection_enabled());
    }

    #[test]
    fn test_hover_sets_cursor() {
        let (scene, _, _) = lamp_and_resistor();
        let mut drawing = WireDrawing::new();
        drawing.hover(&scene, Point::new(100.0, 82.0), 15.0);
        assert_eq!(drawing.cursor(), CursorHint::Crosshair);
        assert_eq!(drawing.highlight_circle(), Some((Point::new(100.0, 80.0), HIGHLIGHT_RADIUS)));

        drawing.hover(&scene, Point::new(200.0, 200.0), 15.0);
        assert_eq!(drawing.cursor(), CursorHint::Default);
    }
}

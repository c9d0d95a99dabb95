//! Scene object model: the authoritative set of placed objects.

use crate::symbols::Symbol;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Circles at or below this radius are UI markers, never connection targets.
pub const MARKER_RADIUS_MAX: f64 = 6.0;

/// Errors raised by the scene model.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
}

/// Stable identity of a scene object.
///
/// Assigned once at creation and never reused. This is the join key between
/// the scene and the overlay graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Generate a fresh id with a readable prefix, e.g. `lamp-3f2a...`.
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{}-{}", prefix, Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the four cardinal sides of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// Fixed scan order used when enumerating terminals.
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    /// Whether a wire leaving this side starts out horizontally.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Symbolic reference to one terminal of an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Terminal {
    pub object: ObjectId,
    pub side: Side,
}

impl Terminal {
    pub fn new(object: ObjectId, side: Side) -> Self {
        Self { object, side }
    }
}

/// Basic drawing primitives placed with the shape tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Rectangle,
    Ellipse,
    Circle,
    Text { content: String, font_size: f64 },
}

/// A committed connector polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    /// Vertices in world coordinates (at least two).
    pub points: Vec<Point>,
    /// Terminal the wire was drawn from.
    #[serde(default)]
    pub source: Option<Terminal>,
    /// Terminal the wire was drawn to.
    #[serde(default)]
    pub target: Option<Terminal>,
}

impl Wire {
    /// A free polyline with no terminal references.
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            source: None,
            target: None,
        }
    }

    /// A wire anchored to two terminals.
    pub fn connected(points: Vec<Point>, source: Terminal, target: Terminal) -> Self {
        Self {
            points,
            source: Some(source),
            target: Some(target),
        }
    }

    /// Whether both ends reference an object terminal.
    pub fn is_connected(&self) -> bool {
        self.source.is_some() && self.target.is_some()
    }

    /// Whether either end references `id`.
    pub fn touches(&self, id: &ObjectId) -> bool {
        self.source.as_ref().is_some_and(|t| &t.object == id)
            || self.target.as_ref().is_some_and(|t| &t.object == id)
    }

    fn bounds(&self) -> Rect {
        let mut iter = self.points.iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        iter.fold(Rect::from_points(*first, *first), |acc, p| {
            acc.union_pt(*p)
        })
    }
}

/// What a scene object is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectKind {
    Shape(Primitive),
    Symbol(Symbol),
    Wire(Wire),
}

impl ObjectKind {
    /// Prefix used when generating ids for this kind.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ObjectKind::Shape(Primitive::Rectangle) => "rect",
            ObjectKind::Shape(Primitive::Ellipse) => "ellipse",
            ObjectKind::Shape(Primitive::Circle) => "circle",
            ObjectKind::Shape(Primitive::Text { .. }) => "text",
            ObjectKind::Symbol(symbol) => symbol.kind.id(),
            ObjectKind::Wire(_) => "wire",
        }
    }
}

fn default_scale() -> f64 {
    1.0
}

/// A placed, mutable object on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    /// Centre of the object in world coordinates.
    pub position: Point,
    /// Unscaled width.
    pub width: f64,
    /// Unscaled height.
    pub height: f64,
    /// Rotation in degrees around the centre.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_scale")]
    pub scale_x: f64,
    #[serde(default = "default_scale")]
    pub scale_y: f64,
}

impl SceneObject {
    /// Create an object centred at `position` with the given base size.
    pub fn new(kind: ObjectKind, position: Point, width: f64, height: f64) -> Self {
        let id = ObjectId::generate(kind.id_prefix());
        Self {
            id,
            kind,
            position,
            width,
            height,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Create a wire object; its position and size follow its vertices.
    pub fn wire(wire: Wire) -> Self {
        let bounds = wire.bounds();
        Self::new(
            ObjectKind::Wire(wire),
            bounds.center(),
            bounds.width(),
            bounds.height(),
        )
    }

    /// Replace a wire's vertices, keeping position and size in step.
    pub fn set_wire_points(&mut self, points: Vec<Point>) {
        let ObjectKind::Wire(wire) = &mut self.kind else {
            return;
        };
        wire.points = points;
        let bounds = wire.bounds();
        self.position = bounds.center();
        self.width = bounds.width();
        self.height = bounds.height();
    }

    /// Replace the generated id (demo fixtures, loaded documents).
    pub fn with_id(mut self, id: impl Into<ObjectId>) -> Self {
        self.id = id.into();
        self
    }

    /// Assign a fresh id, used when pasting clones.
    pub fn regenerate_id(&mut self) {
        self.id = ObjectId::generate(self.kind.id_prefix());
    }

    pub fn is_wire(&self) -> bool {
        matches!(self.kind, ObjectKind::Wire(_))
    }

    pub fn as_wire(&self) -> Option<&Wire> {
        match &self.kind {
            ObjectKind::Wire(wire) => Some(wire),
            _ => None,
        }
    }

    pub fn as_wire_mut(&mut self) -> Option<&mut Wire> {
        match &mut self.kind {
            ObjectKind::Wire(wire) => Some(wire),
            _ => None,
        }
    }

    /// Small highlight circles drawn by the UI.
    pub fn is_marker(&self) -> bool {
        matches!(self.kind, ObjectKind::Shape(Primitive::Circle))
            && self.scaled_size().width / 2.0 <= MARKER_RADIUS_MAX
    }

    /// Whether wires can attach to this object.
    pub fn is_connectable(&self) -> bool {
        !self.is_wire() && !self.is_marker()
    }

    /// Wires are only translated, never rotated or scaled.
    pub fn supports_transform(&self) -> bool {
        !self.is_wire()
    }

    /// Size after applying scale factors.
    pub fn scaled_size(&self) -> Size {
        Size::new(self.width * self.scale_x, self.height * self.scale_y)
    }

    /// Axis-aligned bounding box, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        if let ObjectKind::Wire(wire) = &self.kind {
            return wire.bounds();
        }
        Rect::from_center_size(self.position, self.scaled_size())
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Move the object by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
        if let ObjectKind::Wire(wire) = &mut self.kind {
            for p in &mut wire.points {
                *p += delta;
            }
        }
    }

    /// Move the object so its centre lands on `center`.
    pub fn set_center(&mut self, center: Point) {
        let delta = center - self.center();
        self.translate(delta);
    }

    /// Check if a point (in world coordinates) hits this object.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match &self.kind {
            ObjectKind::Wire(wire) => point_to_polyline_dist(point, &wire.points) <= tolerance,
            _ => self.bounds().inflate(tolerance, tolerance).contains(point),
        }
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}

/// Minimum distance from a point to a polyline.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// The whole set of placed objects, back to front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Unique document identifier.
    pub id: String,
    /// Document title.
    pub name: String,
    /// Objects in z-order (back to front).
    objects: Vec<SceneObject>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            objects: Vec::new(),
        }
    }

    /// Add an object on top. Returns its id.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id.clone();
        self.objects.push(object);
        id
    }

    /// Remove an object.
    pub fn remove(&mut self, id: &ObjectId) -> Option<SceneObject> {
        let index = self.objects.iter().position(|o| &o.id == id)?;
        Some(self.objects.remove(index))
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn get(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| &o.id == id)
    }

    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| &o.id == id)
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.get(id).is_some()
    }

    /// Objects in z-order (back to front).
    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    /// Objects wires can attach to, in z-order.
    pub fn connectable(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|o| o.is_connectable())
    }

    /// Ids of wires attached to `id` by either end.
    pub fn wires_attached_to(&self, id: &ObjectId) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| o.as_wire().is_some_and(|w| w.touches(id)))
            .map(|o| o.id.clone())
            .collect()
    }

    /// Find objects at a point, front to back.
    pub fn objects_at_point(&self, point: Point, tolerance: f64) -> Vec<ObjectId> {
        self.objects
            .iter()
            .rev()
            .filter(|o| !o.is_marker() && o.hit_test(point, tolerance))
            .map(|o| o.id.clone())
            .collect()
    }

    /// Bounding box of all objects.
    pub fn bounds(&self) -> Option<Rect> {
        self.objects
            .iter()
            .map(SceneObject::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Compact serialized form used for history entries.
    pub fn snapshot(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Replace the contents of this scene with a snapshot.
    pub fn restore(&mut self, snapshot: &str) -> Result<(), SceneError> {
        *self = serde_json::from_str(snapshot)?;
        Ok(())
    }

    /// Serialize the scene to pretty JSON for persistence.
    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a scene from JSON.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }
}

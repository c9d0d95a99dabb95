//! Graph projection of the scene used to anchor wires.
//!
//! Nodes mirror connectable objects, edges mirror wires whose both ends are
//! attached. The projection only flows one way: it is rebuilt wholesale from
//! the scene and never written back.

use crate::connection::ConnectionPoint;
use crate::routing::route;
use crate::scene::{ObjectId, Scene, Side};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Minimum node size used for handle placement.
pub const NODE_MIN_SIZE: f64 = 20.0;

/// One connectable object as seen by the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayNode {
    pub id: ObjectId,
    pub center: Point,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees.
    pub angle: f64,
}

impl OverlayNode {
    /// Position of the handle on `side`.
    pub fn handle(&self, side: Side) -> Point {
        let Point { x, y } = self.center;
        match side {
            Side::Top => Point::new(x, y - self.height / 2.0),
            Side::Bottom => Point::new(x, y + self.height / 2.0),
            Side::Left => Point::new(x - self.width / 2.0, y),
            Side::Right => Point::new(x + self.width / 2.0, y),
        }
    }
}

/// A wire between two node handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayEdge {
    /// Id of the wire object.
    pub id: ObjectId,
    pub source: ObjectId,
    pub source_side: Side,
    pub target: ObjectId,
    pub target_side: Side,
}

/// A wire with endpoints resolved against current node geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedWire {
    pub id: ObjectId,
    pub source: Point,
    pub target: Point,
    /// Orthogonal path from source to target.
    pub path: Vec<Point>,
}

/// Handle to a scheduled frame rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(u64);

/// The node/edge projection plus its frame scheduling state.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    nodes: Vec<OverlayNode>,
    edges: Vec<OverlayEdge>,
    pending: Option<FrameRequest>,
    next_request: u64,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild nodes and edges from the scene.
    pub fn rebuild(&mut self, scene: &Scene) {
        self.nodes = scene
            .connectable()
            .map(|obj| {
                let size = obj.scaled_size();
                OverlayNode {
                    id: obj.id.clone(),
                    center: obj.center(),
                    width: size.width.max(NODE_MIN_SIZE),
                    height: size.height.max(NODE_MIN_SIZE),
                    angle: obj.rotation,
                }
            })
            .collect();

        self.edges = scene
            .iter()
            .filter_map(|obj| {
                let wire = obj.as_wire()?;
                let (source, target) = (wire.source.as_ref()?, wire.target.as_ref()?);
                Some(OverlayEdge {
                    id: obj.id.clone(),
                    source: source.object.clone(),
                    source_side: source.side,
                    target: target.object.clone(),
                    target_side: target.side,
                })
            })
            .collect();

        log::debug!("Overlay rebuilt: {} nodes, {} edges", self.nodes.len(), self.edges.len());
    }

    /// Schedule a rebuild for the next animation frame, replacing any pending one.
    pub fn request_frame(&mut self) -> FrameRequest {
        self.next_request += 1;
        let request = FrameRequest(self.next_request);
        self.pending = Some(request);
        request
    }

    /// Drop the pending frame rebuild, if any.
    pub fn cancel_frame(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }

    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Animation frame callback. Returns whether a rebuild ran.
    pub fn on_animation_frame(&mut self, scene: &Scene) -> bool {
        if self.pending.take().is_none() {
            return false;
        }
        self.rebuild(scene);
        true
    }

    pub fn nodes(&self) -> &[OverlayNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[OverlayEdge] {
        &self.edges
    }

    pub fn node(&self, id: &ObjectId) -> Option<&OverlayNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Handle position for a node side, `None` when the node is unknown.
    pub fn handle_position(&self, id: &ObjectId, side: Side) -> Option<Point> {
        self.node(id).map(|node| node.handle(side))
    }

    /// Resolve every edge into absolute endpoints and a routed path.
    pub fn resolved_wires(&self) -> Vec<ResolvedWire> {
        self.edges
            .iter()
            .filter_map(|edge| {
                let source = self.handle_position(&edge.source, edge.source_side);
                let target = self.handle_position(&edge.target, edge.target_side);
                let (Some(source), Some(target)) = (source, target) else {
                    log::debug!("Dropping wire {}: endpoint object missing", edge.id);
                    return None;
                };
                let start = ConnectionPoint {
                    point: source,
                    side: edge.source_side,
                    owner: edge.source.clone(),
                };
                Some(ResolvedWire {
                    id: edge.id.clone(),
                    source,
                    target,
                    path: route(&start, target),
                })
            })
            .collect()
    }
}

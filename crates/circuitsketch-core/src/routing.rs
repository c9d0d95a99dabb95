//! Orthogonal wire routing.

use crate::connection::ConnectionPoint;
use kurbo::Point;

/// Route a wire from a terminal to an arbitrary end point.
///
/// The path leaves the terminal along its side's axis, turns once at the
/// midpoint of that axis, and turns again onto the end point. The result
/// always has four vertices and every segment is horizontal or vertical.
pub fn route(start: &ConnectionPoint, end: Point) -> Vec<Point> {
    let from = start.point;
    if start.side.is_horizontal() {
        let mid_x = (from.x + end.x) / 2.0;
        vec![from, Point::new(mid_x, from.y), Point::new(mid_x, end.y), end]
    } else {
        let mid_y = (from.y + end.y) / 2.0;
        vec![from, Point::new(from.x, mid_y), Point::new(end.x, mid_y), end]
    }
}

/// Whether every segment of the polyline is axis aligned.
pub fn is_orthogonal(points: &[Point]) -> bool {
    points
        .windows(2)
        .all(|w| w[0].x == w[1].x || w[0].y == w[1].y)
}

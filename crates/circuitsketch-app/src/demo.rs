//! Series circuit used to seed a new session.

use circuitsketch_core::connection::terminal_at;
use circuitsketch_core::{ObjectId, Scene, SceneObject, Side, SymbolFactory, SymbolKind, Wire, route};
use kurbo::Point;

/// A cell, a switch and two resistors wired in a loop.
pub fn demo_circuit(factory: &dyn SymbolFactory) -> Scene {
    let mut scene = Scene::new();
    scene.name = "Series circuit".to_string();

    let symbols = [
        ("source", SymbolKind::PowerSource, Point::new(300.0, 100.0)),
        ("switch", SymbolKind::Switch, Point::new(500.0, 100.0)),
        ("r1", SymbolKind::Resistor, Point::new(500.0, 320.0)),
        ("r2", SymbolKind::Resistor, Point::new(300.0, 320.0)),
    ];
    for (id, kind, at) in symbols {
        scene.add(factory.create(kind, at).with_id(id));
    }

    let wires = [
        ("e1", "source", Side::Right, "switch", Side::Left),
        ("e2", "switch", Side::Right, "r1", Side::Right),
        ("e3", "r1", Side::Left, "r2", Side::Right),
        ("e4", "r2", Side::Left, "source", Side::Left),
    ];
    for (id, from, from_side, to, to_side) in wires {
        let (Some(a), Some(b)) = (scene.get(&ObjectId::from(from)), scene.get(&ObjectId::from(to))) else {
            continue;
        };
        let start = terminal_at(a, from_side);
        let end = terminal_at(b, to_side);
        let wire = Wire::connected(route(&start, end.point), start.terminal(), end.terminal());
        scene.add(SceneObject::wire(wire).with_id(id));
    }

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use circuitsketch_core::routing::is_orthogonal;
    use circuitsketch_core::{BuiltinSymbols, Overlay};

    #[test]
    fn test_demo_circuit_shape() {
        let scene = demo_circuit(&BuiltinSymbols);
        assert_eq!(scene.connectable().count(), 4);
        assert_eq!(scene.iter().filter(|o| o.is_wire()).count(), 4);

        let mut overlay = Overlay::new();
        overlay.rebuild(&scene);
        assert_eq!(overlay.edges().len(), 4);

        let resolved = overlay.resolved_wires();
        assert_eq!(resolved.len(), 4);
        assert!(resolved.iter().all(|w| is_orthogonal(&w.path)));
    }

    #[test]
    fn test_demo_wires_match_terminals() {
        let scene = demo_circuit(&BuiltinSymbols);
        let e1 = scene.get(&ObjectId::from("e1")).unwrap().as_wire().unwrap();
        assert_eq!(e1.points.first(), Some(&Point::new(305.0, 100.0)));
        assert_eq!(e1.points.last(), Some(&Point::new(477.0, 100.0)));
    }
}

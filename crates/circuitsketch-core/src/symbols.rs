//! Circuit symbols and the factory that builds them.

use crate::scene::{ObjectKind, Primitive, SceneError, SceneObject};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The built-in circuit symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Lamp,
    Resistor,
    PowerSource,
    Switch,
    Ammeter,
    Voltmeter,
    Galvanometer,
}

impl SymbolKind {
    pub const ALL: [SymbolKind; 7] = [
        SymbolKind::Lamp,
        SymbolKind::Resistor,
        SymbolKind::PowerSource,
        SymbolKind::Switch,
        SymbolKind::Ammeter,
        SymbolKind::Voltmeter,
        SymbolKind::Galvanometer,
    ];

    /// Tool id as used by the symbol palette.
    pub fn id(self) -> &'static str {
        match self {
            SymbolKind::Lamp => "lamp",
            SymbolKind::Resistor => "resistor",
            SymbolKind::PowerSource => "source",
            SymbolKind::Switch => "switch",
            SymbolKind::Ammeter => "meter_a",
            SymbolKind::Voltmeter => "meter_v",
            SymbolKind::Galvanometer => "meter_g",
        }
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            SymbolKind::Lamp => "Lamp",
            SymbolKind::Resistor => "Resistor",
            SymbolKind::PowerSource => "Power source",
            SymbolKind::Switch => "Switch",
            SymbolKind::Ammeter => "Ammeter",
            SymbolKind::Voltmeter => "Voltmeter",
            SymbolKind::Galvanometer => "Galvanometer",
        }
    }

    /// Meter letter, if this is a meter.
    pub fn meter_label(self) -> Option<&'static str> {
        match self {
            SymbolKind::Ammeter => Some("A"),
            SymbolKind::Voltmeter => Some("V"),
            SymbolKind::Galvanometer => Some("G"),
            _ => None,
        }
    }

    /// Base (unscaled) width and height of the symbol group.
    pub fn base_size(self) -> (f64, f64) {
        match self {
            SymbolKind::Lamp
            | SymbolKind::Ammeter
            | SymbolKind::Voltmeter
            | SymbolKind::Galvanometer => (40.0, 40.0),
            SymbolKind::Resistor => (50.0, 20.0),
            SymbolKind::PowerSource => (10.0, 40.0),
            SymbolKind::Switch => (46.0, 18.0),
        }
    }

    /// Drawable sub-parts, relative to the symbol centre.
    pub fn parts(self) -> Vec<SymbolPart> {
        let line = |x1: f64, y1: f64, x2: f64, y2: f64| SymbolPart::Line {
            from: Point::new(x1, y1),
            to: Point::new(x2, y2),
        };
        let ring = SymbolPart::Circle {
            center: Point::ZERO,
            radius: 20.0,
            filled: false,
        };

        match self {
            SymbolKind::Lamp => vec![
                ring,
                line(-14.0, -14.0, 14.0, 14.0),
                line(14.0, -14.0, -14.0, 14.0),
            ],
            SymbolKind::Resistor => vec![SymbolPart::Rect {
                width: 50.0,
                height: 20.0,
            }],
            // Long plate is positive, short plate negative.
            SymbolKind::PowerSource => vec![line(5.0, -20.0, 5.0, 20.0), line(-5.0, -10.0, -5.0, 10.0)],
            SymbolKind::Switch => vec![
                SymbolPart::Circle {
                    center: Point::new(-20.0, 0.0),
                    radius: 3.0,
                    filled: true,
                },
                SymbolPart::Circle {
                    center: Point::new(20.0, 0.0),
                    radius: 3.0,
                    filled: true,
                },
                line(-20.0, 0.0, 15.0, -15.0),
            ],
            SymbolKind::Ammeter | SymbolKind::Voltmeter | SymbolKind::Galvanometer => vec![
                ring,
                SymbolPart::Label {
                    text: self.meter_label().unwrap_or_default().to_string(),
                    font_size: 24.0,
                },
            ],
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SymbolKind {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SymbolKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| SceneError::UnknownSymbol(s.to_string()))
    }
}

/// A drawable piece of a symbol, positioned relative to the symbol centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SymbolPart {
    Circle { center: Point, radius: f64, filled: bool },
    Line { from: Point, to: Point },
    Rect { width: f64, height: f64 },
    Label { text: String, font_size: f64 },
}

/// A grouped circuit symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub parts: Vec<SymbolPart>,
}

impl Symbol {
    pub fn new(kind: SymbolKind) -> Self {
        Self {
            kind,
            parts: kind.parts(),
        }
    }
}

/// Builds scene objects for circuit symbols.
pub trait SymbolFactory {
    /// Create a symbol centred at `at`.
    fn create(&self, kind: SymbolKind, at: Point) -> SceneObject;
}

/// The stock symbol set.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSymbols;

impl SymbolFactory for BuiltinSymbols {
    fn create(&self, kind: SymbolKind, at: Point) -> SceneObject {
        let (width, height) = kind.base_size();
        SceneObject::new(ObjectKind::Symbol(Symbol::new(kind)), at, width, height)
    }
}

/// Default text placed by the text tool.
pub const DEFAULT_TEXT: &str = "Text";
/// Default font size for the text tool.
pub const DEFAULT_FONT_SIZE: f64 = 20.0;

/// Create a basic primitive centred at `at` with its default size.
pub fn create_primitive(primitive: Primitive, at: Point) -> SceneObject {
    let (width, height) = match &primitive {
        // Circle radius 50.
        Primitive::Rectangle | Primitive::Ellipse | Primitive::Circle => (100.0, 100.0),
        Primitive::Text { content, font_size } => {
            // Rough box from character count; text metrics belong to the renderer.
            let chars = content.chars().count().max(1) as f64;
            (chars * font_size * 0.6, font_size * 1.2)
        }
    };
    SceneObject::new(ObjectKind::Shape(primitive), at, width, height)
}

/// Text primitive with the default content.
pub fn default_text() -> Primitive {
    Primitive::Text {
        content: DEFAULT_TEXT.to_string(),
        font_size: DEFAULT_FONT_SIZE,
    }
}

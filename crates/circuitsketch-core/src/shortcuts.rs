//! Keyboard shortcut registry.

use crate::input::Modifiers;

/// Editor command bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Delete,
    SelectAll,
    Copy,
    Paste,
    Duplicate,
    Undo,
    Redo,
    CancelWire,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    /// Requires Ctrl (or Cmd on macOS).
    pub command: bool,
    pub shift: bool,
    pub action: Action,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        command: bool,
        shift: bool,
        action: Action,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            command,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.command {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// Whether a key press triggers this shortcut.
    ///
    /// Plain keys ignore modifiers; command shortcuts need an exact Shift match.
    pub fn matches(&self, key: &str, modifiers: &Modifiers) -> bool {
        if !self.key.eq_ignore_ascii_case(key) {
            return false;
        }
        if !self.command {
            return true;
        }
        modifiers.command() && modifiers.shift == self.shift
    }
}

const SHORTCUTS: &[Shortcut] = &[
    Shortcut::new("Delete", false, false, Action::Delete, "Delete selected objects"),
    Shortcut::new("Backspace", false, false, Action::Delete, "Delete selected objects"),
    Shortcut::new("A", true, false, Action::SelectAll, "Select all objects"),
    Shortcut::new("C", true, false, Action::Copy, "Copy selection"),
    Shortcut::new("V", true, false, Action::Paste, "Paste"),
    Shortcut::new("D", true, false, Action::Duplicate, "Duplicate selection"),
    Shortcut::new("Z", true, false, Action::Undo, "Undo"),
    Shortcut::new("Z", true, true, Action::Redo, "Redo"),
    Shortcut::new("Escape", false, false, Action::CancelWire, "Cancel wire drawing"),
];

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    pub fn all() -> &'static [Shortcut] {
        SHORTCUTS
    }

    /// Look up the action for a key press.
    pub fn resolve(key: &str, modifiers: &Modifiers) -> Option<Action> {
        SHORTCUTS
            .iter()
            .find(|s| s.matches(key, modifiers))
            .map(|s| s.action)
    }
}

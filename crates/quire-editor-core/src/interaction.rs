//! Platform-agnostic interaction events.
//!
//! The browser layer converts native mouse, keyboard and focus events into
//! [`Interaction`] values before handing them to the editor controller.

use std::fmt;
use std::str::FromStr;

use smol_str::SmolStr;

use crate::host::Point;

/// DOM interaction kinds the editor controller re-dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    MouseDown,
    MouseUp,
    Click,
    KeyDown,
    KeyPress,
    KeyUp,
    Blur,
    Focus,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 8] = [
        Self::MouseDown,
        Self::MouseUp,
        Self::Click,
        Self::KeyDown,
        Self::KeyPress,
        Self::KeyUp,
        Self::Blur,
        Self::Focus,
    ];

    /// The DOM event name (`"mousedown"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::Click => "click",
            Self::KeyDown => "keydown",
            Self::KeyPress => "keypress",
            Self::KeyUp => "keyup",
            Self::Blur => "blur",
            Self::Focus => "focus",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or(())
    }
}

/// Key values for keyboard input.
///
/// Only the keys the editor reacts to get their own variant; everything else
/// that is not a printable character is [`Key::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(SmolStr),
    Enter,
    Backspace,
    Delete,
    /// Named non-character key (`"ArrowLeft"`, `"Shift"`, ...).
    Other(SmolStr),
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Convert a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Enter" => Self::Enter,
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            k if k.chars().count() == 1 => Self::Character(SmolStr::new(k)),
            k => Self::Other(SmolStr::new(k)),
        }
    }

    /// Check if this key removes content.
    pub fn is_deletion(&self) -> bool {
        matches!(self, Self::Backspace | Self::Delete)
    }
}

/// One interaction on an editable surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction<N> {
    pub kind: InteractionKind,
    /// Key for keyboard interactions.
    pub key: Option<Key>,
    pub shift: bool,
    /// Pointer position in page coordinates for mouse interactions.
    pub page: Option<Point>,
    /// Element the native event targeted.
    pub target: Option<N>,
}

impl<N> Interaction<N> {
    pub fn new(kind: InteractionKind) -> Self {
        Self {
            kind,
            key: None,
            shift: false,
            page: None,
            target: None,
        }
    }

    pub fn mouse(kind: InteractionKind, page: Point) -> Self {
        Self {
            page: Some(page),
            ..Self::new(kind)
        }
    }

    pub fn key(kind: InteractionKind, key: Key) -> Self {
        Self {
            key: Some(key),
            ..Self::new(kind)
        }
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_target(mut self, target: N) -> Self {
        self.target = Some(target);
        self
    }
}

/// What the platform layer must do with the native event afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionOutcome {
    pub prevent_default: bool,
}

impl InteractionOutcome {
    pub const PASS: Self = Self {
        prevent_default: false,
    };

    pub const PREVENT: Self = Self {
        prevent_default: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_dom() {
        assert_eq!(Key::from_dom("a"), Key::character("a"));
        assert_eq!(Key::from_dom("Enter"), Key::Enter);
        assert_eq!(Key::from_dom("ArrowLeft"), Key::Other("ArrowLeft".into()));
        assert!(Key::from_dom("Delete").is_deletion());
        assert!(!Key::from_dom("é").is_deletion());
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in InteractionKind::ALL {
            assert_eq!(kind.as_str().parse::<InteractionKind>(), Ok(kind));
        }
        assert!("scroll".parse::<InteractionKind>().is_err());
    }
}

//! Input event types.
//!
//! [`Event`] is what a host feeds into [`Gui::handle_event`](crate::Gui::handle_event),
//! in window pixel coordinates. Widgets never see it directly: the tree
//! converts it into calls of the [`Widget`](super::Widget) hooks with
//! widget-local positions and a [`KeyEvent`] for keyboard input.

use trellis_render::{Point, Size};

/// Keyboard modifiers that may be held during input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    pub shift: bool,
    /// Control (Cmd on macOS).
    pub control: bool,
    pub alt: bool,
    /// Windows / Super key.
    pub system: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        system: false,
    };

    /// Shift only.
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Control only.
    pub const CONTROL: Self = Self {
        control: true,
        ..Self::NONE
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.system
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Keys the widget layer reacts to.
///
/// Backends map their key codes onto this enum. Anything without a mapping
/// arrives as [`Key::Unknown`] and is dropped before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[rustfmt::skip]
pub enum Key {
    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits (main keyboard)
    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,

    // Navigation
    Left, Right, Up, Down,
    Home, End, PageUp, PageDown,

    // Editing
    Backspace, Delete, Insert,
    Enter, Tab, Space, Escape,

    Unknown,
}

impl Key {
    /// Check if this is a navigation key.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Key::Left
                | Key::Right
                | Key::Up
                | Key::Down
                | Key::Home
                | Key::End
                | Key::PageUp
                | Key::PageDown
        )
    }

    /// Keys that activate a focused button.
    pub fn is_activation(&self) -> bool {
        matches!(self, Key::Space | Key::Enter)
    }
}

/// A key press as seen by widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: KeyboardModifiers,
}

impl KeyEvent {
    /// A key press without modifiers.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: KeyboardModifiers::NONE,
        }
    }

    /// Set modifiers using builder pattern.
    pub fn with_modifiers(mut self, modifiers: KeyboardModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        Self::new(key)
    }
}

/// A raw input event from the windowing backend.
///
/// Positions are in window pixels; the [`Gui`](crate::Gui) maps them into
/// its view before dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    MouseMoved {
        position: Point,
    },
    MouseButtonPressed {
        button: MouseButton,
        position: Point,
    },
    MouseButtonReleased {
        button: MouseButton,
        position: Point,
    },
    /// Vertical wheel movement; positive is away from the user.
    MouseWheelScrolled {
        delta: f32,
        position: Point,
    },
    KeyPressed(KeyEvent),
    TextEntered(char),
    /// The window lost keyboard focus.
    LostFocus,
    /// The window regained keyboard focus.
    GainedFocus,
    /// The mouse left the window.
    MouseLeft,
    /// The window was resized to the given pixel size.
    Resized(Size),
    /// A finger touched the screen. Only the first finger is mapped onto
    /// the left mouse button.
    TouchBegan {
        finger: u32,
        position: Point,
    },
    TouchMoved {
        finger: u32,
        position: Point,
    },
    TouchEnded {
        finger: u32,
        position: Point,
    },
}

impl Event {
    /// Whether this event moves, presses or scrolls the mouse.
    pub fn is_mouse_event(&self) -> bool {
        matches!(
            self,
            Event::MouseMoved { .. }
                | Event::MouseButtonPressed { .. }
                | Event::MouseButtonReleased { .. }
                | Event::MouseWheelScrolled { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_constants() {
        assert!(!KeyboardModifiers::NONE.any());
        assert!(KeyboardModifiers::SHIFT.shift);
        assert!(!KeyboardModifiers::SHIFT.control);
        assert!(KeyboardModifiers::CONTROL.any());
    }

    #[test]
    fn test_key_classes() {
        assert!(Key::Home.is_navigation());
        assert!(!Key::A.is_navigation());
        assert!(Key::Space.is_activation());
        assert!(!Key::Tab.is_activation());
    }

    #[test]
    fn test_mouse_event_classification() {
        let moved = Event::MouseMoved {
            position: Point::new(1.0, 2.0),
        };
        assert!(moved.is_mouse_event());
        assert!(!Event::KeyPressed(Key::A.into()).is_mouse_event());
        assert!(!Event::LostFocus.is_mouse_event());
    }
}

//! Raw input model: modifier keys, mouse buttons and pointer events.
//!
//! These are the low-level events a host feeds into a [`Document`](crate::document::Document).
//! Sensors observe them through document listeners and never see the host's
//! native event objects. A `PointerEvent` is also carried verbatim inside every
//! gesture event as its `original_event`.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::consts::{BUTTON_MIDDLE, BUTTON_PRIMARY, BUTTON_SECONDARY};
use crate::document::ElementId;
use crate::geom::Point;

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Whether the press is qualified by a key the OS or browser reserves for
    /// its own shortcuts (ctrl or meta). Such presses never start a gesture.
    #[must_use]
    pub fn is_shortcut(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
///
/// Serialized as the numeric button code reported by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i16", into = "i16")]
pub enum Button {
    /// Left mouse button (or single-finger touch), code 0.
    #[default]
    Primary,
    /// Middle mouse button (scroll wheel click), code 1.
    Middle,
    /// Right mouse button, code 2.
    Secondary,
    /// Any other button (back, forward, pen barrel...).
    Other(i16),
}

impl Button {
    /// Map a platform button code to a `Button`.
    #[must_use]
    pub fn from_code(code: i16) -> Self {
        match code {
            BUTTON_PRIMARY => Self::Primary,
            BUTTON_MIDDLE => Self::Middle,
            BUTTON_SECONDARY => Self::Secondary,
            other => Self::Other(other),
        }
    }

    /// The platform button code.
    #[must_use]
    pub fn code(self) -> i16 {
        match self {
            Self::Primary => BUTTON_PRIMARY,
            Self::Middle => BUTTON_MIDDLE,
            Self::Secondary => BUTTON_SECONDARY,
            Self::Other(code) => code,
        }
    }
}

impl From<i16> for Button {
    fn from(code: i16) -> Self {
        Self::from_code(code)
    }
}

impl From<Button> for i16 {
    fn from(button: Button) -> Self {
        button.code()
    }
}

/// Which kind of raw input a [`PointerEvent`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEventKind {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
    /// The platform is about to begin its own native drag-and-drop.
    DragStart,
    /// The platform is about to open a context menu.
    ContextMenu,
}

impl PointerEventKind {
    /// Conventional DOM event name for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Down => "pointerdown",
            Self::Move => "pointermove",
            Self::Up => "pointerup",
            Self::DragStart => "dragstart",
            Self::ContextMenu => "contextmenu",
        }
    }
}

/// A single raw pointer event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    #[serde(default)]
    pub button: Button,
    /// Position relative to the viewport.
    pub client: Point,
    /// Position relative to the page (client plus scroll offset).
    pub page: Point,
    /// Element the platform delivered the event to. Filled by hit-testing on
    /// dispatch when absent.
    #[serde(default)]
    pub target: Option<ElementId>,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Milliseconds on a monotonic clock at which the event occurred.
    #[serde(default)]
    pub time_stamp: u64,
    #[serde(skip)]
    default_prevented: bool,
}

impl PointerEvent {
    /// Create an event at `client`, with `page` equal to `client`, primary
    /// button, no modifiers, no target and a zero timestamp.
    #[must_use]
    pub fn new(kind: PointerEventKind, client: Point) -> Self {
        Self {
            kind,
            button: Button::Primary,
            client,
            page: client,
            target: None,
            modifiers: Modifiers::default(),
            time_stamp: 0,
            default_prevented: false,
        }
    }

    #[must_use]
    pub fn down(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Down, Point::new(x, y))
    }

    #[must_use]
    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Move, Point::new(x, y))
    }

    #[must_use]
    pub fn up(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Up, Point::new(x, y))
    }

    #[must_use]
    pub fn with_button(mut self, button: Button) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: ElementId) -> Self {
        self.target = Some(target);
        self
    }

    /// Override the page position (for scrolled documents).
    #[must_use]
    pub fn with_page(mut self, page: Point) -> Self {
        self.page = page;
        self
    }

    /// Set the event timestamp in milliseconds.
    #[must_use]
    pub fn at(mut self, time_stamp: u64) -> Self {
        self.time_stamp = time_stamp;
        self
    }

    /// Whether this event was produced by the primary button.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.button == Button::Primary
    }

    /// Ask the host to skip its default handling of this event.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a listener called [`prevent_default`](Self::prevent_default).
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

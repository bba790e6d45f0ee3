//! Drag gesture events: the `Start`/`Move`/`Stop` family.
//!
//! All three phases share one field set ([`GestureData`]) and differ only in
//! their [`GestureKind`] tag. A [`GestureEvent`] is a
//! [`CancelableEvent`](crate::event::CancelableEvent) over that data; only a
//! canceled `Start` changes what the sensor does next.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::consts::{EVENT_TYPE_DRAG_MOVE, EVENT_TYPE_DRAG_START, EVENT_TYPE_DRAG_STOP};
use crate::document::ElementId;
use crate::event::{CancelableEvent, EventData, Payload};
use crate::geom::Point;
use crate::input::PointerEvent;

/// Phase of a drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureKind {
    #[serde(rename = "drag:start")]
    Start,
    #[serde(rename = "drag:move")]
    Move,
    #[serde(rename = "drag:stop")]
    Stop,
}

impl GestureKind {
    /// Type tag used on the wire and for listener registration.
    #[must_use]
    pub fn event_type(self) -> &'static str {
        match self {
            Self::Start => EVENT_TYPE_DRAG_START,
            Self::Move => EVENT_TYPE_DRAG_MOVE,
            Self::Stop => EVENT_TYPE_DRAG_STOP,
        }
    }

    /// Only `Start` can be vetoed.
    #[must_use]
    pub fn cancelable(self) -> bool {
        matches!(self, Self::Start)
    }

    /// Parse a type tag back into a kind.
    #[must_use]
    pub fn from_event_type(tag: &str) -> Option<Self> {
        match tag {
            EVENT_TYPE_DRAG_START => Some(Self::Start),
            EVENT_TYPE_DRAG_MOVE => Some(Self::Move),
            EVENT_TYPE_DRAG_STOP => Some(Self::Stop),
            _ => None,
        }
    }
}

/// Fields common to every gesture phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureData {
    #[serde(rename = "type")]
    pub kind: GestureKind,
    pub client_x: f64,
    pub client_y: f64,
    /// Element under the pointer. For `Start` this is the pointer-down target;
    /// for `Move`/`Stop` it is re-resolved by hit-testing, and may be `None`
    /// when the pointer is over empty space.
    pub target: Option<ElementId>,
    /// Element the sensor is attached to.
    pub container: ElementId,
    /// Raw input event that produced this phase.
    pub original_event: PointerEvent,
}

impl GestureData {
    /// Build gesture data positioned at `original_event`'s client coordinates.
    #[must_use]
    pub fn from_pointer(
        kind: GestureKind,
        original_event: &PointerEvent,
        target: Option<ElementId>,
        container: ElementId,
    ) -> Self {
        Self {
            kind,
            client_x: original_event.client.x,
            client_y: original_event.client.y,
            target,
            container,
            original_event: original_event.clone(),
        }
    }
}

/// Sparse replacement values for [`GestureData`]. Only present fields are
/// applied; the kind cannot be changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureOverrides {
    pub client_x: Option<f64>,
    pub client_y: Option<f64>,
    /// `Some(None)` clears the target.
    pub target: Option<Option<ElementId>>,
    pub container: Option<ElementId>,
    pub original_event: Option<PointerEvent>,
}

impl EventData for GestureData {
    type Overrides = GestureOverrides;

    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn cancelable(&self) -> bool {
        self.kind.cancelable()
    }

    fn merged(&self, overrides: GestureOverrides) -> Self {
        Self {
            kind: self.kind,
            client_x: overrides.client_x.unwrap_or(self.client_x),
            client_y: overrides.client_y.unwrap_or(self.client_y),
            target: overrides.target.unwrap_or(self.target),
            container: overrides.container.unwrap_or(self.container),
            original_event: overrides
                .original_event
                .unwrap_or_else(|| self.original_event.clone()),
        }
    }
}

/// A dispatched drag gesture phase.
pub type GestureEvent = CancelableEvent<GestureData>;

impl CancelableEvent<GestureData> {
    /// Shorthand for `GestureEvent::new(GestureData::from_pointer(..))`.
    #[must_use]
    pub fn from_pointer(
        kind: GestureKind,
        original_event: &PointerEvent,
        target: Option<ElementId>,
        container: ElementId,
    ) -> Self {
        Self::new(GestureData::from_pointer(kind, original_event, target, container))
    }

    #[must_use]
    pub fn kind(&self) -> GestureKind {
        self.data().kind
    }

    #[must_use]
    pub fn client_x(&self) -> f64 {
        self.data().client_x
    }

    #[must_use]
    pub fn client_y(&self) -> f64 {
        self.data().client_y
    }

    #[must_use]
    pub fn client_point(&self) -> Point {
        Point::new(self.data().client_x, self.data().client_y)
    }

    #[must_use]
    pub fn target(&self) -> Option<ElementId> {
        self.data().target
    }

    #[must_use]
    pub fn container(&self) -> ElementId {
        self.data().container
    }

    #[must_use]
    pub fn original_event(&self) -> &PointerEvent {
        &self.data().original_event
    }

    /// The event as handed to external listeners:
    /// `{ type, clientX, clientY, target, container, originalEvent, canceled }`.
    #[must_use]
    pub fn detail(&self) -> Value {
        let mut detail = Value::Object(self.to_payload());
        detail["canceled"] = Value::Bool(self.canceled());
        detail
    }

    /// The gesture fields flattened into an untyped payload, e.g. to cross
    /// into code that only understands [`PayloadEvent`](crate::event::PayloadEvent)s.
    #[must_use]
    pub fn to_payload(&self) -> Payload {
        let data = self.data();
        let value = json!({
            "type": data.kind.event_type(),
            "clientX": data.client_x,
            "clientY": data.client_y,
            "target": data.target,
            "container": data.container,
            "originalEvent": &data.original_event,
        });
        match value {
            Value::Object(map) => map,
            _ => Payload::new(),
        }
    }
}

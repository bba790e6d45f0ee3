//! The sensor contract and the state every sensor shares.
//!
//! A sensor watches raw input on a [`Document`] on behalf of one target
//! element and turns it into [`GestureEvent`]s triggered on that element.
//! Concrete sensors implement [`Sensor`] and keep their lifecycle state in a
//! [`SensorCore`].
//!
//! `SensorCore` uses interior mutability throughout: gesture listeners run
//! synchronously inside [`SensorCore::trigger`] and may query the sensor (or
//! detach it) while it is mid-transition, so no borrow is held across a
//! dispatch.

#[cfg(test)]
#[path = "sensor_test.rs"]
mod sensor_test;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::config::SensorOptions;
use crate::document::{Document, ElementId};
use crate::gesture::GestureEvent;
use crate::input::PointerEvent;

/// Lifecycle state shared by all sensors.
#[derive(Debug)]
pub struct SensorCore {
    document: Document,
    target: ElementId,
    options: SensorOptions,
    dragging: Cell<bool>,
    /// The pointer-down that seeded the live candidate or drag.
    start_event: RefCell<Option<PointerEvent>>,
    /// Most recently triggered gesture event, for diagnostics.
    last_event: RefCell<Option<GestureEvent>>,
    /// Mirrors `start_event.is_some()` for [`GestureProbe`]s.
    live: Rc<Cell<bool>>,
}

/// Read-only view of whether a sensor is tracking a press. Does not keep the
/// sensor alive: once the sensor is dropped the probe reports false.
#[derive(Debug, Clone)]
pub struct GestureProbe {
    live: Weak<Cell<bool>>,
}

impl GestureProbe {
    /// True while the sensor holds a start event: as a candidate, during
    /// `Start` dispatch and for the rest of the drag.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.upgrade().is_some_and(|live| live.get())
    }
}

impl SensorCore {
    /// Core state for a sensor watching `document` on behalf of `target`.
    /// `options` is copied; later changes to the caller's value don't apply.
    #[must_use]
    pub fn new(document: Document, target: ElementId, options: SensorOptions) -> Self {
        Self {
            document,
            target,
            options,
            dragging: Cell::new(false),
            start_event: RefCell::new(None),
            last_event: RefCell::new(None),
            live: Rc::new(Cell::new(false)),
        }
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn target(&self) -> ElementId {
        self.target
    }

    #[must_use]
    pub fn options(&self) -> SensorOptions {
        self.options
    }

    /// True only between a successful (uncanceled) `Start` and the `Stop`.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging.get()
    }

    pub(crate) fn set_dragging(&self, dragging: bool) {
        self.dragging.set(dragging);
    }

    #[must_use]
    pub fn start_event(&self) -> Option<PointerEvent> {
        self.start_event.borrow().clone()
    }

    /// Whether a press is being tracked, as a candidate or as a drag.
    #[must_use]
    pub fn has_start_event(&self) -> bool {
        self.start_event.borrow().is_some()
    }

    pub(crate) fn set_start_event(&self, event: Option<PointerEvent>) {
        self.live.set(event.is_some());
        *self.start_event.borrow_mut() = event;
    }

    /// A probe that follows this core's press tracking.
    #[must_use]
    pub fn probe(&self) -> GestureProbe {
        GestureProbe { live: Rc::downgrade(&self.live) }
    }

    #[must_use]
    pub fn last_event(&self) -> Option<GestureEvent> {
        self.last_event.borrow().clone()
    }

    /// Back to idle: not dragging, no start event.
    pub(crate) fn reset(&self) {
        self.dragging.set(false);
        self.set_start_event(None);
    }

    /// Dispatch `event` to the gesture listeners on `element`, remember it as
    /// the last event, and hand it back so the caller can see whether a
    /// listener canceled it.
    pub fn trigger(&self, element: ElementId, mut event: GestureEvent) -> GestureEvent {
        self.document.dispatch_gesture(element, &mut event);
        trace!(
            event_type = event.event_type(),
            %element,
            canceled = event.canceled(),
            "triggered"
        );
        *self.last_event.borrow_mut() = Some(event.clone());
        event
    }
}

/// Contract implemented by every input sensor.
///
/// `attach` is not guarded: attaching twice registers listeners twice. Pair
/// every `attach` with a `detach`.
pub trait Sensor {
    /// Shared lifecycle state.
    fn core(&self) -> &SensorCore;

    /// Start observing input.
    fn attach(&mut self) -> &mut Self
    where
        Self: Sized;

    /// Stop observing input, removing every listener `attach` added.
    fn detach(&mut self) -> &mut Self
    where
        Self: Sized;

    /// Synchronously dispatch `event` on `element`. See [`SensorCore::trigger`].
    fn trigger(&self, element: ElementId, event: GestureEvent) -> GestureEvent {
        self.core().trigger(element, event)
    }

    fn target(&self) -> ElementId {
        self.core().target()
    }

    fn options(&self) -> SensorOptions {
        self.core().options()
    }

    fn is_dragging(&self) -> bool {
        self.core().is_dragging()
    }

    fn last_event(&self) -> Option<GestureEvent> {
        self.core().last_event()
    }
}

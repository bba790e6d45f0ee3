//! Pointer sensor: turns raw pointer input into drag gestures.
//!
//! ```text
//! Idle ──primary down on target──▶ Candidate ──delay AND distance met──▶ Dragging
//!  ▲                                   │  │                                  │
//!  │                     primary up ◀──┘  └──▶ drag:start canceled ──┐       │
//!  └───────────────────────────────────────────────────────────────┴──◀── primary up (drag:stop)
//! ```
//!
//! The sensor keeps one capture-phase pointer-down listener while attached.
//! Everything else is a gesture-phase listener, added when a press begins and
//! removed when it ends:
//!
//! | Listener | Added | Removed |
//! |----------|-------|---------|
//! | pointer-up | candidate | primary up, veto |
//! | native drag-start suppression | candidate | primary up, veto |
//! | distance evaluation (move) | candidate | promotion, primary up, veto |
//! | drag motion (move) | dragging | after `drag:stop` |
//! | context-menu suppression | dragging | after `drag:stop` |
//!
//! Timing uses the events' own timestamps, so a press is only ever promoted by
//! a move sample, never by a timer.

#[cfg(test)]
#[path = "pointer_test.rs"]
mod pointer_test;

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::config::SensorOptions;
use crate::document::{Document, ElementId, ListenerId, Phase};
use crate::gesture::{GestureEvent, GestureKind};
use crate::input::{PointerEvent, PointerEventKind};
use crate::sensor::{Sensor, SensorCore};

/// Where the sensor is in the gesture lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorState {
    /// No press being tracked.
    Idle,
    /// Pressed, thresholds not yet met.
    Candidate,
    /// `drag:start` dispatched and not canceled.
    Dragging,
}

/// Gesture-phase listener slots.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Up,
    NativeDrag,
    Distance,
    Motion,
    ContextMenu,
}

const ALL_SLOTS: [Slot; 5] = [Slot::Up, Slot::NativeDrag, Slot::Distance, Slot::Motion, Slot::ContextMenu];

#[derive(Debug, Default)]
struct GestureListeners {
    up: Option<ListenerId>,
    native_drag: Option<ListenerId>,
    distance: Option<ListenerId>,
    motion: Option<ListenerId>,
    context_menu: Option<ListenerId>,
}

impl GestureListeners {
    fn slot(&mut self, slot: Slot) -> &mut Option<ListenerId> {
        match slot {
            Slot::Up => &mut self.up,
            Slot::NativeDrag => &mut self.native_drag,
            Slot::Distance => &mut self.distance,
            Slot::Motion => &mut self.motion,
            Slot::ContextMenu => &mut self.context_menu,
        }
    }
}

/// State reachable from document listeners. Listeners hold it weakly.
#[derive(Debug)]
struct PointerShared {
    core: SensorCore,
    listeners: RefCell<GestureListeners>,
}

/// Sensor that recognizes drags from primary-button pointer input.
///
/// Dropping the sensor detaches it.
#[derive(Debug)]
pub struct PointerSensor {
    shared: Rc<PointerShared>,
    /// One entry per `attach` call.
    down_listeners: Vec<ListenerId>,
}

impl PointerSensor {
    /// Create a detached sensor for `target`.
    #[must_use]
    pub fn new(document: Document, target: ElementId, options: SensorOptions) -> Self {
        Self {
            shared: Rc::new(PointerShared {
                core: SensorCore::new(document, target, options),
                listeners: RefCell::new(GestureListeners::default()),
            }),
            down_listeners: Vec::new(),
        }
    }

    /// Current lifecycle state, derived from the core's flags.
    #[must_use]
    pub fn state(&self) -> SensorState {
        let core = &self.shared.core;
        if core.is_dragging() {
            SensorState::Dragging
        } else if core.has_start_event() {
            SensorState::Candidate
        } else {
            SensorState::Idle
        }
    }

    /// Whether an `attach` is in effect.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        !self.down_listeners.is_empty()
    }
}

impl Sensor for PointerSensor {
    fn core(&self) -> &SensorCore {
        &self.shared.core
    }

    fn attach(&mut self) -> &mut Self {
        let id = self
            .shared
            .listen(PointerEventKind::Down, Phase::Capture, PointerShared::on_pointer_down);
        self.down_listeners.push(id);
        debug!(element = %self.shared.core.target(), "sensor attached");
        self
    }

    /// Removes the pointer-down listener(s) and, if a press is in flight,
    /// its gesture-phase listeners. An in-flight drag ends without `drag:stop`.
    fn detach(&mut self) -> &mut Self {
        let document = self.shared.core.document();
        for id in self.down_listeners.drain(..) {
            document.remove_event_listener(id);
        }
        self.shared.release_all();
        self.shared.core.reset();
        debug!(element = %self.shared.core.target(), "sensor detached");
        self
    }
}

impl Drop for PointerSensor {
    fn drop(&mut self) {
        self.detach();
    }
}

impl PointerShared {
    fn listen(
        self: &Rc<Self>,
        kind: PointerEventKind,
        phase: Phase,
        handler: fn(&Rc<Self>, &mut PointerEvent),
    ) -> ListenerId {
        let weak = Rc::downgrade(self);
        self.core.document().add_event_listener(kind, phase, move |event| {
            if let Some(shared) = weak.upgrade() {
                handler(&shared, event);
            }
        })
    }

    fn hold(&self, slot: Slot, id: ListenerId) {
        let previous = self.listeners.borrow_mut().slot(slot).replace(id);
        if let Some(previous) = previous {
            self.core.document().remove_event_listener(previous);
        }
    }

    fn release(&self, slot: Slot) {
        let id = self.listeners.borrow_mut().slot(slot).take();
        if let Some(id) = id {
            self.core.document().remove_event_listener(id);
        }
    }

    fn release_all(&self) {
        for slot in ALL_SLOTS {
            self.release(slot);
        }
    }

    fn on_pointer_down(self: &Rc<Self>, event: &mut PointerEvent) {
        if !event.is_primary() || event.modifiers.is_shortcut() {
            trace!(button = event.button.code(), "pointer-down ignored: not a plain primary press");
            return;
        }
        let Some(hit) = event.target else {
            return;
        };
        let document = self.core.document();
        if !document.contains(self.core.target(), hit) {
            return;
        }
        if self.core.has_start_event() {
            debug!("pointer-down ignored: gesture already in progress");
            return;
        }

        self.core.set_start_event(Some(event.clone()));
        self.hold(Slot::Up, self.listen(PointerEventKind::Up, Phase::Bubble, Self::on_pointer_up));
        self.hold(
            Slot::NativeDrag,
            document.add_event_listener(PointerEventKind::DragStart, Phase::Bubble, PointerEvent::prevent_default),
        );
        self.hold(
            Slot::Distance,
            self.listen(PointerEventKind::Move, Phase::Bubble, Self::on_distance_change),
        );
        debug!(
            element = %self.core.target(),
            x = event.client.x,
            y = event.client.y,
            "candidate gesture"
        );
    }

    /// Promotes the candidate once both the delay and distance thresholds hold
    /// for the same move sample.
    fn on_distance_change(self: &Rc<Self>, event: &mut PointerEvent) {
        let Some(start) = self.core.start_event() else {
            return;
        };
        let options = self.core.options();
        let elapsed = event.time_stamp.saturating_sub(start.time_stamp);
        let travelled = start.page.distance_to(event.page);
        if elapsed < options.delay || travelled < options.distance {
            trace!(elapsed, travelled, "thresholds not met");
            return;
        }
        self.release(Slot::Distance);
        self.start_drag(event);
    }

    fn start_drag(self: &Rc<Self>, current: &PointerEvent) {
        let Some(start) = self.core.start_event() else {
            return;
        };
        let container = self.core.target();
        let event = GestureEvent::from_pointer(GestureKind::Start, &start, start.target, container);
        let event = self.core.trigger(container, event);

        if !self.core.has_start_event() {
            // A listener detached the sensor during dispatch.
            return;
        }
        if event.canceled() {
            debug!(element = %container, "drag:start canceled, gesture abandoned");
            self.release_all();
            self.core.reset();
            return;
        }

        self.core.set_dragging(true);
        self.hold(
            Slot::ContextMenu,
            self.core.document().add_event_listener(
                PointerEventKind::ContextMenu,
                Phase::Capture,
                PointerEvent::prevent_default,
            ),
        );
        self.hold(Slot::Motion, self.listen(PointerEventKind::Move, Phase::Bubble, Self::on_pointer_move));
        debug!(element = %container, "drag started");

        // The promoting sample is also the first movement of the drag.
        self.emit_move(current);
    }

    fn on_pointer_move(self: &Rc<Self>, event: &mut PointerEvent) {
        if !self.core.is_dragging() {
            return;
        }
        self.emit_move(event);
    }

    fn emit_move(&self, event: &PointerEvent) {
        let container = self.core.target();
        let target = self.core.document().element_from_point(event.client);
        self.core
            .trigger(container, GestureEvent::from_pointer(GestureKind::Move, event, target, container));
    }

    fn on_pointer_up(self: &Rc<Self>, event: &mut PointerEvent) {
        if !event.is_primary() {
            trace!(button = event.button.code(), "pointer-up ignored: not the primary button");
            return;
        }
        self.release(Slot::Up);
        self.release(Slot::NativeDrag);
        self.release(Slot::Distance);

        if !self.core.is_dragging() {
            debug!("released before thresholds were met");
            self.core.reset();
            return;
        }

        let container = self.core.target();
        let target = self.core.document().element_from_point(event.client);
        self.core
            .trigger(container, GestureEvent::from_pointer(GestureKind::Stop, event, target, container));

        self.release(Slot::ContextMenu);
        self.release(Slot::Motion);
        self.core.reset();
        debug!(element = %container, "drag stopped");
    }
}

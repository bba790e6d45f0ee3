//! The document: element geometry, hit-testing and event listener registries.
//!
//! A [`Document`] stands in for the host page. It knows where each element
//! sits (for [`element_from_point`](Document::element_from_point)), keeps the
//! global raw-input listeners sensors register on it, and keeps the
//! per-element gesture listeners that receive triggered [`GestureEvent`]s.
//!
//! DISPATCH RULES
//! ==============
//! - Capture-phase listeners run before bubble-phase listeners; within a phase
//!   listeners run in registration order.
//! - A listener added while an event is being dispatched is not invoked for
//!   that event.
//! - A listener removed while an event is being dispatched is not invoked
//!   after its removal.
//!
//! No registry borrow is held while a handler runs, so handlers may freely
//! add or remove listeners and dispatch further events.

#[cfg(test)]
#[path = "document_test.rs"]
mod document_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::trace;
use uuid::Uuid;

use crate::geom::{Point, Rect};
use crate::gesture::{GestureEvent, GestureKind};
use crate::input::{PointerEvent, PointerEventKind};

/// Unique identifier for an element.
pub type ElementId = Uuid;

/// Handle returned when registering a listener; pass it back to remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Propagation phase a raw-input listener is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Capture,
    Bubble,
}

#[derive(Debug, Clone, Copy)]
struct Element {
    rect: Rect,
    parent: Option<ElementId>,
    z_index: i64,
    /// Insertion sequence, used to break hit-testing ties.
    order: u64,
}

struct InputListener {
    id: ListenerId,
    kind: PointerEventKind,
    phase: Phase,
    active: Cell<bool>,
    handler: Box<dyn Fn(&mut PointerEvent)>,
}

struct GestureListener {
    id: ListenerId,
    element: ElementId,
    kind: GestureKind,
    active: Cell<bool>,
    handler: Box<dyn Fn(&mut GestureEvent)>,
}

#[derive(Default)]
struct DocumentInner {
    elements: RefCell<HashMap<ElementId, Element>>,
    input_listeners: RefCell<Vec<Rc<InputListener>>>,
    gesture_listeners: RefCell<Vec<Rc<GestureListener>>>,
    /// Shared counter for listener ids and element insertion order.
    next_seq: Cell<u64>,
}

/// Shared handle to a document. Clones refer to the same document.
#[derive(Clone, Default)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("elements", &self.element_count())
            .field("listeners", &self.listener_count())
            .field("gesture_listeners", &self.gesture_listener_count())
            .finish()
    }
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether two handles refer to the same document.
    #[must_use]
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn next_seq(&self) -> u64 {
        let seq = self.inner.next_seq.get();
        self.inner.next_seq.set(seq + 1);
        seq
    }

    // --- Elements ---

    /// Register an element and return its new id.
    pub fn insert(&self, rect: Rect, parent: Option<ElementId>, z_index: i64) -> ElementId {
        let id = Uuid::new_v4();
        self.insert_with_id(id, rect, parent, z_index);
        id
    }

    /// Register an element under a caller-chosen id, replacing any element
    /// already registered under it.
    pub fn insert_with_id(&self, id: ElementId, rect: Rect, parent: Option<ElementId>, z_index: i64) {
        let order = self.next_seq();
        self.inner
            .elements
            .borrow_mut()
            .insert(id, Element { rect, parent, z_index, order });
    }

    /// Register a top-level element at z-index 0.
    pub fn insert_element(&self, rect: Rect) -> ElementId {
        self.insert(rect, None, 0)
    }

    /// Register an element nested inside `parent`, at the parent's z-index.
    pub fn insert_child(&self, parent: ElementId, rect: Rect) -> ElementId {
        let z_index = self.inner.elements.borrow().get(&parent).map_or(0, |p| p.z_index);
        self.insert(rect, Some(parent), z_index)
    }

    /// Unregister an element. Gesture listeners bound to it are removed too.
    pub fn remove_element(&self, id: ElementId) -> bool {
        let removed = self.inner.elements.borrow_mut().remove(&id).is_some();
        if removed {
            let dropped: Vec<Rc<GestureListener>> = {
                let mut listeners = self.inner.gesture_listeners.borrow_mut();
                let (dropped, kept): (Vec<_>, Vec<_>) = listeners.drain(..).partition(|l| l.element == id);
                *listeners = kept;
                dropped
            };
            for listener in &dropped {
                listener.active.set(false);
            }
        }
        removed
    }

    #[must_use]
    pub fn element_rect(&self, id: ElementId) -> Option<Rect> {
        self.inner.elements.borrow().get(&id).map(|e| e.rect)
    }

    /// Move or resize an element. Returns false if it isn't registered.
    pub fn set_element_rect(&self, id: ElementId, rect: Rect) -> bool {
        let mut elements = self.inner.elements.borrow_mut();
        let Some(element) = elements.get_mut(&id) else {
            return false;
        };
        element.rect = rect;
        true
    }

    #[must_use]
    pub fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        self.inner.elements.borrow().get(&id).and_then(|e| e.parent)
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    #[must_use]
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let elements = self.inner.elements.borrow();
        let mut current = Some(node);
        // Bounded walk, so a malformed parent cycle cannot spin forever.
        for _ in 0..=elements.len() {
            match current {
                Some(id) if id == ancestor => return true,
                Some(id) => current = elements.get(&id).and_then(|e| e.parent),
                None => return false,
            }
        }
        false
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.inner.elements.borrow().len()
    }

    /// The topmost element whose rect contains `point`.
    ///
    /// "Topmost" orders by z-index, then nesting depth, then insertion order.
    #[must_use]
    pub fn element_from_point(&self, point: Point) -> Option<ElementId> {
        let elements = self.inner.elements.borrow();
        elements
            .iter()
            .filter(|(_, e)| e.rect.contains(point))
            .max_by_key(|(_, e)| (e.z_index, depth(&elements, e), e.order))
            .map(|(id, _)| *id)
    }

    // --- Raw input listeners ---

    /// Register a document-level listener for raw input of `kind`.
    pub fn add_event_listener<F>(&self, kind: PointerEventKind, phase: Phase, handler: F) -> ListenerId
    where
        F: Fn(&mut PointerEvent) + 'static,
    {
        let id = ListenerId(self.next_seq());
        self.inner.input_listeners.borrow_mut().push(Rc::new(InputListener {
            id,
            kind,
            phase,
            active: Cell::new(true),
            handler: Box::new(handler),
        }));
        trace!(?id, kind = kind.as_str(), ?phase, "listener added");
        id
    }

    /// Remove a raw-input listener. Returns false if `id` was not registered.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let removed = {
            let mut listeners = self.inner.input_listeners.borrow_mut();
            let Some(pos) = listeners.iter().position(|l| l.id == id) else {
                return false;
            };
            listeners.remove(pos)
        };
        removed.active.set(false);
        trace!(?id, kind = removed.kind.as_str(), "listener removed");
        true
    }

    /// Number of registered raw-input listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.input_listeners.borrow().len()
    }

    /// Number of registered raw-input listeners for `kind`.
    #[must_use]
    pub fn listener_count_for(&self, kind: PointerEventKind) -> usize {
        self.inner
            .input_listeners
            .borrow()
            .iter()
            .filter(|l| l.kind == kind)
            .count()
    }

    /// Deliver a raw input event to the document's listeners.
    ///
    /// If the event has no target it is filled in by hit-testing its client
    /// position first, the way a browser resolves the element under the pointer.
    pub fn dispatch(&self, event: &mut PointerEvent) {
        if event.target.is_none() {
            event.target = self.element_from_point(event.client);
        }
        let kind = event.kind;
        let mut snapshot: Vec<Rc<InputListener>> = self
            .inner
            .input_listeners
            .borrow()
            .iter()
            .filter(|l| l.kind == kind)
            .cloned()
            .collect();
        // Stable sort keeps registration order within each phase.
        snapshot.sort_by_key(|l| l.phase != Phase::Capture);
        trace!(kind = kind.as_str(), listeners = snapshot.len(), "dispatch");
        for listener in snapshot {
            if listener.active.get() {
                (listener.handler)(event);
            }
        }
    }

    // --- Gesture listeners ---

    /// Register a listener for gesture events of `kind` triggered on `element`.
    pub fn add_gesture_listener<F>(&self, element: ElementId, kind: GestureKind, handler: F) -> ListenerId
    where
        F: Fn(&mut GestureEvent) + 'static,
    {
        let id = ListenerId(self.next_seq());
        self.inner.gesture_listeners.borrow_mut().push(Rc::new(GestureListener {
            id,
            element,
            kind,
            active: Cell::new(true),
            handler: Box::new(handler),
        }));
        id
    }

    /// Remove a gesture listener. Returns false if `id` was not registered.
    pub fn remove_gesture_listener(&self, id: ListenerId) -> bool {
        let removed = {
            let mut listeners = self.inner.gesture_listeners.borrow_mut();
            let Some(pos) = listeners.iter().position(|l| l.id == id) else {
                return false;
            };
            listeners.remove(pos)
        };
        removed.active.set(false);
        true
    }

    #[must_use]
    pub fn gesture_listener_count(&self) -> usize {
        self.inner.gesture_listeners.borrow().len()
    }

    /// Deliver a gesture event to listeners registered on `element` for its
    /// kind. Does not propagate to ancestors.
    pub fn dispatch_gesture(&self, element: ElementId, event: &mut GestureEvent) {
        let kind = event.kind();
        let snapshot: Vec<Rc<GestureListener>> = self
            .inner
            .gesture_listeners
            .borrow()
            .iter()
            .filter(|l| l.element == element && l.kind == kind)
            .cloned()
            .collect();
        for listener in snapshot {
            if listener.active.get() {
                (listener.handler)(event);
            }
        }
    }
}

fn depth(elements: &HashMap<ElementId, Element>, element: &Element) -> usize {
    let mut depth = 0;
    let mut parent = element.parent;
    while let Some(id) = parent {
        if depth >= elements.len() {
            break;
        }
        depth += 1;
        parent = elements.get(&id).and_then(|e| e.parent);
    }
    depth
}

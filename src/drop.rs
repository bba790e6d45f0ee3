//! Drop handling: turns a node's drag gestures into a tree move.
//!
//! A [`DropController`] listens for the gesture events a sensor triggers on a
//! node's element. On `drag:start` it claims the shared [`DragSession`]
//! (vetoing the start if another drag owns it). When draggable nodes nest,
//! the innermost one under the press takes the drag and every enclosing
//! controller vetoes its own start. On every `drag:move` and on
//! `drag:stop` it finds the container under the pointer and asks a
//! [`PlacementResolver`] where the node would land. On `drag:stop` a valid
//! indicator is handed to the application's [`NodeMover`].
//!
//! The resolver and mover are application seams. [`StackResolver`] and
//! [`NodeMap`] are small in-memory implementations for vertically stacked
//! children.

#[cfg(test)]
#[path = "drop_test.rs"]
mod drop_test;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::document::{Document, ElementId, ListenerId};
use crate::geom::Point;
use crate::gesture::{GestureEvent, GestureKind};
use crate::sensor::{GestureProbe, Sensor};
use crate::session::DragSession;

/// Identifier of a node in the application's tree.
pub type NodeId = Uuid;

/// Error returned when a drop controller cannot be connected.
#[derive(Debug, thiserror::Error)]
pub enum DropError {
    #[error("node {0} has no registered element")]
    UnregisteredNode(NodeId),
}

/// Side of the reference child the dragged node lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Where {
    Before,
    After,
}

/// Where a dragged node would be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Container node receiving the dragged node.
    pub parent: NodeId,
    /// Index of the reference child inside `parent`.
    pub index: usize,
    #[serde(rename = "where")]
    pub where_: Where,
}

impl Placement {
    /// Index at which the node is inserted: `index`, or `index + 1` after the
    /// reference child.
    #[must_use]
    pub fn insertion_index(&self) -> usize {
        match self.where_ {
            Where::Before => self.index,
            Where::After => self.index + 1,
        }
    }
}

/// Candidate drop location. An indicator with an `error` is shown but never
/// applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropIndicator {
    pub placement: Placement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DropIndicator {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Two-way mapping between tree nodes and document elements.
pub trait NodeRegistry {
    fn element_of(&self, node: NodeId) -> Option<ElementId>;
    fn node_at(&self, element: ElementId) -> Option<NodeId>;
    fn node_ids(&self) -> Vec<NodeId>;
    /// Whether `node` can receive dropped children.
    fn is_container(&self, node: NodeId) -> bool;
}

/// Computes where `dragged` would land in `container` for a pointer at `point`.
pub trait PlacementResolver {
    fn resolve(
        &self,
        dragged: NodeId,
        container: NodeId,
        point: Point,
        registry: &dyn NodeRegistry,
    ) -> Option<DropIndicator>;
}

/// Applies a committed drop to the application's tree.
pub trait NodeMover {
    fn move_node(&self, node: NodeId, parent: NodeId, index: usize);
}

// =============================================================================
// NodeMap
// =============================================================================

/// In-memory [`NodeRegistry`].
#[derive(Debug, Default)]
pub struct NodeMap {
    elements: RefCell<HashMap<NodeId, ElementId>>,
    nodes: RefCell<HashMap<ElementId, NodeId>>,
    containers: RefCell<HashSet<NodeId>>,
}

impl NodeMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map leaf `node` to `element`, replacing any previous mapping of either.
    pub fn insert(&self, node: NodeId, element: ElementId) {
        self.remove(node);
        if let Some(previous) = self.nodes.borrow_mut().insert(element, node) {
            self.elements.borrow_mut().remove(&previous);
        }
        self.elements.borrow_mut().insert(node, element);
    }

    /// Like [`insert`](Self::insert), for a node that accepts dropped children.
    pub fn insert_container(&self, node: NodeId, element: ElementId) {
        self.insert(node, element);
        self.containers.borrow_mut().insert(node);
    }

    /// Forget `node`. Returns the element it was mapped to.
    pub fn remove(&self, node: NodeId) -> Option<ElementId> {
        let element = self.elements.borrow_mut().remove(&node)?;
        self.nodes.borrow_mut().remove(&element);
        self.containers.borrow_mut().remove(&node);
        Some(element)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }
}

impl NodeRegistry for NodeMap {
    fn element_of(&self, node: NodeId) -> Option<ElementId> {
        self.elements.borrow().get(&node).copied()
    }

    fn node_at(&self, element: ElementId) -> Option<NodeId> {
        self.nodes.borrow().get(&element).copied()
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.elements.borrow().keys().copied().collect()
    }

    fn is_container(&self, node: NodeId) -> bool {
        self.containers.borrow().contains(&node)
    }
}

// =============================================================================
// StackResolver
// =============================================================================

/// Resolver for containers whose children are stacked top to bottom.
///
/// The pointer lands before the first child whose vertical midpoint is below
/// it, or after the last child. Dropping a node into itself or one of its
/// descendants yields an indicator with an error.
#[derive(Debug, Clone)]
pub struct StackResolver {
    document: Document,
}

impl StackResolver {
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl PlacementResolver for StackResolver {
    fn resolve(
        &self,
        dragged: NodeId,
        container: NodeId,
        point: Point,
        registry: &dyn NodeRegistry,
    ) -> Option<DropIndicator> {
        let container_el = registry.element_of(container)?;
        let mut children: Vec<_> = registry
            .node_ids()
            .into_iter()
            .filter_map(|node| registry.element_of(node))
            .filter(|el| self.document.parent_of(*el) == Some(container_el))
            .filter_map(|el| self.document.element_rect(el))
            .collect();
        children.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

        let (index, where_) = match children.iter().position(|r| point.y < r.y + r.height / 2.0) {
            Some(index) => (index, Where::Before),
            None if children.is_empty() => (0, Where::Before),
            None => (children.len() - 1, Where::After),
        };

        let into_itself = registry
            .element_of(dragged)
            .is_some_and(|el| self.document.contains(el, container_el));
        let error = into_itself.then(|| "cannot drop a node inside itself".to_owned());

        Some(DropIndicator { placement: Placement { parent: container, index, where_ }, error })
    }
}

// =============================================================================
// DropController
// =============================================================================

/// Everything a [`DropController`] needs besides its node. Cheap to clone;
/// one context is usually shared by every controller of a tree.
#[derive(Clone)]
pub struct DropContext {
    pub document: Document,
    pub session: DragSession,
    pub registry: Rc<dyn NodeRegistry>,
    pub resolver: Rc<dyn PlacementResolver>,
    pub mover: Rc<dyn NodeMover>,
}

impl fmt::Debug for DropContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropContext")
            .field("document", &self.document)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct DropShared {
    node: NodeId,
    context: DropContext,
    /// The sensor driving this node, if [`DropController::follow`] was called.
    sensor: RefCell<Option<GestureProbe>>,
}

/// Gesture listeners for one draggable node. Dropping the controller
/// disconnects it and releases the session if this node owns it.
///
/// Call [`follow`](Self::follow) with the node's sensor so that a drag the
/// sensor abandons without `drag:stop` (detach, drop) does not keep the
/// session claimed.
#[derive(Debug)]
pub struct DropController {
    shared: Rc<DropShared>,
    element: ElementId,
    listeners: Vec<ListenerId>,
}

impl DropController {
    /// Listen for gestures on `node`'s element.
    ///
    /// # Errors
    ///
    /// Returns [`DropError::UnregisteredNode`] if the registry has no element
    /// for `node`.
    pub fn connect(context: &DropContext, node: NodeId) -> Result<Self, DropError> {
        let element = context
            .registry
            .element_of(node)
            .ok_or(DropError::UnregisteredNode(node))?;
        let shared = Rc::new(DropShared { node, context: context.clone(), sensor: RefCell::new(None) });
        let weak = Rc::downgrade(&shared);
        let listeners = vec![
            listen(&context.document, element, GestureKind::Start, &weak, DropShared::on_start),
            listen(&context.document, element, GestureKind::Move, &weak, DropShared::on_move),
            listen(&context.document, element, GestureKind::Stop, &weak, DropShared::on_stop),
        ];
        context.session.add_handle(node);
        debug!(%node, %element, "drop controller connected");
        Ok(Self { shared, element, listeners })
    }

    #[must_use]
    pub fn node(&self) -> NodeId {
        self.shared.node
    }

    #[must_use]
    pub fn element(&self) -> ElementId {
        self.element
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Tie this node's session claims to `sensor`: a claim lapses once the
    /// sensor stops tracking its press.
    pub fn follow(&self, sensor: &impl Sensor) {
        *self.shared.sensor.borrow_mut() = Some(sensor.core().probe());
    }

    /// Remove this controller's listeners and release the session if this
    /// node owns it. Idempotent.
    pub fn disconnect(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        for id in self.listeners.drain(..) {
            self.shared.context.document.remove_gesture_listener(id);
        }
        let session = &self.shared.context.session;
        session.remove_handle(self.shared.node);
        if self.shared.owns_session() {
            session.clear();
            debug!(node = %self.shared.node, "drag abandoned, session released");
        }
        debug!(node = %self.shared.node, "drop controller disconnected");
    }
}

impl Drop for DropController {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn listen(
    document: &Document,
    element: ElementId,
    kind: GestureKind,
    shared: &Weak<DropShared>,
    handler: fn(&DropShared, &mut GestureEvent),
) -> ListenerId {
    let weak = shared.clone();
    document.add_gesture_listener(element, kind, move |event| {
        if let Some(shared) = weak.upgrade() {
            handler(&shared, event);
        }
    })
}

impl DropShared {
    fn owns_session(&self) -> bool {
        self.context.session.dragged() == Some(self.node)
    }

    fn on_start(&self, event: &mut GestureEvent) {
        if event.canceled() {
            return;
        }
        if let Some(inner) = self.nested_handle(event) {
            debug!(node = %self.node, %inner, "press belongs to a nested draggable");
            event.cancel();
            return;
        }
        if self.owns_session() {
            // Left over from a start that a later listener vetoed.
            self.context.session.clear();
        }
        let owner = self.sensor.borrow().clone();
        let claimed = match owner {
            Some(owner) => self.context.session.begin_owned(self.node, owner),
            None => self.context.session.begin(self.node),
        };
        if claimed {
            debug!(node = %self.node, "drag session started");
            return;
        }
        warn!(
            node = %self.node,
            active = ?self.context.session.dragged(),
            "another drag owns the session, vetoing drag:start"
        );
        event.cancel();
    }

    fn on_move(&self, event: &mut GestureEvent) {
        if self.owns_session() {
            self.track(event);
        }
    }

    fn on_stop(&self, event: &mut GestureEvent) {
        if !self.owns_session() {
            return;
        }
        self.track(event);
        let Some((node, indicator)) = self.context.session.finish() else {
            return;
        };
        match indicator {
            Some(indicator) if indicator.is_valid() => {
                let parent = indicator.placement.parent;
                let index = indicator.placement.insertion_index();
                self.context.mover.move_node(node, parent, index);
                info!(%node, %parent, index, "node moved");
            }
            Some(indicator) => {
                debug!(%node, error = ?indicator.error, "drop rejected");
            }
            None => debug!(%node, "dropped outside any container"),
        }
    }

    /// Refresh the session's indicator for the pointer position in `event`.
    fn track(&self, event: &GestureEvent) {
        let Some(container) = event.target().and_then(|el| self.container_at(el)) else {
            trace!(node = %self.node, "no container under pointer");
            return;
        };
        let resolved = self.context.resolver.resolve(
            self.node,
            container,
            event.client_point(),
            &*self.context.registry,
        );
        if let Some(indicator) = resolved {
            trace!(
                %container,
                index = indicator.placement.index,
                valid = indicator.is_valid(),
                "indicator"
            );
            self.context.session.set_indicator(indicator);
        }
    }

    /// Innermost connected node, other than this one, between the press
    /// target and this node's element.
    fn nested_handle(&self, event: &GestureEvent) -> Option<NodeId> {
        let document = &self.context.document;
        let own = event.container();
        let mut inner = None;
        let mut current = event.target();
        for _ in 0..=document.element_count() {
            let el = current?;
            if el == own {
                return inner;
            }
            if inner.is_none() {
                inner = self
                    .context
                    .registry
                    .node_at(el)
                    .filter(|&node| node != self.node && self.context.session.is_handle(node));
            }
            current = document.parent_of(el);
        }
        None
    }

    /// Nearest container node at or above `element`, skipping the dragged node.
    fn container_at(&self, element: ElementId) -> Option<NodeId> {
        let document = &self.context.document;
        let mut current = Some(element);
        for _ in 0..=document.element_count() {
            let el = current?;
            match self.context.registry.node_at(el) {
                Some(node) if node != self.node && self.context.registry.is_container(node) => {
                    return Some(node);
                }
                _ => current = document.parent_of(el),
            }
        }
        None
    }
}

//! The active drag session: which node is being dragged and where it would land.
//!
//! One `DragSession` is shared (by cloning the handle) between every
//! [`DropController`](crate::drop::DropController) of a tree. Only one drag
//! can own it at a time: [`begin`](DragSession::begin) refuses while another
//! drag is active.
//!
//! A claim made with [`begin_owned`](DragSession::begin_owned) carries the
//! owning sensor's [`GestureProbe`]. When that sensor stops tracking without
//! a `drag:stop` (detached or dropped mid-drag) the claim is stale and is
//! released the next time the session is read.
//!
//! The session also keeps the set of nodes with a connected controller, so
//! that nested draggables can tell which one a press belongs to.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use tracing::debug;

use crate::drop::{DropIndicator, NodeId};
use crate::sensor::GestureProbe;

#[derive(Debug, Default)]
struct SessionState {
    dragged: Option<NodeId>,
    indicator: Option<DropIndicator>,
    owner: Option<GestureProbe>,
    handles: HashSet<NodeId>,
}

impl SessionState {
    /// Release a claim whose owning sensor is no longer tracking a press.
    fn prune(&mut self) {
        let stale = self.owner.as_ref().is_some_and(|owner| !owner.is_live());
        if stale {
            debug!(node = ?self.dragged, "releasing stale drag session");
            self.dragged = None;
            self.indicator = None;
            self.owner = None;
        }
    }
}

/// Shared handle to the drag session. Clones refer to the same session.
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    state: Rc<RefCell<SessionState>>,
}

impl DragSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the session for `node`. Returns false if another drag owns it.
    pub fn begin(&self, node: NodeId) -> bool {
        self.claim(node, None)
    }

    /// Claim the session for `node` on behalf of the sensor behind `owner`.
    /// The claim lapses once `owner` stops tracking its press.
    pub fn begin_owned(&self, node: NodeId, owner: GestureProbe) -> bool {
        self.claim(node, Some(owner))
    }

    fn claim(&self, node: NodeId, owner: Option<GestureProbe>) -> bool {
        let mut state = self.state.borrow_mut();
        state.prune();
        if state.dragged.is_some() {
            return false;
        }
        state.dragged = Some(node);
        state.indicator = None;
        state.owner = owner;
        true
    }

    #[must_use]
    pub fn dragged(&self) -> Option<NodeId> {
        let mut state = self.state.borrow_mut();
        state.prune();
        state.dragged
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.dragged().is_some()
    }

    /// Record the latest drop indicator. Ignored when no drag is active.
    pub fn set_indicator(&self, indicator: DropIndicator) {
        let mut state = self.state.borrow_mut();
        state.prune();
        if state.dragged.is_some() {
            state.indicator = Some(indicator);
        }
    }

    #[must_use]
    pub fn indicator(&self) -> Option<DropIndicator> {
        let mut state = self.state.borrow_mut();
        state.prune();
        state.indicator.clone()
    }

    /// End the drag, returning the dragged node and the last indicator.
    pub fn finish(&self) -> Option<(NodeId, Option<DropIndicator>)> {
        let mut state = self.state.borrow_mut();
        state.prune();
        let node = state.dragged.take()?;
        state.owner = None;
        Some((node, state.indicator.take()))
    }

    /// Drop any active drag without reporting it.
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.dragged = None;
        state.indicator = None;
        state.owner = None;
    }

    /// Mark `node` as having a connected drop controller.
    pub fn add_handle(&self, node: NodeId) {
        self.state.borrow_mut().handles.insert(node);
    }

    pub fn remove_handle(&self, node: NodeId) {
        self.state.borrow_mut().handles.remove(&node);
    }

    #[must_use]
    pub fn is_handle(&self, node: NodeId) -> bool {
        self.state.borrow().handles.contains(&node)
    }
}

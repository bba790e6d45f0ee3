//! Cancelable event values.
//!
//! Every event a sensor dispatches is a [`CancelableEvent`]: a payload plus a
//! one-way cancellation flag. The payload type decides the event's type tag and
//! whether cancellation is meaningful, so gesture events and untyped events
//! share one implementation.
//!
//! Listeners receive events by `&mut` during a synchronous dispatch and may call
//! [`CancelableEvent::cancel`]. The dispatcher inspects the flag once dispatch
//! returns.

#[cfg(test)]
#[path = "event_test.rs"]
mod event_test;

use serde_json::{Map, Value};

use crate::consts::EVENT_TYPE_BASE;

/// Untyped key/value payload.
pub type Payload = Map<String, Value>;

/// Data carried by a [`CancelableEvent`].
pub trait EventData: Clone {
    /// Sparse replacement values accepted by [`CancelableEvent::clone_with`].
    type Overrides;

    /// Type tag, e.g. `"drag:start"`.
    fn event_type(&self) -> &'static str;

    /// Whether canceling this event changes what the dispatcher does next.
    fn cancelable(&self) -> bool;

    /// Copy of `self` with `overrides` applied. Must not modify `self`.
    #[must_use]
    fn merged(&self, overrides: Self::Overrides) -> Self;
}

impl EventData for Payload {
    type Overrides = Payload;

    fn event_type(&self) -> &'static str {
        EVENT_TYPE_BASE
    }

    fn cancelable(&self) -> bool {
        false
    }

    /// Shallow merge: top-level keys from `overrides` replace existing ones.
    fn merged(&self, overrides: Payload) -> Self {
        let mut out = self.clone();
        out.extend(overrides);
        out
    }
}

/// An event with a payload and a cancellation flag.
///
/// `Clone` copies the flag along with the payload; use
/// [`clone_with`](Self::clone_with) to derive a fresh, uncanceled event.
#[derive(Debug, Clone, PartialEq)]
pub struct CancelableEvent<T> {
    data: T,
    canceled: bool,
}

/// A `CancelableEvent` over an untyped [`Payload`].
pub type PayloadEvent = CancelableEvent<Payload>;

impl<T: EventData> CancelableEvent<T> {
    /// Create an uncanceled event.
    #[must_use]
    pub fn new(data: T) -> Self {
        Self { data, canceled: false }
    }

    /// The event payload.
    #[must_use]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Consume the event and return its payload.
    #[must_use]
    pub fn into_data(self) -> T {
        self.data
    }

    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.data.event_type()
    }

    #[must_use]
    pub fn cancelable(&self) -> bool {
        self.data.cancelable()
    }

    /// Mark the event canceled. Irreversible; calling again is a no-op.
    ///
    /// The flag is recorded even when [`cancelable`](Self::cancelable) is
    /// false, it just has no effect on the dispatcher.
    pub fn cancel(&mut self) {
        self.canceled = true;
    }

    #[must_use]
    pub fn canceled(&self) -> bool {
        self.canceled
    }

    /// New event whose payload is this payload with `overrides` applied.
    /// The result is never canceled, whatever the state of `self`.
    #[must_use]
    pub fn clone_with(&self, overrides: T::Overrides) -> Self {
        Self::new(self.data.merged(overrides))
    }
}

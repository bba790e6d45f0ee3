//! Pointer gesture recognition and drag event dispatch.
//!
//! A sensor watches raw pointer input on a [`document::Document`] on behalf of
//! one element and, once a press has been held long enough and moved far
//! enough, triggers a `drag:start` / `drag:move` / `drag:stop` sequence on
//! that element. Listeners can veto `drag:start`. The [`drop`] layer turns a
//! finished gesture into a tree move, and [`replay`] drives the whole stack
//! from a recorded scene.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`pointer`] | Pointer sensor and its recognition state machine |
//! | [`sensor`] | The sensor contract and shared [`sensor::SensorCore`] |
//! | [`gesture`] | `drag:start`/`drag:move`/`drag:stop` events |
//! | [`event`] | Generic cancelable event with copy-on-override |
//! | [`document`] | Element geometry, hit-testing and listener registries |
//! | [`input`] | Raw pointer events, buttons and modifiers |
//! | [`config`] | Delay and distance thresholds |
//! | [`session`] | The shared drag session |
//! | [`drop`] | Drop controllers, placement resolution and node registries |
//! | [`replay`] | Scene loading and trace replay |
//! | [`geom`] | Points, rects and distances |
//! | [`consts`] | Event type tags, button codes and defaults |

pub mod config;
pub mod consts;
pub mod document;
pub mod drop;
pub mod event;
pub mod geom;
pub mod gesture;
pub mod input;
pub mod pointer;
pub mod replay;
pub mod sensor;
pub mod session;

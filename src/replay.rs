//! Trace replay: drive real sensors from a recorded scene.
//!
//! A [`Scene`] describes named elements and a timeline of raw pointer events.
//! [`replay`] builds a [`Document`] from it, attaches a [`PointerSensor`] and a
//! [`DropController`] to every draggable element, feeds the events through
//! and returns what happened as [`ReplayRecord`]s: one per dispatched gesture
//! event and one per committed move.
//!
//! ```json
//! {
//!   "options": { "delay": 0, "distance": 4 },
//!   "elements": [
//!     { "name": "list", "rect": { "x": 0, "y": 0, "width": 200, "height": 300 }, "container": true },
//!     { "name": "a", "rect": { "x": 0, "y": 0, "width": 200, "height": 100 }, "parent": "list", "draggable": true }
//!   ],
//!   "events": [
//!     { "kind": "down", "x": 50, "y": 50, "t": 0 },
//!     { "kind": "move", "x": 50, "y": 250, "t": 16 },
//!     { "kind": "up", "x": 50, "y": 250, "t": 32 }
//!   ]
//! }
//! ```

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ConfigError, SensorOptions};
use crate::document::{Document, ElementId};
use crate::drop::{DropContext, DropController, DropError, NodeId, NodeMap, NodeMover, StackResolver};
use crate::geom::{Point, Rect};
use crate::gesture::{GestureEvent, GestureKind};
use crate::input::{Button, Modifiers, PointerEvent, PointerEventKind};
use crate::pointer::PointerSensor;
use crate::sensor::Sensor;
use crate::session::DragSession;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown element {0:?}")]
    UnknownElement(String),
    #[error("duplicate element {0:?}")]
    DuplicateElement(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Drop(#[from] DropError),
}

// =============================================================================
// Scene
// =============================================================================

/// A document layout plus the pointer events to play against it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub options: Option<SensorOptions>,
    pub elements: Vec<SceneElement>,
    #[serde(default)]
    pub events: Vec<TraceEvent>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneElement {
    pub name: String,
    pub rect: Rect,
    /// Name of an element declared earlier in the scene.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub z_index: i64,
    /// Attach a sensor and a drop controller.
    #[serde(default)]
    pub draggable: bool,
    /// Accepts dropped children.
    #[serde(default)]
    pub container: bool,
}

/// One recorded pointer event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraceEvent {
    pub kind: PointerEventKind,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub button: Button,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Timestamp in milliseconds.
    #[serde(default)]
    pub t: u64,
}

impl TraceEvent {
    fn to_pointer_event(&self) -> PointerEvent {
        PointerEvent::new(self.kind, Point::new(self.x, self.y))
            .with_button(self.button)
            .with_modifiers(self.modifiers)
            .at(self.t)
    }
}

impl Scene {
    /// Parse a scene from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Json`] if `raw` is not a valid scene.
    pub fn from_json(raw: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read and parse a scene file.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Io`] if the file can't be read and
    /// [`ReplayError::Json`] if it doesn't parse.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// The scene's options with any explicitly given threshold taking precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDistance`] for an out-of-range distance.
    pub fn effective_options(&self, delay: Option<u64>, distance: Option<f64>) -> Result<SensorOptions, ConfigError> {
        let base = self.options.unwrap_or_default();
        SensorOptions::new(delay.unwrap_or(base.delay), distance.unwrap_or(base.distance))
    }
}

// =============================================================================
// Records
// =============================================================================

/// Something observable that happened during a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "record", rename_all = "lowercase")]
pub enum ReplayRecord {
    /// A gesture event, as seen by listeners on the dragged element after
    /// every other listener ran.
    #[serde(rename_all = "camelCase")]
    Gesture {
        element: String,
        #[serde(rename = "type")]
        kind: GestureKind,
        client_x: f64,
        client_y: f64,
        target: Option<String>,
        canceled: bool,
        t: u64,
    },
    /// A committed drop.
    Move { node: String, parent: String, index: usize },
}

type Names = Rc<HashMap<ElementId, String>>;
type Records = Rc<RefCell<Vec<ReplayRecord>>>;

/// Logs committed moves as records. Node ids are element ids in a replay.
struct RecordingMover {
    names: Names,
    records: Records,
}

impl NodeMover for RecordingMover {
    fn move_node(&self, node: NodeId, parent: NodeId, index: usize) {
        self.records.borrow_mut().push(ReplayRecord::Move {
            node: name_of(&self.names, node),
            parent: name_of(&self.names, parent),
            index,
        });
    }
}

fn name_of(names: &HashMap<ElementId, String>, id: ElementId) -> String {
    names.get(&id).cloned().unwrap_or_else(|| id.to_string())
}

// =============================================================================
// Replay
// =============================================================================

/// Play `scene` with `options` and collect every gesture event and move.
///
/// # Errors
///
/// Returns [`ReplayError::UnknownElement`] when an element names a parent not
/// declared before it, and [`ReplayError::DuplicateElement`] when two elements
/// share a name.
pub fn replay(scene: &Scene, options: SensorOptions) -> Result<Vec<ReplayRecord>, ReplayError> {
    options.validate()?;
    let document = Document::new();
    let registry = Rc::new(NodeMap::new());
    let mut ids: HashMap<&str, ElementId> = HashMap::new();
    let mut names: HashMap<ElementId, String> = HashMap::new();

    for element in &scene.elements {
        if ids.contains_key(element.name.as_str()) {
            return Err(ReplayError::DuplicateElement(element.name.clone()));
        }
        let parent = match &element.parent {
            Some(name) => Some(
                *ids
                    .get(name.as_str())
                    .ok_or_else(|| ReplayError::UnknownElement(name.clone()))?,
            ),
            None => None,
        };
        let id = document.insert(element.rect, parent, element.z_index);
        if element.container {
            registry.insert_container(id, id);
        } else {
            registry.insert(id, id);
        }
        ids.insert(&element.name, id);
        names.insert(id, element.name.clone());
    }

    let names: Names = Rc::new(names);
    let records: Records = Rc::new(RefCell::new(Vec::new()));
    let context = DropContext {
        document: document.clone(),
        session: DragSession::new(),
        registry,
        resolver: Rc::new(StackResolver::new(document.clone())),
        mover: Rc::new(RecordingMover { names: names.clone(), records: records.clone() }),
    };

    let mut sensors = Vec::new();
    let mut controllers = Vec::new();
    for element in scene.elements.iter().filter(|e| e.draggable) {
        let Some(&id) = ids.get(element.name.as_str()) else {
            continue;
        };
        let controller = DropController::connect(&context, id)?;
        for kind in [GestureKind::Start, GestureKind::Move, GestureKind::Stop] {
            record_gestures(&document, id, kind, &names, &records);
        }
        let mut sensor = PointerSensor::new(document.clone(), id, options);
        sensor.attach();
        controller.follow(&sensor);
        controllers.push(controller);
        sensors.push(sensor);
    }
    debug!(
        elements = scene.elements.len(),
        sensors = sensors.len(),
        events = scene.events.len(),
        "replaying scene"
    );

    for trace in &scene.events {
        document.dispatch(&mut trace.to_pointer_event());
    }

    drop(controllers);
    drop(sensors);
    let records = records.take();
    info!(records = records.len(), "replay finished");
    Ok(records)
}

fn record_gestures(document: &Document, element: ElementId, kind: GestureKind, names: &Names, records: &Records) {
    let names = names.clone();
    let records = records.clone();
    document.add_gesture_listener(element, kind, move |event: &mut GestureEvent| {
        records.borrow_mut().push(ReplayRecord::Gesture {
            element: name_of(&names, event.container()),
            kind: event.kind(),
            client_x: event.client_x(),
            client_y: event.client_y(),
            target: event.target().map(|id| name_of(&names, id)),
            canceled: event.canceled(),
            t: event.original_event().time_stamp,
        });
    });
}

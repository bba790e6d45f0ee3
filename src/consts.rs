//! Shared constants for the dragsense crate.

// ── Event types ─────────────────────────────────────────────────

/// Type tag of the untyped base event.
pub const EVENT_TYPE_BASE: &str = "event";

/// Type tag of the gesture start event.
pub const EVENT_TYPE_DRAG_START: &str = "drag:start";

/// Type tag of the gesture move event.
pub const EVENT_TYPE_DRAG_MOVE: &str = "drag:move";

/// Type tag of the gesture stop event.
pub const EVENT_TYPE_DRAG_STOP: &str = "drag:stop";

// ── Input ───────────────────────────────────────────────────────

/// Button code reported for the primary (usually left) button.
pub const BUTTON_PRIMARY: i16 = 0;

/// Button code reported for the middle button.
pub const BUTTON_MIDDLE: i16 = 1;

/// Button code reported for the secondary (usually right) button.
pub const BUTTON_SECONDARY: i16 = 2;

// ── Thresholds ──────────────────────────────────────────────────

/// Default minimum press duration, in milliseconds, before a drag may start.
pub const DEFAULT_DELAY_MS: u64 = 0;

/// Default minimum pointer travel, in pixels, before a drag may start.
pub const DEFAULT_DISTANCE_PX: f64 = 0.0;

/// Environment variable read by [`crate::config::SensorOptions::from_env`] for the delay.
pub const ENV_DELAY_MS: &str = "DRAG_DELAY_MS";

/// Environment variable read by [`crate::config::SensorOptions::from_env`] for the distance.
pub const ENV_DISTANCE_PX: &str = "DRAG_DISTANCE_PX";

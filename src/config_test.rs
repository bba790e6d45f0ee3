#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

// =============================================================
// Defaults and validation
// =============================================================

#[test]
fn default_is_immediate() {
    let options = SensorOptions::default();
    assert_eq!(options.delay, 0);
    assert_eq!(options.distance, 0.0);
}

#[test]
fn new_accepts_valid_values() {
    let options = SensorOptions::new(100, 10.0).expect("options");
    assert_eq!(options.delay, 100);
    assert_eq!(options.distance, 10.0);
}

#[test]
fn new_rejects_negative_distance() {
    let err = SensorOptions::new(0, -1.0).expect_err("negative distance");
    assert!(matches!(err, ConfigError::InvalidDistance(d) if d == -1.0));
}

#[test]
fn new_rejects_nan_and_infinite_distance() {
    assert!(SensorOptions::new(0, f64::NAN).is_err());
    assert!(SensorOptions::new(0, f64::INFINITY).is_err());
}

#[test]
fn validate_catches_hand_built_options() {
    let options = SensorOptions { delay: 5, distance: -3.0 };
    assert!(options.validate().is_err());
}

// =============================================================
// JSON
// =============================================================

#[test]
fn from_json_reads_both_fields() {
    let options = SensorOptions::from_json(r#"{"delay": 150, "distance": 4.5}"#).expect("options");
    assert_eq!(options, SensorOptions { delay: 150, distance: 4.5 });
}

#[test]
fn from_json_defaults_missing_fields() {
    let options = SensorOptions::from_json(r#"{"distance": 8}"#).expect("options");
    assert_eq!(options.delay, 0);
    assert_eq!(options.distance, 8.0);
}

#[test]
fn from_json_rejects_malformed_input() {
    let err = SensorOptions::from_json("{delay:").expect_err("bad json");
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn from_json_rejects_negative_distance() {
    let err = SensorOptions::from_json(r#"{"distance": -2}"#).expect_err("negative");
    assert!(matches!(err, ConfigError::InvalidDistance(_)));
}

// =============================================================
// Environment
// =============================================================

#[test]
fn lookup_with_nothing_set_uses_defaults() {
    let options = SensorOptions::from_lookup(lookup_from(&[])).expect("options");
    assert_eq!(options, SensorOptions::default());
}

#[test]
fn lookup_reads_both_variables() {
    let options =
        SensorOptions::from_lookup(lookup_from(&[("DRAG_DELAY_MS", "250"), ("DRAG_DISTANCE_PX", " 12.5 ")]))
            .expect("options");
    assert_eq!(options, SensorOptions { delay: 250, distance: 12.5 });
}

#[test]
fn lookup_rejects_garbage_delay() {
    let err = SensorOptions::from_lookup(lookup_from(&[("DRAG_DELAY_MS", "soon")])).expect_err("garbage");
    match err {
        ConfigError::InvalidValue { var, value } => {
            assert_eq!(var, "DRAG_DELAY_MS");
            assert_eq!(value, "soon");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn lookup_rejects_negative_delay() {
    let err = SensorOptions::from_lookup(lookup_from(&[("DRAG_DELAY_MS", "-5")])).expect_err("negative");
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn lookup_rejects_negative_distance() {
    let err = SensorOptions::from_lookup(lookup_from(&[("DRAG_DISTANCE_PX", "-5")])).expect_err("negative");
    assert!(matches!(err, ConfigError::InvalidDistance(_)));
}

#[test]
fn error_messages_name_the_problem() {
    let err = ConfigError::InvalidValue { var: "DRAG_DELAY_MS", value: "x".into() };
    assert_eq!(err.to_string(), r#"invalid value for DRAG_DELAY_MS: "x""#);
}

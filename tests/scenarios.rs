//! End-to-end gesture scenarios through the public API.

use std::cell::RefCell;
use std::rc::Rc;

use dragsense::config::SensorOptions;
use dragsense::document::{Document, ElementId};
use dragsense::geom::Rect;
use dragsense::gesture::{GestureEvent, GestureKind};
use dragsense::input::PointerEvent;
use dragsense::pointer::{PointerSensor, SensorState};
use dragsense::sensor::Sensor;

type Log = Rc<RefCell<Vec<(GestureKind, Option<ElementId>, f64, f64)>>>;

fn watch(doc: &Document, element: ElementId) -> Log {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    for kind in [GestureKind::Start, GestureKind::Move, GestureKind::Stop] {
        let log = log.clone();
        doc.add_gesture_listener(element, kind, move |ev: &mut GestureEvent| {
            log.borrow_mut().push((ev.kind(), ev.target(), ev.client_x(), ev.client_y()));
        });
    }
    log
}

fn sensor(doc: &Document, element: ElementId, delay: u64, distance: f64) -> PointerSensor {
    let options = SensorOptions::new(delay, distance).expect("options");
    let mut sensor = PointerSensor::new(doc.clone(), element, options);
    sensor.attach();
    sensor
}

fn send(doc: &Document, mut event: PointerEvent) {
    doc.dispatch(&mut event);
}

#[test]
fn immediate_drag_start_move_stop() {
    let doc = Document::new();
    let card = doc.insert_element(Rect::new(0.0, 0.0, 50.0, 50.0));
    let log = watch(&doc, card);
    let sensor = sensor(&doc, card, 0, 0.0);

    send(&doc, PointerEvent::down(10.0, 10.0));
    send(&doc, PointerEvent::moved(11.0, 10.0));
    {
        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0], (GestureKind::Start, Some(card), 10.0, 10.0));
        assert_eq!(log[1], (GestureKind::Move, Some(card), 11.0, 10.0));
    }
    assert!(sensor.is_dragging());

    send(&doc, PointerEvent::up(11.0, 10.0));
    assert_eq!(log.borrow().last().map(|e| e.0), Some(GestureKind::Stop));
    assert!(!sensor.is_dragging());
    assert_eq!(sensor.state(), SensorState::Idle);
    assert_eq!(doc.listener_count(), 1);
}

#[test]
fn delay_and_distance_must_both_hold() {
    let doc = Document::new();
    let card = doc.insert_element(Rect::new(0.0, 0.0, 50.0, 50.0));
    let log = watch(&doc, card);
    let _sensor = sensor(&doc, card, 100, 10.0);

    send(&doc, PointerEvent::down(0.0, 0.0).at(0));
    send(&doc, PointerEvent::moved(3.0, 0.0).at(50));
    send(&doc, PointerEvent::moved(3.0, 0.0).at(150));
    assert!(log.borrow().is_empty());

    send(&doc, PointerEvent::moved(12.0, 0.0).at(160));
    let kinds: Vec<GestureKind> = log.borrow().iter().map(|e| e.0).collect();
    assert_eq!(kinds, vec![GestureKind::Start, GestureKind::Move]);
}

#[test]
fn vetoed_start_ends_the_gesture() {
    let doc = Document::new();
    let card = doc.insert_element(Rect::new(0.0, 0.0, 50.0, 50.0));
    doc.add_gesture_listener(card, GestureKind::Start, GestureEvent::cancel);
    let log = watch(&doc, card);
    let sensor = sensor(&doc, card, 0, 0.0);

    send(&doc, PointerEvent::down(10.0, 10.0));
    send(&doc, PointerEvent::moved(20.0, 10.0));
    send(&doc, PointerEvent::moved(30.0, 10.0));
    send(&doc, PointerEvent::up(30.0, 10.0));

    let kinds: Vec<GestureKind> = log.borrow().iter().map(|e| e.0).collect();
    assert_eq!(kinds, vec![GestureKind::Start]);
    assert!(!sensor.is_dragging());
    assert_eq!(doc.listener_count(), 1);
}

#[test]
fn sensors_only_react_to_their_own_element() {
    let doc = Document::new();
    let e1 = doc.insert_element(Rect::new(0.0, 0.0, 50.0, 50.0));
    let e2 = doc.insert_element(Rect::new(100.0, 0.0, 50.0, 50.0));
    let log1 = watch(&doc, e1);
    let log2 = watch(&doc, e2);
    let s1 = sensor(&doc, e1, 0, 0.0);
    let s2 = sensor(&doc, e2, 0, 0.0);

    send(&doc, PointerEvent::down(10.0, 10.0));
    send(&doc, PointerEvent::moved(120.0, 10.0));
    send(&doc, PointerEvent::up(120.0, 10.0));

    assert_eq!(log1.borrow().len(), 3);
    assert!(log2.borrow().is_empty());
    // The move over e2 is reported on e1, with e2 as the hit target.
    assert_eq!(log1.borrow()[1].1, Some(e2));
    assert!(!s1.is_dragging());
    assert!(!s2.is_dragging());
}

#[test]
fn detaching_every_sensor_leaves_no_listeners() {
    let doc = Document::new();
    let mut sensors: Vec<PointerSensor> = (0..4)
        .map(|i| {
            let el = doc.insert_element(Rect::new(f64::from(i) * 60.0, 0.0, 50.0, 50.0));
            sensor(&doc, el, 0, 5.0)
        })
        .collect();
    send(&doc, PointerEvent::down(10.0, 10.0));
    send(&doc, PointerEvent::moved(30.0, 10.0));
    assert!(doc.listener_count() > sensors.len());

    for s in &mut sensors {
        s.detach();
    }
    assert_eq!(doc.listener_count(), 0);
}

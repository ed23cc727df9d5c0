#![cfg(feature = "emitter")]

mod support;

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use schema_model::serde_json::json;
use schema_model::{ModelEmitter, ModelOptions};
use support::people::person;

#[test]
fn emitter_receives_direct_and_computed_changes() {
    let emitter = ModelEmitter::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    emitter.on("last_name", move |event| {
        sink.lock().unwrap().push((event.property, event.value));
    });
    let sink = Arc::clone(&seen);
    emitter.on("full_name", move |event| {
        sink.lock().unwrap().push((event.property, event.value));
    });

    let mut model = person(ModelOptions::default());
    model.subscribe_all(emitter.forwarder());
    model.set("last_name", "C").unwrap();

    // EventEmitter is async, give it time
    thread::sleep(Duration::from_millis(50));

    let mut seen = seen.lock().unwrap().clone();
    seen.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        seen,
        vec![
            ("full_name".to_string(), json!("A C")),
            ("last_name".to_string(), json!("C")),
        ]
    );
}

#[test]
fn immutable_sets_do_not_reach_the_emitter() {
    let emitter = ModelEmitter::new();
    let seen = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&seen);
    emitter.on("last_name", move |_| *sink.lock().unwrap() += 1);

    let mut model = person(ModelOptions::default().immutable(true));
    model.subscribe_all(emitter.forwarder());
    let _derived = model.set("last_name", "C").unwrap();

    thread::sleep(Duration::from_millis(50));
    assert_eq!(*seen.lock().unwrap(), 0);
}

// Browser-target smoke tests. Run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use rail_core::Rail;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn rail_constructs_from_setup_json() {
    let setup = r#"{
        "cards": [
            { "key": "orbat", "title": "Orbat", "summary": "s", "image_ref": "/l.png", "href": "/p/orbat/" }
        ]
    }"#;
    let rail = Rail::new(setup).expect("valid setup");
    assert_eq!(rail.active_index(), 0);
    assert_eq!(rail.progress_percent(), 100);
}

#[wasm_bindgen_test]
fn signal_batch_round_trips() {
    let mut rail = Rail::new(r#"{"cards":[]}"#).expect("valid setup");
    let out = rail
        .process_signals(r#"{"signals":[]}"#)
        .expect("valid batch");
    assert_eq!(out, "null");
}

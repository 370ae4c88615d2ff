#![cfg(target_arch = "wasm32")]
use serde_wasm_bindgen as swb;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;
use web_sys::{Document, Element};

use typewriter_core::TextSurface;
use typewriter_wasm::{abi_version, DomSurface, WebTypewriter};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn element(html: &str) -> Element {
    let doc = document();
    let host = doc.create_element("div").unwrap();
    host.set_inner_html(html);
    doc.body().unwrap().append_child(&host).unwrap();
    host.first_element_child().unwrap()
}

fn js(value: serde_json::Value) -> JsValue {
    swb::to_value(&value).unwrap()
}

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn it_should_keep_the_cursor_span() {
    let el = element(r#"<h1>Ronogamy.<span class="cursor"></span></h1>"#);
    let mut surface = DomSurface::bind(el.clone());
    assert_eq!(surface.read_text().as_deref(), Some("Ronogamy."));
    surface.write_text("Ron");
    assert_eq!(el.inner_html(), r#"Ron<span class="cursor"></span>"#);
}

#[wasm_bindgen_test]
fn it_should_flatten_plain_elements_to_one_text_node() {
    let el = element("<p>Hello <b>there</b></p>");
    let mut surface = DomSurface::bind(el.clone());
    assert_eq!(surface.read_text().as_deref(), Some("Hello there"));
    surface.write_text("Hel");
    assert_eq!(el.child_nodes().length(), 1);
    assert_eq!(el.text_content().as_deref(), Some("Hel"));
}

#[wasm_bindgen_test]
fn it_should_skip_elements_without_text() {
    let mut tw = WebTypewriter::new(None);
    let el = element("<span></span>");
    let id = tw
        .mount(el, JsValue::NULL, JsValue::UNDEFINED, js(serde_json::json!(["load"])))
        .unwrap();
    assert_eq!(id, None);
    assert!(tw.is_empty());
}

#[wasm_bindgen_test]
fn it_should_clear_on_mount_and_type_synchronously_on_play() {
    let mut tw = WebTypewriter::new(Some("debug".into()));
    let el = element(r#"<h1>Ronogamy.<span class="cursor"></span></h1>"#);
    let id = tw
        .mount(
            el.clone(),
            js(serde_json::json!(["Ronogamy.", "Aditya."])),
            js(serde_json::json!({ "speed": 80, "speedErasingMs": 60 })),
            js(serde_json::json!(["hover"])),
        )
        .unwrap()
        .expect("element has text");
    assert_eq!(tw.text(id).as_deref(), Some(""));
    assert_eq!(tw.state(id).as_deref(), Some("idle"));

    assert!(tw.play(id, 0).unwrap());
    assert_eq!(tw.state(id).as_deref(), Some("typing"));
    assert_eq!(tw.text(id).as_deref(), Some("R"));
    assert!(el.inner_html().starts_with('R'));

    // busy: ignored, not queued
    assert!(!tw.cycle(id, 1).unwrap());
    assert!(!tw.erase(id).unwrap());
    assert_eq!(tw.text(id).as_deref(), Some("R"));
}

#[wasm_bindgen_test]
fn it_should_reject_malformed_config() {
    let mut tw = WebTypewriter::new(None);
    let el = element("<p>text</p>");
    let res = tw.mount(
        el,
        JsValue::NULL,
        js(serde_json::json!({ "visibilityThreshold": 4.0 })),
        JsValue::UNDEFINED,
    );
    assert!(res.is_err());
}

#[wasm_bindgen_test]
fn it_should_mount_a_scene_by_selector() {
    let doc = document();
    let host = doc.create_element("section").unwrap();
    host.set_inner_html(
        r#"<h3 class="q-title">One</h3><h3 class="q-title">Two</h3><h3 class="q-title"></h3>"#,
    );
    doc.body().unwrap().append_child(&host).unwrap();

    let mut tw = WebTypewriter::new(None);
    let scene = serde_json::json!({
        "mounts": [{
            "selector": ".q-title",
            "preset": "heading",
            "triggers": ["visibility"],
            "stagger": { "stepMs": 200 }
        }]
    });
    let ids = tw.mount_scene(js(scene)).unwrap();
    // the empty heading has nothing to type
    assert_eq!(ids.len(), 2);
    for id in &ids {
        assert_eq!(tw.state(*id).as_deref(), Some("idle"));
    }

    assert!(tw.unmount(ids[0]));
    assert!(!tw.unmount(ids[0]));
    assert_eq!(tw.len(), 1);
    // unmounting leaves the element's text as it was
    let first = host.first_element_child().unwrap();
    assert_eq!(first.text_content().as_deref(), Some(""));
}

#[wasm_bindgen_test]
fn it_should_leave_nothing_mounted_when_a_scene_fails_part_way() {
    let doc = document();
    let host = doc.create_element("section").unwrap();
    host.set_inner_html(r#"<h2 class="banner">Welcome</h2>"#);
    doc.body().unwrap().append_child(&host).unwrap();

    let mut tw = WebTypewriter::new(None);
    let scene = serde_json::json!({
        "mounts": [
            { "selector": ".banner", "triggers": ["visibility", "hover"] },
            { "selector": "h2[", "triggers": ["load"] }
        ]
    });
    assert!(tw.mount_scene(js(scene)).is_err());
    assert!(tw.is_empty());
}

//! wasm-bindgen host for `typewriter-core`.
//!
//! `WebTypewriter` binds page elements to typewriters and drives them from
//! the browser: `DOMContentLoaded` for load triggers, `IntersectionObserver`
//! for visibility triggers, `mouseenter`/`mouseleave` for hover triggers, and
//! a single `setTimeout` pump for the shared clock.

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use js_sys::{Function, JSON};
use serde_wasm_bindgen as swb;
use typewriter_core::{AnimationState, Config, SceneSpec, Script, TargetId, Triggers};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

mod host;
mod logging;
mod surface;

pub use surface::DomSurface;

use host::{Inner, Shared};

/// Increment when the exported surface changes incompatibly.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn js_err(context: &str, e: impl Display) -> JsError {
    JsError::new(&format!("{context}: {e}"))
}

fn js_value_err(context: &str, e: JsValue) -> JsError {
    JsError::new(&format!("{context}: {e:?}"))
}

fn state_name(state: AnimationState) -> &'static str {
    match state {
        AnimationState::Idle => "idle",
        AnimationState::Typing => "typing",
        AnimationState::Erasing => "erasing",
    }
}

#[wasm_bindgen]
pub struct WebTypewriter {
    shared: Shared,
}

#[wasm_bindgen]
impl WebTypewriter {
    /// `log_level` is one of `off`, `error`, `warn` (default), `info`,
    /// `debug` or `trace`.
    #[wasm_bindgen(constructor)]
    pub fn new(log_level: Option<String>) -> WebTypewriter {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();
        logging::init(logging::parse_level(log_level.as_deref()));
        WebTypewriter {
            shared: Rc::new(RefCell::new(Inner::new())),
        }
    }

    /// Bind one element. `script` is an array of lines (or null to use the
    /// element's own text), `config` a partial config object, `triggers` an
    /// array such as `["load", "hover"]` (defaults to `["load"]`).
    ///
    /// Returns `undefined` when the element has no text to animate.
    pub fn mount(
        &mut self,
        element: Element,
        script: JsValue,
        config: JsValue,
        triggers: JsValue,
    ) -> Result<Option<u32>, JsError> {
        let script = if jsvalue_is_undefined_or_null(&script) {
            None
        } else {
            let lines: Vec<String> =
                swb::from_value(script).map_err(|e| js_err("script error", e))?;
            Some(Script::new(lines).map_err(|e| js_err("script error", e))?)
        };
        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            swb::from_value(config).map_err(|e| js_err("config error", e))?
        };
        let triggers: Triggers = if jsvalue_is_undefined_or_null(&triggers) {
            Triggers::load()
        } else {
            swb::from_value(triggers).map_err(|e| js_err("triggers error", e))?
        };

        let mounted = self.shared.borrow_mut().stage.mount(
            DomSurface::bind(element),
            script,
            cfg,
            triggers,
        );
        match mounted {
            Ok(id) => {
                if let Err(e) = host::wire(&self.shared, id) {
                    self.rollback(&[id]);
                    return Err(js_value_err("wire error", e));
                }
                Ok(Some(id.0))
            }
            Err(typewriter_core::TypewriterError::NoTextNode) => Ok(None),
            Err(e) => Err(js_err("mount error", e)),
        }
    }

    /// Mount every selector of a scene (object or JSON string) against the
    /// current document. Returns the ids in mount order.
    pub fn mount_scene(&mut self, scene: JsValue) -> Result<Vec<u32>, JsError> {
        if jsvalue_is_undefined_or_null(&scene) {
            return Err(JsError::new("mount_scene: scene is null/undefined"));
        }
        let json = match scene.as_string() {
            Some(s) => s,
            None => JSON::stringify(&scene)
                .map_err(|e| js_value_err("mount_scene stringify error", e))?
                .as_string()
                .ok_or_else(|| JsError::new("mount_scene: stringify produced non-string"))?,
        };
        let spec = SceneSpec::from_json(&json).map_err(|e| js_err("mount_scene parse error", e))?;
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsError::new("mount_scene: no document"))?;

        // A failing mount leaves nothing from this scene behind.
        let mut ids: Vec<TargetId> = Vec::new();
        for mount in &spec.mounts {
            let nodes = match document.query_selector_all(&mount.selector) {
                Ok(nodes) => nodes,
                Err(e) => {
                    self.rollback(&ids);
                    return Err(js_value_err("mount_scene selector error", e));
                }
            };
            let surfaces: Vec<DomSurface> = (0..nodes.length())
                .filter_map(|i| nodes.get(i))
                .filter_map(|n| n.dyn_into::<Element>().ok())
                .map(DomSurface::bind)
                .collect();
            let mounted = mount.mount_into(&mut self.shared.borrow_mut().stage, surfaces);
            let mounted = match mounted {
                Ok(mounted) => mounted,
                Err(e) => {
                    self.rollback(&ids);
                    return Err(js_err("mount_scene error", e));
                }
            };
            for (n, &id) in mounted.iter().enumerate() {
                if let Err(e) = host::wire(&self.shared, id) {
                    ids.extend_from_slice(&mounted[n..]);
                    self.rollback(&ids);
                    return Err(js_value_err("wire error", e));
                }
                ids.push(id);
            }
        }
        Ok(ids.into_iter().map(|id| id.0).collect())
    }

    /// Fire load triggers once the document has parsed.
    pub fn start(&mut self) -> Result<(), JsError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsError::new("start: no document"))?;
        host::start(&self.shared, &document).map_err(|e| js_value_err("start error", e))
    }

    /// Signal page readiness directly.
    pub fn ready(&mut self) {
        host::signal_ready(&self.shared);
    }

    pub fn play(&mut self, id: u32, index: usize) -> Result<bool, JsError> {
        host::drive(&self.shared, |inner| inner.stage.play(TargetId(id), index))
            .map_err(|e| js_err("play error", e))
    }

    pub fn erase(&mut self, id: u32) -> Result<bool, JsError> {
        host::drive(&self.shared, |inner| inner.stage.erase(TargetId(id)))
            .map_err(|e| js_err("erase error", e))
    }

    pub fn cycle(&mut self, id: u32, index: usize) -> Result<bool, JsError> {
        host::drive(&self.shared, |inner| inner.stage.cycle(TargetId(id), index))
            .map_err(|e| js_err("cycle error", e))
    }

    /// `"idle"`, `"typing"` or `"erasing"`; `undefined` for unknown ids.
    pub fn state(&self, id: u32) -> Option<String> {
        let inner = self.shared.borrow();
        inner
            .stage
            .state(TargetId(id))
            .map(|s| state_name(s).to_string())
    }

    pub fn text(&self, id: u32) -> Option<String> {
        let inner = self.shared.borrow();
        inner.stage.text(TargetId(id)).map(str::to_string)
    }

    /// Stop a target and drop its DOM hooks. The element keeps its text.
    pub fn unmount(&mut self, id: u32) -> bool {
        let removed = host::drive(&self.shared, |inner| {
            inner.stage.unmount(TargetId(id)).is_some()
        });
        host::forget(&self.shared, TargetId(id));
        removed
    }

    /// Drop idle targets whose element has left the document.
    pub fn prune(&mut self) {
        host::drive(&self.shared, |inner| inner.stage.prune_detached());
    }

    /// Receive every `TypewriterEvent` as a plain object, e.g.
    /// `{ type: "completed", target: 0, kind: "typing", text: "Aditya." }`.
    pub fn on_event(&mut self, callback: Option<Function>) {
        self.shared.borrow_mut().set_on_event(callback);
    }

    #[wasm_bindgen(getter)]
    pub fn len(&self) -> usize {
        self.shared.borrow().stage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.borrow().stage.is_empty()
    }
}

impl WebTypewriter {
    /// Undo mounts whose listeners could not all be installed.
    fn rollback(&self, ids: &[TargetId]) {
        for &id in ids {
            self.shared.borrow_mut().stage.unmount(id);
            host::forget(&self.shared, id);
        }
    }
}

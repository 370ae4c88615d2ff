//! Browser plumbing around a [`Stage`]: one `setTimeout` pump for the whole
//! stage, an `IntersectionObserver` per visibility target and pointer
//! listeners per hover target.
//!
//! No `RefCell` borrow is held across a call back into JS.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, warn};
use typewriter_core::{Outputs, Stage, TargetId, TypewriterEvent};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit,
};

use crate::surface::DomSurface;

pub(crate) type Shared = Rc<RefCell<Inner>>;

struct Observer {
    target: TargetId,
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(js_sys::Array)>,
}

struct PointerListeners {
    target: TargetId,
    element: Element,
    enter: Closure<dyn FnMut(Event)>,
    leave: Closure<dyn FnMut(Event)>,
}

pub(crate) struct Inner {
    pub(crate) stage: Stage<DomSurface>,
    origin: f64,
    timeout: Option<i32>,
    pump: Option<Closure<dyn FnMut()>>,
    observers: Vec<Observer>,
    pointers: Vec<PointerListeners>,
    on_ready: Option<Closure<dyn FnMut(Event)>>,
    ready_seen: bool,
    on_event: Option<js_sys::Function>,
}

impl Inner {
    pub(crate) fn new() -> Self {
        Self {
            stage: Stage::new(),
            origin: wall_clock(),
            timeout: None,
            pump: None,
            observers: Vec::new(),
            pointers: Vec::new(),
            on_ready: None,
            ready_seen: false,
            on_event: None,
        }
    }

    /// Milliseconds since this host was created.
    fn now(&self) -> u64 {
        (wall_clock() - self.origin).max(0.0) as u64
    }

    pub(crate) fn set_on_event(&mut self, callback: Option<js_sys::Function>) {
        self.on_event = callback;
    }

    fn release_observer(&mut self, target: TargetId) {
        self.observers.retain(|o| {
            if o.target == target {
                o.observer.disconnect();
                false
            } else {
                true
            }
        });
    }

    fn release_pointers(&mut self, target: TargetId) {
        self.pointers.retain(|p| {
            if p.target != target {
                return true;
            }
            for (name, cb) in [("mouseenter", &p.enter), ("mouseleave", &p.leave)] {
                let _ = p
                    .element
                    .remove_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
            }
            false
        });
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for o in self.observers.drain(..) {
            o.observer.disconnect();
        }
        let targets: Vec<TargetId> = self.pointers.iter().map(|p| p.target).collect();
        for t in targets {
            self.release_pointers(t);
        }
        if let (Some(handle), Some(window)) = (self.timeout.take(), web_sys::window()) {
            window.clear_timeout_with_handle(handle);
        }
    }
}

fn wall_clock() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Bring the stage clock up to wall time, run `f`, then dispatch whatever
/// happened and re-arm the pump.
pub(crate) fn drive<R>(shared: &Shared, f: impl FnOnce(&mut Inner) -> R) -> R {
    let (result, mut out) = {
        let mut inner = shared.borrow_mut();
        let now = inner.now();
        let out = inner.stage.advance_to(now);
        let result = f(&mut inner);
        (result, out)
    };
    out.events
        .extend(shared.borrow_mut().stage.take_outputs().events);
    dispatch(shared, out);
    reschedule(shared);
    result
}

fn pump(shared: &Shared) {
    let out = {
        let mut inner = shared.borrow_mut();
        inner.timeout = None;
        let now = inner.now();
        inner.stage.advance_to(now)
    };
    dispatch(shared, out);
    reschedule(shared);
}

fn reschedule(shared: &Shared) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let mut inner = shared.borrow_mut();
    if let Some(handle) = inner.timeout.take() {
        window.clear_timeout_with_handle(handle);
    }
    let Some(deadline) = inner.stage.next_deadline() else {
        return;
    };
    let wait = deadline.saturating_sub(inner.now()).min(i32::MAX as u64) as i32;

    if inner.pump.is_none() {
        let weak = Rc::downgrade(shared);
        inner.pump = Some(Closure::<dyn FnMut()>::new(move || {
            if let Some(shared) = weak.upgrade() {
                pump(&shared);
            }
        }));
    }
    let Some(callback) = inner.pump.as_ref() else {
        return;
    };
    match window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.as_ref().unchecked_ref(),
        wait,
    ) {
        Ok(handle) => inner.timeout = Some(handle),
        Err(err) => warn!("typewriter: setTimeout failed: {err:?}"),
    }
}

/// Release DOM hooks named by the events, then forward them to JS.
fn dispatch(shared: &Shared, out: Outputs) {
    if out.is_empty() {
        return;
    }
    let callback = {
        let mut inner = shared.borrow_mut();
        for event in &out.events {
            match event {
                TypewriterEvent::ObserverReleased { target } => inner.release_observer(*target),
                TypewriterEvent::Abandoned { target } => {
                    inner.release_observer(*target);
                    inner.release_pointers(*target);
                }
                _ => {}
            }
        }
        inner.on_event.clone()
    };
    let Some(callback) = callback else {
        return;
    };
    for event in &out.events {
        match serde_wasm_bindgen::to_value(event) {
            Ok(value) => {
                if let Err(err) = callback.call1(&JsValue::NULL, &value) {
                    warn!("typewriter: event callback threw: {err:?}");
                }
            }
            Err(err) => warn!("typewriter: could not encode {event:?}: {err}"),
        }
    }
}

/// Hook up the DOM side of a freshly mounted target.
pub(crate) fn wire(shared: &Shared, id: TargetId) -> Result<(), JsValue> {
    let (element, triggers, threshold) = {
        let inner = shared.borrow();
        let (Some(surface), Some(triggers), Some(tw)) = (
            inner.stage.surface(id),
            inner.stage.triggers(id),
            inner.stage.typewriter(id),
        ) else {
            return Ok(());
        };
        (
            surface.element().clone(),
            triggers,
            tw.config().visibility_threshold,
        )
    };

    if triggers.visibility {
        let weak = Rc::downgrade(shared);
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let ratio = entries
                .iter()
                .filter_map(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|e| e.intersection_ratio() as f32)
                .fold(0.0_f32, f32::max);
            drive(&shared, |inner| inner.stage.visibility(id, ratio));
        });
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(f64::from(threshold)));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        observer.observe(&element);
        shared.borrow_mut().observers.push(Observer {
            target: id,
            observer,
            _callback: callback,
        });
    }

    if triggers.hover {
        let enter = pointer_callback(Rc::downgrade(shared), id, true);
        let leave = pointer_callback(Rc::downgrade(shared), id, false);
        element.add_event_listener_with_callback("mouseenter", enter.as_ref().unchecked_ref())?;
        element.add_event_listener_with_callback("mouseleave", leave.as_ref().unchecked_ref())?;
        shared.borrow_mut().pointers.push(PointerListeners {
            target: id,
            element,
            enter,
            leave,
        });
    }

    if triggers.load && shared.borrow().ready_seen {
        drive(shared, |inner| inner.stage.ready());
    }
    Ok(())
}

fn pointer_callback(
    weak: Weak<RefCell<Inner>>,
    id: TargetId,
    enter: bool,
) -> Closure<dyn FnMut(Event)> {
    Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        drive(&shared, |inner| {
            if enter {
                inner.stage.pointer_enter(id)
            } else {
                inner.stage.pointer_leave(id)
            }
        });
    })
}

/// Drop the DOM hooks of a target that left the stage.
pub(crate) fn forget(shared: &Shared, id: TargetId) {
    let mut inner = shared.borrow_mut();
    inner.release_observer(id);
    inner.release_pointers(id);
}

/// Signal page readiness now, or once `DOMContentLoaded` fires.
pub(crate) fn start(shared: &Shared, document: &Document) -> Result<(), JsValue> {
    if document.ready_state() != "loading" {
        signal_ready(shared);
        return Ok(());
    }
    if shared.borrow().on_ready.is_some() {
        return Ok(());
    }
    let weak = Rc::downgrade(shared);
    let callback = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        if let Some(shared) = weak.upgrade() {
            signal_ready(&shared);
        }
    });
    document
        .add_event_listener_with_callback("DOMContentLoaded", callback.as_ref().unchecked_ref())?;
    shared.borrow_mut().on_ready = Some(callback);
    Ok(())
}

pub(crate) fn signal_ready(shared: &Shared) {
    debug!("typewriter: page ready");
    drive(shared, |inner| {
        inner.ready_seen = true;
        inner.stage.ready();
    });
}

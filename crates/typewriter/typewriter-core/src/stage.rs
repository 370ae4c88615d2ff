//! Stage: owns every mounted target and the shared virtual clock.
//!
//! Targets animate independently; the only thing they share is the timer
//! queue, which fires their ticks in `(due, scheduling order)`. Hosts call the
//! trigger entry points as signals arrive and call `advance`/`advance_to` to
//! move time forward.

use log::debug;

use crate::config::Config;
use crate::error::TypewriterError;
use crate::ids::{IdAllocator, TargetId};
use crate::outputs::{Outputs, TypewriterEvent};
use crate::script::Script;
use crate::surface::TextSurface;
use crate::timers::TimerQueue;
use crate::triggers::{Gate, HoverIntent, LoadGate, Triggers, VisibilityGate};
use crate::typewriter::{AnimationState, Fired, Host, Typewriter};

#[derive(Debug)]
struct Slot<S> {
    id: TargetId,
    surface: S,
    tw: Typewriter,
    triggers: Triggers,
    load: LoadGate,
    visibility: Option<VisibilityGate>,
}

impl<S> Slot<S> {
    fn observing(&self) -> bool {
        self.visibility.as_ref().is_some_and(|g| !g.is_spent())
    }
}

#[derive(Debug)]
pub struct Stage<S> {
    ids: IdAllocator,
    slots: Vec<Slot<S>>,
    timers: TimerQueue,
    outputs: Outputs,
}

impl<S: TextSurface> Default for Stage<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TextSurface> Stage<S> {
    pub fn new() -> Self {
        Self {
            ids: IdAllocator::new(),
            slots: Vec::new(),
            timers: TimerQueue::new(),
            outputs: Outputs::default(),
        }
    }

    /// Construct a typewriter over `surface`.
    ///
    /// Without a script the surface's text is captured as the only line. The
    /// surface is cleared before this returns.
    pub fn mount(
        &mut self,
        mut surface: S,
        script: Option<Script>,
        cfg: Config,
        triggers: Triggers,
    ) -> Result<TargetId, TypewriterError> {
        let id = self.ids.alloc_target();
        let visibility = triggers
            .visibility
            .then(|| VisibilityGate::new(cfg.visibility_threshold));
        let tw = Typewriter::new(id, &mut surface, script, cfg)?;
        debug!(
            "stage: mounted {id:?} with {} line(s), triggers {triggers:?}",
            tw.script().len()
        );
        self.slots.push(Slot {
            id,
            surface,
            tw,
            triggers,
            load: LoadGate::default(),
            visibility,
        });
        Ok(id)
    }

    /// Stop a target and hand its surface back. Visible text is left as is.
    pub fn unmount(&mut self, id: TargetId) -> Option<S> {
        let pos = self.slots.iter().position(|s| s.id == id)?;
        let mut slot = self.slots.remove(pos);
        slot.tw.stop(&mut self.timers);
        if slot.observing() {
            self.outputs
                .push_event(TypewriterEvent::ObserverReleased { target: id });
        }
        Some(slot.surface)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn targets(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.slots.iter().map(|s| s.id)
    }

    pub fn typewriter(&self, id: TargetId) -> Option<&Typewriter> {
        self.slots.iter().find(|s| s.id == id).map(|s| &s.tw)
    }

    pub fn surface(&self, id: TargetId) -> Option<&S> {
        self.slots.iter().find(|s| s.id == id).map(|s| &s.surface)
    }

    pub fn state(&self, id: TargetId) -> Option<AnimationState> {
        self.typewriter(id).map(Typewriter::state)
    }

    pub fn text(&self, id: TargetId) -> Option<&str> {
        self.typewriter(id).map(Typewriter::visible)
    }

    pub fn triggers(&self, id: TargetId) -> Option<Triggers> {
        self.slots.iter().find(|s| s.id == id).map(|s| s.triggers)
    }

    // ---- direct control ----

    pub fn play(&mut self, id: TargetId, index: usize) -> Result<bool, TypewriterError> {
        self.with_target(id, |tw, host| tw.play(index, host))?
    }

    pub fn play_after(
        &mut self,
        id: TargetId,
        index: usize,
        delay_ms: u64,
    ) -> Result<bool, TypewriterError> {
        self.with_target(id, |tw, host| tw.play_after(index, delay_ms, host))?
    }

    pub fn erase(&mut self, id: TargetId) -> Result<bool, TypewriterError> {
        self.with_target(id, |tw, host| tw.erase(host))
    }

    pub fn cycle(&mut self, id: TargetId, next: usize) -> Result<bool, TypewriterError> {
        self.with_target(id, |tw, host| tw.cycle(next, host))?
    }

    // ---- trigger entry points; these never fail ----

    /// Document-ready: start every load-triggered target once.
    pub fn ready(&mut self) {
        let ids: Vec<TargetId> = self
            .slots
            .iter_mut()
            .filter_map(|s| (s.triggers.load && s.load.fire() == Gate::Fire).then_some(s.id))
            .collect();
        for id in ids {
            let started = self.with_target(id, |tw, host| {
                let delay = tw.config().initial_delay_ms;
                tw.play_after(0, delay, host)
            });
            if let Ok(Ok(false)) = started {
                debug!("stage: load trigger for {id:?} ignored");
            }
        }
    }

    /// Intersection update with the visible fraction of the target.
    pub fn visibility(&mut self, id: TargetId, ratio: f32) {
        let Some(pos) = self.slots.iter().position(|s| s.id == id) else {
            return;
        };
        if !self.slots[pos].surface.is_attached() {
            // Observers report a final entry when their node leaves the page.
            self.slots[pos].tw.stop(&mut self.timers);
            self.abandon(pos);
            return;
        }
        let slot = &mut self.slots[pos];
        let Some(gate) = slot.visibility.as_mut() else {
            return;
        };
        if gate.is_spent() {
            return;
        }
        if slot.tw.has_run() {
            // Another trigger already animated this target.
            gate.spend();
            self.outputs
                .push_event(TypewriterEvent::ObserverReleased { target: id });
            return;
        }
        if gate.observe(ratio, !slot.tw.is_busy()) != Gate::Fire {
            return;
        }
        debug!("stage: {id:?} visible at {ratio:.2}");
        let delay = slot.tw.config().initial_delay_ms;
        let mut host = Host {
            surface: &mut slot.surface,
            timers: &mut self.timers,
            outputs: &mut self.outputs,
        };
        let _ = slot.tw.play_after(0, delay, &mut host);
        self.outputs
            .push_event(TypewriterEvent::ObserverReleased { target: id });
    }

    pub fn pointer_enter(&mut self, id: TargetId) {
        self.hover(id, HoverIntent::Enter);
    }

    pub fn pointer_leave(&mut self, id: TargetId) {
        self.hover(id, HoverIntent::Leave);
    }

    pub fn hover(&mut self, id: TargetId, intent: HoverIntent) {
        if !self.triggers(id).is_some_and(|t| t.hover) {
            return;
        }
        let wanted = intent.wanted_index();
        let result = self.with_target(id, |tw, host| {
            if tw.is_busy() || tw.settled_index() == Some(wanted) {
                return Ok(false);
            }
            tw.cycle(wanted, host)
        });
        match result {
            Ok(Ok(true)) => debug!("stage: {intent:?} on {id:?} -> line {wanted}"),
            Ok(Err(err)) => debug!("stage: {intent:?} on {id:?} ignored: {err}"),
            _ => {}
        }
    }

    // ---- clock ----

    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    pub fn next_deadline(&mut self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn advance(&mut self, dt_ms: u64) -> Outputs {
        let until = self.timers.now().saturating_add(dt_ms);
        self.advance_to(until)
    }

    /// Fire every timer due at or before `t` in order, then return the events
    /// collected since the previous call.
    pub fn advance_to(&mut self, t: u64) -> Outputs {
        while let Some(due) = self.timers.pop_due(t) {
            let Some(pos) = self.slots.iter().position(|s| s.id == due.owner) else {
                continue;
            };
            let slot = &mut self.slots[pos];
            let mut host = Host {
                surface: &mut slot.surface,
                timers: &mut self.timers,
                outputs: &mut self.outputs,
            };
            if slot.tw.fire(due.id, &mut host) == Fired::Detached {
                self.abandon(pos);
            }
        }
        self.timers.settle(t);
        self.take_outputs()
    }

    /// Drop idle targets whose surface left the page.
    pub fn prune_detached(&mut self) {
        let mut pos = 0;
        while pos < self.slots.len() {
            if self.slots[pos].surface.is_attached() {
                pos += 1;
            } else {
                self.slots[pos].tw.stop(&mut self.timers);
                self.abandon(pos);
            }
        }
    }

    pub fn take_outputs(&mut self) -> Outputs {
        std::mem::take(&mut self.outputs)
    }

    fn abandon(&mut self, pos: usize) {
        let slot = self.slots.remove(pos);
        debug!("stage: {:?} abandoned", slot.id);
        if slot.observing() {
            self.outputs
                .push_event(TypewriterEvent::ObserverReleased { target: slot.id });
        }
        self.outputs
            .push_event(TypewriterEvent::Abandoned { target: slot.id });
    }

    fn with_target<R>(
        &mut self,
        id: TargetId,
        f: impl FnOnce(&mut Typewriter, &mut Host<'_>) -> R,
    ) -> Result<R, TypewriterError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(TypewriterError::UnknownTarget(id))?;
        let mut host = Host {
            surface: &mut slot.surface,
            timers: &mut self.timers,
            outputs: &mut self.outputs,
        };
        Ok(f(&mut slot.tw, &mut host))
    }
}

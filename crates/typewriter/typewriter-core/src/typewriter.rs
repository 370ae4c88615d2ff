//! Typewriter: the per-target state machine.
//!
//! A typewriter owns one surface's visible text and at most one pending timer.
//! `play`/`erase`/`cycle` start runs; each run mutates the surface once per
//! tick and schedules exactly one follow-up timer, so character N is always
//! written before character N+1's timer exists.
//!
//! Calls that arrive while a run (or a delayed start, or a loop hold) is
//! pending are ignored rather than queued.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::TypewriterError;
use crate::ids::{TargetId, TimerId};
use crate::outputs::{Outputs, RunKind, TypewriterEvent};
use crate::script::{Line, Script};
use crate::surface::TextSurface;
use crate::timers::TimerQueue;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum AnimationState {
    Idle,
    Typing,
    Erasing,
}

/// Everything a typewriter touches outside itself for one call.
pub struct Host<'a> {
    pub surface: &'a mut dyn TextSurface,
    pub timers: &'a mut TimerQueue,
    pub outputs: &'a mut Outputs,
}

/// Result of handing a fired timer to its owner.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Fired {
    Progressed,
    /// Not the timer this typewriter is waiting on (cancelled or superseded).
    Stale,
    /// The surface left the page; the typewriter stopped for good.
    Detached,
}

#[derive(Clone, Debug)]
enum Run {
    Typing { index: usize, revealed: usize },
    Erasing { from: Line, remaining: usize },
}

#[derive(Copy, Clone, Debug)]
enum Step {
    Start(usize),
    Tick,
    /// Loop mode pause before erasing towards the given line.
    Hold(usize),
}

#[derive(Copy, Clone, Debug)]
struct Armed {
    timer: TimerId,
    step: Step,
}

enum Tick {
    Write(String, u64),
    Done,
}

#[derive(Debug)]
pub struct Typewriter {
    target: TargetId,
    script: Script,
    cfg: Config,
    run: Option<Run>,
    armed: Option<Armed>,
    then_play: Option<usize>,
    visible: String,
    settled: Option<usize>,
    runs_started: u64,
}

impl Typewriter {
    /// Take ownership of a surface's text.
    ///
    /// With no script the surface's current text becomes the only line. The
    /// visible text is cleared either way.
    pub fn new(
        target: TargetId,
        surface: &mut dyn TextSurface,
        script: Option<Script>,
        cfg: Config,
    ) -> Result<Self, TypewriterError> {
        let captured = surface.read_text().ok_or(TypewriterError::NoTextNode)?;
        cfg.validate()?;
        let script = match script {
            Some(script) => script,
            None => Script::new([captured])?,
        };
        surface.write_text("");
        Ok(Self {
            target,
            script,
            cfg,
            run: None,
            armed: None,
            then_play: None,
            visible: String::new(),
            settled: None,
            runs_started: 0,
        })
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn state(&self) -> AnimationState {
        match self.run {
            None => AnimationState::Idle,
            Some(Run::Typing { .. }) => AnimationState::Typing,
            Some(Run::Erasing { .. }) => AnimationState::Erasing,
        }
    }

    /// A run is active or a timer (delayed start, loop hold) is pending.
    pub fn is_busy(&self) -> bool {
        self.run.is_some() || self.armed.is_some()
    }

    /// Whether any run has started or been scheduled to start.
    pub fn has_run(&self) -> bool {
        self.runs_started > 0 || self.armed.is_some()
    }

    /// Text currently shown on the surface.
    pub fn visible(&self) -> &str {
        &self.visible
    }

    /// Script line fully displayed while idle, if any.
    pub fn settled_index(&self) -> Option<usize> {
        self.settled
    }

    pub fn play(&mut self, index: usize, host: &mut Host<'_>) -> Result<bool, TypewriterError> {
        self.play_after(index, 0, host)
    }

    /// Type `script[index]` starting `delay_ms` from now.
    pub fn play_after(
        &mut self,
        index: usize,
        delay_ms: u64,
        host: &mut Host<'_>,
    ) -> Result<bool, TypewriterError> {
        self.script.line(index)?;
        if !self.accepts("play", host) {
            return Ok(false);
        }
        if delay_ms == 0 {
            self.begin_typing(index, host);
        } else {
            let timer = host.timers.schedule_in(delay_ms, self.target);
            self.armed = Some(Armed {
                timer,
                step: Step::Start(index),
            });
            debug!(
                "typewriter {:?}: line {index} starts in {delay_ms}ms",
                self.target
            );
        }
        Ok(true)
    }

    /// Remove the visible text one grapheme per tick.
    pub fn erase(&mut self, host: &mut Host<'_>) -> bool {
        if !self.accepts("erase", host) {
            return false;
        }
        self.begin_erasing(host);
        true
    }

    /// Erase, then type `script[next]`. A no-op when already idle on `next`.
    pub fn cycle(&mut self, next: usize, host: &mut Host<'_>) -> Result<bool, TypewriterError> {
        self.script.line(next)?;
        if !self.accepts("cycle", host) {
            return Ok(false);
        }
        if self.settled == Some(next) {
            trace!("typewriter {:?}: already showing line {next}", self.target);
            return Ok(false);
        }
        self.then_play = Some(next);
        self.begin_erasing(host);
        Ok(true)
    }

    /// Handle a fired timer from the shared queue.
    pub fn fire(&mut self, timer: TimerId, host: &mut Host<'_>) -> Fired {
        let armed = match self.armed {
            Some(armed) if armed.timer == timer => armed,
            _ => return Fired::Stale,
        };
        self.armed = None;
        if !host.surface.is_attached() {
            debug!("typewriter {:?}: surface detached, stopping", self.target);
            self.stop(host.timers);
            return Fired::Detached;
        }
        match armed.step {
            Step::Start(index) => self.begin_typing(index, host),
            Step::Tick => self.advance_run(host),
            Step::Hold(next) => {
                self.then_play = Some(next);
                self.begin_erasing(host);
            }
        }
        Fired::Progressed
    }

    /// Drop any run and pending timer without touching the surface.
    pub fn stop(&mut self, timers: &mut TimerQueue) {
        if let Some(armed) = self.armed.take() {
            timers.cancel(armed.timer);
        }
        self.run = None;
        self.then_play = None;
    }

    fn accepts(&self, op: &str, host: &Host<'_>) -> bool {
        if self.is_busy() {
            debug!(
                "typewriter {:?}: {op} ignored while {:?}",
                self.target,
                self.state()
            );
            return false;
        }
        if !host.surface.is_attached() {
            debug!("typewriter {:?}: {op} ignored, surface detached", self.target);
            return false;
        }
        true
    }

    fn begin_typing(&mut self, index: usize, host: &mut Host<'_>) {
        self.run = Some(Run::Typing { index, revealed: 0 });
        self.settled = None;
        self.runs_started += 1;
        host.outputs.push_event(TypewriterEvent::Started {
            target: self.target,
            kind: RunKind::Typing,
            index: Some(index),
        });
        self.advance_run(host);
    }

    fn begin_erasing(&mut self, host: &mut Host<'_>) {
        let from = Line::new(self.visible.clone());
        let remaining = from.grapheme_len();
        self.run = Some(Run::Erasing { from, remaining });
        self.settled = None;
        self.runs_started += 1;
        host.outputs.push_event(TypewriterEvent::Started {
            target: self.target,
            kind: RunKind::Erasing,
            index: None,
        });
        self.advance_run(host);
    }

    fn advance_run(&mut self, host: &mut Host<'_>) {
        let tick = match &mut self.run {
            None => return,
            Some(Run::Typing { index, revealed }) => match self.script.line(*index) {
                Ok(line) if *revealed < line.grapheme_len() => {
                    *revealed += 1;
                    Tick::Write(
                        line.prefix(*revealed).to_string(),
                        self.cfg.speed_typing_ms,
                    )
                }
                _ => Tick::Done,
            },
            Some(Run::Erasing { from, remaining }) => {
                if *remaining > 0 {
                    *remaining -= 1;
                    Tick::Write(
                        from.prefix(*remaining).to_string(),
                        self.cfg.speed_erasing_ms,
                    )
                } else {
                    Tick::Done
                }
            }
        };

        match tick {
            Tick::Write(text, delay_ms) => {
                trace!("typewriter {:?}: {:?}", self.target, text);
                self.visible = text;
                host.surface.write_text(&self.visible);
                self.arm(Step::Tick, delay_ms, host.timers);
            }
            Tick::Done => self.finish(host),
        }
    }

    fn finish(&mut self, host: &mut Host<'_>) {
        match self.run.take() {
            Some(Run::Typing { index, .. }) => {
                self.settled = Some(index);
                host.outputs.push_event(TypewriterEvent::Completed {
                    target: self.target,
                    kind: RunKind::Typing,
                    text: self.visible.clone(),
                });
                debug!("typewriter {:?}: typed line {index}", self.target);
                if self.cfg.loop_script {
                    let next = (index + 1) % self.script.len();
                    self.arm(Step::Hold(next), self.cfg.hold_ms, host.timers);
                }
            }
            Some(Run::Erasing { .. }) => {
                host.outputs.push_event(TypewriterEvent::Completed {
                    target: self.target,
                    kind: RunKind::Erasing,
                    text: self.visible.clone(),
                });
                debug!("typewriter {:?}: erased", self.target);
                if let Some(next) = self.then_play.take() {
                    self.begin_typing(next, host);
                }
            }
            None => {}
        }
    }

    fn arm(&mut self, step: Step, delay_ms: u64, timers: &mut TimerQueue) {
        let timer = timers.schedule_in(delay_ms, self.target);
        self.armed = Some(Armed { timer, step });
    }
}

//! Output contracts from the stage.
//!
//! Text mutations go straight to each target's surface; Outputs only carries
//! the semantic events a host may want to react to (chaining follow-up work,
//! disconnecting observers, dropping listeners of abandoned targets).

use serde::{Deserialize, Serialize};

use crate::ids::TargetId;

/// Which direction a run moves the text.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Typing,
    Erasing,
}

/// Discrete signals emitted while triggers fire and time advances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum TypewriterEvent {
    /// A run began. `index` is the script line being typed; None for erasing.
    Started {
        target: TargetId,
        kind: RunKind,
        index: Option<usize>,
    },
    /// A run finished and the target went back to Idle (unless a follow-up
    /// run started in the same instant).
    Completed {
        target: TargetId,
        kind: RunKind,
        text: String,
    },
    /// The one-shot visibility trigger is spent; hosts should stop observing.
    ObserverReleased { target: TargetId },
    /// The surface was found detached; the target has been dropped.
    Abandoned { target: TargetId },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub events: Vec<TypewriterEvent>,
}

impl Outputs {
    #[inline]
    pub fn push_event(&mut self, event: TypewriterEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Completed events for one target, in order.
    pub fn completions(&self, target: TargetId) -> impl Iterator<Item = &TypewriterEvent> {
        self.events.iter().filter(move |e| {
            matches!(e, TypewriterEvent::Completed { target: t, .. } if *t == target)
        })
    }
}

//! Trigger adapters as plain state machines.
//!
//! Hosts translate their own signals (document ready, intersection ratios,
//! pointer enter/leave) into calls on [`crate::Stage`], which consults these
//! gates before starting runs.

use serde::{Deserialize, Serialize};

/// Signals a target reacts to.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TriggerKind>", into = "Vec<TriggerKind>")]
pub struct Triggers {
    pub load: bool,
    pub visibility: bool,
    pub hover: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Load,
    Visibility,
    Hover,
}

impl Triggers {
    pub const NONE: Triggers = Triggers {
        load: false,
        visibility: false,
        hover: false,
    };

    pub fn load() -> Self {
        Self {
            load: true,
            ..Self::NONE
        }
    }

    pub fn visibility() -> Self {
        Self {
            visibility: true,
            ..Self::NONE
        }
    }

    pub fn hover() -> Self {
        Self {
            hover: true,
            ..Self::NONE
        }
    }

    pub fn with_hover(mut self) -> Self {
        self.hover = true;
        self
    }
}

impl From<Vec<TriggerKind>> for Triggers {
    fn from(kinds: Vec<TriggerKind>) -> Self {
        let mut t = Triggers::NONE;
        for kind in kinds {
            match kind {
                TriggerKind::Load => t.load = true,
                TriggerKind::Visibility => t.visibility = true,
                TriggerKind::Hover => t.hover = true,
            }
        }
        t
    }
}

impl From<Triggers> for Vec<TriggerKind> {
    fn from(t: Triggers) -> Self {
        let mut kinds = Vec::new();
        if t.load {
            kinds.push(TriggerKind::Load);
        }
        if t.visibility {
            kinds.push(TriggerKind::Visibility);
        }
        if t.hover {
            kinds.push(TriggerKind::Hover);
        }
        kinds
    }
}

/// Decision from a one-shot gate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Gate {
    /// Start the animation now.
    Fire,
    /// Not yet; keep observing.
    Wait,
    /// Already fired; the observer can be released.
    Spent,
}

/// Fires once when the visible fraction reaches the threshold.
#[derive(Clone, Debug)]
pub struct VisibilityGate {
    threshold: f32,
    fired: bool,
}

impl VisibilityGate {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            fired: false,
        }
    }

    pub fn is_spent(&self) -> bool {
        self.fired
    }

    /// `ready` is false while the target is busy or has already animated.
    pub fn observe(&mut self, ratio: f32, ready: bool) -> Gate {
        if self.fired {
            return Gate::Spent;
        }
        if ready && ratio.is_finite() && ratio >= self.threshold {
            self.fired = true;
            return Gate::Fire;
        }
        Gate::Wait
    }

    /// Mark the gate used without firing, e.g. when another trigger ran first.
    pub fn spend(&mut self) {
        self.fired = true;
    }
}

/// One-shot gate for the document-ready signal.
#[derive(Clone, Debug, Default)]
pub struct LoadGate {
    fired: bool,
}

impl LoadGate {
    pub fn fire(&mut self) -> Gate {
        if self.fired {
            Gate::Spent
        } else {
            self.fired = true;
            Gate::Fire
        }
    }
}

/// Pointer transitions scoped to one target.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HoverIntent {
    Enter,
    Leave,
}

impl HoverIntent {
    /// Script line the pointer state asks for: the hover variant on enter,
    /// the default line on leave.
    pub fn wanted_index(self) -> usize {
        match self {
            HoverIntent::Enter => 1,
            HoverIntent::Leave => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_fire_visibility_once() {
        let mut gate = VisibilityGate::new(0.6);
        assert_eq!(gate.observe(0.3, true), Gate::Wait);
        assert_eq!(gate.observe(0.6, true), Gate::Fire);
        // scrolling away and back again
        assert_eq!(gate.observe(0.0, true), Gate::Spent);
        assert_eq!(gate.observe(0.9, true), Gate::Spent);
    }

    #[test]
    fn it_should_wait_while_target_not_ready() {
        let mut gate = VisibilityGate::new(0.6);
        assert_eq!(gate.observe(1.0, false), Gate::Wait);
        assert!(!gate.is_spent());
        assert_eq!(gate.observe(f32::NAN, true), Gate::Wait);
        assert_eq!(gate.observe(0.75, true), Gate::Fire);
    }

    #[test]
    fn it_should_fire_load_once() {
        let mut gate = LoadGate::default();
        assert_eq!(gate.fire(), Gate::Fire);
        assert_eq!(gate.fire(), Gate::Spent);
    }

    #[test]
    fn it_should_parse_trigger_lists() {
        let t: Triggers = serde_json::from_str(r#"["load", "hover"]"#).unwrap();
        assert_eq!(t, Triggers::load().with_hover());
        let back = serde_json::to_string(&Triggers::visibility()).unwrap();
        assert_eq!(back, r#"["visibility"]"#);
    }

    #[test]
    fn hover_maps_to_script_lines() {
        assert_eq!(HoverIntent::Enter.wanted_index(), 1);
        assert_eq!(HoverIntent::Leave.wanted_index(), 0);
    }
}

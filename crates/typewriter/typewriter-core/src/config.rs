//! Typewriter configuration and site presets.

use serde::{Deserialize, Serialize};

use crate::error::TypewriterError;

/// Per-target animation settings. Immutable once a target is mounted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Milliseconds between revealed characters.
    #[serde(alias = "speed")]
    pub speed_typing_ms: u64,
    /// Milliseconds between removed characters.
    pub speed_erasing_ms: u64,
    /// Delay before the first tick of a triggered run.
    #[serde(alias = "delay")]
    pub initial_delay_ms: u64,
    /// Visible fraction (0..=1) at which the visibility trigger fires.
    pub visibility_threshold: f32,
    /// Rotate through the script forever once the first run completes.
    #[serde(rename = "loop")]
    pub loop_script: bool,
    /// Pause between a completed reveal and the next erase in loop mode.
    pub hold_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed_typing_ms: 80,
            speed_erasing_ms: 60,
            initial_delay_ms: 0,
            visibility_threshold: 0.6,
            loop_script: false,
            hold_ms: 1500,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), TypewriterError> {
        if self.speed_typing_ms == 0 {
            return Err(invalid("speedTypingMs must be greater than zero"));
        }
        if self.speed_erasing_ms == 0 {
            return Err(invalid("speedErasingMs must be greater than zero"));
        }
        if self.loop_script && self.hold_ms == 0 {
            return Err(invalid("holdMs must be greater than zero in loop mode"));
        }
        let t = self.visibility_threshold;
        if !t.is_finite() || !(0.0..=1.0).contains(&t) {
            return Err(invalid(format!(
                "visibilityThreshold must be within 0..=1, got {t}"
            )));
        }
        Ok(())
    }

    /// Layer the `Some` fields of a partial config over this one.
    pub fn apply(mut self, patch: &ConfigPatch) -> Self {
        if let Some(v) = patch.speed_typing_ms {
            self.speed_typing_ms = v;
        }
        if let Some(v) = patch.speed_erasing_ms {
            self.speed_erasing_ms = v;
        }
        if let Some(v) = patch.initial_delay_ms {
            self.initial_delay_ms = v;
        }
        if let Some(v) = patch.visibility_threshold {
            self.visibility_threshold = v;
        }
        if let Some(v) = patch.loop_script {
            self.loop_script = v;
        }
        if let Some(v) = patch.hold_ms {
            self.hold_ms = v;
        }
        self
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.initial_delay_ms = delay_ms;
        self
    }
}

fn invalid(reason: impl Into<String>) -> TypewriterError {
    TypewriterError::InvalidConfig {
        reason: reason.into(),
    }
}

/// Partial config as it appears in scene JSON; unset keys keep the preset value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigPatch {
    #[serde(alias = "speed", skip_serializing_if = "Option::is_none")]
    pub speed_typing_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_erasing_ms: Option<u64>,
    #[serde(alias = "delay", skip_serializing_if = "Option::is_none")]
    pub initial_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility_threshold: Option<f32>,
    #[serde(rename = "loop", skip_serializing_if = "Option::is_none")]
    pub loop_script: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_ms: Option<u64>,
}

/// Cadences used by the site's call sites.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Name banner that swaps scripts on hover.
    Hero,
    /// Section headings revealed on scroll.
    Heading,
    /// Section descriptions, revealed after their headings.
    Paragraph,
    /// Slow single-shot intro line.
    Intro,
}

impl Preset {
    pub fn config(self) -> Config {
        let base = Config::default();
        match self {
            Preset::Hero => Config {
                speed_typing_ms: 80,
                speed_erasing_ms: 60,
                ..base
            },
            Preset::Heading => Config {
                speed_typing_ms: 70,
                ..base
            },
            Preset::Paragraph => Config {
                speed_typing_ms: 60,
                initial_delay_ms: 800,
                ..base
            },
            Preset::Intro => Config {
                speed_typing_ms: 110,
                ..base
            },
        }
    }
}

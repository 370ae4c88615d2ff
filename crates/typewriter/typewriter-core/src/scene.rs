//! Scene descriptions: which elements animate, with what cadence and triggers.
//!
//! A scene is plain JSON so page setup stays declarative:
//!
//! ```json
//! { "mounts": [
//!     { "selector": "#typewriter", "preset": "hero",
//!       "script": ["Ronogamy.", "Aditya."], "triggers": ["load", "hover"] },
//!     { "selector": ".quadrant-content h3", "preset": "heading",
//!       "triggers": ["visibility"], "stagger": { "stepMs": 200 } }
//! ] }
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigPatch, Preset};
use crate::error::TypewriterError;
use crate::ids::TargetId;
use crate::script::Script;
use crate::stage::Stage;
use crate::surface::TextSurface;
use crate::triggers::Triggers;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSpec {
    #[serde(default)]
    pub mounts: Vec<MountSpec>,
}

/// One selector's worth of targets sharing a script, config and triggers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountSpec {
    pub selector: String,
    /// Explicit lines; when absent each element's own text is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,
    #[serde(default)]
    pub config: ConfigPatch,
    #[serde(default)]
    pub triggers: Triggers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stagger: Option<Stagger>,
}

/// Delay of the n-th matched element: `base_ms + n * step_ms`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stagger {
    pub step_ms: u64,
    /// Defaults to the resolved config's own initial delay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_ms: Option<u64>,
}

impl SceneSpec {
    pub fn from_json(json: &str) -> Result<Self, TypewriterError> {
        let scene: SceneSpec = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn validate(&self) -> Result<(), TypewriterError> {
        for mount in &self.mounts {
            if mount.selector.trim().is_empty() {
                return Err(TypewriterError::Scene("mount with empty selector".into()));
            }
            mount.config_for(0).validate()?;
            mount.script()?;
        }
        Ok(())
    }
}

impl MountSpec {
    /// Preset, then explicit overrides, then the stagger for the n-th element.
    pub fn config_for(&self, nth: usize) -> Config {
        let mut cfg = self
            .preset
            .map(Preset::config)
            .unwrap_or_default()
            .apply(&self.config);
        if let Some(stagger) = self.stagger {
            let base = stagger.base_ms.unwrap_or(cfg.initial_delay_ms);
            cfg.initial_delay_ms = base.saturating_add((nth as u64).saturating_mul(stagger.step_ms));
        }
        cfg
    }

    pub fn script(&self) -> Result<Option<Script>, TypewriterError> {
        self.script.as_ref().map(Script::new).transpose()
    }

    /// Mount every surface matched by this spec, in document order.
    ///
    /// Surfaces without a text node are skipped silently; the returned ids
    /// cover the ones that mounted. On any other error nothing stays mounted.
    pub fn mount_into<S, I>(
        &self,
        stage: &mut Stage<S>,
        surfaces: I,
    ) -> Result<Vec<TargetId>, TypewriterError>
    where
        S: TextSurface,
        I: IntoIterator<Item = S>,
    {
        let script = self.script()?;
        let mut ids = Vec::new();
        for (nth, surface) in surfaces.into_iter().enumerate() {
            match stage.mount(surface, script.clone(), self.config_for(nth), self.triggers) {
                Ok(id) => ids.push(id),
                Err(TypewriterError::NoTextNode) => {}
                Err(err) => {
                    for id in ids {
                        stage.unmount(id);
                    }
                    return Err(err);
                }
            }
        }
        Ok(ids)
    }
}

//! Scene fixtures shared by the typewriter test suites.
//!
//! `fixtures/manifest.json` at the workspace root names each scene and the
//! file (relative to `fixtures/`) holding its JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const MANIFEST: &str = include_str!("../../../../fixtures/manifest.json");

#[derive(Debug, Deserialize)]
struct Manifest {
    scenes: BTreeMap<String, PathBuf>,
}

impl Manifest {
    fn parse() -> Result<Self> {
        serde_json::from_str(MANIFEST).context("fixtures/manifest.json is not a valid manifest")
    }
}

pub mod scenes {
    use super::*;

    /// Scene names in sorted order.
    pub fn keys() -> Vec<String> {
        Manifest::parse()
            .map(|m| m.scenes.into_keys().collect())
            .unwrap_or_default()
    }

    /// Raw JSON text of the named scene.
    pub fn json(name: &str) -> Result<String> {
        let manifest = Manifest::parse()?;
        let file = manifest
            .scenes
            .get(name)
            .with_context(|| format!("no scene fixture named '{name}'"))?;
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(file);
        fs::read_to_string(&path)
            .with_context(|| format!("reading scene fixture {}", path.display()))
    }
}

//! Shared ASF/AMC fixtures for tests and benches, resolved through
//! `fixtures/manifest.json` at the workspace root.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    skeletons: HashMap<String, String>,
    motions: HashMap<String, MotionEntry>,
}

#[derive(Debug, Deserialize)]
struct MotionEntry {
    path: String,
    /// Manifest key of the skeleton the motion was recorded against.
    skeleton: String,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

fn sorted_keys<T>(map: &HashMap<String, T>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}

pub mod skeletons {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.skeletons)
    }

    pub fn text(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.skeletons, "skeleton", name)?;
        read_to_string(rel)
    }

    /// Fixture split into lines, as a caller holding line sequences would pass it.
    pub fn lines(name: &str) -> Result<Vec<String>> {
        Ok(text(name)?.lines().map(str::to_string).collect())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.skeletons, "skeleton", name)?;
        Ok(resolve_path(rel))
    }
}

pub mod motions {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.motions)
    }

    pub fn text(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.motions, "motion", name)?;
        read_to_string(&entry.path)
    }

    pub fn lines(name: &str) -> Result<Vec<String>> {
        Ok(text(name)?.lines().map(str::to_string).collect())
    }

    /// Skeleton manifest key the motion belongs to.
    pub fn skeleton(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.motions, "motion", name)?;
        Ok(entry.skeleton.clone())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.motions, "motion", name)?;
        Ok(resolve_path(&entry.path))
    }
}

//! Payload loading from a data directory
//!
//! The planning system's four responses are expected as JSON files next to
//! each other; [`InputConfig`] names them.

use std::path::Path;

use anyhow::{Context, Result};
use hourgrid_core::ScheduleInput;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::InputConfig;

/// Read all four payloads from `dir`
pub fn load_input(dir: &Path, files: &InputConfig) -> Result<ScheduleInput> {
    if !dir.is_dir() {
        anyhow::bail!("data directory {} does not exist", dir.display());
    }

    let input = ScheduleInput {
        settings: read_json(&dir.join(&files.settings))?,
        machines: read_json(&dir.join(&files.machines))?,
        jobs: read_json(&dir.join(&files.jobs))?,
        resources: read_json(&dir.join(&files.resources))?,
    };

    debug!(
        machines = input.machines.resources.len(),
        jobs = input.jobs.len(),
        calendars = input.resources.len(),
        "loaded payloads"
    );
    Ok(input)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("malformed JSON in {}", path.display()))
}

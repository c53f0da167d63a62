use std::{fs, path::Path};

use anyhow::Context;

use spotter_domain::Settings;

/// Missing fields are set to their defaults.
pub fn parse(json: &str) -> Result<Settings, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn load(path: &Path) -> anyhow::Result<Settings> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    parse(&json).with_context(|| format!("failed to parse settings file {}", path.display()))
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Configuration serialization and deserialization.
//!
//! Config files are JSON or YAML, chosen by file extension.

use crate::config::Config;
use anyhow::{bail, Context, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

fn format_of(path: &Path) -> Result<Format> {
    let extension = path.extension().and_then(|s| s.to_str());
    match extension {
        Some("json") => Ok(Format::Json),
        Some("yaml") | Some("yml") => Ok(Format::Yaml),
        _ => bail!("Unsupported config file extension: {:?}", extension),
    }
}

/// Export a configuration, picking the format from the extension.
pub fn export_config(config: &Config, path: &Path) -> Result<()> {
    let text = match format_of(path)? {
        Format::Json => serde_json::to_string_pretty(config)?,
        Format::Yaml => serde_yaml::to_string(config)?,
    };
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Import a configuration, picking the format from the extension.
pub fn import_config(path: &Path) -> Result<Config> {
    let format = format_of(path)?;
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = match format {
        Format::Json => serde_json::from_str(&text)
            .with_context(|| format!("parsing JSON config {}", path.display()))?,
        Format::Yaml => serde_yaml::from_str(&text)
            .with_context(|| format!("parsing YAML config {}", path.display()))?,
    };
    Ok(config)
}

/// Load the configuration at `path`, or the defaults when it does not exist.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        log::warn!(
            "Config file {} not found, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }
    let config = import_config(path)?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::util;

/// Manifests reordered when neither the command line nor a config file lists
/// any. Relative to the working directory, which is normally the device tree's
/// `configs/scripts` directory.
pub const DEFAULT_MANIFESTS: &[&str] = &["../proprietary-files.txt"];

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReorderConfig {
    /// Manifest paths. Relative paths are relative to the config file.
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub reorder: ReorderConfig,
}

impl Config {
    /// Manifest paths with relative entries resolved against `base_dir`.
    pub fn manifest_paths(&self, base_dir: &Path) -> Vec<PathBuf> {
        self.reorder
            .files
            .iter()
            .map(|p| base_dir.join(p))
            .collect()
    }
}

pub fn parse_config(contents: &str) -> Result<Config> {
    Ok(toml_edit::de::from_str(contents)?)
}

/// Load a config file and return it along with the directory that relative
/// paths inside it are resolved against.
pub fn load_config(path: &Path) -> Result<(Config, PathBuf)> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read config: {path:?}"))?;
    let config =
        parse_config(&contents).with_context(|| format!("Failed to parse config: {path:?}"))?;

    Ok((config, util::parent_path(path).to_owned()))
}

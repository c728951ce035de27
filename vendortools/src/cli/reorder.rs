// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::{
    ffi::OsStr,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::{
    config::{self, DEFAULT_MANIFESTS},
    format::manifest::Manifest,
    util,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReorderStatus {
    /// The path does not refer to a regular file.
    NotFound,
    /// The file was rewritten, but it was already in canonical order.
    Unchanged,
    /// The file was rewritten with a different line order or formatting.
    Reordered,
}

/// Atomically replace the contents of `path`, keeping its permissions.
fn replace_file(path: &Path, data: &[u8]) -> Result<()> {
    let permissions = fs::metadata(path)
        .with_context(|| format!("Failed to stat file: {path:?}"))?
        .permissions();

    let mut temp_writer = NamedTempFile::with_prefix_in(
        path.file_name()
            .unwrap_or_else(|| OsStr::new("vendortools.tmp")),
        util::parent_path(path),
    )
    .with_context(|| format!("Failed to create temporary file for: {path:?}"))?;
    let temp_path = temp_writer.path().to_owned();

    temp_writer
        .write_all(data)
        .with_context(|| format!("Failed to write temporary file: {temp_path:?}"))?;

    // NamedTempFile forces 600 permissions on temp files.
    temp_writer
        .as_file()
        .set_permissions(permissions)
        .with_context(|| format!("Failed to set permissions: {temp_path:?}"))?;

    temp_writer.persist(path).with_context(|| {
        format!("Failed to move temporary file to output path: {temp_path:?} -> {path:?}")
    })?;

    Ok(())
}

/// Sort the sections of the manifest at `path` in place. A missing file is not
/// an error so that a batch of manifests can continue past it.
pub fn reorder_file(path: &Path) -> Result<ReorderStatus> {
    if !path.is_file() {
        warn!("File {path:?} not found");
        return Ok(ReorderStatus::NotFound);
    }

    // Write through symlinks instead of replacing them.
    let real_path =
        fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {path:?}"))?;
    if real_path != path {
        debug!("Resolved {path:?} to {real_path:?}");
    }

    let data = fs::read_to_string(&real_path)
        .with_context(|| format!("Failed to read manifest: {real_path:?}"))?;

    let mut manifest = Manifest::parse(&data);
    debug!(
        "Sorting {} lines in {} sections: {path:?}",
        manifest.num_lines(),
        manifest.sections.len(),
    );
    manifest.sort();

    let new_data = manifest.to_string();
    let status = if new_data == data {
        ReorderStatus::Unchanged
    } else {
        ReorderStatus::Reordered
    };

    replace_file(&real_path, new_data.as_bytes())
        .with_context(|| format!("Failed to write manifest: {real_path:?}"))?;

    Ok(status)
}

/// Pick the manifests to process: explicit arguments first, then the config
/// file, then the built-in defaults.
fn manifest_paths(cli: &ReorderCli) -> Result<Vec<PathBuf>> {
    if !cli.files.is_empty() {
        return Ok(cli.files.clone());
    }

    if let Some(path) = &cli.config {
        let (config, base_dir) = config::load_config(path)?;
        let paths = config.manifest_paths(&base_dir);

        if !paths.is_empty() {
            return Ok(paths);
        }

        debug!("No manifests listed in config: {path:?}");
    }

    Ok(DEFAULT_MANIFESTS.iter().map(PathBuf::from).collect())
}

pub fn reorder_main(cli: &ReorderCli) -> Result<()> {
    for path in manifest_paths(cli)? {
        match reorder_file(&path)? {
            ReorderStatus::NotFound => {}
            ReorderStatus::Unchanged => info!("Already sorted: {path:?}"),
            ReorderStatus::Reordered => info!("Sorted: {path:?}"),
        }
    }

    Ok(())
}

/// Sort the entries of proprietary files manifests.
///
/// Within each blank-line-separated section, entries in subdirectories are
/// listed before the entries of their parent directories. Everything else is
/// sorted bytewise. A leading `-` is ignored for ordering.
#[derive(Debug, Parser)]
pub struct ReorderCli {
    /// Manifest files to sort in place.
    ///
    /// If omitted, the files listed in the config file are used, or
    /// `../proprietary-files.txt` if there is no config file.
    #[arg(value_name = "FILE", value_parser)]
    pub files: Vec<PathBuf>,

    /// Path to TOML config file listing manifests under `reorder.files`.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub config: Option<PathBuf>,
}

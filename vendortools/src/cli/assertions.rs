// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::{
    fs::{File, OpenOptions},
    io::{self, BufReader, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use zip::ZipArchive;

use crate::releasetools::{self, EdifyScript};

fn open_target_files(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let reader = File::open(path)
        .map(BufReader::new)
        .with_context(|| format!("Failed to open for reading: {path:?}"))?;

    ZipArchive::new(reader).with_context(|| format!("Failed to read zip: {path:?}"))
}

/// Append the generated commands to `path`, creating it if needed.
fn append_to_script(path: &Path, script: &EdifyScript) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open for appending: {path:?}"))?;

    file.write_all(script.to_string().as_bytes())
        .with_context(|| format!("Failed to write script: {path:?}"))?;

    Ok(())
}

fn write_script(script: &EdifyScript, output: Option<&Path>) -> Result<()> {
    if script.is_empty() {
        info!("No assertions required");
        return Ok(());
    }

    info!("Generated {} assertions", script.commands().len());

    match output {
        Some(path) => append_to_script(path, script),
        None => {
            io::stdout()
                .write_all(script.to_string().as_bytes())
                .context("Failed to write script to stdout")?;
            Ok(())
        }
    }
}

pub fn assertions_main(cli: &AssertionsCli) -> Result<()> {
    let mut script = EdifyScript::new();

    let output_group = match &cli.command {
        AssertionsCommand::Full(c) => {
            let mut input_zip = open_target_files(&c.input)?;

            releasetools::full_ota_assertions(&mut input_zip, &mut script)
                .with_context(|| format!("Failed to generate assertions: {:?}", c.input))?;

            &c.output
        }
        AssertionsCommand::Incremental(c) => {
            let mut target_zip = open_target_files(&c.target)?;

            releasetools::incremental_ota_assertions(&mut target_zip, &mut script)
                .with_context(|| format!("Failed to generate assertions: {:?}", c.target))?;

            &c.output
        }
    };

    write_script(&script, output_group.output.as_deref())
}

#[derive(Debug, Args)]
pub struct OutputGroup {
    /// Updater script to append the assertions to.
    ///
    /// If omitted, the assertions are written to stdout.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub output: Option<PathBuf>,
}

/// Generate assertions for a full OTA.
#[derive(Debug, Parser)]
pub struct FullCli {
    /// Path to input target files zip.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub input: PathBuf,

    #[command(flatten)]
    pub output: OutputGroup,
}

/// Generate assertions for an incremental OTA.
#[derive(Debug, Parser)]
pub struct IncrementalCli {
    /// Path to target build's target files zip.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub target: PathBuf,

    #[command(flatten)]
    pub output: OutputGroup,
}

#[derive(Debug, Subcommand)]
enum AssertionsCommand {
    Full(FullCli),
    Incremental(IncrementalCli),
}

/// Generate firmware and vendor version assertions for an updater script.
///
/// The versions are read from `OTA/android-info.txt` in a target files zip.
#[derive(Debug, Parser)]
pub struct AssertionsCli {
    #[command(subcommand)]
    command: AssertionsCommand,
}

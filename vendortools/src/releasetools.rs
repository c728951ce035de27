// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

//! Device-specific hooks for the OTA packaging tool. These add assertions to
//! the updater script so that a package refuses to install on top of firmware
//! or vendor images older than the ones it was built against.

use std::{
    fmt,
    io::{self, Read, Seek},
};

use thiserror::Error;
use tracing::debug;
use zip::{ZipArchive, result::ZipError};

use crate::format::android_info::{self, AndroidInfo, PATH_ANDROID_INFO, Requirement};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing entry in target files zip: {0}")]
    MissingEntry(String),
    #[error("Expected vendor version to be <build date>,<VNDK version>: {0:?}")]
    InvalidVendorVersion(String),
    #[error("Failed to parse android-info.txt")]
    AndroidInfo(#[from] android_info::Error),
    #[error("Zip error")]
    Zip(#[source] ZipError),
    #[error("I/O error")]
    Io(#[from] io::Error),
}

type Result<T> = std::result::Result<T, Error>;

/// Read access to the entries of a target files zip.
pub trait TargetFiles {
    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>>;
}

impl<R: Read + Seek> TargetFiles for ZipArchive<R> {
    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut reader = self.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => Error::MissingEntry(name.to_owned()),
            e => Error::Zip(e),
        })?;

        let mut buf = vec![];
        reader.read_to_end(&mut buf)?;

        Ok(buf)
    }
}

/// An updater script that commands can be appended to.
pub trait Script {
    fn append_extra(&mut self, command: &str);
}

/// Commands destined for an edify updater script, in the order they were
/// appended.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdifyScript {
    commands: Vec<String>,
}

impl EdifyScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Script for EdifyScript {
    fn append_extra(&mut self, command: &str) {
        self.commands.push(command.to_owned());
    }
}

/// One command per line.
impl fmt::Display for EdifyScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            writeln!(f, "{command}")?;
        }

        Ok(())
    }
}

/// Values containing a wildcard or nothing at all can't be checked on device.
fn is_checkable(value: &str) -> bool {
    !value.is_empty() && !value.contains('*')
}

fn read_android_info(target_files: &mut impl TargetFiles) -> Result<AndroidInfo> {
    target_files
        .read_entry(PATH_ANDROID_INFO)
        .map(AndroidInfo::new)
}

/// Require the modem firmware listed in `android-info.txt`.
pub fn add_modem_assertion(
    target_files: &mut impl TargetFiles,
    script: &mut impl Script,
) -> Result<()> {
    let info = read_android_info(target_files)?;

    let (Some(timestamp), Some(firmware_version)) = (
        info.get(Requirement::Modem)?,
        info.get(Requirement::Miui)?,
    ) else {
        debug!("No modem or MIUI version requirement");
        return Ok(());
    };

    if !is_checkable(timestamp) || !is_checkable(firmware_version) {
        debug!("Skipping modem assertion: {timestamp:?}, {firmware_version:?}");
        return Ok(());
    }

    script.append_extra(&format!(
        "assert(xiaomi.verify_modem(\"{timestamp}\") == \"1\" || \
        abort(\"ERROR: This package requires firmware from MIUI {firmware_version} \
        developer build or newer. Please upgrade firmware and retry!\"););"
    ));

    Ok(())
}

/// Require the vendor image listed in `android-info.txt`.
pub fn add_vendor_assertion(
    target_files: &mut impl TargetFiles,
    script: &mut impl Script,
) -> Result<()> {
    let info = read_android_info(target_files)?;

    let (Some(vendor_version), Some(firmware_version)) = (
        info.get(Requirement::Vendor)?,
        info.get(Requirement::Miui)?,
    ) else {
        debug!("No vendor or MIUI version requirement");
        return Ok(());
    };

    if !is_checkable(vendor_version) || !is_checkable(firmware_version) {
        debug!("Skipping vendor assertion: {vendor_version:?}, {firmware_version:?}");
        return Ok(());
    }

    let mut pieces = vendor_version.split(',');
    let (Some(build_date_utc), Some(vndk_version), None) =
        (pieces.next(), pieces.next(), pieces.next())
    else {
        return Err(Error::InvalidVendorVersion(vendor_version.to_owned()));
    };

    script.append_extra(&format!(
        "assert(xiaomi.verify_vendor(\"{build_date_utc}\", \"{vndk_version}\") == \"1\" || \
        abort(\"ERROR: This package requires vendor from MIUI {firmware_version} \
        developer build or newer. Please upgrade vendor image along with matching \
        firmware and retry!\"););"
    ));

    Ok(())
}

/// Hook for full OTAs. Assertions are based on the input target files.
pub fn full_ota_assertions(
    input_zip: &mut impl TargetFiles,
    script: &mut impl Script,
) -> Result<()> {
    add_modem_assertion(input_zip, script)?;
    add_vendor_assertion(input_zip, script)?;

    Ok(())
}

/// Hook for incremental OTAs. Assertions are based on the target build, since
/// that is what the device ends up running.
pub fn incremental_ota_assertions(
    target_zip: &mut impl TargetFiles,
    script: &mut impl Script,
) -> Result<()> {
    add_modem_assertion(target_zip, script)?;
    add_vendor_assertion(target_zip, script)?;

    Ok(())
}

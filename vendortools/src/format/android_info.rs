// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::{str, sync::LazyLock};

use regex::bytes::Regex;
use thiserror::Error;

/// Location of `android-info.txt` inside a target files zip.
pub const PATH_ANDROID_INFO: &str = "OTA/android-info.txt";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Value of {0:?} is not valid UTF-8")]
    InvalidUtf8(&'static str, #[source] str::Utf8Error),
}

type Result<T> = std::result::Result<T, Error>;

/// The `require <key>=<value>` lines that the release tools care about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// Modem firmware build timestamp.
    Modem,
    /// Vendor image build date and VNDK version, separated by a comma.
    Vendor,
    /// MIUI release that the firmware was taken from.
    Miui,
}

// `\s` and `.` are ASCII-only because the unicode regex features are disabled.
static MODEM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)require\s+version-modem\s*=\s*(.+)").expect("Invalid modem regex")
});
static VENDOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)require\s+version-vendor\s*=\s*(.+)").expect("Invalid vendor regex")
});
static MIUI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)require\s+version-miui\s*=\s*(.+)").expect("Invalid MIUI regex")
});

impl Requirement {
    pub fn key(self) -> &'static str {
        match self {
            Self::Modem => "version-modem",
            Self::Vendor => "version-vendor",
            Self::Miui => "version-miui",
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            Self::Modem => &MODEM_REGEX,
            Self::Vendor => &VENDOR_REGEX,
            Self::Miui => &MIUI_REGEX,
        }
    }
}

/// Raw contents of an `android-info.txt` file.
#[derive(Clone, Debug)]
pub struct AndroidInfo {
    data: Vec<u8>,
}

impl AndroidInfo {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    /// Find the value of the first line matching `require <key>=<value>`.
    /// Trailing whitespace is removed from the value. The value may be empty if
    /// it consisted only of whitespace.
    pub fn get(&self, requirement: Requirement) -> Result<Option<&str>> {
        let Some(captures) = requirement.regex().captures(&self.data) else {
            return Ok(None);
        };

        let value = str::from_utf8(captures.get(1).expect("group 1 always participates").as_bytes())
            .map_err(|e| Error::InvalidUtf8(requirement.key(), e))?;

        Ok(Some(value.trim_end()))
    }
}

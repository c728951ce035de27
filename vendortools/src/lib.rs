// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

//! Build and release helpers for an Android device tree.
//!
//! The library is split the same way as the CLI: [`format::manifest`] keeps
//! proprietary file lists in canonical order and [`releasetools`] generates the
//! updater script assertions that the OTA packaging tool asks the device tree
//! for. Only the CLI is considered a stable interface.

pub mod cli;
pub mod config;
pub mod format;
pub mod releasetools;
pub mod util;

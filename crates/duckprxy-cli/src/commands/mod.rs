// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! CLI command implementations.

pub mod demo;
pub mod explain;

use camino::{Utf8Path, Utf8PathBuf};
use duckprxy_core::ProxyConfig;
use miette::{IntoDiagnostic, Result};

/// Load the configuration from `path`, or from `duckprxy.toml` in the
/// current directory, or fall back to the defaults.
pub fn load_config(path: Option<&Utf8Path>) -> Result<ProxyConfig> {
    if let Some(path) = path {
        return Ok(ProxyConfig::load(path)?);
    }
    let cwd = std::env::current_dir().into_diagnostic()?;
    let cwd = Utf8PathBuf::try_from(cwd).into_diagnostic()?;
    Ok(ProxyConfig::find(&cwd)?.unwrap_or_default())
}

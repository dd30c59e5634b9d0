// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Proxy configuration.
//!
//! **DDD Context:** Configuration
//!
//! Parses optional `duckprxy.toml` files:
//!
//! ```toml
//! host = "precompiled"
//! on-ambiguity = "reject"
//! cache-descriptors = true
//! max-subdelegate-depth = 16
//! ```
//!
//! Every key is optional; unknown keys are rejected.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::error::ConfigError;

/// Name of the configuration file looked up by [`ProxyConfig::find`].
pub const CONFIG_FILE_NAME: &str = "duckprxy.toml";

/// Which host materializes proxies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKind {
    /// Resolve on every call.
    #[default]
    Dynamic,
    /// Resolve every interface method once, when the proxy is built.
    Precompiled,
}

/// What to do when a class declares a dispatch role more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguityPolicy {
    /// Log a warning; the later declaration in enumeration order wins.
    #[default]
    Warn,
    /// Fail the class description.
    Reject,
}

/// Settings shared by every proxy a [`crate::ProxyFactory`] builds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProxyConfig {
    pub host: HostKind,
    pub on_ambiguity: AmbiguityPolicy,
    /// Memoize descriptors and strategy chains per delegate class.
    pub cache_descriptors: bool,
    /// Bound on nested sub-delegate recursion for a single call.
    pub max_subdelegate_depth: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: HostKind::Dynamic,
            on_ambiguity: AmbiguityPolicy::Warn,
            cache_descriptors: true,
            max_subdelegate_depth: 32,
        }
    }
}

impl ProxyConfig {
    /// Parse a configuration from TOML source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on invalid TOML, wrong value types, or
    /// unknown keys.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if its contents are invalid.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Look for `duckprxy.toml` in `dir` and load it if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn find(dir: &Utf8Path) -> Result<Option<Self>, ConfigError> {
        let path: Utf8PathBuf = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path).map(Some)
        } else {
            Ok(None)
        }
    }

    #[must_use]
    pub fn with_host(mut self, host: HostKind) -> Self {
        self.host = host;
        self
    }

    #[must_use]
    pub fn with_ambiguity_policy(mut self, policy: AmbiguityPolicy) -> Self {
        self.on_ambiguity = policy;
        self
    }
}

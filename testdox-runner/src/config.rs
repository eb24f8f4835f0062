// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporter configuration.
//!
//! Defaults are embedded in the binary (see `default-config.toml`). A user
//! config file may override any subset of them.

use crate::errors::ConfigError;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::{collections::BTreeSet, io, time::Duration};
use tracing::{debug, warn};

/// The path, relative to the current directory, searched for a config file
/// when none is specified explicitly.
pub const DEFAULT_CONFIG_PATH: &str = ".config/testdox.toml";

/// Specifies where to load configuration from.
#[derive(Clone, Copy, Debug)]
pub enum ConfigLocation<'a> {
    /// Look for [`DEFAULT_CONFIG_PATH`] under the given directory, using only
    /// the embedded defaults if it doesn't exist.
    Default {
        /// The directory to search in.
        cwd: &'a Utf8Path,
    },

    /// Use only the embedded defaults.
    Isolated,

    /// Load from an explicit path. Returns an error if the file does not
    /// exist.
    Explicit(&'a Utf8Path),
}

/// Resolved reporter configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReporterConfig {
    /// Whether details of benign outcomes (incomplete, risky, skipped) are
    /// shown.
    pub verbose: bool,

    /// Thresholds for highlighting slow tests.
    pub runtime: RuntimeThresholds,
}

/// Thresholds above which a test's runtime is highlighted.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RuntimeThresholds {
    /// Runtimes above this are shown in yellow.
    #[serde(with = "humantime_serde")]
    pub slow: Duration,

    /// Runtimes above this are shown in red.
    #[serde(with = "humantime_serde")]
    pub very_slow: Duration,
}

impl Default for RuntimeThresholds {
    fn default() -> Self {
        Self {
            slow: Duration::from_secs(1),
            very_slow: Duration::from_secs(5),
        }
    }
}

impl ReporterConfig {
    /// The embedded default config TOML.
    const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Returns the embedded defaults.
    ///
    /// Panics if the embedded TOML is invalid.
    pub fn from_embedded() -> Self {
        let config: DefaultConfig =
            toml::from_str(Self::DEFAULT_CONFIG).expect("embedded default config should be valid");
        Self {
            verbose: config.reporter.verbose,
            runtime: config.reporter.runtime,
        }
    }

    /// Loads configuration from the given location, layered over the
    /// embedded defaults.
    pub fn load(location: ConfigLocation<'_>) -> Result<Self, ConfigError> {
        let mut config = Self::from_embedded();

        let user_config = match location {
            ConfigLocation::Isolated => {
                debug!("config: skipping user config (isolated)");
                None
            }
            ConfigLocation::Explicit(path) => {
                debug!("config: loading from explicit path {path}");
                match UserConfig::from_path(path)? {
                    Some(user_config) => Some(user_config),
                    None => {
                        return Err(ConfigError::FileNotFound {
                            path: path.to_owned(),
                        });
                    }
                }
            }
            ConfigLocation::Default { cwd } => UserConfig::from_path(&default_config_path(cwd))?,
        };

        if let Some(user_config) = user_config {
            config.apply(user_config.reporter);
        }
        Ok(config)
    }

    fn apply(&mut self, overrides: UserReporterConfig) {
        if let Some(verbose) = overrides.verbose {
            self.verbose = verbose;
        }
        if let Some(slow) = overrides.runtime.slow {
            self.runtime.slow = slow;
        }
        if let Some(very_slow) = overrides.runtime.very_slow {
            self.runtime.very_slow = very_slow;
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DefaultConfig {
    reporter: DefaultReporterConfig,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DefaultReporterConfig {
    verbose: bool,
    runtime: RuntimeThresholds,
}

/// A user config file. Every setting is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct UserConfig {
    #[serde(default)]
    reporter: UserReporterConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct UserReporterConfig {
    #[serde(default)]
    verbose: Option<bool>,
    #[serde(default)]
    runtime: UserRuntimeThresholds,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct UserRuntimeThresholds {
    #[serde(default, with = "humantime_serde::option")]
    slow: Option<Duration>,
    #[serde(default, with = "humantime_serde::option")]
    very_slow: Option<Duration>,
}

impl UserConfig {
    /// Returns `Ok(None)` if the file does not exist.
    fn from_path(path: &Utf8Path) -> Result<Option<Self>, ConfigError> {
        debug!("config: attempting to load from {path}");
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("config: file does not exist at {path}");
                return Ok(None);
            }
            Err(error) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    error,
                });
            }
        };

        let (config, unknown) =
            Self::deserialize_toml(&contents).map_err(|error| ConfigError::Parse {
                path: path.to_owned(),
                error,
            })?;
        if !unknown.is_empty() {
            warn!(
                "ignoring unknown config keys in {path}: {}",
                unknown.into_iter().collect::<Vec<_>>().join(", ")
            );
        }

        debug!("config: loaded successfully from {path}");
        Ok(Some(config))
    }

    fn deserialize_toml(contents: &str) -> Result<(Self, BTreeSet<String>), toml::de::Error> {
        let deserializer = toml::Deserializer::parse(contents)?;
        let mut unknown = BTreeSet::new();
        let config = serde_ignored::deserialize(deserializer, |path| {
            unknown.insert(path.to_string());
        })?;
        Ok((config, unknown))
    }
}

/// Returns the default config path under `cwd`.
pub fn default_config_path(cwd: &Utf8Path) -> Utf8PathBuf {
    cwd.join(DEFAULT_CONFIG_PATH)
}

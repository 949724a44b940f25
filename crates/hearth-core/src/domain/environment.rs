//! Runtime environments and their file location policy.
//!
//! The set of environments is closed, so each one is an enum variant and the
//! policy is a `match` rather than a trait object.
//!
//! | environment | overrides                    | default lookup            |
//! |-------------|------------------------------|---------------------------|
//! | development | absolute only                | source tree or resources  |
//! | test        | absolute only                | source tree or resources  |
//! | production  | relative ones are resolved   | `/etc` then XDG user dirs |

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::paths::{non_blank, resolve};
use crate::domain::{AppLayout, CommandLineOverrides, DomainError};

const CONFIG_FILE_OPTION: &str = "--config-file-path";
const LOG_FILE_OPTION: &str = "--log-file-path";
const LOGGING_CONFIG_OPTION: &str = "--logging-config-path";

const LOGGING_CONFIG_FILE: &str = "logging_config.json";
const PRODUCTION_CONFIG_FILES: [&str; 4] =
    ["production.yaml", "production.yml", "app.yaml", "app.yml"];

/// Runtime environment of an application instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Self::Development, Self::Test, Self::Production];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }

    pub fn is_debug(&self) -> bool {
        !matches!(self, Self::Production)
    }

    pub fn is_testing(&self) -> bool {
        matches!(self, Self::Test)
    }

    /// Escape newlines so that every log event is one line of text.
    pub fn force_single_line_logs(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Never send anything to syslog, whatever the logging config says.
    pub fn force_disable_syslog(&self) -> bool {
        !matches!(self, Self::Production)
    }

    /// Candidate application config files, most significant last.
    pub fn config_file_abspaths(
        &self,
        layout: &AppLayout,
        overrides: &CommandLineOverrides,
    ) -> Result<Vec<PathBuf>, DomainError> {
        match self {
            Self::Development | Self::Test => {
                if let Some(path) =
                    self.absolute_override(CONFIG_FILE_OPTION, overrides.config_file_path())?
                {
                    return Ok(vec![path]);
                }
                let file = format!("{}.yaml", self.name());
                Ok(vec![if layout.running_from_source {
                    layout.repo_config_file(&file)
                } else {
                    layout.resource_file(&file)
                }])
            }
            Self::Production => {
                if let Some(path) = overrides.config_file_path() {
                    return Ok(vec![resolve(path, config_base(layout))]);
                }
                Ok(PRODUCTION_CONFIG_FILES
                    .iter()
                    .map(|file| layout.system_config_dir.join(file))
                    .chain(
                        PRODUCTION_CONFIG_FILES
                            .iter()
                            .map(|file| layout.user_config_dir.join(file)),
                    )
                    .collect())
            }
        }
    }

    /// Candidate logging config files, most significant last.
    pub fn logging_config_abspaths(
        &self,
        layout: &AppLayout,
        overrides: &CommandLineOverrides,
    ) -> Result<Vec<PathBuf>, DomainError> {
        match self {
            Self::Development | Self::Test => {
                if let Some(path) =
                    self.absolute_override(LOGGING_CONFIG_OPTION, overrides.logging_config_path())?
                {
                    return Ok(vec![path]);
                }
                Ok(vec![if layout.running_from_source {
                    layout.repo_config_file(LOGGING_CONFIG_FILE)
                } else {
                    layout.resource_file(LOGGING_CONFIG_FILE)
                }])
            }
            Self::Production => {
                if let Some(path) = overrides.logging_config_path() {
                    return Ok(vec![resolve(path, config_base(layout))]);
                }
                Ok(vec![
                    layout.system_config_dir.join(LOGGING_CONFIG_FILE),
                    layout.user_config_dir.join(LOGGING_CONFIG_FILE),
                ])
            }
        }
    }

    /// Where file based logs go when file logging is enabled.
    ///
    /// `configured` is the `filename` already present on the loaded logging
    /// config's file handler, consulted after the command line override.
    pub fn filelog_abspath(
        &self,
        layout: &AppLayout,
        overrides: &CommandLineOverrides,
        configured: Option<&str>,
    ) -> Result<PathBuf, DomainError> {
        let explicit = overrides.log_file_path().or_else(|| non_blank(configured));

        match self {
            Self::Development | Self::Test => {
                if let Some(path) = self.absolute_override(LOG_FILE_OPTION, explicit)? {
                    return Ok(path);
                }
                let file = format!("{}.log", self.name());
                Ok(if layout.running_from_source {
                    layout.repo_log_file(&file)
                } else {
                    layout.default_temp_dir.join(file)
                })
            }
            Self::Production => {
                let base = data_base(layout);
                Ok(match explicit {
                    Some(path) => resolve(path, base),
                    None => layout.user_data_dir.join("production.log"),
                })
            }
        }
    }

    fn absolute_override(
        &self,
        option: &'static str,
        value: Option<&str>,
    ) -> Result<Option<PathBuf>, DomainError> {
        match value {
            None => Ok(None),
            Some(path) if Path::new(path).is_absolute() => Ok(Some(PathBuf::from(path))),
            Some(path) => Err(DomainError::RelativePathNotAllowed {
                option,
                environment: *self,
                path: path.to_string(),
            }),
        }
    }
}

/// Base for relative production config overrides.
fn config_base(layout: &AppLayout) -> &Path {
    if layout.running_from_source {
        &layout.repo_root
    } else {
        &layout.user_config_dir
    }
}

/// Base for relative production log file paths.
fn data_base(layout: &AppLayout) -> &Path {
    if layout.running_from_source {
        &layout.repo_root
    } else {
        &layout.user_data_dir
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Environment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|env| env.name() == s)
            .ok_or_else(|| DomainError::UnknownEnvironment(s.to_string()))
    }
}

//! Optional YAML configuration, `~/.qsolve/config.yaml` by default.
//!
//! ```yaml
//! ibm:
//!   endpoint: https://quantum.cloud.ibm.com/api/v1
//!   instance: crn:v1:bluemix:public:quantum-computing:us-east:a/...
//! defaults:
//!   shots: 2048
//!   seed: 7
//! ```
//!
//! Values given on the command line (or through their environment variables)
//! win over the file, and the file wins over built-in defaults. Tokens never
//! live here; they come from the environment.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use qsolve_hal::{HalResult, Session, TokenProvider};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid YAML for [`Config`].
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_yaml_ng::Error,
    },
}

/// IBM Quantum settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IbmSettings {
    /// API endpoint override.
    pub endpoint: Option<String>,
    /// Hub/group/project or IBM Cloud service CRN.
    pub instance: Option<String>,
}

/// Run defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    /// Shot count.
    pub shots: Option<u32>,
    /// Simulator seed.
    pub seed: Option<u64>,
}

/// Contents of the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// IBM Quantum settings.
    pub ibm: IbmSettings,
    /// Run defaults.
    pub defaults: Defaults,
}

impl Config {
    /// `~/.qsolve/config.yaml`, if a home directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".qsolve").join("config.yaml"))
    }

    /// Parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit` if given (it must exist), otherwise the default path
    /// if it exists, otherwise built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                debug!(path = %path.display(), "loading config");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Shot count: `cli`, then the file, then `fallback`.
    pub fn shots(&self, cli: Option<u32>, fallback: u32) -> u32 {
        cli.or(self.defaults.shots).unwrap_or(fallback)
    }

    /// Seed: `cli`, then the file.
    pub fn seed(&self, cli: Option<u64>) -> Option<u64> {
        cli.or(self.defaults.seed)
    }

    /// Acquire an IBM session scoped by the file's endpoint and instance.
    pub async fn ibm_session(&self, provider: &str, tokens: &dyn TokenProvider) -> HalResult<Session> {
        let mut session = Session::acquire(provider, tokens).await?;
        if let Some(instance) = &self.ibm.instance {
            session = session.with_instance(instance.clone());
        }
        if let Some(endpoint) = &self.ibm.endpoint {
            session = session.with_endpoint(endpoint.clone());
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use qsolve_hal::StaticTokenProvider;
    use tempfile::NamedTempFile;

    fn write(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_file() {
        let file = write(
            "ibm:\n  endpoint: https://example.test/api\n  instance: ibm-q/open/main\ndefaults:\n  shots: 2048\n  seed: 7\n",
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.ibm.endpoint.as_deref(), Some("https://example.test/api"));
        assert_eq!(config.ibm.instance.as_deref(), Some("ibm-q/open/main"));
        assert_eq!(config.defaults.shots, Some(2048));
        assert_eq!(config.defaults.seed, Some(7));
    }

    #[test]
    fn test_partial_and_empty_files() {
        let config = Config::load(write("defaults:\n  seed: 3\n").path()).unwrap();
        assert_eq!(config.defaults.seed, Some(3));
        assert_eq!(config.ibm, IbmSettings::default());

        assert_eq!(Config::load(write("").path()).unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = Config::load(write("defaults:\n  shot: 10\n").path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::discover(Some(&dir.path().join("nope.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_precedence() {
        let config = Config {
            defaults: Defaults {
                shots: Some(2048),
                seed: Some(7),
            },
            ..Config::default()
        };
        assert_eq!(config.shots(Some(10), 1024), 10);
        assert_eq!(config.shots(None, 1024), 2048);
        assert_eq!(Config::default().shots(None, 1024), 1024);
        assert_eq!(config.seed(None), Some(7));
        assert_eq!(config.seed(Some(1)), Some(1));
        assert_eq!(Config::default().seed(None), None);
    }

    #[tokio::test]
    async fn test_ibm_session_is_scoped() {
        let config = Config {
            ibm: IbmSettings {
                endpoint: Some("https://example.test/api".into()),
                instance: Some("crn:v1:test".into()),
            },
            ..Config::default()
        };
        let session = config
            .ibm_session("ibm", &StaticTokenProvider::new("tok"))
            .await
            .unwrap();
        assert_eq!(session.instance(), Some("crn:v1:test"));
        assert_eq!(session.endpoint(), Some("https://example.test/api"));
        assert_eq!(session.token().unwrap(), "tok");
    }
}

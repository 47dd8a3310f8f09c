//! On-disk configuration for the helper

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use fingwit_core::ClassifierConfig;

use crate::host::DeferCode;

/// Default config file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/fingwit/config.json";

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "FINGWIT_CONFIG";

/// Helper configuration
///
/// Every field has a default, so a missing file or a file carrying only a
/// subset of keys still yields a working configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingwitConfig {
    /// Verification attempts per session
    pub max_tries: u32,

    /// Per-attempt deadline in seconds
    pub timeout_secs: u64,

    /// Verbose diagnostics
    pub debug: bool,

    /// Result code used when verification is skipped or unavailable
    pub defer_code: DeferCode,

    /// Classifier service names and the login-fingerprint switch
    #[serde(flatten)]
    pub classifier: ClassifierConfig,
}

impl Default for FingwitConfig {
    fn default() -> Self {
        Self {
            max_tries: fingwit_core::DEFAULT_MAX_ATTEMPTS,
            timeout_secs: fingwit_core::DEFAULT_ATTEMPT_TIMEOUT_SECS,
            debug: false,
            defer_code: DeferCode::Unavail,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl FingwitConfig {
    /// Resolve the config path: explicit flag, then environment, then the
    /// default location
    pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }
}

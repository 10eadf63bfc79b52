//! Configuration file loading for tessera.
//!
//! Reads `tessera.config.json` from the current working directory, or an explicit path.

use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use tessera_croquis::PassOptions;

use crate::error::{TesseraError, TesseraResult};

pub const CONFIG_FILE_NAME: &str = "tessera.config.json";

/// Top-level tessera configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TesseraConfig {
    /// JSON Schema reference (for editor autocompletion).
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Names and switches of the synthesis pass.
    #[serde(default)]
    pub pass: PassOptions,
}

/// Load `tessera.config.json` from the given directory (or CWD if None).
///
/// A missing file yields the defaults. An unreadable or unparsable file is reported
/// and also yields the defaults.
pub fn load_config(dir: Option<&Path>) -> TesseraConfig {
    let base = dir
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let config_path = base.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "no configuration file");
        return TesseraConfig::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match parse_config(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", config_path.display(), e);
                TesseraConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", config_path.display(), e);
            TesseraConfig::default()
        }
    }
}

/// Load a configuration file named on the command line. Unlike [`load_config`], every
/// failure is an error.
pub fn load_config_file(path: &Path) -> TesseraResult<TesseraConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| TesseraError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content).map_err(|source| TesseraError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// The top level must be an object; serde would otherwise accept a sequence.
fn parse_config(content: &str) -> Result<TesseraConfig, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    if !value.is_object() {
        return Err(serde_json::Error::custom(
            "configuration must be a JSON object",
        ));
    }
    serde_json::from_value(value)
}

//! Configuration loader for Lingua.
//!
//! Reads `lingua.toml` from the config directory (`~/.config/lingua/` on
//! Linux) and deserializes it into [`LinguaConfig`]. [`load_config`] falls
//! back to defaults when the file is missing or unusable; [`try_load_config`]
//! reports why instead.

use std::path::{Path, PathBuf};

use lingua_types::config::{ConfigValidationError, LinguaConfig};

/// File name looked up inside the config directory.
pub const CONFIG_FILE_NAME: &str = "lingua.toml";

/// Minimum short-segment budget. Anything lower cannot fit a round trip.
const MIN_REQUEST_BUDGET_MS: u64 = 50;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration in {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ConfigValidationError,
    },
}

/// Platform config directory for Lingua, e.g. `~/.config/lingua`.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lingua"))
}

/// Load configuration from `{config_dir}/lingua.toml`, strictly.
///
/// A missing file is not an error and yields [`LinguaConfig::default()`].
pub async fn try_load_config(config_dir: &Path) -> Result<LinguaConfig, ConfigError> {
    let path = config_dir.join(CONFIG_FILE_NAME);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No {CONFIG_FILE_NAME} found at {}, using defaults", path.display());
            return Ok(LinguaConfig::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    let config: LinguaConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(source) => return Err(ConfigError::Parse { path, source }),
    };

    config
        .validate()
        .map_err(|source| ConfigError::Invalid { path, source })?;
    Ok(config)
}

/// Load configuration from `{config_dir}/lingua.toml`.
///
/// - Missing file: defaults.
/// - Unreadable, malformed or invalid file: logs a warning, defaults.
/// - Otherwise: the parsed config.
pub async fn load_config(config_dir: &Path) -> LinguaConfig {
    match try_load_config(config_dir).await {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("{err}, using defaults");
            LinguaConfig::default()
        }
    }
}

/// Resolve the short-segment budget for one request.
///
/// A per-request override wins over `orchestrator.default_request_budget_ms`.
/// A 50 ms floor applies either way.
pub fn resolve_request_budget_ms(config: &LinguaConfig, override_ms: Option<u64>) -> u64 {
    let budget = override_ms.unwrap_or(config.orchestrator.default_request_budget_ms);
    budget.max(MIN_REQUEST_BUDGET_MS)
}

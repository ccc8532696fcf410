/// Studio configuration
/// Network resolution (flag, then ~/.seiatlas.toml, then testnet) plus environment overrides

use serde::Deserialize;
use shared::Network;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const CONFIG_FILE_NAME: &str = ".seiatlas.toml";
const DEFAULT_BIND: &str = "127.0.0.1:3001";
const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0}")]
    InvalidNetwork(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to read config file at {path:?}: {message}")]
    ConfigFile { path: PathBuf, message: String },
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    network: Option<String>,
    rpc_url: Option<String>,
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let content = fs::read_to_string(path).map_err(|e| ConfigError::ConfigFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::ConfigFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// `~/.seiatlas.toml`, when a home directory exists.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|mut p| {
        p.push(CONFIG_FILE_NAME);
        p
    })
}

/// Resolve the network: CLI flag, then the config file, then testnet.
pub fn resolve_network(cli_flag: Option<&str>, config_path: Option<&Path>) -> Result<Network, ConfigError> {
    // 1. CLI flag
    if let Some(net) = cli_flag {
        return net.parse::<Network>().map_err(ConfigError::InvalidNetwork);
    }

    // 2. Config file
    if let Some(path) = config_path {
        if let Some(net) = read_config_file(path)?.network {
            return net.parse::<Network>().map_err(ConfigError::InvalidNetwork);
        }
    }

    // 3. Default
    Ok(Network::Testnet)
}

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub network: Network,
    pub rpc_url: String,
    pub private_key: Option<String>,
    pub solc_path: PathBuf,
    pub state_dir: PathBuf,
    pub bind: SocketAddr,
    pub receipt_timeout: Duration,
}

impl StudioConfig {
    /// Load from the process environment and `~/.seiatlas.toml`.
    pub fn from_env(network_flag: Option<&str>) -> Result<Self, ConfigError> {
        Self::load(network_flag, config_file_path().as_deref(), |key| std::env::var(key).ok())
    }

    /// Load with an explicit config file and variable lookup.
    pub fn load(
        network_flag: Option<&str>,
        config_path: Option<&Path>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let network = resolve_network(network_flag, config_path)?;
        let file = match config_path {
            Some(path) => read_config_file(path)?,
            None => ConfigFile::default(),
        };

        let rpc_url = var("SEIATLAS_RPC_URL")
            .or(file.rpc_url)
            .unwrap_or_else(|| network.default_rpc_url().to_string());

        let private_key = var("SEIATLAS_PRIVATE_KEY").filter(|k| !k.trim().is_empty());

        let solc_path = PathBuf::from(var("SEIATLAS_SOLC").unwrap_or_else(|| "solc".to_string()));

        let state_dir = match var("SEIATLAS_STATE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|p| p.join("seiatlas"))
                .unwrap_or_else(|| PathBuf::from(".seiatlas")),
        };

        let bind_str = var("SEIATLAS_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidConfig(format!("Invalid bind address: {} ({})", bind_str, e)))?;

        let receipt_timeout_secs = match var("SEIATLAS_RECEIPT_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidConfig(format!("Invalid receipt timeout: {} ({})", raw, e))
            })?,
            None => DEFAULT_RECEIPT_TIMEOUT_SECS,
        };
        if receipt_timeout_secs == 0 || receipt_timeout_secs > 600 {
            return Err(ConfigError::InvalidConfig(
                "Receipt timeout must be between 1 and 600 seconds".to_string(),
            ));
        }

        info!(
            "Configuration loaded: network={}, rpc={}, signer={}",
            network,
            rpc_url,
            private_key.is_some()
        );
        debug!(solc = ?solc_path, state_dir = ?state_dir, %bind, "Paths");

        Ok(Self {
            network,
            rpc_url,
            private_key,
            solc_path,
            state_dir,
            bind,
            receipt_timeout: Duration::from_secs(receipt_timeout_secs),
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.network.chain_id()
    }

    /// File backing the persisted UI state.
    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join("state.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_resolve_network_priority() {
        let file = config_file("network = \"mainnet\"");

        // Flag beats file
        assert_eq!(resolve_network(Some("local"), Some(file.path())).unwrap(), Network::Local);
        // File beats default
        assert_eq!(resolve_network(None, Some(file.path())).unwrap(), Network::Mainnet);
        // Default
        assert_eq!(resolve_network(None, None).unwrap(), Network::Testnet);
    }

    #[test]
    fn test_resolve_network_missing_file_uses_default() {
        let path = Path::new("/nonexistent/.seiatlas.toml");
        assert_eq!(resolve_network(None, Some(path)).unwrap(), Network::Testnet);
    }

    #[test]
    fn test_invalid_network() {
        assert!(matches!(
            resolve_network(Some("moonnet"), None),
            Err(ConfigError::InvalidNetwork(_))
        ));
        let file = config_file("network = 7");
        assert!(matches!(
            resolve_network(None, Some(file.path())),
            Err(ConfigError::ConfigFile { .. })
        ));
    }

    #[test]
    fn test_load_defaults() {
        let config = StudioConfig::load(None, None, vars(&[])).unwrap();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.rpc_url, Network::Testnet.default_rpc_url());
        assert_eq!(config.chain_id(), 1328);
        assert_eq!(config.private_key, None);
        assert_eq!(config.solc_path, PathBuf::from("solc"));
        assert_eq!(config.bind.port(), 3001);
        assert_eq!(config.receipt_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_load_overrides() {
        let file = config_file("network = \"local\"\nrpc_url = \"http://file:8545\"");
        let config = StudioConfig::load(
            None,
            Some(file.path()),
            vars(&[
                ("SEIATLAS_PRIVATE_KEY", "  "),
                ("SEIATLAS_STATE_DIR", "/tmp/seiatlas-test"),
                ("SEIATLAS_BIND", "0.0.0.0:8080"),
            ]),
        )
        .unwrap();
        assert_eq!(config.network, Network::Local);
        assert_eq!(config.rpc_url, "http://file:8545");
        assert_eq!(config.private_key, None);
        assert_eq!(config.state_file(), PathBuf::from("/tmp/seiatlas-test/state.json"));
        assert_eq!(config.bind.port(), 8080);

        let config = StudioConfig::load(
            None,
            Some(file.path()),
            vars(&[("SEIATLAS_RPC_URL", "http://env:8545")]),
        )
        .unwrap();
        assert_eq!(config.rpc_url, "http://env:8545");
    }

    #[test]
    fn test_invalid_values() {
        assert!(StudioConfig::load(None, None, vars(&[("SEIATLAS_BIND", "nowhere")])).is_err());
        assert!(StudioConfig::load(None, None, vars(&[("SEIATLAS_RECEIPT_TIMEOUT_SECS", "0")])).is_err());
        assert!(StudioConfig::load(None, None, vars(&[("SEIATLAS_RECEIPT_TIMEOUT_SECS", "x")])).is_err());
    }
}

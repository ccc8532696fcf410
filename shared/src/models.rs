use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// EVM network the studio talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
    Local,
}

impl Network {
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => 1329,
            Network::Testnet => 1328,
            Network::Devnet => 713715,
            Network::Local => 31337,
        }
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://evm-rpc.sei-apis.com",
            Network::Testnet => "https://evm-rpc-testnet.sei-apis.com",
            Network::Devnet => "https://evm-rpc-arctic-1.sei-apis.com",
            Network::Local => "http://127.0.0.1:8545",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
            Network::Devnet => write!(f, "devnet"),
            Network::Local => write!(f, "local"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            "local" => Ok(Network::Local),
            other => Err(format!(
                "Invalid network: {}. Allowed values: mainnet, testnet, devnet, local",
                other
            )),
        }
    }
}

/// Keys the studio persists its UI state under
pub mod keys {
    pub const FILES: &str = "seiatlas.files";
    pub const OPEN_FILES: &str = "seiatlas.files.open";
    pub const ACTIVE_FILE: &str = "seiatlas.files.active";
    pub const CONTRACT_ADDRESS: &str = "seiatlas.contract.address";
}

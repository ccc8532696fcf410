//! Chain client boundary.
//!
//! The dispatcher only talks to these traits; [`rpc::EvmClient`] is the
//! JSON-RPC implementation used by the binary, tests inject their own.

pub mod encode;
pub mod rpc;

use async_trait::async_trait;
use contract_abi::{AbiFunction, CallValue, ContractSchema};
use thiserror::Error;

pub use rpc::EvmClient;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid argument '{name}': {message}")]
    InvalidArgument { name: String, message: String },
    #[error("ABI encoding failed: {0}")]
    Abi(String),
    #[error("RPC request failed: {0}")]
    Rpc(String),
    #[error("No signer configured; set SEIATLAS_PRIVATE_KEY to send transactions")]
    NoSigner,
    #[error("Signer error: {0}")]
    Signer(String),
    #[error("Timed out waiting for {0}")]
    Timeout(String),
}

/// Read-only contract calls.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn read_contract(
        &self,
        address: &str,
        schema: &ContractSchema,
        function: &AbiFunction,
        args: &[CallValue],
    ) -> Result<serde_json::Value, ChainError>;
}

/// State-changing submissions. Both methods return the transaction id as soon
/// as the transaction is accepted; neither waits for inclusion.
#[async_trait]
pub trait WalletClient: Send + Sync {
    async fn write_contract(
        &self,
        address: &str,
        schema: &ContractSchema,
        function: &AbiFunction,
        args: &[CallValue],
    ) -> Result<String, ChainError>;

    async fn deploy_contract(
        &self,
        schema: &ContractSchema,
        bytecode: &str,
        args: &[CallValue],
    ) -> Result<String, ChainError>;
}

/// Receipt lookup for a submitted transaction.
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    /// Address created by the transaction, if it has a receipt and created a
    /// contract.
    async fn contract_address(&self, tx_hash: &str) -> Result<Option<String>, ChainError>;
}

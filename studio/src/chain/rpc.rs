/// JSON-RPC chain client for EVM-compatible Sei endpoints
/// Encodes calls from the contract schema, submits through an optional local signer

use super::encode;
use super::{ChainError, ChainReader, ReceiptSource, WalletClient};
use async_trait::async_trait;
use contract_abi::{AbiFunction, CallValue, ContractSchema};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, PendingTransaction, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{TransactionRequest, H256};
use std::time::Duration;
use tracing::{debug, info, warn};

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct EvmClient {
    provider: Provider<Http>,
    signer: Option<SignerMiddleware<Provider<Http>, LocalWallet>>,
    receipt_timeout: Duration,
}

impl EvmClient {
    /// Connect to `rpc_url`. Without a private key the client can only read.
    pub fn new(
        rpc_url: &str,
        chain_id: u64,
        private_key: Option<&str>,
        receipt_timeout: Duration,
    ) -> Result<Self, ChainError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| ChainError::Rpc(format!("invalid RPC url '{}': {}", rpc_url, e)))?;

        let signer = match private_key {
            Some(key) => {
                let wallet = key
                    .trim()
                    .trim_start_matches("0x")
                    .parse::<LocalWallet>()
                    .map_err(|e| ChainError::Signer(e.to_string()))?
                    .with_chain_id(chain_id);
                info!(address = ?wallet.address(), chain_id, "Loaded signer");
                Some(SignerMiddleware::new(provider.clone(), wallet))
            }
            None => None,
        };

        Ok(Self {
            provider,
            signer,
            receipt_timeout,
        })
    }

    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    fn signer(&self) -> Result<&SignerMiddleware<Provider<Http>, LocalWallet>, ChainError> {
        self.signer.as_ref().ok_or(ChainError::NoSigner)
    }

    async fn submit(&self, tx: TransactionRequest) -> Result<String, ChainError> {
        let pending = self
            .signer()?
            .send_transaction(tx, None)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        Ok(format!("{:?}", pending.tx_hash()))
    }
}

#[async_trait]
impl ChainReader for EvmClient {
    async fn read_contract(
        &self,
        address: &str,
        _schema: &ContractSchema,
        function: &AbiFunction,
        args: &[CallValue],
    ) -> Result<serde_json::Value, ChainError> {
        let to = encode::parse_address(address)?;
        let func = encode::function(function)?;
        let tokens = encode::tokens(&function.parameters, args)?;
        let data = func
            .encode_input(&tokens)
            .map_err(|e| ChainError::Abi(e.to_string()))?;

        debug!(%address, function = %function.name, "eth_call");
        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
        let raw = self
            .provider
            .call(&tx, None)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        let outputs = func
            .decode_output(&raw)
            .map_err(|e| ChainError::Abi(format!("could not decode return data: {}", e)))?;
        Ok(encode::tokens_to_json(outputs))
    }
}

#[async_trait]
impl WalletClient for EvmClient {
    async fn write_contract(
        &self,
        address: &str,
        _schema: &ContractSchema,
        function: &AbiFunction,
        args: &[CallValue],
    ) -> Result<String, ChainError> {
        let to = encode::parse_address(address)?;
        let func = encode::function(function)?;
        let tokens = encode::tokens(&function.parameters, args)?;
        let data = func
            .encode_input(&tokens)
            .map_err(|e| ChainError::Abi(e.to_string()))?;

        info!(%address, function = %function.name, "Submitting transaction");
        self.submit(TransactionRequest::new().to(to).data(data)).await
    }

    async fn deploy_contract(
        &self,
        schema: &ContractSchema,
        bytecode: &str,
        args: &[CallValue],
    ) -> Result<String, ChainError> {
        let trimmed = bytecode.trim();
        let code = hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
            .map_err(|e| ChainError::Abi(format!("invalid bytecode: {}", e)))?;

        let data = match schema.constructor() {
            Some(ctor) => {
                let tokens = encode::tokens(&ctor.parameters, args)?;
                encode::constructor(&ctor.parameters)?
                    .encode_input(code, &tokens)
                    .map_err(|e| ChainError::Abi(e.to_string()))?
            }
            None if args.is_empty() => code,
            None => {
                return Err(ChainError::Abi(format!(
                    "contract has no constructor but {} arguments were given",
                    args.len()
                )))
            }
        };

        info!(bytes = data.len(), "Submitting deployment");
        self.submit(TransactionRequest::new().data(data)).await
    }
}

#[async_trait]
impl ReceiptSource for EvmClient {
    async fn contract_address(&self, tx_hash: &str) -> Result<Option<String>, ChainError> {
        let hash = tx_hash
            .trim()
            .parse::<H256>()
            .map_err(|e| ChainError::Rpc(format!("invalid transaction hash '{}': {}", tx_hash, e)))?;

        let pending = PendingTransaction::new(hash, &self.provider).interval(RECEIPT_POLL_INTERVAL);
        match tokio::time::timeout(self.receipt_timeout, pending).await {
            Ok(Ok(Some(receipt))) => Ok(receipt.contract_address.map(|a| format!("{:?}", a))),
            Ok(Ok(None)) => {
                warn!(%tx_hash, "Transaction dropped before a receipt was produced");
                Ok(None)
            }
            Ok(Err(e)) => Err(ChainError::Rpc(e.to_string())),
            Err(_) => Err(ChainError::Timeout(format!("receipt of {}", tx_hash))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Anvil/Hardhat account #0
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_client_without_key_is_read_only() {
        let client = EvmClient::new("http://127.0.0.1:8545", 31337, None, Duration::from_secs(1)).unwrap();
        assert!(!client.has_signer());
        assert!(matches!(client.signer(), Err(ChainError::NoSigner)));
    }

    #[test]
    fn test_client_with_key() {
        let client =
            EvmClient::new("http://127.0.0.1:8545", 31337, Some(DEV_KEY), Duration::from_secs(1)).unwrap();
        assert!(client.has_signer());
    }

    #[test]
    fn test_invalid_key_rejected() {
        let result = EvmClient::new("http://127.0.0.1:8545", 31337, Some("zz"), Duration::from_secs(1));
        assert!(matches!(result, Err(ChainError::Signer(_))));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = EvmClient::new("not a url", 31337, None, Duration::from_secs(1));
        assert!(matches!(result, Err(ChainError::Rpc(_))));
    }

    #[tokio::test]
    async fn test_bad_address_fails_before_network() {
        let client = EvmClient::new("http://127.0.0.1:1", 31337, None, Duration::from_secs(1)).unwrap();
        let f = AbiFunction::function("totalSupply", Some(contract_abi::Mutability::View), vec![]);
        let err = client
            .read_contract("0x123", &ContractSchema::default(), &f, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_write_without_signer() {
        let client = EvmClient::new("http://127.0.0.1:1", 31337, None, Duration::from_secs(1)).unwrap();
        let f = AbiFunction::function("pause", Some(contract_abi::Mutability::NonPayable), vec![]);
        let err = client
            .write_contract(
                "0x000000000000000000000000000000000000dEaD",
                &ContractSchema::default(),
                &f,
                &[],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::NoSigner));
    }
}

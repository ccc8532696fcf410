//! Call dispatch.
//!
//! Turns the session's current selection into a chain call and records the
//! outcome back on the session. Chain failures never escape: they become a
//! [`CallOutcome::Failed`] shown in the result area.

use crate::chain::{ChainReader, ReceiptSource, WalletClient};
use crate::session::{CallOutcome, DeploySession, InteractionSession};
use contract_abi::ContractSchema;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Perform a read call for the selected function.
///
/// A no-op (returns `None`) without a contract address or a selected
/// function. Return values are recorded pretty-printed.
pub async fn execute_read<R>(reader: &R, session: &mut InteractionSession) -> Option<CallOutcome>
where
    R: ChainReader + ?Sized,
{
    let outcome = {
        let address = session.contract_address().trim();
        if address.is_empty() {
            debug!("Read skipped: no contract address");
            return None;
        }
        let Some(function) = session.current_function() else {
            debug!("Read skipped: no function selected");
            return None;
        };
        let schema = session.schema()?;
        let args = session.build_arguments().unwrap_or_default();

        debug!(%address, function = %function.name, args = args.len(), "Dispatching read");
        match reader.read_contract(address, schema, function, &args).await {
            Ok(value) => CallOutcome::Value(pretty(&value)),
            Err(e) => {
                warn!(%address, function = %function.name, error = %e, "Read call failed");
                CallOutcome::Failed(e.to_string())
            }
        }
    };

    session.record_outcome(outcome.clone());
    Some(outcome)
}

/// Submit a write for the selected function. Records the transaction id as
/// soon as it is known; inclusion is not awaited.
///
/// A no-op without a wallet, a contract address or a selected function.
pub async fn execute_write<W>(wallet: Option<&W>, session: &mut InteractionSession) -> Option<CallOutcome>
where
    W: WalletClient + ?Sized,
{
    let Some(wallet) = wallet else {
        debug!("Write skipped: no wallet connected");
        return None;
    };

    let outcome = {
        let address = session.contract_address().trim();
        if address.is_empty() {
            debug!("Write skipped: no contract address");
            return None;
        }
        let Some(function) = session.current_function() else {
            debug!("Write skipped: no function selected");
            return None;
        };
        let schema = session.schema()?;
        let args = session.build_arguments().unwrap_or_default();

        match wallet.write_contract(address, schema, function, &args).await {
            Ok(tx_hash) => {
                info!(%address, function = %function.name, %tx_hash, "Transaction submitted");
                CallOutcome::Submitted(tx_hash)
            }
            Err(e) => {
                warn!(%address, function = %function.name, error = %e, "Write call failed");
                CallOutcome::Failed(e.to_string())
            }
        }
    };

    session.record_outcome(outcome.clone());
    Some(outcome)
}

/// Submit a deployment of `bytecode` with the constructor arguments from the
/// deploy dialog. A no-op without a wallet or with empty bytecode.
pub async fn deploy_contract<W>(
    wallet: Option<&W>,
    schema: &ContractSchema,
    bytecode: &str,
    deploy: &DeploySession,
) -> Option<CallOutcome>
where
    W: WalletClient + ?Sized,
{
    let Some(wallet) = wallet else {
        debug!("Deploy skipped: no wallet connected");
        return None;
    };
    if bytecode.trim().trim_start_matches("0x").is_empty() {
        debug!("Deploy skipped: no bytecode");
        return None;
    }

    let args = deploy.build_arguments();
    let outcome = match wallet.deploy_contract(schema, bytecode, &args).await {
        Ok(tx_hash) => {
            info!(%tx_hash, args = args.len(), "Deployment submitted");
            CallOutcome::Submitted(tx_hash)
        }
        Err(e) => {
            warn!(error = %e, "Deployment failed");
            CallOutcome::Failed(e.to_string())
        }
    };
    Some(outcome)
}

/// Best-effort lookup of the address a deployment created. Lookup failures
/// are logged and yield `None`.
pub async fn resolve_deployed_address<R>(receipts: &R, tx_hash: &str) -> Option<String>
where
    R: ReceiptSource + ?Sized,
{
    match receipts.contract_address(tx_hash).await {
        Ok(Some(address)) => {
            info!(%tx_hash, %address, "Deployment confirmed");
            Some(address)
        }
        Ok(None) => {
            debug!(%tx_hash, "Receipt carries no contract address");
            None
        }
        Err(e) => {
            warn!(%tx_hash, error = %e, "Failed to resolve deployed address");
            None
        }
    }
}

/// Run [`resolve_deployed_address`] detached from the caller.
pub fn spawn_address_lookup(receipts: Arc<dyn ReceiptSource>, tx_hash: String) -> JoinHandle<Option<String>> {
    tokio::spawn(async move { resolve_deployed_address(receipts.as_ref(), &tx_hash).await })
}

/// Point the interaction session at a fresh deployment. The schema is adopted
/// even when the address could not be resolved.
pub fn adopt_deployment(session: &mut InteractionSession, schema: ContractSchema, address: Option<String>) {
    session.load_schema(schema);
    if let Some(address) = address {
        session.set_contract_address(address);
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainError;
    use async_trait::async_trait;
    use contract_abi::{AbiFunction, AbiParameter, CallValue, Mutability};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingReader {
        calls: Mutex<Vec<(String, String, Vec<CallValue>)>>,
        fail: bool,
    }

    #[async_trait]
    impl ChainReader for RecordingReader {
        async fn read_contract(
            &self,
            address: &str,
            _schema: &ContractSchema,
            function: &AbiFunction,
            args: &[CallValue],
        ) -> Result<serde_json::Value, ChainError> {
            self.calls
                .lock()
                .unwrap()
                .push((address.to_string(), function.name.clone(), args.to_vec()));
            if self.fail {
                Err(ChainError::Rpc("execution reverted".to_string()))
            } else {
                Ok(json!({"balance": "42"}))
            }
        }
    }

    fn schema() -> ContractSchema {
        ContractSchema::new(vec![AbiFunction::function(
            "balanceOf",
            Some(Mutability::View),
            vec![AbiParameter::new(Some("owner"), "address")],
        )])
    }

    #[tokio::test]
    async fn test_read_without_address_is_noop() {
        let reader = RecordingReader::default();
        let mut session = InteractionSession::with_schema(schema());
        session.select_function("balanceOf(address)").unwrap();

        assert!(execute_read(&reader, &mut session).await.is_none());
        assert!(reader.calls.lock().unwrap().is_empty());
        assert!(session.outcome().is_none());
    }

    #[tokio::test]
    async fn test_read_records_pretty_value() {
        let reader = RecordingReader::default();
        let mut session = InteractionSession::with_schema(schema());
        session.set_contract_address("0xc0ffee");
        session.select_function("balanceOf(address)").unwrap();
        session.set_arg(0, "0xabc").unwrap();

        let outcome = execute_read(&reader, &mut session).await.unwrap();
        assert_eq!(outcome, CallOutcome::Value("{\n  \"balance\": \"42\"\n}".to_string()));
        assert_eq!(session.outcome(), Some(&outcome));

        let calls = reader.calls.lock().unwrap();
        assert_eq!(calls[0].0, "0xc0ffee");
        assert_eq!(calls[0].2, vec![CallValue::Text("0xabc".to_string())]);
    }

    #[tokio::test]
    async fn test_read_failure_is_recorded() {
        let reader = RecordingReader {
            fail: true,
            ..Default::default()
        };
        let mut session = InteractionSession::with_schema(schema());
        session.set_contract_address("0xc0ffee");
        session.select_function("balanceOf(address)").unwrap();

        let outcome = execute_read(&reader, &mut session).await.unwrap();
        assert!(outcome.is_failure());
        assert_eq!(outcome.to_string(), "Error: RPC request failed: execution reverted");
    }

    #[test]
    fn test_adopt_deployment_without_address() {
        let mut session = InteractionSession::new();
        session.set_contract_address("0xold");
        adopt_deployment(&mut session, schema(), None);
        assert_eq!(session.contract_address(), "0xold");
        assert!(session.schema().is_some());
    }
}

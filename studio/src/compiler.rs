/// Solidity compiler boundary
/// Builds solc standard-JSON input and turns its output into a contract schema plus bytecode

use async_trait::async_trait;
use contract_abi::{parse_abi_value, ContractSchema, ParseError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

pub const DEFAULT_FILENAME: &str = "contract.sol";

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Failed to run compiler '{path}': {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Compiler exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },
    #[error("Invalid compiler output: {0}")]
    InvalidOutput(String),
    #[error("No contract produced for source '{0}'")]
    NoContract(String),
    #[error("Invalid ABI in compiler output: {0}")]
    Abi(#[from] ParseError),
}

/// One solc diagnostic (`errors[]` entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_message: Option<String>,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity.eq_ignore_ascii_case("error")
    }

    /// Human-readable form; solc's preformatted text when present.
    pub fn display_text(&self) -> &str {
        self.formatted_message.as_deref().unwrap_or(&self.message)
    }
}

#[derive(Debug, Clone)]
pub struct CompiledContract {
    pub name: String,
    /// ABI exactly as solc emitted it
    pub abi: Value,
    pub schema: ContractSchema,
    /// Creation bytecode, hex without `0x`
    pub bytecode: String,
    pub warnings: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub enum CompileOutcome {
    Compiled(CompiledContract),
    Failed(Vec<Diagnostic>),
}

#[async_trait]
pub trait Compiler: Send + Sync {
    async fn compile(&self, code: &str, filename: Option<&str>) -> Result<CompileOutcome, CompileError>;
}

pub fn source_name(filename: Option<&str>) -> &str {
    match filename {
        Some(name) if !name.trim().is_empty() => name,
        _ => DEFAULT_FILENAME,
    }
}

/// Standard-JSON input requesting every output for every contract.
pub fn standard_json_input(code: &str, filename: Option<&str>) -> Value {
    let mut sources = Map::new();
    sources.insert(source_name(filename).to_string(), json!({ "content": code }));

    json!({
        "language": "Solidity",
        "sources": sources,
        "settings": {
            "outputSelection": {
                "*": { "*": ["*"] }
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct SolcOutput {
    #[serde(default)]
    errors: Vec<Diagnostic>,
    #[serde(default)]
    contracts: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct SolcContract {
    #[serde(default)]
    abi: Value,
    #[serde(default)]
    evm: SolcEvm,
}

#[derive(Debug, Default, Deserialize)]
struct SolcEvm {
    #[serde(default)]
    bytecode: SolcBytecode,
}

#[derive(Debug, Default, Deserialize)]
struct SolcBytecode {
    #[serde(default)]
    object: String,
}

/// Interpret solc's standard-JSON output for the source `filename`.
///
/// Any `error` severity diagnostic fails the compilation; warnings and info
/// are carried on the compiled contract. The first contract of the source is
/// selected.
pub fn parse_compiler_output(output: Value, filename: Option<&str>) -> Result<CompileOutcome, CompileError> {
    let output: SolcOutput =
        serde_json::from_value(output).map_err(|e| CompileError::InvalidOutput(e.to_string()))?;

    let (errors, warnings): (Vec<_>, Vec<_>) = output.errors.into_iter().partition(Diagnostic::is_error);
    if !errors.is_empty() {
        debug!(errors = errors.len(), "Compilation failed");
        return Ok(CompileOutcome::Failed(errors));
    }

    let source = source_name(filename);
    let (name, contract) = output
        .contracts
        .get(source)
        .and_then(Value::as_object)
        .and_then(|contracts| contracts.iter().next())
        .ok_or_else(|| CompileError::NoContract(source.to_string()))?;

    let contract: SolcContract = serde_json::from_value(contract.clone())
        .map_err(|e| CompileError::InvalidOutput(format!("contract '{}': {}", name, e)))?;
    let schema = parse_abi_value(contract.abi.clone())?;

    if !warnings.is_empty() {
        warn!(contract = %name, warnings = warnings.len(), "Compiled with warnings");
    }

    Ok(CompileOutcome::Compiled(CompiledContract {
        name: name.clone(),
        abi: contract.abi,
        schema,
        bytecode: contract.evm.bytecode.object,
        warnings,
    }))
}

/// Runs a local `solc` binary in standard-JSON mode.
pub struct SolcCompiler {
    binary: PathBuf,
}

impl SolcCompiler {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    pub fn binary(&self) -> &std::path::Path {
        &self.binary
    }
}

impl Default for SolcCompiler {
    fn default() -> Self {
        Self::new("solc")
    }
}

#[async_trait]
impl Compiler for SolcCompiler {
    async fn compile(&self, code: &str, filename: Option<&str>) -> Result<CompileOutcome, CompileError> {
        let input = standard_json_input(code, filename);
        let path = self.binary.display().to_string();
        let spawn_error = |source| CompileError::Spawn {
            path: path.clone(),
            source,
        };

        info!(source = source_name(filename), bytes = code.len(), "Compiling");
        let mut child = Command::new(&self.binary)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.to_string().as_bytes())
                .await
                .map_err(spawn_error)?;
        }

        let output = child.wait_with_output().await.map_err(spawn_error)?;
        if !output.status.success() {
            return Err(CompileError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let value: Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| CompileError::InvalidOutput(e.to_string()))?;
        parse_compiler_output(value, filename)
    }
}

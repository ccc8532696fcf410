//! ABI parser for Solidity compiler output.
//!
//! Reads the JSON ABI emitted by `solc` (either the bare entry array or an
//! artifact object carrying an `abi` field) into a [`ContractSchema`].

use crate::types::*;
use serde::{Deserialize, Serialize};

/// Raw ABI entry as emitted by the compiler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAbiEntry {
    #[serde(rename = "type", default = "default_entry_type")]
    pub entry_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<RawAbiParam>,
    #[serde(default)]
    pub outputs: Vec<RawAbiParam>,
    #[serde(rename = "stateMutability", default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
    /// Pre-0.4.16 ABIs mark read-only functions with `constant`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payable: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAbiParam {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(rename = "internalType", default, skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
    #[serde(default)]
    pub components: Vec<RawAbiParam>,
}

fn default_entry_type() -> String {
    "function".to_string()
}

/// ABI parser errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseError {
    pub message: String,
    pub context: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ctx) = &self.context {
            write!(f, "{}: {}", ctx, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse raw ABI entries into a ContractSchema
pub fn parse_contract_abi(entries: &[RawAbiEntry]) -> Result<ContractSchema, ParseError> {
    let mut schema = ContractSchema::default();

    for (index, entry) in entries.iter().enumerate() {
        let parsed = parse_entry(entry).map_err(|e| e.with_context(format!("ABI entry {}", index)))?;
        schema.entries.push(parsed);
    }

    Ok(schema)
}

fn parse_entry(entry: &RawAbiEntry) -> Result<AbiFunction, ParseError> {
    let kind = EntryKind::from_type_string(&entry.entry_type);

    let name = entry.name.clone().unwrap_or_default();
    if kind == EntryKind::Function && name.is_empty() {
        return Err(ParseError::new("function entry has no name"));
    }

    Ok(AbiFunction {
        name,
        mutability: parse_mutability(entry),
        kind,
        parameters: entry.inputs.iter().map(parse_param).collect(),
        outputs: entry.outputs.iter().map(parse_param).collect(),
    })
}

/// `stateMutability` wins; legacy `constant` / `payable` flags are consulted
/// only when it is absent.
fn parse_mutability(entry: &RawAbiEntry) -> Option<Mutability> {
    if let Some(value) = &entry.state_mutability {
        return Mutability::from_type_string(value);
    }
    match (entry.constant, entry.payable) {
        (Some(true), _) => Some(Mutability::View),
        (_, Some(true)) => Some(Mutability::Payable),
        (Some(false), _) | (_, Some(false)) => Some(Mutability::NonPayable),
        _ => None,
    }
}

fn parse_param(param: &RawAbiParam) -> AbiParameter {
    AbiParameter {
        name: param.name.clone().filter(|n| !n.is_empty()),
        solidity_type: param.type_name.trim().to_string(),
        components: param.components.iter().map(parse_param).collect(),
    }
}

/// Parse an already-decoded JSON value: an entry array, or an object with an
/// `abi` array (compiler artifact / compile endpoint response).
pub fn parse_abi_value(value: serde_json::Value) -> Result<ContractSchema, ParseError> {
    let entries = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut obj) => obj
            .remove("abi")
            .ok_or_else(|| ParseError::new("object has no 'abi' field"))?,
        other => {
            return Err(ParseError::new(format!(
                "expected an ABI array, got {}",
                json_kind(&other)
            )))
        }
    };

    let raw: Vec<RawAbiEntry> = serde_json::from_value(entries)
        .map_err(|e| ParseError::new(format!("Failed to parse ABI: {}", e)))?;

    parse_contract_abi(&raw)
}

/// Parse JSON ABI text into a ContractSchema
pub fn parse_json_abi(json: &str) -> Result<ContractSchema, ParseError> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| ParseError::new(format!("Failed to parse JSON: {}", e)))?;

    parse_abi_value(value)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN_ABI: &str = r#"[
        {
            "type": "constructor",
            "stateMutability": "nonpayable",
            "inputs": [
                {"name": "initialSupply", "type": "uint256", "internalType": "uint256"},
                {"name": "paused", "type": "bool", "internalType": "bool"}
            ]
        },
        {
            "type": "function",
            "name": "balanceOf",
            "stateMutability": "view",
            "inputs": [{"name": "", "type": "address", "internalType": "address"}],
            "outputs": [{"name": "", "type": "uint256", "internalType": "uint256"}]
        },
        {
            "type": "function",
            "name": "transfer",
            "stateMutability": "nonpayable",
            "inputs": [
                {"name": "to", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ],
            "outputs": [{"name": "", "type": "bool"}]
        },
        {
            "type": "event",
            "name": "Transfer",
            "anonymous": false,
            "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ]
        }
    ]"#;

    #[test]
    fn test_parse_json_abi() {
        let schema = parse_json_abi(TOKEN_ABI).unwrap();
        assert_eq!(schema.entries.len(), 4);

        let ctor = schema.constructor().unwrap();
        assert_eq!(ctor.parameters.len(), 2);
        assert_eq!(ctor.parameters[0].name.as_deref(), Some("initialSupply"));

        let balance = &schema.entries[1];
        assert_eq!(balance.kind, EntryKind::Function);
        assert_eq!(balance.mutability, Some(Mutability::View));
        // Empty names are normalized away
        assert_eq!(balance.parameters[0].name, None);
        assert_eq!(balance.outputs[0].solidity_type, "uint256");

        assert_eq!(schema.entries[3].kind, EntryKind::Event);
    }

    #[test]
    fn test_parse_artifact_object() {
        let json = format!(r#"{{"abi": {}, "bytecode": "6080"}}"#, TOKEN_ABI);
        let schema = parse_json_abi(&json).unwrap();
        assert_eq!(schema.functions().count(), 2);
    }

    #[test]
    fn test_parse_tuple_components() {
        let json = r#"[{
            "type": "function",
            "name": "submit",
            "stateMutability": "payable",
            "inputs": [{
                "name": "order",
                "type": "tuple",
                "components": [
                    {"name": "maker", "type": "address"},
                    {"name": "amount", "type": "uint256"}
                ]
            }]
        }]"#;
        let schema = parse_json_abi(json).unwrap();
        let submit = &schema.entries[0];
        assert_eq!(submit.mutability, Some(Mutability::Payable));
        assert_eq!(submit.parameters[0].components.len(), 2);
    }

    #[test]
    fn test_legacy_constant_flag() {
        let json = r#"[{"name": "owner", "constant": true, "inputs": [], "outputs": [{"name": "", "type": "address"}]}]"#;
        let schema = parse_json_abi(json).unwrap();
        assert_eq!(schema.entries[0].kind, EntryKind::Function);
        assert!(schema.entries[0].is_view());
    }

    #[test]
    fn test_missing_mutability_stays_absent() {
        let json = r#"[{"type": "function", "name": "poke", "inputs": []}]"#;
        let schema = parse_json_abi(json).unwrap();
        assert_eq!(schema.entries[0].mutability, None);
    }

    #[test]
    fn test_unnamed_function_rejected() {
        let json = r#"[{"type": "function", "inputs": []}]"#;
        let err = parse_json_abi(json).unwrap_err();
        assert_eq!(err.context.as_deref(), Some("ABI entry 0"));
    }

    #[test]
    fn test_rejects_non_abi_json() {
        assert!(parse_json_abi("42").is_err());
        assert!(parse_json_abi("{\"bytecode\": \"00\"}").is_err());
        assert!(parse_json_abi("not json").is_err());
    }
}

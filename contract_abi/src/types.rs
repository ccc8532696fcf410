//! Type definitions for Solidity contract ABIs.

use serde::{Serialize, Serializer};

/// One input or output slot of an ABI entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbiParameter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub solidity_type: String,
    /// Member types for `tuple` (and `tuple[...]`) parameters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<AbiParameter>,
}

impl AbiParameter {
    pub fn new(name: Option<&str>, solidity_type: &str) -> Self {
        Self {
            name: name.map(str::to_string),
            solidity_type: solidity_type.to_string(),
            components: Vec::new(),
        }
    }

    pub fn category(&self) -> TypeCategory {
        TypeCategory::of(&self.solidity_type)
    }

    /// Display label for a form field: the declared name, or `arg{index}` for
    /// unnamed parameters.
    pub fn label(&self, index: usize) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("arg{}", index),
        }
    }
}

/// Closed classification of a Solidity type string.
///
/// Computed once per parameter and shared by widget selection and coercion so
/// that both policies branch on the same decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    /// `uint<N>` / `int<N>` of any width
    Integer { signed: bool },
    Bool,
    Address,
    /// Any type containing `[`, or a bare `tuple`
    ArrayOrTuple,
    /// Strings, bytes and everything else
    Other,
}

impl TypeCategory {
    pub fn of(solidity_type: &str) -> Self {
        let ty = solidity_type.trim();

        // Array detection comes first: `uint256[]` is a structured literal, not a number.
        if ty.contains('[') || ty == "tuple" {
            return TypeCategory::ArrayOrTuple;
        }
        if let Some(width) = ty.strip_prefix("uint") {
            if width.chars().all(|c| c.is_ascii_digit()) {
                return TypeCategory::Integer { signed: false };
            }
        }
        if let Some(width) = ty.strip_prefix("int") {
            if width.chars().all(|c| c.is_ascii_digit()) {
                return TypeCategory::Integer { signed: true };
            }
        }
        match ty {
            "bool" => TypeCategory::Bool,
            "address" => TypeCategory::Address,
            _ => TypeCategory::Other,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, TypeCategory::Integer { .. })
    }
}

/// ABI entry kind (`type` field of an ABI entry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Function,
    Constructor,
    Event,
    Error,
    Fallback,
    Receive,
    Other(String),
}

impl EntryKind {
    pub fn from_type_string(type_str: &str) -> Self {
        match type_str.trim() {
            "function" => EntryKind::Function,
            "constructor" => EntryKind::Constructor,
            "event" => EntryKind::Event,
            "error" => EntryKind::Error,
            "fallback" => EntryKind::Fallback,
            "receive" => EntryKind::Receive,
            other => EntryKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntryKind::Function => "function",
            EntryKind::Constructor => "constructor",
            EntryKind::Event => "event",
            EntryKind::Error => "error",
            EntryKind::Fallback => "fallback",
            EntryKind::Receive => "receive",
            EntryKind::Other(name) => name,
        }
    }
}

impl Serialize for EntryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// `stateMutability` of a function entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl Mutability {
    pub fn from_type_string(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pure" => Some(Mutability::Pure),
            "view" => Some(Mutability::View),
            "nonpayable" => Some(Mutability::NonPayable),
            "payable" => Some(Mutability::Payable),
            _ => None,
        }
    }
}

/// A single ABI entry. Functions and constructors are the entries this crate
/// works with; other kinds are carried so the schema stays a faithful copy of
/// the compiler output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbiFunction {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(rename = "stateMutability", skip_serializing_if = "Option::is_none")]
    pub mutability: Option<Mutability>,
    #[serde(rename = "inputs")]
    pub parameters: Vec<AbiParameter>,
    pub outputs: Vec<AbiParameter>,
}

impl AbiFunction {
    pub fn function(name: &str, mutability: Option<Mutability>, parameters: Vec<AbiParameter>) -> Self {
        Self {
            name: name.to_string(),
            kind: EntryKind::Function,
            mutability,
            parameters,
            outputs: Vec::new(),
        }
    }

    pub fn constructor(parameters: Vec<AbiParameter>) -> Self {
        Self {
            name: String::new(),
            kind: EntryKind::Constructor,
            mutability: Some(Mutability::NonPayable),
            parameters,
            outputs: Vec::new(),
        }
    }

    pub fn with_outputs(mut self, outputs: Vec<AbiParameter>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn is_function(&self) -> bool {
        self.kind == EntryKind::Function
    }

    /// Only an explicit `view` tag makes a function read-only; a missing tag
    /// is treated as state-changing.
    pub fn is_view(&self) -> bool {
        self.mutability == Some(Mutability::View)
    }
}

/// The full ABI of one contract, in compiler order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContractSchema {
    pub entries: Vec<AbiFunction>,
}

impl ContractSchema {
    pub fn new(entries: Vec<AbiFunction>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn functions(&self) -> impl Iterator<Item = &AbiFunction> {
        self.entries.iter().filter(|e| e.is_function())
    }

    pub fn constructor(&self) -> Option<&AbiFunction> {
        self.entries.iter().find(|e| e.kind == EntryKind::Constructor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_category() {
        assert_eq!(TypeCategory::of("uint256"), TypeCategory::Integer { signed: false });
        assert_eq!(TypeCategory::of("uint"), TypeCategory::Integer { signed: false });
        assert_eq!(TypeCategory::of("int8"), TypeCategory::Integer { signed: true });
        assert_eq!(TypeCategory::of("bool"), TypeCategory::Bool);
        assert_eq!(TypeCategory::of("address"), TypeCategory::Address);
        // Array wins over integer, so `coerce("[1,2,3]", "uint256[]")` parses JSON
        assert_eq!(TypeCategory::of("uint256[]"), TypeCategory::ArrayOrTuple);
        assert_eq!(TypeCategory::of("address[3]"), TypeCategory::ArrayOrTuple);
        assert_eq!(TypeCategory::of("tuple"), TypeCategory::ArrayOrTuple);
        assert_eq!(TypeCategory::of("tuple[]"), TypeCategory::ArrayOrTuple);
        assert_eq!(TypeCategory::of("string"), TypeCategory::Other);
        assert_eq!(TypeCategory::of("bytes32"), TypeCategory::Other);
        // Not an integer width
        assert_eq!(TypeCategory::of("interface"), TypeCategory::Other);
    }

    #[test]
    fn test_parameter_label() {
        assert_eq!(AbiParameter::new(Some("to"), "address").label(0), "to");
        assert_eq!(AbiParameter::new(None, "address").label(2), "arg2");
        assert_eq!(AbiParameter::new(Some(""), "address").label(1), "arg1");
    }

    #[test]
    fn test_missing_mutability_is_not_view() {
        let f = AbiFunction::function("poke", None, vec![]);
        assert!(!f.is_view());
    }

    #[test]
    fn test_schema_serializes_as_abi_array() {
        let schema = ContractSchema::new(vec![AbiFunction::function(
            "get",
            Some(Mutability::View),
            vec![],
        )]);
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json[0]["type"], "function");
        assert_eq!(json[0]["stateMutability"], "view");
        assert_eq!(json[0]["name"], "get");
    }
}

//! Coercion of raw form input into typed call arguments.
//!
//! Coercion is total: malformed input is passed through as the raw string and
//! left for the chain client to reject when the call is encoded.

use crate::types::*;
use num_bigint::BigInt;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// How integer-family arguments are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoercionMode {
    /// Forward the raw string; the destination accepts numeric strings.
    #[default]
    Forward,
    /// Parse into an arbitrary-precision integer (deployment arguments).
    Exact,
}

/// A coerced, ABI-typed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum CallValue {
    Integer(BigInt),
    Bool(bool),
    Text(String),
    Json(serde_json::Value),
}

impl CallValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CallValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// JSON view of the value. Integers become decimal strings so that
    /// 256-bit values survive the trip.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CallValue::Integer(n) => serde_json::Value::String(n.to_string()),
            CallValue::Bool(b) => serde_json::Value::Bool(*b),
            CallValue::Text(s) => serde_json::Value::String(s.clone()),
            CallValue::Json(v) => v.clone(),
        }
    }
}

impl Serialize for CallValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Raw strings typed into a form, keyed by parameter index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentDraft {
    values: BTreeMap<usize, String>,
}

impl ArgumentDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        self.values.insert(index, value.into());
    }

    /// Raw value at `index`, or `""` when the field was never touched.
    pub fn get(&self, index: usize) -> &str {
        self.values.get(&index).map(String::as_str).unwrap_or("")
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl<S: Into<String>> FromIterator<(usize, S)> for ArgumentDraft {
    fn from_iter<I: IntoIterator<Item = (usize, S)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(i, v)| (i, v.into())).collect(),
        }
    }
}

/// Coerce a raw string according to a Solidity type string.
pub fn coerce(raw: &str, solidity_type: &str, mode: CoercionMode) -> CallValue {
    coerce_category(raw, TypeCategory::of(solidity_type), mode)
}

/// Coerce a raw string according to an already computed type category.
pub fn coerce_category(raw: &str, category: TypeCategory, mode: CoercionMode) -> CallValue {
    match category {
        TypeCategory::Integer { .. } => match mode {
            CoercionMode::Forward => CallValue::Text(raw.to_string()),
            CoercionMode::Exact => parse_integer(raw)
                .map(CallValue::Integer)
                .unwrap_or_else(|| CallValue::Text(raw.to_string())),
        },
        TypeCategory::Bool => CallValue::Bool(raw == "true"),
        TypeCategory::Address => CallValue::Text(raw.to_string()),
        TypeCategory::ArrayOrTuple => serde_json::from_str::<serde_json::Value>(raw)
            .map(CallValue::Json)
            .unwrap_or_else(|_| CallValue::Text(raw.to_string())),
        TypeCategory::Other => CallValue::Text(raw.to_string()),
    }
}

/// Decimal (optionally signed) or `0x` hex; blank input is zero.
fn parse_integer(raw: &str) -> Option<BigInt> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(BigInt::from(0));
    }
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return BigInt::parse_bytes(hex.as_bytes(), 16);
    }
    trimmed.parse::<BigInt>().ok()
}

/// One coerced value per parameter, in parameter order. Missing draft entries
/// are coerced from the empty string, never omitted.
pub fn build_arguments(
    parameters: &[AbiParameter],
    draft: &ArgumentDraft,
    mode: CoercionMode,
) -> Vec<CallValue> {
    parameters
        .iter()
        .enumerate()
        .map(|(index, param)| coerce_category(draft.get(index), param.category(), mode))
        .collect()
}

pub fn build_call_arguments(
    function: &AbiFunction,
    draft: &ArgumentDraft,
    mode: CoercionMode,
) -> Vec<CallValue> {
    build_arguments(&function.parameters, draft, mode)
}

//! Schema introspection: read/write partition, canonical signatures and
//! constructor lookup.

use crate::types::*;

/// Partition the schema's `function` entries into read-only (`view`) and
/// state-changing (everything else), preserving ABI order.
///
/// Constructors, events, errors, fallback and receive entries land in neither.
pub fn classify_functions(schema: &ContractSchema) -> (Vec<&AbiFunction>, Vec<&AbiFunction>) {
    schema.functions().partition(|f| f.is_view())
}

/// Canonical `name(type1,type2,...)` signature used to identify a function
/// in a selection list.
pub fn signature_of(function: &AbiFunction) -> String {
    let types: Vec<&str> = function
        .parameters
        .iter()
        .map(|p| p.solidity_type.as_str())
        .collect();
    format!("{}({})", function.name, types.join(","))
}

/// Parameters of the schema's constructor; empty when the contract relies on
/// the implicit no-argument constructor.
pub fn constructor_parameters(schema: &ContractSchema) -> &[AbiParameter] {
    schema
        .constructor()
        .map(|c| c.parameters.as_slice())
        .unwrap_or(&[])
}

pub fn find_by_signature<'a>(pool: &[&'a AbiFunction], signature: &str) -> Option<&'a AbiFunction> {
    pool.iter().copied().find(|f| signature_of(f) == signature)
}

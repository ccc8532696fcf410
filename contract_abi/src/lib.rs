//! Parse Solidity contract ABIs, classify their functions and coerce form
//! input into typed call arguments.

pub mod types;
pub mod parser;
pub mod introspect;
pub mod coerce;

pub use types::*;
pub use parser::{parse_abi_value, parse_contract_abi, parse_json_abi, ParseError, RawAbiEntry, RawAbiParam};
pub use introspect::{classify_functions, constructor_parameters, find_by_signature, signature_of};
pub use coerce::{
    build_arguments, build_call_arguments, coerce, coerce_category, ArgumentDraft, CallValue,
    CoercionMode,
};

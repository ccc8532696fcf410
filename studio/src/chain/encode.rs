//! Conversion between coerced call arguments and ethers ABI tokens.

use super::ChainError;
use contract_abi::{AbiFunction, AbiParameter, CallValue, Mutability};
use ethers::abi::param_type::Reader;
use ethers::abi::{Constructor, Function, Param, ParamType, StateMutability, Token};
use ethers::types::{Address, I256, U256};
use serde_json::{json, Value};

/// Build the ethers `ParamType` for a parameter, expanding `tuple` components
/// and any array suffixes (`tuple[]`, `tuple[2][]`).
pub fn param_type(param: &AbiParameter) -> Result<ParamType, ChainError> {
    let ty = param.solidity_type.as_str();

    if let Some(suffix) = ty.strip_prefix("tuple") {
        let members = param
            .components
            .iter()
            .map(param_type)
            .collect::<Result<Vec<_>, _>>()?;
        return wrap_array_suffix(ParamType::Tuple(members), suffix, ty);
    }

    Reader::read(ty).map_err(|e| ChainError::Abi(format!("unsupported type '{}': {}", ty, e)))
}

fn wrap_array_suffix(mut inner: ParamType, suffix: &str, full: &str) -> Result<ParamType, ChainError> {
    let malformed = || ChainError::Abi(format!("malformed array type '{}'", full));

    let mut rest = suffix;
    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return Err(malformed());
        }
        let close = rest.find(']').ok_or_else(malformed)?;
        let size = &rest[1..close];
        inner = if size.is_empty() {
            ParamType::Array(Box::new(inner))
        } else {
            let n = size.parse::<usize>().map_err(|_| malformed())?;
            ParamType::FixedArray(Box::new(inner), n)
        };
        rest = &rest[close + 1..];
    }
    Ok(inner)
}

fn params(list: &[AbiParameter]) -> Result<Vec<Param>, ChainError> {
    list.iter()
        .map(|p| {
            Ok(Param {
                name: p.name.clone().unwrap_or_default(),
                kind: param_type(p)?,
                internal_type: None,
            })
        })
        .collect()
}

#[allow(deprecated)]
pub fn function(function: &AbiFunction) -> Result<Function, ChainError> {
    let state_mutability = match function.mutability {
        Some(Mutability::Pure) => StateMutability::Pure,
        Some(Mutability::View) => StateMutability::View,
        Some(Mutability::Payable) => StateMutability::Payable,
        Some(Mutability::NonPayable) | None => StateMutability::NonPayable,
    };

    Ok(Function {
        name: function.name.clone(),
        inputs: params(&function.parameters)?,
        outputs: params(&function.outputs)?,
        constant: None,
        state_mutability,
    })
}

pub fn constructor(parameters: &[AbiParameter]) -> Result<Constructor, ChainError> {
    Ok(Constructor {
        inputs: params(parameters)?,
    })
}

/// Tokens for a full argument list; lengths must match.
pub fn tokens(parameters: &[AbiParameter], args: &[CallValue]) -> Result<Vec<Token>, ChainError> {
    if parameters.len() != args.len() {
        return Err(ChainError::Abi(format!(
            "expected {} arguments, got {}",
            parameters.len(),
            args.len()
        )));
    }

    parameters
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (param, value))| {
            let kind = param_type(param)?;
            call_value_to_token(value, &kind).map_err(|message| ChainError::InvalidArgument {
                name: param.label(index),
                message,
            })
        })
        .collect()
}

pub fn parse_address(s: &str) -> Result<Address, ChainError> {
    s.trim()
        .parse::<Address>()
        .map_err(|_| ChainError::InvalidAddress(s.to_string()))
}

fn call_value_to_token(value: &CallValue, kind: &ParamType) -> Result<Token, String> {
    match value {
        CallValue::Integer(n) => text_to_token(&n.to_string(), kind),
        CallValue::Bool(b) => match kind {
            ParamType::Bool => Ok(Token::Bool(*b)),
            other => Err(format!("boolean given for {}", other)),
        },
        CallValue::Text(s) => text_to_token(s, kind),
        CallValue::Json(v) => json_to_token(v, kind),
    }
}

fn text_to_token(s: &str, kind: &ParamType) -> Result<Token, String> {
    match kind {
        ParamType::Address => s
            .trim()
            .parse::<Address>()
            .map(Token::Address)
            .map_err(|_| format!("invalid address: '{}'", s)),
        ParamType::Uint(bits) => {
            let n = parse_uint(s).ok_or_else(|| format!("invalid uint{}: '{}'", bits, s))?;
            if n.bits() > *bits {
                return Err(format!("uint{} out of range: {}", bits, s.trim()));
            }
            Ok(Token::Uint(n))
        }
        ParamType::Int(bits) => {
            let n = parse_int(s).ok_or_else(|| format!("invalid int{}: '{}'", bits, s))?;
            if !int_fits(n, *bits) {
                return Err(format!("int{} out of range: {}", bits, s.trim()));
            }
            Ok(Token::Int(n.into_raw()))
        }
        ParamType::Bool => Ok(Token::Bool(s == "true")),
        ParamType::String => Ok(Token::String(s.to_string())),
        ParamType::Bytes => decode_hex(s).map(Token::Bytes),
        ParamType::FixedBytes(size) => {
            let bytes = decode_hex(s)?;
            if bytes.len() != *size {
                return Err(format!("expected {} bytes, got {}", size, bytes.len()));
            }
            Ok(Token::FixedBytes(bytes))
        }
        ParamType::Array(_) | ParamType::FixedArray(..) | ParamType::Tuple(_) => {
            let parsed: Value = serde_json::from_str(s)
                .map_err(|_| format!("expected a JSON literal for {}, got '{}'", kind, s))?;
            json_to_token(&parsed, kind)
        }
    }
}

fn json_to_token(value: &Value, kind: &ParamType) -> Result<Token, String> {
    match (kind, value) {
        (ParamType::Array(inner), Value::Array(items)) => items
            .iter()
            .map(|v| json_to_token(v, inner))
            .collect::<Result<Vec<_>, _>>()
            .map(Token::Array),
        (ParamType::FixedArray(inner, size), Value::Array(items)) => {
            if items.len() != *size {
                return Err(format!("fixed array expects {} elements, got {}", size, items.len()));
            }
            items
                .iter()
                .map(|v| json_to_token(v, inner))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::FixedArray)
        }
        (ParamType::Tuple(members), Value::Array(items)) => {
            if items.len() != members.len() {
                return Err(format!(
                    "tuple expects {} elements, got {}",
                    members.len(),
                    items.len()
                ));
            }
            items
                .iter()
                .zip(members)
                .map(|(v, t)| json_to_token(v, t))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::Tuple)
        }
        (ParamType::Bool, Value::Bool(b)) => Ok(Token::Bool(*b)),
        (_, Value::String(s)) => text_to_token(s, kind),
        (ParamType::Uint(_) | ParamType::Int(_), Value::Number(n)) => text_to_token(&n.to_string(), kind),
        (kind, other) => Err(format!("cannot encode {} as {}", other, kind)),
    }
}

/// Blank input is zero, as in the form's numeric fields.
fn parse_uint(s: &str) -> Option<U256> {
    let s = s.trim();
    if s.is_empty() {
        return Some(U256::zero());
    }
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => U256::from_str_radix(hex, 16).ok(),
        None => U256::from_dec_str(s).ok(),
    }
}

fn parse_int(s: &str) -> Option<I256> {
    let s = s.trim();
    if s.is_empty() {
        return Some(I256::zero());
    }
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => I256::from_hex_str(hex).ok(),
        None => I256::from_dec_str(s).ok(),
    }
}

/// Whether `n` fits a two's complement integer of `bits` width.
fn int_fits(n: I256, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    let bound = I256::from_raw(U256::one() << (bits - 1));
    n >= -bound && n < bound
}

fn decode_hex(s: &str) -> Result<Vec<u8>, String> {
    let trimmed = s.trim();
    let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(hex_str).map_err(|e| format!("invalid hex: {}", e))
}

/// JSON rendering of decoded return values. A single output is unwrapped.
pub fn tokens_to_json(tokens: Vec<Token>) -> Value {
    let mut values: Vec<Value> = tokens.iter().map(token_to_json).collect();
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Array(values)
    }
}

fn token_to_json(token: &Token) -> Value {
    match token {
        Token::Address(a) => json!(format!("{:?}", a)),
        Token::Uint(n) => json!(n.to_string()),
        Token::Int(n) => json!(I256::from_raw(*n).to_string()),
        Token::Bool(b) => json!(b),
        Token::String(s) => json!(s),
        Token::Bytes(b) | Token::FixedBytes(b) => json!(format!("0x{}", hex::encode(b))),
        Token::Array(items) | Token::FixedArray(items) | Token::Tuple(items) => {
            Value::Array(items.iter().map(token_to_json).collect())
        }
    }
}

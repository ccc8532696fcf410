//! Per-parameter input widget policy.
//!
//! Presentation only: which editor to show for a parameter. Coercion keys off
//! the same [`TypeCategory`] independently.

use contract_abi::{AbiParameter, ArgumentDraft, TypeCategory};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    /// Binary true/false choice
    BoolChoice,
    /// Free text hinting a number
    Numeric,
    /// Free text hinting a `0x...` address
    Address,
    /// Free text holding a JSON literal
    StructuredJson,
    Text,
}

impl WidgetKind {
    pub fn placeholder(&self) -> &'static str {
        match self {
            WidgetKind::BoolChoice => "",
            WidgetKind::Numeric => "number / uint256",
            WidgetKind::Address => "0x...",
            WidgetKind::StructuredJson => "JSON value",
            WidgetKind::Text => "value",
        }
    }

    /// Fixed options for choice widgets; empty for free-text fields.
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            WidgetKind::BoolChoice => &["true", "false"],
            _ => &[],
        }
    }
}

impl From<TypeCategory> for WidgetKind {
    fn from(category: TypeCategory) -> Self {
        match category {
            TypeCategory::Bool => WidgetKind::BoolChoice,
            TypeCategory::Integer { .. } => WidgetKind::Numeric,
            TypeCategory::Address => WidgetKind::Address,
            TypeCategory::ArrayOrTuple => WidgetKind::StructuredJson,
            TypeCategory::Other => WidgetKind::Text,
        }
    }
}

pub fn widget_for(parameter: &AbiParameter) -> WidgetKind {
    WidgetKind::from(parameter.category())
}

/// Everything a front end needs to render one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub index: usize,
    pub label: String,
    pub solidity_type: String,
    pub widget: WidgetKind,
    pub placeholder: &'static str,
}

pub fn fields_for(parameters: &[AbiParameter]) -> Vec<FieldSpec> {
    parameters
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let widget = widget_for(param);
            FieldSpec {
                index,
                label: param.label(index),
                solidity_type: param.solidity_type.clone(),
                widget,
                placeholder: widget.placeholder(),
            }
        })
        .collect()
}

/// Initial draft for the constructor dialog: boolean fields start at
/// `"false"` so the choice widget shows a concrete value, the rest are empty.
pub fn constructor_defaults(parameters: &[AbiParameter]) -> ArgumentDraft {
    parameters
        .iter()
        .enumerate()
        .map(|(index, param)| match widget_for(param) {
            WidgetKind::BoolChoice => (index, "false"),
            _ => (index, ""),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: Option<&str>, ty: &str) -> AbiParameter {
        AbiParameter::new(name, ty)
    }

    #[test]
    fn test_widget_for() {
        assert_eq!(widget_for(&param(None, "bool")), WidgetKind::BoolChoice);
        assert_eq!(widget_for(&param(None, "uint8")), WidgetKind::Numeric);
        assert_eq!(widget_for(&param(None, "int256")), WidgetKind::Numeric);
        assert_eq!(widget_for(&param(None, "address")), WidgetKind::Address);
        assert_eq!(widget_for(&param(None, "bytes32[]")), WidgetKind::StructuredJson);
        assert_eq!(widget_for(&param(None, "tuple")), WidgetKind::StructuredJson);
        assert_eq!(widget_for(&param(None, "string")), WidgetKind::Text);
        assert_eq!(widget_for(&param(None, "bytes")), WidgetKind::Text);
    }

    #[test]
    fn test_fields_for() {
        let fields = fields_for(&[param(Some("to"), "address"), param(None, "uint256")]);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].label, "to");
        assert_eq!(fields[0].placeholder, "0x...");
        assert_eq!(fields[1].label, "arg1");
        assert_eq!(fields[1].widget, WidgetKind::Numeric);
        assert_eq!(fields[1].placeholder, "number / uint256");
    }

    #[test]
    fn test_constructor_defaults() {
        let draft = constructor_defaults(&[param(Some("paused"), "bool"), param(Some("supply"), "uint256")]);
        assert_eq!(draft.get(0), "false");
        assert_eq!(draft.get(1), "");
        assert_eq!(draft.len(), 2);
    }

    #[test]
    fn test_bool_options() {
        assert_eq!(WidgetKind::BoolChoice.options(), &["true", "false"]);
        assert!(WidgetKind::Text.options().is_empty());
    }
}

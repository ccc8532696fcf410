//! Interaction session state.
//!
//! All mutable state of one contract panel (selected schema, mode, function,
//! argument draft, last outcome) lives in [`InteractionSession`] and changes
//! only through its transition methods. The constructor dialog has its own,
//! smaller [`DeploySession`].

use crate::form::{self, FieldSpec};
use contract_abi::{
    build_arguments, classify_functions, constructor_parameters, find_by_signature, signature_of,
    AbiFunction, AbiParameter, ArgumentDraft, CallValue, CoercionMode, ContractSchema,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Which function pool the panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Read,
    Write,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Read => write!(f, "read"),
            Mode::Write => write!(f, "write"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No contract schema loaded")]
    NoSchema,
    #[error("No {mode} function with signature '{signature}'")]
    UnknownFunction { signature: String, mode: Mode },
    #[error("No function selected")]
    NoSelection,
    #[error("Argument index {index} out of range for '{signature}' ({count} parameters)")]
    ArgumentOutOfRange {
        index: usize,
        count: usize,
        signature: String,
    },
}

/// Result of the last dispatched call, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CallOutcome {
    /// Pretty-printed return value of a read call
    Value(String),
    /// Transaction id of a submitted write
    Submitted(String),
    /// Failure message; displayed with an `Error: ` prefix
    Failed(String),
}

impl CallOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, CallOutcome::Failed(_))
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallOutcome::Value(v) => write!(f, "{}", v),
            CallOutcome::Submitted(hash) => write!(f, "{}", hash),
            CallOutcome::Failed(message) => write!(f, "Error: {}", message),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InteractionSession {
    schema: Option<ContractSchema>,
    contract_address: String,
    mode: Mode,
    selected: Option<String>,
    draft: ArgumentDraft,
    outcome: Option<CallOutcome>,
}

impl InteractionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: ContractSchema) -> Self {
        let mut session = Self::default();
        session.load_schema(schema);
        session
    }

    /// Replace the schema (new compilation or deployment). Any selection made
    /// against the previous schema is dropped.
    pub fn load_schema(&mut self, schema: ContractSchema) {
        debug!(entries = schema.entries.len(), "Loading contract schema");
        self.schema = Some(schema);
        self.reset_selection();
    }

    pub fn clear_schema(&mut self) {
        self.schema = None;
        self.reset_selection();
    }

    pub fn schema(&self) -> Option<&ContractSchema> {
        self.schema.as_ref()
    }

    pub fn contract_address(&self) -> &str {
        &self.contract_address
    }

    pub fn set_contract_address(&mut self, address: impl Into<String>) {
        self.contract_address = address.into();
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch between the read and write pools. The pools are disjoint, so the
    /// selection is always dropped, even when re-entering the current mode.
    pub fn switch_mode(&mut self, mode: Mode) {
        debug!(from = %self.mode, to = %mode, "Switching interaction mode");
        self.mode = mode;
        self.reset_selection();
    }

    /// Functions available in the current mode, in ABI order.
    pub fn functions(&self) -> Vec<&AbiFunction> {
        let Some(schema) = &self.schema else {
            return Vec::new();
        };
        let (read, write) = classify_functions(schema);
        match self.mode {
            Mode::Read => read,
            Mode::Write => write,
        }
    }

    pub fn signatures(&self) -> Vec<String> {
        self.functions().into_iter().map(signature_of).collect()
    }

    /// Select a function of the current pool by signature. Resets the draft
    /// and the last outcome.
    pub fn select_function(&mut self, signature: &str) -> Result<(), SessionError> {
        if self.schema.is_none() {
            return Err(SessionError::NoSchema);
        }
        if find_by_signature(&self.functions(), signature).is_none() {
            return Err(SessionError::UnknownFunction {
                signature: signature.to_string(),
                mode: self.mode,
            });
        }

        debug!(signature, mode = %self.mode, "Selected function");
        self.selected = Some(signature.to_string());
        self.draft.clear();
        self.outcome = None;
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.reset_selection();
    }

    pub fn selected_signature(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn current_function(&self) -> Option<&AbiFunction> {
        let signature = self.selected.as_deref()?;
        find_by_signature(&self.functions(), signature)
    }

    pub fn fields(&self) -> Vec<FieldSpec> {
        self.current_function()
            .map(|f| form::fields_for(&f.parameters))
            .unwrap_or_default()
    }

    pub fn set_arg(&mut self, index: usize, value: impl Into<String>) -> Result<(), SessionError> {
        let function = self.current_function().ok_or(SessionError::NoSelection)?;
        let count = function.parameters.len();
        if index >= count {
            return Err(SessionError::ArgumentOutOfRange {
                index,
                count,
                signature: signature_of(function),
            });
        }
        self.draft.set(index, value);
        Ok(())
    }

    pub fn draft(&self) -> &ArgumentDraft {
        &self.draft
    }

    /// Arguments for the selected function, integers forwarded as strings.
    pub fn build_arguments(&self) -> Option<Vec<CallValue>> {
        let function = self.current_function()?;
        Some(build_arguments(&function.parameters, &self.draft, CoercionMode::Forward))
    }

    pub fn outcome(&self) -> Option<&CallOutcome> {
        self.outcome.as_ref()
    }

    pub fn record_outcome(&mut self, outcome: CallOutcome) {
        self.outcome = Some(outcome);
    }

    fn reset_selection(&mut self) {
        self.selected = None;
        self.draft.clear();
        self.outcome = None;
    }
}

/// State of the constructor-parameter dialog.
#[derive(Debug, Clone, Default)]
pub struct DeploySession {
    parameters: Vec<AbiParameter>,
    draft: ArgumentDraft,
}

impl DeploySession {
    pub fn new(schema: &ContractSchema) -> Self {
        let mut session = Self::default();
        session.load_schema(schema);
        session
    }

    /// Re-seed the dialog from a new schema; the previous draft is discarded.
    pub fn load_schema(&mut self, schema: &ContractSchema) {
        self.parameters = constructor_parameters(schema).to_vec();
        self.draft = form::constructor_defaults(&self.parameters);
    }

    pub fn parameters(&self) -> &[AbiParameter] {
        &self.parameters
    }

    pub fn fields(&self) -> Vec<FieldSpec> {
        form::fields_for(&self.parameters)
    }

    pub fn set_arg(&mut self, index: usize, value: impl Into<String>) -> Result<(), SessionError> {
        let count = self.parameters.len();
        if index >= count {
            return Err(SessionError::ArgumentOutOfRange {
                index,
                count,
                signature: "constructor".to_string(),
            });
        }
        self.draft.set(index, value);
        Ok(())
    }

    pub fn draft(&self) -> &ArgumentDraft {
        &self.draft
    }

    /// Constructor arguments, integers parsed exactly.
    pub fn build_arguments(&self) -> Vec<CallValue> {
        build_arguments(&self.parameters, &self.draft, CoercionMode::Exact)
    }
}

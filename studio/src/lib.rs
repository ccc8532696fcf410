//! Contract studio backend.
//!
//! Turns a Solidity ABI into an interaction model (form fields, read/write
//! pools, typed call arguments), dispatches calls through injected chain
//! clients, shapes solc input/output, and applies assistant replies to the
//! project files.

pub mod assistant;
pub mod chain;
pub mod compiler;
pub mod config;
pub mod dispatch;
pub mod form;
pub mod server;
pub mod session;
pub mod workspace;

pub use chain::{ChainError, ChainReader, ReceiptSource, WalletClient};
pub use compiler::{CompileError, CompileOutcome, CompiledContract, Compiler};
pub use session::{CallOutcome, DeploySession, InteractionSession, Mode, SessionError};

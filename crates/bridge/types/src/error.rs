//! Error types for contract value objects and the lifecycle state machine.

use thiserror::Error;

use crate::status::StatusType;

/// Errors raised by value-object validation and lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// The requested status change is not in the transition table.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: StatusType, to: StatusType },

    /// Source text does not look like an Anchor program.
    #[error("invalid rust code: expected `use anchor_lang` header, got {0:?}")]
    InvalidCode(String),

    /// Address is not base58 or does not decode to 32 bytes.
    #[error("invalid program id: {0}")]
    InvalidProgramId(String),

    /// Network outside of testnet/devnet/mainnet.
    #[error("network must be one of [testnet, devnet, mainnet], got {0:?}")]
    InvalidNetwork(String),

    /// Severity outside of warning/error/critical.
    #[error("invalid severity: {0:?}")]
    InvalidSeverity(String),
}

/// Convenience result type for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;

//! Error types for transaction execution

use crate::types::{Natural, OutputRef};
use thiserror::Error;

/// Errors surfaced at the ledger store boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("corrupt output record: {0}")]
    CorruptRecord(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Terminal errors for one execution call. Every failure is deterministic
/// given the same ledger state and transaction bytes, except the last two,
/// which the caller may retry against refreshed state (or not at all).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("non-coinbase transaction has no inputs")]
    NoInputs,

    #[error("duplicate input {0}")]
    DuplicateInput(OutputRef),

    #[error("unknown or already spent output {0}")]
    UnknownOrSpentOutput(OutputRef),

    #[error("spend of {0} not authorized by its ownership proof")]
    UnauthorizedSpend(OutputRef),

    #[error("amount sum overflows u64")]
    AmountOverflow,

    #[error("value not conserved: inputs sum to {sum_prior_outputs}, outputs sum to {sum_current_outputs}")]
    ValueNotConserved {
        sum_prior_outputs: Natural,
        sum_current_outputs: Natural,
    },

    #[error("output {0} was spent concurrently during apply")]
    ConcurrentSpend(OutputRef),

    #[error("storage failure, ledger state may be indeterminate: {0}")]
    StorageFailure(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

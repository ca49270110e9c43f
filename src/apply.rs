//! Ledger application for validated transactions.

use crate::error::{EngineError, Result};
use crate::store::{KeyValueStore, LedgerStore};
use crate::types::{ExecutionResult, OutputRef};
use crate::validation::ValidatedTransaction;

/// Apply a validated transaction to the ledger: remove every spent output,
/// then insert the declared outputs keyed by (transaction id, output
/// index). Purely mechanical; nothing is re-validated here.
///
/// Removal is conditional. A reference that disappeared since validation
/// means a concurrent execution spent it first; the caller must retry the
/// whole execution against fresh state. Deletes are sequenced before
/// inserts, and any backend failure surfaces as
/// [`EngineError::StorageFailure`], after which the ledger state must be
/// treated as indeterminate.
pub fn apply_transaction<S: KeyValueStore>(
    validated: ValidatedTransaction<'_>,
    ledger: &mut LedgerStore<'_, S>,
) -> Result<ExecutionResult> {
    let tx = validated.transaction;

    for input in &tx.inputs {
        if !ledger.delete(&input.reference)? {
            return Err(EngineError::ConcurrentSpend(input.reference.clone()));
        }
    }

    for (index, output) in tx.outputs.iter().enumerate() {
        let reference = OutputRef {
            txid: tx.id,
            index: index as u32,
        };
        ledger.put(&reference, output)?;
    }

    Ok(ExecutionResult {
        is_coinbase: tx.coinbase,
        sum_prior_outputs: validated.sum_prior_outputs,
        sum_current_outputs: validated.sum_current_outputs,
    })
}

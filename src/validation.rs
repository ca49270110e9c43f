//! Transaction validation: the read-only pipeline between decoding and
//! application.

use crate::error::{EngineError, Result};
use crate::ownership::{OwnershipVerifier, SpendContext};
use crate::store::{KeyValueStore, LedgerStore};
use crate::types::{Natural, Output, Transaction};
use std::collections::HashSet;

/// Proof that a transaction passed validation against some ledger state,
/// carrying the sums the applier reports. Cannot be constructed outside
/// this module, so only validated transactions reach the applier.
#[derive(Debug)]
pub struct ValidatedTransaction<'a> {
    pub(crate) transaction: &'a Transaction,
    pub(crate) sum_prior_outputs: Natural,
    pub(crate) sum_current_outputs: Natural,
}

impl ValidatedTransaction<'_> {
    pub fn sum_prior_outputs(&self) -> Natural {
        self.sum_prior_outputs
    }

    pub fn sum_current_outputs(&self) -> Natural {
        self.sum_current_outputs
    }
}

/// Validate a transaction against the current unspent set.
///
/// The pipeline is strictly ordered and fails on the first violation:
///
/// 1. A coinbase transaction must declare no inputs; it skips the input
///    walk entirely and its prior sum is zero.
/// 2. Any other transaction must spend at least one input.
/// 3. Each input must reference a distinct, currently unspent output whose
///    recorded owner authorizes the spend. Resolved amounts accumulate
///    with checked addition.
/// 4. Declared output amounts accumulate with checked addition.
/// 5. For non-coinbase transactions the two sums must match exactly.
///
/// Read-only with respect to the ledger. Failures are deterministic given
/// the same ledger state and transaction, so the engine never retries.
pub fn validate_transaction<'a, S, V>(
    tx: &'a Transaction,
    ledger: &LedgerStore<'_, S>,
    verifier: &V,
) -> Result<ValidatedTransaction<'a>>
where
    S: KeyValueStore,
    V: OwnershipVerifier,
{
    if tx.coinbase {
        if !tx.inputs.is_empty() {
            return Err(EngineError::MalformedTransaction(
                "coinbase transaction declares inputs".to_string(),
            ));
        }
        return Ok(ValidatedTransaction {
            transaction: tx,
            sum_prior_outputs: 0,
            sum_current_outputs: sum_outputs(&tx.outputs)?,
        });
    }

    if tx.inputs.is_empty() {
        return Err(EngineError::NoInputs);
    }

    let context = SpendContext::new(tx);
    let mut seen = HashSet::with_capacity(tx.inputs.len());
    let mut sum_prior_outputs: Natural = 0;

    for input in &tx.inputs {
        // Membership is checked before resolution so a duplicate reference
        // is never counted twice.
        if !seen.insert(&input.reference) {
            return Err(EngineError::DuplicateInput(input.reference.clone()));
        }

        // Absent covers both "never existed" and "already spent": the
        // store tracks only the unspent set.
        let output = ledger
            .get(&input.reference)?
            .ok_or_else(|| EngineError::UnknownOrSpentOutput(input.reference.clone()))?;

        if !verifier.verify(&output.owner, &input.proof, &context) {
            return Err(EngineError::UnauthorizedSpend(input.reference.clone()));
        }

        sum_prior_outputs = sum_prior_outputs
            .checked_add(output.amount)
            .ok_or(EngineError::AmountOverflow)?;
    }

    let sum_current_outputs = sum_outputs(&tx.outputs)?;

    if sum_current_outputs != sum_prior_outputs {
        return Err(EngineError::ValueNotConserved {
            sum_prior_outputs,
            sum_current_outputs,
        });
    }

    Ok(ValidatedTransaction {
        transaction: tx,
        sum_prior_outputs,
        sum_current_outputs,
    })
}

/// Checked sum of declared output amounts. Zero-amount outputs are
/// permitted.
fn sum_outputs(outputs: &[Output]) -> Result<Natural> {
    let mut sum: Natural = 0;
    for output in outputs {
        sum = sum
            .checked_add(output.amount)
            .ok_or(EngineError::AmountOverflow)?;
    }
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{Input, OutputRef};

    struct AcceptAll;

    impl OwnershipVerifier for AcceptAll {
        fn verify(&self, _owner: &[u8], _proof: &[u8], _context: &SpendContext) -> bool {
            true
        }
    }

    struct RejectAll;

    impl OwnershipVerifier for RejectAll {
        fn verify(&self, _owner: &[u8], _proof: &[u8], _context: &SpendContext) -> bool {
            false
        }
    }

    fn reference(seed: u8, index: u32) -> OutputRef {
        OutputRef {
            txid: [seed; 32],
            index,
        }
    }

    fn input(seed: u8, index: u32) -> Input {
        Input {
            reference: reference(seed, index),
            proof: vec![],
        }
    }

    fn output(amount: u64) -> Output {
        Output {
            amount,
            owner: vec![0xaa; 20],
        }
    }

    fn spend(inputs: Vec<Input>, outputs: Vec<Output>) -> Transaction {
        Transaction {
            id: [9; 32],
            coinbase: false,
            inputs,
            outputs,
        }
    }

    fn seeded_store(entries: &[(OutputRef, Output)]) -> MemoryStore {
        let mut store = MemoryStore::new();
        let mut ledger = LedgerStore::new(&mut store);
        for (reference, output) in entries {
            ledger.put(reference, output).unwrap();
        }
        store
    }

    #[test]
    fn test_coinbase_exempt_from_conservation() {
        let tx = Transaction {
            id: [9; 32],
            coinbase: true,
            inputs: vec![],
            outputs: vec![output(50)],
        };
        let mut store = MemoryStore::new();
        let ledger = LedgerStore::new(&mut store);

        let validated = validate_transaction(&tx, &ledger, &RejectAll).unwrap();
        assert_eq!(validated.sum_prior_outputs(), 0);
        assert_eq!(validated.sum_current_outputs(), 50);
    }

    #[test]
    fn test_coinbase_with_inputs_rejected() {
        let tx = Transaction {
            id: [9; 32],
            coinbase: true,
            inputs: vec![input(1, 0)],
            outputs: vec![output(50)],
        };
        let mut store = MemoryStore::new();
        let ledger = LedgerStore::new(&mut store);

        assert!(matches!(
            validate_transaction(&tx, &ledger, &AcceptAll),
            Err(EngineError::MalformedTransaction(_))
        ));
    }

    #[test]
    fn test_no_inputs_rejected() {
        let tx = spend(vec![], vec![output(50)]);
        let mut store = MemoryStore::new();
        let ledger = LedgerStore::new(&mut store);

        assert!(matches!(
            validate_transaction(&tx, &ledger, &AcceptAll),
            Err(EngineError::NoInputs)
        ));
    }

    #[test]
    fn test_unknown_reference_rejected() {
        let tx = spend(vec![input(1, 0)], vec![output(50)]);
        let mut store = MemoryStore::new();
        let ledger = LedgerStore::new(&mut store);

        match validate_transaction(&tx, &ledger, &AcceptAll) {
            Err(EngineError::UnknownOrSpentOutput(r)) => assert_eq!(r, reference(1, 0)),
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_duplicate_input_rejected() {
        let mut store = seeded_store(&[(reference(1, 0), output(50))]);
        let tx = spend(vec![input(1, 0), input(1, 0)], vec![output(100)]);
        let ledger = LedgerStore::new(&mut store);

        match validate_transaction(&tx, &ledger, &AcceptAll) {
            Err(EngineError::DuplicateInput(r)) => assert_eq!(r, reference(1, 0)),
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_unauthorized_spend_rejected() {
        let mut store = seeded_store(&[(reference(1, 0), output(50))]);
        let tx = spend(vec![input(1, 0)], vec![output(50)]);
        let ledger = LedgerStore::new(&mut store);

        match validate_transaction(&tx, &ledger, &RejectAll) {
            Err(EngineError::UnauthorizedSpend(r)) => assert_eq!(r, reference(1, 0)),
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_conserved_transaction_accepted() {
        let mut store = seeded_store(&[
            (reference(1, 0), output(30)),
            (reference(2, 1), output(20)),
        ]);
        let tx = spend(
            vec![input(1, 0), input(2, 1)],
            vec![output(45), output(5)],
        );
        let ledger = LedgerStore::new(&mut store);

        let validated = validate_transaction(&tx, &ledger, &AcceptAll).unwrap();
        assert_eq!(validated.sum_prior_outputs(), 50);
        assert_eq!(validated.sum_current_outputs(), 50);
    }

    #[test]
    fn test_value_not_conserved_reports_both_sums() {
        let mut store = seeded_store(&[(reference(1, 0), output(50))]);
        let tx = spend(vec![input(1, 0)], vec![output(51)]);
        let ledger = LedgerStore::new(&mut store);

        assert!(matches!(
            validate_transaction(&tx, &ledger, &AcceptAll),
            Err(EngineError::ValueNotConserved {
                sum_prior_outputs: 50,
                sum_current_outputs: 51,
            })
        ));
    }

    #[test]
    fn test_input_sum_overflow() {
        let mut store = seeded_store(&[
            (reference(1, 0), output(u64::MAX)),
            (reference(2, 0), output(1)),
        ]);
        let tx = spend(vec![input(1, 0), input(2, 0)], vec![output(1)]);
        let ledger = LedgerStore::new(&mut store);

        assert!(matches!(
            validate_transaction(&tx, &ledger, &AcceptAll),
            Err(EngineError::AmountOverflow)
        ));
    }

    #[test]
    fn test_output_sum_overflow() {
        let tx = Transaction {
            id: [9; 32],
            coinbase: true,
            inputs: vec![],
            outputs: vec![output(u64::MAX), output(1)],
        };
        let mut store = MemoryStore::new();
        let ledger = LedgerStore::new(&mut store);

        assert!(matches!(
            validate_transaction(&tx, &ledger, &AcceptAll),
            Err(EngineError::AmountOverflow)
        ));
    }

    #[test]
    fn test_zero_amount_outputs_permitted() {
        let mut store = seeded_store(&[(reference(1, 0), output(50))]);
        let tx = spend(vec![input(1, 0)], vec![output(50), output(0)]);
        let ledger = LedgerStore::new(&mut store);

        assert!(validate_transaction(&tx, &ledger, &AcceptAll).is_ok());
    }

    #[test]
    fn test_validation_is_read_only() {
        let mut store = seeded_store(&[(reference(1, 0), output(50))]);
        let snapshot = store.clone();

        let ledger = LedgerStore::new(&mut store);
        let tx = spend(vec![input(1, 0)], vec![output(50)]);
        validate_transaction(&tx, &ledger, &AcceptAll).unwrap();

        let rejected = spend(vec![input(1, 0)], vec![output(51)]);
        validate_transaction(&rejected, &ledger, &AcceptAll).unwrap_err();

        assert_eq!(store, snapshot);
    }
}

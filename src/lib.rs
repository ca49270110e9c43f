//! # utxo-engine
//!
//! Execution engine for a UTXO ledger kept in an external key-value store.
//!
//! The engine interprets one serialized transaction at a time, validates it
//! against the current unspent set (inputs exist and are unspent, ownership
//! proofs hold, value is conserved), and applies it as a single state
//! transition: spent outputs are removed, declared outputs are created. A
//! coinbase transaction creates value from nothing and is exempt from the
//! conservation check.
//!
//! ## Architecture
//!
//! - [`codec`] - wire and storage-record serialization
//! - [`store`] - key-value capability set and the typed ledger adapter
//! - [`ownership`] - pluggable ownership-proof verification
//! - [`validation`] - the read-only validation pipeline
//! - [`apply`] - the ledger mutation for validated transactions
//!
//! The engine holds no persistent state of its own: every call is
//! parameterized by an explicitly passed store handle, held only for the
//! duration of that call. Double-spend races between concurrent executions
//! are the store's concern; the applier's conditional delete converts a
//! lost race into [`EngineError::ConcurrentSpend`] instead of a silent
//! double-spend.
//!
//! ## Usage
//!
//! ```rust
//! use utxo_engine::{MemoryStore, Secp256k1Verifier, UtxoEngine};
//!
//! let engine = UtxoEngine::new(Secp256k1Verifier::new());
//! let mut store = MemoryStore::new();
//!
//! // Coinbase transaction: flags, no inputs, one 50-unit output.
//! let mut tx = vec![0x01, 0x00, 0x01];
//! tx.extend_from_slice(&50u64.to_le_bytes());
//! tx.push(20);
//! tx.extend_from_slice(&[0xaa; 20]);
//!
//! let result = engine.execute(&tx, &mut store).unwrap();
//! assert!(result.is_coinbase);
//! assert_eq!(result.sum_current_outputs, 50);
//! ```

pub mod apply;
pub mod codec;
pub mod constants;
pub mod error;
pub mod ownership;
pub mod store;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use constants::*;
pub use error::{EngineError, Result, StoreError, StoreResult};
pub use ownership::{OwnershipVerifier, Secp256k1Verifier, SpendContext};
pub use store::{KeyValueStore, LedgerStore, MemoryStore};
pub use types::*;

/// The UTXO execution engine.
///
/// Generic over the ownership-proof scheme, which is fixed at
/// construction; the store handle is supplied per call. The engine itself
/// is stateless and cheap to share.
pub struct UtxoEngine<V> {
    verifier: V,
}

impl<V: OwnershipVerifier> UtxoEngine<V> {
    pub fn new(verifier: V) -> Self {
        UtxoEngine { verifier }
    }

    /// Execute one serialized transaction against `store`.
    ///
    /// Decoding, validation, and application run sequentially within this
    /// call; there is no internal parallelism and no retry. Every failure
    /// path returns a named [`EngineError`]; nothing is logged or
    /// swallowed.
    ///
    /// ```rust
    /// use utxo_engine::{EngineError, MemoryStore, Secp256k1Verifier, UtxoEngine};
    ///
    /// let engine = UtxoEngine::new(Secp256k1Verifier::new());
    /// let mut store = MemoryStore::new();
    ///
    /// let err = engine.execute(&[0xff], &mut store).unwrap_err();
    /// assert!(matches!(err, EngineError::MalformedTransaction(_)));
    /// ```
    pub fn execute<S: KeyValueStore>(
        &self,
        tx_bytes: &[u8],
        store: &mut S,
    ) -> Result<ExecutionResult> {
        let tx = codec::decode_transaction(tx_bytes)?;
        let mut ledger = LedgerStore::new(store);
        let validated = validation::validate_transaction(&tx, &ledger, &self.verifier)?;
        apply::apply_transaction(validated, &mut ledger)
    }
}

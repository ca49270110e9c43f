//! Core types for UTXO transaction execution

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hash type: 256-bit hash
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Natural number type
pub type Natural = u64;

/// Reference to a spendable output: the id of the transaction that created
/// it plus its position in that transaction's output list. Doubles as the
/// ledger lookup key via its `Display` form `"{hex txid}:{index}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputRef {
    pub txid: Hash,
    pub index: u32,
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.txid {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ":{}", self.index)
    }
}

/// A unit of value assignable to one owner. Created by a transaction's
/// output list, removed from the ledger when spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub amount: Natural,
    pub owner: ByteString,
}

/// References exactly one prior output and carries the material proving
/// the spender's right to consume it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub reference: OutputRef,
    pub proof: ByteString,
}

/// A decoded transaction. Immutable once decoded. The id is derived from
/// the wire bytes, never carried in them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Hash,
    pub coinbase: bool,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
}

/// Read-only execution summary returned to the caller. The caller is
/// responsible for any further conservation re-check and for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub is_coinbase: bool,
    pub sum_prior_outputs: Natural,
    pub sum_current_outputs: Natural,
}

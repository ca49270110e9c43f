//! Structural limits enforced when decoding transactions

/// Maximum serialized transaction size: 1MB
pub const MAX_TX_SIZE: usize = 1_000_000;

/// Maximum number of inputs per transaction
pub const MAX_INPUTS: usize = 1000;

/// Maximum number of outputs per transaction
pub const MAX_OUTPUTS: usize = 1000;

/// Maximum ownership-proof length per input
pub const MAX_PROOF_SIZE: usize = 10_000;

/// Maximum owner-identity length per output
pub const MAX_OWNER_SIZE: usize = 256;

/// Wire flag bit marking a coinbase transaction
pub const FLAG_COINBASE: u8 = 0x01;

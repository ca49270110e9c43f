//! Ownership verification for spends.
//!
//! The engine depends only on the boolean verdict; the concrete proof
//! scheme is a collaborator chosen by the host. [`Secp256k1Verifier`] is
//! the provided pay-to-key-hash scheme.

use crate::codec;
use crate::types::{Hash, Transaction};
use ripemd::Ripemd160;
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, VerifyOnly};
use sha2::{Digest, Sha256};

/// Transaction context an ownership proof commits to.
#[derive(Debug, Clone)]
pub struct SpendContext {
    digest: Hash,
}

impl SpendContext {
    pub fn new(tx: &Transaction) -> Self {
        SpendContext {
            digest: codec::signing_digest(tx),
        }
    }

    /// The message a proof must sign: the transaction's signing digest.
    pub fn digest(&self) -> &Hash {
        &self.digest
    }
}

/// Yes/no authorization check for spending an output.
///
/// Implementations must fail closed: a proof that cannot be evaluated is an
/// invalid proof, with no externally observable difference between the two.
pub trait OwnershipVerifier {
    fn verify(&self, owner: &[u8], proof: &[u8], context: &SpendContext) -> bool;
}

const COMPACT_SIG_LEN: usize = 64;
const COMPRESSED_KEY_LEN: usize = 33;

/// Pay-to-key-hash ownership over secp256k1 ECDSA.
///
/// * owner: `RIPEMD160(SHA256(compressed public key))`, 20 bytes
/// * proof: 64-byte compact signature followed by the 33-byte compressed
///   public key
/// * message: the transaction's signing digest
pub struct Secp256k1Verifier {
    secp: Secp256k1<VerifyOnly>,
}

impl Secp256k1Verifier {
    pub fn new() -> Self {
        Secp256k1Verifier {
            secp: Secp256k1::verification_only(),
        }
    }

    /// Owner identity for a serialized public key.
    pub fn key_hash(public_key: &[u8]) -> Vec<u8> {
        Ripemd160::digest(Sha256::digest(public_key)).to_vec()
    }
}

impl Default for Secp256k1Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl OwnershipVerifier for Secp256k1Verifier {
    fn verify(&self, owner: &[u8], proof: &[u8], context: &SpendContext) -> bool {
        if proof.len() != COMPACT_SIG_LEN + COMPRESSED_KEY_LEN {
            return false;
        }
        let (sig_bytes, key_bytes) = proof.split_at(COMPACT_SIG_LEN);

        let signature = match Signature::from_compact(sig_bytes) {
            Ok(sig) => sig,
            Err(_) => return false,
        };
        let public_key = match PublicKey::from_slice(key_bytes) {
            Ok(pk) => pk,
            Err(_) => return false,
        };

        if Self::key_hash(key_bytes) != owner {
            return false;
        }

        let message = match Message::from_digest_slice(context.digest()) {
            Ok(msg) => msg,
            Err(_) => return false,
        };

        self.secp
            .verify_ecdsa(&message, &signature, &public_key)
            .is_ok()
    }
}

//! Wire and storage codecs for transactions and outputs.
//!
//! Transaction wire layout, little-endian, with Bitcoin-style compact-size
//! varints for every count and length:
//!
//! ```text
//! flags        : u8      bit 0 = coinbase, remaining bits must be zero
//! input count  : varint
//!   per input  : txid (32 bytes) | output index (u32 LE)
//!              | proof length (varint) | proof bytes
//! output count : varint  (at least one output)
//!   per output : amount (u64 LE) | owner length (varint) | owner bytes
//! ```
//!
//! A transaction's id is the double SHA-256 of its full wire bytes. The
//! stored record for an output reuses the wire output layout, so encode
//! and decode are exact inverses.

use crate::constants::*;
use crate::error::{EngineError, Result, StoreError, StoreResult};
use crate::types::{ByteString, Hash, Input, Output, OutputRef, Transaction};
use bitcoin_hashes::{sha256d, Hash as BitcoinHash, HashEngine};

/// Cursor over the wire bytes. Every read fails once the input runs short.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.bytes.len() - self.pos < count {
            return Err(EngineError::MalformedTransaction(
                "unexpected end of input".to_string(),
            ));
        }
        let slice = &self.bytes[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        Ok(u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    /// Compact-size varint: one byte below 0xfd, otherwise a 0xfd/0xfe/0xff
    /// marker followed by a u16/u32/u64 little-endian value.
    fn read_varint(&mut self) -> Result<u64> {
        match self.read_u8()? {
            0xfd => {
                let bytes = self.take(2)?;
                Ok(u64::from(u16::from_le_bytes([bytes[0], bytes[1]])))
            }
            0xfe => Ok(u64::from(self.read_u32()?)),
            0xff => self.read_u64(),
            small => Ok(u64::from(small)),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.pos == self.bytes.len()
    }
}

fn write_varint(out: &mut ByteString, value: u64) {
    if value < 0xfd {
        out.push(value as u8);
    } else if value <= 0xffff {
        out.push(0xfd);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffff_ffff {
        out.push(0xfe);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

fn read_input(reader: &mut Reader) -> Result<Input> {
    let mut txid = [0u8; 32];
    txid.copy_from_slice(reader.take(32)?);
    let index = reader.read_u32()?;

    let proof_len = reader.read_varint()?;
    if proof_len > MAX_PROOF_SIZE as u64 {
        return Err(EngineError::MalformedTransaction(format!(
            "proof of {} bytes exceeds limit",
            proof_len
        )));
    }
    let proof = reader.take(proof_len as usize)?.to_vec();

    Ok(Input {
        reference: OutputRef { txid, index },
        proof,
    })
}

fn read_output(reader: &mut Reader) -> Result<Output> {
    let amount = reader.read_u64()?;

    let owner_len = reader.read_varint()?;
    if owner_len > MAX_OWNER_SIZE as u64 {
        return Err(EngineError::MalformedTransaction(format!(
            "owner identity of {} bytes exceeds limit",
            owner_len
        )));
    }
    let owner = reader.take(owner_len as usize)?.to_vec();

    Ok(Output { amount, owner })
}

fn write_output(out: &mut ByteString, output: &Output) {
    out.extend_from_slice(&output.amount.to_le_bytes());
    write_varint(out, output.owner.len() as u64);
    out.extend_from_slice(&output.owner);
}

/// Decode a transaction from its wire bytes.
///
/// Fails with [`EngineError::MalformedTransaction`] on truncated fields,
/// trailing bytes, unknown flag bits, a missing output list, or any count
/// or length over the structural limits. No side effects.
pub fn decode_transaction(bytes: &[u8]) -> Result<Transaction> {
    if bytes.len() > MAX_TX_SIZE {
        return Err(EngineError::MalformedTransaction(format!(
            "transaction of {} bytes exceeds limit",
            bytes.len()
        )));
    }

    let mut reader = Reader::new(bytes);

    let flags = reader.read_u8()?;
    if flags & !FLAG_COINBASE != 0 {
        return Err(EngineError::MalformedTransaction(format!(
            "unknown flag bits {:#04x}",
            flags
        )));
    }
    let coinbase = flags & FLAG_COINBASE != 0;

    let input_count = reader.read_varint()?;
    if input_count > MAX_INPUTS as u64 {
        return Err(EngineError::MalformedTransaction(format!(
            "{} inputs exceeds limit",
            input_count
        )));
    }
    let mut inputs = Vec::with_capacity(input_count as usize);
    for _ in 0..input_count {
        inputs.push(read_input(&mut reader)?);
    }

    let output_count = reader.read_varint()?;
    if output_count == 0 {
        return Err(EngineError::MalformedTransaction(
            "transaction declares no outputs".to_string(),
        ));
    }
    if output_count > MAX_OUTPUTS as u64 {
        return Err(EngineError::MalformedTransaction(format!(
            "{} outputs exceeds limit",
            output_count
        )));
    }
    let mut outputs = Vec::with_capacity(output_count as usize);
    for _ in 0..output_count {
        outputs.push(read_output(&mut reader)?);
    }

    if !reader.is_exhausted() {
        return Err(EngineError::MalformedTransaction(
            "trailing bytes after transaction".to_string(),
        ));
    }

    Ok(Transaction {
        id: transaction_id(bytes),
        coinbase,
        inputs,
        outputs,
    })
}

/// Encode a transaction into its wire bytes. Inverse of
/// [`decode_transaction`] for canonically encoded input; the id field is
/// derived, not serialized.
pub fn encode_transaction(tx: &Transaction) -> ByteString {
    let mut out = Vec::new();
    out.push(if tx.coinbase { FLAG_COINBASE } else { 0 });

    write_varint(&mut out, tx.inputs.len() as u64);
    for input in &tx.inputs {
        out.extend_from_slice(&input.reference.txid);
        out.extend_from_slice(&input.reference.index.to_le_bytes());
        write_varint(&mut out, input.proof.len() as u64);
        out.extend_from_slice(&input.proof);
    }

    write_varint(&mut out, tx.outputs.len() as u64);
    for output in &tx.outputs {
        write_output(&mut out, output);
    }

    out
}

/// Transaction id: double SHA-256 of the full wire bytes.
pub fn transaction_id(bytes: &[u8]) -> Hash {
    let mut hasher = sha256d::Hash::engine();
    hasher.input(bytes);
    let result = sha256d::Hash::from_engine(hasher);
    let mut id = [0u8; 32];
    id.copy_from_slice(&result);
    id
}

/// Digest an ownership proof commits to: the transaction serialized with
/// every input proof blanked, then double SHA-256. Proof material never
/// signs itself, so the digest is the same before and after proofs are
/// attached.
pub fn signing_digest(tx: &Transaction) -> Hash {
    let mut stripped = tx.clone();
    for input in &mut stripped.inputs {
        input.proof.clear();
    }
    transaction_id(&encode_transaction(&stripped))
}

/// Deterministic ledger key for an output reference.
pub fn output_key(reference: &OutputRef) -> ByteString {
    reference.to_string().into_bytes()
}

/// Encode an output as a storage record.
pub fn encode_output(output: &Output) -> ByteString {
    let mut out = Vec::new();
    write_output(&mut out, output);
    out
}

/// Decode a storage record back into an output. Inverse of
/// [`encode_output`]: for every output `o`,
/// `decode_output(&encode_output(&o)) == Ok(o)`.
pub fn decode_output(bytes: &[u8]) -> StoreResult<Output> {
    let mut reader = Reader::new(bytes);
    let output = read_output(&mut reader)
        .map_err(|_| StoreError::CorruptRecord("truncated output record".to_string()))?;
    if !reader.is_exhausted() {
        return Err(StoreError::CorruptRecord(
            "trailing bytes after output record".to_string(),
        ));
    }
    Ok(output)
}

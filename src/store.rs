//! Ledger store boundary: the key-value capability set supplied by the
//! host, an in-memory backend, and the typed adapter the engine works
//! through for the duration of one execution call.

use crate::codec;
use crate::error::StoreResult;
use crate::types::{Output, OutputRef};
use std::collections::HashMap;

/// Key-value capability set over the external ledger store. Implementable
/// for any backend (database, host state accessor, volatile memory).
pub trait KeyValueStore {
    /// Retrieve an entry; `None` when the key is absent.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Create or replace an entry.
    fn put(&mut self, key: &[u8], value: Vec<u8>) -> StoreResult<()>;

    /// Remove an entry, reporting whether it was present.
    fn delete(&mut self, key: &[u8]) -> StoreResult<bool>;
}

/// Store backed by a heap-allocated HashMap. No persistence: data lives
/// only as long as the store value itself.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    entries: HashMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        self.entries.insert(key.to_vec(), value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// Call-scoped adapter translating output references and records between
/// the engine and the raw store. Performs no validation; a stored record
/// that fails to decode surfaces as a [`crate::error::StoreError::CorruptRecord`].
pub struct LedgerStore<'a, S: KeyValueStore> {
    store: &'a mut S,
}

impl<'a, S: KeyValueStore> LedgerStore<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        LedgerStore { store }
    }

    /// Resolve an output reference against the unspent set.
    pub fn get(&self, reference: &OutputRef) -> StoreResult<Option<Output>> {
        match self.store.get(&codec::output_key(reference))? {
            Some(bytes) => Ok(Some(codec::decode_output(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Record a new unspent output.
    pub fn put(&mut self, reference: &OutputRef, output: &Output) -> StoreResult<()> {
        self.store
            .put(&codec::output_key(reference), codec::encode_output(output))
    }

    /// Conditional removal: reports whether the reference was still present.
    pub fn delete(&mut self, reference: &OutputRef) -> StoreResult<bool> {
        self.store.delete(&codec::output_key(reference))
    }
}

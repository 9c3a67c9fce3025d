//! Structural hashing shared by every property kind.
//!
//! All digests are 64-bit FNV-1a streams. Names are fed as raw UTF-8 bytes
//! and nested digests as 8 little-endian bytes, so an external comparer can
//! reproduce any hash from a property's raw value and its schema.

use fnv::FnvHasher;
use std::cell::Cell;
use std::hash::Hasher;
use tracing::trace;

/// A streaming FNV-1a hasher with the framing used by property digests.
#[derive(Default)]
pub struct StructuralHasher(FnvHasher);

impl StructuralHasher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.0.write(bytes);
    }

    /// Feeds a name exactly as spelled (no case folding).
    pub fn write_name(&mut self, name: &str) {
        self.0.write(name.as_bytes());
    }

    /// Feeds a nested digest as 8 little-endian bytes.
    pub fn write_digest(&mut self, digest: u64) {
        self.0.write(&digest.to_le_bytes());
    }

    #[must_use]
    pub fn finish(&self) -> u64 {
        self.0.finish()
    }
}

/// Cached digest of a container node.
///
/// Mutating operations store a fresh value before returning. Handing out a
/// mutable child clears the cache, and the next read recomputes it.
#[derive(Debug, Clone, Default)]
pub(crate) struct CachedHash(Cell<Option<u64>>);

impl CachedHash {
    pub(crate) fn get_or_compute(&self, compute: impl FnOnce() -> u64) -> u64 {
        if let Some(hash) = self.0.get() {
            return hash;
        }
        let hash = compute();
        trace!(hash, "recomputed structural hash");
        self.0.set(Some(hash));
        hash
    }

    pub(crate) fn set(&self, hash: u64) {
        self.0.set(Some(hash));
    }

    pub(crate) fn invalidate(&self) {
        self.0.set(None);
    }
}

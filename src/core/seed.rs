//! Per-installation jitter seed.
//!
//! The seed is generated once and persisted, so every re-arm on this device
//! draws the same jitter offsets while different devices spread across the
//! window. Zero is reserved as "not yet generated".

use std::hash::{DefaultHasher, Hash, Hasher};

use tracing::debug;

use crate::store::{KvStore, StoreError, keys};

/// Loads the persisted seed, generating and persisting one on first use.
///
/// When `identity` is non-empty the seed is a stable hash of those strings,
/// so reinstalls on the same device land on the same schedule. With no
/// identity the seed is random. The seed is persisted before it is returned.
pub(crate) fn find_or_create_seed(
    store: &dyn KvStore,
    identity: &[String],
) -> Result<u64, StoreError> {
    if let Some(stored) = store.get_i64(keys::SEED)? {
        if stored != 0 {
            return Ok(stored as u64);
        }
    }

    let mut seed = if identity.is_empty() {
        rand::random::<u64>()
    } else {
        let mut hasher = DefaultHasher::new();
        for part in identity {
            part.hash(&mut hasher);
        }
        hasher.finish()
    };
    if seed == 0 {
        seed = 1;
    }

    store.put_i64(keys::SEED, seed as i64)?;
    debug!(seed, "generated jitter seed");
    Ok(seed)
}

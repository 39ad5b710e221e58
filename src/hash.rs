//! Hashing for Riegeli/records structures.

use crate::constants::HIGHWAY_HASH_KEY;
use highway::{HighwayHash, HighwayHasher, Key};

/// Computes the 64-bit HighwayHash of `data` with the Riegeli key.
///
/// Block headers, chunk headers and chunk payloads are all checksummed with
/// this function; the covered byte ranges are defined by the respective
/// codecs.
pub fn highway_hash(data: &[u8]) -> u64 {
    let mut hasher = HighwayHasher::new(Key(HIGHWAY_HASH_KEY));
    hasher.append(data);
    hasher.finalize64()
}

//! Deterministic identifier derivation.
//!
//! Remote object IDs are a pure function of a stable natural key (a GUID
//! or slug), so repeated runs converge on the same ID and never create
//! duplicates.

use sha2::{Digest, Sha256};

/// Length of the short identifier form used for entries.
pub const SHORT_ID_LEN: usize = 10;

/// Full-length content-addressed identifier for a natural key.
pub fn derive_full_id(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// Short identifier form: the first [`SHORT_ID_LEN`] hex characters of
/// the full digest. Collision-safe at the content volumes an export
/// migration sees.
pub fn derive_id(key: &str) -> String {
    let mut id = derive_full_id(key);
    id.truncate(SHORT_ID_LEN);
    id
}

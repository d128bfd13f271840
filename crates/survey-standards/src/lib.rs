#![deny(unsafe_code)]

//! Fixed reference vocabulary for survey responses.
//!
//! - [`ReferenceKey`]: the packaged `question -> answer -> (numeric, text)` key
//! - [`SentinelTable`]: universal non-response codes that override the key
//! - [`MissingSentinelRange`]: numeric codes that mean "coded missing"
//! - [`hash`]: sha256 integrity of the packaged key

pub mod error;
pub mod hash;
pub mod paths;
pub mod reference;
pub mod sentinel;

pub use crate::error::{Result, StandardsError};
pub use crate::hash::{
    reference_digest, sha256_hex, verify_reference_key, write_reference_digest,
};
pub use crate::paths::{
    REFERENCE_ENV_VAR, REFERENCE_KEY_FILE, default_reference_key_path, digest_path_for,
    reference_root,
};
pub use crate::reference::{
    ReferenceEntry, ReferenceKey, load_default_reference_key, load_reference_key,
};
pub use crate::sentinel::{MissingSentinelRange, SENTINEL_CODES, Sentinel, SentinelTable};

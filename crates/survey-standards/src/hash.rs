//! sha256 integrity of the packaged reference key.

use std::path::{Path, PathBuf};

use sha2::Digest;
use tracing::{debug, info};

use crate::error::{Result, StandardsError};
use crate::paths::digest_path_for;

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}

/// sha256 of the key file as lowercase hex.
pub fn reference_digest(key_path: &Path) -> Result<String> {
    let bytes = std::fs::read(key_path).map_err(|e| StandardsError::io(key_path, e))?;
    Ok(sha256_hex(&bytes))
}

/// Compares the key file against the digest stored beside it.
///
/// Returns the verified digest.
pub fn verify_reference_key(key_path: &Path) -> Result<String> {
    let digest_path = digest_path_for(key_path);
    let expected = std::fs::read_to_string(&digest_path)
        .map_err(|e| StandardsError::io(&digest_path, e))?
        .trim()
        .to_ascii_lowercase();
    let actual = reference_digest(key_path)?;
    if expected != actual {
        return Err(StandardsError::Sha256Mismatch {
            path: key_path.to_path_buf(),
            expected,
            actual,
        });
    }
    debug!(path = %key_path.display(), sha256 = %actual, "reference key verified");
    Ok(actual)
}

/// Recomputes the digest of the key file and writes it beside the key.
pub fn write_reference_digest(key_path: &Path) -> Result<PathBuf> {
    let digest = reference_digest(key_path)?;
    let digest_path = digest_path_for(key_path);
    std::fs::write(&digest_path, format!("{digest}\n"))
        .map_err(|e| StandardsError::io(&digest_path, e))?;
    info!(path = %digest_path.display(), sha256 = %digest, "reference digest written");
    Ok(digest_path)
}

//! Reference directory path resolution.

use std::path::{Path, PathBuf};

/// Environment variable for overriding the reference directory.
pub const REFERENCE_ENV_VAR: &str = "SURVEY_REFERENCE_DIR";

/// File name of the packaged answer code key.
pub const REFERENCE_KEY_FILE: &str = "survey_key.csv";

/// Get the reference root directory.
///
/// Resolution order:
/// 1. `SURVEY_REFERENCE_DIR` environment variable
/// 2. `reference/` directory shipped with this crate
pub fn reference_root() -> PathBuf {
    if let Ok(root) = std::env::var(REFERENCE_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("reference")
}

/// Path of the answer code key inside the reference root.
pub fn default_reference_key_path() -> PathBuf {
    reference_root().join(REFERENCE_KEY_FILE)
}

/// Digest file stored beside a key file: `survey_key.csv` -> `survey_key.sha256`.
pub fn digest_path_for(key_path: &Path) -> PathBuf {
    key_path.with_extension("sha256")
}

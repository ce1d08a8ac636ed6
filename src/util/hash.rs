//! Hashing utilities for archive checksums.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::core::recipe::{Checksum, ChecksumKind};

/// Compute the digest of a file with any `Digest` implementation.
fn digest_file<D: Digest>(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut reader = BufReader::new(file);
    let mut hasher = D::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compute SHA256 hash of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    digest_file::<Sha256>(path)
}

/// Compute SHA1 hash of a file.
pub fn sha1_file(path: &Path) -> Result<String> {
    digest_file::<Sha1>(path)
}

/// Hash a file with the algorithm named by `expected`.
pub fn file_digest(path: &Path, kind: ChecksumKind) -> Result<String> {
    match kind {
        ChecksumKind::Sha1 => sha1_file(path),
        ChecksumKind::Sha256 => sha256_file(path),
    }
}

/// Check whether a file matches the expected checksum.
pub fn matches_checksum(path: &Path, expected: &Checksum) -> Result<bool> {
    Ok(file_digest(path, expected.kind)? == expected.hex)
}

//! OCI content digests.
//!
//! Wraps `oci_spec::image::Digest` so parse failures surface as
//! [`RetagError::Validation`].

use crate::error::{Result, RetagError};
use oci_spec::image::Digest as OciDigest;
use sha2::{Digest as Sha2Digest, Sha256};
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
mod tests;

/// A validated content digest such as `sha256:7173b8...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(OciDigest);

impl Digest {
    /// Computes the `sha256` digest of raw content.
    ///
    /// Registries identify a manifest by the digest of its exact bytes, so
    /// this matches `Docker-Content-Digest` for an unmodified manifest.
    pub fn sha256_of(content: &[u8]) -> Result<Self> {
        let hash = Sha256::digest(content);
        Self::from_str(&format!("sha256:{:x}", hash))
    }

    /// Returns the encoded hash portion (without the algorithm prefix).
    pub fn hex(&self) -> &str {
        self.0.digest()
    }
}

impl FromStr for Digest {
    type Err = RetagError;

    fn from_str(s: &str) -> Result<Self> {
        let oci_digest = OciDigest::from_str(s).map_err(|e| {
            RetagError::validation_with_source(format!("Invalid digest format: {}", s), e)
        })?;
        Ok(Digest(oci_digest))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Hash function used to fingerprint document content.
///
/// Both algorithms produce 256-bit digests. A deployment must pick one and
/// keep it: fingerprints recorded on the ledger do not carry the algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintAlgorithm {
    /// SHA-256, verifiable with standard tooling (`sha256sum`).
    #[default]
    Sha256,
    /// BLAKE3 with its default 256-bit output.
    Blake3,
}

impl FingerprintAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for FingerprintAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FingerprintAlgorithm {
    type Err = AlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(AlgorithmError::Unknown(other.to_string())),
        }
    }
}

/// Errors from algorithm selection.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AlgorithmError {
    #[error("unknown fingerprint algorithm: {0}")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_sha256() {
        assert_eq!(FingerprintAlgorithm::default(), FingerprintAlgorithm::Sha256);
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!("SHA-256".parse(), Ok(FingerprintAlgorithm::Sha256));
        assert_eq!("blake3".parse(), Ok(FingerprintAlgorithm::Blake3));
        assert_eq!(
            "md5".parse::<FingerprintAlgorithm>(),
            Err(AlgorithmError::Unknown("md5".into()))
        );
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&FingerprintAlgorithm::Blake3).unwrap();
        assert_eq!(json, "\"blake3\"");
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Length of a fingerprint digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// Hex-encoded 256-bit content digest.
///
/// A `Fingerprint` identifies the exact byte content of a document. It is
/// always stored in lowercase hex so that two fingerprints of the same bytes
/// compare equal as strings, which is how the ledger stores them.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Create a fingerprint from a raw digest.
    pub fn from_digest(digest: [u8; DIGEST_LEN]) -> Self {
        Self(hex::encode(digest))
    }

    /// Parse from a hex string (64 hex characters, any case).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != DIGEST_LEN {
            return Err(TypeError::InvalidLength {
                expected: DIGEST_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// The lowercase hex form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> &str {
        &self.0[..8]
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short_hex())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn from_hex_accepts_valid_digest() {
        let fp = Fingerprint::from_hex(EMPTY_SHA256).unwrap();
        assert_eq!(fp.as_str(), EMPTY_SHA256);
        assert_eq!(fp.to_string(), EMPTY_SHA256);
    }

    #[test]
    fn from_hex_normalizes_case() {
        let upper = EMPTY_SHA256.to_ascii_uppercase();
        let fp = Fingerprint::from_hex(&upper).unwrap();
        assert_eq!(fp, Fingerprint::from_hex(EMPTY_SHA256).unwrap());
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = Fingerprint::from_hex("abcd").unwrap_err();
        assert_eq!(err, TypeError::InvalidLength { expected: 32, actual: 2 });
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        let bad = "zz".repeat(32);
        assert!(matches!(Fingerprint::from_hex(&bad), Err(TypeError::InvalidHex(_))));
    }

    #[test]
    fn from_digest_matches_hex() {
        let fp = Fingerprint::from_digest([0xab; 32]);
        assert_eq!(fp.as_str(), "ab".repeat(32));
        assert_eq!(fp.short_hex(), "abababab");
    }

    #[test]
    fn serde_is_plain_string() {
        let fp = Fingerprint::from_hex(EMPTY_SHA256).unwrap();
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{EMPTY_SHA256}\""));
        let parsed: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, fp);
    }

    #[test]
    fn serde_rejects_malformed() {
        let result: Result<Fingerprint, _> = serde_json::from_str("\"not-a-digest\"");
        assert!(result.is_err());
    }
}

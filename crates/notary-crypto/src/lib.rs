//! Content addressing for the document notary.
//!
//! Provides an incremental hash accumulator that turns a byte stream into a
//! deterministic [`Fingerprint`](notary_types::Fingerprint). Chunk boundaries
//! never influence the result.
//!
//! All crypto operations wrap established libraries. No custom cryptography.

pub mod addresser;
pub mod algorithm;

pub use addresser::ContentAddresser;
pub use algorithm::{AlgorithmError, FingerprintAlgorithm};

//! Tally cryptographic primitives
//!
//! Everything in the workspace that touches a curve goes through this
//! crate: keypair generation, ECDSA signing and verification, owned curve
//! points for the commutative checksum, SHA-256 helpers, and the canonical
//! serialization used as input to every hash.
//!
//! # Curve choice
//!
//! The curve is a compile-time constant: NIST P-256. All public keys,
//! signatures, and checksum points live on it. Changing the curve (or the
//! canonical serialization in [`canonical`]) invalidates every previously
//! produced receipt hash and shard checksum.

pub mod canonical;
mod hash;
mod keys;
mod point;

pub use hash::{sha256, sha256_hex};
pub use keys::{KeyPair, PublicKey, PublicKeyString, Signature};
pub use point::CurvePoint;

use thiserror::Error;

/// Crypto result type
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Crypto errors
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Coordinates do not name a point on the curve
    #[error("invalid curve point encoding")]
    InvalidPoint,

    /// Signature components are not valid scalars
    #[error("invalid signature encoding")]
    InvalidSignature,

    /// Hex string is malformed or has the wrong width
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Signing failed
    #[error("signing failed: {0}")]
    Signing(String),
}

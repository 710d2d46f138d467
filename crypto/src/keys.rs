//! ECDSA keypairs, public keys, and signatures on the fixed curve.

use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use p256::{EncodedPoint, FieldBytes};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::canonical::{self, hex_array};
use crate::{CryptoError, CryptoResult};

/// An ECDSA keypair. The secret half never leaves this type.
pub struct KeyPair {
    signing: SigningKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a fresh keypair from the OS CSPRNG.
    pub fn generate() -> Self {
        let signing = SigningKey::random(&mut OsRng);
        let public = PublicKey::from_verifying_key(signing.verifying_key());
        Self { signing, public }
    }

    /// The public half.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Sign a precomputed 32-byte digest.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> CryptoResult<Signature> {
        let signature: EcdsaSignature = self
            .signing
            .sign_prehash(digest)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        Ok(Signature::from_ecdsa(&signature))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// A public key: the affine coordinates of a curve point.
///
/// Serialized as fixed-width lowercase hex, which makes the canonical
/// form (and therefore [`PublicKeyString`]) stable across runs and
/// machines.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(with = "hex_array")]
    pub x: [u8; 32],
    #[serde(with = "hex_array")]
    pub y: [u8; 32],
}

impl PublicKey {
    pub(crate) fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        // A verifying key is never the identity, so both coordinates exist.
        let x: [u8; 32] = (*point.x().expect("verifying key has affine x")).into();
        let y: [u8; 32] = (*point.y().expect("verifying key has affine y")).into();
        Self { x, y }
    }

    /// Rebuild the ECDSA verifying key, validating that the coordinates
    /// name a point on the curve.
    pub fn to_verifying_key(&self) -> CryptoResult<VerifyingKey> {
        let point = EncodedPoint::from_affine_coordinates(
            &FieldBytes::from(self.x),
            &FieldBytes::from(self.y),
            false,
        );
        VerifyingKey::from_encoded_point(&point).map_err(|_| CryptoError::InvalidPoint)
    }

    /// Verify a signature over a precomputed 32-byte digest.
    ///
    /// An off-curve key or malformed signature verifies as `false` rather
    /// than erroring; a forged encoding is just an invalid signature.
    pub fn verify_digest(&self, digest: &[u8; 32], signature: &Signature) -> bool {
        let Ok(key) = self.to_verifying_key() else {
            return false;
        };
        let Ok(signature) = signature.to_ecdsa() else {
            return false;
        };
        key.verify_prehash(digest, &signature).is_ok()
    }

    /// Canonical string form; the account-table key.
    pub fn key_string(&self) -> PublicKeyString {
        PublicKeyString(canonical::to_string(self))
    }
}

/// The canonical serialized form of a [`PublicKey`], used wherever keys
/// index a map.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKeyString(String);

impl PublicKeyString {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicKeyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ECDSA signature: the `(r, s)` scalar pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(with = "hex_array")]
    pub r: [u8; 32],
    #[serde(with = "hex_array")]
    pub s: [u8; 32],
}

impl Signature {
    fn from_ecdsa(signature: &EcdsaSignature) -> Self {
        let (r, s) = signature.split_bytes();
        Self {
            r: r.into(),
            s: s.into(),
        }
    }

    fn to_ecdsa(&self) -> CryptoResult<EcdsaSignature> {
        let mut raw = [0u8; 64];
        raw[..32].copy_from_slice(&self.r);
        raw[32..].copy_from_slice(&self.s);
        EcdsaSignature::from_slice(&raw).map_err(|_| CryptoError::InvalidSignature)
    }
}

//! Owned curve points and the arithmetic behind the commutative checksum.

use p256::elliptic_curve::ops::Reduce;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::CryptoError;

/// A point on the fixed curve, held by value.
///
/// This is the aggregate type of the commutative checksum: inserting a
/// record adds `mul_base(H(record))`, removing it adds the negation, and
/// because point addition commutes the aggregate depends only on the
/// multiset of records present. Each holder owns an independent point;
/// there is no shared mutable state between aggregates.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "PointCoordinates", try_from = "PointCoordinates")]
pub struct CurvePoint {
    inner: ProjectivePoint,
}

impl CurvePoint {
    /// The additive identity; the checksum of an empty record set.
    pub fn identity() -> Self {
        Self {
            inner: ProjectivePoint::IDENTITY,
        }
    }

    /// The group generator.
    pub fn generator() -> Self {
        Self {
            inner: ProjectivePoint::GENERATOR,
        }
    }

    /// Multiply the generator by the scalar named by a 32-byte digest
    /// (reduced modulo the group order).
    pub fn mul_base(digest: &[u8; 32]) -> Self {
        let scalar = Scalar::reduce_bytes(&FieldBytes::from(*digest));
        Self {
            inner: ProjectivePoint::GENERATOR * scalar,
        }
    }

    /// Point addition.
    pub fn add(&self, other: &CurvePoint) -> CurvePoint {
        CurvePoint {
            inner: self.inner + other.inner,
        }
    }

    /// The additive inverse (the point with negated y).
    pub fn negate(&self) -> CurvePoint {
        CurvePoint { inner: -self.inner }
    }

    pub fn is_identity(&self) -> bool {
        self.inner == ProjectivePoint::IDENTITY
    }

    /// Affine coordinates as fixed-width lowercase hex, or `None` for the
    /// identity, which has no affine form.
    pub fn coordinates(&self) -> Option<(String, String)> {
        let encoded = self.inner.to_affine().to_encoded_point(false);
        match (encoded.x(), encoded.y()) {
            (Some(x), Some(y)) => Some((hex::encode(x), hex::encode(y))),
            _ => None,
        }
    }
}

impl fmt::Debug for CurvePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.coordinates() {
            Some((x, y)) => write!(f, "CurvePoint({x},{y})"),
            None => f.write_str("CurvePoint(identity)"),
        }
    }
}

/// Wire form of a point: hex coordinates, empty strings for the identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct PointCoordinates {
    x: String,
    y: String,
}

impl From<CurvePoint> for PointCoordinates {
    fn from(point: CurvePoint) -> Self {
        match point.coordinates() {
            Some((x, y)) => Self { x, y },
            None => Self {
                x: String::new(),
                y: String::new(),
            },
        }
    }
}

impl TryFrom<PointCoordinates> for CurvePoint {
    type Error = CryptoError;

    fn try_from(coords: PointCoordinates) -> Result<Self, Self::Error> {
        if coords.x.is_empty() && coords.y.is_empty() {
            return Ok(CurvePoint::identity());
        }
        let x = decode_coordinate(&coords.x)?;
        let y = decode_coordinate(&coords.y)?;
        let encoded = EncodedPoint::from_affine_coordinates(
            &FieldBytes::from(x),
            &FieldBytes::from(y),
            false,
        );
        let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .ok_or(CryptoError::InvalidPoint)?;
        Ok(CurvePoint {
            inner: affine.into(),
        })
    }
}

fn decode_coordinate(text: &str) -> Result<[u8; 32], CryptoError> {
    let raw = hex::decode(text).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
    raw.try_into()
        .map_err(|_| CryptoError::InvalidHex("expected 32 bytes".into()))
}

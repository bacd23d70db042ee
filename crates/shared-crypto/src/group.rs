//! # Group Arithmetic (secp256k1)
//!
//! Prime-order group used for pseudonyms, ElGamal pairs and the shuffle proofs.
//!
//! [`GroupElement`] wraps a projective point and serializes as its SEC1
//! compressed encoding (33 bytes, or a single `0x00` byte for the identity).
//! Scalars are the curve's scalar field (`k256::Scalar`); the `scalar_serde`
//! and `scalars_serde` modules let proof structs carry them through serde.

use crate::{CryptoError, Result};
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::{Field, PrimeField};
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, U256};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};

pub use k256::Scalar;

/// A point of the secp256k1 group.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct GroupElement(ProjectivePoint);

impl GroupElement {
    /// The standard base point `G`.
    pub fn generator() -> Self {
        Self(ProjectivePoint::GENERATOR)
    }

    /// The neutral element.
    pub fn identity() -> Self {
        Self(ProjectivePoint::IDENTITY)
    }

    /// `scalar · G`.
    pub fn mul_base(scalar: &Scalar) -> Self {
        Self(ProjectivePoint::GENERATOR * scalar)
    }

    /// Uniformly random element with unknown discrete log to the caller.
    pub fn random() -> Self {
        Self::mul_base(&random_scalar())
    }

    /// True for the neutral element.
    pub fn is_identity(&self) -> bool {
        self.0 == ProjectivePoint::IDENTITY
    }

    /// SEC1 compressed encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_affine().to_encoded_point(true).as_bytes().to_vec()
    }

    /// Decode a SEC1 encoding (compressed or uncompressed).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| CryptoError::InvalidGroupElement)?;
        let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .ok_or(CryptoError::InvalidGroupElement)?;
        Ok(Self(ProjectivePoint::from(affine)))
    }

    /// Access the underlying projective point.
    pub fn as_point(&self) -> &ProjectivePoint {
        &self.0
    }
}

impl From<ProjectivePoint> for GroupElement {
    fn from(point: ProjectivePoint) -> Self {
        Self(point)
    }
}

impl TryFrom<Vec<u8>> for GroupElement {
    type Error = CryptoError;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        Self::from_bytes(&bytes)
    }
}

impl From<GroupElement> for Vec<u8> {
    fn from(element: GroupElement) -> Self {
        element.to_bytes()
    }
}

impl Hash for GroupElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl fmt::Display for GroupElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for GroupElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        let shown = bytes.len().min(8);
        write!(f, "GroupElement({}..)", hex::encode(&bytes[..shown]))
    }
}

impl Add for GroupElement {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for GroupElement {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for GroupElement {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<Scalar> for GroupElement {
    type Output = Self;

    fn mul(self, rhs: Scalar) -> Self {
        Self(self.0 * rhs)
    }
}

impl Mul<&Scalar> for GroupElement {
    type Output = Self;

    fn mul(self, rhs: &Scalar) -> Self {
        Self(self.0 * rhs)
    }
}

impl Sum for GroupElement {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::identity(), Add::add)
    }
}

/// Draw a uniformly random scalar from the thread CSPRNG.
pub fn random_scalar() -> Scalar {
    Scalar::random(&mut rand::thread_rng())
}

/// Hash arbitrary byte strings to a scalar (SHA-256, reduced mod n).
pub fn hash_to_scalar(parts: &[&[u8]]) -> Scalar {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let digest: FieldBytes = hasher.finalize();
    <Scalar as Reduce<U256>>::reduce_bytes(&digest)
}

/// Decode a canonical 32-byte big-endian scalar.
pub fn scalar_from_bytes(bytes: &[u8]) -> Result<Scalar> {
    if bytes.len() != 32 {
        return Err(CryptoError::InvalidScalar);
    }
    let repr = FieldBytes::clone_from_slice(bytes);
    Option::<Scalar>::from(Scalar::from_repr(repr)).ok_or(CryptoError::InvalidScalar)
}

/// Multiplicative inverse, failing on zero.
pub fn invert(scalar: &Scalar) -> Result<Scalar> {
    Option::<Scalar>::from(scalar.invert()).ok_or(CryptoError::NonInvertible)
}

/// Encode a point list as `count(u32 BE) || (len(u8) || bytes)*`.
pub fn encode_list(points: &[GroupElement]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + points.len() * 34);
    out.extend_from_slice(&(points.len() as u32).to_be_bytes());
    for point in points {
        let bytes = point.to_bytes();
        out.push(bytes.len() as u8);
        out.extend_from_slice(&bytes);
    }
    out
}

/// Inverse of [`encode_list`].
pub fn decode_list(bytes: &[u8]) -> Result<Vec<GroupElement>> {
    let header: [u8; 4] = bytes
        .get(..4)
        .and_then(|h| h.try_into().ok())
        .ok_or_else(|| CryptoError::MalformedList("missing count".into()))?;
    let count = u32::from_be_bytes(header) as usize;
    let mut points = Vec::with_capacity(count.min(4096));
    let mut cursor = 4;
    for index in 0..count {
        let len = *bytes
            .get(cursor)
            .ok_or_else(|| CryptoError::MalformedList(format!("truncated at element {index}")))?
            as usize;
        cursor += 1;
        let body = bytes
            .get(cursor..cursor + len)
            .ok_or_else(|| CryptoError::MalformedList(format!("truncated at element {index}")))?;
        points.push(GroupElement::from_bytes(body)?);
        cursor += len;
    }
    if cursor != bytes.len() {
        return Err(CryptoError::MalformedList("trailing bytes".into()));
    }
    Ok(points)
}

/// ElGamal mixing key pair: secret `x`, public `x·G`.
#[derive(Clone)]
pub struct MixKeyPair {
    secret: Scalar,
    public: GroupElement,
}

impl MixKeyPair {
    /// Generate a fresh key pair.
    pub fn generate() -> Self {
        Self::from_secret(random_scalar())
    }

    /// Build from an existing secret scalar.
    pub fn from_secret(secret: Scalar) -> Self {
        Self {
            secret,
            public: GroupElement::mul_base(&secret),
        }
    }

    /// Secret scalar.
    pub fn secret(&self) -> &Scalar {
        &self.secret
    }

    /// Public point.
    pub fn public(&self) -> GroupElement {
        self.public
    }
}

impl fmt::Debug for MixKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MixKeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// Serde adapter for a single scalar (32-byte big-endian).
pub mod scalar_serde {
    use super::{scalar_from_bytes, Scalar};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize as a byte vector.
    pub fn serialize<S: Serializer>(scalar: &Scalar, serializer: S) -> Result<S::Ok, S::Error> {
        scalar.to_bytes().to_vec().serialize(serializer)
    }

    /// Deserialize from a byte vector, rejecting non-canonical values.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Scalar, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        scalar_from_bytes(&bytes).map_err(D::Error::custom)
    }
}

/// Serde adapter for a scalar vector.
pub mod scalars_serde {
    use super::{scalar_from_bytes, Scalar};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize as a list of byte vectors.
    pub fn serialize<S: Serializer>(scalars: &[Scalar], serializer: S) -> Result<S::Ok, S::Error> {
        scalars
            .iter()
            .map(|s| s.to_bytes().to_vec())
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    /// Deserialize from a list of byte vectors.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Scalar>, D::Error> {
        Vec::<Vec<u8>>::deserialize(deserializer)?
            .iter()
            .map(|bytes| scalar_from_bytes(bytes).map_err(D::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encoding_roundtrip() {
        let point = GroupElement::random();
        let bytes = point.to_bytes();
        assert_eq!(bytes.len(), 33);
        assert_eq!(GroupElement::from_bytes(&bytes).unwrap(), point);
    }

    #[test]
    fn test_identity_encoding() {
        let identity = GroupElement::identity();
        assert_eq!(identity.to_bytes(), vec![0u8]);
        assert!(GroupElement::from_bytes(&[0u8]).unwrap().is_identity());
    }

    #[test]
    fn test_invalid_encoding_rejected() {
        let mut bad_tag = GroupElement::random().to_bytes();
        bad_tag[0] = 0x05;
        assert!(GroupElement::from_bytes(&bad_tag).is_err());
        assert!(GroupElement::from_bytes(&[0x02, 0x01]).is_err());
    }

    #[test]
    fn test_arithmetic_consistency() {
        let a = random_scalar();
        let b = random_scalar();
        let lhs = GroupElement::mul_base(&(a + b));
        let rhs = GroupElement::mul_base(&a) + GroupElement::mul_base(&b);
        assert_eq!(lhs, rhs);
        assert_eq!(rhs - GroupElement::mul_base(&b), GroupElement::mul_base(&a));
    }

    #[test]
    fn test_list_roundtrip_with_identity() {
        let list = vec![GroupElement::random(), GroupElement::identity(), GroupElement::random()];
        let decoded = decode_list(&encode_list(&list)).unwrap();
        assert_eq!(decoded, list);
    }

    #[test]
    fn test_truncated_list_rejected() {
        let encoded = encode_list(&[GroupElement::random()]);
        assert!(decode_list(&encoded[..encoded.len() - 1]).is_err());
        assert!(decode_list(&[0, 0]).is_err());
    }

    #[test]
    fn test_serde_through_bincode() {
        let point = GroupElement::random();
        let bytes = bincode::serialize(&point).unwrap();
        let restored: GroupElement = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, point);
    }

    #[test]
    fn test_hash_to_scalar_deterministic() {
        assert_eq!(hash_to_scalar(&[b"a", b"b"]), hash_to_scalar(&[b"ab"]));
        assert_ne!(hash_to_scalar(&[b"a"]), hash_to_scalar(&[b"b"]));
    }

    #[test]
    fn test_invert_zero_fails() {
        assert!(invert(&Scalar::ZERO).is_err());
        let s = random_scalar();
        assert_eq!(invert(&s).unwrap() * s, Scalar::ONE);
    }

    proptest! {
        #[test]
        fn prop_scalar_bytes_roundtrip(seed in any::<[u8; 32]>()) {
            let scalar = hash_to_scalar(&[&seed]);
            let restored = scalar_from_bytes(&scalar.to_bytes()).unwrap();
            prop_assert_eq!(restored, scalar);
        }
    }
}

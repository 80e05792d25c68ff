use std::str::FromStr;

use alloy_primitives::hex;
use bls12_381::G1Affine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ssz::Encode;
use ssz_derive::{Decode, Encode};
use ssz_types::{FixedVector, typenum::U48};
use tree_hash_derive::TreeHash;

use crate::errors::BLSError;

/// Compressed BLS12-381 G1 public key, kept in byte form.
///
/// Registry and committee plumbing only ever needs the 48 compressed bytes;
/// [`PubKey::decompress`] is the single place a curve point is materialized.
#[derive(Debug, PartialEq, Eq, Clone, Encode, Decode, TreeHash, Default)]
pub struct PubKey {
    pub inner: FixedVector<u8, U48>,
}

impl Serialize for PubKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let val = format!("0x{}", hex::encode(self.inner.as_ssz_bytes()));
        serializer.serialize_str(&val)
    }
}

impl<'de> Deserialize<'de> for PubKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let result: String = Deserialize::deserialize(deserializer)?;
        PubKey::from_str(&result).map_err(serde::de::Error::custom)
    }
}

impl FromStr for PubKey {
    type Err = BLSError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let clean_str = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(clean_str).map_err(|_| BLSError::InvalidHexString)?;

        if bytes.len() != 48 {
            return Err(BLSError::InvalidByteLength);
        }

        Ok(PubKey {
            inner: FixedVector::from(bytes),
        })
    }
}

impl PubKey {
    pub fn to_bytes(&self) -> &[u8] {
        self.inner.iter().as_slice()
    }

    pub fn from_affine(point: G1Affine) -> Self {
        PubKey {
            inner: FixedVector::from(point.to_compressed().to_vec()),
        }
    }

    /// Decode and validate the compressed point. Rejects encodings that are
    /// not on the curve or carry a torsion component; the identity is rejected
    /// too since no validator key may be the point at infinity.
    pub fn decompress(&self) -> Result<G1Affine, BLSError> {
        let bytes: [u8; 48] = self
            .to_bytes()
            .try_into()
            .map_err(|_| BLSError::InvalidByteLength)?;
        let point = G1Affine::from_compressed(&bytes)
            .into_option()
            .ok_or(BLSError::InvalidPoint)?;
        if bool::from(point.is_identity()) || !bool::from(point.is_torsion_free()) {
            return Err(BLSError::InvalidPoint);
        }
        Ok(point)
    }
}

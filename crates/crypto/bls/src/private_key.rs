use bls12_381::{G1Affine, G1Projective, Scalar};

use crate::{errors::BLSError, pubkey::PubKey};

/// BLS12-381 secret key scalar.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pub(crate) inner: Scalar,
}

impl PrivateKey {
    /// Wrap a raw scalar, rejecting zero (the only scalar without a usable
    /// public key).
    pub fn from_scalar(scalar: Scalar) -> Result<Self, BLSError> {
        if scalar == Scalar::zero() {
            return Err(BLSError::InvalidSecretKey);
        }
        Ok(PrivateKey { inner: scalar })
    }

    /// Big-endian 32-byte secret key per the IETF BLS I2OSP convention.
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Result<Self, BLSError> {
        let mut le = *bytes;
        le.reverse();
        let scalar = Scalar::from_bytes(&le)
            .into_option()
            .ok_or(BLSError::InvalidSecretKey)?;
        Self::from_scalar(scalar)
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = self.inner.to_bytes();
        bytes.reverse();
        bytes
    }

    pub fn public_key(&self) -> PubKey {
        let point = G1Affine::from(G1Projective::generator() * self.inner);
        PubKey::from_affine(point)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.write_str("PrivateKey(..)")
    }
}

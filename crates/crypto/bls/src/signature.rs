use alloy_primitives::hex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ssz::Encode;
use ssz_derive::{Decode, Encode};
use ssz_types::{FixedVector, typenum::U96};
use tree_hash_derive::TreeHash;

/// Compressed BLS12-381 G2 signature.
///
/// The default value is all zero bytes, which is the SSZ default used in
/// empty block bodies, not the compressed point at infinity.
#[derive(Debug, PartialEq, Eq, Clone, Encode, Decode, TreeHash, Default)]
pub struct BLSSignature {
    pub inner: FixedVector<u8, U96>,
}

impl Serialize for BLSSignature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let val = format!("0x{}", hex::encode(self.inner.as_ssz_bytes()));
        serializer.serialize_str(&val)
    }
}

impl<'de> Deserialize<'de> for BLSSignature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let result: String = Deserialize::deserialize(deserializer)?;
        let result = hex::decode(result.strip_prefix("0x").unwrap_or(&result))
            .map_err(serde::de::Error::custom)?;
        Ok(Self {
            inner: FixedVector::from(result),
        })
    }
}

impl BLSSignature {
    pub fn to_bytes(&self) -> &[u8] {
        self.inner.iter().as_slice()
    }
}

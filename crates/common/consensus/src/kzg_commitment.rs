use alloy_primitives::hex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ssz_derive::{Decode, Encode};
use ssz_types::{FixedVector, typenum::U48};
use tree_hash_derive::TreeHash;

#[derive(Debug, PartialEq, Eq, Clone, Encode, Decode, TreeHash, Default)]
pub struct KZGCommitment {
    pub inner: FixedVector<u8, U48>,
}

impl Serialize for KZGCommitment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.inner.iter().as_slice())))
    }
}

impl<'de> Deserialize<'de> for KZGCommitment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let result: String = Deserialize::deserialize(deserializer)?;
        let bytes = hex::decode(result.strip_prefix("0x").unwrap_or(&result))
            .map_err(serde::de::Error::custom)?;
        Ok(Self {
            inner: FixedVector::from(bytes),
        })
    }
}

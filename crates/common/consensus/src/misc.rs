use std::cmp::max;

use alloy_primitives::B256;
use anyhow::ensure;
use ethereum_hashing::hash;

use crate::constants::SHUFFLE_ROUND_COUNT;

pub mod checksummed_address {
    use alloy_primitives::Address;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S>(address: &Address, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let checksummed = address.to_checksum(None);
        serializer.serialize_str(&checksummed)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Address, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        s.parse::<Address>().map_err(D::Error::custom)
    }
}

/// Swap-or-not shuffle of a single index, as specified for committee
/// computation. Deterministic in `(index, index_count, seed)`.
pub fn compute_shuffled_index(
    mut index: usize,
    index_count: usize,
    seed: B256,
) -> anyhow::Result<usize> {
    ensure!(index < index_count, "Index must be less than index_count");
    for round in 0..SHUFFLE_ROUND_COUNT {
        let seed_with_round = [seed.as_slice(), &round.to_le_bytes()].concat();
        let pivot = bytes_to_int64(&hash(&seed_with_round)[..]) % index_count as u64;

        let flip = (pivot as usize + (index_count - index)) % index_count;
        let position = max(index, flip);
        let seed_with_position = [
            seed_with_round.as_slice(),
            &(position / 256).to_le_bytes()[0..4],
        ]
        .concat();
        let source = hash(&seed_with_position);
        let byte = source[(position % 256) / 8];
        let bit = (byte >> (position % 8)) % 2;

        index = if bit == 1 { flip } else { index };
    }
    Ok(index)
}

// Return the integer deserialization of ``data`` interpreted as ``ENDIANNESS``-endian.
pub fn bytes_to_int64(slice: &[u8]) -> u64 {
    let mut bytes = [0u8; 8];
    let len = slice.len().min(8);
    bytes[..len].copy_from_slice(&slice[..len]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::b256;

    use super::*;

    #[test]
    fn shuffled_index_is_a_permutation() {
        let seed = b256!("0x0101010101010101010101010101010101010101010101010101010101010101");
        let count = 100;
        let mut seen = vec![false; count];
        for index in 0..count {
            let shuffled = compute_shuffled_index(index, count, seed).expect("index in range");
            assert!(!seen[shuffled], "two inputs mapped to {shuffled}");
            seen[shuffled] = true;
        }
    }

    #[test]
    fn shuffled_index_rejects_out_of_range() {
        assert!(compute_shuffled_index(3, 3, B256::ZERO).is_err());
    }

    #[test]
    fn bytes_to_int64_is_little_endian() {
        assert_eq!(bytes_to_int64(&[1, 0, 0, 0, 0, 0, 0, 0]), 1);
        assert_eq!(bytes_to_int64(&[0, 1]), 256);
    }
}

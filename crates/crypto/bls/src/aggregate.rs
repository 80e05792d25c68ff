use bls12_381::{G1Affine, G1Projective};

use crate::{errors::BLSError, pubkey::PubKey};

/// Sum the given public keys in G1 and return the compressed aggregate.
///
/// Fails on the first key that does not decode to a valid subgroup point.
pub fn aggregate_pubkeys<'a, I>(pubkeys: I) -> Result<PubKey, BLSError>
where
    I: IntoIterator<Item = &'a PubKey>,
{
    let mut aggregate = G1Projective::identity();
    for pubkey in pubkeys {
        aggregate += G1Projective::from(pubkey.decompress()?);
    }
    Ok(PubKey::from_affine(G1Affine::from(aggregate)))
}

#[cfg(test)]
mod tests {
    use bls12_381::Scalar;

    use super::*;
    use crate::private_key::PrivateKey;

    fn key(value: u64) -> PrivateKey {
        PrivateKey::from_scalar(Scalar::from(value)).expect("nonzero scalar")
    }

    #[test]
    fn aggregation_is_point_addition() {
        // g*2 + g*3 == g*5
        let aggregated =
            aggregate_pubkeys([&key(2).public_key(), &key(3).public_key()]).expect("valid points");
        assert_eq!(aggregated, key(5).public_key());
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let bogus = PubKey {
            inner: ssz_types::FixedVector::from(vec![0xffu8; 48]),
        };
        assert!(aggregate_pubkeys([&bogus]).is_err());
    }
}

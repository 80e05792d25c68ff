//! EIP-2333 hierarchical key derivation.
//!
//! Validator keys are derived from a mnemonic seed along EIP-2334 paths:
//! `m/12381/3600/{index}/0/0` for the signing key and `m/12381/3600/{index}/0`
//! for the withdrawal key.

use bls12_381::Scalar;
use hkdf::Hkdf;
use sha2::{Digest, Sha256};

use crate::{errors::BLSError, private_key::PrivateKey};

const KEYGEN_SALT: &[u8] = b"BLS-SIG-KEYGEN-SALT-";
const LAMPORT_CHUNKS: usize = 255;

/// `HKDF_mod_r` from EIP-2333: stretch `ikm` and reduce it into a nonzero
/// scalar of the BLS12-381 subgroup order.
fn hkdf_mod_r(ikm: &[u8], key_info: &[u8]) -> Scalar {
    let mut salt = KEYGEN_SALT.to_vec();
    loop {
        salt = Sha256::digest(&salt).to_vec();
        let ikm_padded = [ikm, &[0u8]].concat();
        let info = [key_info, &48u16.to_be_bytes()[..]].concat();
        let hkdf = Hkdf::<Sha256>::new(Some(&salt), &ikm_padded);
        let mut okm = [0u8; 48];
        hkdf.expand(&info, &mut okm)
            .expect("48 bytes is a valid HKDF-SHA256 output length");

        // OS2IP(okm) mod r: widen the big-endian OKM into the 64-byte
        // little-endian form `from_bytes_wide` reduces.
        let mut wide = [0u8; 64];
        for (i, byte) in okm.iter().enumerate() {
            wide[47 - i] = *byte;
        }
        let candidate = Scalar::from_bytes_wide(&wide);
        if candidate != Scalar::zero() {
            return candidate;
        }
    }
}

fn ikm_to_lamport_sk(ikm: &[u8], salt: &[u8]) -> Vec<[u8; 32]> {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = vec![0u8; LAMPORT_CHUNKS * 32];
    hkdf.expand(&[], &mut okm)
        .expect("8160 bytes is a valid HKDF-SHA256 output length");
    okm.chunks_exact(32)
        .map(|chunk| chunk.try_into().expect("chunks_exact yields 32 bytes"))
        .collect()
}

fn parent_sk_to_lamport_pk(parent: &Scalar, index: u32) -> [u8; 32] {
    let salt = index.to_be_bytes();
    let mut ikm = parent.to_bytes();
    ikm.reverse();
    let not_ikm = ikm.map(|byte| !byte);

    let mut lamport_pk = Sha256::new();
    for chunk in ikm_to_lamport_sk(&ikm, &salt) {
        lamport_pk.update(Sha256::digest(chunk));
    }
    for chunk in ikm_to_lamport_sk(&not_ikm, &salt) {
        lamport_pk.update(Sha256::digest(chunk));
    }
    lamport_pk.finalize().into()
}

pub fn derive_master_sk(seed: &[u8]) -> Result<PrivateKey, BLSError> {
    if seed.len() < 32 {
        return Err(BLSError::SeedTooShort(seed.len()));
    }
    PrivateKey::from_scalar(hkdf_mod_r(seed, &[]))
}

pub fn derive_child_sk(parent: &PrivateKey, index: u32) -> PrivateKey {
    let lamport_pk = parent_sk_to_lamport_pk(&parent.inner, index);
    // hkdf_mod_r never returns zero.
    PrivateKey {
        inner: hkdf_mod_r(&lamport_pk, &[]),
    }
}

pub fn derive_path(seed: &[u8], path: &[u32]) -> Result<PrivateKey, BLSError> {
    let mut secret_key = derive_master_sk(seed)?;
    for index in path {
        secret_key = derive_child_sk(&secret_key, *index);
    }
    Ok(secret_key)
}

/// EIP-2334 signing key, `m/12381/3600/{validator_index}/0/0`.
pub fn signing_key(seed: &[u8], validator_index: u32) -> Result<PrivateKey, BLSError> {
    derive_path(seed, &[12381, 3600, validator_index, 0, 0])
}

/// EIP-2334 withdrawal key, `m/12381/3600/{validator_index}/0`.
pub fn withdrawal_key(seed: &[u8], validator_index: u32) -> Result<PrivateKey, BLSError> {
    derive_path(seed, &[12381, 3600, validator_index, 0])
}

#[cfg(test)]
mod tests {
    use alloy_primitives::hex;

    use super::*;

    // Test case 0 from EIP-2333.
    const SEED: &str = "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04";
    const MASTER_SK: &str = "0d7359d57963ab8fbbde1852dcf553fedbc31f464d80ee7d40ae683122b45070";
    const CHILD_SK: &str = "2d18bd6c14e6d15bf8b5085c9b74f3daae3b03cc2014770a599d8c1539e50f8e";

    #[test]
    fn master_key_matches_eip2333_vector() {
        let seed = hex::decode(SEED).expect("valid hex");
        let master = derive_master_sk(&seed).expect("seed is long enough");
        assert_eq!(hex::encode(master.to_be_bytes()), MASTER_SK);
    }

    #[test]
    fn child_key_matches_eip2333_vector() {
        let seed = hex::decode(SEED).expect("valid hex");
        let master = derive_master_sk(&seed).expect("seed is long enough");
        let child = derive_child_sk(&master, 0);
        assert_eq!(hex::encode(child.to_be_bytes()), CHILD_SK);
    }

    #[test]
    fn short_seed_is_rejected() {
        assert_eq!(
            derive_master_sk(&[0u8; 31]).unwrap_err(),
            BLSError::SeedTooShort(31)
        );
    }

    #[test]
    fn signing_and_withdrawal_keys_differ() {
        let seed = hex::decode(SEED).expect("valid hex");
        let signing = signing_key(&seed, 0).expect("derivable");
        let withdrawal = withdrawal_key(&seed, 0).expect("derivable");
        assert_ne!(signing.to_be_bytes(), withdrawal.to_be_bytes());
    }
}

use alloy_primitives::{Address, B256};
use cinder_bls::PubKey;
use cinder_consensus::constants::{BLS_WITHDRAWAL_PREFIX, ETH1_ADDRESS_WITHDRAWAL_PREFIX};
use sha2::{Digest, Sha256};

/// BLS withdrawal credential: prefix byte over the hash of the withdrawal
/// public key.
pub fn bls_withdrawal_credentials(withdrawal_pubkey: &PubKey) -> B256 {
    let mut credentials = B256::from_slice(&Sha256::digest(withdrawal_pubkey.to_bytes()));
    credentials[..1].copy_from_slice(BLS_WITHDRAWAL_PREFIX);
    credentials
}

/// Eth1 withdrawal credential: prefix byte, 11 zero bytes, then the
/// execution-layer address.
pub fn eth1_withdrawal_credentials(address: Address) -> B256 {
    let mut credentials = B256::ZERO;
    credentials[..1].copy_from_slice(ETH1_ADDRESS_WITHDRAWAL_PREFIX);
    credentials[12..].copy_from_slice(address.as_slice());
    credentials
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    #[test]
    fn eth1_credentials_embed_the_address() {
        let address = address!("0x1234567890abcdef1234567890abcdef12345678");
        let credentials = eth1_withdrawal_credentials(address);
        assert_eq!(credentials[0], 0x01);
        assert_eq!(&credentials[1..12], &[0u8; 11]);
        assert_eq!(&credentials[12..], address.as_slice());
    }

    #[test]
    fn bls_credentials_start_with_the_bls_prefix() {
        let pubkey = PubKey::default();
        let credentials = bls_withdrawal_credentials(&pubkey);
        assert_eq!(credentials[0], 0x00);
        // The rest is the tail of the pubkey hash, which is not all zeros.
        assert_ne!(&credentials[1..], &[0u8; 31]);
    }
}

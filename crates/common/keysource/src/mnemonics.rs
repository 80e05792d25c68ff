use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
    str::FromStr,
};

use alloy_primitives::{Address, hex};
use anyhow::Context;
use bip39::Mnemonic;
use cinder_bls::derive::{signing_key, withdrawal_key};
use serde::Deserialize;
use tracing::info;

use crate::{credentials, record::ValidatorRecord};

/// One entry of the mnemonics YAML: a seed phrase and how many validators to
/// derive from it.
#[derive(Debug, Clone, Deserialize)]
pub struct KeySource {
    pub mnemonic: String,
    pub count: u32,
}

pub fn load_mnemonics_file(path: &Path) -> anyhow::Result<Vec<KeySource>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read mnemonics file {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse mnemonics file {}", path.display()))
}

/// Derive one tranche of validators from a key source.
///
/// Validator `i` uses the EIP-2334 signing path `m/12381/3600/i/0/0`. The
/// withdrawal credential embeds `eth1_withdrawal_address` when given, else
/// the hash of the withdrawal key at `m/12381/3600/i/0`.
pub fn derive_tranche(
    source: &KeySource,
    eth1_withdrawal_address: Option<Address>,
    balance: u64,
) -> anyhow::Result<Vec<ValidatorRecord>> {
    let mnemonic = Mnemonic::from_str(source.mnemonic.trim()).context("Invalid mnemonic")?;
    let seed = mnemonic.to_seed("");

    let mut records = Vec::with_capacity(source.count as usize);
    for index in 0..source.count {
        let pubkey = signing_key(&seed, index)?.public_key();
        let withdrawal_credentials = match eth1_withdrawal_address {
            Some(address) => credentials::eth1_withdrawal_credentials(address),
            None => {
                let withdrawal_pubkey = withdrawal_key(&seed, index)?.public_key();
                credentials::bls_withdrawal_credentials(&withdrawal_pubkey)
            }
        };
        records.push(ValidatorRecord {
            pubkey,
            withdrawal_credentials,
            balance,
        });
    }
    Ok(records)
}

/// Derive every tranche in order and dump the pubkey list of each into
/// `tranches_dir` as `tranche_NNNN.txt`, one hex pubkey per line.
pub fn derive_tranches(
    sources: &[KeySource],
    tranches_dir: Option<&Path>,
    eth1_withdrawal_address: Option<Address>,
    balance: u64,
) -> anyhow::Result<Vec<ValidatorRecord>> {
    if let Some(dir) = tranches_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create tranches dir {}", dir.display()))?;
    }

    let mut validators = vec![];
    for (tranche_index, source) in sources.iter().enumerate() {
        let tranche = derive_tranche(source, eth1_withdrawal_address, balance)
            .with_context(|| format!("Failed to derive keys of tranche {tranche_index}"))?;
        info!(
            "derived tranche {tranche_index} with {} validators",
            tranche.len()
        );
        if let Some(dir) = tranches_dir {
            write_tranche_file(dir, tranche_index, &tranche)?;
        }
        validators.extend(tranche);
    }
    Ok(validators)
}

fn write_tranche_file(
    dir: &Path,
    tranche_index: usize,
    tranche: &[ValidatorRecord],
) -> anyhow::Result<()> {
    let path = dir.join(format!("tranche_{tranche_index:04}.txt"));
    let file = fs::File::create(&path)
        .with_context(|| format!("Failed to create tranche file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for record in tranche {
        writeln!(writer, "0x{}", hex::encode(record.pubkey.to_bytes()))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // The well-known Lodestar/EF testing mnemonic.
    const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

    fn source(count: u32) -> KeySource {
        KeySource {
            mnemonic: TEST_MNEMONIC.to_string(),
            count,
        }
    }

    #[test]
    fn derivation_is_deterministic_and_unique_per_index() {
        let a = derive_tranche(&source(4), None, 32_000_000_000).unwrap();
        let b = derive_tranche(&source(4), None, 32_000_000_000).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
        for (i, record) in a.iter().enumerate() {
            for other in a.iter().skip(i + 1) {
                assert_ne!(record.pubkey, other.pubkey);
            }
            assert_eq!(record.withdrawal_credentials[0], 0x00);
            assert_eq!(record.balance, 32_000_000_000);
        }
    }

    #[test]
    fn eth1_address_replaces_bls_credentials() {
        let address = alloy_primitives::address!("0x1234567890abcdef1234567890abcdef12345678");
        let records = derive_tranche(&source(2), Some(address), 32_000_000_000).unwrap();
        for record in records {
            assert_eq!(record.withdrawal_credentials[0], 0x01);
            assert_eq!(&record.withdrawal_credentials[12..], address.as_slice());
        }
    }

    #[test]
    fn tranche_files_list_every_pubkey() {
        let dir = tempfile::tempdir().unwrap();
        let validators = derive_tranches(
            &[source(2), source(3)],
            Some(dir.path()),
            None,
            32_000_000_000,
        )
        .unwrap();
        assert_eq!(validators.len(), 5);

        let first = fs::read_to_string(dir.path().join("tranche_0000.txt")).unwrap();
        assert_eq!(first.lines().count(), 2);
        let second = fs::read_to_string(dir.path().join("tranche_0001.txt")).unwrap();
        assert_eq!(second.lines().count(), 3);
        for line in first.lines().chain(second.lines()) {
            assert!(line.starts_with("0x"));
            assert_eq!(line.len(), 2 + 96);
        }
    }

    #[test]
    fn garbage_mnemonic_is_rejected() {
        let bad = KeySource {
            mnemonic: "definitely not a bip39 phrase".to_string(),
            count: 1,
        };
        assert!(derive_tranche(&bad, None, 0).is_err());
    }
}

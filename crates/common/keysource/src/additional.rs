use std::{fs, path::Path};

use alloy_primitives::{Address, B256};
use anyhow::{Context, ensure};
use cinder_bls::PubKey;
use serde::Deserialize;

use crate::{credentials, record::ValidatorRecord};

/// One entry of the additional-validators YAML. These are externally managed
/// keys appended after the mnemonic tranches, so the pubkey is given rather
/// than derived. The withdrawal credential can be spelled out in full or
/// abbreviated to an execution-layer address.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdditionalValidator {
    pub pubkey: PubKey,
    #[serde(default)]
    pub withdrawal_credentials: Option<B256>,
    #[serde(default)]
    pub withdrawal_address: Option<Address>,
    /// Balance in Gwei; defaults to the caller's per-validator balance.
    #[serde(default)]
    pub balance: Option<u64>,
}

pub fn load_additional_validators(
    path: &Path,
    default_balance: u64,
) -> anyhow::Result<Vec<ValidatorRecord>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read additional validators file {}", path.display()))?;
    let entries: Vec<AdditionalValidator> = serde_yaml::from_str(&contents).with_context(|| {
        format!(
            "Failed to parse additional validators file {}",
            path.display()
        )
    })?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            ensure!(
                !(entry.withdrawal_credentials.is_some() && entry.withdrawal_address.is_some()),
                "additional validator {index} sets both withdrawal_credentials and withdrawal_address"
            );
            let withdrawal_credentials = match (entry.withdrawal_credentials, entry.withdrawal_address)
            {
                (Some(credentials), None) => credentials,
                (None, Some(address)) => credentials::eth1_withdrawal_credentials(address),
                _ => anyhow::bail!(
                    "additional validator {index} needs withdrawal_credentials or withdrawal_address"
                ),
            };
            Ok(ValidatorRecord {
                pubkey: entry.pubkey,
                withdrawal_credentials,
                balance: entry.balance.unwrap_or(default_balance),
            })
        })
        .collect()
}

pub mod additional;
pub mod credentials;
pub mod mnemonics;
pub mod record;

use std::path::Path;

use alloy_primitives::Address;

pub use record::ValidatorRecord;

/// Assemble the full genesis validator list: mnemonic tranches first, then
/// any externally supplied validators, all in file order.
pub fn load_validator_keys(
    mnemonics_path: Option<&Path>,
    additional_path: Option<&Path>,
    tranches_dir: Option<&Path>,
    eth1_withdrawal_address: Option<Address>,
    default_balance: u64,
) -> anyhow::Result<Vec<ValidatorRecord>> {
    let mut validators = vec![];
    if let Some(path) = mnemonics_path {
        let sources = mnemonics::load_mnemonics_file(path)?;
        validators.extend(mnemonics::derive_tranches(
            &sources,
            tranches_dir,
            eth1_withdrawal_address,
            default_balance,
        )?);
    }
    if let Some(path) = additional_path {
        validators.extend(additional::load_additional_validators(
            path,
            default_balance,
        )?);
    }
    Ok(validators)
}

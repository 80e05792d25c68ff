use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use cinder_consensus::BeaconState;
use tracing::info;

/// Write the canonical SSZ encoding of the state to `path`.
///
/// The encoding and the logged hash tree root are computed from the same
/// finished value, so what lands on disk is exactly what was hashed.
pub fn write_state(path: &Path, state: &BeaconState) -> anyhow::Result<()> {
    let bytes = state.as_ssz_bytes();
    let file = File::create(path)
        .with_context(|| format!("Failed to create state file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&bytes)
        .with_context(|| format!("Failed to write state file {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush state file {}", path.display()))?;
    info!(
        "wrote {} bytes to {}, state root {}",
        bytes.len(),
        path.display(),
        state.tree_hash_root()
    );
    Ok(())
}

pub mod builder;
pub mod payload_header;
pub mod registry;
pub mod sync_committee;
pub mod writer;

pub use builder::{GenesisInputs, build_genesis_state};

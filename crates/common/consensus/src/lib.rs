pub mod attestation;
pub mod attestation_data;
pub mod attester_slashing;
pub mod beacon_block_header;
pub mod bls_to_execution_change;
pub mod checkpoint;
pub mod constants;
pub mod deposit;
pub mod eth_1_data;
pub mod execution_requests;
pub mod fork;
pub mod fork_name;
pub mod historical_summary;
pub mod indexed_attestation;
pub mod kzg_commitment;
pub mod misc;
pub mod pending_consolidation;
pub mod pending_deposit;
pub mod pending_partial_withdrawal;
pub mod proposer_slashing;
pub mod state;
pub mod sync_aggregate;
pub mod sync_committee;
pub mod validator;
pub mod voluntary_exit;
pub mod withdrawal;

pub mod altair;
pub mod bellatrix;
pub mod capella;
pub mod deneb;
pub mod electra;
pub mod phase0;

pub use fork_name::ForkName;
pub use state::BeaconState;

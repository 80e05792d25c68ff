pub mod attestation;
pub mod beacon_block_body;
pub mod beacon_state;

pub use attestation::{Attestation, AttesterSlashing, IndexedAttestation};
pub use beacon_block_body::BeaconBlockBody;
pub use beacon_state::BeaconState;
// Electra reuses the Deneb execution payload without structural changes.
pub use crate::deneb::execution_payload::ExecutionPayload;
pub use crate::deneb::execution_payload_header::ExecutionPayloadHeader;

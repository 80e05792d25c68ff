pub mod beacon_block_body;
pub mod beacon_state;
pub mod execution_payload;
pub mod execution_payload_header;

pub use beacon_block_body::BeaconBlockBody;
pub use beacon_state::BeaconState;
pub use execution_payload::ExecutionPayload;
pub use execution_payload_header::ExecutionPayloadHeader;

pub mod beacon_block_body;
pub mod beacon_state;

pub use beacon_block_body::BeaconBlockBody;
pub use beacon_state::BeaconState;

pub mod aggregate;
pub mod derive;
pub mod errors;
pub mod private_key;
pub mod pubkey;
pub mod signature;

pub use aggregate::aggregate_pubkeys;
pub use errors::BLSError;
pub use private_key::PrivateKey;
pub use pubkey::PubKey;
pub use signature::BLSSignature;

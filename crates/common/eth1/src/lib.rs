pub mod block;
pub mod capture;
pub mod genesis_config;
pub mod rpc;
pub mod source;

pub use block::CanonicalBlock;
pub use source::{Eth1Input, Eth1Source};

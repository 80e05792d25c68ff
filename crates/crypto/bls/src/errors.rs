use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BLSError {
    #[error("invalid hex string")]
    InvalidHexString,

    #[error("invalid byte length for a BLS point")]
    InvalidByteLength,

    #[error("bytes are not a valid compressed G1 point")]
    InvalidPoint,

    #[error("invalid secret key scalar")]
    InvalidSecretKey,

    #[error("seed must be at least 32 bytes, got {0}")]
    SeedTooShort(usize),
}

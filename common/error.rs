use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DigestError {
    #[error("Digest format not valid: {0}")]
    InvalidDigest(String),
    #[error("No digest provided")]
    MissingDigest,
    #[error("Hash has invalid format: {0:?}")]
    InvalidHash(String),
    #[error("Invalid digest size: {0} bytes")]
    InvalidSize(i64),
    #[error("Invalid resource name: {0:?}")]
    InvalidResourceName(String),
}

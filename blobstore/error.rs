use crate::Repairability;
use common::{Digest, DigestError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error(transparent)]
    InvalidDigest(#[from] DigestError),
    #[error("Blob not found: {0}")]
    NotFound(Digest),
    #[error("Buffer is {size_bytes} bytes in size, while a maximum of {maximum_size_bytes} bytes is permitted")]
    SizeExceeded {
        size_bytes: u64,
        maximum_size_bytes: usize,
        repairability: Repairability,
    },
    #[error("Buffer is {actual_size_bytes} bytes in size, while {expected_size_bytes} bytes were expected")]
    SizeMismatch {
        actual_size_bytes: u64,
        expected_size_bytes: i64,
        repairability: Repairability,
    },
    #[error("Failed to unmarshal message: {source}")]
    Decode {
        source: prost::DecodeError,
        repairability: Repairability,
    },
    #[error(transparent)]
    Backend(#[from] tonic::Status),
}

impl BlobError {
    /// Who is to blame for a content error. `None` for errors that are not
    /// about the contents of a buffer.
    pub fn repairability(&self) -> Option<Repairability> {
        match self {
            BlobError::SizeExceeded { repairability, .. }
            | BlobError::SizeMismatch { repairability, .. }
            | BlobError::Decode { repairability, .. } => Some(*repairability),
            _ => None,
        }
    }
}

impl From<BlobError> for tonic::Status {
    fn from(e: BlobError) -> Self {
        match e.repairability() {
            Some(Repairability::UserProvided) => tonic::Status::invalid_argument(e.to_string()),
            Some(Repairability::Irreparable) => tonic::Status::internal(e.to_string()),
            None => match e {
                BlobError::InvalidDigest(e) => tonic::Status::invalid_argument(e.to_string()),
                BlobError::NotFound(_) => tonic::Status::not_found(e.to_string()),
                BlobError::Backend(status) => status,
                _ => tonic::Status::unknown(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn status_codes_follow_blame() {
        let user_provided = BlobError::SizeExceeded {
            size_bytes: 10,
            maximum_size_bytes: 5,
            repairability: Repairability::UserProvided,
        };
        assert_eq!(tonic::Status::from(user_provided).code(), Code::InvalidArgument);

        let irreparable = BlobError::SizeMismatch {
            actual_size_bytes: 2,
            expected_size_bytes: 3,
            repairability: Repairability::Irreparable,
        };
        assert_eq!(tonic::Status::from(irreparable).code(), Code::Internal);

        let digest = Digest::new("x", "abc", 3).unwrap();
        assert_eq!(
            tonic::Status::from(BlobError::NotFound(digest)).code(),
            Code::NotFound
        );
        assert_eq!(
            tonic::Status::from(BlobError::from(DigestError::MissingDigest)).code(),
            Code::InvalidArgument
        );
        assert_eq!(
            tonic::Status::from(BlobError::from(tonic::Status::unavailable("down"))).code(),
            Code::Unavailable
        );
    }
}

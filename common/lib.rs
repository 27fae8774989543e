mod digest;
mod error;

pub use digest::{Digest, DigestSet, DigestSetBuilder};
pub use error::DigestError;

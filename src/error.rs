//! Error types for [`AvlMap`](crate::AvlMap).

use thiserror::Error;

use crate::Key;

/// Result type alias using our Error
pub type Result<T> = core::result::Result<T, Error>;

/// A violated precondition of a map operation.
///
/// Operations that fail leave the map unmodified.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The key is already present; keys are unique.
    #[error("key {0} is already present")]
    DuplicateKey(Key),

    /// The key is not present.
    #[error("key {0} is not present")]
    KeyNotFound(Key),

    /// The separator key does not lie strictly between the keys of the two joined maps.
    #[error("separator key {0} does not divide the joined maps")]
    UnorderedJoin(Key),
}

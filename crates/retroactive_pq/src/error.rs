use thiserror::Error;

/// Rejected edits. A failed call leaves every structure untouched.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum RetroError {
    /// An operation is already recorded at the requested time.
    #[error("an operation is already recorded at this time")]
    AlreadyExists,

    /// Nothing is recorded under the requested key.
    #[error("no matching entry is recorded")]
    NotFound,

    /// Applying the edit would make some delete-min run on an empty queue.
    #[error("the edit would make a delete-min run on an empty queue")]
    WouldUnderflow,
}

pub type Result<T, E = RetroError> = std::result::Result<T, E>;

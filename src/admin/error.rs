use thiserror::Error;

/// Why the admin gate turned a visitor away.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AccessError {
    #[error("Not signed in")]
    NotSignedIn,
    #[error("User {0} is not an admin")]
    Forbidden(String),
    #[error("Could not check access: {0}")]
    Lookup(String),
}

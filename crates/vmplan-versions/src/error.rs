use thiserror::Error;

pub type Result<T> = std::result::Result<T, VersionError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The string does not match the version grammar, or it parses to a
    /// release tuple outside the known enumeration.
    #[error("malformed version string: {0:?}")]
    Malformed(String),
}

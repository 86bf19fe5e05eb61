//! Error types shared by the client, the store and the session loop.

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while serving one menu action.
///
/// None of these end the session: the controller renders them and
/// returns to the screen the action was launched from.
#[derive(Debug, Error)]
pub enum Error {
    /// Network failure or non-2xx HTTP status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered but reported a failure code.
    #[error("remote error: {0}")]
    Remote(String),

    /// The body did not have the shape expected for the action.
    #[error("decode error: {0}")]
    Decode(String),

    /// Inbox inspection without a purchased address on record.
    #[error("no email address on record")]
    NoActiveEmail,

    /// The persisted key/value store could not be read or appended to.
    #[error("store error: {0}")]
    Store(String),

    /// Name lists for the identity generator are missing or empty.
    #[error("identity error: {0}")]
    Identity(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_code_is_literal() {
        let err = Error::Remote("NO_BALANCE".into());
        assert_eq!(err.to_string(), "remote error: NO_BALANCE");
    }

    #[test]
    fn test_json_errors_become_decode_errors() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Decode(_)));
    }
}

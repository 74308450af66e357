//! Error taxonomy shared by the credential, history and session layers.

use std::path::PathBuf;

/// Credential store failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Password database not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Password database {} is unreadable: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Password database {} could not be encoded: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Username already exists: {username}")]
    UserExists { username: String },

    #[error("Credential store I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Terminal authentication outcomes other than success
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Last attempt named an unknown user; the lockout purge has run.
    #[error("Access Denied: user {username} not found")]
    UnknownUserLockout { username: String },

    #[error("Access Denied: wrong password for {username}")]
    PasswordMismatch { username: String },

    #[error("Access Denied: no credentials entered")]
    NoCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to read credentials: {0}")]
    Prompt(#[from] std::io::Error),
}

/// Important-info document failures; both are fatal for a chat turn.
#[derive(Debug, thiserror::Error)]
pub enum ImportantInfoError {
    #[error("The '{}' file is missing.", path.display())]
    Missing { path: PathBuf },

    #[error("The required line is missing in '{}'.", path.display())]
    RequiredSentenceMissing { path: PathBuf },

    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal chat-session failures
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    ImportantInfo(#[from] ImportantInfoError),

    #[error("Session I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_failure_is_not_reported_as_unreadable() {
        let source = serde_json::from_str::<u8>("x").unwrap_err();
        let err = StoreError::Encode {
            path: PathBuf::from("auth.json"),
            source,
        };
        let text = err.to_string();
        assert!(text.starts_with("Password database auth.json could not be encoded"));
        assert!(!text.contains("unreadable"));
    }
}

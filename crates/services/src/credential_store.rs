//! JSON credential store (`auth.json`).
//!
//! The whole document is read and rewritten on every change; there is no
//! transaction boundary and no protection against concurrent writers.

use crate::history_store::ChatHistoryStore;
use crate::password::hash_password;
use serde::{Deserialize, Serialize};
use shared::error::StoreError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    #[serde(rename = "password")]
    pub password_digest: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDatabase {
    pub users: Vec<UserRecord>,
}

impl UserDatabase {
    /// First record whose username matches exactly.
    pub fn find_user(&self, username: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

pub struct CredentialStore {
    path: PathBuf,
    history: ChatHistoryStore,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>, history: ChatHistoryStore) -> Self {
        Self {
            path: path.into(),
            history,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn history(&self) -> &ChatHistoryStore {
        &self.history
    }

    /// Create the history directory and an empty store if either is absent.
    pub fn initialize(&self) -> Result<(), StoreError> {
        self.history.ensure_dir()?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        if !self.path.exists() {
            self.write(&UserDatabase::default())?;
            tracing::info!(path = %self.path.display(), "created empty credential store");
        }
        Ok(())
    }

    pub fn load(&self) -> Result<UserDatabase, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::Missing {
                    path: self.path.clone(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    pub fn find_user(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.load()?.find_user(username).cloned())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.load()?.is_empty())
    }

    /// Register a user and create their empty transcript.
    ///
    /// Fails with [`StoreError::UserExists`] without touching the file when the
    /// username is taken.
    pub fn add_user(&self, username: &str, plaintext: &str) -> Result<(), StoreError> {
        self.initialize()?;
        let mut db = self.load()?;
        if db.find_user(username).is_some() {
            return Err(StoreError::UserExists {
                username: username.to_string(),
            });
        }

        db.users.push(UserRecord {
            username: username.to_string(),
            password_digest: hash_password(plaintext),
        });
        self.write(&db)?;
        self.history.create_empty(username)?;

        tracing::info!(username, "registered user");
        Ok(())
    }

    /// Delete the store file. Used only by the lockout purge.
    pub fn destroy(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, db: &UserDatabase) -> Result<(), StoreError> {
        // Four-space indentation, as the legacy tooling writes it
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        db.serialize(&mut ser).map_err(|source| StoreError::Encode {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::verify_password;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> CredentialStore {
        CredentialStore::new(
            dir.path().join("auth.json"),
            ChatHistoryStore::new(dir.path().join("chat_histories")),
        )
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.initialize().unwrap();
        store.add_user("alice", "pw").unwrap();
        store.initialize().unwrap();

        assert!(dir.path().join("chat_histories").is_dir());
        assert_eq!(store.load().unwrap().users.len(), 1);
    }

    #[test]
    fn test_empty_store_document() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.initialize().unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"users": []}));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_load_missing() {
        let dir = TempDir::new().unwrap();
        let err = store(&dir).load().unwrap_err();
        assert!(matches!(err, StoreError::Missing { .. }));
    }

    #[test]
    fn test_load_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load().unwrap_err(), StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_add_user_writes_record_and_transcript() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.add_user("alice", "password123").unwrap();

        let user = store.find_user("alice").unwrap().unwrap();
        assert!(verify_password("password123", &user.password_digest));
        assert_eq!(
            fs::read_to_string(dir.path().join("chat_histories/alice_history.txt")).unwrap(),
            ""
        );

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"password\""));
        assert!(raw.contains("\n    \"users\""));
    }

    #[test]
    fn test_duplicate_user_is_rejected_without_mutation() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.add_user("alice", "first").unwrap();
        let before = fs::read(store.path()).unwrap();

        let err = store.add_user("alice", "second").unwrap_err();
        assert!(matches!(err, StoreError::UserExists { .. }));
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn test_find_user_is_exact() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.add_user("Alice", "pw").unwrap();
        assert!(store.find_user("alice").unwrap().is_none());
        assert!(store.find_user("Alice").unwrap().is_some());
    }

    #[test]
    fn test_reads_legacy_document() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(
            store.path(),
            r#"{"users": [{"username": "vedant", "password": "32835de26811af917edb0fb94165e4b78db6f0cb38c9c130304e799ac04fa4f73e29e6de69da566e776a06efe7601757678e1b7a2557ed1f56b49755804cb721"}]}"#,
        )
        .unwrap();
        let user = store.find_user("vedant").unwrap().unwrap();
        assert!(verify_password("password123", &user.password_digest));
    }

    #[test]
    fn test_destroy() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.initialize().unwrap();
        store.destroy().unwrap();
        assert!(!store.path().exists());
        // second call is a no-op
        store.destroy().unwrap();
    }
}

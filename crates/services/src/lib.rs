//! Local persistence and authentication for QRX3.

pub mod authenticator;
pub mod credential_store;
pub mod history_store;
pub mod important_info;
pub mod password;

pub use authenticator::{AttemptOutcome, Authenticator, CredentialPrompt, LockoutPolicy};
pub use credential_store::{CredentialStore, UserDatabase, UserRecord};
pub use history_store::{ChatHistoryStore, Transcript, NO_HISTORY};
pub use important_info::ImportantInfo;
pub use password::{hash_password, verify_password};

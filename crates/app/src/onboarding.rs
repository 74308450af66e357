//! First-run setup and the `register` command.

use crate::console::ConsolePrompt;
use services::CredentialStore;
use shared::error::StoreError;
use std::io::{BufRead, Write};

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Setup aborted: {field} was left empty")]
    Aborted { field: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Setup I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Ask for a username and password and register them.
pub fn register_user<R: BufRead, W: Write>(
    store: &CredentialStore,
    console: &mut ConsolePrompt<R, W>,
) -> Result<String, SetupError> {
    let username = console.ask("Create a username: ")?;
    if username.is_empty() {
        return Err(SetupError::Aborted { field: "username" });
    }
    let password = console.ask_secret("Create a password: ")?;
    if password.is_empty() {
        return Err(SetupError::Aborted { field: "password" });
    }

    match store.add_user(&username, &password) {
        Ok(()) => {
            console.say(&format!("User {} created successfully!", username))?;
            Ok(username)
        }
        Err(e @ StoreError::UserExists { .. }) => {
            console.say("Username already exists!")?;
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Create the first account when the store has no users.
///
/// Returns `None` when users already exist.
pub fn first_run_setup<R: BufRead, W: Write>(
    store: &CredentialStore,
    console: &mut ConsolePrompt<R, W>,
) -> Result<Option<String>, SetupError> {
    store.initialize()?;
    if !store.is_empty()? {
        return Ok(None);
    }
    console.say("No users found. Creating first user.")?;
    register_user(store, console).map(Some)
}

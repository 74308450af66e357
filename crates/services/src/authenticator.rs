//! Interactive credential check with a bounded attempt budget.
//!
//! Each loop iteration asks for a username and a password. Blank input skips
//! to the next iteration, so blanks still spend the budget. A matching digest
//! returns immediately. On the last iteration an unknown username triggers the
//! lockout purge (credential store plus configured launcher files are
//! deleted); a wrong password only denies.
//!
//! The purge is destructive and shared by every user of the installation: a
//! user who mistypes their own name on the final attempt wipes the store.
//! It is kept because existing deployments rely on it; disable it with
//! `LockoutSettings::purge_on_unknown_user`.

use crate::credential_store::CredentialStore;
use crate::password::verify_password;
use shared::error::AuthError;
use shared::settings::AppSettings;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::PathBuf;
use zeroize::Zeroizing;

/// Source of credentials (console, dialog, test script).
pub trait CredentialPrompt {
    /// Returns an empty string when nothing was entered.
    fn read_username(&mut self) -> io::Result<String>;

    /// Returns an empty string when nothing was entered.
    fn read_password(&mut self) -> io::Result<Zeroizing<String>>;

    /// Show a status line to the user.
    fn notify(&mut self, message: &str) -> io::Result<()>;
}

/// Result of a single loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Blank,
    UserNotFound,
    PasswordMismatch,
    Authenticated,
}

#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    pub max_attempts: u32,
    pub purge_on_unknown_user: bool,
    pub purge_targets: Vec<PathBuf>,
}

impl LockoutPolicy {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            max_attempts: settings.lockout.max_attempts,
            purge_on_unknown_user: settings.lockout.purge_on_unknown_user,
            purge_targets: settings.purge_paths(),
        }
    }
}

pub struct Authenticator<'a> {
    store: &'a CredentialStore,
    policy: LockoutPolicy,
}

impl<'a> Authenticator<'a> {
    pub fn new(store: &'a CredentialStore, policy: LockoutPolicy) -> Self {
        Self { store, policy }
    }

    /// Run the prompt loop and return the authenticated username.
    pub fn authenticate(&self, prompt: &mut dyn CredentialPrompt) -> Result<String, AuthError> {
        self.store.initialize()?;

        for attempt in 1..=self.policy.max_attempts {
            let last = attempt == self.policy.max_attempts;

            let username = prompt.read_username()?;
            if username.is_empty() {
                tracing::debug!(attempt, "blank username");
                continue;
            }
            let password = prompt.read_password()?;

            match self.check(&username, &password)? {
                AttemptOutcome::Blank => {
                    tracing::debug!(attempt, "blank password");
                }
                AttemptOutcome::Authenticated => {
                    tracing::info!(attempt, username = %username, "authenticated");
                    return Ok(username);
                }
                AttemptOutcome::UserNotFound => {
                    tracing::warn!(attempt, username = %username, "unknown user");
                    prompt.notify("User not found!")?;
                    if !last {
                        prompt.notify("Try Again!")?;
                        continue;
                    }
                    prompt.notify("Access Denied!")?;
                    if self.policy.purge_on_unknown_user {
                        self.purge();
                    }
                    return Err(AuthError::UnknownUserLockout { username });
                }
                AttemptOutcome::PasswordMismatch => {
                    tracing::warn!(attempt, username = %username, "wrong password");
                    if !last {
                        prompt.notify("Try Again! Wrong password.")?;
                        continue;
                    }
                    prompt.notify("Access Denied!")?;
                    return Err(AuthError::PasswordMismatch { username });
                }
            }
        }

        Err(AuthError::NoCredentials)
    }

    /// Classify one credential pair against the current store contents.
    pub fn check(&self, username: &str, password: &str) -> Result<AttemptOutcome, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Ok(AttemptOutcome::Blank);
        }
        let outcome = match self.store.find_user(username)? {
            None => AttemptOutcome::UserNotFound,
            Some(user) if verify_password(password, &user.password_digest) => {
                AttemptOutcome::Authenticated
            }
            Some(_) => AttemptOutcome::PasswordMismatch,
        };
        Ok(outcome)
    }

    fn purge(&self) {
        tracing::error!(
            store = %self.store.path().display(),
            "lockout: deleting credential store and launcher files"
        );
        if let Err(e) = self.store.destroy() {
            tracing::warn!(error = %e, "failed to delete credential store");
        }
        for target in &self.policy.purge_targets {
            match fs::remove_file(target) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::warn!(path = %target.display(), "purge target already absent");
                }
                Err(e) => {
                    tracing::warn!(path = %target.display(), error = %e, "failed to delete purge target");
                }
            }
        }
    }
}

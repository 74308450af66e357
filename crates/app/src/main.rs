//! QRX3 - local chatbot console
//!
//! Log in against the local credential store, then chat with the local model
//! or render images. The transcript of every session is written back to the
//! user's history file and fed to the model as context on the next turn.

mod cli;
mod config;
mod console;
mod onboarding;

use agent_host::{ChatSession, SessionLabels};
use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use console::{display_history, ConsolePrompt};
use onboarding::SetupError;
use providers::{DiffusionClient, OllamaClient, ProviderStatus};
use services::{
    Authenticator, ChatHistoryStore, CredentialStore, ImportantInfo, LockoutPolicy, Transcript,
};
use shared::error::{AuthError, ImportantInfoError, SessionError, StoreError};
use shared::settings::AppSettings;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match load(&cli) {
        Ok(settings) => match cli.command() {
            Command::Chat => run_chat(&settings).await,
            Command::Register => run_register(&settings),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "qrx3 exited with an error");
            eprintln!("{}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn load(cli: &Cli) -> Result<AppSettings> {
    let mut settings = config::load_settings(cli.config.as_deref())?;
    if let Some(mode) = cli.persistence {
        settings.persistence = mode.into();
    }
    tracing::debug!(data_dir = %settings.storage.data_dir, persistence = ?settings.persistence, "settings loaded");
    Ok(settings)
}

fn open_store(settings: &AppSettings) -> CredentialStore {
    CredentialStore::new(
        settings.auth_path(),
        ChatHistoryStore::new(settings.history_dir()),
    )
}

fn run_register(settings: &AppSettings) -> Result<()> {
    let store = open_store(settings);
    store.initialize()?;
    let mut console = ConsolePrompt::new(io::stdin().lock(), io::stdout())
        .hide_secrets(io::stdin().is_terminal());
    onboarding::register_user(&store, &mut console)?;
    Ok(())
}

async fn run_chat(settings: &AppSettings) -> Result<()> {
    let store = open_store(settings);

    let username = {
        let mut console = ConsolePrompt::new(io::stdin().lock(), io::stdout())
            .hide_secrets(io::stdin().is_terminal());
        onboarding::first_run_setup(&store, &mut console)?;

        let policy = LockoutPolicy::from_settings(settings);
        let username = Authenticator::new(&store, policy).authenticate(&mut console)?;

        display_history(console.output(), store.history(), &username)?;
        username
    };

    let chat = OllamaClient::from_settings(&settings.model)?;
    if let ProviderStatus::Unavailable { reason } = chat.health_check().await {
        tracing::warn!(
            base = %chat.base_url(),
            model = %chat.model(),
            %reason,
            "chat model unreachable; replies will carry the error"
        );
    }
    let images = DiffusionClient::new(&settings.image)?;

    let transcript = Transcript::open(store.history().clone(), &username, settings.persistence)
        .with_context(|| format!("opening transcript for {}", username))?;
    let important_info = ImportantInfo::new(
        settings.important_info_path(),
        settings.persona.required_sentence.clone(),
    );
    let labels = SessionLabels {
        user: settings.persona.user_label.clone(),
        assistant: settings.persona.assistant_label.clone(),
    };

    let mut session = ChatSession::new(
        &chat,
        &images,
        important_info,
        transcript,
        labels,
        settings.image_dir(),
    );
    session.run(io::stdin().lock(), io::stdout()).await?;
    Ok(())
}

const EXIT_FAILURE: u8 = 1;
const EXIT_STORE: u8 = 2;
const EXIT_DENIED: u8 = 3;
const EXIT_IMPORTANT_INFO: u8 = 4;

fn store_code(e: &StoreError) -> u8 {
    match e {
        StoreError::Missing { .. } | StoreError::Corrupt { .. } => EXIT_STORE,
        _ => EXIT_FAILURE,
    }
}

/// Map a fatal error to the process exit status.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<AuthError>() {
            return match e {
                AuthError::UnknownUserLockout { .. }
                | AuthError::PasswordMismatch { .. }
                | AuthError::NoCredentials => EXIT_DENIED,
                AuthError::Store(inner) => store_code(inner),
                AuthError::Prompt(_) => EXIT_FAILURE,
            };
        }
        if let Some(e) = cause.downcast_ref::<SetupError>() {
            return match e {
                SetupError::Store(inner) => store_code(inner),
                _ => EXIT_FAILURE,
            };
        }
        if let Some(e) = cause.downcast_ref::<StoreError>() {
            return store_code(e);
        }
        if let Some(e) = cause.downcast_ref::<SessionError>() {
            return match e {
                SessionError::ImportantInfo(_) => EXIT_IMPORTANT_INFO,
                SessionError::Io(_) => EXIT_FAILURE,
            };
        }
        if cause.downcast_ref::<ImportantInfoError>().is_some() {
            return EXIT_IMPORTANT_INFO;
        }
    }
    EXIT_FAILURE
}

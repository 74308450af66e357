use clap::{Parser, Subcommand, ValueEnum};
use shared::settings::PersistenceMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "qrx3")]
#[command(about = "QRX3 local chatbot console")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Command>,

    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// How the transcript is written back after each line
    #[arg(long, global = true, value_enum)]
    pub(crate) persistence: Option<PersistenceArg>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Log in and chat (the default)
    Chat,
    /// Add a user to the credential store
    Register,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceArg {
    Append,
    Overwrite,
}

impl From<PersistenceArg> for PersistenceMode {
    fn from(arg: PersistenceArg) -> Self {
        match arg {
            PersistenceArg::Append => PersistenceMode::Append,
            PersistenceArg::Overwrite => PersistenceMode::Overwrite,
        }
    }
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Chat)
    }
}

//! Console I/O for the credential prompts and the transcript preview.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use services::{ChatHistoryStore, CredentialPrompt};
use std::io::{self, BufRead, ErrorKind, Write};
use zeroize::Zeroizing;

/// Line-based prompt over any reader/writer pair (stdin/stdout in production).
///
/// With [`ConsolePrompt::hide_secrets`] enabled, passwords are read from the
/// terminal in raw mode and never echoed; otherwise they come from `input`
/// like any other line.
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
    hide_secrets: bool,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            hide_secrets: false,
        }
    }

    /// Only enable when stdin is a terminal.
    pub fn hide_secrets(mut self, hide: bool) -> Self {
        self.hide_secrets = hide;
        self
    }

    /// Print `prompt` and read one line without its line terminator.
    ///
    /// End of input reads as an empty line.
    pub fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(len);
        Ok(line)
    }

    pub fn ask_secret(&mut self, prompt: &str) -> io::Result<Zeroizing<String>> {
        if !self.hide_secrets {
            return self.ask(prompt).map(Zeroizing::new);
        }
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let secret = read_hidden_line()?;
        // raw mode swallowed the newline
        writeln!(self.output)?;
        Ok(secret)
    }

    pub fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }
}

impl<R: BufRead, W: Write> CredentialPrompt for ConsolePrompt<R, W> {
    fn read_username(&mut self) -> io::Result<String> {
        self.ask("Enter username: ")
    }

    fn read_password(&mut self) -> io::Result<Zeroizing<String>> {
        self.ask_secret("Enter password: ")
    }

    fn notify(&mut self, message: &str) -> io::Result<()> {
        self.say(message)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SecretKey {
    Continue,
    Done,
    Cancel,
}

fn apply_secret_key(secret: &mut String, key: KeyEvent) -> SecretKey {
    if key.kind != KeyEventKind::Press {
        return SecretKey::Continue;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => SecretKey::Done,
        KeyCode::Char('c') if ctrl => SecretKey::Cancel,
        KeyCode::Char('d') if ctrl => SecretKey::Done,
        KeyCode::Char(_) if ctrl => SecretKey::Continue,
        KeyCode::Char(c) => {
            secret.push(c);
            SecretKey::Continue
        }
        KeyCode::Backspace => {
            secret.pop();
            SecretKey::Continue
        }
        _ => SecretKey::Continue,
    }
}

struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            tracing::warn!(error = %e, "failed to restore terminal mode");
        }
    }
}

/// Read one line from the terminal without echoing it.
fn read_hidden_line() -> io::Result<Zeroizing<String>> {
    let _raw = RawMode::enable()?;
    let mut secret = Zeroizing::new(String::new());
    loop {
        if let Event::Key(key) = event::read()? {
            match apply_secret_key(&mut secret, key) {
                SecretKey::Continue => {}
                SecretKey::Done => return Ok(secret),
                SecretKey::Cancel => {
                    return Err(io::Error::new(
                        ErrorKind::Interrupted,
                        "password entry cancelled",
                    ))
                }
            }
        }
    }
}

/// Print the stored transcript ahead of the chat loop.
pub fn display_history<W: Write>(
    out: &mut W,
    history: &ChatHistoryStore,
    username: &str,
) -> io::Result<()> {
    match history.load(username)? {
        Some(text) => {
            writeln!(out, "\n--- Chat History ---")?;
            writeln!(out, "{}", text)?;
            writeln!(out, "--------------------\n")
        }
        None => writeln!(out, "\nNo chat history found for {}\n", username),
    }
}

//! The console chat loop.
//!
//! One line per turn. Every user line is written to the transcript before it
//! is acted on. `image:` lines go to the image pipeline and never reach the
//! chat model; every other line goes to the chat model with the transcript
//! and the important-info document as context. Chat failures are shown and
//! stored as ordinary replies prefixed with `Error: `.

use crate::prompts::build_messages;
use anyhow::Context;
use image::DynamicImage;
use providers::{ChatBackend, ImageBackend};
use services::{ImportantInfo, Transcript};
use shared::error::SessionError;
use std::fs;
use std::io::{BufRead, ErrorKind, Write};
use std::path::{Path, PathBuf};

const IMAGE_PREFIX: &str = "image:";

/// What a single input line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnInput {
    Blank,
    Exit,
    /// Prompt text with the prefix removed and whitespace trimmed
    Image(String),
    Chat(String),
}

/// Classify one already-trimmed line.
pub fn classify_input(line: &str) -> TurnInput {
    if line.is_empty() {
        return TurnInput::Blank;
    }
    if line.eq_ignore_ascii_case("exit") {
        return TurnInput::Exit;
    }
    match line.get(..IMAGE_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(IMAGE_PREFIX) => {
            TurnInput::Image(line[IMAGE_PREFIX.len()..].trim().to_string())
        }
        _ => TurnInput::Chat(line.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Continue,
    Exit,
}

#[derive(Debug, Clone)]
pub struct SessionLabels {
    pub user: String,
    pub assistant: String,
}

pub struct ChatSession<'a> {
    chat: &'a dyn ChatBackend,
    images: &'a dyn ImageBackend,
    important_info: ImportantInfo,
    transcript: Transcript,
    labels: SessionLabels,
    image_dir: PathBuf,
}

impl<'a> ChatSession<'a> {
    pub fn new(
        chat: &'a dyn ChatBackend,
        images: &'a dyn ImageBackend,
        important_info: ImportantInfo,
        transcript: Transcript,
        labels: SessionLabels,
        image_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            chat,
            images,
            important_info,
            transcript,
            labels,
            image_dir: image_dir.into(),
        }
    }

    pub fn username(&self) -> &str {
        self.transcript.username()
    }

    /// Where generated images for this user are written.
    pub fn image_path(&self) -> PathBuf {
        self.image_dir
            .join(format!("generated_image_{}.png", self.username()))
    }

    /// Run until `exit`, end of input, or a fatal error.
    pub async fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut out: W,
    ) -> Result<(), SessionError> {
        writeln!(
            out,
            "\nWelcome to {} Chatbot, {}!",
            self.labels.assistant,
            self.username()
        )?;
        writeln!(
            out,
            "Type 'exit' to quit or 'image: your prompt' to generate an image\n"
        )?;

        let mut line = String::new();
        loop {
            write!(out, "{}: ", self.labels.user)?;
            out.flush()?;

            line.clear();
            let read = match input.read_line(&mut line) {
                Ok(read) => read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if read == 0 {
                writeln!(out)?;
                break;
            }

            if self.handle_turn(line.trim(), &mut out).await? == TurnOutcome::Exit {
                break;
            }
        }
        Ok(())
    }

    pub async fn handle_turn<W: Write>(
        &mut self,
        line: &str,
        out: &mut W,
    ) -> Result<TurnOutcome, SessionError> {
        let turn = classify_input(line);
        match turn {
            TurnInput::Blank => return Ok(TurnOutcome::Continue),
            TurnInput::Exit => {
                writeln!(out, "Goodbye!")?;
                return Ok(TurnOutcome::Exit);
            }
            TurnInput::Image(_) | TurnInput::Chat(_) => {}
        }

        self.transcript.record(&self.labels.user, line)?;

        match turn {
            TurnInput::Image(prompt) => self.image_turn(&prompt, out).await?,
            TurnInput::Chat(text) => self.chat_turn(&text, out).await?,
            TurnInput::Blank | TurnInput::Exit => {}
        }
        Ok(TurnOutcome::Continue)
    }

    async fn image_turn<W: Write>(&mut self, prompt: &str, out: &mut W) -> Result<(), SessionError> {
        writeln!(out, "Generating image for: {}...", prompt)?;
        tracing::info!(username = %self.username(), "image generation requested");

        let path = self.image_path();
        let saved = match self.images.generate(prompt).await {
            Ok(image) => save_rgb(&image, &path),
            Err(e) => Err(e),
        };

        match saved {
            Ok(()) => writeln!(out, "Image saved as: {}", path.display())?,
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "image generation failed");
                writeln!(out, "Image generation failed: {:#}", e)?;
            }
        }
        Ok(())
    }

    async fn chat_turn<W: Write>(&mut self, text: &str, out: &mut W) -> Result<(), SessionError> {
        let important_info = self.important_info.load()?;
        let chat_history = self
            .transcript
            .store()
            .load_for_context(self.transcript.username())?;

        let messages = build_messages(&chat_history, &important_info, text);
        let reply = match self.chat.chat(messages).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "chat model call failed");
                format!("Error: {:#}", e)
            }
        };

        writeln!(out, "{}: {}", self.labels.assistant, reply)?;
        self.transcript.record(&self.labels.assistant, &reply)?;
        Ok(())
    }
}

/// Write the image as an RGB PNG, creating the directory if needed.
fn save_rgb(image: &DynamicImage, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    image
        .to_rgb8()
        .save(path)
        .with_context(|| format!("failed to save {}", path.display()))
}

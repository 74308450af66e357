//! Per-user chat transcripts.
//!
//! One plain-text file per user under the history directory, one line per
//! message in the form `<label>: <message>`. No locking is done; a single
//! process is assumed to own the files.

use shared::settings::PersistenceMode;
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::PathBuf;

/// Context text used when a user has no transcript file.
pub const NO_HISTORY: &str = "No chat history available.";

const HISTORY_SUFFIX: &str = "_history.txt";

/// Render one transcript line.
pub fn format_line(label: &str, message: &str) -> String {
    format!("{}: {}\n", label, message)
}

/// Flatten transcript text into a single line for model context.
pub fn flatten(text: &str) -> String {
    text.replace('\n', " ")
}

#[derive(Debug, Clone)]
pub struct ChatHistoryStore {
    dir: PathBuf,
}

impl ChatHistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    pub fn path_for(&self, username: &str) -> PathBuf {
        self.dir.join(format!("{}{}", username, HISTORY_SUFFIX))
    }

    /// Full transcript, or `None` if the user has no file yet.
    pub fn load(&self, username: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(username)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Transcript as model context: flattened, or [`NO_HISTORY`].
    pub fn load_for_context(&self, username: &str) -> io::Result<String> {
        Ok(self
            .load(username)?
            .map(|text| flatten(&text))
            .unwrap_or_else(|| NO_HISTORY.to_string()))
    }

    pub fn append(&self, username: &str, message: &str, label: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(username))?;
        file.write_all(format_line(label, message).as_bytes())
    }

    /// Replace the whole transcript.
    pub fn save(&self, username: &str, full_text: &str) -> io::Result<()> {
        fs::write(self.path_for(username), full_text)
    }

    pub fn create_empty(&self, username: &str) -> io::Result<()> {
        fs::write(self.path_for(username), "")
    }
}

/// A user's transcript bound to a persistence mode.
///
/// In [`PersistenceMode::Append`] every recorded line is appended to the file.
/// In [`PersistenceMode::Overwrite`] the transcript is kept in memory and the
/// file is rewritten from that buffer after each line; an interrupted write
/// can lose the whole file.
#[derive(Debug)]
pub struct Transcript {
    store: ChatHistoryStore,
    username: String,
    mode: PersistenceMode,
    buffer: String,
}

impl Transcript {
    pub fn open(
        store: ChatHistoryStore,
        username: impl Into<String>,
        mode: PersistenceMode,
    ) -> io::Result<Self> {
        let username = username.into();
        let buffer = match mode {
            PersistenceMode::Append => String::new(),
            PersistenceMode::Overwrite => {
                let mut text = store.load(&username)?.unwrap_or_default();
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                text
            }
        };
        Ok(Self {
            store,
            username,
            mode,
            buffer,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn store(&self) -> &ChatHistoryStore {
        &self.store
    }

    pub fn record(&mut self, label: &str, message: &str) -> io::Result<()> {
        match self.mode {
            PersistenceMode::Append => self.store.append(&self.username, message, label),
            PersistenceMode::Overwrite => {
                self.buffer.push_str(&format_line(label, message));
                self.store.save(&self.username, &self.buffer)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, ChatHistoryStore) {
        let dir = TempDir::new().unwrap();
        let store = ChatHistoryStore::new(dir.path().join("chat_histories"));
        store.ensure_dir().unwrap();
        (dir, store)
    }

    #[test]
    fn test_path_for() {
        let store = ChatHistoryStore::new("chat_histories");
        assert_eq!(
            store.path_for("alice"),
            PathBuf::from("chat_histories/alice_history.txt")
        );
    }

    #[test]
    fn test_load_missing_is_none() {
        let (_dir, store) = store();
        assert!(store.load("ghost").unwrap().is_none());
        assert_eq!(store.load_for_context("ghost").unwrap(), NO_HISTORY);
    }

    #[test]
    fn test_append_is_monotonic() {
        let (_dir, store) = store();
        store.create_empty("alice").unwrap();
        for i in 0..5 {
            store.append("alice", &format!("turn {}", i), "You").unwrap();
        }
        let text = store.load("alice").unwrap().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "You: turn 0");
        assert_eq!(lines[4], "You: turn 4");
    }

    #[test]
    fn test_context_is_flattened() {
        let (_dir, store) = store();
        store.append("alice", "hi", "You").unwrap();
        store.append("alice", "hello", "QRX3").unwrap();
        assert_eq!(
            store.load_for_context("alice").unwrap(),
            "You: hi QRX3: hello "
        );
    }

    #[test]
    fn test_overwrite_transcript_keeps_prior_text() {
        let (_dir, store) = store();
        store.save("bob", "You: earlier").unwrap();

        let mut transcript =
            Transcript::open(store.clone(), "bob", PersistenceMode::Overwrite).unwrap();
        transcript.record("You", "again").unwrap();
        transcript.record("QRX3", "welcome back").unwrap();

        assert_eq!(
            store.load("bob").unwrap().unwrap(),
            "You: earlier\nYou: again\nQRX3: welcome back\n"
        );
    }

    #[test]
    fn test_append_transcript_writes_through() {
        let (_dir, store) = store();
        let mut transcript =
            Transcript::open(store.clone(), "carol", PersistenceMode::Append).unwrap();
        transcript.record("You", "one").unwrap();
        // external edits are not clobbered in append mode
        store.append("carol", "note", "System").unwrap();
        transcript.record("QRX3", "two").unwrap();

        assert_eq!(
            store.load("carol").unwrap().unwrap(),
            "You: one\nSystem: note\nQRX3: two\n"
        );
    }
}

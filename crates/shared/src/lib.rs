pub mod error;

pub mod settings {
    use serde::{Deserialize, Serialize};
    use std::path::{Path, PathBuf};

    /// Literal sentence the important-info document must carry.
    pub const DEFAULT_REQUIRED_SENTENCE: &str =
        "Remember, the developers of QRX3 Chatbot are Vedant. And you are QRX3 chatbot.";

    /// How a transcript is written back after each recorded line.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum PersistenceMode {
        /// Open-for-append, one line per call (console behaviour)
        #[default]
        Append,
        /// Rewrite the whole file from the in-memory buffer (windowed behaviour)
        Overwrite,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(default)]
    pub struct StorageSettings {
        /// Base directory for every relative path below
        pub data_dir: String,
        pub auth_file: String,
        pub history_dir: String,
        pub important_info_file: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ModelProvider {
        pub local_model: String, // e.g., "Vedu/QRX3_chatbot" for Ollama
        pub ollama_base_url: String,
        /// No timeout when unset: a stalled model server stalls the session.
        pub request_timeout_secs: Option<u64>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ImageSettings {
        pub base_url: String,
        pub steps: u32,
        pub width: u32,
        pub height: u32,
        pub output_dir: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(default)]
    pub struct PersonaSettings {
        pub assistant_label: String,
        pub user_label: String,
        pub required_sentence: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(default)]
    pub struct LockoutSettings {
        pub max_attempts: u32,
        /// Delete the credential store and `purge_targets` when the last
        /// attempt names an unknown user.
        pub purge_on_unknown_user: bool,
        pub purge_targets: Vec<String>,
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct AppSettings {
        pub storage: StorageSettings,
        pub model: ModelProvider,
        pub image: ImageSettings,
        pub persona: PersonaSettings,
        pub lockout: LockoutSettings,
        pub persistence: PersistenceMode,
    }

    impl Default for StorageSettings {
        fn default() -> Self {
            Self {
                data_dir: ".".into(),
                auth_file: "auth.json".into(),
                history_dir: "chat_histories".into(),
                important_info_file: "important_info.txt".into(),
            }
        }
    }

    impl Default for ModelProvider {
        fn default() -> Self {
            Self {
                local_model: "Vedu/QRX3_chatbot".into(),
                ollama_base_url: "http://127.0.0.1:11434".into(),
                request_timeout_secs: None,
            }
        }
    }

    impl Default for ImageSettings {
        fn default() -> Self {
            Self {
                base_url: "http://127.0.0.1:7860".into(),
                steps: 50,
                width: 512,
                height: 512,
                output_dir: ".".into(),
            }
        }
    }

    impl Default for PersonaSettings {
        fn default() -> Self {
            Self {
                assistant_label: "QRX3".into(),
                user_label: "You".into(),
                required_sentence: DEFAULT_REQUIRED_SENTENCE.into(),
            }
        }
    }

    impl Default for LockoutSettings {
        fn default() -> Self {
            Self {
                max_attempts: 3,
                purge_on_unknown_user: true,
                purge_targets: vec!["main_cli.py".into(), "main_gui.py".into()],
            }
        }
    }

    impl AppSettings {
        /// Resolve a configured path against `storage.data_dir` unless absolute.
        pub fn resolve(&self, path: &str) -> PathBuf {
            let p = Path::new(path);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                Path::new(&self.storage.data_dir).join(p)
            }
        }

        pub fn auth_path(&self) -> PathBuf {
            self.resolve(&self.storage.auth_file)
        }

        pub fn history_dir(&self) -> PathBuf {
            self.resolve(&self.storage.history_dir)
        }

        pub fn important_info_path(&self) -> PathBuf {
            self.resolve(&self.storage.important_info_file)
        }

        pub fn image_dir(&self) -> PathBuf {
            self.resolve(&self.image.output_dir)
        }

        pub fn purge_paths(&self) -> Vec<PathBuf> {
            self.lockout
                .purge_targets
                .iter()
                .map(|t| self.resolve(t))
                .collect()
        }
    }

}

pub mod agent_api {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ChatMessage {
        pub role: String, // "system" | "user" | "assistant"
        pub content: String,
    }

    impl ChatMessage {
        pub fn system(content: impl Into<String>) -> Self {
            Self {
                role: "system".into(),
                content: content.into(),
            }
        }

        pub fn user(content: impl Into<String>) -> Self {
            Self {
                role: "user".into(),
                content: content.into(),
            }
        }
    }
}

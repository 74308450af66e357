//! External model collaborators: the local chat model and the image pipeline.

pub mod diffusion;
pub mod ollama;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use shared::agent_api::ChatMessage;

pub use diffusion::DiffusionClient;
pub use ollama::OllamaClient;

/// Provider availability status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderStatus {
    /// Provider is available and ready
    Available,
    /// Provider is unavailable
    Unavailable { reason: String },
}

/// A chat model that turns a message list into one reply.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, messages: Vec<ChatMessage>) -> anyhow::Result<String>;
}

/// A text-to-image pipeline.
#[async_trait::async_trait]
pub trait ImageBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<DynamicImage>;
}

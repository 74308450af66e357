//! System prompt assembly for chat turns.
//!
//! The model receives the whole flattened transcript followed by a fixed
//! bridge sentence and the important-info document, as a single system
//! message. The wording is part of the model's fine-tuning contract.

use shared::agent_api::ChatMessage;

/// Joins the transcript and the important-info text.
pub const HISTORY_BRIDGE: &str = " This is our chat history, and now I'm going to provide some important information about my background: ";

/// Build the system prompt from flattened history and important info.
pub fn get_system_prompt(chat_history: &str, important_info: &str) -> String {
    format!("{}{}{}", chat_history, HISTORY_BRIDGE, important_info)
}

/// The two-message conversation sent on every chat turn.
pub fn build_messages(chat_history: &str, important_info: &str, user_input: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(get_system_prompt(chat_history, important_info)),
        ChatMessage::user(user_input),
    ]
}

//! Agent Host - chat turns for the QRX3 assistant
//!
//! This crate provides:
//! - System prompt assembly from transcript and important info
//! - The turn loop that routes lines to the chat model or the image pipeline
//! - Transcript write-back after every turn

pub mod prompts;
pub mod session;

pub use prompts::{build_messages, get_system_prompt, HISTORY_BRIDGE};
pub use session::{classify_input, ChatSession, SessionLabels, TurnInput, TurnOutcome};

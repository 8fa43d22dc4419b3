//! seavoice-bedrock
//!
//! Streaming model transport over the Bedrock ConverseStream API, with
//! per-persona system prompts and conversation history.

pub mod error;
pub mod prompts;
pub mod registry;
pub mod stream;

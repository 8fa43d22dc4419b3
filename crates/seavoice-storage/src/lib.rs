//! seavoice-storage
//!
//! Named local slots holding saved sessions and the trivia high score.

pub mod error;
pub mod slots;

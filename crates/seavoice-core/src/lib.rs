//! seavoice-core
//!
//! Chat messages, filter context, personas, visualization payloads, trivia
//! questions and request composition. Nothing here talks to the network or
//! the disk.

pub mod compose;
pub mod error;
pub mod models;

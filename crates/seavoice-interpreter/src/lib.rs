//! seavoice-interpreter
//!
//! Incremental interpretation of streamed model responses: splits the live
//! transcript from the embedded payload block, owns the per-surface chat
//! session, and drives an exchange from a fragment stream.

pub mod error;
pub mod exchange;
pub mod interpreter;
pub mod session;

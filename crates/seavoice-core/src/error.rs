use thiserror::Error;

use crate::models::persona::Persona;
use crate::models::visualization::VariantTag;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("trivia game: {0}")]
    Game(String),
}

/// Why an embedded payload block could not become a typed payload.
///
/// These never escape an exchange as errors: the interpreter folds them
/// into its terminal `ParseFailed` state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("payload has no string \"type\" field")]
    MissingType,

    #[error("unknown visualization type: {0}")]
    UnknownVariant(String),

    #[error("visualization type {variant} is not allowed for persona {persona}")]
    VariantNotAllowed { persona: Persona, variant: VariantTag },

    #[error("payload shape does not match {expected}: {detail}")]
    Shape { expected: String, detail: String },

    #[error("{variant} payload violates an invariant: {reason}")]
    Invariant { variant: VariantTag, reason: String },

    #[error("trivia question is invalid: {0}")]
    InvalidTrivia(String),

    #[error("persona {0} does not accept a structured payload")]
    Unexpected(Persona),

    #[error("text found before the payload block")]
    LeadingText,
}

/// The fragment source ended abnormally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport failure: {message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::models::visualization::VariantTag;

/// A named response contract.
///
/// The persona decides what the interpreter accepts when a response closes:
/// whether a structured payload is expected at all and, if so, which shapes
/// are legal. The transcript language is not part of the contract; it is
/// chosen per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Persona {
    DomainExpert,
    Summarizer,
    Conversational,
    TriviaMaster,
}

/// What a persona expects inside the fenced payload block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadContract {
    /// Plain text only; any payload block is an anomaly.
    None,
    /// A visualization whose type is one of the listed variants.
    Visualization(&'static [VariantTag]),
    /// A single trivia question, and nothing else in the response.
    Trivia,
}

impl Persona {
    pub const ALL: [Persona; 4] = [
        Persona::DomainExpert,
        Persona::Summarizer,
        Persona::Conversational,
        Persona::TriviaMaster,
    ];

    pub fn contract(self) -> PayloadContract {
        match self {
            Persona::DomainExpert => PayloadContract::Visualization(&VariantTag::DATA),
            Persona::Summarizer | Persona::Conversational => PayloadContract::None,
            Persona::TriviaMaster => PayloadContract::Trivia,
        }
    }

    pub fn expects_payload(self) -> bool {
        self.contract() != PayloadContract::None
    }

    /// Legal visualization variants. Empty for personas that never produce one.
    pub fn legal_variants(self) -> &'static [VariantTag] {
        match self.contract() {
            PayloadContract::Visualization(tags) => tags,
            PayloadContract::None | PayloadContract::Trivia => &[],
        }
    }

    pub fn allows(self, tag: VariantTag) -> bool {
        self.legal_variants().contains(&tag)
    }

    /// Whether the entire response is the payload (no leading transcript).
    pub fn whole_response_payload(self) -> bool {
        self.contract() == PayloadContract::Trivia
    }

    /// Whether the filter manifest is relevant to this persona's requests.
    pub fn uses_filters(self) -> bool {
        matches!(self, Persona::DomainExpert | Persona::Conversational)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Persona::DomainExpert => "domain_expert",
            Persona::Summarizer => "summarizer",
            Persona::Conversational => "conversational",
            Persona::TriviaMaster => "trivia_master",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Persona {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Persona::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::UnknownValue {
                kind: "persona",
                value: s.to_string(),
            })
    }
}

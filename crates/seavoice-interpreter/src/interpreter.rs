//! The incremental response interpreter.
//!
//! A response arrives as arbitrary text fragments. Everything before the first
//! `` ```json `` marker is transcript; everything after it is the payload
//! block, which ends at the next `` ``` ``. The split point is found once and
//! never moves. The block is decoded speculatively as soon as its closing
//! marker arrives (the live preview) and for good when the stream ends.
//!
//! Marker detection is a literal substring match. A response that mentions
//! the marker in prose is treated as opening a payload block.

use seavoice_core::error::PayloadError;
use seavoice_core::models::persona::{PayloadContract, Persona};
use seavoice_core::models::trivia::TriviaQuestion;
use seavoice_core::models::visualization::VisualizationPayload;
use tracing::{debug, info, warn};

pub const OPEN_DELIMITER: &str = "```json";
pub const CLOSE_DELIMITER: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scanning,
    InPayload,
    Closed,
}

/// A decoded, validated payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Visualization(VisualizationPayload),
    Trivia(TriviaQuestion),
}

impl Payload {
    pub fn as_visualization(&self) -> Option<&VisualizationPayload> {
        match self {
            Payload::Visualization(v) => Some(v),
            Payload::Trivia(_) => None,
        }
    }

    pub fn as_trivia(&self) -> Option<&TriviaQuestion> {
        match self {
            Payload::Trivia(q) => Some(q),
            Payload::Visualization(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pending,
    Ok(Payload),
    ParseFailed(PayloadError),
    NoPayload,
}

impl Outcome {
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Outcome::Ok(p) => Some(p),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Outcome::Pending => "pending",
            Outcome::Ok(_) => "ok",
            Outcome::ParseFailed(_) => "parse_failed",
            Outcome::NoPayload => "no_payload",
        }
    }
}

/// The final state of one exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Terminal {
    /// Text shown to the user.
    pub transcript: String,
    pub outcome: Outcome,
    /// The complete response as received, block included.
    pub response: String,
}

/// What changed when a fragment was applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub transcript_changed: bool,
    pub entered_payload: bool,
    pub preview_updated: bool,
}

/// State machine for one response.
#[derive(Debug)]
pub struct Interpreter {
    persona: Persona,
    raw: String,
    phase: Phase,
    /// Byte offset of the opening marker in `raw`.
    open_at: Option<usize>,
    /// Byte offset of the closing marker in `raw`.
    close_at: Option<usize>,
    /// No marker currently being searched for starts before this offset.
    search_from: usize,
    transcript: String,
    /// Decode of the closed block. Fixed once the closing marker is seen.
    block: Option<Result<Payload, PayloadError>>,
    preview: Option<Payload>,
    outcome: Outcome,
}

impl Interpreter {
    pub fn new(persona: Persona) -> Self {
        Self {
            persona,
            raw: String::new(),
            phase: Phase::Scanning,
            open_at: None,
            close_at: None,
            search_from: 0,
            transcript: String::new(),
            block: None,
            preview: None,
            outcome: Outcome::Pending,
        }
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Everything received so far.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Transcript as it should be displayed right now.
    ///
    /// While scanning this is everything received; once the payload block has
    /// opened it is the trimmed text before the marker.
    pub fn transcript(&self) -> &str {
        match self.phase {
            Phase::Scanning => &self.raw,
            Phase::InPayload | Phase::Closed => &self.transcript,
        }
    }

    /// Text after the opening marker, if it has been seen.
    pub fn payload_raw(&self) -> Option<&str> {
        self.open_at.map(|at| &self.raw[at + OPEN_DELIMITER.len()..])
    }

    /// Most recent successful speculative decode.
    pub fn preview(&self) -> Option<&Payload> {
        self.preview.as_ref()
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Apply the next fragment.
    ///
    /// Fragments arriving after the interpreter has closed are ignored.
    pub fn push(&mut self, fragment: &str) -> Progress {
        let mut progress = Progress::default();
        if self.phase == Phase::Closed {
            warn!(persona = %self.persona, len = fragment.len(), "fragment after close ignored");
            return progress;
        }
        if fragment.is_empty() {
            return progress;
        }

        self.raw.push_str(fragment);

        if self.phase == Phase::Scanning {
            match find_from(&self.raw, OPEN_DELIMITER, self.search_from) {
                Some(at) => {
                    self.open_at = Some(at);
                    self.transcript = self.raw[..at].trim().to_string();
                    self.phase = Phase::InPayload;
                    self.search_from = at + OPEN_DELIMITER.len();
                    progress.entered_payload = true;
                    debug!(
                        persona = %self.persona,
                        split = at,
                        transcript_len = self.transcript.len(),
                        "payload block opened"
                    );
                }
                None => {
                    self.search_from = resume_point(&self.raw, self.search_from, OPEN_DELIMITER);
                }
            }
            progress.transcript_changed = true;
        }

        if self.phase == Phase::InPayload && self.close_at.is_none() {
            match find_from(&self.raw, CLOSE_DELIMITER, self.search_from) {
                Some(at) => {
                    self.close_at = Some(at);
                    progress.preview_updated = self.speculate();
                }
                None => {
                    self.search_from =
                        resume_point(&self.raw, self.search_from, CLOSE_DELIMITER);
                }
            }
        }

        progress
    }

    /// Close the interpreter at end of stream and produce the terminal result.
    ///
    /// Calling this again returns the same result.
    pub fn finish(&mut self) -> Terminal {
        if self.phase != Phase::Closed {
            self.outcome = match self.phase {
                Phase::Scanning => self.close_without_block(),
                Phase::InPayload | Phase::Closed => self.close_with_block(),
            };
            self.phase = Phase::Closed;

            match &self.outcome {
                Outcome::ParseFailed(reason) => warn!(
                    persona = %self.persona,
                    response_len = self.raw.len(),
                    %reason,
                    "payload could not be decoded"
                ),
                outcome => info!(
                    persona = %self.persona,
                    response_len = self.raw.len(),
                    outcome = outcome.label(),
                    "response closed"
                ),
            }
        }

        Terminal {
            transcript: self.transcript.clone(),
            outcome: self.outcome.clone(),
            response: self.raw.clone(),
        }
    }

    fn close_without_block(&mut self) -> Outcome {
        if !self.persona.whole_response_payload() {
            self.transcript = self.raw.clone();
            return Outcome::NoPayload;
        }

        match decode_block(self.persona, &self.raw) {
            Ok(payload) => {
                self.transcript.clear();
                Outcome::Ok(payload)
            }
            Err(reason) => {
                self.transcript = self.raw.trim().to_string();
                Outcome::ParseFailed(reason)
            }
        }
    }

    fn close_with_block(&mut self) -> Outcome {
        if self.persona.whole_response_payload() && !self.transcript.is_empty() {
            return Outcome::ParseFailed(PayloadError::LeadingText);
        }

        let decoded = match self.block.take() {
            Some(decoded) => decoded,
            None => {
                let body = self.payload_raw().unwrap_or_default();
                decode_block(self.persona, body)
            }
        };

        match decoded {
            Ok(payload) => Outcome::Ok(payload),
            Err(reason) => Outcome::ParseFailed(reason),
        }
    }

    /// Decode the closed block and publish it as the preview on success.
    fn speculate(&mut self) -> bool {
        let (Some(open), Some(close)) = (self.open_at, self.close_at) else {
            return false;
        };
        let body = &self.raw[open + OPEN_DELIMITER.len()..close];
        let decoded = decode_block(self.persona, body);

        let published = match &decoded {
            Ok(payload) if self.persona.expects_payload() => {
                self.preview = Some(payload.clone());
                true
            }
            Ok(_) => false,
            Err(reason) => {
                debug!(persona = %self.persona, %reason, "speculative decode failed");
                false
            }
        };
        self.block = Some(decoded);
        published
    }
}

/// Parse block text as JSON and decode it under the persona's contract.
pub fn decode_block(persona: Persona, text: &str) -> Result<Payload, PayloadError> {
    let value: serde_json::Value =
        serde_json::from_str(text.trim()).map_err(|e| PayloadError::InvalidJson(e.to_string()))?;

    match persona.contract() {
        PayloadContract::None => Err(PayloadError::Unexpected(persona)),
        PayloadContract::Visualization(_) => {
            let payload = VisualizationPayload::decode(value)?;
            if !persona.allows(payload.kind()) {
                return Err(PayloadError::VariantNotAllowed {
                    persona,
                    variant: payload.kind(),
                });
            }
            Ok(Payload::Visualization(payload))
        }
        PayloadContract::Trivia => TriviaQuestion::decode(value).map(Payload::Trivia),
    }
}

fn find_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack[from..].find(needle).map(|at| from + at)
}

/// Where the next search for `needle` has to start after a miss: far enough
/// back that a marker split across fragments is still found.
fn resume_point(haystack: &str, from: usize, needle: &str) -> usize {
    let mut at = haystack
        .len()
        .saturating_sub(needle.len().saturating_sub(1))
        .max(from);
    while !haystack.is_char_boundary(at) {
        at -= 1;
    }
    at
}

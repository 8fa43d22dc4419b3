//! A chat surface: its transcript, filters, and the one exchange in flight.
//!
//! Every dispatched request gets an [`ExchangeTicket`]. Fragments and stream
//! endings are applied against a ticket, and anything carrying a ticket other
//! than the current one is dropped. This is what keeps a superseded stream
//! from writing into the transcript of the request that replaced it.

use seavoice_core::compose::compose;
use seavoice_core::error::TransportError;
use seavoice_core::models::filters::Filters;
use seavoice_core::models::language::Language;
use seavoice_core::models::message::{Message, Transcript};
use seavoice_core::models::persona::Persona;
use seavoice_core::models::snapshot::{ChatSnapshot, SessionSnapshot};
use seavoice_core::models::visualization::VisualizationPayload;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ExchangeError, SessionError};
use crate::interpreter::{Interpreter, Outcome, Payload, Progress, Terminal};

pub const WELCOME_TITLE: &str = "Welcome to Sea Voice";
pub const LOADING_TITLE: &str = "Processing your request...";
pub const RENDER_FAILED_TITLE: &str = "Error: Could not render visualization.";
pub const CONVERSATIONAL_TITLE: &str = "Conversational Response";
pub const TRANSPORT_FAILED_TITLE: &str = "Error";

/// Shown to the user when the transport fails mid-exchange.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Identifies one dispatched request within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeTicket(u64);

/// Everything the caller needs to open a stream for a new request.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub ticket: ExchangeTicket,
    pub request: String,
    pub persona: Persona,
    pub language: Language,
}

/// Result of applying a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentOutcome {
    Applied(Progress),
    /// The ticket no longer owns the session; nothing was changed.
    Stale,
}

#[derive(Debug)]
struct ActiveExchange {
    ticket: ExchangeTicket,
    message_id: Uuid,
    interpreter: Interpreter,
}

/// One chat surface (the explorer, the text-only chat, ...).
#[derive(Debug)]
pub struct ChatSession {
    persona: Persona,
    language: Language,
    filters: Filters,
    transcript: Transcript,
    last_visualization: VisualizationPayload,
    last_summary: Option<String>,
    next_ticket: u64,
    active: Option<ActiveExchange>,
}

impl ChatSession {
    pub fn new(persona: Persona, language: Language) -> Self {
        Self {
            persona,
            language,
            filters: Filters::default(),
            transcript: Transcript::default(),
            last_visualization: VisualizationPayload::welcome(WELCOME_TITLE),
            last_summary: None,
            next_ticket: 0,
            active: None,
        }
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Takes effect from the next dispatched request.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Live filters. Requests already dispatched keep the filters they were
    /// composed with.
    pub fn filters_mut(&mut self) -> &mut Filters {
        &mut self.filters
    }

    pub fn set_filters(&mut self, filters: Filters) -> Result<(), SessionError> {
        filters.validate()?;
        self.filters = filters;
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        self.transcript.messages()
    }

    pub fn last_visualization(&self) -> &VisualizationPayload {
        &self.last_visualization
    }

    pub fn last_summary(&self) -> Option<&str> {
        self.last_summary.as_deref()
    }

    pub fn is_streaming(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_ticket(&self) -> Option<ExchangeTicket> {
        self.active.as_ref().map(|a| a.ticket)
    }

    /// Transcript text of the in-flight reply.
    pub fn live_transcript(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.interpreter.transcript())
    }

    /// Latest speculative payload of the in-flight reply.
    pub fn live_preview(&self) -> Option<&Payload> {
        self.active.as_ref().and_then(|a| a.interpreter.preview())
    }

    // ── Exchange lifecycle ───────────────────────────────────────────────────

    /// Record the user's utterance, open an assistant reply, and compose the
    /// outbound request. Any exchange still in flight is superseded.
    pub fn dispatch(&mut self, utterance: &str) -> Result<Dispatch, SessionError> {
        if utterance.trim().is_empty() {
            return Err(SessionError::BlankUtterance);
        }

        self.abandon_active("superseded");

        let snapshot = self.filters.clone();
        let request = compose(utterance, &snapshot, self.persona);

        self.transcript.push_user(utterance.trim());
        let message_id = self.transcript.begin_assistant();

        self.next_ticket += 1;
        let ticket = ExchangeTicket(self.next_ticket);
        self.active = Some(ActiveExchange {
            ticket,
            message_id,
            interpreter: Interpreter::new(self.persona),
        });

        if self.persona == Persona::DomainExpert {
            self.last_summary = None;
            self.last_visualization = VisualizationPayload::loading(LOADING_TITLE);
        }

        info!(
            ticket = ticket.0,
            persona = %self.persona,
            language = %self.language,
            request_len = request.len(),
            "exchange dispatched"
        );

        Ok(Dispatch {
            ticket,
            request,
            persona: self.persona,
            language: self.language,
        })
    }

    /// Apply one fragment of the reply identified by `ticket`.
    pub fn apply_fragment(&mut self, ticket: ExchangeTicket, fragment: &str) -> FragmentOutcome {
        let Some(active) = self.active.as_mut().filter(|a| a.ticket == ticket) else {
            debug!(ticket = ticket.0, "stale fragment dropped");
            return FragmentOutcome::Stale;
        };

        let progress = active.interpreter.push(fragment);

        if progress.transcript_changed {
            self.transcript
                .update_in_flight(active.message_id, active.interpreter.transcript());
        }
        if self.persona == Persona::DomainExpert {
            if progress.entered_payload {
                self.last_summary = Some(active.interpreter.transcript().to_string());
            }
            if progress.preview_updated
                && let Some(Payload::Visualization(v)) = active.interpreter.preview()
            {
                self.last_visualization = v.clone();
            }
        }

        FragmentOutcome::Applied(progress)
    }

    /// Close the exchange at end of stream.
    pub fn finish(&mut self, ticket: ExchangeTicket) -> Result<Terminal, ExchangeError> {
        let mut active = self.take_active(ticket)?;
        let terminal = active.interpreter.finish();

        self.transcript
            .update_in_flight(active.message_id, &terminal.transcript);
        self.transcript.seal(active.message_id);

        if self.persona == Persona::DomainExpert {
            match &terminal.outcome {
                Outcome::Ok(Payload::Visualization(v)) => {
                    self.last_visualization = v.clone();
                    self.last_summary = Some(terminal.transcript.clone());
                }
                Outcome::Ok(Payload::Trivia(_)) | Outcome::ParseFailed(_) => {
                    self.last_visualization = VisualizationPayload::welcome(RENDER_FAILED_TITLE);
                    self.last_summary = non_blank(&terminal.transcript);
                }
                Outcome::NoPayload | Outcome::Pending => {
                    self.last_visualization = VisualizationPayload::welcome(CONVERSATIONAL_TITLE);
                    self.last_summary = None;
                }
            }
        }

        Ok(terminal)
    }

    /// Abandon the exchange after a transport failure.
    ///
    /// The reply keeps whatever text arrived before the failure.
    pub fn fail(&mut self, ticket: ExchangeTicket, error: &TransportError) -> Result<(), ExchangeError> {
        let active = self.take_active(ticket)?;
        warn!(ticket = ticket.0, %error, "exchange failed");

        self.transcript.seal(active.message_id);
        if self.persona == Persona::DomainExpert {
            self.last_visualization = VisualizationPayload::welcome(TRANSPORT_FAILED_TITLE);
        }
        Ok(())
    }

    /// Abandon the exchange in flight, if any, keeping the text received so
    /// far. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.abandon_active("cancelled");
        if cancelled && matches!(self.last_visualization, VisualizationPayload::Loading { .. }) {
            self.last_visualization = VisualizationPayload::welcome(WELCOME_TITLE);
        }
        cancelled
    }

    fn take_active(&mut self, ticket: ExchangeTicket) -> Result<ActiveExchange, ExchangeError> {
        match self.active.take() {
            Some(active) if active.ticket == ticket => Ok(active),
            other => {
                self.active = other;
                Err(ExchangeError::Superseded)
            }
        }
    }

    fn abandon_active(&mut self, reason: &str) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        self.transcript.seal(active.message_id);
        info!(
            ticket = active.ticket.0,
            reason,
            received = active.interpreter.raw().len(),
            "exchange abandoned"
        );
        true
    }

    // ── Session tools ────────────────────────────────────────────────────────

    /// Reset chat, filters, and visualization.
    pub fn clear(&mut self) {
        self.abandon_active("cleared");
        self.transcript.clear();
        self.filters = Filters::default();
        self.last_visualization = VisualizationPayload::welcome(WELCOME_TITLE);
        self.last_summary = None;
    }

    pub fn clear_visualization(&mut self) {
        self.last_visualization = VisualizationPayload::welcome(WELCOME_TITLE);
        self.last_summary = None;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.transcript.messages().to_vec(),
            filters: self.filters.clone(),
            language: self.language,
            last_visualization: self.last_visualization.clone(),
            last_summary: self.last_summary.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: SessionSnapshot) -> Result<(), SessionError> {
        snapshot.filters.validate()?;
        self.abandon_active("restored");
        self.transcript = Transcript::from_messages(snapshot.messages);
        self.filters = snapshot.filters;
        self.language = snapshot.language;
        self.last_visualization = snapshot.last_visualization;
        self.last_summary = snapshot.last_summary;
        Ok(())
    }

    pub fn chat_snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            messages: self.transcript.messages().to_vec(),
            language: self.language,
            persona: self.persona,
        }
    }

    pub fn restore_chat(&mut self, snapshot: ChatSnapshot) {
        self.abandon_active("restored");
        self.transcript = Transcript::from_messages(snapshot.messages);
        self.language = snapshot.language;
        self.persona = snapshot.persona;
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use seavoice_core::models::filters::SensorType;
    use seavoice_core::models::message::Sender;

    use super::*;

    #[test]
    fn blank_utterance_is_rejected() {
        let mut session = ChatSession::new(Persona::DomainExpert, Language::En);
        assert!(matches!(session.dispatch("   "), Err(SessionError::BlankUtterance)));
        assert!(session.messages().is_empty());
    }

    #[test]
    fn dispatch_opens_reply_and_shows_loading() {
        let mut session = ChatSession::new(Persona::DomainExpert, Language::En);
        let dispatch = session.dispatch("Map floats").unwrap();

        assert_eq!(dispatch.request, "Map floats");
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].sender, Sender::User);
        assert_eq!(session.messages()[1].sender, Sender::Assistant);
        assert!(matches!(
            session.last_visualization(),
            VisualizationPayload::Loading { .. }
        ));
        assert!(session.is_streaming());
    }

    #[test]
    fn filters_edited_after_dispatch_do_not_reach_request() {
        let mut session = ChatSession::new(Persona::DomainExpert, Language::En);
        session.filters_mut().set_sensor_type(SensorType::Oxygen);
        let dispatch = session.dispatch("Plot").unwrap();
        session.filters_mut().set_sensor_type(SensorType::Salinity);

        assert!(dispatch.request.contains("Sensor type: Oxygen"));
        assert!(!dispatch.request.contains("Salinity"));
    }

    #[test]
    fn parse_failure_keeps_summary_and_shows_error() {
        let mut session = ChatSession::new(Persona::DomainExpert, Language::En);
        let dispatch = session.dispatch("Plot").unwrap();
        session.apply_fragment(dispatch.ticket, "Summary text\n```json\n{\"type\": \"map\", ");
        let terminal = session.finish(dispatch.ticket).unwrap();

        assert!(matches!(terminal.outcome, Outcome::ParseFailed(_)));
        assert_eq!(session.messages()[1].text, "Summary text");
        assert_eq!(session.last_summary(), Some("Summary text"));
        assert_eq!(session.last_visualization().title(), RENDER_FAILED_TITLE);
    }

    #[test]
    fn transport_failure_keeps_partial_text() {
        let mut session = ChatSession::new(Persona::DomainExpert, Language::En);
        let dispatch = session.dispatch("Plot").unwrap();
        session.apply_fragment(dispatch.ticket, "Partial ans");
        session
            .fail(dispatch.ticket, &TransportError::new("connection reset"))
            .unwrap();

        assert_eq!(session.messages()[1].text, "Partial ans");
        assert!(!session.is_streaming());
        assert_eq!(session.last_visualization().title(), TRANSPORT_FAILED_TITLE);
    }

    #[test]
    fn snapshot_round_trip_restores_state() {
        let mut session = ChatSession::new(Persona::DomainExpert, Language::Fr);
        session.filters_mut().set_sensor_type(SensorType::Nitrate);
        let dispatch = session.dispatch("Hello").unwrap();
        session.apply_fragment(dispatch.ticket, "Bonjour");
        session.finish(dispatch.ticket).unwrap();
        let snapshot = session.snapshot();

        let mut other = ChatSession::new(Persona::DomainExpert, Language::En);
        other.restore(snapshot.clone()).unwrap();
        assert_eq!(other.snapshot(), snapshot);
        assert_eq!(other.language(), Language::Fr);
    }

    #[test]
    fn cancel_keeps_partial_reply_and_drops_loading() {
        let mut session = ChatSession::new(Persona::DomainExpert, Language::En);
        assert!(!session.cancel());

        let dispatch = session.dispatch("Plot").unwrap();
        session.apply_fragment(dispatch.ticket, "Half an ans");
        assert!(session.cancel());

        assert_eq!(session.messages()[1].text, "Half an ans");
        assert_eq!(session.last_visualization().title(), WELCOME_TITLE);
        assert!(matches!(session.finish(dispatch.ticket), Err(ExchangeError::Superseded)));
    }

    #[test]
    fn clear_resets_everything() {
        let mut session = ChatSession::new(Persona::DomainExpert, Language::En);
        session.filters_mut().set_sensor_type(SensorType::Ph);
        let dispatch = session.dispatch("Hello").unwrap();
        session.clear();

        assert!(session.messages().is_empty());
        assert!(session.filters().is_empty());
        assert!(!session.is_streaming());
        assert_eq!(
            session.apply_fragment(dispatch.ticket, "late"),
            FragmentOutcome::Stale
        );
    }
}

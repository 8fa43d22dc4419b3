use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single message in a chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub created_at: jiff::Timestamp,
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text: text.into(),
            created_at: jiff::Timestamp::now(),
        }
    }
}

/// An ordered, append-only list of messages.
///
/// The one exception to append-only is the in-flight assistant message, which
/// is rewritten as its reply streams in. At most one message is in flight;
/// opening a new one seals the previous one where it stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
    in_flight: Option<Uuid>,
}

impl Transcript {
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            in_flight: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn in_flight(&self) -> Option<Uuid> {
        self.in_flight
    }

    pub fn get(&self, id: Uuid) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> Uuid {
        let message = Message::new(Sender::User, text);
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Append an empty assistant message and mark it in flight.
    pub fn begin_assistant(&mut self) -> Uuid {
        let message = Message::new(Sender::Assistant, String::new());
        let id = message.id;
        self.messages.push(message);
        self.in_flight = Some(id);
        id
    }

    /// Replace the text of the in-flight message.
    ///
    /// Returns `false` (and changes nothing) if `id` is not the message
    /// currently in flight.
    pub fn update_in_flight(&mut self, id: Uuid, text: &str) -> bool {
        if self.in_flight != Some(id) {
            return false;
        }
        match self.messages.iter_mut().rev().find(|m| m.id == id) {
            Some(message) => {
                if message.text != text {
                    message.text.clear();
                    message.text.push_str(text);
                }
                true
            }
            None => false,
        }
    }

    /// Stop treating `id` as in flight. No-op if it is not the current one.
    pub fn seal(&mut self, id: Uuid) {
        if self.in_flight == Some(id) {
            self.in_flight = None;
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.in_flight = None;
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_in_flight_message_is_mutable() {
        let mut transcript = Transcript::default();
        transcript.push_user("show me a map");
        let first = transcript.begin_assistant();
        assert!(transcript.update_in_flight(first, "Here"));

        let second = transcript.begin_assistant();
        assert!(!transcript.update_in_flight(first, "stale"));
        assert!(transcript.update_in_flight(second, "fresh"));

        assert_eq!(transcript.get(first).unwrap().text, "Here");
        assert_eq!(transcript.get(second).unwrap().text, "fresh");
        assert_eq!(transcript.in_flight(), Some(second));
    }

    #[test]
    fn sealed_message_is_frozen() {
        let mut transcript = Transcript::default();
        let id = transcript.begin_assistant();
        transcript.update_in_flight(id, "done");
        transcript.seal(id);

        assert_eq!(transcript.in_flight(), None);
        assert!(!transcript.update_in_flight(id, "changed"));
        assert_eq!(transcript.get(id).unwrap().text, "done");
    }

    #[test]
    fn sender_serializes_snake_case() {
        let message = Message::new(Sender::Assistant, "hi");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["sender"], "assistant");
    }
}

//! Saved session state.
//!
//! Snapshots are stored as JSON documents. Loading is strict about the
//! top-level shape: every key in [`Snapshot::REQUIRED_KEYS`] must be present
//! before the document is accepted.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::filters::Filters;
use crate::models::language::Language;
use crate::models::message::Message;
use crate::models::persona::Persona;
use crate::models::visualization::VisualizationPayload;

/// A document that can be saved to and restored from a named slot.
pub trait Snapshot: Serialize + DeserializeOwned {
    /// Top-level keys that must exist in a stored document.
    const REQUIRED_KEYS: &'static [&'static str];
}

/// Explorer state: chat, filters, and the last thing drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub filters: Filters,
    pub language: Language,
    pub last_visualization: VisualizationPayload,
    pub last_summary: Option<String>,
}

impl Snapshot for SessionSnapshot {
    const REQUIRED_KEYS: &'static [&'static str] = &[
        "messages",
        "filters",
        "language",
        "lastVisualization",
        "lastSummary",
    ];
}

/// Text-only chat state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSnapshot {
    pub messages: Vec<Message>,
    pub language: Language,
    pub persona: Persona,
}

impl Snapshot for ChatSnapshot {
    const REQUIRED_KEYS: &'static [&'static str] = &["messages", "language", "persona"];
}

/// Best trivia score on this machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScore {
    pub high_score: u32,
}

impl Snapshot for HighScore {
    const REQUIRED_KEYS: &'static [&'static str] = &["highScore"];
}

/// Keys from `required` that are absent from `value`'s top level.
pub fn missing_keys(value: &serde_json::Value, required: &[&str]) -> Vec<String> {
    let Some(object) = value.as_object() else {
        return required.iter().map(|k| k.to_string()).collect();
    };
    required
        .iter()
        .filter(|k| !object.contains_key(**k))
        .map(|k| k.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn session_snapshot_has_expected_top_level_keys() {
        let snapshot = SessionSnapshot {
            messages: Vec::new(),
            filters: Filters::default(),
            language: Language::Es,
            last_visualization: VisualizationPayload::welcome("Welcome to Sea Voice"),
            last_summary: None,
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        assert!(missing_keys(&value, SessionSnapshot::REQUIRED_KEYS).is_empty());
        assert!(value["lastSummary"].is_null());
    }

    #[test]
    fn reports_missing_keys() {
        let value = json!({"messages": [], "language": "en"});
        assert_eq!(
            missing_keys(&value, SessionSnapshot::REQUIRED_KEYS),
            vec!["filters", "lastVisualization", "lastSummary"]
        );
        assert_eq!(missing_keys(&json!([1, 2]), &["messages"]), vec!["messages"]);
    }
}

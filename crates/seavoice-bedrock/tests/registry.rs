use seavoice_bedrock::registry::{ConversationRegistry, Role, Turn};
use seavoice_core::models::language::Language;
use seavoice_core::models::persona::Persona;

#[test]
fn conversations_are_keyed_by_language_and_persona() {
    let mut registry = ConversationRegistry::new();
    registry.record(Language::En, Persona::DomainExpert, "Map floats", "Here.");
    registry.conversation(Language::Fr, Persona::DomainExpert);
    registry.conversation(Language::En, Persona::Summarizer);

    assert_eq!(registry.len(), 3);
    assert_eq!(
        registry
            .get(Language::En, Persona::DomainExpert)
            .map(|c| c.history().len()),
        Some(2)
    );
    assert_eq!(
        registry
            .get(Language::Fr, Persona::DomainExpert)
            .map(|c| c.history().len()),
        Some(0)
    );
    assert!(registry.get(Language::De, Persona::DomainExpert).is_none());
}

#[test]
fn system_prompt_follows_language() {
    let mut registry = ConversationRegistry::new();
    let prompt = registry
        .conversation(Language::Pt, Persona::Conversational)
        .system_prompt()
        .to_string();
    assert!(prompt.contains("Portuguese"));
}

#[test]
fn request_is_appended_after_history() {
    let mut registry = ConversationRegistry::new();
    registry.record(Language::En, Persona::DomainExpert, "First", "Reply one");

    let conversation = registry.conversation(Language::En, Persona::DomainExpert);
    let turns = conversation.messages_for("Second");

    assert_eq!(
        turns,
        vec![
            Turn::user("First"),
            Turn::assistant("Reply one"),
            Turn::user("Second"),
        ]
    );
    assert_eq!(conversation.history().len(), 2);
}

#[test]
fn blank_replies_are_not_recorded() {
    let mut registry = ConversationRegistry::new();
    registry.record(Language::En, Persona::Summarizer, "Summarize", "   ");

    let conversation = registry.conversation(Language::En, Persona::Summarizer);
    assert!(conversation.history().is_empty());
    assert_eq!(conversation.messages_for("Again")[0].role, Role::User);
}

#[test]
fn reset_forgets_one_history() {
    let mut registry = ConversationRegistry::new();
    registry.record(Language::En, Persona::DomainExpert, "a", "b");
    registry.record(Language::Es, Persona::DomainExpert, "c", "d");
    registry.reset(Language::En, Persona::DomainExpert);

    assert_eq!(
        registry
            .get(Language::En, Persona::DomainExpert)
            .map(|c| c.history().len()),
        Some(0)
    );
    assert_eq!(
        registry
            .get(Language::Es, Persona::DomainExpert)
            .map(|c| c.history().len()),
        Some(2)
    );

    registry.clear();
    assert!(registry.is_empty());
}

//! ConverseStream as a fragment stream.
//!
//! Only text deltas become fragments. Other events (message start and stop,
//! metadata, tool use) are skipped. The first stream error is yielded as a
//! [`TransportError`] and ends the stream.

use aws_sdk_bedrockruntime::types::{
    ContentBlock, ContentBlockDelta, ConversationRole, ConverseStreamOutput, Message,
    SystemContentBlock,
};
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use seavoice_core::error::TransportError;
use tracing::{debug, info};

use crate::error::{BedrockError, format_err_chain};
use crate::registry::{Conversation, Role, Turn};

/// Text fragments of one model reply.
pub type Fragments = BoxStream<'static, Result<String, TransportError>>;

/// A Bedrock model to stream replies from.
#[derive(Debug, Clone)]
pub struct BedrockSource {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
}

impl BedrockSource {
    pub fn new(config: &aws_config::SdkConfig, model_id: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_bedrockruntime::Client::new(config),
            model_id: model_id.into(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Send `request` on top of `conversation` and stream back the reply.
    ///
    /// The request is not added to the conversation; record it once the
    /// reply has completed.
    pub async fn open(
        &self,
        conversation: &Conversation,
        request: &str,
    ) -> Result<Fragments, BedrockError> {
        if request.trim().is_empty() {
            return Err(BedrockError::BlankRequest);
        }
        let messages = build_messages(&conversation.messages_for(request))?;

        info!(
            model_id = %self.model_id,
            persona = %conversation.persona(),
            language = %conversation.language(),
            turns = messages.len(),
            "opening model stream"
        );

        let output = self
            .client
            .converse_stream()
            .model_id(&self.model_id)
            .system(SystemContentBlock::Text(conversation.system_prompt().to_string()))
            .set_messages(Some(messages))
            .send()
            .await
            .map_err(|e| BedrockError::Invocation(format_err_chain(&e)))?;

        let fragments = stream::unfold(Some(output.stream), |receiver| async move {
            let mut receiver = receiver?;
            loop {
                match receiver.recv().await {
                    Ok(Some(event)) => {
                        if let Some(text) = text_delta(&event) {
                            return Some((Ok(text), Some(receiver)));
                        }
                    }
                    Ok(None) => return None,
                    Err(e) => {
                        let error = TransportError::new(format_err_chain(&e));
                        return Some((Err(error), None));
                    }
                }
            }
        });

        Ok(fragments.boxed())
    }
}

/// Convert conversation turns into Converse API messages.
pub fn build_messages(turns: &[Turn]) -> Result<Vec<Message>, BedrockError> {
    turns
        .iter()
        .map(|turn| {
            let role = match turn.role {
                Role::User => ConversationRole::User,
                Role::Assistant => ConversationRole::Assistant,
            };
            Message::builder()
                .role(role)
                .content(ContentBlock::Text(turn.content.clone()))
                .build()
                .map_err(|e| BedrockError::InvalidMessage(e.to_string()))
        })
        .collect()
}

fn text_delta(event: &ConverseStreamOutput) -> Option<String> {
    match event {
        ConverseStreamOutput::ContentBlockDelta(ev) => match ev.delta() {
            Some(ContentBlockDelta::Text(text)) if !text.is_empty() => Some(text.clone()),
            _ => None,
        },
        ConverseStreamOutput::MessageStop(ev) => {
            debug!(stop_reason = ?ev.stop_reason(), "model stream stopped");
            None
        }
        _ => None,
    }
}

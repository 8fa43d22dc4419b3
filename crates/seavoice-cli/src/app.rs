//! Shared state of a running front end and the streamed reply loop.

use std::io::Write;

use eyre::Result;
use seavoice_bedrock::error::format_err_chain;
use seavoice_bedrock::registry::ConversationRegistry;
use seavoice_bedrock::stream::BedrockSource;
use seavoice_core::error::TransportError;
use seavoice_interpreter::error::ExchangeError;
use seavoice_interpreter::exchange::drive_exchange;
use seavoice_interpreter::interpreter::Terminal;
use seavoice_interpreter::session::{ChatSession, Dispatch};
use seavoice_storage::slots::SlotStore;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

use crate::render::TranscriptPrinter;

pub type Input = Lines<BufReader<Stdin>>;

pub fn stdin_lines() -> Input {
    BufReader::new(tokio::io::stdin()).lines()
}

pub fn prompt(text: &str) {
    print!("{text}");
    std::io::stdout().flush().ok();
}

pub struct App {
    pub source: BedrockSource,
    pub registry: ConversationRegistry,
    pub store: SlotStore,
}

/// How a streamed reply ended.
pub enum ReplyEnd {
    Finished(Terminal),
    /// The transport failed; the partial reply stays in the transcript.
    Failed,
    /// The user typed a line while the reply streamed. The exchange was
    /// abandoned and the line still has to be handled.
    Interrupted(String),
}

impl App {
    pub fn new(source: BedrockSource, store: SlotStore) -> Self {
        Self {
            source,
            registry: ConversationRegistry::new(),
            store,
        }
    }

    /// Stream the reply to `dispatch` into `session`, echoing the transcript.
    ///
    /// Completed replies are added to the conversation history; failed and
    /// interrupted ones are not.
    pub async fn stream_reply(
        &mut self,
        session: &mut ChatSession,
        dispatch: &Dispatch,
        input: &mut Input,
    ) -> Result<ReplyEnd> {
        let conversation = self.registry.conversation(dispatch.language, dispatch.persona);
        let fragments = match self.source.open(conversation, &dispatch.request).await {
            Ok(fragments) => fragments,
            Err(e) => {
                let error = TransportError::new(format_err_chain(&e));
                warn!(%error, "could not open model stream");
                session.fail(dispatch.ticket, &error)?;
                return Ok(ReplyEnd::Failed);
            }
        };

        let mut printer = TranscriptPrinter::new();
        let raced = tokio::select! {
            result = drive_exchange(session, dispatch.ticket, fragments, |s, _| {
                if let Some(text) = s.live_transcript().and_then(|t| printer.delta(t)) {
                    prompt(&text);
                }
            }) => Ok(result),
            line = next_non_blank(input) => Err(line),
        };

        match raced {
            Ok(Ok(terminal)) => {
                if let Some(text) = printer.finish(&terminal.transcript) {
                    prompt(&text);
                }
                println!();
                self.registry.record(
                    dispatch.language,
                    dispatch.persona,
                    &dispatch.request,
                    &terminal.response,
                );
                Ok(ReplyEnd::Finished(terminal))
            }
            Ok(Err(ExchangeError::Transport(error))) => {
                println!();
                warn!(%error, "model stream failed");
                Ok(ReplyEnd::Failed)
            }
            Ok(Err(ExchangeError::Superseded)) => {
                println!();
                Ok(ReplyEnd::Failed)
            }
            Err(line) => {
                session.cancel();
                println!();
                Ok(ReplyEnd::Interrupted(line?))
            }
        }
    }
}

/// Next non-blank input line. Once input is closed this never resolves, so
/// a reply in progress streams to the end.
async fn next_non_blank(input: &mut Input) -> std::io::Result<String> {
    loop {
        match input.next_line().await? {
            Some(line) if !line.trim().is_empty() => return Ok(line),
            Some(_) => continue,
            None => std::future::pending::<()>().await,
        }
    }
}

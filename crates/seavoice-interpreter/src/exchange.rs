//! Driving an exchange from a fragment stream.
//!
//! A fragment stream is any `Stream` of `Result<String, TransportError>` with a
//! single consumer. The only suspension point is waiting for the next
//! fragment; each fragment is applied synchronously before the next is
//! pulled, so updates are observed in arrival order.

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use seavoice_core::error::TransportError;
use seavoice_core::models::persona::Persona;

use crate::error::ExchangeError;
use crate::interpreter::{Interpreter, Progress, Terminal};
use crate::session::{ChatSession, ExchangeTicket, FragmentOutcome};

/// A boxed fragment stream, as produced by a transport.
pub type FragmentStream = BoxStream<'static, Result<String, TransportError>>;

/// Pull `fragments` to completion into `session` under `ticket`.
///
/// `on_progress` runs after every applied fragment. Returns
/// [`ExchangeError::Superseded`] as soon as the ticket stops owning the
/// session; the rest of the stream is left unread.
pub async fn drive_exchange<S, F>(
    session: &mut ChatSession,
    ticket: ExchangeTicket,
    mut fragments: S,
    mut on_progress: F,
) -> Result<Terminal, ExchangeError>
where
    S: Stream<Item = Result<String, TransportError>> + Unpin,
    F: FnMut(&ChatSession, Progress),
{
    while let Some(next) = fragments.next().await {
        match next {
            Ok(fragment) => match session.apply_fragment(ticket, &fragment) {
                FragmentOutcome::Applied(progress) => on_progress(session, progress),
                FragmentOutcome::Stale => return Err(ExchangeError::Superseded),
            },
            Err(error) => {
                session.fail(ticket, &error)?;
                return Err(ExchangeError::Transport(error));
            }
        }
    }

    session.finish(ticket)
}

/// Interpret a whole stream outside any session, e.g. for a trivia question.
pub async fn interpret_stream<S>(persona: Persona, mut fragments: S) -> Result<Terminal, TransportError>
where
    S: Stream<Item = Result<String, TransportError>> + Unpin,
{
    let mut interpreter = Interpreter::new(persona);
    while let Some(next) = fragments.next().await {
        interpreter.push(&next?);
    }
    Ok(interpreter.finish())
}

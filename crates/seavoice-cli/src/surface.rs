//! The explorer and text-only chat REPLs.

use std::path::PathBuf;

use eyre::Result;
use seavoice_core::error::CoreError;
use seavoice_core::models::filters::Filters;
use seavoice_core::models::snapshot::{ChatSnapshot, SessionSnapshot};
use seavoice_export::file::write_export;
use seavoice_interpreter::interpreter::{Outcome, Payload, Terminal};
use seavoice_interpreter::session::{ChatSession, RENDER_FAILED_TITLE, TRANSPORT_FAILURE_MESSAGE};
use seavoice_storage::slots::Slot;
use tracing::debug;

use crate::app::{App, Input, ReplyEnd, prompt, stdin_lines};
use crate::commands::{Command, HELP, parse_line};
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Data explorer: filters, visualizations, export.
    Explorer,
    /// Text-only chat.
    Chat,
}

impl Surface {
    fn slot(self) -> Slot {
        match self {
            Surface::Explorer => Slot::Explorer,
            Surface::Chat => Slot::Chat,
        }
    }
}

pub async fn run(app: &mut App, mut session: ChatSession, surface: Surface) -> Result<()> {
    let mut input = stdin_lines();
    println!(
        "Sea Voice ({}, replying in {}). Type /help for commands.",
        session.persona(),
        session.language().display_name()
    );
    if surface == Surface::Explorer {
        println!("{}", render::visualization(session.last_visualization()));
    }

    let mut pending: Option<String> = None;
    loop {
        let line = match pending.take() {
            Some(line) => line,
            None => {
                prompt("> ");
                match input.next_line().await? {
                    Some(line) => line,
                    None => break,
                }
            }
        };

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        if surface == Surface::Chat && command.explorer_only() {
            println!("That command is only available in the explorer.");
            continue;
        }

        match command {
            Command::Utterance(text) => {
                pending = converse(app, &mut session, surface, &text, &mut input).await?;
            }
            Command::Date { start, end } => {
                let result = session.filters_mut().set_date_range(start, end);
                report_filters(&session, result);
            }
            Command::Sensor(sensor) => {
                session.filters_mut().set_sensor_type(sensor);
                report_filters(&session, Ok(()));
            }
            Command::Region(region) => {
                session.filters_mut().set_region(region);
                report_filters(&session, Ok(()));
            }
            Command::Depth { min, max } => {
                let result = session.filters_mut().set_depth_range(min, max);
                report_filters(&session, result);
            }
            Command::Float(id) => {
                session.filters_mut().set_float_id(id.as_deref());
                report_filters(&session, Ok(()));
            }
            Command::Filters => println!("{}", render::filters(session.filters())),
            Command::ResetFilters => {
                session.set_filters(Filters::default())?;
                report_filters(&session, Ok(()));
            }
            Command::Lang(language) => {
                session.set_language(language);
                println!("Replies will be in {}.", language.display_name());
            }
            Command::Save => save(app, &session, surface).await,
            Command::Load => load(app, &mut session, surface).await,
            Command::Clear => {
                app.registry.reset(session.language(), session.persona());
                session.clear();
                println!("Session cleared.");
            }
            Command::ClearVisualization => {
                session.clear_visualization();
                println!("{}", render::visualization(session.last_visualization()));
            }
            Command::Export { format, dir } => {
                let dir = dir.unwrap_or_else(|| PathBuf::from("."));
                match write_export(session.last_visualization(), format, &dir) {
                    Ok(path) => println!("Exported to {}", path.display()),
                    Err(e) => println!("Export failed: {e}"),
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }

    Ok(())
}

/// Send one utterance and stream its reply. Returns a line typed during the
/// stream, which supersedes it and still has to be handled.
async fn converse(
    app: &mut App,
    session: &mut ChatSession,
    surface: Surface,
    text: &str,
    input: &mut Input,
) -> Result<Option<String>> {
    let dispatch = match session.dispatch(text) {
        Ok(dispatch) => dispatch,
        Err(e) => {
            println!("{e}");
            return Ok(None);
        }
    };

    match app.stream_reply(session, &dispatch, input).await? {
        ReplyEnd::Finished(terminal) => {
            if surface == Surface::Explorer {
                show_result(session, &terminal);
            }
            Ok(None)
        }
        ReplyEnd::Failed => {
            println!("{TRANSPORT_FAILURE_MESSAGE}");
            Ok(None)
        }
        ReplyEnd::Interrupted(line) => Ok(Some(line)),
    }
}

fn show_result(session: &ChatSession, terminal: &Terminal) {
    match &terminal.outcome {
        Outcome::Ok(Payload::Visualization(_)) => {
            println!("{}", render::visualization(session.last_visualization()));
        }
        Outcome::ParseFailed(reason) => {
            debug!(%reason, "visualization rejected");
            println!("{RENDER_FAILED_TITLE}");
        }
        Outcome::Ok(Payload::Trivia(_)) | Outcome::NoPayload | Outcome::Pending => {}
    }
}

fn report_filters(session: &ChatSession, result: Result<(), CoreError>) {
    match result {
        Ok(()) => println!("{}", render::filters(session.filters())),
        Err(e) => println!("{e}"),
    }
}

async fn save(app: &App, session: &ChatSession, surface: Surface) {
    let result = match surface {
        Surface::Explorer => app.store.save(surface.slot(), &session.snapshot()).await,
        Surface::Chat => app.store.save(surface.slot(), &session.chat_snapshot()).await,
    };
    match result {
        Ok(()) => println!("Session saved."),
        Err(e) => println!("Could not save session: {e}"),
    }
}

async fn load(app: &App, session: &mut ChatSession, surface: Surface) {
    let result = match surface {
        Surface::Explorer => match app.store.load::<SessionSnapshot>(surface.slot()).await {
            Ok(snapshot) => session.restore(snapshot).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        },
        Surface::Chat => match app.store.load::<ChatSnapshot>(surface.slot()).await {
            Ok(snapshot) => {
                session.restore_chat(snapshot);
                Ok(())
            }
            Err(e) => Err(e.to_string()),
        },
    };

    match result {
        Ok(()) => {
            println!("Session loaded ({} messages).", session.messages().len());
            for message in session.messages() {
                println!("{:?}: {}", message.sender, message.text);
            }
            if surface == Surface::Explorer {
                println!("{}", render::visualization(session.last_visualization()));
            }
        }
        Err(e) => println!("Could not load session: {e}"),
    }
}

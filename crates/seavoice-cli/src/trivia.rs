//! The ten-question ocean trivia game.

use eyre::Result;
use seavoice_bedrock::error::format_err_chain;
use seavoice_core::compose::compose_trivia_request;
use seavoice_core::models::language::Language;
use seavoice_core::models::persona::Persona;
use seavoice_core::models::snapshot::HighScore;
use seavoice_core::models::trivia::{
    Advance, HINT_COST, MAX_QUESTIONS, POINTS_PER_CORRECT_ANSWER, TriviaGame, TriviaQuestion,
};
use seavoice_interpreter::exchange::interpret_stream;
use seavoice_interpreter::interpreter::{Outcome, Payload};
use seavoice_storage::slots::Slot;
use tracing::warn;

use crate::app::{App, prompt, stdin_lines};

const MAX_FETCH_ATTEMPTS: u32 = 3;

/// What the player typed for the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Move {
    Answer(String),
    Hint,
    Quit,
}

pub async fn run(app: &mut App, language: Language) -> Result<()> {
    let mut input = stdin_lines();
    let high_score = app
        .store
        .load_optional::<HighScore>(Slot::TriviaHighScore)
        .await?
        .unwrap_or_default()
        .high_score;

    let mut game = TriviaGame::new(high_score);
    game.start();
    println!(
        "Ocean trivia: {MAX_QUESTIONS} questions, {POINTS_PER_CORRECT_ANSWER} points each. \
         A hint costs {HINT_COST} points. High score: {high_score}."
    );

    loop {
        println!("\nQuestion {}/{MAX_QUESTIONS} (score {})", game.question_number(), game.score());
        let Some(question) = fetch_question(app, language, game.difficulty()).await else {
            println!("Could not get a question right now. Please try again later.");
            return Ok(());
        };
        game.set_question(question.clone())?;
        show_question(&question);

        let answer = loop {
            prompt("answer (1-4, h for hint, q to quit)> ");
            let Some(line) = input.next_line().await? else {
                return Ok(());
            };
            match parse_move(&line, &question) {
                Some(Move::Answer(answer)) => break answer,
                Some(Move::Hint) => match game.use_hint() {
                    Ok(hint) => println!("Hint: {hint} (score {})", game.score()),
                    Err(e) => println!("{e}"),
                },
                Some(Move::Quit) => return Ok(()),
                None => println!("Pick 1-4, h or q."),
            }
        };

        let outcome = game.answer(&answer)?;
        if outcome.correct {
            println!("Correct! +{POINTS_PER_CORRECT_ANSWER}");
        } else {
            println!("Not quite. The answer was: {}", outcome.answer);
        }
        println!("{}", outcome.explanation);

        match game.advance()? {
            Advance::NextQuestion(_) => {}
            Advance::Finished {
                score,
                new_high_score,
            } => {
                println!("\nGame over! Final score: {score}");
                if new_high_score {
                    println!("New high score!");
                    if let Err(e) = app
                        .store
                        .save(Slot::TriviaHighScore, &HighScore { high_score: score })
                        .await
                    {
                        println!("Could not save the high score: {e}");
                    }
                } else {
                    println!("High score: {}", game.high_score());
                }
                return Ok(());
            }
        }
    }
}

/// Ask for a question, retrying a few times on transport or parse failures.
async fn fetch_question(app: &mut App, language: Language, difficulty: u32) -> Option<TriviaQuestion> {
    let request = compose_trivia_request(difficulty);

    for attempt in 1..=MAX_FETCH_ATTEMPTS {
        let conversation = app.registry.conversation(language, Persona::TriviaMaster);
        let fragments = match app.source.open(conversation, &request).await {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!(attempt, error = %format_err_chain(&e), "could not open trivia stream");
                continue;
            }
        };

        let terminal = match interpret_stream(Persona::TriviaMaster, fragments).await {
            Ok(terminal) => terminal,
            Err(error) => {
                warn!(attempt, %error, "trivia stream failed");
                continue;
            }
        };

        match terminal.outcome {
            Outcome::Ok(Payload::Trivia(question)) => {
                app.registry
                    .record(language, Persona::TriviaMaster, &request, &terminal.response);
                return Some(question);
            }
            Outcome::ParseFailed(reason) => warn!(attempt, %reason, "trivia question rejected"),
            other => warn!(attempt, ?other, "no trivia question in reply"),
        }
    }
    None
}

fn show_question(question: &TriviaQuestion) {
    println!("{}", question.question);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {option}", i + 1);
    }
}

fn parse_move(line: &str, question: &TriviaQuestion) -> Option<Move> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "h" | "hint" => return Some(Move::Hint),
        "q" | "quit" => return Some(Move::Quit),
        _ => {}
    }
    if let Ok(n) = line.parse::<usize>() {
        return question
            .options
            .get(n.checked_sub(1)?)
            .map(|o| Move::Answer(o.clone()));
    }
    question
        .options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(line))
        .map(|o| Move::Answer(o.clone()))
}

//! Trivia questions and the rules of the ten-question game.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, PayloadError};

pub const MAX_QUESTIONS: u32 = 10;
pub const POINTS_PER_CORRECT_ANSWER: u32 = 5;
pub const HINT_COST: u32 = 2;
pub const OPTION_COUNT: usize = 4;

/// A multiple-choice question produced by the trivia persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TriviaQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub hint: String,
    pub explanation: String,
}

impl TriviaQuestion {
    /// Decode and validate a parsed JSON object.
    pub fn decode(value: serde_json::Value) -> Result<Self, PayloadError> {
        let question: TriviaQuestion = serde_json::from_value(value).map_err(|e| {
            PayloadError::Shape {
                expected: "trivia question".to_string(),
                detail: e.to_string(),
            }
        })?;
        question.validate()?;
        Ok(question)
    }

    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.question.trim().is_empty() {
            return Err(PayloadError::InvalidTrivia("question is blank".to_string()));
        }
        if self.options.len() != OPTION_COUNT {
            return Err(PayloadError::InvalidTrivia(format!(
                "expected {OPTION_COUNT} options, got {}",
                self.options.len()
            )));
        }
        if !self.options.contains(&self.answer) {
            return Err(PayloadError::InvalidTrivia(format!(
                "answer {:?} is not one of the options",
                self.answer
            )));
        }
        Ok(())
    }
}

// ── Game ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Idle,
    Playing,
    Finished,
}

/// Result of answering the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub answer: String,
    pub explanation: String,
    pub score: u32,
}

/// What happens after a question has been answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Fetch question number `n` (1-based).
    NextQuestion(u32),
    Finished { score: u32, new_high_score: bool },
}

/// Score keeping for one run of the trivia game.
#[derive(Debug, Clone)]
pub struct TriviaGame {
    phase: GamePhase,
    score: u32,
    high_score: u32,
    question_number: u32,
    question: Option<TriviaQuestion>,
    selected: Option<String>,
    hint_used: bool,
}

impl TriviaGame {
    pub fn new(high_score: u32) -> Self {
        Self {
            phase: GamePhase::Idle,
            score: 0,
            high_score,
            question_number: 0,
            question: None,
            selected: None,
            hint_used: false,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn question_number(&self) -> u32 {
        self.question_number
    }

    pub fn question(&self) -> Option<&TriviaQuestion> {
        self.question.as_ref()
    }

    /// Difficulty level sent with the request; rises with each question.
    pub fn difficulty(&self) -> u32 {
        self.question_number.max(1)
    }

    pub fn start(&mut self) {
        self.phase = GamePhase::Playing;
        self.score = 0;
        self.question_number = 1;
        self.question = None;
        self.selected = None;
        self.hint_used = false;
    }

    pub fn set_question(&mut self, question: TriviaQuestion) -> Result<(), CoreError> {
        if self.phase != GamePhase::Playing {
            return Err(CoreError::Game("no game in progress".to_string()));
        }
        self.question = Some(question);
        self.selected = None;
        self.hint_used = false;
        Ok(())
    }

    pub fn can_use_hint(&self) -> bool {
        self.question.is_some()
            && self.selected.is_none()
            && !self.hint_used
            && self.score >= HINT_COST
    }

    /// Spend [`HINT_COST`] points to reveal the hint for the current question.
    pub fn use_hint(&mut self) -> Result<String, CoreError> {
        if !self.can_use_hint() {
            return Err(CoreError::Game(format!(
                "a hint needs an unanswered question, no hint used yet, and at least {HINT_COST} points"
            )));
        }
        let hint = match &self.question {
            Some(q) => q.hint.clone(),
            None => return Err(CoreError::Game("no question loaded".to_string())),
        };
        self.score -= HINT_COST;
        self.hint_used = true;
        Ok(hint)
    }

    pub fn answer(&mut self, option: &str) -> Result<AnswerOutcome, CoreError> {
        if self.selected.is_some() {
            return Err(CoreError::Game("question already answered".to_string()));
        }
        let question = self
            .question
            .as_ref()
            .ok_or_else(|| CoreError::Game("no question loaded".to_string()))?;
        if !question.options.iter().any(|o| o == option) {
            return Err(CoreError::Game(format!("{option:?} is not one of the options")));
        }

        let correct = option == question.answer;
        let outcome_answer = question.answer.clone();
        let explanation = question.explanation.clone();
        if correct {
            self.score += POINTS_PER_CORRECT_ANSWER;
        }
        self.selected = Some(option.to_string());

        Ok(AnswerOutcome {
            correct,
            answer: outcome_answer,
            explanation,
            score: self.score,
        })
    }

    /// Move on once the current question has been answered.
    pub fn advance(&mut self) -> Result<Advance, CoreError> {
        if self.phase != GamePhase::Playing || self.selected.is_none() {
            return Err(CoreError::Game("answer the current question first".to_string()));
        }

        if self.question_number < MAX_QUESTIONS {
            self.question_number += 1;
            self.question = None;
            self.selected = None;
            self.hint_used = false;
            return Ok(Advance::NextQuestion(self.question_number));
        }

        let new_high_score = self.score > self.high_score;
        if new_high_score {
            self.high_score = self.score;
        }
        self.phase = GamePhase::Finished;
        Ok(Advance::Finished {
            score: self.score,
            new_high_score,
        })
    }
}

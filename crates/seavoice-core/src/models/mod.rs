pub mod filters;
pub mod language;
pub mod message;
pub mod persona;
pub mod snapshot;
pub mod trivia;
pub mod visualization;

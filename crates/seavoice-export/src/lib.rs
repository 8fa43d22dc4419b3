//! seavoice-export
//!
//! Tabular CSV and JSON export of the current visualization.

pub mod csv;
pub mod error;
pub mod file;
pub mod flatten;

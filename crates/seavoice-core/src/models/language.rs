use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Response language, negotiated per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
    De,
    Hi,
    Ja,
    Zh,
    Ru,
    Pt,
    Ar,
    It,
}

impl Language {
    pub const ALL: [Language; 11] = [
        Language::En,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::Hi,
        Language::Ja,
        Language::Zh,
        Language::Ru,
        Language::Pt,
        Language::Ar,
        Language::It,
    ];

    /// ISO 639-1 code.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Hi => "hi",
            Language::Ja => "ja",
            Language::Zh => "zh",
            Language::Ru => "ru",
            Language::Pt => "pt",
            Language::Ar => "ar",
            Language::It => "it",
        }
    }

    /// English name used when instructing the model.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Spanish",
            Language::Fr => "French",
            Language::De => "German",
            Language::Hi => "Hindi",
            Language::Ja => "Japanese",
            Language::Zh => "Mandarin Chinese (Simplified)",
            Language::Ru => "Russian",
            Language::Pt => "Portuguese",
            Language::Ar => "Arabic",
            Language::It => "Italian",
        }
    }

    /// Resolve a code, falling back to English for anything unknown.
    pub fn from_code_or_default(code: &str) -> Self {
        code.parse().unwrap_or_default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|l| l.code() == code)
            .ok_or_else(|| CoreError::UnknownValue {
                kind: "language",
                value: s.to_string(),
            })
    }
}

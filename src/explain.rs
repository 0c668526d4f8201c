//! Explanations of extracted text

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplainError {
    #[error("no text to explain, extract some text first")]
    EmptyText,

    #[error("unknown model: {0}")]
    UnknownModel(String),
}

/// Explanation backends the user can pick from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    OpenAi,
    Anthropic,
    Gemini,
    #[default]
    Local,
}

impl Model {
    pub const ALL: [Model; 4] = [Model::OpenAi, Model::Anthropic, Model::Gemini, Model::Local];

    pub fn id(&self) -> &'static str {
        match self {
            Model::OpenAi => "openai",
            Model::Anthropic => "anthropic",
            Model::Gemini => "gemini",
            Model::Local => "local",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::OpenAi => write!(f, "OpenAI"),
            Model::Anthropic => write!(f, "Anthropic"),
            Model::Gemini => write!(f, "Google Gemini"),
            Model::Local => write!(f, "Local Model"),
        }
    }
}

impl FromStr for Model {
    type Err = ExplainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|m| m.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| ExplainError::UnknownModel(s.to_string()))
    }
}

pub trait Explainer {
    fn explain(&self, text: &str, model: Model) -> Result<String, ExplainError>;
}

/// What kind of content a piece of text looks like
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextKind {
    Contact,
    Dated,
    Financial,
    General,
}

impl fmt::Display for TextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextKind::Contact => write!(f, "an email or contact information"),
            TextKind::Dated => write!(f, "a document with dates"),
            TextKind::Financial => write!(f, "financial information"),
            TextKind::General => write!(f, "general text content"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Low => write!(f, "low"),
            Complexity::Medium => write!(f, "medium"),
            Complexity::High => write!(f, "high"),
        }
    }
}

/// True if `text` contains a `YYYY-MM-DD` shaped date
fn contains_iso_date(text: &str) -> bool {
    const PATTERN: &[u8] = b"dddd-dd-dd";
    text.as_bytes().windows(PATTERN.len()).any(|w| {
        w.iter().zip(PATTERN).all(|(&c, &p)| match p {
            b'd' => c.is_ascii_digit(),
            _ => c == p,
        })
    })
}

pub fn classify(text: &str) -> TextKind {
    if text.contains('@') && text.contains('.') {
        TextKind::Contact
    } else if contains_iso_date(text) {
        TextKind::Dated
    } else if text.contains(&['$', '€', '£'][..]) {
        TextKind::Financial
    } else {
        TextKind::General
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn complexity(text: &str) -> Complexity {
    let words = word_count(text);
    if words == 0 {
        return Complexity::Low;
    }
    let letters = text.chars().filter(|c| !c.is_whitespace()).count();
    let avg_word_length = letters as f32 / words as f32;

    if avg_word_length > 6.0 && words > 100 {
        Complexity::High
    } else if avg_word_length > 4.0 && words > 50 {
        Complexity::Medium
    } else {
        Complexity::Low
    }
}

/// Offline explainer built from simple text statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicExplainer;

impl Explainer for HeuristicExplainer {
    fn explain(&self, text: &str, model: Model) -> Result<String, ExplainError> {
        if text.trim().is_empty() {
            return Err(ExplainError::EmptyText);
        }

        Ok(format!(
            "This text appears to be {}. The content discusses various topics and contains \
             approximately {} words. {} model analysis suggests this is {} complexity level.",
            classify(text),
            word_count(text),
            model.id(),
            complexity(text)
        ))
    }
}

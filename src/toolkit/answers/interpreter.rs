//! Turns question-keyed answer texts into the short tokens the resolver
//! matches against the concept hierarchy.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, warn};

use crate::toolkit::body_parts::{BodyPart, BodyPartTable};

const SYMPTOMS_KEY: &str = "SYMPTOMS";
const WHEN_STARTED_KEY: &str = "WHEN_STARTED";
const PROBLEM_BODY_PART_PREFIX: &str = "PROBLEM_BODY_PART_";

lazy_static! {
    static ref CONJUNCTION_SPLIT: Regex =
        Regex::new(r"(?i)\s*(?:,|\b(?:for|and|nor|but|or|yet|so)\b)\s*").unwrap();
}


#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnswerError {
    #[error("Unknown question key '{0}'")]
    UnknownKey(String),
}


/// The question an answer responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuestionKey {
    Symptoms,
    WhenStarted,
    ProblemBodyPart(u32),
}

impl FromStr for QuestionKey {
    type Err = AnswerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            SYMPTOMS_KEY => Ok(Self::Symptoms),
            WHEN_STARTED_KEY => Ok(Self::WhenStarted),
            _ => s
                .strip_prefix(PROBLEM_BODY_PART_PREFIX)
                .and_then(|id| id.parse().ok())
                .map(Self::ProblemBodyPart)
                .ok_or_else(|| AnswerError::UnknownKey(s.to_string())),
        }
    }
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symptoms => f.write_str(SYMPTOMS_KEY),
            Self::WhenStarted => f.write_str(WHEN_STARTED_KEY),
            Self::ProblemBodyPart(id) => write!(f, "{PROBLEM_BODY_PART_PREFIX}{id}"),
        }
    }
}

impl Serialize for QuestionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QuestionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}


pub type Answers = BTreeMap<QuestionKey, String>;


/// Word filtering and stemming applied to answer text before splitting.
pub trait TextPreprocessor: Send + Sync {
    fn preprocess(&self, text: &str) -> String;
}


#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughPreprocessor;

impl TextPreprocessor for PassthroughPreprocessor {
    fn preprocess(&self, text: &str) -> String {
        text.to_string()
    }
}


#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnswerTokens {
    pub symptoms: Vec<String>,
    pub body_parts: Vec<(BodyPart, Vec<String>)>,
}

impl AnswerTokens {
    pub fn token_count(&self) -> usize {
        self.symptoms.len() + self.body_parts.iter().map(|(_, t)| t.len()).sum::<usize>()
    }
}


pub struct AnswerInterpreter<P: TextPreprocessor = PassthroughPreprocessor> {
    preprocessor: P,
}

impl Default for AnswerInterpreter {
    fn default() -> Self {
        Self::new(PassthroughPreprocessor)
    }
}

impl<P: TextPreprocessor> AnswerInterpreter<P> {
    pub fn new(preprocessor: P) -> Self {
        Self { preprocessor }
    }


    /// Preprocesses `text` and splits it on commas and coordinating
    /// conjunctions. Empty pieces are dropped.
    pub fn tokens_for_text(&self, text: &str) -> Vec<String> {
        let processed = self.preprocessor.preprocess(text);
        split_on_conjunctions(&processed)
    }


    /// Symptom tokens come from the `SYMPTOMS` answer. Each body-part answer
    /// gets the part's first name appended before splitting; answers about
    /// body parts missing from `table` are skipped.
    pub fn tokens_for_answers(&self, answers: &Answers, table: &BodyPartTable) -> AnswerTokens {
        let mut tokens = AnswerTokens::default();

        for (key, text) in answers {
            match key {
                QuestionKey::Symptoms => tokens.symptoms = self.tokens_for_text(text),
                QuestionKey::WhenStarted => {}
                QuestionKey::ProblemBodyPart(id) => {
                    let Some(body_part) = table.get(*id) else {
                        warn!("Answer refers to unknown body part {}", id);
                        continue;
                    };
                    let text = match body_part.primary_name() {
                        Some(name) => format!("{text} {name}"),
                        None => text.clone(),
                    };
                    tokens
                        .body_parts
                        .push((body_part.clone(), self.tokens_for_text(&text)));
                }
            }
        }

        debug!("Interpreted answers into {} tokens", tokens.token_count());
        tokens
    }
}


pub fn split_on_conjunctions(text: &str) -> Vec<String> {
    CONJUNCTION_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

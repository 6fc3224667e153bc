// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A question in the bank. The id is assigned once and survives edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,

    pub prompt: String,

    /// Ordered list of at least two non-empty options.
    pub options: Vec<String>,

    /// Sorted, de-duplicated indices into `options`; never empty, every
    /// index in range. More than one entry makes this a multi-select.
    pub correct_answers: Vec<usize>,

    pub category: String,
}

impl Question {
    pub fn is_multi_select(&self) -> bool {
        self.correct_answers.len() > 1
    }
}

/// DTO for sending a question to quiz takers (excludes the answer key).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub category: String,
    /// Tells the client to render checkboxes instead of radio buttons.
    pub multi_select: bool,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            prompt: q.prompt.clone(),
            options: q.options.clone(),
            category: q.category.clone(),
            multi_select: q.is_multi_select(),
        }
    }
}

/// DTO for creating a question, and for full-replace edits (the id is
/// taken from the path and preserved).
#[derive(Debug, Deserialize, Validate)]
pub struct QuestionPayload {
    #[validate(length(min = 1, max = 1000))]
    pub prompt: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    pub correct_answers: Vec<usize>,
    pub category: Option<String>,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.len() < 2 {
        return Err(validator::ValidationError::new("at_least_two_options"));
    }
    for opt in options {
        if opt.trim().is_empty() {
            return Err(validator::ValidationError::new("empty_option"));
        }
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(options: Vec<&str>) -> QuestionPayload {
        QuestionPayload {
            prompt: "Pick one".to_string(),
            options: options.into_iter().map(String::from).collect(),
            correct_answers: vec![0],
            category: None,
        }
    }

    #[test]
    fn two_nonempty_options_pass() {
        assert!(payload(vec!["a", "b"]).validate().is_ok());
    }

    #[test]
    fn single_option_fails() {
        assert!(payload(vec!["a"]).validate().is_err());
    }

    #[test]
    fn blank_option_fails() {
        assert!(payload(vec!["a", "   "]).validate().is_err());
    }
}

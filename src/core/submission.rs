use serde::Deserialize;
use serde_json::Value;

pub const MAX_NAME_CHARS: usize = 32;
pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 1_000_000;

/// Reason a submission was refused. A refused submission never touches the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be at most 32 characters")]
    NameTooLong,
    #[error("score must be an integer")]
    NonIntegerScore,
    #[error("score must be between 0 and 1000000")]
    ScoreOutOfRange,
}

/// Body of `POST /api/scores`.
///
/// Both fields are loosely typed so that a missing name or a non-integer score
/// surfaces as a [`ValidationError`] instead of a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct ScoreSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: Value,
}

impl ScoreSubmission {
    pub fn score(&self) -> Result<i64, ValidationError> {
        match &self.score {
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(score), _) => Ok(score),
                // Integers above i64::MAX are still integers, just out of range.
                (None, Some(_)) => Err(ValidationError::ScoreOutOfRange),
                (None, None) => Err(ValidationError::NonIntegerScore),
            },
            _ => Err(ValidationError::NonIntegerScore),
        }
    }
}

pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    match name.chars().count() {
        0 => Err(ValidationError::EmptyName),
        n if n > MAX_NAME_CHARS => Err(ValidationError::NameTooLong),
        _ => Ok(name.to_string()),
    }
}

pub fn validate_score(score: i64) -> Result<u32, ValidationError> {
    match score {
        MIN_SCORE..=MAX_SCORE => u32::try_from(score).map_err(|_| ValidationError::ScoreOutOfRange),
        _ => Err(ValidationError::ScoreOutOfRange),
    }
}

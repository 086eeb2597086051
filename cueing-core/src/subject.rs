use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Identity of the single subject taking the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    participant: String,
    condition: String,
}

impl Subject {
    /// Validates form input. The participant name is trimmed and must be
    /// non-empty ASCII letters; the condition (wake status) must be chosen.
    pub fn new(participant: &str, condition: Option<&str>) -> Result<Self, CoreError> {
        let participant = participant.trim();
        let condition = condition.map(str::trim).filter(|c| !c.is_empty());

        let condition = match (participant.is_empty(), condition) {
            (true, _) => return Err(CoreError::MissingParticipant),
            (false, None) => return Err(CoreError::MissingCondition),
            (false, Some(condition)) => condition,
        };

        if !participant.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::NonAlphabeticParticipant(participant.to_string()));
        }

        Ok(Self {
            participant: participant.to_string(),
            condition: condition.to_string(),
        })
    }

    pub fn participant(&self) -> &str {
        &self.participant
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }
}

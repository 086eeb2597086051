use crate::glyph::Rotation;
use serde::{Deserialize, Serialize};

/// Direction reported by the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrialOutcome {
    Correct,
    Incorrect,
}

impl TrialOutcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, TrialOutcome::Correct)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrialOutcome::Correct => "Correct",
            TrialOutcome::Incorrect => "Incorrect",
        }
    }
}

/// A target rotated 270° points left, one rotated 90° points right.
pub fn score(target_rotation: Rotation, response: ResponseDirection) -> TrialOutcome {
    match (response, target_rotation) {
        (ResponseDirection::Left, Rotation::Deg270) | (ResponseDirection::Right, Rotation::Deg90) => {
            TrialOutcome::Correct
        }
        _ => TrialOutcome::Incorrect,
    }
}

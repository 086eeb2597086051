use crate::error::CoreError;
use crate::layout::{LayoutId, LayoutType};
use serde::{Deserialize, Serialize};

/// Which glyph is drawn at a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    /// The rotated "T" whose orientation encodes the correct answer.
    #[serde(rename = "T")]
    Target,
    /// An "L" with no task-relevant signal.
    #[serde(rename = "L")]
    Distractor,
}

impl Letter {
    pub fn as_char(&self) -> char {
        match self {
            Letter::Target => 'T',
            Letter::Distractor => 'L',
        }
    }

    /// Rotations a glyph of this kind may take.
    pub fn rotations(&self) -> &'static [Rotation] {
        match self {
            Letter::Target => &Rotation::TARGET,
            Letter::Distractor => &Rotation::DISTRACTOR,
        }
    }
}

impl std::fmt::Display for Letter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Clockwise rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const TARGET: [Rotation; 2] = [Rotation::Deg90, Rotation::Deg270];
    pub const DISTRACTOR: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl TryFrom<u16> for Rotation {
    type Error = CoreError;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(CoreError::InvalidRotation(other)),
        }
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

/// A point in the presentation area, in percent of its shorter side.
/// The origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub top: f64,
    pub left: f64,
}

impl Position {
    pub fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }

    /// True when both axis distances are below `buffer`.
    pub fn collides_with(&self, other: &Position, buffer: f64) -> bool {
        (self.top - other.top).abs() < buffer && (self.left - other.left).abs() < buffer
    }
}

/// One glyph of a layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphPlacement {
    pub letter: Letter,
    pub rotation: Rotation,
    #[serde(flatten)]
    pub position: Position,
    pub layout_type: LayoutType,
    pub layout_id: LayoutId,
}

impl GlyphPlacement {
    pub fn is_target(&self) -> bool {
        self.letter == Letter::Target
    }
}

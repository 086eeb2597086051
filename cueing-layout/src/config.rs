use crate::error::LayoutError;
use crate::sampler::{Sample, sample, sample_with};
use crate::zone::{Quadrant, Zone};
use cueing_core::Position;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Where glyphs may be placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZonePolicy {
    /// Each glyph lands in a uniformly chosen screen quadrant, kept
    /// `edge_inset` away from the quadrant's edges.
    Quadrant { edge_inset: f64, buffer: f64 },
    /// Glyphs land anywhere in the central `[min, max]` band but keep clear
    /// of the 50% crosshair lines.
    Band {
        min: f64,
        max: f64,
        target_crosshair_clearance: f64,
        distractor_crosshair_clearance: f64,
        spacing: f64,
    },
}

impl Default for ZonePolicy {
    fn default() -> Self {
        ZonePolicy::Quadrant {
            edge_inset: 6.25,
            buffer: 6.25,
        }
    }
}

impl ZonePolicy {
    pub fn band() -> Self {
        ZonePolicy::Band {
            min: 10.0,
            max: 90.0,
            target_crosshair_clearance: 15.0,
            distractor_crosshair_clearance: 10.0,
            spacing: 10.0,
        }
    }

    /// Minimum per-axis separation between glyphs.
    pub fn buffer(&self) -> f64 {
        match self {
            ZonePolicy::Quadrant { buffer, .. } => *buffer,
            ZonePolicy::Band { spacing, .. } => *spacing,
        }
    }

    pub fn sample_target<R: Rng + ?Sized>(&self, rng: &mut R, max_attempts: usize) -> Sample {
        match self {
            ZonePolicy::Quadrant { edge_inset, .. } => {
                let zone = Quadrant::random(rng).zone().inset(*edge_inset);
                sample(rng, &zone, &[], 0.0, max_attempts)
            }
            ZonePolicy::Band {
                min,
                max,
                target_crosshair_clearance,
                ..
            } => {
                let zone = Zone::band(*min, *max);
                sample_with(rng, &zone, max_attempts, |p| {
                    near_crosshair(p, *target_crosshair_clearance)
                })
            }
        }
    }

    /// Samples a distractor position away from everything in `placed`.
    pub fn sample_distractor<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        placed: &[Position],
        max_attempts: usize,
    ) -> Sample {
        match self {
            ZonePolicy::Quadrant { edge_inset, buffer } => {
                let zone = Quadrant::random(rng).zone().inset(*edge_inset);
                sample(rng, &zone, placed, *buffer, max_attempts)
            }
            ZonePolicy::Band {
                min,
                max,
                distractor_crosshair_clearance,
                spacing,
                ..
            } => {
                let zone = Zone::band(*min, *max);
                sample_with(rng, &zone, max_attempts, |p| {
                    near_crosshair(p, *distractor_crosshair_clearance)
                        || placed.iter().any(|q| p.collides_with(q, *spacing))
                })
            }
        }
    }

    fn validate(&self) -> Result<(), LayoutError> {
        let zones: Vec<Zone> = match self {
            ZonePolicy::Quadrant { edge_inset, .. } => Quadrant::ALL
                .iter()
                .map(|q| q.zone().inset(*edge_inset))
                .collect(),
            ZonePolicy::Band { min, max, .. } => vec![Zone::band(*min, *max)],
        };
        match zones.into_iter().find(Zone::is_empty) {
            Some(z) => Err(LayoutError::EmptyZone {
                top_min: z.top_min,
                top_max: z.top_max,
                left_min: z.left_min,
                left_max: z.left_max,
            }),
            None => Ok(()),
        }
    }
}

fn near_crosshair(p: &Position, clearance: f64) -> bool {
    (p.top - 50.0).abs() < clearance || (p.left - 50.0).abs() < clearance
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub distractor_count: usize,
    pub max_attempts: usize,
    pub policy: ZonePolicy,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            distractor_count: 11,
            max_attempts: 100,
            policy: ZonePolicy::default(),
        }
    }
}

impl GeometryConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.max_attempts == 0 {
            return Err(LayoutError::NoAttempts);
        }
        self.policy.validate()
    }
}

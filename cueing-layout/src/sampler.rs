use crate::zone::Zone;
use cueing_core::Position;
use rand::Rng;

/// Result of one rejection-sampling run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    /// A draw passed every constraint.
    Placed(Position),
    /// Every attempt was rejected; the zone center is used instead and may
    /// collide with existing glyphs.
    Fallback(Position),
}

impl Sample {
    pub fn position(&self) -> Position {
        match self {
            Sample::Placed(p) | Sample::Fallback(p) => *p,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Sample::Fallback(_))
    }
}

/// Draws uniform points in `zone` until one is at least `buffer` away (on
/// either axis) from every point in `exclusions`.
pub fn sample<R: Rng + ?Sized>(
    rng: &mut R,
    zone: &Zone,
    exclusions: &[Position],
    buffer: f64,
    max_attempts: usize,
) -> Sample {
    sample_with(rng, zone, max_attempts, |candidate| {
        exclusions.iter().any(|p| candidate.collides_with(p, buffer))
    })
}

/// Rejection sampling with an arbitrary `reject` predicate.
pub fn sample_with<R, F>(rng: &mut R, zone: &Zone, max_attempts: usize, reject: F) -> Sample
where
    R: Rng + ?Sized,
    F: Fn(&Position) -> bool,
{
    if !zone.is_empty() {
        for _ in 0..max_attempts {
            let candidate = zone.uniform_point(rng);
            if !reject(&candidate) {
                return Sample::Placed(candidate);
            }
        }
    }
    Sample::Fallback(zone.center())
}

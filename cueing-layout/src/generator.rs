use crate::config::GeometryConfig;
use crate::error::LayoutError;
use crate::sampler::Sample;
use cueing_core::{GlyphPlacement, Layout, LayoutId, LayoutType, Letter, Position, Rotation};
use rand::Rng;
use tracing::debug;

/// Builds single layouts: one target plus a fixed number of distractors.
#[derive(Debug, Clone)]
pub struct LayoutGenerator {
    config: GeometryConfig,
    fallbacks: usize,
}

impl LayoutGenerator {
    pub fn new(config: GeometryConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self {
            config,
            fallbacks: 0,
        })
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    /// Number of placements that used the zone-center fallback so far.
    pub fn fallback_count(&self) -> usize {
        self.fallbacks
    }

    pub fn build_layout<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        layout_type: LayoutType,
        layout_id: LayoutId,
    ) -> Layout {
        let target = self.place_target(rng, layout_type, layout_id);
        self.surround(rng, target)
    }

    /// Target glyph with a fresh position and a rotation of 90° or 270°.
    pub fn place_target<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        layout_type: LayoutType,
        layout_id: LayoutId,
    ) -> GlyphPlacement {
        let sample = self.config.policy.sample_target(rng, self.config.max_attempts);
        let position = self.accept(sample, &layout_id);
        GlyphPlacement {
            letter: Letter::Target,
            rotation: random_rotation(rng, Letter::Target),
            position,
            layout_type,
            layout_id,
        }
    }

    /// Places the distractors around an existing target, each one kept clear
    /// of the target and of every distractor placed before it.
    pub fn surround<R: Rng + ?Sized>(&mut self, rng: &mut R, target: GlyphPlacement) -> Layout {
        let mut placed: Vec<Position> = Vec::with_capacity(self.config.distractor_count + 1);
        placed.push(target.position);

        let mut distractors = Vec::with_capacity(self.config.distractor_count);
        for _ in 0..self.config.distractor_count {
            let sample =
                self.config
                    .policy
                    .sample_distractor(rng, &placed, self.config.max_attempts);
            let position = self.accept(sample, &target.layout_id);
            placed.push(position);
            distractors.push(GlyphPlacement {
                letter: Letter::Distractor,
                rotation: random_rotation(rng, Letter::Distractor),
                position,
                layout_type: target.layout_type,
                layout_id: target.layout_id.clone(),
            });
        }

        Layout::new(target.layout_id.clone(), target, distractors)
    }

    fn accept(&mut self, sample: Sample, layout_id: &LayoutId) -> Position {
        if let Sample::Fallback(p) = sample {
            self.fallbacks += 1;
            debug!(layout = %layout_id, top = p.top, left = p.left, "placement fell back to zone center");
        }
        sample.position()
    }
}

fn random_rotation<R: Rng + ?Sized>(rng: &mut R, letter: Letter) -> Rotation {
    let choices = letter.rotations();
    choices[rng.random_range(0..choices.len())]
}

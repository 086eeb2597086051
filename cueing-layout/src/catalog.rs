use crate::error::LayoutError;
use crate::generator::LayoutGenerator;
use crate::sequence::{Block, TrialSequence};
use cueing_core::{GlyphPlacement, Layout, LayoutId, LayoutType};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

pub const REPEATED_CATEGORIES: usize = 10;
pub const RANDOM_CATEGORIES: usize = 10;

/// Fixed target of a random category. Distractors are generated around it
/// anew for every block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomAnchor {
    pub layout_id: LayoutId,
    pub target: GlyphPlacement,
}

/// The per-session category catalog.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    /// Complete layouts `"1".."10"`, shared by every block.
    pub repeated: Vec<Arc<Layout>>,
    /// Target anchors `"A".."J"`.
    pub random: Vec<RandomAnchor>,
}

impl Catalog {
    pub fn category_count(&self) -> usize {
        self.repeated.len() + self.random.len()
    }
}

/// Owns the generator while the session corpus is being built.
pub struct LayoutSetBuilder {
    generator: LayoutGenerator,
    repeated_categories: usize,
    random_categories: usize,
}

impl LayoutSetBuilder {
    pub fn new(generator: LayoutGenerator) -> Self {
        Self {
            generator,
            repeated_categories: REPEATED_CATEGORIES,
            random_categories: RANDOM_CATEGORIES,
        }
    }

    pub fn with_categories(
        generator: LayoutGenerator,
        repeated: usize,
        random: usize,
    ) -> Result<Self, LayoutError> {
        if random > 26 {
            return Err(LayoutError::TooManyRandomCategories(random));
        }
        Ok(Self {
            generator,
            repeated_categories: repeated,
            random_categories: random,
        })
    }

    pub fn generator(&self) -> &LayoutGenerator {
        &self.generator
    }

    pub fn build_catalog<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Catalog {
        let repeated = (1..=self.repeated_categories)
            .map(|n| {
                Arc::new(
                    self.generator
                        .build_layout(rng, LayoutType::Repeated, LayoutId::repeated(n)),
                )
            })
            .collect();

        let random = (0..self.random_categories)
            .map(|i| {
                let layout_id = LayoutId::random(i);
                let target = self
                    .generator
                    .place_target(rng, LayoutType::Random, layout_id.clone());
                RandomAnchor { layout_id, target }
            })
            .collect();

        let catalog = Catalog { repeated, random };
        info!(
            repeated = catalog.repeated.len(),
            random = catalog.random.len(),
            fallbacks = self.generator.fallback_count(),
            "layout catalog built"
        );
        catalog
    }

    /// Expands the catalog into `block_count` blocks. Each block holds every
    /// repeated layout by reference plus a fresh materialization of every
    /// random anchor, shuffled; blocks keep their order.
    pub fn build_trial_sequence<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        catalog: &Catalog,
        block_count: usize,
        layouts_per_block: usize,
    ) -> Result<TrialSequence, LayoutError> {
        if layouts_per_block != catalog.category_count() {
            return Err(LayoutError::BlockSizeMismatch {
                expected: catalog.category_count(),
                requested: layouts_per_block,
            });
        }

        let mut blocks = Vec::with_capacity(block_count);
        for number in 1..=block_count {
            let mut layouts: Vec<Arc<Layout>> = Vec::with_capacity(layouts_per_block);
            for anchor in &catalog.random {
                layouts.push(Arc::new(self.generator.surround(rng, anchor.target.clone())));
            }
            layouts.extend(catalog.repeated.iter().cloned());
            layouts.shuffle(rng);

            debug!(
                block = number,
                order = ?layouts.iter().map(|l| l.layout_id().as_str()).collect::<Vec<_>>(),
                "block shuffled"
            );
            blocks.push(Block { number, layouts });
        }

        let sequence = TrialSequence::new(blocks, layouts_per_block);
        info!(
            blocks = block_count,
            trials = sequence.len(),
            "trial sequence built"
        );
        Ok(sequence)
    }

    /// Independent practice layouts `"Practice-1".."Practice-n"`, in
    /// generation order.
    pub fn build_practice<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) -> Vec<Arc<Layout>> {
        (1..=count)
            .map(|n| {
                Arc::new(
                    self.generator
                        .build_layout(rng, LayoutType::Practice, LayoutId::practice(n)),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeometryConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn builder() -> LayoutSetBuilder {
        LayoutSetBuilder::new(LayoutGenerator::new(GeometryConfig::default()).unwrap())
    }

    #[test]
    fn catalog_ids() {
        let mut rng = StdRng::seed_from_u64(10);
        let catalog = builder().build_catalog(&mut rng);

        let repeated: Vec<_> = catalog
            .repeated
            .iter()
            .map(|l| l.layout_id().to_string())
            .collect();
        let random: Vec<_> = catalog
            .random
            .iter()
            .map(|a| a.layout_id.to_string())
            .collect();
        assert_eq!(repeated, ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]);
        assert_eq!(random, ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"]);
        assert!(catalog.random.iter().all(|a| a.target.is_target()));
    }

    #[test]
    fn block_size_must_match_catalog() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut b = builder();
        let catalog = b.build_catalog(&mut rng);
        let err = b
            .build_trial_sequence(&mut rng, &catalog, 18, 19)
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::BlockSizeMismatch {
                expected: 20,
                requested: 19
            }
        );
    }

    #[test]
    fn repeated_layouts_are_shared_not_copied() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut b = builder();
        let catalog = b.build_catalog(&mut rng);
        let sequence = b.build_trial_sequence(&mut rng, &catalog, 3, 20).unwrap();

        for block in sequence.blocks() {
            let five = block
                .layouts
                .iter()
                .find(|l| l.layout_id().as_str() == "5")
                .unwrap();
            assert!(Arc::ptr_eq(five, &catalog.repeated[4]));
        }
    }

    #[test]
    fn practice_layouts_in_generation_order() {
        let mut rng = StdRng::seed_from_u64(14);
        let practice = builder().build_practice(&mut rng, 10);
        assert_eq!(practice.len(), 10);
        for (i, layout) in practice.iter().enumerate() {
            assert_eq!(layout.layout_id().to_string(), format!("Practice-{}", i + 1));
            assert_eq!(layout.layout_type(), LayoutType::Practice);
        }
    }

    #[test]
    fn rejects_more_random_categories_than_letters() {
        let g = LayoutGenerator::new(GeometryConfig::default()).unwrap();
        assert!(matches!(
            LayoutSetBuilder::with_categories(g, 10, 27),
            Err(LayoutError::TooManyRandomCategories(27))
        ));
    }
}

use std::collections::BTreeSet;

use cueing_core::{Layout, LayoutType, Letter, Position, Rotation};
use cueing_layout::{
    Catalog, GeometryConfig, LayoutGenerator, LayoutSetBuilder, TrialSequence, ZonePolicy,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn build(seed: u64, policy: ZonePolicy) -> (LayoutSetBuilder, Catalog, TrialSequence) {
    let mut rng = StdRng::seed_from_u64(seed);
    let generator = LayoutGenerator::new(GeometryConfig {
        policy,
        ..GeometryConfig::default()
    })
    .unwrap();
    let mut builder = LayoutSetBuilder::new(generator);
    let catalog = builder.build_catalog(&mut rng);
    let sequence = builder
        .build_trial_sequence(&mut rng, &catalog, 18, 20)
        .unwrap();
    (builder, catalog, sequence)
}

fn assert_well_formed(layout: &Layout) {
    let targets: Vec<_> = layout
        .items()
        .iter()
        .filter(|i| i.letter == Letter::Target)
        .collect();
    assert_eq!(targets.len(), 1, "layout {}", layout.layout_id());
    assert_eq!(layout.distractors().len(), 11);
    assert!(Rotation::TARGET.contains(&targets[0].rotation));
    for d in layout.distractors() {
        assert!(Rotation::DISTRACTOR.contains(&d.rotation));
    }
    for item in layout.items() {
        assert!((0.0..=100.0).contains(&item.position.top));
        assert!((0.0..=100.0).contains(&item.position.left));
    }
}

#[test]
fn every_generated_layout_is_well_formed() {
    for policy in [ZonePolicy::default(), ZonePolicy::band()] {
        let (_, _, sequence) = build(1, policy);
        for (_, _, layout) in sequence.iter() {
            assert_well_formed(layout);
        }
    }
}

/// Builds `count` layouts under `policy`, keeping those placed without a
/// fallback.
fn clean_layouts(seed: u64, policy: ZonePolicy, count: usize) -> Vec<Layout> {
    let mut rng = StdRng::seed_from_u64(seed);
    let config = GeometryConfig {
        policy,
        ..GeometryConfig::default()
    };
    let mut clean = Vec::new();

    for _ in 0..count {
        let mut generator = LayoutGenerator::new(config.clone()).unwrap();
        let layout = generator.build_layout(&mut rng, LayoutType::Repeated, "1".into());
        if generator.fallback_count() == 0 {
            clean.push(layout);
        }
    }
    assert!(
        clean.len() > count / 2,
        "too many fallbacks: only {} clean layouts",
        clean.len()
    );
    clean
}

#[test]
fn glyphs_keep_their_distance_unless_sampling_fell_back() {
    for (seed, policy) in [(2, ZonePolicy::default()), (99, ZonePolicy::band())] {
        let buffer = policy.buffer();
        for layout in clean_layouts(seed, policy, 200) {
            let items = layout.items();
            for (i, a) in items.iter().enumerate() {
                for b in &items[i + 1..] {
                    assert!(
                        !a.position.collides_with(&b.position, buffer),
                        "{:?} and {:?} overlap",
                        a.position,
                        b.position
                    );
                }
            }
        }
    }
}

#[test]
fn band_layouts_stay_clear_of_the_crosshair() {
    let off_axis = |p: &Position, clearance: f64| {
        (p.top - 50.0).abs() >= clearance && (p.left - 50.0).abs() >= clearance
    };

    for layout in clean_layouts(99, ZonePolicy::band(), 300) {
        let target = &layout.target().position;
        assert!(off_axis(target, 15.0), "target at {target:?}");
        for d in layout.distractors() {
            assert!(off_axis(&d.position, 10.0), "distractor at {:?}", d.position);
        }
    }
}

#[test]
fn repeated_layout_is_identical_in_every_block() {
    let (_, _, sequence) = build(3, ZonePolicy::default());
    let occurrences: Vec<&Layout> = sequence
        .iter()
        .filter(|(_, _, l)| l.layout_id().as_str() == "5")
        .map(|(_, _, l)| l.as_ref())
        .collect();

    assert_eq!(occurrences.len(), 18);
    for layout in &occurrences[1..] {
        assert_eq!(layout.items(), occurrences[0].items());
    }
}

#[test]
fn random_layout_keeps_target_but_moves_distractors() {
    let (_, catalog, sequence) = build(4, ZonePolicy::default());
    let anchor = catalog
        .random
        .iter()
        .find(|a| a.layout_id.as_str() == "C")
        .unwrap();
    let occurrences: Vec<&Layout> = sequence
        .iter()
        .filter(|(_, _, l)| l.layout_id().as_str() == "C")
        .map(|(_, _, l)| l.as_ref())
        .collect();

    assert_eq!(occurrences.len(), 18);
    for layout in &occurrences {
        assert_eq!(layout.target(), &anchor.target);
        assert_eq!(layout.layout_type(), LayoutType::Random);
    }

    let distinct: Vec<_> = occurrences
        .iter()
        .map(|l| format!("{:?}", l.distractors()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    assert!(distinct.len() >= 2);
}

#[test]
fn each_block_is_a_permutation_of_all_categories() {
    let (_, _, sequence) = build(5, ZonePolicy::default());
    assert_eq!(sequence.len(), 360);
    assert_eq!(sequence.blocks().len(), 18);

    let expected: BTreeSet<String> = (1..=10)
        .map(|n| n.to_string())
        .chain(('A'..='J').map(|c| c.to_string()))
        .collect();

    for (i, block) in sequence.blocks().iter().enumerate() {
        assert_eq!(block.number, i + 1);
        assert_eq!(block.layouts.len(), 20);
        let ids: BTreeSet<String> = block
            .layouts
            .iter()
            .map(|l| l.layout_id().to_string())
            .collect();
        assert_eq!(ids, expected, "block {}", block.number);
    }
}

#[test]
fn blocks_are_shuffled_independently() {
    let (_, _, sequence) = build(6, ZonePolicy::default());
    let orders: BTreeSet<Vec<String>> = sequence
        .blocks()
        .iter()
        .map(|b| b.layouts.iter().map(|l| l.layout_id().to_string()).collect())
        .collect();
    assert!(orders.len() > 1);
}

#[test]
fn concatenated_indexing_matches_blocks() {
    let (_, _, sequence) = build(7, ZonePolicy::default());
    assert_eq!(sequence.block_of(0), Some(1));
    assert_eq!(sequence.block_of(19), Some(1));
    assert_eq!(sequence.block_of(20), Some(2));
    assert_eq!(sequence.block_of(359), Some(18));
    assert_eq!(sequence.block_of(360), None);
    assert!(std::sync::Arc::ptr_eq(
        sequence.get(45).unwrap(),
        &sequence.blocks()[2].layouts[5]
    ));
}

#[test]
fn same_seed_builds_same_corpus() {
    let (_, _, a) = build(8, ZonePolicy::default());
    let (_, _, b) = build(8, ZonePolicy::default());
    assert_eq!(
        cueing_layout::sequence_csv(&a),
        cueing_layout::sequence_csv(&b)
    );
}

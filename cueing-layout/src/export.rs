use crate::catalog::{Catalog, RandomAnchor};
use crate::sequence::TrialSequence;
use cueing_core::Layout;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;

pub const CSV_HEADER: &str = "Block,Trial,LayoutID,Letter,Rotation,Top,Left,LayoutType";

/// One row per glyph per trial. Block and trial numbers are 1-based.
pub fn sequence_csv(sequence: &TrialSequence) -> String {
    let mut out = String::with_capacity(64 * 12 * sequence.len() + CSV_HEADER.len() + 1);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for (block, trial, layout) in sequence.iter() {
        for item in layout.items() {
            // Writing into a String cannot fail.
            let _ = writeln!(
                out,
                "{},{},{},{},{},{},{},{}",
                block,
                trial,
                layout.layout_id(),
                item.letter,
                item.rotation,
                item.position.top,
                item.position.left,
                item.layout_type,
            );
        }
    }
    out
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSnapshot<'a> {
    pub block: usize,
    pub layouts: &'a [Arc<Layout>],
}

/// Everything built for a session, for inspection in debug mode.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSnapshot<'a> {
    pub repeated: &'a [Arc<Layout>],
    pub random_anchors: &'a [RandomAnchor],
    pub practice: &'a [Arc<Layout>],
    pub blocks: Vec<BlockSnapshot<'a>>,
}

impl<'a> DebugSnapshot<'a> {
    pub fn new(catalog: &'a Catalog, practice: &'a [Arc<Layout>], sequence: &'a TrialSequence) -> Self {
        Self {
            repeated: &catalog.repeated,
            random_anchors: &catalog.random,
            practice,
            blocks: sequence
                .blocks()
                .iter()
                .map(|b| BlockSnapshot {
                    block: b.number,
                    layouts: &b.layouts,
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GeometryConfig, LayoutGenerator, LayoutSetBuilder};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn built() -> (Catalog, Vec<Arc<Layout>>, TrialSequence) {
        let mut rng = StdRng::seed_from_u64(33);
        let mut b = LayoutSetBuilder::new(LayoutGenerator::new(GeometryConfig::default()).unwrap());
        let catalog = b.build_catalog(&mut rng);
        let practice = b.build_practice(&mut rng, 10);
        let sequence = b.build_trial_sequence(&mut rng, &catalog, 18, 20).unwrap();
        (catalog, practice, sequence)
    }

    #[test]
    fn csv_has_one_row_per_glyph() {
        let (_, _, sequence) = built();
        let csv = sequence_csv(&sequence);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(lines.count(), 360 * 12);
    }

    #[test]
    fn csv_numbers_blocks_and_trials_from_one() {
        let (_, _, sequence) = built();
        let csv = sequence_csv(&sequence);
        let first: Vec<&str> = csv.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(first[0], "1");
        assert_eq!(first[1], "1");
        assert_eq!(first[3], "T");
        assert!(first[4] == "90" || first[4] == "270");

        let last: Vec<&str> = csv.lines().last().unwrap().split(',').collect();
        assert_eq!(last[0], "18");
        assert_eq!(last[1], "20");
        assert_eq!(last[3], "L");
    }

    #[test]
    fn csv_export_is_idempotent() {
        let (_, _, sequence) = built();
        assert_eq!(sequence_csv(&sequence), sequence_csv(&sequence));
    }

    #[test]
    fn snapshot_lists_every_block() {
        let (catalog, practice, sequence) = built();
        let snapshot = DebugSnapshot::new(&catalog, &practice, &sequence);
        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(value["repeated"].as_array().unwrap().len(), 10);
        assert_eq!(value["randomAnchors"].as_array().unwrap().len(), 10);
        assert_eq!(value["practice"].as_array().unwrap().len(), 10);
        assert_eq!(value["blocks"].as_array().unwrap().len(), 18);
        assert_eq!(value["blocks"][17]["block"], 18);
        assert_eq!(value["blocks"][0]["layouts"][0]["items"].as_array().unwrap().len(), 12);
    }
}

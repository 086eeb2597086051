use cueing_core::Layout;
use std::sync::Arc;

/// One shuffled pass over every layout category.
#[derive(Debug, Clone)]
pub struct Block {
    /// 1-based block number.
    pub number: usize,
    pub layouts: Vec<Arc<Layout>>,
}

/// The main trial corpus: blocks in fixed order, shuffled within each block.
#[derive(Debug, Clone, Default)]
pub struct TrialSequence {
    blocks: Vec<Block>,
    layouts_per_block: usize,
}

impl TrialSequence {
    pub fn new(blocks: Vec<Block>, layouts_per_block: usize) -> Self {
        Self {
            blocks,
            layouts_per_block,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn layouts_per_block(&self) -> usize {
        self.layouts_per_block
    }

    pub fn len(&self) -> usize {
        self.blocks.iter().map(|b| b.layouts.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Layout at a 0-based position in the concatenated sequence.
    pub fn get(&self, index: usize) -> Option<&Arc<Layout>> {
        if self.layouts_per_block == 0 {
            return None;
        }
        self.blocks
            .get(index / self.layouts_per_block)
            .and_then(|b| b.layouts.get(index % self.layouts_per_block))
    }

    /// 1-based block number for a 0-based trial index.
    pub fn block_of(&self, index: usize) -> Option<usize> {
        self.get(index)?;
        Some(index / self.layouts_per_block + 1)
    }

    /// `(block, trial within block, layout)`, both numbers 1-based.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Arc<Layout>)> + '_ {
        self.blocks.iter().flat_map(|block| {
            block
                .layouts
                .iter()
                .enumerate()
                .map(move |(i, layout)| (block.number, i + 1, layout))
        })
    }
}

use crate::layout::{LayoutId, LayoutType};
use crate::response::TrialOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label carried by every record of this task.
pub const TEST_TYPE: &str = "Implicit Learning";

/// Trial state machine events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    /// Layout on screen, waiting for the first response.
    Presenting,
    /// Response taken; blank inter-trial gap before the next layout.
    Settling,
}

/// Where the running main-section trial sits. All numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockProgress {
    pub block: usize,
    pub blocks: usize,
    pub layout: usize,
    pub layouts: usize,
}

impl fmt::Display for BlockProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block {} / {} | Layout {} / {}",
            self.block, self.blocks, self.layout, self.layouts
        )
    }
}

/// Recorded result per main-section trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub participant: String,
    pub condition: String,
    pub test_type: String,
    /// 1-based position in the main sequence.
    pub trial_number: usize,
    pub layout_id: LayoutId,
    pub layout_type: LayoutType,
    pub result: TrialOutcome,
    pub response_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_progress_shows_block_and_layout() {
        let progress = BlockProgress {
            block: 3,
            blocks: 18,
            layout: 7,
            layouts: 20,
        };
        assert_eq!(progress.to_string(), "Block 3 / 18 | Layout 7 / 20");
    }
}

use cueing_core::{Layout, TrialState};
use cueing_timing::Deadline;
use std::sync::Arc;

/// One presentation of a layout.
#[derive(Debug, Clone)]
pub struct Trial<T> {
    /// 0-based position within the active phase's sequence.
    pub index: usize,
    pub layout: Arc<Layout>,
    /// Timer reading when the layout was shown.
    pub started: T,
    pub state: TrialState,
    /// Set when the response arrives; the next trial starts once it is due.
    pub settle: Option<Deadline>,
}

impl<T: Copy> Trial<T> {
    pub fn new(index: usize, layout: Arc<Layout>, start: T) -> Self {
        Self {
            index,
            layout,
            started: start,
            state: TrialState::Presenting,
            settle: None,
        }
    }

    pub fn is_presenting(&self) -> bool {
        self.state == TrialState::Presenting
    }
}

use crate::timer::Timer;
use std::time::Duration;

/// A point on a timer's clock after which a delayed step may run.
///
/// The session polls this from its update loop instead of chaining timer
/// callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    due_ns: u64,
}

impl Deadline {
    pub fn after<T: Timer<Timestamp = u64>>(timer: &T, delay: Duration) -> Self {
        Self {
            due_ns: timer.now().saturating_add(delay.as_nanos() as u64),
        }
    }

    pub fn is_due<T: Timer<Timestamp = u64>>(&self, timer: &T) -> bool {
        timer.now() >= self.due_ns
    }

    pub fn remaining<T: Timer<Timestamp = u64>>(&self, timer: &T) -> Duration {
        Duration::from_nanos(self.due_ns.saturating_sub(timer.now()))
    }
}

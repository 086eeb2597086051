/// Defines session phases and behavior
pub trait Phase: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + Default {
    /// True while trials are being presented and responses are scored.
    fn allows_response(&self) -> bool;
    /// True while the session waits for a start signal.
    fn awaits_start(&self) -> bool;
    fn next(&self) -> Option<Self>;

    fn is_practice(&self) -> bool {
        false
    }
    fn is_main(&self) -> bool {
        false
    }
    fn is_ended(&self) -> bool {
        false
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Practice,
    MainPending,
    Main,
    Ended,
}

impl Phase for SessionPhase {
    fn allows_response(&self) -> bool {
        matches!(self, Self::Practice | Self::Main)
    }
    fn awaits_start(&self) -> bool {
        matches!(self, Self::Idle | Self::MainPending)
    }
    fn next(&self) -> Option<Self> {
        use SessionPhase::*;
        Some(match self {
            Idle => Practice,
            Practice => MainPending,
            MainPending => Main,
            Main => Ended,
            Ended => return None,
        })
    }

    fn is_practice(&self) -> bool {
        matches!(self, SessionPhase::Practice)
    }

    fn is_main(&self) -> bool {
        matches!(self, SessionPhase::Main)
    }

    fn is_ended(&self) -> bool {
        matches!(self, SessionPhase::Ended)
    }
}

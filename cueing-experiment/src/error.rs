use cueing_core::SessionPhase;
use cueing_layout::LayoutError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("could not build the stimulus set: {0}")]
    Layout(#[from] LayoutError),
    #[error("could not read config file: {0}")]
    ConfigIo(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("results are only available once the session has ended (currently {0:?})")]
    NotEnded(SessionPhase),
}

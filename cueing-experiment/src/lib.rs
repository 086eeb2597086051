pub mod config;
pub mod error;
pub mod state;
pub mod trial;
pub use config::ExperimentConfig;
pub use error::ExperimentError;
pub use state::{Handled, ResponseEvent, SessionEvent, SessionStateMachine, TrialFeedback};
pub use trial::Trial;

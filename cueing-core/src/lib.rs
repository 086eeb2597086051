pub mod error;
pub mod glyph;
pub mod layout;
pub mod phase;
pub mod response;
pub mod subject;
pub mod trial;

pub use error::CoreError;
pub use glyph::{GlyphPlacement, Letter, Position, Rotation};
pub use layout::{Layout, LayoutId, LayoutType};
pub use phase::{Phase, SessionPhase};
pub use response::{ResponseDirection, TrialOutcome, score};
pub use subject::Subject;
pub use trial::{BlockProgress, ResultRecord, TEST_TYPE, TrialState};

//! Hands a finished session log to the collecting server.

pub mod error;
pub mod payload;
pub mod reporter;

pub use error::ReportError;
pub use payload::{Submission, WireRecord};
pub use reporter::{DEFAULT_ENDPOINT, HttpReporter, ResultReporter};

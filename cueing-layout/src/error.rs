use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("a block holds {expected} layouts (one per category), not {requested}")]
    BlockSizeMismatch { expected: usize, requested: usize },
    #[error("sampling zone is empty: top {top_min}..{top_max}, left {left_min}..{left_max}")]
    EmptyZone {
        top_min: f64,
        top_max: f64,
        left_min: f64,
        left_max: f64,
    },
    #[error("sampler needs at least one attempt")]
    NoAttempts,
    #[error("random categories are lettered A..Z, {0} requested")]
    TooManyRandomCategories(usize),
}

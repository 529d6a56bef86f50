use thiserror::Error;

use crate::io::InnerId;
use crate::similarity::Mode;

/// Failures of the recommendation core.
///
/// An empty candidate set is not an error: `recommend` returns an empty list.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecommendError {
    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("unknown item: {0}")]
    UnknownItem(String),

    #[error("index {index} is not known to the {mode} similarity")]
    InvalidIndex { index: InnerId, mode: Mode },

    #[error("no {0} similarity available")]
    ModeUnavailable(Mode),

    #[error("{0} is undefined: denominator is zero")]
    DivisionUndefined(String),
}

pub type Result<T> = std::result::Result<T, RecommendError>;

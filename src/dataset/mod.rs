use thiserror::Error;

use crate::error::Result;
use crate::io::{InnerId, Rating};

pub mod split;
pub mod stats;
pub mod trainset;

pub use trainset::{RatingScale, TrainSet};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: {reason}")]
    Parse { line: u64, reason: String },

    #[error("invalid split: {0}")]
    InvalidSplit(String),
}

/// Maps raw dataset identifiers to contiguous internal ids and exposes the
/// observations of each user.
pub trait IndexAdapter {
    fn to_inner_user(&self, raw_user_id: &str) -> Result<InnerId>;

    fn to_inner_item(&self, raw_item_id: &str) -> Result<InnerId>;

    fn to_raw_user(&self, user: InnerId) -> Result<&str>;

    fn to_raw_item(&self, item: InnerId) -> Result<&str>;

    /// The (item, rating) observations of `user`, one per item.
    fn user_profile(&self, user: InnerId) -> Result<&[(InnerId, Rating)]>;
}

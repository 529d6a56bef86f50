use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::{RecommendError, Result};
use crate::io::InnerId;

pub mod baseline;
pub mod matrix;

pub use matrix::{SimilarityMatrix, SimilarityOptions};

/// Whether neighbors are users or items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    UserBased,
    ItemBased,
}

impl Mode {
    pub fn from_user_based(user_based: bool) -> Mode {
        if user_based {
            Mode::UserBased
        } else {
            Mode::ItemBased
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::ItemBased
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::UserBased => write!(f, "user-based"),
            Mode::ItemBased => write!(f, "item-based"),
        }
    }
}

/// Source of pairwise similarity scores over a contiguous range of internal ids.
pub trait SimilarityProvider {
    /// All valid subject indices for `mode`.
    fn candidates(&self, mode: Mode) -> Result<Range<InnerId>>;

    /// Similarity of `other` as seen from `subject`. Only this direction is queried.
    fn similarity(&self, subject: InnerId, other: InnerId, mode: Mode) -> Result<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMeasure {
    Cosine,
    Msd,
    Pearson,
    PearsonBaseline,
}

impl Default for SimilarityMeasure {
    fn default() -> Self {
        SimilarityMeasure::PearsonBaseline
    }
}

impl FromStr for SimilarityMeasure {
    type Err = String;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        match name.trim().to_lowercase().as_str() {
            "cosine" => Ok(SimilarityMeasure::Cosine),
            "msd" => Ok(SimilarityMeasure::Msd),
            "pearson" => Ok(SimilarityMeasure::Pearson),
            "pearson_baseline" => Ok(SimilarityMeasure::PearsonBaseline),
            other => Err(format!("unknown similarity measure '{}'", other)),
        }
    }
}

impl fmt::Display for SimilarityMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimilarityMeasure::Cosine => "cosine",
            SimilarityMeasure::Msd => "msd",
            SimilarityMeasure::Pearson => "pearson",
            SimilarityMeasure::PearsonBaseline => "pearson_baseline",
        };
        write!(f, "{}", name)
    }
}

pub(crate) fn check_index(range: &Range<InnerId>, index: InnerId, mode: Mode) -> Result<()> {
    if range.contains(&index) {
        Ok(())
    } else {
        Err(RecommendError::InvalidIndex { index, mode })
    }
}

#[cfg(test)]
mod similarity_test {
    use super::*;

    #[test]
    fn should_parse_similarity_measures() {
        assert_eq!(Ok(SimilarityMeasure::Cosine), "cosine".parse());
        assert_eq!(Ok(SimilarityMeasure::PearsonBaseline), " Pearson_Baseline ".parse());
        assert!("jaccard".parse::<SimilarityMeasure>().is_err());
    }

    #[test]
    fn should_default_to_item_based() {
        assert_eq!(Mode::ItemBased, Mode::default());
        assert_eq!(Mode::UserBased, Mode::from_user_based(true));
        assert_eq!("item-based", Mode::ItemBased.to_string());
    }
}

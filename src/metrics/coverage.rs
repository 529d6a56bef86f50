use hashbrown::HashSet;

use crate::error::{RecommendError, Result};
use crate::io::InnerId;
use crate::metrics::RecommendationMetric;

/// Distinct recommended items relative to the distinct items liked in the test set.
///
/// The denominator is the liked-item union, not the catalog, so this measures how
/// much of the held-out liked space the recommendations reach.
pub struct Coverage {
    recommended_items: HashSet<InnerId>,
    liked_items: HashSet<InnerId>,
    length: usize,
}

impl Coverage {
    pub fn new(length: usize) -> Coverage {
        Coverage {
            recommended_items: HashSet::new(),
            liked_items: HashSet::new(),
            length,
        }
    }
}

impl RecommendationMetric for Coverage {
    fn add(&mut self, recommendations: &[InnerId], liked_items: &HashSet<InnerId>) {
        self.recommended_items
            .extend(recommendations.iter().take(self.length).copied());
        self.liked_items.extend(liked_items.iter().copied());
    }

    fn result(&self) -> Result<f64> {
        if !self.liked_items.is_empty() {
            Ok(self.recommended_items.len() as f64 / self.liked_items.len() as f64)
        } else {
            Err(RecommendError::DivisionUndefined(self.get_name()))
        }
    }

    fn get_name(&self) -> String {
        format!("Coverage@{}", self.length)
    }
}

#[cfg(test)]
mod coverage_test {
    use super::*;

    #[test]
    fn should_divide_by_liked_items_not_catalog() {
        let mut mymetric = Coverage::new(2);
        mymetric.add(&[1, 2, 9], &[1, 3].iter().copied().collect());
        mymetric.add(&[2], &[4, 5].iter().copied().collect());
        // recommended {1, 2}, liked {1, 3, 4, 5}
        assert_eq!(Ok(0.5), mymetric.result());
        assert_eq!("Coverage@2", mymetric.get_name());
    }

    #[test]
    fn should_handle_divide_by_zero() {
        let mymetric = Coverage::new(2);
        assert!(mymetric.result().is_err());
    }
}

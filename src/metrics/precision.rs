use hashbrown::HashSet;

use crate::error::{RecommendError, Result};
use crate::io::InnerId;
use crate::metrics::RecommendationMetric;

pub struct Precision {
    qty_hits: usize,
    qty_recommended: usize,
    length: usize,
}

impl Precision {
    /// Returns a Precision evaluation metric.
    /// Precision is the share of all recommended items, over all users, that the
    /// user turned out to like.
    ///
    /// # Arguments
    ///
    /// * `length` - the length aka 'n' of the recommendation lists that are evaluated.
    ///
    pub fn new(length: usize) -> Precision {
        Precision {
            qty_hits: 0,
            qty_recommended: 0,
            length,
        }
    }
}

impl RecommendationMetric for Precision {
    fn add(&mut self, recommendations: &[InnerId], liked_items: &HashSet<InnerId>) {
        let top_recos: HashSet<&InnerId> = recommendations.iter().take(self.length).collect();
        self.qty_hits += top_recos.iter().filter(|item| liked_items.contains(**item)).count();
        self.qty_recommended += top_recos.len();
    }

    fn result(&self) -> Result<f64> {
        if self.qty_recommended > 0 {
            Ok(self.qty_hits as f64 / self.qty_recommended as f64)
        } else {
            Err(RecommendError::DivisionUndefined(self.get_name()))
        }
    }

    fn get_name(&self) -> String {
        format!("Precision@{}", self.length)
    }
}

#[cfg(test)]
mod precision_test {
    use super::*;

    #[test]
    fn should_calculate_precision_over_all_users() {
        let mut mymetric = Precision::new(3);
        mymetric.add(&[1, 2, 3, 4], &[3, 55].iter().copied().collect());
        mymetric.add(&[7], &[7, 8].iter().copied().collect());
        // 2 hits out of 3 + 1 recommended items
        assert_eq!(Ok(0.5), mymetric.result());
        assert_eq!("Precision@3", mymetric.get_name());
    }

    #[test]
    fn should_handle_divide_by_zero() {
        let mut mymetric = Precision::new(5);
        mymetric.add(&[], &[1].iter().copied().collect());
        assert_eq!(
            Err(RecommendError::DivisionUndefined("Precision@5".to_string())),
            mymetric.result()
        );
    }
}

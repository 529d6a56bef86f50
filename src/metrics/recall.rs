use hashbrown::HashSet;

use crate::error::{RecommendError, Result};
use crate::io::InnerId;
use crate::metrics::RecommendationMetric;

pub struct Recall {
    qty_hits: usize,
    qty_liked: usize,
    length: usize,
}

impl Recall {
    /// Returns a Recall evaluation metric.
    /// Recall is the share of all liked items, over all users, that were recommended.
    ///
    /// # Arguments
    ///
    /// * `length` - the length aka 'n' of the recommendation lists that are evaluated.
    ///
    pub fn new(length: usize) -> Recall {
        Recall {
            qty_hits: 0,
            qty_liked: 0,
            length,
        }
    }
}

impl RecommendationMetric for Recall {
    fn add(&mut self, recommendations: &[InnerId], liked_items: &HashSet<InnerId>) {
        let top_recos: HashSet<&InnerId> = recommendations.iter().take(self.length).collect();
        self.qty_hits += top_recos.iter().filter(|item| liked_items.contains(**item)).count();
        self.qty_liked += liked_items.len();
    }

    fn result(&self) -> Result<f64> {
        if self.qty_liked > 0 {
            Ok(self.qty_hits as f64 / self.qty_liked as f64)
        } else {
            Err(RecommendError::DivisionUndefined(self.get_name()))
        }
    }

    fn get_name(&self) -> String {
        format!("Recall@{}", self.length)
    }
}

#[cfg(test)]
mod recall_test {
    use super::*;

    #[test]
    fn should_calculate_recall() {
        let length = 20;
        let mut under_test = Recall::new(length);
        let recommendations: Vec<InnerId> = (1..=24).collect();
        under_test.add(&recommendations, &[3, 55, 4].iter().copied().collect());
        assert!((2.0 / 3.0 - under_test.result().unwrap()).abs() < f64::EPSILON);
        assert_eq!("Recall@20", under_test.get_name());
    }

    #[test]
    fn should_only_count_the_first_length_recommendations() {
        let mut under_test = Recall::new(2);
        under_test.add(&[1, 2, 3], &[3].iter().copied().collect());
        assert_eq!(Ok(0.0), under_test.result());
    }

    #[test]
    fn should_handle_divide_by_zero() {
        let mut under_test = Recall::new(20);
        under_test.add(&[1, 2], &HashSet::new());
        assert!(under_test.result().is_err());
    }
}

use hashbrown::HashSet;

use crate::error::Result;
use crate::io::InnerId;
use crate::metrics::precision::Precision;
use crate::metrics::recall::Recall;
use crate::metrics::RecommendationMetric;

pub struct F1score {
    precision: Precision,
    recall: Recall,
    length: usize,
}

impl F1score {
    pub fn new(length: usize) -> F1score {
        F1score {
            precision: Precision::new(length),
            recall: Recall::new(length),
            length,
        }
    }
}

impl RecommendationMetric for F1score {
    fn add(&mut self, recommendations: &[InnerId], liked_items: &HashSet<InnerId>) {
        self.precision.add(recommendations, liked_items);
        self.recall.add(recommendations, liked_items);
    }

    fn result(&self) -> Result<f64> {
        let precision_score = self.precision.result()?;
        let recall_score = self.recall.result()?;
        if precision_score + recall_score > 0.0 {
            Ok(2.0 * (precision_score * recall_score) / (precision_score + recall_score))
        } else {
            Ok(0.0)
        }
    }

    fn get_name(&self) -> String {
        format!("F1score@{}", self.length)
    }
}

#[cfg(test)]
mod f1score_test {
    use super::*;

    #[test]
    fn should_happyflow_f1score() {
        let mut undertest = F1score::new(20);
        undertest.add(&[1, 2], &[2, 3].iter().copied().collect());
        // precision 1/2, recall 1/2
        assert!((0.5 - undertest.result().unwrap()).abs() < f64::EPSILON);
        assert_eq!("F1score@20", undertest.get_name());
    }

    #[test]
    fn should_be_zero_without_hits() {
        let mut undertest = F1score::new(20);
        undertest.add(&[1], &[2].iter().copied().collect());
        assert_eq!(Ok(0.0), undertest.result());
    }

    #[test]
    fn should_propagate_undefined_precision() {
        let undertest = F1score::new(20);
        assert!(undertest.result().is_err());
    }
}

use hashbrown::HashSet;

use crate::error::Result;
use crate::io::InnerId;
use crate::metrics::coverage::Coverage;
use crate::metrics::f1score::F1score;
use crate::metrics::precision::Precision;
use crate::metrics::recall::Recall;
use crate::metrics::RecommendationMetric;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationResult {
    pub precision: f64,
    pub recall: f64,
    pub coverage: f64,
    pub f1: f64,
}

pub struct EvaluationReporter {
    precision: Precision,
    recall: Recall,
    coverage: Coverage,
    f1: F1score,
}

impl EvaluationReporter {
    pub fn new(length: usize) -> EvaluationReporter {
        EvaluationReporter {
            precision: Precision::new(length),
            recall: Recall::new(length),
            coverage: Coverage::new(length),
            f1: F1score::new(length),
        }
    }

    pub fn add(&mut self, recommendations: &[InnerId], liked_items: &HashSet<InnerId>) {
        self.precision.add(recommendations, liked_items);
        self.recall.add(recommendations, liked_items);
        self.coverage.add(recommendations, liked_items);
        self.f1.add(recommendations, liked_items);
    }

    pub fn result(&self) -> Result<EvaluationResult> {
        Ok(EvaluationResult {
            precision: self.precision.result()?,
            recall: self.recall.result()?,
            coverage: self.coverage.result()?,
            f1: self.f1.result()?,
        })
    }

    /// Comma separated scores in the order of `get_name`, `NaN` where undefined.
    pub fn result_line(&self) -> String {
        let format_score = |score: Result<f64>| format!("{:.4}", score.unwrap_or(f64::NAN));
        format!(
            "{},{},{},{}",
            format_score(self.precision.result()),
            format_score(self.recall.result()),
            format_score(self.coverage.result()),
            format_score(self.f1.result())
        )
    }

    pub fn get_name(&self) -> String {
        format!(
            "{},{},{},{}",
            self.precision.get_name(),
            self.recall.get_name(),
            self.coverage.get_name(),
            self.f1.get_name()
        )
    }
}

#[cfg(test)]
mod evaluation_reporter_test {
    use super::*;

    #[test]
    fn should_report_all_metrics() {
        let mut reporter = EvaluationReporter::new(1);
        reporter.add(&[3], &[3, 4].iter().copied().collect());
        let result = reporter.result().unwrap();
        assert_eq!(1.0, result.precision);
        assert_eq!(0.5, result.recall);
        assert_eq!(0.5, result.coverage);
        assert!((2.0 / 3.0 - result.f1).abs() < f64::EPSILON);
        assert_eq!("Precision@1,Recall@1,Coverage@1,F1score@1", reporter.get_name());
        assert_eq!("1.0000,0.5000,0.5000,0.6667", reporter.result_line());
    }

    #[test]
    fn should_report_nan_for_undefined_scores() {
        let reporter = EvaluationReporter::new(5);
        assert!(reporter.result().is_err());
        assert_eq!("NaN,NaN,NaN,NaN", reporter.result_line());
    }
}

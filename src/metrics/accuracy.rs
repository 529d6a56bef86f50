use crate::error::{RecommendError, Result};
use crate::knn::Prediction;

fn errors(predictions: &[Prediction]) -> impl Iterator<Item = f64> + '_ {
    predictions
        .iter()
        .filter_map(|prediction| prediction.actual.map(|actual| actual - prediction.estimate))
}

/// Root mean squared error over the predictions that carry an actual rating.
pub fn rmse(predictions: &[Prediction]) -> Result<f64> {
    let (qty, sum_squared) = errors(predictions).fold((0_usize, 0_f64), |(qty, sum), error| {
        (qty + 1, sum + error * error)
    });
    if qty == 0 {
        return Err(RecommendError::DivisionUndefined("RMSE".to_string()));
    }
    Ok((sum_squared / qty as f64).sqrt())
}

/// Mean absolute error over the predictions that carry an actual rating.
pub fn mae(predictions: &[Prediction]) -> Result<f64> {
    let (qty, sum_absolute) = errors(predictions).fold((0_usize, 0_f64), |(qty, sum), error| {
        (qty + 1, sum + error.abs())
    });
    if qty == 0 {
        return Err(RecommendError::DivisionUndefined("MAE".to_string()));
    }
    Ok(sum_absolute / qty as f64)
}

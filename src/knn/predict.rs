use rayon::prelude::*;

use crate::dataset::{IndexAdapter, TrainSet};
use crate::error::Result;
use crate::io::{InnerId, RawRating, Rating};
use crate::knn::descending;
use crate::similarity::baseline::BaselineEstimates;
use crate::similarity::{Mode, SimilarityProvider};

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub user: String,
    pub item: String,
    pub actual: Option<Rating>,
    pub estimate: Rating,
    /// The estimate fell back to the global mean.
    pub was_impossible: bool,
}

/// Rating estimation from the `k` nearest neighbors that rated the target.
///
/// Without baselines the estimate is the similarity-weighted mean of the neighbor
/// ratings. With baselines the neighbor ratings are centred on their baseline
/// estimates and the weighted mean deviation is added to the target's baseline.
pub struct KnnPredictor<'a, S: ?Sized> {
    trainset: &'a TrainSet,
    provider: &'a S,
    mode: Mode,
    k: usize,
    min_k: usize,
    baselines: Option<&'a BaselineEstimates>,
}

impl<'a, S> KnnPredictor<'a, S>
where
    S: SimilarityProvider + ?Sized,
{
    pub fn new(
        trainset: &'a TrainSet,
        provider: &'a S,
        mode: Mode,
        k: usize,
        min_k: usize,
    ) -> Self {
        KnnPredictor {
            trainset,
            provider,
            mode,
            k,
            min_k,
            baselines: None,
        }
    }

    pub fn with_baselines(mut self, baselines: &'a BaselineEstimates) -> Self {
        self.baselines = Some(baselines);
        self
    }

    /// Unknown ids give an impossible prediction; similarity lookup failures are errors.
    pub fn predict(
        &self,
        raw_user_id: &str,
        raw_item_id: &str,
        actual: Option<Rating>,
    ) -> Result<Prediction> {
        let estimate = match (
            self.trainset.to_inner_user(raw_user_id),
            self.trainset.to_inner_item(raw_item_id),
        ) {
            (Ok(user), Ok(item)) => self.estimate(user, item)?,
            _ => None,
        };
        Ok(Prediction {
            user: raw_user_id.to_string(),
            item: raw_item_id.to_string(),
            actual,
            estimate: self
                .trainset
                .rating_scale()
                .clip(estimate.unwrap_or_else(|| self.trainset.global_mean())),
            was_impossible: estimate.is_none(),
        })
    }

    fn estimate(&self, user: InnerId, item: InnerId) -> Result<Option<Rating>> {
        let (subject, raters) = match self.mode {
            Mode::UserBased => (user, self.trainset.item_ratings(item)),
            Mode::ItemBased => (item, self.trainset.user_ratings(user)),
        };

        let mut scored_raters = raters
            .iter()
            .map(|(other, rating)| -> Result<(f64, Rating)> {
                let similarity = self.provider.similarity(subject, *other, self.mode)?;
                let deviation = match (self.baselines, self.mode) {
                    (Some(baselines), Mode::UserBased) => rating - baselines.estimate(*other, item),
                    (Some(baselines), Mode::ItemBased) => rating - baselines.estimate(user, *other),
                    (None, _) => *rating,
                };
                Ok((similarity, deviation))
            })
            .collect::<Result<Vec<_>>>()?;
        scored_raters.sort_by(|left, right| descending(left.0, right.0));

        let mut qty_neighbors = 0;
        let mut sum_similarities = 0.0;
        let mut sum_ratings = 0.0;
        for (similarity, rating) in scored_raters.into_iter().take(self.k) {
            if similarity > 0.0 {
                qty_neighbors += 1;
                sum_similarities += similarity;
                sum_ratings += similarity * rating;
            }
        }
        let enough_neighbors = qty_neighbors >= self.min_k && sum_similarities > 0.0;

        Ok(match self.baselines {
            Some(baselines) => {
                let baseline = baselines.estimate(user, item);
                if enough_neighbors {
                    Some(baseline + sum_ratings / sum_similarities)
                } else {
                    Some(baseline)
                }
            }
            None if enough_neighbors => Some(sum_ratings / sum_similarities),
            None => None,
        })
    }
}

impl<'a, S> KnnPredictor<'a, S>
where
    S: SimilarityProvider + Sync + ?Sized,
{
    /// Predictions for every rating of a held-out set, in input order.
    pub fn test(&self, ratings: &[RawRating]) -> Result<Vec<Prediction>> {
        ratings
            .par_iter()
            .map(|rating| self.predict(&rating.user, &rating.item, Some(rating.rating)))
            .collect()
    }
}

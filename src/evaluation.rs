use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::dataset::IndexAdapter;
use crate::error::{RecommendError, Result};
use crate::io::{InnerId, RawId, RawRating};
use crate::knn::KnnRecommender;
use crate::metrics::evaluation_reporter::{EvaluationReporter, EvaluationResult};
use crate::similarity::SimilarityProvider;
use crate::stopwatch::Stopwatch;

/// Held-out items per test user, translated to internal ids.
#[derive(Debug, Default)]
pub struct LikedItems {
    pub per_user: HashMap<RawId, HashSet<InnerId>>,
    /// Test items unknown to the train set; dropped from the liked sets.
    pub qty_unresolvable: usize,
}

pub fn group_liked_items<A: IndexAdapter + ?Sized>(
    adapter: &A,
    test: &[RawRating],
) -> LikedItems {
    let mut liked = LikedItems::default();
    for rating in test.iter() {
        let liked_items = liked
            .per_user
            .entry(rating.user.clone())
            .or_insert_with(HashSet::new);
        match adapter.to_inner_item(&rating.item) {
            Ok(item) => {
                liked_items.insert(item);
            }
            Err(_) => liked.qty_unresolvable += 1,
        }
    }
    liked
}

pub struct Evaluation {
    pub reporter: EvaluationReporter,
    pub qty_users_evaluated: usize,
    /// Test users unknown to the train set. Their liked items are scored against an
    /// empty recommendation list.
    pub qty_users_skipped: usize,
    pub qty_unresolvable_items: usize,
    pub latencies: Stopwatch,
}

impl Evaluation {
    pub fn result(&self) -> Result<EvaluationResult> {
        self.reporter.result()
    }
}

/// Recommends `n` items to every test user and scores them against the items the
/// user rated in `test`.
///
/// Users are scored in parallel and accumulated in sorted order, so the outcome is
/// independent of the thread count.
pub fn evaluate<A, S>(
    recommender: &KnnRecommender<A, S>,
    test: &[RawRating],
    k: usize,
    n: usize,
) -> Result<Evaluation>
where
    A: IndexAdapter + Sync + ?Sized,
    S: SimilarityProvider + Sync + ?Sized,
{
    let liked = group_liked_items(recommender.adapter(), test);
    if liked.qty_unresolvable > 0 {
        debug!(
            qty_unresolvable = liked.qty_unresolvable,
            "dropped test items unknown to the train set"
        );
    }

    let users = liked
        .per_user
        .iter()
        .sorted_by(|left, right| left.0.cmp(right.0))
        .collect_vec();

    let outcomes: Vec<_> = users
        .par_iter()
        .map(|(user, _)| Stopwatch::time(|| recommender.recommend_inner(user, k, n)))
        .collect();

    let mut reporter = EvaluationReporter::new(n);
    let mut latencies = Stopwatch::new();
    let mut qty_users_evaluated = 0;
    let mut qty_users_skipped = 0;
    for ((user, liked_items), (outcome, elapsed)) in users.into_iter().zip(outcomes) {
        match outcome {
            Ok(recommendations) => {
                reporter.add(&recommendations, liked_items);
                latencies.record(elapsed);
                qty_users_evaluated += 1;
            }
            Err(RecommendError::UnknownUser(_)) => {
                // still counts towards the recall and coverage denominators
                warn!(
                    user = user.as_str(),
                    "no recommendations for test user unknown to the train set"
                );
                reporter.add(&[], liked_items);
                qty_users_skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        mode = %recommender.mode(),
        qty_users_evaluated,
        qty_users_skipped,
        qty_unresolvable_items = liked.qty_unresolvable,
        "evaluated recommendations"
    );

    Ok(Evaluation {
        reporter,
        qty_users_evaluated,
        qty_users_skipped,
        qty_unresolvable_items: liked.qty_unresolvable,
        latencies,
    })
}

#[cfg(test)]
mod evaluation_test {
    use super::*;
    use crate::dataset::{RatingScale, TrainSet};

    #[test]
    fn should_group_and_drop_unresolvable_items() {
        let trainset = TrainSet::build(
            &[RawRating::new("a", "1", 5.0), RawRating::new("b", "2", 3.0)],
            RatingScale::default(),
        );
        let test = vec![
            RawRating::new("a", "2", 4.0),
            RawRating::new("a", "404", 1.0),
            RawRating::new("c", "404", 2.0),
        ];
        let liked = group_liked_items(&trainset, &test);
        assert_eq!(2, liked.qty_unresolvable);
        assert_eq!(2, liked.per_user.len());
        assert!(liked.per_user["a"].contains(&1));
        assert_eq!(1, liked.per_user["a"].len());
        assert!(liked.per_user["c"].is_empty());
    }
}

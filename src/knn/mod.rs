use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};
use tracing::debug;

use crate::dataset::IndexAdapter;
use crate::error::Result;
use crate::io::InnerId;
use crate::similarity::{Mode, SimilarityProvider};

pub mod neighbors;
pub mod predict;

pub use neighbors::neighbors;
pub use predict::{KnnPredictor, Prediction};

/// Orders higher scores first and treats NaN as the lowest score.
pub(crate) fn descending(left: f64, right: f64) -> Ordering {
    match right.partial_cmp(&left) {
        Some(ordering) => ordering,
        None => left.is_nan().cmp(&right.is_nan()),
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct NeighborScore {
    pub id: InnerId,
    pub similarity: f64,
}

impl NeighborScore {
    pub fn new(id: InnerId, similarity: f64) -> Self {
        NeighborScore { id, similarity }
    }
}

impl Eq for NeighborScore {}

impl Ord for NeighborScore {
    fn cmp(&self, other: &Self) -> Ordering {
        // most similar first, then lowest index
        descending(self.similarity, other.similarity).then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for NeighborScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct ItemScore {
    pub id: InnerId,
    pub score: f64,
    /// Position of the item's first accumulation in its score map.
    pub first_seen: usize,
}

impl ItemScore {
    fn new(id: InnerId, score: f64, first_seen: usize) -> Self {
        ItemScore { id, score, first_seen }
    }
}

impl Eq for ItemScore {}

impl Ord for ItemScore {
    fn cmp(&self, other: &Self) -> Ordering {
        // highest score first, then earliest accumulated
        descending(self.score, other.score).then_with(|| self.first_seen.cmp(&other.first_seen))
    }
}

impl PartialOrd for ItemScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Accumulated candidate scores of a single recommendation call.
#[derive(Debug, Default)]
pub struct ScoreMap {
    slots: HashMap<InnerId, usize>,
    scores: Vec<(InnerId, f64)>,
}

impl ScoreMap {
    /// Adds `contribution` to the score of `item`, which starts at zero.
    pub fn add(&mut self, item: InnerId, contribution: f64) {
        match self.slots.entry(item) {
            Entry::Occupied(entry) => self.scores[*entry.get()].1 += contribution,
            Entry::Vacant(entry) => {
                entry.insert(self.scores.len());
                self.scores.push((item, contribution));
            }
        }
    }

    pub fn get(&self, item: InnerId) -> Option<f64> {
        self.slots.get(&item).map(|slot| self.scores[*slot].1)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// The `how_many` best scored items, best first.
    pub fn top(&self, how_many: usize) -> Vec<ItemScore> {
        let mut top_items: BinaryHeap<ItemScore> =
            BinaryHeap::with_capacity(how_many.min(self.scores.len()));
        for (first_seen, (item, score)) in self.scores.iter().enumerate() {
            let scored_item = ItemScore::new(*item, *score, first_seen);
            if top_items.len() < how_many {
                top_items.push(scored_item);
            } else if let Some(mut bottom) = top_items.peek_mut() {
                if scored_item < *bottom {
                    *bottom = scored_item;
                }
            }
        }
        top_items.into_sorted_vec()
    }
}

type Aggregation<A, S> = fn(&A, &S, InnerId, usize) -> Result<ScoreMap>;

/// Every item rated by the user's `k` nearest users, weighted by their similarity.
fn user_based_scores<A, S>(adapter: &A, provider: &S, user: InnerId, k: usize) -> Result<ScoreMap>
where
    A: IndexAdapter + ?Sized,
    S: SimilarityProvider + ?Sized,
{
    let rated: HashSet<InnerId> = adapter
        .user_profile(user)?
        .iter()
        .map(|(item, _)| *item)
        .collect();
    let mut item_scores = ScoreMap::default();
    for neighbor in neighbors(provider, Mode::UserBased, user, k)? {
        for (item, rating) in adapter.user_profile(neighbor.id)? {
            if rated.contains(item) {
                continue;
            }
            item_scores.add(*item, neighbor.similarity * rating);
        }
    }
    Ok(item_scores)
}

/// The `k` nearest items of every rated item, weighted by the user's rating.
fn item_based_scores<A, S>(adapter: &A, provider: &S, user: InnerId, k: usize) -> Result<ScoreMap>
where
    A: IndexAdapter + ?Sized,
    S: SimilarityProvider + ?Sized,
{
    let profile = adapter.user_profile(user)?;
    let rated: HashSet<InnerId> = profile.iter().map(|(item, _)| *item).collect();
    let mut item_scores = ScoreMap::default();
    for (item, rating) in profile.iter() {
        for neighbor in neighbors(provider, Mode::ItemBased, *item, k)? {
            if rated.contains(&neighbor.id) {
                continue;
            }
            item_scores.add(neighbor.id, rating * neighbor.similarity);
        }
    }
    Ok(item_scores)
}

/// Top-n recommendation by accumulating neighbor evidence.
///
/// Scores are summed over all neighbors and ratings, so an item supported by several
/// neighbors outranks one supported by a single strong neighbor of equal weight.
pub struct KnnRecommender<'a, A: ?Sized, S: ?Sized> {
    adapter: &'a A,
    provider: &'a S,
    mode: Mode,
    aggregate: Aggregation<A, S>,
}

impl<'a, A, S> KnnRecommender<'a, A, S>
where
    A: IndexAdapter + ?Sized,
    S: SimilarityProvider + ?Sized,
{
    pub fn new(adapter: &'a A, provider: &'a S, mode: Mode) -> Self {
        let aggregate: Aggregation<A, S> = match mode {
            Mode::UserBased => user_based_scores::<A, S>,
            Mode::ItemBased => item_based_scores::<A, S>,
        };
        KnnRecommender {
            adapter,
            provider,
            mode,
            aggregate,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn adapter(&self) -> &'a A {
        self.adapter
    }

    /// Accumulated scores of every candidate item for `raw_user_id`.
    pub fn score_items(&self, raw_user_id: &str, k: usize) -> Result<ScoreMap> {
        let user = self.adapter.to_inner_user(raw_user_id)?;
        (self.aggregate)(self.adapter, self.provider, user, k)
    }

    pub fn recommend_scored(
        &self,
        raw_user_id: &str,
        k: usize,
        n: usize,
    ) -> Result<Vec<ItemScore>> {
        let item_scores = self.score_items(raw_user_id, k)?;
        debug!(
            user = raw_user_id,
            mode = %self.mode,
            qty_candidates = item_scores.len(),
            "scored candidate items"
        );
        Ok(item_scores.top(n))
    }

    /// Internal ids of the `n` best items for `raw_user_id`.
    pub fn recommend_inner(&self, raw_user_id: &str, k: usize, n: usize) -> Result<Vec<InnerId>> {
        Ok(self
            .recommend_scored(raw_user_id, k, n)?
            .iter()
            .map(|scored| scored.id)
            .collect())
    }

    /// Raw ids of the `n` best items for `raw_user_id`, best first.
    pub fn recommend(&self, raw_user_id: &str, k: usize, n: usize) -> Result<Vec<String>> {
        self.recommend_inner(raw_user_id, k, n)?
            .into_iter()
            .map(|item| self.adapter.to_raw_item(item).map(str::to_string))
            .collect()
    }
}

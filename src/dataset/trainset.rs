use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use tracing::debug;

use crate::dataset::IndexAdapter;
use crate::error::{RecommendError, Result};
use crate::io::{InnerId, RawId, RawRating, Rating};
use crate::similarity::Mode;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingScale {
    pub min: Rating,
    pub max: Rating,
}

impl RatingScale {
    pub fn new(min: Rating, max: Rating) -> Self {
        RatingScale { min, max }
    }

    pub fn clip(&self, rating: Rating) -> Rating {
        rating.max(self.min).min(self.max)
    }
}

impl Default for RatingScale {
    fn default() -> Self {
        RatingScale::new(1.0, 5.0)
    }
}

/// Ratings re-indexed with contiguous internal ids, in first-appearance order.
#[derive(Debug, Clone)]
pub struct TrainSet {
    raw_to_inner_user: HashMap<RawId, InnerId>,
    raw_to_inner_item: HashMap<RawId, InnerId>,
    inner_to_raw_user: Vec<RawId>,
    inner_to_raw_item: Vec<RawId>,
    ur: Vec<Vec<(InnerId, Rating)>>,
    ir: Vec<Vec<(InnerId, Rating)>>,
    qty_ratings: usize,
    global_mean: f64,
    rating_scale: RatingScale,
}

fn intern(
    raw_id: &str,
    raw_to_inner: &mut HashMap<RawId, InnerId>,
    inner_to_raw: &mut Vec<RawId>,
    observations: &mut Vec<Vec<(InnerId, Rating)>>,
) -> InnerId {
    if let Some(inner) = raw_to_inner.get(raw_id) {
        return *inner;
    }
    let inner = inner_to_raw.len() as InnerId;
    raw_to_inner.insert(raw_id.to_string(), inner);
    inner_to_raw.push(raw_id.to_string());
    observations.push(Vec::new());
    inner
}

impl TrainSet {
    pub fn build(ratings: &[RawRating], rating_scale: RatingScale) -> TrainSet {
        let mut raw_to_inner_user = HashMap::new();
        let mut raw_to_inner_item = HashMap::new();
        let mut inner_to_raw_user = Vec::new();
        let mut inner_to_raw_item = Vec::new();
        let mut ur: Vec<Vec<(InnerId, Rating)>> = Vec::new();
        let mut ir: Vec<Vec<(InnerId, Rating)>> = Vec::new();

        // (user, item) -> positions in ur[user] and ir[item]
        let mut positions: HashMap<(InnerId, InnerId), (usize, usize)> =
            HashMap::with_capacity(ratings.len());
        let mut qty_duplicates = 0_usize;

        for raw in ratings.iter() {
            let user = intern(&raw.user, &mut raw_to_inner_user, &mut inner_to_raw_user, &mut ur);
            let item = intern(&raw.item, &mut raw_to_inner_item, &mut inner_to_raw_item, &mut ir);
            match positions.entry((user, item)) {
                Entry::Occupied(entry) => {
                    let (user_pos, item_pos) = *entry.get();
                    ur[user as usize][user_pos].1 = raw.rating;
                    ir[item as usize][item_pos].1 = raw.rating;
                    qty_duplicates += 1;
                }
                Entry::Vacant(entry) => {
                    entry.insert((ur[user as usize].len(), ir[item as usize].len()));
                    ur[user as usize].push((item, raw.rating));
                    ir[item as usize].push((user, raw.rating));
                }
            }
        }

        let qty_ratings = positions.len();
        let global_mean = if qty_ratings > 0 {
            ur.iter().flatten().map(|(_, rating)| rating).sum::<f64>() / qty_ratings as f64
        } else {
            0.0
        };

        if qty_duplicates > 0 {
            debug!(qty_duplicates, "replaced duplicate user-item ratings");
        }

        TrainSet {
            raw_to_inner_user,
            raw_to_inner_item,
            inner_to_raw_user,
            inner_to_raw_item,
            ur,
            ir,
            qty_ratings,
            global_mean,
            rating_scale,
        }
    }

    pub fn n_users(&self) -> usize {
        self.ur.len()
    }

    pub fn n_items(&self) -> usize {
        self.ir.len()
    }

    pub fn n_ratings(&self) -> usize {
        self.qty_ratings
    }

    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    pub fn rating_scale(&self) -> RatingScale {
        self.rating_scale
    }

    pub fn user_ratings(&self, user: InnerId) -> &[(InnerId, Rating)] {
        &self.ur[user as usize]
    }

    pub fn item_ratings(&self, item: InnerId) -> &[(InnerId, Rating)] {
        &self.ir[item as usize]
    }

    /// Observation rows of the subjects compared under `mode`: users for
    /// user-based, items for item-based.
    pub fn rows(&self, mode: Mode) -> &[Vec<(InnerId, Rating)>] {
        match mode {
            Mode::UserBased => &self.ur,
            Mode::ItemBased => &self.ir,
        }
    }
}

impl IndexAdapter for TrainSet {
    fn to_inner_user(&self, raw_user_id: &str) -> Result<InnerId> {
        self.raw_to_inner_user
            .get(raw_user_id)
            .copied()
            .ok_or_else(|| RecommendError::UnknownUser(raw_user_id.to_string()))
    }

    fn to_inner_item(&self, raw_item_id: &str) -> Result<InnerId> {
        self.raw_to_inner_item
            .get(raw_item_id)
            .copied()
            .ok_or_else(|| RecommendError::UnknownItem(raw_item_id.to_string()))
    }

    fn to_raw_user(&self, user: InnerId) -> Result<&str> {
        self.inner_to_raw_user
            .get(user as usize)
            .map(String::as_str)
            .ok_or(RecommendError::InvalidIndex { index: user, mode: Mode::UserBased })
    }

    fn to_raw_item(&self, item: InnerId) -> Result<&str> {
        self.inner_to_raw_item
            .get(item as usize)
            .map(String::as_str)
            .ok_or(RecommendError::InvalidIndex { index: item, mode: Mode::ItemBased })
    }

    fn user_profile(&self, user: InnerId) -> Result<&[(InnerId, Rating)]> {
        self.ur
            .get(user as usize)
            .map(Vec::as_slice)
            .ok_or(RecommendError::InvalidIndex { index: user, mode: Mode::UserBased })
    }
}

#[cfg(test)]
mod trainset_test {
    use super::*;

    fn ratings() -> Vec<RawRating> {
        vec![
            RawRating::new("u7", "i3", 4.0),
            RawRating::new("u2", "i3", 2.0),
            RawRating::new("u7", "i9", 5.0),
            RawRating::new("u7", "i3", 1.0),
        ]
    }

    #[test]
    fn should_assign_ids_in_first_appearance_order() {
        let trainset = TrainSet::build(&ratings(), RatingScale::default());
        assert_eq!(2, trainset.n_users());
        assert_eq!(2, trainset.n_items());
        assert_eq!(Ok(0), trainset.to_inner_user("u7"));
        assert_eq!(Ok(1), trainset.to_inner_user("u2"));
        assert_eq!(Ok(1), trainset.to_inner_item("i9"));
        assert_eq!(Ok("i9"), trainset.to_raw_item(1));
        assert_eq!(Ok("u2"), trainset.to_raw_user(1));
    }

    #[test]
    fn should_keep_last_rating_of_duplicates() {
        let trainset = TrainSet::build(&ratings(), RatingScale::default());
        assert_eq!(3, trainset.n_ratings());
        assert_eq!(Ok(&[(0, 1.0), (1, 5.0)][..]), trainset.user_profile(0));
        assert_eq!(&[(0, 1.0), (1, 2.0)][..], trainset.item_ratings(0));
        assert!(((1.0 + 5.0 + 2.0) / 3.0 - trainset.global_mean()).abs() < f64::EPSILON);
    }

    #[test]
    fn should_fail_on_unknown_ids() {
        let trainset = TrainSet::build(&ratings(), RatingScale::default());
        assert_eq!(
            Err(RecommendError::UnknownUser("nobody".to_string())),
            trainset.to_inner_user("nobody")
        );
        assert_eq!(
            Err(RecommendError::UnknownItem("i1".to_string())),
            trainset.to_inner_item("i1")
        );
        assert!(trainset.user_profile(2).is_err());
        assert!(trainset.to_raw_item(2).is_err());
    }

    #[test]
    fn should_clip_to_rating_scale() {
        let scale = RatingScale::new(1.0, 5.0);
        assert_eq!(5.0, scale.clip(6.2));
        assert_eq!(1.0, scale.clip(-0.3));
        assert_eq!(3.5, scale.clip(3.5));
    }
}

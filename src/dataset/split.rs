use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::dataset::DatasetError;
use crate::io::RawRating;

/// Shuffles `ratings` with a seeded rng and moves `ceil(test_size * len)` of them
/// into the test part. Returns `(train, test)`.
pub fn train_test_split(
    ratings: &[RawRating],
    test_size: f64,
    seed: u64,
) -> Result<(Vec<RawRating>, Vec<RawRating>), DatasetError> {
    if !(0.0..1.0).contains(&test_size) {
        return Err(DatasetError::InvalidSplit(format!(
            "test_size must be in [0, 1), got {}",
            test_size
        )));
    }
    let mut shuffled = ratings.to_vec();
    shuffled.shuffle(&mut Pcg64::seed_from_u64(seed));

    let qty_test = (test_size * shuffled.len() as f64).ceil() as usize;
    let train = shuffled.split_off(qty_test);
    Ok((train, shuffled))
}

/// K-fold cross-validation iterator over a seeded shuffle of the ratings.
pub struct KFold {
    n_splits: usize,
    seed: u64,
}

impl KFold {
    pub fn new(n_splits: usize, seed: u64) -> Result<KFold, DatasetError> {
        if n_splits < 2 {
            return Err(DatasetError::InvalidSplit(format!(
                "need at least 2 folds, got {}",
                n_splits
            )));
        }
        Ok(KFold { n_splits, seed })
    }

    /// Returns the `(train, test)` pairs of every fold. Fold sizes differ by at most one.
    pub fn split(
        &self,
        ratings: &[RawRating],
    ) -> Result<Vec<(Vec<RawRating>, Vec<RawRating>)>, DatasetError> {
        if self.n_splits > ratings.len() {
            return Err(DatasetError::InvalidSplit(format!(
                "cannot make {} folds out of {} ratings",
                self.n_splits,
                ratings.len()
            )));
        }
        let mut shuffled = ratings.to_vec();
        shuffled.shuffle(&mut Pcg64::seed_from_u64(self.seed));

        let base_size = shuffled.len() / self.n_splits;
        let remainder = shuffled.len() % self.n_splits;

        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for fold in 0..self.n_splits {
            let stop = start + base_size + if fold < remainder { 1 } else { 0 };
            let test = shuffled[start..stop].to_vec();
            let train = shuffled[..start]
                .iter()
                .chain(shuffled[stop..].iter())
                .cloned()
                .collect();
            folds.push((train, test));
            start = stop;
        }
        Ok(folds)
    }
}

#[cfg(test)]
mod split_test {
    use super::*;

    fn ratings(qty: usize) -> Vec<RawRating> {
        (0..qty)
            .map(|i| {
                let rating = 1.0 + (i % 5) as f64;
                RawRating::new(&format!("u{}", i % 7), &format!("i{}", i), rating)
            })
            .collect()
    }

    #[test]
    fn should_split_with_ceiled_test_size() {
        let (train, test) = train_test_split(&ratings(11), 0.2, 1).unwrap();
        assert_eq!(3, test.len());
        assert_eq!(8, train.len());
    }

    #[test]
    fn should_split_reproducibly() {
        let data = ratings(50);
        let first = train_test_split(&data, 0.2, 42).unwrap();
        let second = train_test_split(&data, 0.2, 42).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn should_reject_invalid_test_size() {
        assert!(train_test_split(&ratings(10), 1.0, 1).is_err());
        assert!(train_test_split(&ratings(10), -0.1, 1).is_err());
    }

    #[test]
    fn should_cover_every_rating_exactly_once_across_folds() {
        let data = ratings(10);
        let folds = KFold::new(3, 7).unwrap().split(&data).unwrap();
        assert_eq!(3, folds.len());
        let fold_sizes: Vec<usize> = folds.iter().map(|(_, test)| test.len()).collect();
        assert_eq!(vec![4, 3, 3], fold_sizes);

        let mut tested: Vec<String> = folds
            .iter()
            .flat_map(|(_, test)| test.iter().map(|r| r.item.clone()))
            .collect();
        tested.sort();
        let mut expected: Vec<String> = data.iter().map(|r| r.item.clone()).collect();
        expected.sort();
        assert_eq!(expected, tested);

        for (train, test) in folds.iter() {
            assert_eq!(data.len(), train.len() + test.len());
        }
    }

    #[test]
    fn should_reject_degenerate_folds() {
        assert!(KFold::new(1, 0).is_err());
        assert!(KFold::new(5, 0).unwrap().split(&ratings(3)).is_err());
    }
}

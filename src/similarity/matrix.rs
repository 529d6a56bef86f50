use std::ops::Range;

use rayon::prelude::*;
use tracing::info;

use crate::dataset::TrainSet;
use crate::error::{RecommendError, Result};
use crate::io::{InnerId, Rating};
use crate::similarity::baseline::{BaselineEstimates, BaselineOptions};
use crate::similarity::{check_index, Mode, SimilarityMeasure, SimilarityProvider};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityOptions {
    pub measure: SimilarityMeasure,
    /// Pairs with fewer co-ratings than this have similarity zero.
    pub min_support: usize,
    /// Only used by `pearson_baseline`.
    pub shrinkage: f64,
    pub baseline: BaselineOptions,
}

impl Default for SimilarityOptions {
    fn default() -> Self {
        SimilarityOptions {
            measure: SimilarityMeasure::default(),
            min_support: 1,
            shrinkage: 100.0,
            baseline: BaselineOptions::default(),
        }
    }
}

/// Dense row-major similarities between all users, or between all items.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    mode: Mode,
    size: usize,
    values: Vec<f64>,
}

#[derive(Default)]
struct CoRatings {
    support: usize,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
    sum_squared_diff: f64,
}

impl CoRatings {
    fn add(&mut self, x: f64, y: f64) {
        self.support += 1;
        self.sum_x += x;
        self.sum_y += y;
        self.sum_xx += x * x;
        self.sum_yy += y * y;
        self.sum_xy += x * y;
        self.sum_squared_diff += (x - y) * (x - y);
    }

    fn similarity(&self, options: &SimilarityOptions) -> f64 {
        if self.support == 0 || self.support < options.min_support {
            return 0.0;
        }
        match options.measure {
            SimilarityMeasure::Cosine => cosine(self.sum_xy, self.sum_xx, self.sum_yy),
            SimilarityMeasure::Msd => 1.0 / (self.sum_squared_diff / self.support as f64 + 1.0),
            SimilarityMeasure::Pearson => {
                let n = self.support as f64;
                let numerator = n * self.sum_xy - self.sum_x * self.sum_y;
                let denominator = ((n * self.sum_xx - self.sum_x * self.sum_x)
                    * (n * self.sum_yy - self.sum_y * self.sum_y))
                    .sqrt();
                if denominator > 0.0 {
                    numerator / denominator
                } else {
                    0.0
                }
            }
            // values are already residuals against the baselines
            SimilarityMeasure::PearsonBaseline => {
                let shrunk = (self.support - 1) as f64;
                let correlation = cosine(self.sum_xy, self.sum_xx, self.sum_yy);
                correlation * shrunk / (shrunk + options.shrinkage)
            }
        }
    }
}

fn cosine(sum_xy: f64, sum_xx: f64, sum_yy: f64) -> f64 {
    let denominator = (sum_xx * sum_yy).sqrt();
    if denominator > 0.0 {
        sum_xy / denominator
    } else {
        0.0
    }
}

impl SimilarityMatrix {
    pub fn compute(
        trainset: &TrainSet,
        mode: Mode,
        options: &SimilarityOptions,
    ) -> SimilarityMatrix {
        let rows: Vec<Vec<(InnerId, Rating)>> = match options.measure {
            SimilarityMeasure::PearsonBaseline => {
                let baselines = BaselineEstimates::fit(trainset, &options.baseline);
                trainset
                    .rows(mode)
                    .iter()
                    .enumerate()
                    .map(|(subject, row)| {
                        let subject = subject as InnerId;
                        row.iter()
                            .map(|(other, rating)| {
                                let expected = match mode {
                                    Mode::UserBased => baselines.estimate(subject, *other),
                                    Mode::ItemBased => baselines.estimate(*other, subject),
                                };
                                (*other, rating - expected)
                            })
                            .collect()
                    })
                    .collect()
            }
            _ => trainset.rows(mode).to_vec(),
        };

        let size = rows.len();
        let width = match mode {
            Mode::UserBased => trainset.n_items(),
            Mode::ItemBased => trainset.n_users(),
        };

        let matrix_rows: Vec<Vec<f64>> = (0..size)
            .into_par_iter()
            .map(|subject| {
                let mut dense = vec![f64::NAN; width];
                for (other, value) in rows[subject].iter() {
                    dense[*other as usize] = *value;
                }
                rows.iter()
                    .enumerate()
                    .map(|(candidate, candidate_row)| {
                        if candidate == subject {
                            return 1.0;
                        }
                        let mut co_ratings = CoRatings::default();
                        for (other, y) in candidate_row.iter() {
                            let x = dense[*other as usize];
                            if !x.is_nan() {
                                co_ratings.add(x, *y);
                            }
                        }
                        co_ratings.similarity(options)
                    })
                    .collect()
            })
            .collect();

        info!(%mode, measure = %options.measure, size, "computed similarity matrix");

        SimilarityMatrix {
            mode,
            size,
            values: matrix_rows.concat(),
        }
    }

    /// Wraps precomputed similarities; `None` unless `rows` is square.
    pub fn from_rows(mode: Mode, rows: Vec<Vec<f64>>) -> Option<SimilarityMatrix> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return None;
        }
        Some(SimilarityMatrix {
            mode,
            size,
            values: rows.concat(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl SimilarityProvider for SimilarityMatrix {
    fn candidates(&self, mode: Mode) -> Result<Range<InnerId>> {
        if mode != self.mode {
            return Err(RecommendError::ModeUnavailable(mode));
        }
        Ok(0..self.size as InnerId)
    }

    fn similarity(&self, subject: InnerId, other: InnerId, mode: Mode) -> Result<f64> {
        let range = self.candidates(mode)?;
        check_index(&range, subject, mode)?;
        check_index(&range, other, mode)?;
        Ok(self.values[subject as usize * self.size + other as usize])
    }
}

#[cfg(test)]
mod matrix_test {
    use float_cmp::approx_eq;

    use super::*;
    use crate::dataset::RatingScale;
    use crate::io::RawRating;

    fn trainset() -> TrainSet {
        let ratings = vec![
            RawRating::new("u0", "a", 5.0),
            RawRating::new("u0", "b", 3.0),
            RawRating::new("u0", "c", 4.0),
            RawRating::new("u1", "a", 4.0),
            RawRating::new("u1", "b", 2.0),
            RawRating::new("u2", "c", 1.0),
        ];
        TrainSet::build(&ratings, RatingScale::default())
    }

    fn options(measure: SimilarityMeasure) -> SimilarityOptions {
        SimilarityOptions {
            measure,
            ..SimilarityOptions::default()
        }
    }

    fn compute(mode: Mode, measure: SimilarityMeasure) -> SimilarityMatrix {
        SimilarityMatrix::compute(&trainset(), mode, &options(measure))
    }

    #[test]
    fn should_compute_cosine_between_users() {
        let matrix = compute(Mode::UserBased, SimilarityMeasure::Cosine);
        assert_eq!(3, matrix.size());
        // u0 and u1 share items a and b: (5*4 + 3*2) / sqrt((25 + 9) * (16 + 4))
        let expected = 26.0 / (34.0_f64 * 20.0).sqrt();
        let forward = matrix.similarity(0, 1, Mode::UserBased).unwrap();
        let backward = matrix.similarity(1, 0, Mode::UserBased).unwrap();
        assert!(approx_eq!(f64, expected, forward, ulps = 4));
        assert!(approx_eq!(f64, expected, backward, ulps = 4));
        // u1 and u2 have nothing in common
        assert_eq!(0.0, matrix.similarity(1, 2, Mode::UserBased).unwrap());
        assert_eq!(1.0, matrix.similarity(2, 2, Mode::UserBased).unwrap());
    }

    #[test]
    fn should_compute_msd_between_items() {
        let matrix = compute(Mode::ItemBased, SimilarityMeasure::Msd);
        // items a and b are co-rated by u0 (5, 3) and u1 (4, 2): msd = 4
        let similarity = matrix.similarity(0, 1, Mode::ItemBased).unwrap();
        assert!(approx_eq!(f64, 0.2, similarity, ulps = 4));
    }

    #[test]
    fn should_compute_pearson_between_items() {
        let matrix = compute(Mode::ItemBased, SimilarityMeasure::Pearson);
        // a = (5, 4) and b = (3, 2) move together perfectly
        let similarity = matrix.similarity(0, 1, Mode::ItemBased).unwrap();
        assert!(approx_eq!(f64, 1.0, similarity, epsilon = 1e-12));
        // a and c share a single rater, no variance
        assert_eq!(0.0, matrix.similarity(0, 2, Mode::ItemBased).unwrap());
    }

    #[test]
    fn should_shrink_pearson_baseline_with_low_support() {
        let shrunk = compute(Mode::UserBased, SimilarityMeasure::PearsonBaseline);
        let unshrunk = SimilarityMatrix::compute(
            &trainset(),
            Mode::UserBased,
            &SimilarityOptions {
                measure: SimilarityMeasure::PearsonBaseline,
                shrinkage: 0.0,
                ..SimilarityOptions::default()
            },
        );
        let shrunk_sim = shrunk.similarity(0, 1, Mode::UserBased).unwrap();
        let unshrunk_sim = unshrunk.similarity(0, 1, Mode::UserBased).unwrap();
        // support is 2, so the shrink factor is 1 / (1 + 100)
        assert!(approx_eq!(f64, unshrunk_sim / 101.0, shrunk_sim, epsilon = 1e-12));
    }

    #[test]
    fn should_zero_pairs_below_min_support() {
        let matrix = SimilarityMatrix::compute(
            &trainset(),
            Mode::UserBased,
            &SimilarityOptions {
                measure: SimilarityMeasure::Cosine,
                min_support: 3,
                ..SimilarityOptions::default()
            },
        );
        assert_eq!(0.0, matrix.similarity(0, 1, Mode::UserBased).unwrap());
    }

    #[test]
    fn should_reject_unknown_indices_and_other_mode() {
        let matrix =
            SimilarityMatrix::from_rows(Mode::ItemBased, vec![vec![1.0, 0.5], vec![0.4, 1.0]])
                .unwrap();
        assert_eq!(Ok(0.4), matrix.similarity(1, 0, Mode::ItemBased));
        assert_eq!(
            Err(RecommendError::InvalidIndex { index: 2, mode: Mode::ItemBased }),
            matrix.similarity(2, 0, Mode::ItemBased)
        );
        assert_eq!(
            Err(RecommendError::ModeUnavailable(Mode::UserBased)),
            matrix.candidates(Mode::UserBased)
        );
        let ragged = vec![vec![1.0], vec![0.4, 1.0]];
        assert!(SimilarityMatrix::from_rows(Mode::ItemBased, ragged).is_none());
    }
}

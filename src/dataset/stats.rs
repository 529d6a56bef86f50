use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use num_format::{Locale, ToFormattedString};
use rayon::prelude::*;
use tdigest::TDigest;
use tracing::info;

use crate::io::RawRating;

pub struct RatingDataStats {
    pub descriptive_name: String,
    pub qty_ratings: usize,
    pub qty_unique_users: usize,
    pub qty_unique_items: usize,
    pub sparsity: f64,
    pub mean_rating: f64,
    pub min_rating: f64,
    pub max_rating: f64,
    pub min_time_date_time: Option<DateTime<Utc>>,
    pub max_time_date_time: Option<DateTime<Utc>>,
    pub ratings_per_user_p50: f64,
    pub ratings_per_user_p90: f64,
    pub ratings_per_user_p99: f64,
}

pub fn determine_rating_data_statistics(
    descriptive_name: &str,
    ratings: &[RawRating],
) -> RatingDataStats {
    let qty_ratings = ratings.len();

    let mut user_ids: Vec<&str> = ratings.par_iter().map(|r| r.user.as_str()).collect();
    user_ids.par_sort_unstable();
    user_ids.dedup();
    let qty_unique_users = user_ids.len();

    let mut item_ids: Vec<&str> = ratings.par_iter().map(|r| r.item.as_str()).collect();
    item_ids.par_sort_unstable();
    item_ids.dedup();
    let qty_unique_items = item_ids.len();

    let cells = qty_unique_users as f64 * qty_unique_items as f64;
    let sparsity = if cells > 0.0 {
        1.0 - qty_ratings as f64 / cells
    } else {
        0.0
    };

    let mean_rating = if qty_ratings > 0 {
        ratings.par_iter().map(|r| r.rating).sum::<f64>() / qty_ratings as f64
    } else {
        0.0
    };
    let min_rating = ratings
        .par_iter()
        .map(|r| r.rating)
        .reduce(|| f64::INFINITY, f64::min);
    let max_rating = ratings
        .par_iter()
        .map(|r| r.rating)
        .reduce(|| f64::NEG_INFINITY, f64::max);

    let min_time = ratings.par_iter().filter_map(|r| r.timestamp).min();
    let max_time = ratings.par_iter().filter_map(|r| r.timestamp).max();
    let min_time_date_time = min_time.and_then(|secs| DateTime::from_timestamp(secs, 0));
    let max_time_date_time = max_time.and_then(|secs| DateTime::from_timestamp(secs, 0));

    let mut ratings_per_user: HashMap<&str, usize> = HashMap::with_capacity(qty_unique_users);
    for rating in ratings.iter() {
        *ratings_per_user.entry(rating.user.as_str()).or_insert(0) += 1;
    }
    let counts: Vec<f64> = ratings_per_user.values().map(|qty| *qty as f64).collect();
    let (ratings_per_user_p50, ratings_per_user_p90, ratings_per_user_p99) = if counts.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        let digest = TDigest::new_with_size(100).merge_unsorted(counts);
        (
            digest.estimate_quantile(0.50),
            digest.estimate_quantile(0.90),
            digest.estimate_quantile(0.99),
        )
    };

    info!("Loaded {}", descriptive_name);
    info!("\tRatings: {}", qty_ratings.to_formatted_string(&Locale::en));
    info!("\tUsers: {}", qty_unique_users.to_formatted_string(&Locale::en));
    info!("\tItems: {}", qty_unique_items.to_formatted_string(&Locale::en));
    info!("\tSparsity: {:.4}", sparsity);
    info!("\tRatings: mean={:.3} min={} max={}", mean_rating, min_rating, max_rating);
    if let (Some(first), Some(last)) = (min_time_date_time, max_time_date_time) {
        info!("\tSpan: {} / {}", first, last);
    }
    info!(
        "\tRatings per user percentiles: p50={:.0} p90={:.0} p99={:.0}",
        ratings_per_user_p50, ratings_per_user_p90, ratings_per_user_p99
    );

    RatingDataStats {
        descriptive_name: descriptive_name.to_string(),
        qty_ratings,
        qty_unique_users,
        qty_unique_items,
        sparsity,
        mean_rating,
        min_rating,
        max_rating,
        min_time_date_time,
        max_time_date_time,
        ratings_per_user_p50,
        ratings_per_user_p90,
        ratings_per_user_p99,
    }
}

#[cfg(test)]
mod stats_test {
    use super::*;

    #[test]
    fn should_describe_ratings() {
        let mut ratings = vec![
            RawRating::new("a", "x", 4.0),
            RawRating::new("a", "y", 2.0),
            RawRating::new("b", "x", 5.0),
        ];
        ratings[0].timestamp = Some(874965758);
        ratings[2].timestamp = Some(874965478);

        let stats = determine_rating_data_statistics("unittest", &ratings);
        assert_eq!(3, stats.qty_ratings);
        assert_eq!(2, stats.qty_unique_users);
        assert_eq!(2, stats.qty_unique_items);
        assert!((0.25 - stats.sparsity).abs() < f64::EPSILON);
        assert!((11.0 / 3.0 - stats.mean_rating).abs() < 1e-12);
        assert_eq!(2.0, stats.min_rating);
        assert_eq!(5.0, stats.max_rating);
        assert_eq!(874965478, stats.min_time_date_time.unwrap().timestamp());
        assert_eq!(874965758, stats.max_time_date_time.unwrap().timestamp());
    }
}

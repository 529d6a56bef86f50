#[macro_use]
extern crate bencher;
extern crate rand;
extern crate rand_pcg;
extern crate sonata;

use bencher::Bencher;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use sonata::dataset::{RatingScale, TrainSet};
use sonata::io::RawRating;
use sonata::knn::KnnRecommender;
use sonata::similarity::{Mode, SimilarityMatrix, SimilarityMeasure, SimilarityOptions};

benchmark_group!(benches, bench_item_based, bench_user_based, bench_similarity_matrix);
benchmark_main!(benches);

const NUM_USERS: usize = 300;
const NUM_ITEMS: usize = 500;
const MAX_RATINGS_PER_USER: usize = 60;
const NEIGHBORHOOD_SIZE_K: usize = 40;
const NUM_ITEMS_TO_RECOMMEND: usize = 20;

fn synthetic_trainset() -> TrainSet {
    let mut rng = Pcg64::seed_from_u64(42);
    let mut ratings = Vec::new();
    for user in 0..NUM_USERS {
        let num_ratings = rng.gen_range(1..MAX_RATINGS_PER_USER);
        for _ in 0..num_ratings {
            let item = rng.gen_range(0..NUM_ITEMS);
            let rating = rng.gen_range(1..=5) as f64;
            ratings.push(RawRating::new(&user.to_string(), &item.to_string(), rating));
        }
    }
    TrainSet::build(&ratings, RatingScale::default())
}

fn cosine() -> SimilarityOptions {
    SimilarityOptions {
        measure: SimilarityMeasure::Cosine,
        ..SimilarityOptions::default()
    }
}

fn bench_mode(bench: &mut Bencher, mode: Mode) {
    let trainset = synthetic_trainset();
    let similarities = SimilarityMatrix::compute(&trainset, mode, &cosine());
    let recommender = KnnRecommender::new(&trainset, &similarities, mode);
    let users: Vec<String> = (0..NUM_USERS).step_by(7).map(|user| user.to_string()).collect();

    bench.iter(|| {
        for user in users.iter() {
            bencher::black_box(
                recommender
                    .recommend_inner(user, NEIGHBORHOOD_SIZE_K, NUM_ITEMS_TO_RECOMMEND)
                    .ok(),
            );
        }
    });
}

fn bench_item_based(bench: &mut Bencher) {
    bench_mode(bench, Mode::ItemBased);
}

fn bench_user_based(bench: &mut Bencher) {
    bench_mode(bench, Mode::UserBased);
}

fn bench_similarity_matrix(bench: &mut Bencher) {
    let trainset = synthetic_trainset();
    let options = cosine();
    bench.iter(|| {
        bencher::black_box(SimilarityMatrix::compute(&trainset, Mode::UserBased, &options));
    });
}

use anyhow::Context;

use sonata::config::AppConfig;
use sonata::dataset::split::train_test_split;
use sonata::dataset::stats::determine_rating_data_statistics;
use sonata::dataset::TrainSet;
use sonata::evaluation::evaluate;
use sonata::io;
use sonata::knn::KnnRecommender;
use sonata::logging::init_logging;
use sonata::similarity::SimilarityMatrix;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let config = AppConfig::new(&config_path)?;
    init_logging(&config.log.level);

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.evaluation.num_workers)
        .build_global()?;

    let ratings = io::read_ratings(
        &config.data.ratings_path,
        config.data.separator,
        config.data.has_header,
    )
    .with_context(|| format!("Loading ratings from {} failed", config.data.ratings_path))?;
    let (training_ratings, test_ratings) =
        train_test_split(&ratings, config.data.test_size, config.data.random_seed)?;
    determine_rating_data_statistics("training split", &training_ratings);
    determine_rating_data_statistics("test split", &test_ratings);

    let trainset = TrainSet::build(&training_ratings, config.data.rating_scale);
    let similarities =
        SimilarityMatrix::compute(&trainset, config.model.mode, &config.model.similarity);
    let recommender = KnnRecommender::new(&trainset, &similarities, config.model.mode);

    let evaluation = evaluate(
        &recommender,
        &test_ratings,
        config.model.neighborhood_size_k,
        config.model.num_items_to_recommend,
    )?;

    println!("===============================================================");
    println!("===               START EVALUATING TEST SPLIT              ====");
    println!("===============================================================");
    println!("{}", evaluation.reporter.get_name());
    println!("{}", evaluation.reporter.result_line());
    println!("Qty test users evaluated: {}", evaluation.qty_users_evaluated);
    println!("Qty test users unknown to training: {}", evaluation.qty_users_skipped);
    println!("Qty test items unknown to training: {}", evaluation.qty_unresolvable_items);
    println!("Recommendation latency");
    println!("p90 (microseconds): {}", evaluation.latencies.get_percentile_in_micros(90.0));
    println!("p95 (microseconds): {}", evaluation.latencies.get_percentile_in_micros(95.0));
    println!("p99.5 (microseconds): {}", evaluation.latencies.get_percentile_in_micros(99.5));
    Ok(())
}

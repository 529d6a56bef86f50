use anyhow::Context;
use hashbrown::HashMap;

use sonata::config::AppConfig;
use sonata::dataset::split::train_test_split;
use sonata::dataset::stats::determine_rating_data_statistics;
use sonata::dataset::{IndexAdapter, TrainSet};
use sonata::io;
use sonata::knn::KnnRecommender;
use sonata::logging::init_logging;
use sonata::similarity::SimilarityMatrix;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let raw_user_id = std::env::args()
        .nth(2)
        .context("User id not specified!")?;
    let config = AppConfig::new(&config_path)?;
    init_logging(&config.log.level);

    let ratings = io::read_ratings(
        &config.data.ratings_path,
        config.data.separator,
        config.data.has_header,
    )
    .with_context(|| format!("Loading ratings from {} failed", config.data.ratings_path))?;
    determine_rating_data_statistics(&config.data.ratings_path, &ratings);

    // Recommend from the training part only, the held-out part is for the evaluator.
    let (training_ratings, _test_ratings) =
        train_test_split(&ratings, config.data.test_size, config.data.random_seed)?;
    let trainset = TrainSet::build(&training_ratings, config.data.rating_scale);
    let similarities =
        SimilarityMatrix::compute(&trainset, config.model.mode, &config.model.similarity);
    let recommender = KnnRecommender::new(&trainset, &similarities, config.model.mode);

    let item_names = match &config.data.item_names_path {
        Some(item_names_path) => io::read_item_names(item_names_path)
            .with_context(|| format!("Loading item names from {} failed", item_names_path))?,
        None => HashMap::new(),
    };

    let recommendations = recommender.recommend_scored(
        &raw_user_id,
        config.model.neighborhood_size_k,
        config.model.num_items_to_recommend,
    )?;
    if recommendations.is_empty() {
        println!("No candidate items found for user {}", raw_user_id);
    }
    for scored in recommendations.iter() {
        let raw_item_id = trainset.to_raw_item(scored.id)?;
        let title = item_names.get(raw_item_id).map(String::as_str).unwrap_or("");
        println!("{}\t{:.4}\t{}", raw_item_id, scored.score, title);
    }
    Ok(())
}

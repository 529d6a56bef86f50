use anyhow::Context;
use indicatif::ProgressBar;

use sonata::config::AppConfig;
use sonata::dataset::split::KFold;
use sonata::dataset::TrainSet;
use sonata::io;
use sonata::knn::KnnPredictor;
use sonata::logging::init_logging;
use sonata::metrics::accuracy::{mae, rmse};
use sonata::similarity::baseline::BaselineEstimates;
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

    let folds =
        KFold::new(config.evaluation.num_folds, config.data.random_seed)?.split(&ratings)?;

    let progress_bar = ProgressBar::new(folds.len() as u64);
    let mut fold_scores = Vec::with_capacity(folds.len());
    for (training_ratings, test_ratings) in folds.iter() {
        let trainset = TrainSet::build(training_ratings, config.data.rating_scale);
        let similarities =
            SimilarityMatrix::compute(&trainset, config.model.mode, &config.model.similarity);
        let baselines = if config.model.knn_baseline {
            Some(BaselineEstimates::fit(&trainset, &config.model.similarity.baseline))
        } else {
            None
        };
        let mut predictor = KnnPredictor::new(
            &trainset,
            &similarities,
            config.model.mode,
            config.model.neighborhood_size_k,
            config.model.min_k,
        );
        if let Some(baselines) = baselines.as_ref() {
            predictor = predictor.with_baselines(baselines);
        }
        let predictions = predictor.test(test_ratings)?;
        fold_scores.push((rmse(&predictions)?, mae(&predictions)?));
        progress_bar.inc(1);
    }
    progress_bar.finish();

    println!("Fold,RMSE,MAE");
    for (fold, (fold_rmse, fold_mae)) in fold_scores.iter().enumerate() {
        println!("{},{:.4},{:.4}", fold + 1, fold_rmse, fold_mae);
    }
    let qty_folds = fold_scores.len() as f64;
    let mean_rmse =
        fold_scores.iter().map(|(fold_rmse, _)| fold_rmse).sum::<f64>() / qty_folds;
    let mean_mae = fold_scores.iter().map(|(_, fold_mae)| fold_mae).sum::<f64>() / qty_folds;
    println!(
        "{}-fold cross validation: mean RMSE {:.4}, mean MAE {:.4}",
        config.evaluation.num_folds, mean_rmse, mean_mae
    );
    Ok(())
}

use std::ffi::OsStr;
use std::fs::File;

use justconfig::error::ConfigError;
use justconfig::item::ValueExtractor;
use justconfig::processors::Trim;
use justconfig::sources::env::Env;
use justconfig::sources::text::ConfigText;
use justconfig::ConfPath;
use justconfig::Config;
use thiserror::Error;

use crate::config_processors::ValueCleanup;
use crate::dataset::RatingScale;
use crate::similarity::{Mode, SimilarityMeasure, SimilarityOptions};

// Set some default values
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_SEPARATOR: u8 = b'\t';
const DEFAULT_RATING_SCALE_MIN: f64 = 1.0;
const DEFAULT_RATING_SCALE_MAX: f64 = 5.0;
const DEFAULT_TEST_SIZE: f64 = 0.2;
const DEFAULT_RANDOM_SEED: u64 = 1;
const DEFAULT_MIN_SUPPORT: usize = 1;
const DEFAULT_SHRINKAGE: f64 = 100.0;
const DEFAULT_NEIGHBORHOOD_SIZE_K: usize = 8;
const DEFAULT_NUM_ITEMS_TO_RECOMMEND: usize = 30;
const DEFAULT_MIN_K: usize = 1;
const DEFAULT_NUM_FOLDS: usize = 4;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl From<ConfigError> for SettingsError {
    fn from(error: ConfigError) -> Self {
        SettingsError::Config(error.to_string())
    }
}

pub struct AppConfig {
    pub log: LogConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
    pub evaluation: EvaluationConfig,
}

pub struct LogConfig {
    pub level: String,
}

pub struct DataConfig {
    pub ratings_path: String,
    pub item_names_path: Option<String>,
    pub separator: u8,
    pub has_header: bool,
    pub rating_scale: RatingScale,
    pub test_size: f64,
    pub random_seed: u64,
}

pub struct ModelConfig {
    pub mode: Mode,
    pub similarity: SimilarityOptions,
    pub neighborhood_size_k: usize,
    pub num_items_to_recommend: usize,
    pub min_k: usize,
    /// Centre neighbor ratings on baseline estimates when predicting ratings.
    pub knn_baseline: bool,
}

pub struct EvaluationConfig {
    pub num_workers: usize,
    pub num_folds: usize,
}

impl AppConfig {
    pub fn new(config_path: &str) -> Result<AppConfig, SettingsError> {
        // Initialize config object
        let mut conf = Config::default();

        // Check if there is a config file
        if let Ok(config_file) = File::open(config_path) {
            let config_text = ConfigText::new(config_file, config_path)
                .map_err(|e| SettingsError::Config(format!("{}: {}", config_path, e)))?;
            conf.add_source(config_text);
        }

        // Define config params from environment variables
        let config_env = Env::new(&[
            (
                ConfPath::from(&["data", "ratings_path"]),
                OsStr::new("RATINGS_DATA"),
            ),
            (
                ConfPath::from(&["evaluation", "num_workers"]),
                OsStr::new("NUM_WORKERS"),
            ),
        ]);
        conf.add_source(config_env);

        // Parse into custom config struct
        AppConfig::parse(conf)
    }

    pub fn parse(conf: Config) -> Result<AppConfig, SettingsError> {
        Ok(AppConfig {
            log: LogConfig::parse(&conf, ConfPath::from(&["log"])),
            data: DataConfig::parse(&conf, ConfPath::from(&["data"]))?,
            model: ModelConfig::parse(&conf, ConfPath::from(&["model"]))?,
            evaluation: EvaluationConfig::parse(&conf, ConfPath::from(&["evaluation"])),
        })
    }
}

impl LogConfig {
    fn parse(conf: &Config, path: ConfPath) -> LogConfig {
        LogConfig {
            level: conf
                .get(path.push("level"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from(DEFAULT_LOG_LEVEL)),
        }
    }
}

impl DataConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<DataConfig, SettingsError> {
        let separator: Result<String, ConfigError> = conf
            .get(path.push("separator"))
            .unquote()
            .unescape()
            .value();
        let separator = match separator {
            Ok(separator) => parse_separator(&separator)?,
            Err(_) => DEFAULT_SEPARATOR,
        };

        let rating_scale = RatingScale::new(
            conf.get(path.push("rating_scale_min"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_RATING_SCALE_MIN),
            conf.get(path.push("rating_scale_max"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_RATING_SCALE_MAX),
        );
        if rating_scale.min > rating_scale.max {
            return Err(SettingsError::InvalidValue {
                key: "data.rating_scale_min".to_string(),
                reason: format!("{} exceeds the maximum {}", rating_scale.min, rating_scale.max),
            });
        }

        Ok(DataConfig {
            ratings_path: conf.get(path.push("ratings_path")).unquote().value()?,
            item_names_path: conf.get(path.push("item_names_path")).unquote().value().ok(),
            separator,
            has_header: conf
                .get(path.push("has_header"))
                .trim()
                .value()
                .unwrap_or(false),
            rating_scale,
            test_size: conf
                .get(path.push("test_size"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_TEST_SIZE),
            random_seed: conf
                .get(path.push("random_seed"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_RANDOM_SEED),
        })
    }
}

fn parse_separator(separator: &str) -> Result<u8, SettingsError> {
    match separator.as_bytes() {
        [byte] => Ok(*byte),
        _ => Err(SettingsError::InvalidValue {
            key: "data.separator".to_string(),
            reason: format!("expected a single byte, got {:?}", separator),
        }),
    }
}

impl ModelConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<ModelConfig, SettingsError> {
        let measure: Result<String, ConfigError> =
            conf.get(path.push("similarity")).unquote().value();
        let measure = match measure {
            Ok(name) => name
                .parse::<SimilarityMeasure>()
                .map_err(|reason| SettingsError::InvalidValue {
                    key: "model.similarity".to_string(),
                    reason,
                })?,
            Err(_) => SimilarityMeasure::default(),
        };

        Ok(ModelConfig {
            mode: Mode::from_user_based(
                conf.get(path.push("user_based"))
                    .trim()
                    .value()
                    .unwrap_or(false),
            ),
            similarity: SimilarityOptions {
                measure,
                min_support: conf
                    .get(path.push("min_support"))
                    .trim()
                    .value()
                    .unwrap_or(DEFAULT_MIN_SUPPORT),
                shrinkage: conf
                    .get(path.push("shrinkage"))
                    .trim()
                    .value()
                    .unwrap_or(DEFAULT_SHRINKAGE),
                ..SimilarityOptions::default()
            },
            neighborhood_size_k: conf
                .get(path.push("neighborhood_size_k"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_NEIGHBORHOOD_SIZE_K),
            num_items_to_recommend: conf
                .get(path.push("num_items_to_recommend"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_NUM_ITEMS_TO_RECOMMEND),
            min_k: conf
                .get(path.push("min_k"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_MIN_K),
            knn_baseline: conf
                .get(path.push("knn_baseline"))
                .trim()
                .value()
                .unwrap_or(true),
        })
    }
}

impl EvaluationConfig {
    fn parse(conf: &Config, path: ConfPath) -> EvaluationConfig {
        EvaluationConfig {
            num_workers: conf
                .get(path.push("num_workers"))
                .trim()
                .value()
                // Detect number of CPUs
                .unwrap_or_else(|_| {
                    sys_info::cpu_num().map(|qty| qty as usize).unwrap_or(1)
                })
                .max(1),
            num_folds: conf
                .get(path.push("num_folds"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_NUM_FOLDS),
        }
    }
}

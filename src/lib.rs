pub mod config;
pub mod config_processors;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod io;
pub mod knn;
pub mod logging;
pub mod metrics;
pub mod similarity;
pub mod stopwatch;

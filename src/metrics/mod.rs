use hashbrown::HashSet;

use crate::error::Result;
use crate::io::InnerId;

pub mod accuracy;
pub mod coverage;
pub mod evaluation_reporter;
pub mod f1score;
pub mod precision;
pub mod recall;

/// A top-n quality measure accumulated over users.
pub trait RecommendationMetric {
    /// Adds one user's recommendations and the items they are known to like.
    fn add(&mut self, recommendations: &[InnerId], liked_items: &HashSet<InnerId>);
    fn result(&self) -> Result<f64>;
    fn get_name(&self) -> String;
}

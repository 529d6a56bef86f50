use crate::dataset::TrainSet;
use crate::io::{InnerId, Rating};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineOptions {
    pub n_epochs: usize,
    pub reg_u: f64,
    pub reg_i: f64,
}

impl Default for BaselineOptions {
    fn default() -> Self {
        BaselineOptions {
            n_epochs: 10,
            reg_u: 15.0,
            reg_i: 10.0,
        }
    }
}

/// User and item biases around the global mean: `b_ui = mu + b_u + b_i`.
#[derive(Debug, Clone)]
pub struct BaselineEstimates {
    global_mean: f64,
    user_biases: Vec<f64>,
    item_biases: Vec<f64>,
}

impl BaselineEstimates {
    /// Alternating least squares, items first in each epoch.
    pub fn fit(trainset: &TrainSet, options: &BaselineOptions) -> BaselineEstimates {
        let global_mean = trainset.global_mean();
        let mut user_biases = vec![0.0; trainset.n_users()];
        let mut item_biases = vec![0.0; trainset.n_items()];

        for _epoch in 0..options.n_epochs {
            for (item, bias) in item_biases.iter_mut().enumerate() {
                let ratings = trainset.item_ratings(item as InnerId);
                let deviation: f64 = ratings
                    .iter()
                    .map(|(user, rating)| rating - global_mean - user_biases[*user as usize])
                    .sum();
                *bias = deviation / (options.reg_i + ratings.len() as f64);
            }
            for (user, bias) in user_biases.iter_mut().enumerate() {
                let ratings = trainset.user_ratings(user as InnerId);
                let deviation: f64 = ratings
                    .iter()
                    .map(|(item, rating)| rating - global_mean - item_biases[*item as usize])
                    .sum();
                *bias = deviation / (options.reg_u + ratings.len() as f64);
            }
        }

        BaselineEstimates {
            global_mean,
            user_biases,
            item_biases,
        }
    }

    pub fn estimate(&self, user: InnerId, item: InnerId) -> Rating {
        self.global_mean + self.user_biases[user as usize] + self.item_biases[item as usize]
    }
}

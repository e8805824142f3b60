//! Core traits shared by every learner

use crate::core::{Instance, Prediction, Result};
use crate::metrics::ConfusionCounts;
use crate::vector::NumericVector;

/// Points sampled during training, used to draw learning curves
/// (decision value paired with the true goal, every so many steps).
pub type LearningCurve = Vec<(f64, f64)>;

/// Dataset abstraction for loaded instance pools
pub trait Dataset: Send + Sync {
    /// Number of instances in the dataset
    fn len(&self) -> usize;

    /// Number of features (dimensionality)
    fn dim(&self) -> usize;

    /// Get a single instance by index
    ///
    /// # Panics
    /// Panics if index >= len()
    fn get_instance(&self, i: usize) -> Instance;

    /// Get all goals as a vector
    fn get_goals(&self) -> Vec<f64>;

    /// Collect the whole pool into a vector of instances
    fn to_pool(&self) -> Vec<Instance> {
        (0..self.len()).map(|i| self.get_instance(i)).collect()
    }

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A trainable binary classifier over ±1 goals
pub trait Classifier: Send + Sync {
    /// Fit the model to a pool of instances.
    ///
    /// `object_weights` assigns a relative importance to every instance; an
    /// empty slice means uniform weighting. Implementations append sampled
    /// (decision value, goal) pairs to `curve` while they train.
    fn learn(
        &mut self,
        pool: &[Instance],
        object_weights: &[f64],
        curve: &mut LearningCurve,
    ) -> Result<()>;

    /// Predict the class (+1 or -1) for a feature vector
    fn predict(&self, features: &NumericVector) -> f64;

    /// Sparsity- or structure-derived proxy for model size
    fn complexity(&self) -> usize;

    /// Predict a single instance, keeping the raw decision value
    fn predict_instance(&self, instance: &Instance) -> Prediction {
        let label = self.predict(&instance.features);
        Prediction::new(label, label)
    }

    /// Predict a batch of instances. Evaluations only read shared model
    /// state, so callers may split the batch across threads freely.
    fn predict_batch(&self, instances: &[Instance]) -> Vec<f64> {
        instances
            .iter()
            .map(|instance| self.predict(&instance.features))
            .collect()
    }

    /// Confusion counts of this model over a pool
    fn evaluate(&self, pool: &[Instance]) -> ConfusionCounts {
        let mut counts = ConfusionCounts::default();
        for instance in pool {
            counts.record(self.predict(&instance.features), instance.goal);
        }
        counts
    }

    /// Root mean squared error of predictions against goals
    fn rmse(&self, pool: &[Instance]) -> f64 {
        if pool.is_empty() {
            return 0.0;
        }
        let sum: f64 = pool
            .iter()
            .map(|instance| {
                let err = self.predict(&instance.features) - instance.goal;
                err * err
            })
            .sum();
        (sum / pool.len() as f64).sqrt()
    }
}

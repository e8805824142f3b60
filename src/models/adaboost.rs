//! AdaBoost over a clonable weak learner
//!
//! Rounds of: train a fresh copy of the prototype on the current object
//! weights, score its weighted error, fold it into the ensemble with
//! weight `0.5 ln((1 - err + n⁻¹) / (err + n⁻¹))`, then multiplicatively
//! reweight the pool toward the instances the new estimator got wrong.

use log::{debug, info};
use rand::distributions::{Distribution, WeightedIndex};

use crate::core::{Classifier, Instance, LearningCurve, MlError, Result};
use crate::metrics::Metric;
use crate::vector::NumericVector;

#[derive(Debug, Clone)]
pub struct AdaBoost<C: Classifier + Clone> {
    prototype: C,
    estimators: Vec<C>,
    alphas: Vec<f64>,
    max_estimators: usize,
    quality_metric: Metric,
    max_quality: f64,
    bagging_factor: Option<f64>,
}

impl<C: Classifier + Clone> AdaBoost<C> {
    pub fn new(prototype: C, max_estimators: usize) -> Self {
        Self {
            prototype,
            estimators: Vec::new(),
            alphas: Vec::new(),
            max_estimators,
            quality_metric: Metric::F1Score,
            max_quality: 0.98,
            bagging_factor: None,
        }
    }

    pub fn with_quality_target(mut self, metric: Metric, max_quality: f64) -> Self {
        self.quality_metric = metric;
        self.max_quality = max_quality;
        self
    }

    /// Train every round on a bootstrap sample of `factor * n` instances
    /// drawn proportionally to the current object weights
    pub fn with_bagging(mut self, factor: f64) -> Self {
        self.bagging_factor = Some(factor);
        self
    }

    pub fn estimator_count(&self) -> usize {
        self.estimators.len()
    }

    fn weighted_error(&self, estimator: &C, pool: &[Instance], weights: &[f64]) -> f64 {
        pool.iter()
            .zip(weights.iter())
            .filter(|(instance, _)| {
                estimator.predict(&instance.features) * instance.goal < 0.0
            })
            .map(|(_, &weight)| weight)
            .sum()
    }
}

impl<C: Classifier + Clone> Classifier for AdaBoost<C> {
    fn learn(
        &mut self,
        pool: &[Instance],
        object_weights: &[f64],
        curve: &mut LearningCurve,
    ) -> Result<()> {
        if pool.is_empty() {
            return Err(MlError::EmptyDataset);
        }
        self.estimators.clear();
        self.alphas.clear();

        let n = pool.len();
        let norm_factor = 1.0 / n as f64;
        let mut weights: Vec<f64> = if object_weights.is_empty() {
            vec![norm_factor; n]
        } else {
            object_weights.iter().map(|&w| w * norm_factor).collect()
        };

        let mut rng = rand::thread_rng();

        for round in 0..self.max_estimators {
            let mut estimator = self.prototype.clone();

            match self.bagging_factor {
                None => estimator.learn(pool, &weights, curve)?,
                Some(factor) => {
                    let bag_size = ((n as f64 * factor) as usize).max(1);
                    let sampler = WeightedIndex::new(weights.iter().map(|&w| w.max(1e-12)))
                        .map_err(|e| MlError::InvalidParameter(e.to_string()))?;
                    let mut bag_pool = Vec::with_capacity(bag_size);
                    let mut bag_weights = Vec::with_capacity(bag_size);
                    for _ in 0..bag_size {
                        let index = sampler.sample(&mut rng);
                        bag_pool.push(pool[index].clone());
                        bag_weights.push(weights[index]);
                    }
                    estimator.learn(&bag_pool, &bag_weights, curve)?;
                }
            }

            let error = self.weighted_error(&estimator, pool, &weights);
            let alpha = 0.5 * ((1.0 - error + norm_factor) / (error + norm_factor)).ln();
            debug!("round {round}: weighted error {error:.4}, estimator weight {alpha:.4}");

            // reweight toward the mistakes of the estimator just added
            let mut summary = 0.0;
            for (instance, weight) in pool.iter().zip(weights.iter_mut()) {
                let prediction = estimator.predict(&instance.features);
                *weight *= (-alpha * prediction * instance.goal).exp();
                summary += *weight;
            }
            for weight in weights.iter_mut() {
                *weight /= summary;
            }

            self.estimators.push(estimator);
            self.alphas.push(alpha);

            let quality = self.quality_metric.compute(&self.evaluate(pool));
            debug!("round {round}: ensemble quality {quality:.4}");
            if quality >= self.max_quality {
                break;
            }
        }

        info!(
            "adaboost trained: {} estimators, complexity {}",
            self.estimators.len(),
            self.complexity()
        );
        Ok(())
    }

    fn predict(&self, features: &NumericVector) -> f64 {
        let vote: f64 = self
            .estimators
            .iter()
            .zip(self.alphas.iter())
            .map(|(estimator, &alpha)| alpha * estimator.predict(features))
            .sum();
        if vote > 0.0 {
            1.0
        } else {
            -1.0
        }
    }

    fn complexity(&self) -> usize {
        self.estimators
            .iter()
            .map(|estimator| estimator.complexity())
            .sum()
    }
}

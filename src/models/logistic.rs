//! Logistic regression via stochastic gradient descent
//!
//! The weight vector is a [`NumericVector`], so each stochastic step only
//! touches the positions where the sampled instance has non-null features
//! (`update` returns the squared weight movement, which doubles as the
//! convergence diagnostic).

use log::{debug, info};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::core::{Classifier, Instance, LearningCurve, MlError, Result};
use crate::models::activation::Activation;
use crate::models::loss::Loss;
use crate::vector::reduce::merge_reduce;
use crate::vector::NumericVector;

/// Stopping tolerance on both the smoothed loss movement and the
/// per-step weight movement
const CONVERGENCE_EPSILON: f64 = 1e-5;

/// Every this many stochastic steps a point is appended to the
/// learning curve
const CURVE_SAMPLE_PERIOD: usize = 1_000;

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    weights: NumericVector,
    threshold: f64,
    learning_rate: f64,
    min_epochs: usize,
    max_epochs: usize,
    loss: Loss,
    trained: bool,
}

impl LogisticRegression {
    /// Untrained model over `features_count` features
    pub fn new(features_count: usize, min_epochs: usize, max_epochs: usize) -> Self {
        Self {
            weights: NumericVector::new(features_count),
            threshold: 0.0,
            learning_rate: 0.01,
            min_epochs,
            max_epochs,
            loss: Loss::Logistic,
            trained: false,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Rebuild a trained model from persisted parts
    pub fn restore(weights: NumericVector, threshold: f64, learning_rate: f64) -> Self {
        Self {
            weights,
            threshold,
            learning_rate,
            min_epochs: 0,
            max_epochs: 0,
            loss: Loss::Logistic,
            trained: true,
        }
    }

    pub fn weights(&self) -> &NumericVector {
        &self.weights
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Raw decision value `w · x - threshold`; absent positions on either
    /// side contribute zero, so feature spaces of differing width stay
    /// comparable.
    pub fn decision(&self, features: &NumericVector) -> f64 {
        let product = merge_reduce(features, &self.weights, 0.0, |acc, feature, weight| {
            *acc += feature * weight
        });
        product - self.threshold
    }

    /// Summed loss over the pool's margins
    pub fn quality(&self, pool: &[Instance]) -> f64 {
        pool.iter()
            .map(|instance| self.loss.value(self.decision(&instance.features) * instance.goal))
            .sum()
    }

    /// Randomly perturb every weight, an escape hatch from plateaus
    pub fn jog_weights(&mut self, rng: &mut impl Rng) {
        let span = Uniform::new_inclusive(-1.0, 1.0);
        for position in 0..self.weights.len() {
            let nudged = self.weights.get(position) + span.sample(rng);
            self.weights.insert(nudged, position);
        }
        self.threshold += span.sample(rng);
    }
}

impl Classifier for LogisticRegression {
    fn learn(
        &mut self,
        pool: &[Instance],
        object_weights: &[f64],
        curve: &mut LearningCurve,
    ) -> Result<()> {
        if pool.is_empty() {
            return Err(MlError::EmptyDataset);
        }
        let length = pool.len();
        let features_count = pool[0].features_len();

        self.weights = NumericVector::new(features_count);
        self.threshold = 0.0;

        let lambda = 1.0 / length as f64;
        let mut rng = rand::thread_rng();
        let picker = Uniform::new(0, length);

        let mut assessment = self.quality(pool);
        let mut assessment_last;
        let mut weight_difference;
        let mut iterations = 0usize;

        loop {
            let index = picker.sample(&mut rng);
            let instance = &pool[index];
            let importance = object_weights.get(index).copied().unwrap_or(1.0);

            let scalar = self.decision(&instance.features);
            let margin = scalar * instance.goal;
            let error = self.loss.value(margin);

            let activation = Activation::Sigmoid.value(-margin);
            let factor = self.learning_rate * activation * instance.goal * importance;

            let mut difference = self.weights.update(1.0, factor, &instance.features)?;
            let new_threshold = self.threshold - factor;
            difference += (new_threshold - self.threshold) * (new_threshold - self.threshold);
            self.threshold = new_threshold;

            weight_difference = (difference / features_count as f64).sqrt();

            assessment_last = assessment;
            assessment = (1.0 - lambda) * assessment_last + lambda * error;

            iterations += 1;
            if iterations % length == 0 {
                debug!(
                    "iterations {}: assessment diff {:.3e}, weight diff {:.3e}, complexity {}, threshold {:.4}",
                    iterations,
                    (assessment - assessment_last).abs(),
                    weight_difference,
                    self.weights.non_null_count(),
                    self.threshold
                );
            }
            if iterations % CURVE_SAMPLE_PERIOD == 0 {
                curve.push((scalar, instance.goal));
            }

            let converged = (assessment - assessment_last).abs() < CONVERGENCE_EPSILON
                && weight_difference < CONVERGENCE_EPSILON
                && iterations > self.min_epochs * length;
            if converged || iterations > self.max_epochs * length {
                break;
            }
        }

        self.trained = true;
        info!(
            "logistic regression trained: {} iterations, complexity {}, threshold {:.4}",
            iterations,
            self.weights.non_null_count(),
            self.threshold
        );
        Ok(())
    }

    fn predict(&self, features: &NumericVector) -> f64 {
        Activation::Sign.value(self.decision(features))
    }

    fn complexity(&self) -> usize {
        self.weights.non_null_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_pool() -> Vec<Instance> {
        // sign of the first feature decides the class
        let mut pool = Vec::new();
        for i in 1..=20 {
            let value = i as f64 / 4.0;
            pool.push(Instance::new(
                NumericVector::from_dense(&[value, 0.5]),
                1.0,
            ));
            pool.push(Instance::new(
                NumericVector::from_dense(&[-value, 0.5]),
                -1.0,
            ));
        }
        pool
    }

    #[test]
    fn test_learn_separates_simple_pool() {
        let pool = separable_pool();
        let mut model = LogisticRegression::new(2, 5, 200);
        let mut curve = LearningCurve::new();
        model.learn(&pool, &[], &mut curve).unwrap();

        let counts = model.evaluate(&pool);
        assert!(
            counts.accuracy() >= 0.9,
            "accuracy {} too low",
            counts.accuracy()
        );
        assert!(model.is_trained());
        assert!(model.complexity() > 0);
    }

    #[test]
    fn test_learn_empty_pool() {
        let mut model = LogisticRegression::new(2, 1, 2);
        let mut curve = LearningCurve::new();
        assert!(matches!(
            model.learn(&[], &[], &mut curve),
            Err(MlError::EmptyDataset)
        ));
    }

    #[test]
    fn test_decision_is_sparse_dot_minus_threshold() {
        let mut model = LogisticRegression::new(4, 1, 1);
        model.weights = NumericVector::from_dense(&[1.0, 0.0, 0.0, 2.0]);
        model.threshold = 0.5;

        let features = NumericVector::from_dense(&[3.0, 1.0, 0.0, 1.0]);
        assert_eq!(model.decision(&features), 3.0 + 2.0 - 0.5);
    }

    #[test]
    fn test_predict_sign() {
        let mut model = LogisticRegression::new(1, 1, 1);
        model.weights = NumericVector::from_dense(&[1.0]);
        model.threshold = 0.0;

        assert_eq!(model.predict(&NumericVector::from_dense(&[2.0])), 1.0);
        assert_eq!(model.predict(&NumericVector::from_dense(&[-2.0])), -1.0);
    }

    #[test]
    fn test_restore() {
        let weights = NumericVector::from_dense(&[0.5, -0.5]);
        let model = LogisticRegression::restore(weights.clone(), 0.1, 0.01);
        assert!(model.is_trained());
        assert_eq!(model.weights(), &weights);
        assert_eq!(model.threshold(), 0.1);
    }
}

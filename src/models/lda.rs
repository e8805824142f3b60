//! Fisher linear discriminant
//!
//! Binary LDA: the projection direction solves
//! `S_w · w = mu₊ - mu₋` with the pooled within-class scatter `S_w`,
//! and the threshold sits at the projected midpoint of the class means.

use log::info;

use crate::core::{Classifier, Instance, LearningCurve, MlError, Result};
use crate::matrix::Matrix;
use crate::vector::reduce::merge_reduce;
use crate::vector::NumericVector;

/// Ridge added to the scatter diagonal; keeps the solve well-posed when
/// a feature is constant within both classes
const SCATTER_RIDGE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct FisherLda {
    weights: NumericVector,
    threshold: f64,
    trained: bool,
}

impl FisherLda {
    pub fn new(features_count: usize) -> Self {
        Self {
            weights: NumericVector::new(features_count),
            threshold: 0.0,
            trained: false,
        }
    }

    pub fn weights(&self) -> &NumericVector {
        &self.weights
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    fn class_mean(class: &[&Instance], features_count: usize) -> Result<NumericVector> {
        let mut sum = NumericVector::new(features_count);
        for instance in class {
            sum = sum.add_vector(&instance.features)?;
        }
        sum.scale_div(class.len() as f64)
    }

    fn decision(&self, features: &NumericVector) -> f64 {
        let projection = merge_reduce(features, &self.weights, 0.0, |acc, feature, weight| {
            *acc += feature * weight
        });
        projection - self.threshold
    }
}

impl Classifier for FisherLda {
    fn learn(
        &mut self,
        pool: &[Instance],
        _object_weights: &[f64],
        _curve: &mut LearningCurve,
    ) -> Result<()> {
        if pool.is_empty() {
            return Err(MlError::EmptyDataset);
        }
        let features_count = pool[0].features_len();

        let positives: Vec<&Instance> = pool.iter().filter(|i| i.goal == 1.0).collect();
        let negatives: Vec<&Instance> = pool.iter().filter(|i| i.goal != 1.0).collect();
        if positives.is_empty() || negatives.is_empty() {
            return Err(MlError::InvalidParameter(
                "Fisher LDA needs both classes in the pool".to_string(),
            ));
        }

        let mean_positive = Self::class_mean(&positives, features_count)?;
        let mean_negative = Self::class_mean(&negatives, features_count)?;

        let mut scatter = Matrix::zeros(features_count, features_count);
        for instance in pool {
            let mean = if instance.goal == 1.0 {
                &mean_positive
            } else {
                &mean_negative
            };
            let deviation = instance.features.sub_vector(mean)?;
            scatter.add_outer(&deviation, 1.0)?;
        }
        for index in 0..features_count {
            scatter.set(index, index, scatter.get(index, index) + SCATTER_RIDGE);
        }

        let mean_difference = mean_positive.sub_vector(&mean_negative)?;
        self.weights = scatter.solve(&mean_difference)?;

        let midpoint = mean_positive.add_vector(&mean_negative)?.scale(0.5);
        self.threshold = self.weights.dot(&midpoint)?;
        self.trained = true;

        info!(
            "fisher lda trained: complexity {}, threshold {:.4}",
            self.complexity(),
            self.threshold
        );
        Ok(())
    }

    fn predict(&self, features: &NumericVector) -> f64 {
        if self.decision(features) >= 0.0 {
            1.0
        } else {
            -1.0
        }
    }

    fn complexity(&self) -> usize {
        self.weights.non_null_count() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaussian_like_pool() -> Vec<Instance> {
        // two elongated clusters; the discriminating direction is feature 0
        let offsets = [-0.4, -0.2, 0.0, 0.2, 0.4];
        let mut pool = Vec::new();
        for &dx in &offsets {
            for &dy in &offsets {
                pool.push(Instance::new(
                    NumericVector::from_dense(&[2.0 + dx, dy * 4.0]),
                    1.0,
                ));
                pool.push(Instance::new(
                    NumericVector::from_dense(&[-2.0 + dx, dy * 4.0]),
                    -1.0,
                ));
            }
        }
        pool
    }

    #[test]
    fn test_lda_separates_clusters() {
        let pool = gaussian_like_pool();
        let mut model = FisherLda::new(2);
        let mut curve = LearningCurve::new();
        model.learn(&pool, &[], &mut curve).unwrap();

        assert!(model.is_trained());
        let counts = model.evaluate(&pool);
        assert_eq!(counts.accuracy(), 1.0);

        // the discriminant should lean on feature 0 far more than feature 1
        assert!(model.weights().get(0).abs() > 10.0 * model.weights().get(1).abs());
    }

    #[test]
    fn test_lda_single_class_fails() {
        let pool: Vec<Instance> = (0..5)
            .map(|i| Instance::new(NumericVector::from_dense(&[i as f64]), 1.0))
            .collect();
        let mut model = FisherLda::new(1);
        let mut curve = LearningCurve::new();
        assert!(model.learn(&pool, &[], &mut curve).is_err());
    }

    #[test]
    fn test_lda_empty_pool() {
        let mut model = FisherLda::new(2);
        let mut curve = LearningCurve::new();
        assert!(matches!(
            model.learn(&[], &[], &mut curve),
            Err(MlError::EmptyDataset)
        ));
    }

    #[test]
    fn test_threshold_is_projected_midpoint() {
        let pool = vec![
            Instance::new(NumericVector::from_dense(&[1.0, 0.0]), 1.0),
            Instance::new(NumericVector::from_dense(&[1.2, 0.1]), 1.0),
            Instance::new(NumericVector::from_dense(&[-1.0, 0.0]), -1.0),
            Instance::new(NumericVector::from_dense(&[-1.2, -0.1]), -1.0),
        ];
        let mut model = FisherLda::new(2);
        let mut curve = LearningCurve::new();
        model.learn(&pool, &[], &mut curve).unwrap();

        // symmetric classes project their midpoint onto ~0
        assert!(model.threshold().abs() < 1e-6);
        assert_eq!(model.predict(&NumericVector::from_dense(&[0.9, 0.0])), 1.0);
        assert_eq!(model.predict(&NumericVector::from_dense(&[-0.9, 0.0])), -1.0);
    }
}

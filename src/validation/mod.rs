//! k-fold cross-validation harness
//!
//! Instances are shuffled and dealt into k folds. Each fold serves as
//! the *training* split and the complement as the evaluation split —
//! training sets stay small and evaluation sets large, which suits
//! learning-curve studies. Note this is inverted relative to textbook
//! k-fold.

use std::time::{Duration, Instant};

use log::info;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::{Classifier, Instance, LearningCurve, MlError, Result};
use crate::metrics::ConfusionCounts;

/// Quality summary of one model over one split
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
    pub rmse: f64,
}

impl SplitMetrics {
    fn measure<C: Classifier + ?Sized>(model: &C, split: &[Instance]) -> Self {
        let counts: ConfusionCounts = model.evaluate(split);
        Self {
            precision: counts.precision(),
            recall: counts.recall(),
            f1: counts.f1_score(),
            accuracy: counts.accuracy(),
            rmse: model.rmse(split),
        }
    }
}

/// One fold's outcome
#[derive(Debug, Clone)]
pub struct FoldReport {
    pub fold: usize,
    pub learn: SplitMetrics,
    pub eval: SplitMetrics,
    pub duration: Duration,
    pub complexity: usize,
    pub curve: LearningCurve,
}

/// Full cross-validation outcome
#[derive(Debug, Clone)]
pub struct CvReport {
    pub folds: Vec<FoldReport>,
}

impl CvReport {
    fn average_by(&self, select: impl Fn(&FoldReport) -> SplitMetrics) -> SplitMetrics {
        let n = self.folds.len() as f64;
        let mut sum = SplitMetrics::default();
        for fold in &self.folds {
            let metrics = select(fold);
            sum.precision += metrics.precision;
            sum.recall += metrics.recall;
            sum.f1 += metrics.f1;
            sum.accuracy += metrics.accuracy;
            sum.rmse += metrics.rmse;
        }
        SplitMetrics {
            precision: sum.precision / n,
            recall: sum.recall / n,
            f1: sum.f1 / n,
            accuracy: sum.accuracy / n,
            rmse: sum.rmse / n,
        }
    }

    pub fn average_learn(&self) -> SplitMetrics {
        self.average_by(|fold| fold.learn)
    }

    pub fn average_eval(&self) -> SplitMetrics {
        self.average_by(|fold| fold.eval)
    }

    pub fn average_duration(&self) -> Duration {
        let total: Duration = self.folds.iter().map(|fold| fold.duration).sum();
        total / self.folds.len().max(1) as u32
    }

    pub fn average_complexity(&self) -> f64 {
        let total: usize = self.folds.iter().map(|fold| fold.complexity).sum();
        total as f64 / self.folds.len().max(1) as f64
    }
}

/// Run k-fold cross-validation with the thread-local RNG
pub fn cross_validate<C: Classifier>(
    model: &mut C,
    pool: &[Instance],
    folds: usize,
) -> Result<CvReport> {
    cross_validate_with_rng(model, pool, folds, &mut rand::thread_rng())
}

/// Run k-fold cross-validation with a caller-supplied RNG (seed it for
/// reproducible folds)
pub fn cross_validate_with_rng<C: Classifier>(
    model: &mut C,
    pool: &[Instance],
    folds: usize,
    rng: &mut impl Rng,
) -> Result<CvReport> {
    if pool.is_empty() {
        return Err(MlError::EmptyDataset);
    }
    if folds == 0 || folds > pool.len() {
        return Err(MlError::InvalidParameter(format!(
            "fold count must be in 1..={}, got {folds}",
            pool.len()
        )));
    }

    let mut assignment: Vec<usize> = (0..pool.len()).collect();
    assignment.shuffle(rng);

    let mut reports = Vec::with_capacity(folds);
    for fold in 0..folds {
        let mut learn_split = Vec::new();
        let mut eval_split = Vec::new();
        for (index, instance) in pool.iter().enumerate() {
            if assignment[index] % folds == fold {
                learn_split.push(instance.clone());
            } else {
                eval_split.push(instance.clone());
            }
        }
        if learn_split.is_empty() || eval_split.is_empty() {
            return Err(MlError::InvalidParameter(format!(
                "fold {fold} produced an empty split; use fewer folds"
            )));
        }

        let mut curve = LearningCurve::new();
        let start = Instant::now();
        model.learn(&learn_split, &[], &mut curve)?;
        let duration = start.elapsed();

        let learn = SplitMetrics::measure(model, &learn_split);
        let eval = SplitMetrics::measure(model, &eval_split);
        let complexity = model.complexity();

        info!(
            "fold {fold}: learn f1 {:.3}, eval f1 {:.3}, complexity {complexity}, {} ms",
            learn.f1,
            eval.f1,
            duration.as_millis()
        );

        reports.push(FoldReport {
            fold,
            learn,
            eval,
            duration,
            complexity,
            curve,
        });
    }

    Ok(CvReport { folds: reports })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DecisionStump, Impurity};
    use crate::vector::NumericVector;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn separable_pool() -> Vec<Instance> {
        (0..40)
            .map(|i| {
                let x = i as f64 - 20.0;
                Instance::new(
                    NumericVector::from_dense(&[x]),
                    if x < 0.0 { 1.0 } else { -1.0 },
                )
            })
            .collect()
    }

    #[test]
    fn test_cross_validate_separable() {
        let pool = separable_pool();
        let mut model = DecisionStump::new(Impurity::Gini);
        let mut rng = StdRng::seed_from_u64(7);
        let report = cross_validate_with_rng(&mut model, &pool, 4, &mut rng).unwrap();

        assert_eq!(report.folds.len(), 4);
        let averages = report.average_eval();
        assert!(averages.accuracy > 0.9, "accuracy {}", averages.accuracy);
        assert!(report.average_complexity() > 0.0);
        assert!(report.folds.iter().all(|fold| fold.complexity > 0));
    }

    #[test]
    fn test_invalid_fold_counts() {
        let pool = separable_pool();
        let mut model = DecisionStump::new(Impurity::Gini);
        assert!(cross_validate(&mut model, &pool, 0).is_err());
        assert!(cross_validate(&mut model, &pool, pool.len() + 1).is_err());
        assert!(cross_validate(&mut model, &[], 3).is_err());
    }
}

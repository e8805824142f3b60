//! Weighted decision stump
//!
//! Single-feature threshold classifier, the weak learner behind the
//! boosted ensembles and the tree splits. The threshold for each feature
//! is located by golden-section search against a weighted impurity
//! criterion; evaluated thresholds are memoized per feature.

use std::collections::HashMap;

use log::debug;

use crate::core::{Classifier, Instance, LearningCurve, MlError, Result};
use crate::metrics::Metric;
use crate::vector::NumericVector;

/// Weighted counts never drop below this, keeping the log/ratio criteria
/// finite on one-sided splits
const COUNT_FLOOR: f64 = 1e-7;

/// Threshold search stops when the bracket shrinks below range / 1e4
const SEARCH_RESOLUTION: f64 = 1e4;

/// Impurity criterion scored by the threshold search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impurity {
    InfoGain,
    MutualInfo,
    ChiSquare,
    Gini,
}

/// Weighted positive/negative mass of a subset
#[derive(Debug, Clone, Copy)]
struct ClassMass {
    positive: f64,
    negative: f64,
}

impl ClassMass {
    fn floored(positive: f64, negative: f64) -> Self {
        Self {
            positive: if positive == 0.0 { COUNT_FLOOR } else { positive },
            negative: if negative == 0.0 { COUNT_FLOOR } else { negative },
        }
    }

    fn total(&self) -> f64 {
        self.positive + self.negative
    }
}

#[derive(Debug, Clone)]
pub struct DecisionStump {
    impurity: Impurity,
    feature: usize,
    value: f64,
    polarity: f64,
    best_impurity: f64,
    trained: bool,
}

impl DecisionStump {
    pub fn new(impurity: Impurity) -> Self {
        Self {
            impurity,
            feature: 0,
            value: 0.0,
            polarity: 1.0,
            best_impurity: f64::NEG_INFINITY,
            trained: false,
        }
    }

    pub fn feature(&self) -> usize {
        self.feature
    }

    pub fn threshold(&self) -> f64 {
        self.value
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    fn feature_value(features: &NumericVector, feature: usize) -> f64 {
        if feature < features.len() {
            features.get(feature)
        } else {
            0.0
        }
    }

    /// Weighted class mass of the instances selected by `predicate`
    fn class_mass(
        pool: &[Instance],
        importance: &[f64],
        predicate: impl Fn(&Instance) -> bool,
    ) -> ClassMass {
        let mut positive = 0.0;
        let mut negative = 0.0;
        for (instance, &weight) in pool.iter().zip(importance.iter()) {
            if predicate(instance) {
                if instance.goal == 1.0 {
                    positive += weight;
                } else {
                    negative += weight;
                }
            }
        }
        ClassMass::floored(positive, negative)
    }

    fn evaluate_split(
        &self,
        pool: &[Instance],
        importance: &[f64],
        value: f64,
        feature: usize,
        totals: ClassMass,
        evaluated: &mut HashMap<u64, f64>,
    ) -> f64 {
        if let Some(&memoized) = evaluated.get(&value.to_bits()) {
            return memoized;
        }

        let counts = Self::class_mass(pool, importance, |instance| {
            Self::feature_value(&instance.features, feature) <= value
        });

        let impurity_value = match self.impurity {
            Impurity::InfoGain => info_benefit(counts, totals),
            Impurity::MutualInfo => mutual_info(counts, totals),
            Impurity::ChiSquare => chi_square(counts, totals),
            Impurity::Gini => gini(counts, totals),
        };

        evaluated.insert(value.to_bits(), impurity_value);
        impurity_value
    }

    /// Best threshold for one feature: golden-section search over the
    /// observed value range, maximizing the impurity criterion
    fn search_feature(
        &self,
        pool: &[Instance],
        importance: &[f64],
        feature: usize,
        totals: ClassMass,
    ) -> (f64, f64) {
        let mut evaluated: HashMap<u64, f64> = HashMap::new();

        let mut left = f64::INFINITY;
        let mut right = f64::NEG_INFINITY;
        for instance in pool {
            let value = Self::feature_value(&instance.features, feature);
            left = left.min(value);
            right = right.max(value);
        }
        let spread = (right - left) / 2.0;
        left -= 1e-3 * spread;
        right += 1e-3 * spread;

        let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
        let precision = (right - left) / SEARCH_RESOLUTION;
        while (right - left).abs() > precision {
            let step = (right - left) / phi;
            let probe_low = right - step;
            let probe_high = left + step;

            let impurity_low =
                self.evaluate_split(pool, importance, probe_low, feature, totals, &mut evaluated);
            let impurity_high =
                self.evaluate_split(pool, importance, probe_high, feature, totals, &mut evaluated);

            if impurity_low <= impurity_high {
                left = probe_low;
            } else {
                right = probe_high;
            }
        }

        let value = (left + right) / 2.0;
        let impurity = self.evaluate_split(pool, importance, value, feature, totals, &mut evaluated);
        (value, impurity)
    }
}

impl Classifier for DecisionStump {
    fn learn(
        &mut self,
        pool: &[Instance],
        object_weights: &[f64],
        _curve: &mut LearningCurve,
    ) -> Result<()> {
        if pool.is_empty() {
            return Err(MlError::EmptyDataset);
        }

        // uniform weights carry importance 1.0; provided weights are
        // rescaled so the total mass stays at the pool size
        let importance: Vec<f64> = if object_weights.is_empty() {
            vec![1.0; pool.len()]
        } else {
            object_weights
                .iter()
                .map(|&w| w * pool.len() as f64)
                .collect()
        };

        let totals = Self::class_mass(pool, &importance, |_| true);
        let features_count = pool[0].features_len();

        let mut best_impurity = f64::NEG_INFINITY;
        let mut best_feature = 0;
        let mut best_value = 0.0;
        for feature in 0..features_count {
            let (value, impurity) = self.search_feature(pool, &importance, feature, totals);
            if impurity > best_impurity {
                best_impurity = impurity;
                best_feature = feature;
                best_value = value;
            }
        }

        self.best_impurity = best_impurity;
        self.feature = best_feature;
        self.value = best_value;

        // pick the polarity with the better F1 on the pool
        self.polarity = 1.0;
        let f1_positive = Metric::F1Score.compute(&self.evaluate(pool));
        self.polarity = -1.0;
        let f1_negative = Metric::F1Score.compute(&self.evaluate(pool));
        self.polarity = if f1_positive >= f1_negative { 1.0 } else { -1.0 };

        self.trained = true;
        debug!(
            "stump: feature {} threshold {:.4} impurity {:.4} polarity {}",
            self.feature, self.value, self.best_impurity, self.polarity
        );
        Ok(())
    }

    fn predict(&self, features: &NumericVector) -> f64 {
        if Self::feature_value(features, self.feature) <= self.value {
            self.polarity
        } else {
            -self.polarity
        }
    }

    fn complexity(&self) -> usize {
        // feature index, threshold, polarity
        3
    }
}

fn info_benefit(counts: ClassMass, totals: ClassMass) -> f64 {
    let summary = totals.total();
    let info_categories = (totals.positive * (totals.positive / summary).log2()
        + totals.negative * (totals.negative / summary).log2())
        / summary;

    let selected = ClassMass::floored(counts.positive, counts.negative);
    let rest = ClassMass::floored(
        totals.positive - counts.positive,
        totals.negative - counts.negative,
    );
    let selected_total = selected.total();
    let rest_total = rest.total();

    let info_selected = (selected.positive * (selected.positive / selected_total).log2()
        + selected.negative * (selected.negative / selected_total).log2())
        / summary;
    let info_rest = (rest.positive * (rest.positive / rest_total).log2()
        + rest.negative * (rest.negative / rest_total).log2())
        / summary;

    -info_categories + info_selected + info_rest
}

fn mutual_info(counts: ClassMass, totals: ClassMass) -> f64 {
    let summary = totals.total();
    let selected = ClassMass::floored(counts.positive, counts.negative);
    let rest = ClassMass::floored(
        totals.positive - counts.positive,
        totals.negative - counts.negative,
    );
    let selected_total = selected.total();
    let rest_total = rest.total();

    let term = |joint: f64, side: f64, class: f64| -> f64 {
        ((joint * summary) / (class * side)).log2() * (joint / side)
    };

    term(selected.positive, selected_total, totals.positive)
        + term(selected.negative, selected_total, totals.negative)
        + term(rest.positive, rest_total, totals.positive)
        + term(rest.negative, rest_total, totals.negative)
}

fn chi_square(counts: ClassMass, totals: ClassMass) -> f64 {
    let summary = totals.total();
    let selected = ClassMass::floored(counts.positive, counts.negative);
    let rest = ClassMass::floored(
        totals.positive - counts.positive,
        totals.negative - counts.negative,
    );
    let selected_total = selected.total();
    let rest_total = rest.total();

    let term = |joint: f64, side: f64, class: f64| -> f64 {
        let deviation = summary * joint - side * class;
        deviation * deviation / (side * class * summary)
    };

    term(selected.positive, selected_total, totals.positive)
        + term(selected.negative, selected_total, totals.negative)
        + term(rest.positive, rest_total, totals.positive)
        + term(rest.negative, rest_total, totals.negative)
}

fn gini(counts: ClassMass, totals: ClassMass) -> f64 {
    let summary = totals.total();
    let gini_categories = (totals.positive * totals.positive
        + totals.negative * totals.negative)
        / (summary * summary);

    let selected = ClassMass::floored(counts.positive, counts.negative);
    let rest = ClassMass::floored(
        totals.positive - counts.positive,
        totals.negative - counts.negative,
    );
    let selected_total = selected.total();
    let rest_total = rest.total();

    let gini_selected = (selected.positive * selected.positive / selected_total
        + selected.negative * selected.negative / selected_total)
        / summary;
    let gini_rest = (rest.positive * rest.positive / rest_total
        + rest.negative * rest.negative / rest_total)
        / summary;

    -gini_categories + gini_selected + gini_rest
}

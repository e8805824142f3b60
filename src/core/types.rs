//! Core type definitions for the learning toolkit

use crate::vector::NumericVector;

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1 or -1)
    pub label: f64,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: f64, decision_value: f64) -> Self {
        Self {
            label,
            decision_value,
        }
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }
}

/// Training instance: a feature vector paired with its class goal
#[derive(Clone, Debug)]
pub struct Instance {
    /// Feature vector (sparse-aware representation)
    pub features: NumericVector,
    /// Class goal (+1 or -1 for binary classification)
    pub goal: f64,
}

impl Instance {
    /// Create a new instance
    pub fn new(features: NumericVector, goal: f64) -> Self {
        Self { features, goal }
    }

    /// Logical number of features
    pub fn features_len(&self) -> usize {
        self.features.len()
    }

    /// Number of non-null features
    pub fn non_null_features(&self) -> usize {
        self.features.non_null_count()
    }
}

//! Classical machine learning on sparse-aware vectors
//!
//! The core is a numeric vector that transparently switches between dense
//! and sparse backing at construction time and exposes merge-walk algebra
//! (dot products, distances, in-place gradient updates) over its not-null
//! set. On top of it sit a family of binary classifiers, a generic
//! vantage-point tree for nearest-neighbour queries, and a k-fold
//! cross-validation harness.

pub mod cache;
pub mod core;
pub mod data;
pub mod matrix;
pub mod metrics;
pub mod models;
pub mod persistence;
pub mod validation;
pub mod vector;
pub mod vptree;

// Re-export main types for convenience
pub use crate::cache::{CacheStats, DistanceCache};
pub use crate::core::{Classifier, Dataset, Instance, LearningCurve, MlError, Prediction, Result};
pub use crate::data::LibSvmDataset;
pub use crate::matrix::Matrix;
pub use crate::metrics::{ConfusionCounts, Metric};
pub use crate::models::{
    AdaBoost, DecisionStump, DecisionTree, FisherLda, Impurity, KNearestNeighbours,
    LogisticRegression,
};
pub use crate::validation::{cross_validate, CvReport, FoldReport, SplitMetrics};
pub use crate::vector::{
    Distance, EuclideanDistance, EuclideanNorm, ManhattanDistance, Norm, NumericVector,
};
pub use crate::vptree::VpTree;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

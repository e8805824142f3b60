//! Classifiers built on the vector contract

pub mod activation;
pub mod adaboost;
pub mod knn;
pub mod lda;
pub mod logistic;
pub mod loss;
pub mod stump;
pub mod tree;

pub use activation::Activation;
pub use adaboost::AdaBoost;
pub use knn::{
    constant_weight, exponential_weight, hyperbolic_weight, KNearestNeighbours, NeighbourWeight,
};
pub use lda::FisherLda;
pub use logistic::LogisticRegression;
pub use loss::Loss;
pub use stump::{DecisionStump, Impurity};
pub use tree::DecisionTree;

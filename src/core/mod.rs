//! Core types, traits and errors

pub mod error;
pub mod traits;
pub mod types;

pub use error::{MlError, Result};
pub use traits::{Classifier, Dataset, LearningCurve};
pub use types::{Instance, Prediction};

//! Model serialization and persistence
//!
//! Save and load trained logistic regression models for use with the CLI
//! application and other scenarios where model persistence is needed.
//! Weights are stored sparsely as (position, value) pairs.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{MlError, Result};
use crate::models::LogisticRegression;
use crate::vector::NumericVector;

/// Serializable representation of a trained logistic regression model
#[derive(Serialize, Deserialize)]
pub struct SerializableModel {
    /// Sparse weight entries (position, value)
    pub weights: Vec<(usize, f64)>,
    /// Logical width of the weight vector
    pub features_count: usize,
    /// Decision threshold (bias)
    pub threshold: f64,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Model metadata for tracking and validation
#[derive(Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Number of non-null weights
    pub non_null_weights: usize,
    /// Training parameters used
    pub training_params: TrainingParams,
    /// Creation timestamp
    pub created_at: String,
}

/// Training parameters for reference
#[derive(Serialize, Deserialize)]
pub struct TrainingParams {
    pub learning_rate: f64,
}

impl SerializableModel {
    /// Create a serializable model from a trained model
    pub fn from_model(model: &LogisticRegression) -> Result<Self> {
        if !model.is_trained() {
            return Err(MlError::ModelNotTrained);
        }
        let weights: Vec<(usize, f64)> = model.weights().iter_non_null().collect();

        Ok(Self {
            features_count: model.weights().len(),
            threshold: model.threshold(),
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                non_null_weights: weights.len(),
                training_params: TrainingParams {
                    learning_rate: model.learning_rate(),
                },
                created_at: chrono::Utc::now().to_rfc3339(),
            },
            weights,
        })
    }

    /// Rebuild the trained model
    pub fn into_model(self) -> LogisticRegression {
        let entries: BTreeMap<usize, f64> = self.weights.into_iter().collect();
        let weights = NumericVector::from_map(entries, self.features_count);
        LogisticRegression::restore(
            weights,
            self.threshold,
            self.metadata.training_params.learning_rate,
        )
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(MlError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| MlError::ParseError(format!("Failed to serialize model: {e}")))
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(MlError::IoError)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| MlError::ParseError(format!("Failed to deserialize model: {e}")))
    }
}

/// Convenience: save a trained model directly to a path
pub fn save_model<P: AsRef<Path>>(model: &LogisticRegression, path: P) -> Result<()> {
    SerializableModel::from_model(model)?.save_to_file(path)
}

/// Convenience: load a trained model directly from a path
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<LogisticRegression> {
    Ok(SerializableModel::load_from_file(path)?.into_model())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Classifier, Instance, LearningCurve};
    use tempfile::NamedTempFile;

    fn trained_model() -> LogisticRegression {
        let pool: Vec<Instance> = (1..=10)
            .flat_map(|i| {
                let x = i as f64 / 2.0;
                [
                    Instance::new(NumericVector::from_dense(&[x, 0.0]), 1.0),
                    Instance::new(NumericVector::from_dense(&[-x, 0.0]), -1.0),
                ]
            })
            .collect();
        let mut model = LogisticRegression::new(2, 2, 100);
        let mut curve = LearningCurve::new();
        model.learn(&pool, &[], &mut curve).unwrap();
        model
    }

    #[test]
    fn test_untrained_model_rejected() {
        let model = LogisticRegression::new(2, 1, 2);
        assert!(matches!(
            SerializableModel::from_model(&model),
            Err(MlError::ModelNotTrained)
        ));
    }

    #[test]
    fn test_roundtrip_preserves_decisions() {
        let model = trained_model();
        let temp = NamedTempFile::new().expect("Failed to create temp file");

        save_model(&model, temp.path()).unwrap();
        let restored = load_model(temp.path()).unwrap();

        assert_eq!(restored.weights(), model.weights());
        assert_eq!(restored.threshold(), model.threshold());
        for value in [-3.0, -0.5, 0.5, 3.0] {
            let features = NumericVector::from_dense(&[value, 0.0]);
            assert_eq!(restored.predict(&features), model.predict(&features));
        }
    }

    #[test]
    fn test_metadata_recorded() {
        let model = trained_model();
        let serializable = SerializableModel::from_model(&model).unwrap();
        assert_eq!(
            serializable.metadata.library_version,
            env!("CARGO_PKG_VERSION")
        );
        assert_eq!(
            serializable.metadata.non_null_weights,
            model.weights().non_null_count()
        );
        assert!(!serializable.metadata.created_at.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_model("/non/existent/model.json").is_err());
    }
}

//! LibSVM format dataset loading
//!
//! Supports the usual sparse interchange format:
//! label index:value index:value ...
//!
//! Example:
//! +1 1:0.5 3:1.2 7:0.8
//! -1 2:0.3 5:2.1
//!
//! Indices are 1-based in the file and 0-based in memory. Every loaded
//! feature vector is sized to the full dataset dimensionality so the
//! equal-length algebra contract holds across the pool.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::core::{Dataset, Instance, MlError, Result};
use crate::vector::NumericVector;

#[derive(Debug, Clone)]
pub struct LibSvmDataset {
    instances: Vec<Instance>,
    dimensions: usize,
}

impl LibSvmDataset {
    /// Load a dataset from a LibSVM format file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(MlError::IoError)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset from a reader (for testing and flexibility)
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut parsed: Vec<(BTreeMap<usize, f64>, f64)> = Vec::new();
        let mut dimensions = 0;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(MlError::IoError)?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (entries, goal, max_index) = Self::parse_line(line).map_err(|e| {
                MlError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;
            dimensions = dimensions.max(max_index + 1);
            parsed.push((entries, goal));
        }

        if parsed.is_empty() {
            return Err(MlError::EmptyDataset);
        }

        let instances = parsed
            .into_iter()
            .map(|(entries, goal)| {
                Instance::new(NumericVector::from_map(entries, dimensions), goal)
            })
            .collect();

        Ok(Self {
            instances,
            dimensions,
        })
    }

    /// Parse one line into its sparse entries, goal and largest index
    fn parse_line(line: &str) -> Result<(BTreeMap<usize, f64>, f64, usize)> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.is_empty() {
            return Err(MlError::ParseError("Empty line".to_string()));
        }

        let goal = parts[0]
            .parse::<f64>()
            .map_err(|_| MlError::ParseError(format!("Invalid label: {}", parts[0])))?;
        if goal == 0.0 {
            return Err(MlError::InvalidLabel(goal));
        }
        // coerce to a ±1 goal
        let goal = if goal > 0.0 { 1.0 } else { -1.0 };

        let mut entries = BTreeMap::new();
        let mut max_index = 0;

        for feature_str in &parts[1..] {
            let (index_str, value_str) = feature_str.split_once(':').ok_or_else(|| {
                MlError::ParseError(format!("Invalid feature format: {feature_str}"))
            })?;

            let index = index_str.parse::<usize>().map_err(|_| {
                MlError::ParseError(format!("Invalid feature index: {index_str}"))
            })?;
            let value = value_str.parse::<f64>().map_err(|_| {
                MlError::ParseError(format!("Invalid feature value: {value_str}"))
            })?;

            if index == 0 {
                return Err(MlError::ParseError(
                    "Feature index must be positive".to_string(),
                ));
            }
            let zero_based = index - 1;
            entries.insert(zero_based, value);
            max_index = max_index.max(zero_based);
        }

        Ok((entries, goal, max_index))
    }
}

impl Dataset for LibSvmDataset {
    fn len(&self) -> usize {
        self.instances.len()
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    fn get_instance(&self, i: usize) -> Instance {
        self.instances[i].clone()
    }

    fn get_goals(&self) -> Vec<f64> {
        self.instances.iter().map(|instance| instance.goal).collect()
    }
}

//! Decision tree over stump splits
//!
//! Each internal node is a trained [`DecisionStump`]; instances flow to
//! the left child on a -1 prediction and to the right child on +1.
//! Recursion stops on near-pure partitions, on a stump that already
//! reaches the quality target, on a degenerate split, or at the depth
//! cap.

use log::debug;

use crate::core::{Classifier, Instance, LearningCurve, MlError, Result};
use crate::metrics::Metric;
use crate::models::stump::DecisionStump;
use crate::vector::NumericVector;

/// Partitions at least this pure become leaves
const PURITY_LIMIT: f64 = 0.95;

#[derive(Debug, Clone)]
enum TreeNode {
    Leaf {
        class: f64,
    },
    Split {
        stump: DecisionStump,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, features: &NumericVector) -> f64 {
        match self {
            TreeNode::Leaf { class } => *class,
            TreeNode::Split { stump, left, right } => {
                if stump.predict(features) == -1.0 {
                    left.predict(features)
                } else {
                    right.predict(features)
                }
            }
        }
    }

    fn complexity(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { stump, left, right } => {
                stump.complexity() + left.complexity() + right.complexity()
            }
        }
    }

    fn node_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    stump_prototype: DecisionStump,
    quality_max: f64,
    max_depth: usize,
    root: Option<TreeNode>,
}

impl DecisionTree {
    pub fn new(stump_prototype: DecisionStump, quality_max: f64, max_depth: usize) -> Self {
        Self {
            stump_prototype,
            quality_max,
            max_depth,
            root: None,
        }
    }

    pub fn node_count(&self) -> usize {
        self.root.as_ref().map(TreeNode::node_count).unwrap_or(0)
    }

    fn majority_leaf(positive: usize, negative: usize) -> TreeNode {
        TreeNode::Leaf {
            class: if positive > negative { 1.0 } else { -1.0 },
        }
    }

    fn learn_subtree(
        &self,
        pool: &[Instance],
        object_weights: &[f64],
        depth: usize,
        curve: &mut LearningCurve,
    ) -> Result<TreeNode> {
        let positive = pool.iter().filter(|instance| instance.goal == 1.0).count();
        let negative = pool.len() - positive;
        let positive_factor = positive as f64 / pool.len() as f64;
        let negative_factor = negative as f64 / pool.len() as f64;

        if positive_factor >= PURITY_LIMIT
            || negative_factor >= PURITY_LIMIT
            || depth >= self.max_depth
        {
            return Ok(Self::majority_leaf(positive, negative));
        }

        let mut stump = self.stump_prototype.clone();
        stump.learn(pool, object_weights, curve)?;
        let quality = Metric::F1Score.compute(&stump.evaluate(pool));

        if quality >= self.quality_max || quality.is_nan() {
            return Ok(Self::majority_leaf(positive, negative));
        }

        let mut left_pool = Vec::new();
        let mut left_weights = Vec::new();
        let mut right_pool = Vec::new();
        let mut right_weights = Vec::new();
        for (index, instance) in pool.iter().enumerate() {
            let weight = object_weights.get(index).copied().unwrap_or(1.0);
            if stump.predict(&instance.features) == -1.0 {
                left_pool.push(instance.clone());
                left_weights.push(weight);
            } else {
                right_pool.push(instance.clone());
                right_weights.push(weight);
            }
        }

        // a split that sends everything one way cannot make progress
        if left_pool.is_empty() || right_pool.is_empty() {
            return Ok(Self::majority_leaf(positive, negative));
        }

        debug!(
            "tree split at depth {}: {} left, {} right, stump f1 {:.3}",
            depth,
            left_pool.len(),
            right_pool.len(),
            quality
        );

        let left = self.learn_subtree(&left_pool, &left_weights, depth + 1, curve)?;
        let right = self.learn_subtree(&right_pool, &right_weights, depth + 1, curve)?;
        Ok(TreeNode::Split {
            stump,
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}

impl Classifier for DecisionTree {
    fn learn(
        &mut self,
        pool: &[Instance],
        object_weights: &[f64],
        curve: &mut LearningCurve,
    ) -> Result<()> {
        if pool.is_empty() {
            return Err(MlError::EmptyDataset);
        }
        let root = self.learn_subtree(pool, object_weights, 0, curve)?;
        debug!(
            "tree trained: {} nodes",
            root.node_count()
        );
        self.root = Some(root);
        Ok(())
    }

    fn predict(&self, features: &NumericVector) -> f64 {
        match &self.root {
            Some(root) => root.predict(features),
            None => 1.0,
        }
    }

    fn complexity(&self) -> usize {
        self.root.as_ref().map(TreeNode::complexity).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stump::Impurity;

    fn xor_like_pool() -> Vec<Instance> {
        // not separable by one stump: positive inside [2, 4], negative outside
        let mut pool = Vec::new();
        for i in 0..12 {
            let x = i as f64 / 2.0;
            let goal = if (2.0..=4.0).contains(&x) { 1.0 } else { -1.0 };
            pool.push(Instance::new(NumericVector::from_dense(&[x]), goal));
        }
        pool
    }

    #[test]
    fn test_tree_beats_single_stump_on_interval_pool() {
        let pool = xor_like_pool();

        let mut stump = DecisionStump::new(Impurity::Gini);
        let mut curve = LearningCurve::new();
        stump.learn(&pool, &[], &mut curve).unwrap();
        let stump_accuracy = stump.evaluate(&pool).accuracy();

        let mut tree = DecisionTree::new(DecisionStump::new(Impurity::Gini), 0.999, 8);
        tree.learn(&pool, &[], &mut curve).unwrap();
        let tree_accuracy = tree.evaluate(&pool).accuracy();

        assert!(
            tree_accuracy >= stump_accuracy,
            "tree {tree_accuracy} vs stump {stump_accuracy}"
        );
        assert!(tree_accuracy >= 0.9, "tree accuracy {tree_accuracy}");
        assert!(tree.node_count() > 1);
    }

    #[test]
    fn test_pure_pool_becomes_single_leaf() {
        let pool: Vec<Instance> = (0..10)
            .map(|i| Instance::new(NumericVector::from_dense(&[i as f64]), 1.0))
            .collect();
        let mut tree = DecisionTree::new(DecisionStump::new(Impurity::Gini), 0.9, 8);
        let mut curve = LearningCurve::new();
        tree.learn(&pool, &[], &mut curve).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(&NumericVector::from_dense(&[3.0])), 1.0);
    }

    #[test]
    fn test_depth_cap() {
        let pool = xor_like_pool();
        let mut tree = DecisionTree::new(DecisionStump::new(Impurity::Gini), 0.999, 0);
        let mut curve = LearningCurve::new();
        tree.learn(&pool, &[], &mut curve).unwrap();
        // depth 0 forces an immediate majority leaf
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_untrained_tree_defaults_positive() {
        let tree = DecisionTree::new(DecisionStump::new(Impurity::Gini), 0.9, 4);
        assert_eq!(tree.predict(&NumericVector::from_dense(&[1.0])), 1.0);
    }
}

//! k-nearest-neighbours classifier
//!
//! Training scores candidate neighbour counts by leave-one-out majority
//! vote over a pairwise neighbour matrix (distances served through the
//! symmetric LRU cache), narrowing the count by bisection over odd k.
//! The final model is a VP-tree over the pool plus the chosen k; queries
//! take a weighted vote among the k nearest.

use log::{debug, info};

use crate::cache::DistanceCache;
use crate::core::{Classifier, Instance, LearningCurve, MlError, Result};
use crate::metrics::{ConfusionCounts, Metric};
use crate::vector::{Distance, NumericVector};
use crate::vptree::VpTree;

/// Rank-based weight of the i-th nearest neighbour among k
pub type NeighbourWeight = fn(usize, usize) -> f64;

/// Every neighbour counts the same
pub fn constant_weight(_rank: usize, _k: usize) -> f64 {
    1.0
}

/// Hyperbolically decaying influence: `1 / (rank + 1)`
pub fn hyperbolic_weight(rank: usize, _k: usize) -> f64 {
    1.0 / (rank + 1) as f64
}

/// Exponentially decaying influence: `0.5 e^(-rank / 2)`
pub fn exponential_weight(rank: usize, _k: usize) -> f64 {
    0.5 * (-0.5 * rank as f64).exp()
}

type InstanceTree = VpTree<Instance, Box<dyn Fn(&Instance, &Instance) -> f64 + Send + Sync>>;

/// Per-object neighbour list: (distance, neighbour goal), nearest first
type NeighbourMatrix = Vec<Vec<(f64, f64)>>;

pub struct KNearestNeighbours<D: Distance + Clone + 'static> {
    distance: D,
    neighbour_weight: NeighbourWeight,
    fixed_k: Option<usize>,
    tree: Option<InstanceTree>,
    effective_k: usize,
    features_count: usize,
}

impl<D: Distance + Clone + 'static> KNearestNeighbours<D> {
    pub fn new(distance: D) -> Self {
        Self {
            distance,
            neighbour_weight: constant_weight,
            fixed_k: None,
            tree: None,
            effective_k: 1,
            features_count: 0,
        }
    }

    pub fn with_neighbour_weight(mut self, weight: NeighbourWeight) -> Self {
        self.neighbour_weight = weight;
        self
    }

    /// Skip the neighbour-count selection and always vote among `k`
    pub fn with_fixed_k(mut self, k: usize) -> Self {
        self.fixed_k = Some(k);
        self
    }

    /// Neighbour count the model settled on
    pub fn effective_k(&self) -> usize {
        self.effective_k
    }

    fn build_neighbour_matrix(&self, pool: &[Instance]) -> NeighbourMatrix {
        let n = pool.len();
        let mut cache = DistanceCache::new((n * (n + 1) / 2).max(1));

        let mut matrix: NeighbourMatrix = Vec::with_capacity(n);
        for i in 0..n {
            let mut row: Vec<(f64, f64)> = Vec::with_capacity(n.saturating_sub(1));
            for (j, neighbour) in pool.iter().enumerate() {
                if i == j {
                    continue;
                }
                let dist = cache.get_or_compute(i, j, || {
                    self.distance.compute(&pool[i].features, &neighbour.features)
                });
                row.push((dist, neighbour.goal));
            }
            row.sort_by(|a, b| a.0.total_cmp(&b.0));
            matrix.push(row);
        }

        debug!(
            "neighbour matrix built, distance cache hit rate {:.2}",
            cache.hit_rate()
        );
        matrix
    }

    /// Unweighted majority vote among the first k sorted neighbours
    fn vote(row: &[(f64, f64)], k: usize) -> f64 {
        let positive = row
            .iter()
            .take(k)
            .filter(|&&(_, goal)| goal == 1.0)
            .count();
        let taken = row.len().min(k);
        if positive > taken - positive {
            1.0
        } else {
            -1.0
        }
    }

    /// Leave-one-out quality of voting among k neighbours
    fn pool_quality(matrix: &NeighbourMatrix, pool: &[Instance], k: usize) -> f64 {
        let mut counts = ConfusionCounts::default();
        for (row, instance) in matrix.iter().zip(pool.iter()) {
            counts.record(Self::vote(row, k), instance.goal);
        }
        Metric::F1Score.compute(&counts)
    }

    /// Bisection over odd neighbour counts, comparing the quality just
    /// below and just above the midpoint
    fn select_neighbour_count(&self, matrix: &NeighbourMatrix, pool: &[Instance]) -> usize {
        let positive = pool.iter().filter(|instance| instance.goal == 1.0).count();
        let negative = pool.len() - positive;

        let mut minimal: usize = 3;
        let mut maximal: usize = positive.min(negative).max(1);
        if maximal <= minimal {
            return maximal.min(pool.len().saturating_sub(1)).max(1);
        }

        let mut minimal_quality = 0.0;
        let mut maximal_quality = 0.0;
        while maximal - minimal > 2 {
            let mut midpoint = (maximal + minimal) / 2;
            if midpoint % 2 == 0 {
                midpoint += 1;
            }
            let below = Self::pool_quality(matrix, pool, midpoint.saturating_sub(2));
            let above = Self::pool_quality(matrix, pool, midpoint + 2);

            if below < above {
                minimal = midpoint;
                minimal_quality = below;
            } else {
                maximal = midpoint;
                maximal_quality = above;
            }
            debug!(
                "neighbour count bisection: [{minimal} @ {minimal_quality:.3}, {maximal} @ {maximal_quality:.3}]"
            );
        }

        if minimal_quality > maximal_quality {
            minimal
        } else {
            maximal
        }
    }
}

impl<D: Distance + Clone + 'static> Classifier for KNearestNeighbours<D> {
    fn learn(
        &mut self,
        pool: &[Instance],
        _object_weights: &[f64],
        _curve: &mut LearningCurve,
    ) -> Result<()> {
        if pool.is_empty() {
            return Err(MlError::EmptyDataset);
        }
        self.features_count = pool[0].features_len();

        self.effective_k = match self.fixed_k {
            Some(k) => k.max(1),
            None => {
                let matrix = self.build_neighbour_matrix(pool);
                self.select_neighbour_count(&matrix, pool)
            }
        };

        let distance = self.distance.clone();
        let mut tree: InstanceTree = VpTree::new(Box::new(
            move |left: &Instance, right: &Instance| {
                distance.compute(&left.features, &right.features)
            },
        ));
        tree.create(pool.to_vec());
        self.tree = Some(tree);

        info!(
            "knn trained: {} neighbours, complexity {}",
            self.effective_k,
            self.complexity()
        );
        Ok(())
    }

    fn predict(&self, features: &NumericVector) -> f64 {
        let tree = match &self.tree {
            Some(tree) => tree,
            None => return 1.0,
        };

        let probe = Instance::new(features.clone(), 0.0);
        let neighbours = tree.search(&probe, self.effective_k);

        let vote: f64 = neighbours
            .iter()
            .enumerate()
            .map(|(rank, (neighbour, _))| {
                (self.neighbour_weight)(rank, self.effective_k) * neighbour.goal
            })
            .sum();
        if vote > 0.0 {
            1.0
        } else {
            -1.0
        }
    }

    fn complexity(&self) -> usize {
        let indexed = self.tree.as_ref().map(VpTree::len).unwrap_or(0);
        indexed * (self.features_count + 1)
    }
}

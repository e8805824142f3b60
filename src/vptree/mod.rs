//! Vantage-point tree
//!
//! A metric-space index over an opaque item type, parameterized by a
//! caller-supplied distance function. It has no dependency on the vector
//! layer: any `Fn(&T, &T) -> f64` that behaves like a metric works.
//!
//! Construction partitions each range around the median distance to a
//! randomly chosen pivot (a partial selection, not a full sort); queries
//! run a branch-and-bound best-first descent with a bounded max-heap of
//! the k best candidates seen so far.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rand::Rng;

struct Node {
    index: usize,
    threshold: f64,
    inner: Option<Box<Node>>,
    outer: Option<Box<Node>>,
}

struct HeapItem {
    index: usize,
    dist: f64,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist
    }
}

impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // max-heap on distance: the worst candidate sits on top
        self.dist.total_cmp(&other.dist)
    }
}

/// Vantage-point tree over items of type `T`
pub struct VpTree<T, D>
where
    D: Fn(&T, &T) -> f64,
{
    items: Vec<T>,
    root: Option<Box<Node>>,
    distance: D,
}

impl<T, D> VpTree<T, D>
where
    D: Fn(&T, &T) -> f64,
{
    /// Create an empty tree with the given distance function
    pub fn new(distance: D) -> Self {
        Self {
            items: Vec::new(),
            root: None,
            distance,
        }
    }

    /// Build the index over `items`, replacing any previous contents
    pub fn create(&mut self, items: Vec<T>) {
        let mut rng = rand::thread_rng();
        self.items = items;
        let upper = self.items.len();
        self.root = build_nodes(&mut self.items, &self.distance, 0, upper, &mut rng);
    }

    /// Number of indexed items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no items are indexed
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// k-nearest-neighbour query: the indexed items closest to `target`,
    /// nearest first, paired with their distances.
    pub fn search(&self, target: &T, k: usize) -> Vec<(&T, f64)> {
        if k == 0 {
            return Vec::new();
        }

        let mut heap: BinaryHeap<HeapItem> = BinaryHeap::new();
        let mut tau = f64::INFINITY;
        if let Some(root) = &self.root {
            self.search_node(root, target, k, &mut heap, &mut tau);
        }

        // the heap pops worst-first; into_sorted_vec flips that into
        // nearest-first order
        heap.into_sorted_vec()
            .into_iter()
            .map(|item| (&self.items[item.index], item.dist))
            .collect()
    }

    fn search_node(
        &self,
        node: &Node,
        target: &T,
        k: usize,
        heap: &mut BinaryHeap<HeapItem>,
        tau: &mut f64,
    ) {
        let dist = (self.distance)(&self.items[node.index], target);

        if dist < *tau {
            if heap.len() == k {
                heap.pop();
            }
            heap.push(HeapItem {
                index: node.index,
                dist,
            });
            if heap.len() == k {
                *tau = heap.peek().expect("heap holds k items").dist;
            }
        }

        if node.inner.is_none() && node.outer.is_none() {
            return;
        }

        // descend into the child whose ball may still hold something
        // closer than tau; both sides when the tau-ball straddles the
        // threshold
        if dist < node.threshold {
            if dist - *tau <= node.threshold {
                if let Some(inner) = &node.inner {
                    self.search_node(inner, target, k, heap, tau);
                }
            }
            if dist + *tau >= node.threshold {
                if let Some(outer) = &node.outer {
                    self.search_node(outer, target, k, heap, tau);
                }
            }
        } else {
            if dist + *tau >= node.threshold {
                if let Some(outer) = &node.outer {
                    self.search_node(outer, target, k, heap, tau);
                }
            }
            if dist - *tau <= node.threshold {
                if let Some(inner) = &node.inner {
                    self.search_node(inner, target, k, heap, tau);
                }
            }
        }
    }
}

fn build_nodes<T>(
    items: &mut [T],
    distance: &impl Fn(&T, &T) -> f64,
    lower: usize,
    upper: usize,
    rng: &mut impl Rng,
) -> Option<Box<Node>> {
    if upper == lower {
        return None;
    }

    let mut node = Node {
        index: lower,
        threshold: 0.0,
        inner: None,
        outer: None,
    };

    if upper - lower > 1 {
        // arbitrary pivot, moved to the front of the range
        let pivot_index = rng.gen_range(lower..upper);
        items.swap(lower, pivot_index);

        let median = (upper + lower) / 2;

        // partition the rest of the range around the median distance to
        // the pivot; a partial selection is enough
        let (head, tail) = items[lower..upper].split_at_mut(1);
        let pivot = &head[0];
        let median_offset = median - lower - 1;
        tail.select_nth_unstable_by(median_offset, |a, b| {
            distance(pivot, a).total_cmp(&distance(pivot, b))
        });
        node.threshold = distance(pivot, &tail[median_offset]);

        node.inner = build_nodes(items, distance, lower + 1, median, rng);
        node.outer = build_nodes(items, distance, median, upper, rng);
    }

    Some(Box::new(node))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_distance(a: &f64, b: &f64) -> f64 {
        (a - b).abs()
    }

    fn brute_force(items: &[f64], target: f64, k: usize) -> Vec<f64> {
        let mut dists: Vec<f64> = items.iter().map(|&v| (v - target).abs()).collect();
        dists.sort_by(|a, b| a.total_cmp(b));
        dists.truncate(k);
        dists
    }

    #[test]
    fn test_search_exact_recall() {
        let items: Vec<f64> = (0..100).map(|i| ((i * 37) % 101) as f64 * 0.5).collect();
        let mut tree = VpTree::new(scalar_distance);
        tree.create(items.clone());

        for &target in &[0.0, 13.7, 25.0, 49.9] {
            for k in [1, 3, 10] {
                let found = tree.search(&target, k);
                let expected = brute_force(&items, target, k);
                let found_dists: Vec<f64> = found.iter().map(|&(_, d)| d).collect();
                assert_eq!(found_dists, expected, "target {target} k {k}");
            }
        }
    }

    #[test]
    fn test_results_ordered_nearest_first() {
        let items = vec![1.0, 5.0, 9.0, 2.0, 7.0];
        let mut tree = VpTree::new(scalar_distance);
        tree.create(items);

        let results = tree.search(&4.0, 5);
        let dists: Vec<f64> = results.iter().map(|&(_, d)| d).collect();
        let mut sorted = dists.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(dists, sorted);
    }

    #[test]
    fn test_k_larger_than_item_count() {
        let mut tree = VpTree::new(scalar_distance);
        tree.create(vec![1.0, 2.0, 3.0]);
        let results = tree.search(&0.0, 10);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_singleton_and_empty() {
        let mut tree = VpTree::new(scalar_distance);
        tree.create(vec![42.0]);
        let results = tree.search(&40.0, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(*results[0].0, 42.0);
        assert_eq!(results[0].1, 2.0);

        let mut empty: VpTree<f64, _> = VpTree::new(scalar_distance);
        empty.create(Vec::new());
        assert!(empty.is_empty());
        assert!(empty.search(&0.0, 3).is_empty());
    }

    #[test]
    fn test_zero_k() {
        let mut tree = VpTree::new(scalar_distance);
        tree.create(vec![1.0, 2.0]);
        assert!(tree.search(&1.5, 0).is_empty());
    }

    #[test]
    fn test_search_over_vectors() {
        use crate::vector::{Distance, EuclideanDistance, NumericVector};

        let items: Vec<NumericVector> = vec![
            NumericVector::from_dense(&[0.0, 0.0]),
            NumericVector::from_dense(&[1.0, 0.0]),
            NumericVector::from_dense(&[0.0, 3.0]),
            NumericVector::from_dense(&[4.0, 4.0]),
        ];
        let mut tree = VpTree::new(|a: &NumericVector, b: &NumericVector| {
            EuclideanDistance.compute(a, b)
        });
        tree.create(items);

        let target = NumericVector::from_dense(&[0.9, 0.1]);
        let results = tree.search(&target, 2);
        assert_eq!(results[0].0.to_dense(), vec![1.0, 0.0]);
        assert_eq!(results[1].0.to_dense(), vec![0.0, 0.0]);
    }
}

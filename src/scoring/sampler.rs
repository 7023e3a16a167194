//! Depth-stratified sampling of leaf triplets.

use crate::error::{LineageError, Result};
use crate::model::tree::{LineageTree, VertexIndex};
use crate::scoring::triplet::Triplet;
use log::debug;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How the requested number of trials is split across eligible depth buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// Same number of trials for every bucket; the remainder goes to the
    /// shallowest buckets.
    #[default]
    Uniform,
    /// Trials in proportion to the number of triplets of each bucket
    /// (largest remainder rounding).
    Proportional,
}

/// A sampled triplet together with the depth of its LCA in the reference tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledTriplet {
    /// The three sampled leaves
    pub triplet: Triplet,
    /// Depth of the triplet's LCA in the reference tree
    pub depth: usize,
}

/// All triplets whose LCA lies at one depth of the reference tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthBucket {
    /// LCA depth of this bucket
    pub depth: usize,
    /// Number of leaf triplets whose LCA lies at this depth
    pub num_triplets: u128,
    /// Vertices at this depth that are the LCA of at least one triplet
    vertices: Vec<VertexIndex>,
    /// Number of triplets per vertex in `vertices`
    vertex_triplets: Vec<u128>,
}

// =#========================================================================#=
// TRIPLET SAMPLER
// =#========================================================================#=
/// Samples leaf triplets of a reference tree, stratified by LCA depth.
///
/// On construction, every vertex `v` is assigned the number of triplets whose
/// LCA is exactly `v`: `C(n_v, 3) - Σ_children C(n_c, 3)` for `n` the number
/// of leaves below a vertex. Vertices are grouped into buckets by depth.
///
/// Sampling only uses buckets with at least `min_size_depth` triplets. Within
/// a bucket, a vertex is chosen with probability proportional to its triplet
/// count, and three distinct leaves below it are drawn until they do not all
/// descend from the same child. This samples uniformly among the bucket's
/// triplets.
///
/// # Example
/// ```
/// use lintrace::model::LineageTree;
/// use lintrace::scoring::{AllocationPolicy, TripletSampler};
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// // ((A,B),(C,D));
/// let mut tree = LineageTree::new(0);
/// let root = tree.add_root(vec![]);
/// let x = tree.add_internal(root, vec![]);
/// let y = tree.add_internal(root, vec![]);
/// for (parent, sample) in [(x, "A"), (x, "B"), (y, "C"), (y, "D")] {
///     tree.add_leaf(parent, sample, vec![]);
/// }
///
/// let sampler = TripletSampler::new(&tree);
/// assert_eq!(sampler.num_triplets_at_depth(0), 4);
///
/// let mut rng = ChaCha8Rng::seed_from_u64(3);
/// let triplets = sampler.sample(10, 1, AllocationPolicy::Uniform, &mut rng).unwrap();
/// assert_eq!(triplets.len(), 10);
/// assert!(triplets.iter().all(|t| t.depth == 0));
/// ```
#[derive(Debug, Clone)]
pub struct TripletSampler<'a> {
    tree: &'a LineageTree,
    buckets: BTreeMap<usize, DepthBucket>,
}

impl<'a> TripletSampler<'a> {
    /// Counts the triplets of every LCA depth of `tree`.
    pub fn new(tree: &'a LineageTree) -> Self {
        let leaf_counts = tree.leaf_counts();
        let depths = tree.depths();
        let mut buckets: BTreeMap<usize, DepthBucket> = BTreeMap::new();

        for vertex in tree.pre_order_iter().filter(|v| !v.is_leaf()) {
            let below: u128 = vertex
                .children()
                .iter()
                .map(|&c| choose3(leaf_counts[c]))
                .sum();
            let num_triplets = choose3(leaf_counts[vertex.index()]) - below;
            if num_triplets == 0 {
                continue;
            }

            let depth = depths[vertex.index()];
            let bucket = buckets.entry(depth).or_insert_with(|| DepthBucket {
                depth,
                num_triplets: 0,
                vertices: Vec::new(),
                vertex_triplets: Vec::new(),
            });
            bucket.num_triplets += num_triplets;
            bucket.vertices.push(vertex.index());
            bucket.vertex_triplets.push(num_triplets);
        }

        TripletSampler { tree, buckets }
    }

    /// Returns the non-empty buckets ordered by depth.
    pub fn buckets(&self) -> impl Iterator<Item = &DepthBucket> + '_ {
        self.buckets.values()
    }

    /// Returns the number of triplets whose LCA lies at `depth`.
    pub fn num_triplets_at_depth(&self, depth: usize) -> u128 {
        self.buckets.get(&depth).map_or(0, |b| b.num_triplets)
    }

    /// Returns the depths of buckets holding at least `min_size_depth` triplets.
    pub fn eligible_depths(&self, min_size_depth: usize) -> Vec<usize> {
        self.buckets
            .values()
            .filter(|b| b.num_triplets >= min_size_depth as u128)
            .map(|b| b.depth)
            .collect()
    }

    /// Samples `number_of_trials` triplets from the eligible buckets.
    ///
    /// Buckets are visited shallowest first; the output never holds more than
    /// `number_of_trials` triplets.
    ///
    /// # Errors
    /// * [LineageError::Configuration] if `number_of_trials` or
    ///   `min_size_depth` is zero
    /// * [LineageError::InsufficientData] if no bucket holds at least
    ///   `min_size_depth` triplets
    pub fn sample<R: Rng + ?Sized>(
        &self,
        number_of_trials: usize,
        min_size_depth: usize,
        allocation: AllocationPolicy,
        rng: &mut R,
    ) -> Result<Vec<SampledTriplet>> {
        if number_of_trials == 0 {
            return Err(LineageError::config("number of trials must be positive"));
        }
        if min_size_depth == 0 {
            return Err(LineageError::config("minimum bucket size must be positive"));
        }

        let eligible: Vec<&DepthBucket> = self
            .buckets
            .values()
            .filter(|b| b.num_triplets >= min_size_depth as u128)
            .collect();
        if eligible.is_empty() {
            return Err(LineageError::InsufficientData(format!(
                "no LCA depth holds at least {} triplets (largest bucket: {})",
                min_size_depth,
                self.buckets.values().map(|b| b.num_triplets).max().unwrap_or(0)
            )));
        }

        let sizes: Vec<u128> = eligible.iter().map(|b| b.num_triplets).collect();
        let trials = allocate(&sizes, number_of_trials, allocation);

        let mut members: HashMap<VertexIndex, Vec<(&str, usize)>> = HashMap::new();
        let mut sampled = Vec::with_capacity(number_of_trials);
        for (bucket, &num_trials) in eligible.iter().zip(&trials) {
            if num_trials == 0 {
                continue;
            }
            debug!(
                "Sampling {} triplets at depth {} ({} available)",
                num_trials, bucket.depth, bucket.num_triplets
            );

            let weights: Vec<f64> = bucket.vertex_triplets.iter().map(|&t| t as f64).collect();
            let chooser = WeightedIndex::new(&weights)
                .map_err(|e| LineageError::InvalidTree(format!("triplet weights: {e}")))?;
            for _ in 0..num_trials {
                let vertex = bucket.vertices[chooser.sample(rng)];
                let leaves = members
                    .entry(vertex)
                    .or_insert_with(|| self.leaves_by_child(vertex));
                sampled.push(SampledTriplet {
                    triplet: draw_triplet(leaves, rng),
                    depth: bucket.depth,
                });
            }
        }

        Ok(sampled)
    }

    /// Leaves below `vertex`, each paired with the position of the child
    /// whose subtree contains it.
    fn leaves_by_child(&self, vertex: VertexIndex) -> Vec<(&'a str, usize)> {
        let tree = self.tree;
        let mut leaves = Vec::new();
        for (position, &child) in tree[vertex].children().iter().enumerate() {
            leaves.extend(
                tree.leaves_in_subtree(child)
                    .into_iter()
                    .filter_map(|leaf| tree[leaf].sample())
                    .map(|sample| (sample, position)),
            );
        }
        leaves
    }
}

/// Draws three distinct leaves that do not all descend from the same child.
///
/// Requires that such a triple exists, which holds for every vertex with a
/// positive triplet count.
fn draw_triplet<R: Rng + ?Sized>(leaves: &[(&str, usize)], rng: &mut R) -> Triplet {
    loop {
        let picked = rand::seq::index::sample(rng, leaves.len(), 3);
        let (a, b, c) = (
            leaves[picked.index(0)],
            leaves[picked.index(1)],
            leaves[picked.index(2)],
        );
        if a.1 == b.1 && b.1 == c.1 {
            continue;
        }
        return Triplet::new(a.0, b.0, c.0);
    }
}

/// Splits `number_of_trials` across buckets of the given sizes.
fn allocate(sizes: &[u128], number_of_trials: usize, policy: AllocationPolicy) -> Vec<usize> {
    let k = sizes.len();
    match policy {
        AllocationPolicy::Uniform => {
            let base = number_of_trials / k;
            let remainder = number_of_trials % k;
            (0..k).map(|i| base + usize::from(i < remainder)).collect()
        }
        AllocationPolicy::Proportional => {
            let total: f64 = sizes.iter().map(|&s| s as f64).sum();
            let quotas: Vec<f64> = sizes
                .iter()
                .map(|&s| number_of_trials as f64 * s as f64 / total)
                .collect();
            let mut trials: Vec<usize> = quotas.iter().map(|q| q.floor() as usize).collect();

            let assigned: usize = trials.iter().sum();
            let mut by_remainder: Vec<usize> = (0..k).collect();
            by_remainder.sort_by(|&a, &b| {
                let ra = quotas[a] - quotas[a].floor();
                let rb = quotas[b] - quotas[b].floor();
                rb.total_cmp(&ra)
            });
            for &i in by_remainder
                .iter()
                .take(number_of_trials.saturating_sub(assigned))
            {
                trials[i] += 1;
            }
            trials
        }
    }
}

/// Binomial coefficient `C(n, 3)`.
fn choose3(n: usize) -> u128 {
    if n < 3 {
        return 0;
    }
    let n = n as u128;
    n * (n - 1) * (n - 2) / 6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose3() {
        assert_eq!(choose3(0), 0);
        assert_eq!(choose3(2), 0);
        assert_eq!(choose3(3), 1);
        assert_eq!(choose3(8), 56);
    }

    #[test]
    fn test_allocate_uniform() {
        assert_eq!(allocate(&[5, 100, 7], 10, AllocationPolicy::Uniform), vec![4, 3, 3]);
        assert_eq!(allocate(&[5, 100, 7], 2, AllocationPolicy::Uniform), vec![1, 1, 0]);
    }

    #[test]
    fn test_allocate_proportional() {
        let trials = allocate(&[10, 30, 60], 10, AllocationPolicy::Proportional);
        assert_eq!(trials, vec![1, 3, 6]);

        let trials = allocate(&[1, 1, 1], 10, AllocationPolicy::Proportional);
        assert_eq!(trials.iter().sum::<usize>(), 10);
    }
}

//! Triplet-based comparison of a reconstructed tree against the true tree.

use crate::error::{LineageError, Result};
use crate::model::lca::LcaOracle;
use crate::model::tree::LineageTree;
use crate::scoring::sampler::{AllocationPolicy, TripletSampler};
use crate::scoring::triplet::{outgroup, Outgroup};
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How trials on unresolved triplets (polytomies) are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    /// An unresolved triplet in either tree counts as an incorrect trial.
    #[default]
    Incorrect,
    /// Trials with an unresolved triplet in either tree are dropped.
    Exclude,
}

/// Default minimum number of triplets for a depth bucket to be sampled.
pub const DEFAULT_MIN_SIZE_DEPTH: usize = 3;

// =#========================================================================#=
// SCORING CONFIG
// =#========================================================================#=
/// Parameters of a triplet comparison.
///
/// # Example
/// ```
/// use lintrace::scoring::{AllocationPolicy, ScoringConfig, TiePolicy};
///
/// let config = ScoringConfig::new(500)
///     .with_min_size_depth(20)
///     .modified(true)
///     .with_tie_policy(TiePolicy::Exclude)
///     .with_allocation(AllocationPolicy::Proportional);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Number of triplets to sample
    pub number_of_trials: usize,
    /// Minimum number of triplets of an LCA-depth bucket to be sampled
    pub min_size_depth: usize,
    /// Whether to average per-depth accuracies instead of pooling trials
    pub modified: bool,
    /// Treatment of unresolved triplets
    pub tie_policy: TiePolicy,
    /// Split of trials across depth buckets
    pub allocation: AllocationPolicy,
}

impl ScoringConfig {
    /// Creates a config with pooled accuracy, ties as incorrect and uniform
    /// allocation.
    pub fn new(number_of_trials: usize) -> Self {
        ScoringConfig {
            number_of_trials,
            min_size_depth: DEFAULT_MIN_SIZE_DEPTH,
            modified: false,
            tie_policy: TiePolicy::default(),
            allocation: AllocationPolicy::default(),
        }
    }

    /// Sets the minimum bucket size.
    pub fn with_min_size_depth(mut self, min_size_depth: usize) -> Self {
        self.min_size_depth = min_size_depth;
        self
    }

    /// Sets whether per-depth accuracies are averaged.
    pub fn modified(mut self, modified: bool) -> Self {
        self.modified = modified;
        self
    }

    /// Sets the tie policy.
    pub fn with_tie_policy(mut self, tie_policy: TiePolicy) -> Self {
        self.tie_policy = tie_policy;
        self
    }

    /// Sets the allocation policy.
    pub fn with_allocation(mut self, allocation: AllocationPolicy) -> Self {
        self.allocation = allocation;
        self
    }

    /// Checks that trials and minimum bucket size are positive.
    ///
    /// # Errors
    /// [LineageError::Configuration] otherwise.
    pub fn validate(&self) -> Result<()> {
        if self.number_of_trials == 0 {
            return Err(LineageError::config("number of trials must be positive"));
        }
        if self.min_size_depth == 0 {
            return Err(LineageError::config("minimum bucket size must be positive"));
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig::new(1000)
    }
}

// =#========================================================================#=
// SCORE
// =#========================================================================#=
/// Trial counts of one LCA-depth bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DepthAccuracy {
    /// Number of counted trials with agreeing outgroups
    pub correct: usize,
    /// Number of counted trials
    pub total: usize,
    /// Number of trials dropped under [TiePolicy::Exclude]
    pub excluded: usize,
}

impl DepthAccuracy {
    /// Fraction of correct trials, or `None` if no trial was counted.
    pub fn accuracy(&self) -> Option<f64> {
        (self.total > 0).then(|| self.correct as f64 / self.total as f64)
    }
}

/// Result of a triplet comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripletScore {
    value: f64,
    modified: bool,
    by_depth: BTreeMap<usize, DepthAccuracy>,
}

impl TripletScore {
    /// The score in `[0, 1]`.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether [value](Self::value) averages per-depth accuracies.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Trial counts per LCA depth.
    pub fn by_depth(&self) -> &BTreeMap<usize, DepthAccuracy> {
        &self.by_depth
    }

    /// Number of counted trials over all depths.
    pub fn num_trials(&self) -> usize {
        self.by_depth.values().map(|d| d.total).sum()
    }

    /// Number of correct trials over all depths.
    pub fn num_correct(&self) -> usize {
        self.by_depth.values().map(|d| d.correct).sum()
    }

    /// Number of excluded trials over all depths.
    pub fn num_excluded(&self) -> usize {
        self.by_depth.values().map(|d| d.excluded).sum()
    }
}

impl fmt::Display for TripletScore {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Triplet score: {:.4} ({}, {}/{} correct)",
            self.value,
            if self.modified { "depth-averaged" } else { "pooled" },
            self.num_correct(),
            self.num_trials()
        )?;
        for (depth, counts) in &self.by_depth {
            write!(f, "  depth {:>2}: {:>5}/{:<5}", depth, counts.correct, counts.total)?;
            if let Some(accuracy) = counts.accuracy() {
                write!(f, " {accuracy:.4}")?;
            }
            if counts.excluded > 0 {
                write!(f, " ({} excluded)", counts.excluded)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// =#========================================================================#=
// TRIPLET SCORER
// =#========================================================================#=
/// Compares a reconstructed tree against the true tree on sampled triplets.
///
/// Triplets are sampled from the true tree by [TripletSampler]. A trial is
/// correct if both trees name the same outgroup. Unresolved triplets are
/// handled by the configured [TiePolicy].
///
/// # Example
/// ```
/// use lintrace::model::LineageTree;
/// use lintrace::scoring::{ScoringConfig, TripletScorer};
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let mut tree = LineageTree::new(0);
/// let root = tree.add_root(vec![]);
/// let x = tree.add_internal(root, vec![]);
/// for (parent, sample) in [(x, "A"), (x, "B"), (root, "C")] {
///     tree.add_leaf(parent, sample, vec![]);
/// }
///
/// let scorer = TripletScorer::new(ScoringConfig::new(20).with_min_size_depth(1)).unwrap();
/// let mut rng = ChaCha8Rng::seed_from_u64(1);
/// let score = scorer.score(&tree, &tree, &mut rng).unwrap();
/// assert_eq!(score.value(), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct TripletScorer {
    config: ScoringConfig,
}

impl TripletScorer {
    /// Creates a scorer.
    ///
    /// # Errors
    /// [LineageError::Configuration] if the config is invalid.
    pub fn new(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        Ok(TripletScorer { config })
    }

    /// Returns the scoring config.
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores `reconstructed` against `true_tree`.
    ///
    /// # Errors
    /// * [LineageError::InsufficientData] if no depth bucket of the true tree
    ///   is large enough, or every trial was excluded
    /// * [LineageError::MissingLeaf] if a sampled leaf is absent from the
    ///   reconstructed tree; checked before any trial is scored
    pub fn score<R: Rng + ?Sized>(
        &self,
        true_tree: &LineageTree,
        reconstructed: &LineageTree,
        rng: &mut R,
    ) -> Result<TripletScore> {
        let sampler = TripletSampler::new(true_tree);
        let sampled = sampler.sample(
            self.config.number_of_trials,
            self.config.min_size_depth,
            self.config.allocation,
            rng,
        )?;

        let mut trials = Vec::with_capacity(sampled.len());
        for s in &sampled {
            let true_leaves = s.triplet.leaves(true_tree, "true")?;
            let reconstructed_leaves = s.triplet.leaves(reconstructed, "reconstructed")?;
            trials.push((s.depth, true_leaves, reconstructed_leaves));
        }

        let true_lca = LcaOracle::new(true_tree);
        let reconstructed_lca = LcaOracle::new(reconstructed);
        let mut by_depth: BTreeMap<usize, DepthAccuracy> = BTreeMap::new();
        for (depth, true_leaves, reconstructed_leaves) in trials {
            let expected = outgroup(&true_lca, true_leaves);
            let observed = outgroup(&reconstructed_lca, reconstructed_leaves);
            let counts = by_depth.entry(depth).or_default();

            match (expected, observed) {
                (Outgroup::Leaf(e), Outgroup::Leaf(o)) => {
                    counts.total += 1;
                    if e == o {
                        counts.correct += 1;
                    }
                }
                _ => match self.config.tie_policy {
                    TiePolicy::Incorrect => counts.total += 1,
                    TiePolicy::Exclude => counts.excluded += 1,
                },
            }
        }

        let value = aggregate(&by_depth, self.config.modified)?;
        for (depth, counts) in &by_depth {
            debug!(
                "Depth {}: {}/{} correct, {} excluded",
                depth, counts.correct, counts.total, counts.excluded
            );
        }
        info!(
            "Triplet score {:.4} over {} sampled triplets",
            value,
            sampled.len()
        );

        Ok(TripletScore {
            value,
            modified: self.config.modified,
            by_depth,
        })
    }
}

/// Pooled accuracy, or the unweighted mean of per-depth accuracies when
/// `modified`; depths without counted trials are skipped.
fn aggregate(by_depth: &BTreeMap<usize, DepthAccuracy>, modified: bool) -> Result<f64> {
    let accuracies: Vec<f64> = by_depth.values().filter_map(|d| d.accuracy()).collect();
    if accuracies.is_empty() {
        return Err(LineageError::InsufficientData(
            "every sampled trial was excluded".to_string(),
        ));
    }

    if modified {
        Ok(accuracies.iter().sum::<f64>() / accuracies.len() as f64)
    } else {
        let correct: usize = by_depth.values().map(|d| d.correct).sum();
        let total: usize = by_depth.values().map(|d| d.total).sum();
        Ok(correct as f64 / total as f64)
    }
}

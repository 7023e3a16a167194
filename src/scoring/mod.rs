//! Triplet-based comparison of lineage trees.
//!
//! - [Triplet] and [outgroup]: which of three leaves is the outgroup in a tree.
//! - [TripletSampler]: samples triplets of a reference tree stratified by the
//!   depth of their LCA.
//! - [TripletScorer]: compares outgroups of sampled triplets between the true
//!   and a reconstructed tree and aggregates per-depth accuracies.
//!
//! For a one-off comparison use [score_triplets].

mod sampler;
mod scorer;
mod triplet;

pub use sampler::{AllocationPolicy, DepthBucket, SampledTriplet, TripletSampler};
pub use scorer::{
    DepthAccuracy, ScoringConfig, TiePolicy, TripletScore, TripletScorer, DEFAULT_MIN_SIZE_DEPTH,
};
pub use triplet::{outgroup, triplet_outgroup, Outgroup, Triplet};

use crate::error::Result;
use crate::model::tree::LineageTree;
use rand::Rng;

/// Scores `reconstructed` against `true_tree` and returns the value in `[0, 1]`.
///
/// # Errors
/// See [TripletScorer::score].
pub fn score_triplets<R: Rng + ?Sized>(
    true_tree: &LineageTree,
    reconstructed: &LineageTree,
    config: ScoringConfig,
    rng: &mut R,
) -> Result<f64> {
    let scorer = TripletScorer::new(config)?;
    Ok(scorer.score(true_tree, reconstructed, rng)?.value())
}

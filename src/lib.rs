//! lintrace is a library to benchmark cell-lineage reconstruction for
//! CRISPR-based lineage tracing.
//!
//! It simulates ground-truth lineage trees and scores how well a
//! reconstructed tree recovers their topology.
//! Core functionality provided:
//! - Simulation: perfect binary division trees of fixed depth whose
//!   characters mutate irreversibly, followed by leaf dropout and
//!   subsampling. See [crate::simulation].
//! - Scoring: depth-stratified sampling of leaf triplets and comparison of
//!   their outgroups between the true and a reconstructed tree.
//!   See [crate::scoring].
//! - Tree model: [LineageTree] uses the arena pattern, so no direct vertex
//!   references are stored, only vertex indices. Reconstructed trees may
//!   contain polytomies. See [crate::model].
//! - Persistence: lossless JSON ([crate::io::json]) and Newick import/export
//!   ([crate::newick]).
//! - Reproducibility: all randomness flows through an explicit RNG.
//!
//! Logging uses the [log] facade; the library never installs a logger.
//!
//! # Example
//! Simulate a tree and score it against itself and against a star:
//! ```
//! use lintrace::model::{CharacterState, LineageTree};
//! use lintrace::scoring::{ScoringConfig, TripletScorer};
//! use lintrace::simulation::{LineageSimulator, MutationModel, SimulationConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let model = MutationModel::uniform(5, 3, 0.2, 0.0)?;
//! let simulator = LineageSimulator::new(SimulationConfig::new(4, 5), model)?;
//! let true_tree = simulator.generate_simulated_full_tree(&mut rng)?;
//!
//! let scorer = TripletScorer::new(ScoringConfig::new(200))?;
//! assert_eq!(scorer.score(&true_tree, &true_tree, &mut rng)?.value(), 1.0);
//!
//! let mut star = LineageTree::new(5);
//! let root = star.add_root(vec![CharacterState::Unmutated; 5]);
//! for (sample, states) in true_tree.character_matrix().rows() {
//!     star.add_leaf(root, sample, states.to_vec());
//! }
//! assert_eq!(scorer.score(&true_tree, &star, &mut rng)?.value(), 0.0);
//! # Ok::<(), lintrace::error::LineageError>(())
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod newick;
pub mod parser;
pub mod scoring;
pub mod simulation;

pub use error::{LineageError, Result};
pub use model::{CharacterMatrix, CharacterState, LineageTree};
pub use scoring::{score_triplets, ScoringConfig, TripletScorer};
pub use simulation::{LineageSimulator, MutationModel, SimulationConfig};

use crate::parser::ParsingError;

// ============================================================================
// Quick Newick API
// ============================================================================
/// Parse a Newick string using default settings, returning a [LineageTree]
/// without characters.
///
/// See [`newick::parse_str`] for full documentation of this convenience function.
pub fn parse_newick_str<S: AsRef<str>>(newick: S) -> std::result::Result<LineageTree, ParsingError> {
    newick::parse_str(newick)
}

/// Parse a file containing a semicolon-separated list of Newick strings
/// using default settings.
///
/// See [`newick::parse_file`] for full documentation of this convenience function.
pub fn parse_newick_file<P: AsRef<std::path::Path>>(
    path: P,
) -> std::result::Result<Vec<LineageTree>, ParsingError> {
    newick::parse_file(path)
}

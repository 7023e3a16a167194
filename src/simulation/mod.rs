//! Simulation of ground-truth lineage trees.
//!
//! - [MutationModel]: per-character mutation probability, mutant-state
//!   distribution and dropout probability.
//! - [LineageSimulator]: builds a perfect binary division tree, applies
//!   dropout at the leaves and subsamples them.
//!
//! # Example
//! ```
//! use lintrace::simulation::{LineageSimulator, MutationModel, NegativeBinomial, SimulationConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//! let model = MutationModel::from_negative_binomial(
//!     8, 10, 0.1, 0.05, NegativeBinomial::default(), &mut rng,
//! ).unwrap();
//! let simulator = LineageSimulator::new(SimulationConfig::new(5, 8), model).unwrap();
//! let tree = simulator.generate_simulated_full_tree(&mut rng).unwrap();
//! assert_eq!(tree.num_leaves(), 32);
//! ```

mod mutation_model;
mod simulator;

pub use mutation_model::{MutationModel, NegativeBinomial};
pub use simulator::{LineageSimulator, SimulationConfig, MAX_DEPTH, SAMPLE_PREFIX};

//! Ground-truth lineage simulation.

use crate::error::{LineageError, Result};
use crate::model::state::{unmutated_states, CharacterState};
use crate::model::tree::{LineageTree, VertexIndex};
use crate::simulation::mutation_model::MutationModel;
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Largest supported number of division generations.
pub const MAX_DEPTH: usize = 30;

/// Prefix of simulated leaf sample identifiers, followed by the leaf's
/// left-to-right position.
pub const SAMPLE_PREFIX: &str = "cell_";

// =#========================================================================#=
// SIMULATION CONFIG
// =#========================================================================#=
/// Parameters of a lineage simulation.
///
/// # Example
/// ```
/// use lintrace::simulation::SimulationConfig;
///
/// let config = SimulationConfig::new(4, 10).with_subsample_percentage(0.5);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.num_full_leaves(), 16);
/// assert_eq!(config.num_retained_leaves(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of division generations `D`
    pub depth: usize,
    /// Number of characters `C`
    pub num_characters: usize,
    /// Fraction of the `2^D` leaves that is observed, in `(0, 1]`
    pub subsample_percentage: f64,
}

impl SimulationConfig {
    /// Creates a config without subsampling.
    pub fn new(depth: usize, num_characters: usize) -> Self {
        SimulationConfig {
            depth,
            num_characters,
            subsample_percentage: 1.0,
        }
    }

    /// Sets the fraction of leaves to retain.
    pub fn with_subsample_percentage(mut self, subsample_percentage: f64) -> Self {
        self.subsample_percentage = subsample_percentage;
        self
    }

    /// Number of leaves of the full tree, `2^D`.
    pub fn num_full_leaves(&self) -> usize {
        1usize << self.depth.min(MAX_DEPTH)
    }

    /// Number of leaves retained by subsampling, `round(p * 2^D)`.
    pub fn num_retained_leaves(&self) -> usize {
        retained_count(self.subsample_percentage, self.num_full_leaves())
    }

    /// Checks all parameters.
    ///
    /// # Errors
    /// [LineageError::Configuration] if `D < 1`, `D > MAX_DEPTH`, `C < 1`,
    /// the subsample percentage lies outside `(0, 1]`, or it retains no leaf.
    pub fn validate(&self) -> Result<()> {
        if self.depth < 1 {
            return Err(LineageError::config("depth must be at least 1"));
        }
        if self.depth > MAX_DEPTH {
            return Err(LineageError::config(format!(
                "depth {} exceeds maximum of {}",
                self.depth, MAX_DEPTH
            )));
        }
        if self.num_characters < 1 {
            return Err(LineageError::config("number of characters must be at least 1"));
        }
        check_subsample_percentage(self.subsample_percentage)?;
        if self.num_retained_leaves() == 0 {
            return Err(LineageError::config(format!(
                "subsample percentage {} retains no leaf of {}",
                self.subsample_percentage,
                self.num_full_leaves()
            )));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig::new(8, 10)
    }
}

fn check_subsample_percentage(p: f64) -> Result<()> {
    if p > 0.0 && p <= 1.0 {
        Ok(())
    } else {
        Err(LineageError::config(format!(
            "subsample percentage must lie in (0, 1], got {p}"
        )))
    }
}

fn retained_count(p: f64, num_leaves: usize) -> usize {
    (p * num_leaves as f64).round() as usize
}

// =#========================================================================#=
// LINEAGE SIMULATOR
// =#========================================================================#=
/// Simulates ground-truth lineage trees.
///
/// A simulation runs in three stages, each also callable on its own:
/// 1. [generate_full_tree](Self::generate_full_tree): perfect binary tree of
///    depth `D` whose characters mutate irreversibly at every division,
/// 2. [apply_dropout](Self::apply_dropout): leaf characters are lost with the
///    per-character dropout probability,
/// 3. [subsample](Self::subsample): a uniform subset of the leaves is kept.
///
/// All randomness comes from the passed RNG, so a seeded RNG makes every
/// stage deterministic.
///
/// # Example
/// ```
/// use lintrace::simulation::{LineageSimulator, MutationModel, SimulationConfig};
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let model = MutationModel::uniform(5, 4, 0.3, 0.0).unwrap();
/// let config = SimulationConfig::new(3, 5).with_subsample_percentage(0.5);
/// let simulator = LineageSimulator::new(config, model).unwrap();
///
/// let mut rng = ChaCha8Rng::seed_from_u64(42);
/// let tree = simulator.generate_simulated_full_tree(&mut rng).unwrap();
/// assert_eq!(tree.num_leaves(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct LineageSimulator {
    config: SimulationConfig,
    model: MutationModel,
}

impl LineageSimulator {
    /// Creates a simulator.
    ///
    /// # Errors
    /// [LineageError::Configuration] if the config is invalid or the model's
    /// number of characters differs from the configured `C`.
    pub fn new(config: SimulationConfig, model: MutationModel) -> Result<Self> {
        config.validate()?;
        if model.num_characters() != config.num_characters {
            return Err(LineageError::config(format!(
                "mutation model has {} characters, simulation requests {}",
                model.num_characters(),
                config.num_characters
            )));
        }
        Ok(LineageSimulator { config, model })
    }

    /// Returns the simulation config.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns the mutation model.
    pub fn model(&self) -> &MutationModel {
        &self.model
    }

    /// Runs all stages: full tree, dropout, subsampling.
    ///
    /// # Errors
    /// Only if subsampling fails, which a validated config prevents.
    pub fn generate_simulated_full_tree<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<LineageTree> {
        let mut tree = self.generate_full_tree(rng);
        self.apply_dropout(&mut tree, rng);
        let tree = self.subsample(&tree, rng)?;
        info!(
            "Simulated lineage tree: depth {}, {} characters, {} of {} leaves retained",
            self.config.depth,
            self.config.num_characters,
            tree.num_leaves(),
            self.config.num_full_leaves()
        );
        Ok(tree)
    }

    /// Builds the perfect binary tree of depth `D`.
    ///
    /// The root is unmutated; every character of a daughter cell is drawn
    /// from its mother's state via [MutationModel::mutate]. Leaves are named
    /// `cell_0`, `cell_1`, ... from left to right.
    pub fn generate_full_tree<R: Rng + ?Sized>(&self, rng: &mut R) -> LineageTree {
        let num_vertices = 2 * self.config.num_full_leaves() - 1;
        let mut tree = LineageTree::with_capacity(self.config.num_characters, num_vertices);
        let root = tree.add_root(unmutated_states(self.config.num_characters));

        let mut next_leaf = 0;
        self.divide(&mut tree, root, 0, &mut next_leaf, rng);
        debug!(
            "Generated full tree with {} vertices and {} leaves",
            tree.num_vertices(),
            tree.num_leaves()
        );
        tree
    }

    fn divide<R: Rng + ?Sized>(
        &self,
        tree: &mut LineageTree,
        parent: VertexIndex,
        depth: usize,
        next_leaf: &mut usize,
        rng: &mut R,
    ) {
        for _ in 0..2 {
            let states = self.daughter_states(tree[parent].states(), rng);
            if depth + 1 == self.config.depth {
                tree.add_leaf(parent, format!("{SAMPLE_PREFIX}{next_leaf}"), states);
                *next_leaf += 1;
            } else {
                let child = tree.add_internal(parent, states);
                self.divide(tree, child, depth + 1, next_leaf, rng);
            }
        }
    }

    fn daughter_states<R: Rng + ?Sized>(
        &self,
        parent: &[CharacterState],
        rng: &mut R,
    ) -> Vec<CharacterState> {
        parent
            .iter()
            .enumerate()
            .map(|(character, &state)| self.model.mutate(state, character, rng))
            .collect()
    }

    /// Replaces leaf characters by [CharacterState::Missing], independently
    /// with each character's dropout probability. Internal vertices are never
    /// touched.
    pub fn apply_dropout<R: Rng + ?Sized>(&self, tree: &mut LineageTree, rng: &mut R) {
        let leaves: Vec<VertexIndex> = tree.leaves().map(|l| l.index()).collect();
        let mut num_dropped = 0;
        for leaf in leaves {
            let mut states = tree[leaf].states().to_vec();
            for (character, state) in states.iter_mut().enumerate() {
                if self.model.sample_dropout(character, rng) {
                    *state = CharacterState::Missing;
                    num_dropped += 1;
                }
            }
            tree.set_states(leaf, states);
        }
        debug!("Dropout removed {} leaf character observations", num_dropped);
    }

    /// Keeps a uniformly drawn subset of `round(p * n)` of the `n` leaves of
    /// `tree`, where `p` is the configured subsample percentage.
    ///
    /// Vertices that no longer lead to a kept leaf are removed; unary
    /// internal vertices remain (see [LineageTree::collapse_unifurcations]).
    ///
    /// # Errors
    /// [LineageError::Configuration] if no leaf would be kept.
    pub fn subsample<R: Rng + ?Sized>(&self, tree: &LineageTree, rng: &mut R) -> Result<LineageTree> {
        let p = self.config.subsample_percentage;
        check_subsample_percentage(p)?;
        let num_leaves = tree.num_leaves();
        let num_kept = retained_count(p, num_leaves);
        if num_kept == 0 {
            return Err(LineageError::config(format!(
                "subsample percentage {p} retains no leaf of {num_leaves}"
            )));
        }
        if num_kept >= num_leaves {
            return Ok(tree.clone());
        }

        let mut kept = rand::seq::index::sample(rng, num_leaves, num_kept).into_vec();
        kept.sort_unstable();
        let samples = tree.samples();
        let subsampled = tree.restricted_to(kept.iter().map(|&i| samples[i].as_str()))?;
        debug!("Subsampled {} of {} leaves", num_kept, num_leaves);
        Ok(subsampled)
    }
}

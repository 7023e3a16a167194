//! Per-character mutation and dropout model.

use crate::error::{LineageError, Result};
use crate::model::state::{CharacterState, StateId};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_distr::{Gamma, Poisson};
use serde::{Deserialize, Serialize};

// =#========================================================================#=
// NEGATIVE BINOMIAL
// =#========================================================================#=
/// Negative binomial distribution over counts, used to draw relative
/// propensities of mutant states.
///
/// `r` is the number of successes, `p` the success probability. Samples are
/// drawn as a Gamma-Poisson mixture: `λ ~ Gamma(r, (1-p)/p)`, `X ~ Poisson(λ)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NegativeBinomial {
    /// Number of successes (`r > 0`)
    pub r: f64,
    /// Success probability (`0 < p <= 1`)
    pub p: f64,
}

impl Default for NegativeBinomial {
    fn default() -> Self {
        NegativeBinomial { r: 5.0, p: 0.5 }
    }
}

impl NegativeBinomial {
    /// Creates the distribution after checking its parameters.
    ///
    /// # Errors
    /// [LineageError::Configuration] unless `r > 0` and `0 < p <= 1`.
    pub fn new(r: f64, p: f64) -> Result<Self> {
        let nb = NegativeBinomial { r, p };
        nb.validate()?;
        Ok(nb)
    }

    /// Checks `r > 0` and `0 < p <= 1`.
    pub fn validate(&self) -> Result<()> {
        if !(self.r.is_finite() && self.r > 0.0) {
            return Err(LineageError::config(format!(
                "negative binomial r must be positive, got {}",
                self.r
            )));
        }
        if !(self.p > 0.0 && self.p <= 1.0) {
            return Err(LineageError::config(format!(
                "negative binomial p must lie in (0, 1], got {}",
                self.p
            )));
        }
        Ok(())
    }

    /// Draws one count.
    ///
    /// # Errors
    /// [LineageError::Configuration] for invalid parameters.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<u64> {
        self.validate()?;
        if self.p >= 1.0 {
            return Ok(0);
        }
        let gamma = Gamma::new(self.r, (1.0 - self.p) / self.p)
            .map_err(|e| LineageError::config(format!("gamma: {e}")))?;
        let lambda: f64 = gamma.sample(rng);
        if lambda <= 0.0 {
            return Ok(0);
        }
        let poisson =
            Poisson::new(lambda).map_err(|e| LineageError::config(format!("poisson: {e}")))?;
        let count: f64 = poisson.sample(rng);
        Ok(count as u64)
    }
}

// =#========================================================================#=
// MUTATION MODEL
// =#========================================================================#=
/// Mutation and dropout model of all characters.
///
/// For every character `i` the model holds
/// - a mutation probability `M_i` (chance to leave the unmutated state in one
///   division event),
/// - a normalized categorical distribution over the `S-1` mutant states,
/// - a dropout probability `p_drop[i]` applied once per observed leaf.
///
/// The table is fixed-shape: every character has the same number of mutant
/// states. All entries are validated on construction, so the full
/// distribution `{unmutated: 1-M_i, state_k: M_i * q_ik}` always sums to 1.
///
/// # Example
/// ```
/// use lintrace::simulation::MutationModel;
///
/// let model = MutationModel::uniform(3, 5, 0.2, 0.1).unwrap();
/// assert_eq!(model.num_characters(), 3);
/// assert_eq!(model.num_states(), 5);
///
/// let distribution = model.distribution(0);
/// assert!((distribution.iter().sum::<f64>() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct MutationModel {
    mutation_probabilities: Vec<f64>,
    state_probabilities: Vec<Vec<f64>>,
    dropout_probabilities: Vec<f64>,
    state_samplers: Vec<WeightedIndex<f64>>,
}

impl MutationModel {
    /// Creates a model from per-character tables.
    ///
    /// # Arguments
    /// * `mutation_probabilities` - `M_i` per character, in `[0,1]`
    /// * `state_weights` - relative weights of the mutant states per
    ///   character; non-negative, not all zero, normalized here
    /// * `dropout_probabilities` - `p_drop[i]` per character, in `[0,1]`
    ///
    /// # Errors
    /// [LineageError::Configuration] if there are no characters, the tables
    /// differ in length, a character has no mutant state (`S = 1`), the
    /// characters have differing numbers of states, weights are negative,
    /// non-finite or all zero, or a probability lies outside `[0,1]`.
    pub fn new(
        mutation_probabilities: Vec<f64>,
        state_weights: Vec<Vec<f64>>,
        dropout_probabilities: Vec<f64>,
    ) -> Result<Self> {
        let num_characters = mutation_probabilities.len();
        if num_characters == 0 {
            return Err(LineageError::config("mutation model needs at least one character"));
        }
        if state_weights.len() != num_characters || dropout_probabilities.len() != num_characters
        {
            return Err(LineageError::config(format!(
                "mutation model tables disagree on character count: {} mutation probabilities, \
                 {} state weight rows, {} dropout probabilities",
                num_characters,
                state_weights.len(),
                dropout_probabilities.len()
            )));
        }

        for (i, &m) in mutation_probabilities.iter().enumerate() {
            check_probability("mutation", i, m)?;
        }
        for (i, &d) in dropout_probabilities.iter().enumerate() {
            check_probability("dropout", i, d)?;
        }

        let num_mutant_states = state_weights[0].len();
        let mut state_probabilities = Vec::with_capacity(num_characters);
        let mut state_samplers = Vec::with_capacity(num_characters);
        for (i, weights) in state_weights.into_iter().enumerate() {
            if weights.is_empty() {
                return Err(LineageError::config(format!(
                    "character {i} has no mutant states (S = 1)"
                )));
            }
            if weights.len() != num_mutant_states {
                return Err(LineageError::config(format!(
                    "character {} has {} mutant states, character 0 has {}",
                    i,
                    weights.len(),
                    num_mutant_states
                )));
            }
            if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(LineageError::config(format!(
                    "character {i} has negative or non-finite state weights"
                )));
            }
            let total: f64 = weights.iter().sum();
            if total <= 0.0 {
                return Err(LineageError::config(format!(
                    "character {i} has only zero state weights"
                )));
            }

            let normalized: Vec<f64> = weights.iter().map(|w| w / total).collect();
            let sampler = WeightedIndex::new(&normalized)
                .map_err(|e| LineageError::config(format!("character {i}: {e}")))?;
            state_probabilities.push(normalized);
            state_samplers.push(sampler);
        }

        Ok(MutationModel {
            mutation_probabilities,
            state_probabilities,
            dropout_probabilities,
            state_samplers,
        })
    }

    /// Creates a model in which all characters share mutation probability
    /// `mutation_probability`, dropout probability `dropout_probability`, and
    /// a uniform distribution over the `num_states - 1` mutant states.
    ///
    /// # Errors
    /// See [MutationModel::new]; in particular `num_states < 2`.
    pub fn uniform(
        num_characters: usize,
        num_states: usize,
        mutation_probability: f64,
        dropout_probability: f64,
    ) -> Result<Self> {
        if num_states < 2 {
            return Err(LineageError::config(format!(
                "need at least one mutant state, got S = {num_states}"
            )));
        }
        Self::new(
            vec![mutation_probability; num_characters],
            vec![vec![1.0; num_states - 1]; num_characters],
            vec![dropout_probability; num_characters],
        )
    }

    /// Creates a model whose mutant-state propensities are drawn from a
    /// negative binomial distribution, one draw per character and state.
    ///
    /// A pseudocount of one is added to every draw so that no character ends
    /// up with all-zero weights.
    ///
    /// # Errors
    /// See [MutationModel::new]; also invalid negative binomial parameters.
    pub fn from_negative_binomial<R: Rng + ?Sized>(
        num_characters: usize,
        num_states: usize,
        mutation_probability: f64,
        dropout_probability: f64,
        propensities: NegativeBinomial,
        rng: &mut R,
    ) -> Result<Self> {
        if num_states < 2 {
            return Err(LineageError::config(format!(
                "need at least one mutant state, got S = {num_states}"
            )));
        }
        propensities.validate()?;

        let mut state_weights = Vec::with_capacity(num_characters);
        for _ in 0..num_characters {
            let weights = (0..num_states - 1)
                .map(|_| propensities.sample(rng).map(|count| count as f64 + 1.0))
                .collect::<Result<Vec<f64>>>()?;
            state_weights.push(weights);
        }

        Self::new(
            vec![mutation_probability; num_characters],
            state_weights,
            vec![dropout_probability; num_characters],
        )
    }

    /// Returns the number of characters `C`.
    pub fn num_characters(&self) -> usize {
        self.mutation_probabilities.len()
    }

    /// Returns the number of states `S`, including the unmutated one.
    pub fn num_states(&self) -> usize {
        self.state_probabilities[0].len() + 1
    }

    /// Returns the mutation probability of a character.
    pub fn mutation_probability(&self, character: usize) -> f64 {
        self.mutation_probabilities[character]
    }

    /// Returns the dropout probability of a character.
    pub fn dropout_probability(&self, character: usize) -> f64 {
        self.dropout_probabilities[character]
    }

    /// Returns the full categorical distribution of a character for one
    /// division event: index 0 is "stays unmutated", index `k` is mutant
    /// state `k`.
    pub fn distribution(&self, character: usize) -> Vec<f64> {
        let m = self.mutation_probabilities[character];
        std::iter::once(1.0 - m)
            .chain(self.state_probabilities[character].iter().map(|q| m * q))
            .collect()
    }

    /// Draws whether a character mutates in one division event.
    ///
    /// # Panics
    /// Panics if `character` is out of bounds.
    pub fn sample_mutation<R: Rng + ?Sized>(&self, character: usize, rng: &mut R) -> bool {
        rng.gen_bool(self.mutation_probabilities[character])
    }

    /// Draws the mutant state a character mutates to (numbered from 1).
    ///
    /// # Panics
    /// Panics if `character` is out of bounds.
    pub fn sample_state<R: Rng + ?Sized>(&self, character: usize, rng: &mut R) -> StateId {
        self.state_samplers[character].sample(rng) as StateId + 1
    }

    /// Draws whether a character drops out at observation time.
    ///
    /// # Panics
    /// Panics if `character` is out of bounds.
    pub fn sample_dropout<R: Rng + ?Sized>(&self, character: usize, rng: &mut R) -> bool {
        rng.gen_bool(self.dropout_probabilities[character])
    }

    /// Returns the state of a character in a daughter cell given its state in
    /// the parent. Only unmutated characters are drawn; all others are
    /// inherited unchanged.
    pub fn mutate<R: Rng + ?Sized>(
        &self,
        parent: CharacterState,
        character: usize,
        rng: &mut R,
    ) -> CharacterState {
        if parent.is_unmutated() && self.sample_mutation(character, rng) {
            CharacterState::Mutated(self.sample_state(character, rng))
        } else {
            parent
        }
    }
}

fn check_probability(kind: &str, character: usize, p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(LineageError::config(format!(
            "{kind} probability of character {character} must lie in [0, 1], got {p}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_negative_binomial_certain_success() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let nb = NegativeBinomial::new(3.0, 1.0).unwrap();
        for _ in 0..10 {
            assert_eq!(nb.sample(&mut rng).unwrap(), 0);
        }
    }

    #[test]
    fn test_negative_binomial_mean() {
        // Mean is r(1-p)/p = 5
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let nb = NegativeBinomial::default();
        let n = 20_000;
        let total: u64 = (0..n).map(|_| nb.sample(&mut rng).unwrap()).sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 5.0).abs() < 0.2, "mean was {mean}");
    }

    #[test]
    fn test_invalid_probability() {
        assert!(check_probability("mutation", 0, 1.5).is_err());
        assert!(check_probability("mutation", 0, -0.1).is_err());
        assert!(check_probability("mutation", 0, f64::NAN).is_err());
        assert!(check_probability("mutation", 0, 0.0).is_ok());
    }
}

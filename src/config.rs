//! Benchmark configuration read from JSON.
//!
//! A [BenchmarkConfig] bundles everything a benchmark run needs: the RNG
//! seed, the mutation model, the simulation and the scoring parameters. Every
//! field has a default, so a config file only lists what it changes:
//!
//! ```json
//! {
//!   "seed": 7,
//!   "model": { "num_states": 20, "mutation_probability": 0.05 },
//!   "simulation": { "depth": 10, "num_characters": 40, "subsample_percentage": 0.2 },
//!   "scoring": { "number_of_trials": 1000, "min_size_depth": 20, "modified": true }
//! }
//! ```

use crate::error::{LineageError, Result};
use crate::scoring::ScoringConfig;
use crate::simulation::{LineageSimulator, MutationModel, NegativeBinomial, SimulationConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parameters of the [MutationModel] built for a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Number of states `S`, including the unmutated state
    pub num_states: usize,
    /// Mutation probability per character and division
    pub mutation_probability: f64,
    /// Dropout probability per character and leaf
    pub dropout_probability: f64,
    /// Distribution of mutant-state propensities; uniform states if absent
    pub propensities: Option<NegativeBinomial>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            num_states: 10,
            mutation_probability: 0.1,
            dropout_probability: 0.0,
            propensities: Some(NegativeBinomial::default()),
        }
    }
}

/// Complete configuration of a simulate-and-score benchmark run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchmarkConfig {
    /// Seed of the [ChaCha8Rng] driving model, simulation and scoring
    pub seed: u64,
    /// Mutation model parameters
    pub model: ModelConfig,
    /// Simulation parameters
    pub simulation: SimulationConfig,
    /// Scoring parameters
    pub scoring: ScoringConfig,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            seed: 0,
            model: ModelConfig::default(),
            simulation: SimulationConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl BenchmarkConfig {
    /// Parses a config from a JSON string and validates it.
    ///
    /// # Errors
    /// [LineageError::Json] for malformed JSON or unknown fields,
    /// [LineageError::Configuration] for invalid values.
    ///
    /// # Example
    /// ```
    /// use lintrace::config::BenchmarkConfig;
    ///
    /// let config = BenchmarkConfig::from_json(r#"{ "seed": 3, "simulation": { "depth": 4 } }"#).unwrap();
    /// assert_eq!(config.seed, 3);
    /// assert_eq!(config.simulation.depth, 4);
    /// assert_eq!(config.simulation.subsample_percentage, 1.0);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BenchmarkConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file and validates it.
    ///
    /// # Errors
    /// [LineageError::Io] if the file cannot be read, otherwise as
    /// [from_json](Self::from_json).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Checks all parameters.
    ///
    /// # Errors
    /// [LineageError::Configuration] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.scoring.validate()?;
        if let Some(propensities) = &self.model.propensities {
            propensities.validate()?;
        }
        // Checks states and probabilities without drawing propensities
        MutationModel::uniform(
            self.simulation.num_characters,
            self.model.num_states,
            self.model.mutation_probability,
            self.model.dropout_probability,
        )
        .map_err(|e| match e {
            LineageError::Configuration(msg) => LineageError::config(format!("model: {msg}")),
            other => other,
        })?;
        Ok(())
    }

    /// Returns a fresh RNG seeded with [seed](Self::seed).
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }

    /// Builds the mutation model, drawing propensities from `rng` if configured.
    ///
    /// # Errors
    /// [LineageError::Configuration] for invalid model parameters.
    pub fn build_model<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<MutationModel> {
        let m = &self.model;
        match m.propensities {
            Some(propensities) => MutationModel::from_negative_binomial(
                self.simulation.num_characters,
                m.num_states,
                m.mutation_probability,
                m.dropout_probability,
                propensities,
                rng,
            ),
            None => MutationModel::uniform(
                self.simulation.num_characters,
                m.num_states,
                m.mutation_probability,
                m.dropout_probability,
            ),
        }
    }

    /// Builds the simulator, including its mutation model.
    ///
    /// # Errors
    /// [LineageError::Configuration] for invalid parameters.
    pub fn build_simulator<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<LineageSimulator> {
        LineageSimulator::new(self.simulation, self.build_model(rng)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(BenchmarkConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = BenchmarkConfig::from_json(r#"{ "sed": 3 }"#);
        assert!(matches!(result, Err(LineageError::Json(_))));
    }

    #[test]
    fn test_invalid_model_is_rejected() {
        let result = BenchmarkConfig::from_json(r#"{ "model": { "num_states": 1 } }"#);
        assert!(matches!(result, Err(LineageError::Configuration(_))));
    }

    #[test]
    fn test_uniform_states_without_propensities() {
        let config =
            BenchmarkConfig::from_json(r#"{ "model": { "num_states": 3, "propensities": null } }"#)
                .unwrap();
        let model = config.build_model(&mut config.rng()).unwrap();
        assert_eq!(model.distribution(0)[1], model.distribution(0)[2]);
    }
}

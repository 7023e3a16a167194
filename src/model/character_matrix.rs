//! Character matrix of observed cells.
//!
//! A [CharacterMatrix] is the table of leaf sample identifiers and their
//! observed character-state vectors, i.e. the input a reconstruction tool
//! consumes once the true topology is discarded.

use crate::error::{LineageError, Result};
use crate::model::state::CharacterState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Table of observed character states, one row per cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixRows", into = "MatrixRows")]
pub struct CharacterMatrix {
    num_characters: usize,
    samples: Vec<String>,
    rows: Vec<Vec<CharacterState>>,
    lookup: HashMap<String, usize>,
}

/// Serialized shape of a [CharacterMatrix]; the lookup is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct MatrixRows {
    num_characters: usize,
    samples: Vec<String>,
    rows: Vec<Vec<CharacterState>>,
}

impl From<CharacterMatrix> for MatrixRows {
    fn from(matrix: CharacterMatrix) -> Self {
        MatrixRows {
            num_characters: matrix.num_characters,
            samples: matrix.samples,
            rows: matrix.rows,
        }
    }
}

impl TryFrom<MatrixRows> for CharacterMatrix {
    type Error = LineageError;

    fn try_from(raw: MatrixRows) -> Result<Self> {
        if raw.samples.len() != raw.rows.len() {
            return Err(LineageError::config(format!(
                "{} samples but {} rows",
                raw.samples.len(),
                raw.rows.len()
            )));
        }
        let mut matrix = CharacterMatrix::new(raw.num_characters);
        for (sample, states) in raw.samples.into_iter().zip(raw.rows) {
            matrix.add_row(sample, states)?;
        }
        Ok(matrix)
    }
}

impl CharacterMatrix {
    /// Creates an empty matrix for the given number of characters.
    pub fn new(num_characters: usize) -> Self {
        CharacterMatrix {
            num_characters,
            samples: Vec::new(),
            rows: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Adds a row for a cell.
    ///
    /// # Errors
    /// [LineageError::Configuration] if the row length differs from the
    /// number of characters or the sample already has a row.
    pub fn add_row(&mut self, sample: impl Into<String>, states: Vec<CharacterState>) -> Result<()> {
        let sample = sample.into();
        if states.len() != self.num_characters {
            return Err(LineageError::config(format!(
                "row for '{}' has {} characters, expected {}",
                sample,
                states.len(),
                self.num_characters
            )));
        }
        if self.lookup.contains_key(&sample) {
            return Err(LineageError::config(format!("duplicate row for '{sample}'")));
        }
        self.push_row(sample, states);
        Ok(())
    }

    /// Appends a row whose length and uniqueness the caller guarantees.
    pub(crate) fn push_row(&mut self, sample: String, states: Vec<CharacterState>) {
        debug_assert_eq!(states.len(), self.num_characters);
        debug_assert!(!self.lookup.contains_key(&sample));
        self.lookup.insert(sample.clone(), self.rows.len());
        self.samples.push(sample);
        self.rows.push(states);
    }

    /// Returns the number of cells (rows).
    pub fn num_cells(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of characters (columns).
    pub fn num_characters(&self) -> usize {
        self.num_characters
    }

    /// Returns the sample identifiers in row order.
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// Returns the states observed for a sample.
    pub fn get(&self, sample: &str) -> Option<&[CharacterState]> {
        self.lookup.get(sample).map(|&row| self.rows[row].as_slice())
    }

    /// Iterates over `(sample, states)` rows.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[CharacterState])> + '_ {
        self.samples
            .iter()
            .zip(self.rows.iter())
            .map(|(s, r)| (s.as_str(), r.as_slice()))
    }

    /// Fraction of entries that are missing, per character.
    pub fn missing_proportions(&self) -> Vec<f64> {
        if self.rows.is_empty() {
            return vec![0.0; self.num_characters];
        }
        (0..self.num_characters)
            .map(|c| {
                let missing = self.rows.iter().filter(|r| r[c].is_missing()).count();
                missing as f64 / self.rows.len() as f64
            })
            .collect()
    }
}

/// Tab-separated rendering with a `cell` header followed by `r0 .. r{C-1}`.
impl fmt::Display for CharacterMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "cell")?;
        for c in 0..self.num_characters {
            write!(f, "\tr{c}")?;
        }
        writeln!(f)?;
        for (sample, row) in self.rows() {
            write!(f, "{sample}")?;
            for state in row {
                write!(f, "\t{state}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

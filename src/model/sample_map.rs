//! Sample identifier lookup for lineage trees.
//!
//! - [SampleMap]: Bidirectional mapping between leaf sample identifiers and
//!   the arena indices of their leaves.

use crate::model::tree::VertexIndex;
use std::collections::HashMap;
use std::fmt;

// =#========================================================================#=
// SAMPLE MAP
// =#========================================================================#=
/// Maps leaf sample identifiers (strings) to the [VertexIndex] of their leaf.
///
/// Samples keep their insertion order, which for simulated trees is the
/// left-to-right order of the leaves.
///
/// # Example
/// ```
/// use lintrace::model::SampleMap;
///
/// let mut samples = SampleMap::new(2);
/// assert!(samples.insert("cell_0", 3));
/// assert!(samples.insert("cell_1", 4));
/// assert!(!samples.insert("cell_0", 7)); // duplicates are rejected
///
/// assert_eq!(samples.get("cell_1"), Some(4));
/// assert_eq!(samples.sample(0), Some("cell_0"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleMap {
    /// Sample identifiers in insertion order
    samples: Vec<String>,
    /// Map from sample identifier to leaf vertex index
    map: HashMap<String, VertexIndex>,
}

impl SampleMap {
    /// Creates a new map with pre-allocated capacity.
    ///
    /// # Arguments
    /// * `num_samples` - Expected number of samples (leaves)
    pub fn new(num_samples: usize) -> Self {
        SampleMap {
            samples: Vec::with_capacity(num_samples),
            map: HashMap::with_capacity(num_samples),
        }
    }

    /// Inserts a sample pointing to the given leaf.
    ///
    /// # Returns
    /// `false` (and leaves the map unchanged) if the sample already exists.
    pub fn insert(&mut self, sample: &str, leaf: VertexIndex) -> bool {
        if self.map.contains_key(sample) {
            return false;
        }
        self.samples.push(sample.to_string());
        self.map.insert(sample.to_string(), leaf);
        true
    }

    /// Retrieves the leaf index for a given sample.
    pub fn get(&self, sample: &str) -> Option<VertexIndex> {
        self.map.get(sample).copied()
    }

    /// Retrieves the sample identifier at the given insertion position.
    pub fn sample(&self, position: usize) -> Option<&str> {
        self.samples.get(position).map(|s| s.as_str())
    }

    /// Checks if a sample exists in the map.
    pub fn contains(&self, sample: &str) -> bool {
        self.map.contains_key(sample)
    }

    /// Returns the number of samples stored.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns whether no sample is stored.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the sample identifiers in insertion order.
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// Iterates over `(sample, leaf index)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, VertexIndex)> + '_ {
        self.samples.iter().map(|s| (s.as_str(), self.map[s]))
    }
}

impl fmt::Display for SampleMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "SampleMap ({} samples):", self.samples.len())?;
        for (sample, leaf) in self.iter() {
            writeln!(f, "  {} -> [{}]", sample, leaf)?;
        }
        Ok(())
    }
}

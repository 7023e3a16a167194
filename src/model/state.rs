//! Character states of lineage-tracing barcodes.
//!
//! A [CharacterState] is the value of one heritable barcode position (a
//! *character*) at a vertex of a [LineageTree](crate::model::LineageTree).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a mutant state; mutant states are numbered from 1.
pub type StateId = u32;

/// Marker used when displaying a [CharacterState::Missing] value.
pub const MISSING_MARKER: &str = "-";

// =#========================================================================#=
// CHARACTER STATE
// =#========================================================================#=
/// State of a single character.
///
/// # Invariants (upheld by the simulator)
/// - Once a character leaves [Unmutated](CharacterState::Unmutated) it never
///   returns to it, and it keeps its first mutant state for all descendants.
/// - [Missing](CharacterState::Missing) only occurs on observed leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CharacterState {
    /// Unedited target site (`0`)
    #[default]
    Unmutated,
    /// Edited target site carrying the given mutant state
    Mutated(StateId),
    /// Dropped out at observation time
    Missing,
}

impl CharacterState {
    /// Returns `true` if this character is unedited.
    pub fn is_unmutated(&self) -> bool {
        matches!(self, CharacterState::Unmutated)
    }

    /// Returns `true` if this character carries a mutant state.
    pub fn is_mutated(&self) -> bool {
        matches!(self, CharacterState::Mutated(_))
    }

    /// Returns `true` if this character was lost to dropout.
    pub fn is_missing(&self) -> bool {
        matches!(self, CharacterState::Missing)
    }

    /// Returns the mutant state, if any.
    pub fn state_id(&self) -> Option<StateId> {
        match self {
            CharacterState::Mutated(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for CharacterState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CharacterState::Unmutated => write!(f, "0"),
            CharacterState::Mutated(id) => write!(f, "{id}"),
            CharacterState::Missing => write!(f, "{MISSING_MARKER}"),
        }
    }
}

/// Returns the all-unmutated state vector of given length.
pub fn unmutated_states(num_characters: usize) -> Vec<CharacterState> {
    vec![CharacterState::Unmutated; num_characters]
}

/// Formats a state vector as `|`-separated values, e.g. `0|3|-|1`.
pub fn format_states(states: &[CharacterState]) -> String {
    states
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("|")
}

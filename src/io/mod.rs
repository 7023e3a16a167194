//! Persistence of lineage trees.
//!
//! * [json] - lossless JSON representation of the tree arena
//!
//! Newick import and export live in [crate::newick].

pub mod json;

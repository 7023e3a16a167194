//! Newick format parser and writer for lineage trees.
//!
//! Reconstruction tools commonly exchange trees as Newick strings. This
//! module reads them into [LineageTree]s (optionally attaching observed leaf
//! states from a [CharacterMatrix](crate::model::CharacterMatrix)) and writes
//! [LineageTree]s back.
//!
//! # Quick API
//! * [`parse_file`] - parses all trees of a file
//! * [`parse_str`] - parses a single string
//! * [`to_newick`] / [`write_newick_file`] - writing
//!
//! # Full API
//! Configure a [NewickParser] and provide a
//! [ByteParser](crate::parser::byte_parser::ByteParser):
//! * [`NewickParser::parse_str`] - parse a single tree
//! * [`NewickParser::parse_all`] - parse all trees until EOF
//!
//! # Format
//! * `tree ::= internal_vertex ';'`
//! * `vertex ::= leaf | internal_vertex`
//! * `internal_vertex ::= '(' vertex (',' vertex)* ')' [label] [branch_length]`
//! * `leaf ::= label [branch_length]`
//! * `branch_length ::= ':' number`
//!
//! Furthermore:
//! * Whitespace can occur between elements,
//!   just not within an unquoted label or a branch_length
//! * Comments are square brackets and can occur anywhere whitespace can
//! * Branch lengths and internal labels are read but not stored

mod defs;
pub mod parser;
pub mod writer;

pub use parser::NewickParser;
pub use writer::{to_newick, write_newick_file, NewickStyle};

use crate::model::{CharacterMatrix, LineageTree};
use crate::parser::byte_parser::ByteParser;
use crate::parser::ParsingError;
use std::path::Path;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses a Newick file eagerly and returns all trees, without characters.
///
/// # Errors
/// Returns a [ParsingError] if file reading fails or the format is invalid.
///
/// # Example
/// ```no_run
/// use lintrace::newick::parse_file;
///
/// let trees = parse_file("reconstructions.nwk")?;
/// println!("Parsed {} trees", trees.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<LineageTree>, ParsingError> {
    let byte_parser = ByteParser::from_file(path)?;
    NewickParser::new().parse_all(byte_parser)
}

/// Parses a single Newick string into a tree without characters.
///
/// # Errors
/// Returns a [ParsingError] if the string is not valid Newick format.
///
/// # Example
/// ```
/// use lintrace::newick::parse_str;
///
/// let tree = parse_str("((cell_0,cell_1),(cell_2,cell_3));")?;
/// assert_eq!(tree.num_leaves(), 4);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_str<S: AsRef<str>>(newick: S) -> Result<LineageTree, ParsingError> {
    let mut byte_parser = ByteParser::for_str(newick.as_ref());
    NewickParser::new().parse_str(&mut byte_parser)
}

/// Parses a single Newick string, attaching leaf states from `matrix` and
/// reconstructing ancestral states.
///
/// # Errors
/// Returns a [ParsingError] if the string is invalid or a leaf has no row in
/// the matrix.
pub fn parse_str_with_states<S: AsRef<str>>(
    newick: S,
    matrix: &CharacterMatrix,
) -> Result<LineageTree, ParsingError> {
    let mut byte_parser = ByteParser::for_str(newick.as_ref());
    NewickParser::new()
        .with_character_matrix(matrix)
        .parse_str(&mut byte_parser)
}

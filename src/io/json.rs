//! JSON persistence of lineage trees.
//!
//! The JSON document mirrors the arena exactly: the number of characters,
//! the root index and the vertex list (with children, states and sample
//! identifiers). Loading validates the structure, so a loaded tree upholds the
//! same invariants as a freshly built one.
//!
//! ```json
//! {
//!   "num_characters": 1,
//!   "root": 0,
//!   "vertices": [
//!     { "Root": { "index": 0, "children": [1, 2], "states": ["Unmutated"] } },
//!     { "Leaf": { "index": 1, "parent": 0, "sample": "cell_0", "states": [{ "Mutated": 2 }] } },
//!     { "Leaf": { "index": 2, "parent": 0, "sample": "cell_1", "states": ["Missing"] } }
//!   ]
//! }
//! ```

use crate::error::Result;
use crate::model::tree::LineageTree;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Serializes a tree to a JSON string.
///
/// # Errors
/// [LineageError::Json](crate::error::LineageError::Json) if serialization fails.
pub fn to_json(tree: &LineageTree) -> Result<String> {
    Ok(serde_json::to_string(tree)?)
}

/// Deserializes and validates a tree from a JSON string.
///
/// # Errors
/// [LineageError::Json](crate::error::LineageError::Json) if the document is
/// malformed or describes an invalid tree.
///
/// # Example
/// ```
/// use lintrace::io::json::{from_json, to_json};
/// use lintrace::model::{CharacterState, LineageTree};
///
/// let mut tree = LineageTree::new(1);
/// let root = tree.add_root(vec![CharacterState::Unmutated]);
/// tree.add_leaf(root, "cell_0", vec![CharacterState::Mutated(2)]);
/// tree.add_leaf(root, "cell_1", vec![CharacterState::Missing]);
///
/// let loaded = from_json(&to_json(&tree).unwrap()).unwrap();
/// assert_eq!(loaded, tree);
/// ```
pub fn from_json(json: &str) -> Result<LineageTree> {
    Ok(serde_json::from_str(json)?)
}

/// Writes a tree to a JSON file (pretty-printed).
///
/// # Errors
/// [LineageError::Io](crate::error::LineageError::Io) or
/// [LineageError::Json](crate::error::LineageError::Json).
pub fn write_tree_file<P: AsRef<Path>>(path: P, tree: &LineageTree) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, tree)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Reads and validates a tree from a JSON file.
///
/// # Errors
/// [LineageError::Io](crate::error::LineageError::Io) or
/// [LineageError::Json](crate::error::LineageError::Json).
pub fn read_tree_file<P: AsRef<Path>>(path: P) -> Result<LineageTree> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

//! Newick format writing for lineage trees.

use crate::model::tree::{LineageTree, VertexIndex};
use crate::newick::defs::BUFFER_CHARS;
use crate::parser::utils::escape_label;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Style for serializing a tree to Newick format,
/// controlling how leaves are represented in the output string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewickStyle {
    /// Use the leaf sample identifiers (escaped where necessary)
    #[default]
    Sample,
    /// Use the arena index of each leaf
    VertexIndex,
}

/// Writes given list of trees to a file in Newick format, one tree per line.
///
/// # Errors
/// Returns an I/O error if creating or writing the file fails.
///
/// # Example
/// ```no_run
/// use lintrace::newick::{write_newick_file, NewickStyle};
/// # let trees: Vec<lintrace::model::LineageTree> = Vec::new();
///
/// write_newick_file("trees.nwk", &trees, NewickStyle::Sample)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn write_newick_file<P: AsRef<Path>>(
    path: P,
    trees: &[LineageTree],
    style: NewickStyle,
) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for tree in trees {
        writer.write_all(to_newick(tree, style).as_bytes())?;
        writer.write_all(b"\n")?;
    }

    writer.flush()?;
    Ok(())
}

/// Returns the Newick representation of this tree with closing semicolon.
///
/// Vertices are written with all their children, so polytomies and unary
/// vertices are preserved. No branch lengths or internal labels are written.
///
/// # Example
/// ```
/// use lintrace::model::LineageTree;
/// use lintrace::newick::{to_newick, NewickStyle};
///
/// let mut tree = LineageTree::new(0);
/// let root = tree.add_root(vec![]);
/// let x = tree.add_internal(root, vec![]);
/// tree.add_leaf(x, "cell_0", vec![]);
/// tree.add_leaf(x, "cell 1", vec![]);
/// tree.add_leaf(root, "cell_2", vec![]);
///
/// assert_eq!(to_newick(&tree, NewickStyle::Sample), "((cell_0,'cell 1'),cell_2);");
/// assert_eq!(to_newick(&tree, NewickStyle::VertexIndex), "((2,3),4);");
/// ```
pub fn to_newick(tree: &LineageTree, style: NewickStyle) -> String {
    // Recursive helper for building the Newick string
    fn build_newick(tree: &LineageTree, newick: &mut String, index: VertexIndex, style: NewickStyle) {
        let vertex = &tree[index];

        if let Some(sample) = vertex.sample() {
            match style {
                NewickStyle::Sample => newick.push_str(&escape_label(sample)),
                NewickStyle::VertexIndex => newick.push_str(&index.to_string()),
            }
        } else {
            newick.push('(');
            for (i, &child) in vertex.children().iter().enumerate() {
                if i > 0 {
                    newick.push(',');
                }
                build_newick(tree, newick, child, style);
            }
            newick.push(')');
        }
    }

    if !tree.is_root_set() {
        return String::new();
    }

    let mut newick = String::with_capacity(estimate_newick_len(tree, style));
    build_newick(tree, &mut newick, tree.root_index(), style);
    newick.push(';');

    newick
}

/// Estimates the length of a Newick string for a given tree, used to
/// pre-allocate string capacity.
fn estimate_newick_len(tree: &LineageTree, style: NewickStyle) -> usize {
    // Each non-leaf vertex: "()" plus one ',' per further child
    let structure_capacity = 2 * (tree.num_vertices() - tree.num_leaves()) + tree.num_leaves();

    let label_capacity: usize = match style {
        NewickStyle::Sample => tree.samples().iter().map(|s| s.len() + 2).sum(),
        NewickStyle::VertexIndex => {
            let digits = tree.num_vertices().max(1).ilog10() as usize + 1;
            tree.num_leaves() * digits
        }
    };

    structure_capacity + label_capacity + BUFFER_CHARS
}

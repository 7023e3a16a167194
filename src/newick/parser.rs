//! Structs and logic to parse Newick strings into [LineageTree]s.

use crate::model::character_matrix::CharacterMatrix;
use crate::model::state::unmutated_states;
use crate::model::tree::{LineageTree, VertexIndex};
use crate::newick::defs::NEWICK_LABEL_DELIMITERS;
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::parser::parsing_error::ParsingError;

// =#========================================================================#=
// NEWICK PARSER
// =#========================================================================#=
/// Parser for Newick strings of (possibly multifurcating) lineage trees.
///
/// Leaf labels become sample identifiers. Branch lengths, internal vertex
/// labels and `[...]` comments are accepted and skipped.
///
/// Without a [CharacterMatrix] the parsed trees carry no characters. With a
/// matrix (see [with_character_matrix](Self::with_character_matrix)) every
/// leaf takes the states of its row, and the states of ancestors are
/// reconstructed with
/// [reconstruct_ancestral_characters](LineageTree::reconstruct_ancestral_characters)
/// unless disabled.
///
/// # Example
/// ```
/// use lintrace::newick::NewickParser;
/// use lintrace::parser::byte_parser::ByteParser;
///
/// let mut byte_parser = ByteParser::for_str("((cell_0:1.0,cell_1:1.0)x:0.5,cell_2,cell_3);");
/// let tree = NewickParser::new().parse_str(&mut byte_parser).unwrap();
///
/// assert_eq!(tree.num_leaves(), 4);
/// assert_eq!(tree.root().num_children(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NewickParser<'m> {
    character_matrix: Option<&'m CharacterMatrix>,
    reconstruct_ancestors: bool,
}

// ============================================================================
// Construction & Configuration (pub)
// ============================================================================
impl<'m> NewickParser<'m> {
    /// Creates a parser producing trees without characters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches leaf states from `matrix` and reconstructs ancestral states.
    ///
    /// Every leaf label must have a row in the matrix.
    pub fn with_character_matrix(mut self, matrix: &'m CharacterMatrix) -> Self {
        self.character_matrix = Some(matrix);
        self.reconstruct_ancestors = true;
        self
    }

    /// Leaves the states of root and internal vertices unmutated instead of
    /// reconstructing them.
    pub fn without_ancestral_reconstruction(mut self) -> Self {
        self.reconstruct_ancestors = false;
        self
    }

    fn num_characters(&self) -> usize {
        self.character_matrix.map_or(0, |m| m.num_characters())
    }
}

// ============================================================================
// API Parsing (pub)
// ============================================================================
impl NewickParser<'_> {
    /// Parses all Newick trees from the byte source until EOF.
    ///
    /// # Errors
    /// Returns the first [ParsingError] encountered.
    pub fn parse_all<B: ByteSource>(
        &mut self,
        mut byte_parser: ByteParser<B>,
    ) -> Result<Vec<LineageTree>, ParsingError> {
        let mut trees = Vec::new();
        loop {
            byte_parser.skip_comment_and_whitespace()?;
            if byte_parser.is_eof() {
                break;
            }
            trees.push(self.parse_str(&mut byte_parser)?);
        }
        Ok(trees)
    }

    /// Parses a single Newick tree from the given [ByteParser].
    ///
    /// # Errors
    /// Returns a [ParsingError] if the Newick string is malformed, a leaf
    /// label is empty or duplicated, or a leaf has no row in the character
    /// matrix.
    pub fn parse_str<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<LineageTree, ParsingError> {
        let mut tree = LineageTree::new(self.num_characters());
        self.parse_root(parser, &mut tree)?;

        if self.reconstruct_ancestors && self.character_matrix.is_some() {
            tree.reconstruct_ancestral_characters();
        }
        Ok(tree)
    }
}

// ============================================================================
// Parsing
// ============================================================================
impl NewickParser<'_> {
    /// Parses root of tree and adds it to tree:
    /// - `(child, ..., child)[label][:branch_length];`
    fn parse_root<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
        tree: &mut LineageTree,
    ) -> Result<(), ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b'(') {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected '(' at start of tree but found {:?}", next_char),
            ));
        }

        let root = tree.add_root(unmutated_states(self.num_characters()));
        self.parse_children(parser, tree, root)?;
        self.skip_vertex_suffix(parser)?;

        // Consume the terminating semicolon
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b';') {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ';' at end of tree but found {:?}", next_char),
            ));
        }

        Ok(())
    }

    /// Parses a vertex (either internal vertex or leaf) below `parent`:
    /// - Skips leading comments and whitespace
    /// - Internal vertex if it starts with `(`, otherwise a leaf
    fn parse_vertex<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
        tree: &mut LineageTree,
        parent: VertexIndex,
    ) -> Result<(), ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if parser.is_eof() {
            return Err(ParsingError::unexpected_eof(parser));
        }

        if parser.consume_if(b'(') {
            let index = tree.add_internal(parent, unmutated_states(self.num_characters()));
            self.parse_children(parser, tree, index)?;
            self.skip_vertex_suffix(parser)
        } else {
            self.parse_leaf(parser, tree, parent)
        }
    }

    /// Parses a children list `child, ..., child)` after its opening `(`.
    fn parse_children<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
        tree: &mut LineageTree,
        parent: VertexIndex,
    ) -> Result<(), ParsingError> {
        loop {
            self.parse_vertex(parser, tree, parent)?;

            parser.skip_comment_and_whitespace()?;
            if parser.consume_if(b',') {
                continue;
            }
            if parser.consume_if(b')') {
                return Ok(());
            }
            if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            }
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ',' or ')' after child but found {:?}", next_char),
            ));
        }
    }

    /// Parses leaf vertex `label[:branch_length]` and adds it to tree.
    fn parse_leaf<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
        tree: &mut LineageTree,
        parent: VertexIndex,
    ) -> Result<(), ParsingError> {
        let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        if label.is_empty() {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected leaf label but found {:?}", next_char),
            ));
        }
        if tree.contains_sample(&label) {
            return Err(ParsingError::duplicate_label(parser, label));
        }

        let states = match self.character_matrix {
            Some(matrix) => match matrix.get(&label) {
                Some(states) => states.to_vec(),
                None => return Err(ParsingError::unresolved_label(parser, label)),
            },
            None => Vec::new(),
        };
        tree.add_leaf(parent, label, states);

        self.parse_branch_length(parser)?;
        Ok(())
    }

    /// Skips an optional internal vertex label and branch length.
    fn skip_vertex_suffix<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
    ) -> Result<(), ParsingError> {
        parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        self.parse_branch_length(parser)?;
        Ok(())
    }

    /// Parses optional branch length `[:number]`:
    /// - Skips comments/whitespace before and after `:`
    /// - Supports scientific notation (e.g., `1.5e-10`)
    ///
    /// # Returns
    /// - `Ok(Some(branch_length))` if found a branch length and was able to parse it
    /// - `Ok(None)` if no branch length found
    /// - [ParsingError] if it couldn't parse branch length value
    fn parse_branch_length<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
    ) -> Result<Option<f64>, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b':') {
            return Ok(None);
        }
        parser.skip_comment_and_whitespace()?;

        let mut branch_length_str = String::new();
        while let Some(b) = parser.peek() {
            // Valid characters for a float: digits, '.', '-', '+', 'e', 'E'
            if b.is_ascii_digit() || b == b'.' || b == b'-' || b == b'+' || b == b'e' || b == b'E' {
                branch_length_str.push(b as char);
                parser.next_byte();
            } else {
                break;
            }
        }

        let value: f64 = branch_length_str.parse().map_err(|_| {
            ParsingError::invalid_newick_string(
                parser,
                format!("Invalid branch length: {}", branch_length_str),
            )
        })?;
        Ok(Some(value))
    }
}

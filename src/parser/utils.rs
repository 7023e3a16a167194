//! Label escaping for the Newick format.
//!
//! Sample identifiers are opaque: they are written verbatim when possible and
//! wrapped in single quotes otherwise, so parsing a written tree returns the
//! exact identifiers.

/// Returns `true` if the label contains a character that ends an unquoted
/// Newick label, or is empty.
///
/// # Examples
/// ```
/// # use lintrace::parser::utils::needs_quoting;
/// assert_eq!(needs_quoting("cell_12"), false);
/// assert_eq!(needs_quoting("cell 12"), true);
/// assert_eq!(needs_quoting("cell[12]"), true);
/// assert_eq!(needs_quoting("cell's"), true);
/// assert_eq!(needs_quoting(""), true);
/// ```
pub fn needs_quoting(label: &str) -> bool {
    label.is_empty()
        || label.chars().any(|c| {
            matches!(
                c,
                ' ' | ',' | ';' | '\t' | '\n' | '\r' | '(' | ')' | ':' | '[' | ']' | '\''
            )
        })
}

/// Escapes a label for use in a Newick string.
///
/// Labels containing special characters (punctuation, delimiters, whitespace)
/// are wrapped in single quotes and internal single quotes are doubled.
///
/// # Examples
/// ```
/// # use lintrace::parser::utils::escape_label;
/// assert_eq!(escape_label("cell_3"), "cell_3");
/// assert_eq!(escape_label("clone A"), "'clone A'");
/// assert_eq!(escape_label("Baillon's:1"), "'Baillon''s:1'");
/// ```
pub fn escape_label(label: &str) -> String {
    if needs_quoting(label) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

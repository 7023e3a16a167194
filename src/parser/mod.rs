//! Low-level parsing infrastructure.
//!
//! Provides the byte parser the [Newick parser](crate::newick::NewickParser)
//! is built on, together with error handling and label escaping.

pub mod byte_parser;
pub mod byte_source;
pub mod parsing_error;
pub mod utils;

pub use parsing_error::{ParsingError, ParsingErrorType};

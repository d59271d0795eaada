//! Tools for the analysis of Starlark source code.

pub mod diagnostics;
pub mod lexer;
pub mod source;

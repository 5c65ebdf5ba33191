//! Go declaration parser (Logos lexer + recursive descent).
//!
//! - Lexer uses Logos, implements Go semicolon insertion and surfaces comments.
//! - Parser keeps imports, type specs and func/method signatures with their
//!   doc comments; bodies are skipped after a balance check.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod parser_support;
pub mod printer;
pub mod walk;

// Re-exports for convenience
pub use error::{Diag, LineIndex, ParseFailure, Span};
pub use lexer::Lexer;

/// Parses one Go source file down to its declarations.
///
/// Lexical errors are collected over the whole input and reported together;
/// the first syntax error stops parsing.
pub fn parse_source(src: &str) -> Result<ast::SourceFile, ParseFailure> {
    let mut lexer = Lexer::new(src);
    let toks: Vec<_> = lexer.by_ref().collect();
    let diags = lexer.take_diags();
    if !diags.is_empty() {
        return Err(ParseFailure { diags });
    }

    parser::Parser::new(src, toks)
        .parse_file()
        .map_err(|diag| ParseFailure { diags: vec![diag] })
}

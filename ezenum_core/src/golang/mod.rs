//! Go source front end for ezenum.
//!
//! Parses the top level of a Go file (package clause, imports, `const`,
//! `var` and `type` declarations, functions) into a small AST that keeps
//! comments attached the way Go's own tooling does: a *doc* comment is the
//! group ending on the line right above a declaration, a *line* comment is
//! the group trailing a spec on its last line.
//!
//! # Example
//!
//! ```
//! use ezenum_core::golang::{parse_source, DeclKind};
//!
//! let file = parse_source("package codes\n\ntype Code int // EZENUM\n").unwrap();
//! assert_eq!(file.package.name, "codes");
//! assert_eq!(file.gen_decls(DeclKind::Type).count(), 1);
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{
    CommentGroup, Decl, DeclKind, Expr, GenDecl, SourceFile, Spec, TypeRef, TypeSpec, ValueSpec,
    strip_comment_markers,
};
pub use lexer::LexError;
pub use parser::ParseError;

/// File name suffix of Go source files.
pub const GO_SOURCE_SUFFIX: &str = ".go";

/// Parse Go source text.
pub fn parse_source(source: &str) -> Result<SourceFile, ParseError> {
    parser::parse(source)
}

//! Go syntax tree for top-level declarations.
//!
//! Only the parts of a file that declarations are made of are modelled:
//! function bodies, type literals and initializer expressions are kept as
//! source text.

use std::ops::Range;

/// A parsed Go source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub package: Ident,
    pub decls: Vec<Decl>,
}

impl SourceFile {
    /// All `import`/`const`/`var`/`type` declarations of the given kind.
    pub fn gen_decls(&self, kind: DeclKind) -> impl Iterator<Item = &GenDecl> {
        self.decls.iter().filter_map(move |decl| match decl {
            Decl::Gen(gen_decl) if gen_decl.kind == kind => Some(gen_decl),
            _ => None,
        })
    }

    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Import,
    Const,
    Var,
    Type,
}

#[derive(Debug, Clone)]
pub enum Decl {
    Gen(GenDecl),
    Func(FuncDecl),
}

/// A declaration introduced by `import`, `const`, `var` or `type`, either a
/// single spec or a parenthesized group.
#[derive(Debug, Clone)]
pub struct GenDecl {
    pub kind: DeclKind,
    pub doc: Option<CommentGroup>,
    pub grouped: bool,
    pub specs: Vec<Spec>,
}

#[derive(Debug, Clone)]
pub enum Spec {
    Import(ImportSpec),
    Type(TypeSpec),
    Value(ValueSpec),
}

#[derive(Debug, Clone)]
pub struct ImportSpec {
    pub name: Option<String>,
    pub path: String,
    pub comment: Option<CommentGroup>,
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: Ident,
    /// `type A = B`
    pub alias: bool,
    /// Type expression as written, type parameters included.
    pub definition: String,
    /// Lead comment, only set inside a group. An ungrouped spec's comment is
    /// on its [`GenDecl`].
    pub doc: Option<CommentGroup>,
    /// Trailing comment on the spec's last line.
    pub comment: Option<CommentGroup>,
}

/// A `const` or `var` spec: `A, B T = x, y`.
#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub ty: Option<TypeRef>,
    pub values: Vec<Expr>,
    pub doc: Option<CommentGroup>,
    pub comment: Option<CommentGroup>,
}

/// A type annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// A plain identifier such as `Status` or `int`.
    Ident(String),
    /// Anything else (`pkg.T`, `[]int`, `map[K]V`, ...), as written.
    Other(String),
}

impl TypeRef {
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            TypeRef::Ident(name) => Some(name),
            TypeRef::Other(_) => None,
        }
    }
}

/// An initializer expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A lone integer literal, e.g. `200` or `0x1F`.
    IntLit(String),
    Other(String),
}

impl Expr {
    pub fn is_int_lit(&self) -> bool {
        matches!(self, Expr::IntLit(_))
    }
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: Ident,
    /// Base type name of a method's receiver, `None` for plain functions.
    pub receiver: Option<String>,
}

/// One comment, delimiters included.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub line: usize,
}

/// A run of adjacent comments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentGroup {
    pub list: Vec<Comment>,
}

impl CommentGroup {
    /// Comment text with the `//`, `/*` and `*/` markers removed, one line
    /// per comment.
    pub fn text(&self) -> String {
        self.list
            .iter()
            .map(|comment| strip_comment_markers(&comment.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text().contains(needle)
    }
}

/// Removes the leading comment marker (and the closing `*/` of a block
/// comment), then surrounding whitespace. Interior text is untouched.
pub fn strip_comment_markers(raw: &str) -> &str {
    if let Some(rest) = raw.strip_prefix("//") {
        rest.trim()
    } else if let Some(rest) = raw.strip_prefix("/*") {
        rest.strip_suffix("*/").unwrap_or(rest).trim()
    } else {
        raw.trim()
    }
}

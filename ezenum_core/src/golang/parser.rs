//! Go parser - converts tokens to the declaration-level AST.

use super::ast::{
    Comment, CommentGroup, Decl, DeclKind, Expr, FuncDecl, GenDecl, Ident, ImportSpec, SourceFile,
    Spec, TypeRef, TypeSpec, ValueSpec,
};
use super::lexer::{LineIndex, RawComment, SpannedToken, Token, TokenStream, tokenize};
use std::ops::Range;

/// Parse error with location information.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Option<Range<usize>>,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parser state.
pub struct Parser<'src> {
    source: &'src str,
    lines: LineIndex,
    tokens: Vec<SpannedToken>,
    comments: Vec<RawComment>,
    pos: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, stream: TokenStream) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            tokens: stream.tokens,
            comments: stream.comments,
            pos: 0,
        }
    }

    /// Parse a complete Go source file.
    pub fn parse(&mut self) -> Result<SourceFile, ParseError> {
        let package = self.parse_package_clause()?;
        let mut decls = Vec::new();

        while !self.is_at_end() {
            match self.peek() {
                Some(Token::Semicolon) => {
                    self.advance();
                }
                Some(Token::Import) => decls.push(Decl::Gen(self.parse_gen_decl(DeclKind::Import)?)),
                Some(Token::Const) => decls.push(Decl::Gen(self.parse_gen_decl(DeclKind::Const)?)),
                Some(Token::Var) => decls.push(Decl::Gen(self.parse_gen_decl(DeclKind::Var)?)),
                Some(Token::Type) => decls.push(Decl::Gen(self.parse_gen_decl(DeclKind::Type)?)),
                Some(Token::Func) => decls.push(Decl::Func(self.parse_func_decl()?)),
                Some(_) => return Err(self.error("expected declaration")),
                None => break,
            }
        }

        Ok(SourceFile { package, decls })
    }

    fn parse_package_clause(&mut self) -> Result<Ident, ParseError> {
        if !self.check(&Token::Package) {
            return Err(self.error("expected 'package'"));
        }
        self.advance();
        let name = self.expect_ident()?;
        if name.name == "_" {
            return Err(self.error("invalid package name _"));
        }
        self.expect_semi()?;
        Ok(name)
    }

    fn parse_gen_decl(&mut self, kind: DeclKind) -> Result<GenDecl, ParseError> {
        let doc = self.lead_comment(self.pos);
        self.advance();

        let mut specs = Vec::new();
        let grouped = self.check(&Token::LParen);

        if grouped {
            self.advance();
            loop {
                match self.peek() {
                    Some(Token::RParen) => break,
                    Some(Token::Semicolon) => {
                        self.advance();
                    }
                    Some(_) => {
                        let doc = self.lead_comment(self.pos);
                        specs.push(self.parse_spec(kind, doc)?);
                        if !self.check(&Token::RParen) {
                            self.expect_semi()?;
                        }
                    }
                    None => return Err(self.error("expected ')'")),
                }
            }
            self.advance();
        } else {
            specs.push(self.parse_spec(kind, None)?);
        }
        self.expect_semi()?;

        Ok(GenDecl {
            kind,
            doc,
            grouped,
            specs,
        })
    }

    fn parse_spec(&mut self, kind: DeclKind, doc: Option<CommentGroup>) -> Result<Spec, ParseError> {
        match kind {
            DeclKind::Import => self.parse_import_spec().map(Spec::Import),
            DeclKind::Type => self.parse_type_spec(doc).map(Spec::Type),
            DeclKind::Const | DeclKind::Var => self.parse_value_spec(doc).map(Spec::Value),
        }
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec, ParseError> {
        let name = match self.peek() {
            Some(Token::Identifier(name)) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            Some(Token::Dot) => {
                self.advance();
                Some(".".to_string())
            }
            _ => None,
        };

        let path = match self.peek() {
            Some(Token::String(path)) | Some(Token::RawString(path)) => path.clone(),
            _ => return Err(self.error("expected import path")),
        };
        self.advance();

        Ok(ImportSpec {
            name,
            path: path[1..path.len() - 1].to_string(),
            comment: self.line_comment(self.pos - 1),
        })
    }

    fn parse_type_spec(&mut self, doc: Option<CommentGroup>) -> Result<TypeSpec, ParseError> {
        let name = self.expect_ident()?;

        let alias = self.check(&Token::Assign);
        if alias {
            self.advance();
        }

        let range = self.skip_balanced(|t| matches!(t, Token::Semicolon | Token::RParen))?;
        if range.is_empty() {
            return Err(self.error("expected type"));
        }
        let definition = self.text(range.clone()).to_string();

        Ok(TypeSpec {
            name,
            alias,
            definition,
            doc,
            comment: self.line_comment(range.end - 1),
        })
    }

    fn parse_value_spec(&mut self, doc: Option<CommentGroup>) -> Result<ValueSpec, ParseError> {
        let mut names = vec![self.expect_ident()?];
        while self.check(&Token::Comma) {
            self.advance();
            names.push(self.expect_ident()?);
        }

        let ty = if matches!(
            self.peek(),
            None | Some(Token::Assign) | Some(Token::Semicolon) | Some(Token::RParen)
        ) {
            None
        } else {
            let range =
                self.skip_balanced(|t| matches!(t, Token::Assign | Token::Semicolon | Token::RParen))?;
            Some(self.type_ref(range))
        };

        let mut values = Vec::new();
        if self.check(&Token::Assign) {
            self.advance();
            loop {
                let range = self.skip_balanced(|t| {
                    matches!(t, Token::Comma | Token::Semicolon | Token::RParen)
                })?;
                if range.is_empty() {
                    return Err(self.error("expected expression"));
                }
                values.push(self.expr(range));

                if !self.check(&Token::Comma) {
                    break;
                }
                self.advance();
            }
        }

        Ok(ValueSpec {
            names,
            ty,
            values,
            doc,
            comment: self.line_comment(self.pos - 1),
        })
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl, ParseError> {
        self.advance();

        let receiver = if self.check(&Token::LParen) {
            let start = self.pos + 1;
            self.skip_group()?;
            Some(self.receiver_type(start..self.pos - 1))
        } else {
            None
        };
        let name = self.expect_ident()?;

        // Signature and body; the body's closing brace is followed by a
        // semicolon at depth zero.
        self.skip_balanced(|t| matches!(t, Token::Semicolon))?;
        self.expect_semi()?;

        Ok(FuncDecl { name, receiver })
    }

    /// Base type name of a receiver list such as `s *Status` or `l List[T]`:
    /// the last identifier before any type arguments.
    fn receiver_type(&self, range: Range<usize>) -> String {
        self.tokens[range]
            .iter()
            .take_while(|t| t.token != Token::LBracket)
            .filter_map(|t| match &t.token {
                Token::Identifier(name) => Some(name.as_str()),
                _ => None,
            })
            .last()
            .unwrap_or_default()
            .to_string()
    }

    /// Consumes tokens up to (not including) the first token at bracket depth
    /// zero accepted by `stop`, and returns the consumed token index range.
    fn skip_balanced(&mut self, stop: impl Fn(&Token) -> bool) -> Result<Range<usize>, ParseError> {
        let start = self.pos;
        let mut open: Vec<Token> = Vec::new();

        loop {
            let Some(token) = self.peek() else {
                return match open.last() {
                    Some(closer) => Err(self.error(&format!("unexpected EOF, expected {}", describe(closer)))),
                    None => Ok(start..self.pos),
                };
            };

            if open.is_empty() && stop(token) {
                return Ok(start..self.pos);
            }

            match token {
                Token::LParen => open.push(Token::RParen),
                Token::LBracket => open.push(Token::RBracket),
                Token::LBrace => open.push(Token::RBrace),
                Token::RParen | Token::RBracket | Token::RBrace => match open.pop() {
                    Some(expected) if &expected == token => {}
                    Some(expected) => {
                        return Err(self.error(&format!(
                            "unexpected {}, expected {}",
                            describe(token),
                            describe(&expected)
                        )));
                    }
                    None => return Err(self.error(&format!("unexpected {}", describe(token)))),
                },
                _ => {}
            }
            self.advance();
        }
    }

    /// Consumes one parenthesized group, parentheses included.
    fn skip_group(&mut self) -> Result<(), ParseError> {
        self.advance();
        self.skip_balanced(|t| matches!(t, Token::RParen))?;
        if !self.check(&Token::RParen) {
            return Err(self.error("expected ')'"));
        }
        self.advance();
        Ok(())
    }

    fn type_ref(&self, range: Range<usize>) -> TypeRef {
        match &self.tokens[range.clone()] {
            [SpannedToken {
                token: Token::Identifier(name),
                ..
            }] => TypeRef::Ident(name.clone()),
            _ => TypeRef::Other(self.text(range).to_string()),
        }
    }

    fn expr(&self, range: Range<usize>) -> Expr {
        match &self.tokens[range.clone()] {
            [SpannedToken {
                token: Token::Int(literal),
                ..
            }] => Expr::IntLit(literal.clone()),
            _ => Expr::Other(self.text(range).to_string()),
        }
    }

    /// Source text covered by a non-empty token index range.
    fn text(&self, range: Range<usize>) -> &'src str {
        if range.is_empty() {
            return "";
        }
        let start = self.tokens[range.start].span.start;
        let end = self.tokens[range.end - 1].span.end;
        &self.source[start..end]
    }

    // Comment attachment

    /// The comment group trailing token `index` on the same line, provided
    /// the next token starts on a later line (or is `;` or end of input).
    fn line_comment(&self, index: usize) -> Option<CommentGroup> {
        let token = self.tokens.get(index)?;
        let next_start = self.next_explicit_token(index + 1).map(|t| t.span.start);
        let before_next = |c: &RawComment| next_start.is_none_or(|start| c.span.start < start);

        let first = self.comments.partition_point(|c| c.span.start < token.span.end);
        let mut group: Vec<&RawComment> = Vec::new();
        for comment in &self.comments[first..] {
            let expected_line = group.last().map_or(token.end_line, |prev| prev.end_line);
            if comment.line != expected_line || !before_next(comment) {
                break;
            }
            group.push(comment);
        }

        let last = group.last()?;
        let follows = self.next_explicit_token_after(last.span.end);
        let is_line_comment = match follows {
            None => true,
            Some(next) => next.token == Token::Semicolon || next.line > last.end_line,
        };
        is_line_comment.then(|| to_group(&group))
    }

    /// The comment group ending on the line right before token `index`,
    /// excluding a trailing comment of the previous token.
    fn lead_comment(&self, index: usize) -> Option<CommentGroup> {
        let token = self.tokens.get(index)?;
        let previous = self.tokens[..index].iter().rev().find(|t| !t.implicit);

        let lower = previous.map_or(0, |p| p.span.end);
        let from = self.comments.partition_point(|c| c.span.start < lower);
        let to = self.comments.partition_point(|c| c.span.start < token.span.start);

        let candidates: Vec<&RawComment> = self.comments[from..to]
            .iter()
            .filter(|c| previous.is_none_or(|p| c.line != p.end_line))
            .collect();

        let last = candidates.last()?;
        if last.end_line + 1 != token.line {
            return None;
        }

        let mut begin = candidates.len() - 1;
        while begin > 0 && candidates[begin].line <= candidates[begin - 1].end_line + 1 {
            begin -= 1;
        }
        Some(to_group(&candidates[begin..]))
    }

    fn next_explicit_token(&self, from: usize) -> Option<&SpannedToken> {
        self.tokens.get(from..)?.iter().find(|t| !t.implicit)
    }

    fn next_explicit_token_after(&self, offset: usize) -> Option<&SpannedToken> {
        let from = self.tokens.partition_point(|t| t.span.start < offset);
        self.next_explicit_token(from)
    }

    // Helper methods

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, expected: &Token) -> bool {
        self.peek()
            .map(|t| std::mem::discriminant(t) == std::mem::discriminant(expected))
            .unwrap_or(false)
    }

    fn expect_ident(&mut self) -> Result<Ident, ParseError> {
        match self.tokens.get(self.pos) {
            Some(SpannedToken {
                token: Token::Identifier(name),
                span,
                ..
            }) => {
                let ident = Ident {
                    name: name.clone(),
                    span: span.clone(),
                };
                self.pos += 1;
                Ok(ident)
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    /// Accepts `;` or end of input.
    fn expect_semi(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(Token::Semicolon) => {
                self.advance();
                Ok(())
            }
            Some(_) => Err(self.error("expected ';' or newline")),
        }
    }

    fn error(&self, message: &str) -> ParseError {
        let (span, offset) = match self.tokens.get(self.pos) {
            Some(token) => (Some(token.span.clone()), token.span.start),
            None => (None, self.source.len()),
        };
        let found = match self.tokens.get(self.pos) {
            Some(token) if token.implicit => ", found newline".to_string(),
            Some(token) => format!(", found {}", describe(&token.token)),
            None => ", found EOF".to_string(),
        };
        ParseError {
            message: format!("{message}{found}"),
            span,
            line: self.lines.line(offset),
            column: self.lines.column(offset),
        }
    }
}

fn to_group(comments: &[&RawComment]) -> CommentGroup {
    CommentGroup {
        list: comments
            .iter()
            .map(|c| Comment {
                text: c.text.clone(),
                line: c.line,
            })
            .collect(),
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Package => "'package'".to_string(),
        Token::Import => "'import'".to_string(),
        Token::Type => "'type'".to_string(),
        Token::Const => "'const'".to_string(),
        Token::Var => "'var'".to_string(),
        Token::Func => "'func'".to_string(),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::LBrace => "'{'".to_string(),
        Token::RBrace => "'}'".to_string(),
        Token::LBracket => "'['".to_string(),
        Token::RBracket => "']'".to_string(),
        Token::Semicolon => "';'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Assign => "'='".to_string(),
        Token::Dot => "'.'".to_string(),
        Token::Operator(op) => format!("'{op}'"),
        Token::Identifier(name) => format!("identifier {name}"),
        Token::Int(lit)
        | Token::Float(lit)
        | Token::Imaginary(lit)
        | Token::Rune(lit)
        | Token::String(lit)
        | Token::RawString(lit) => format!("literal {lit}"),
        Token::LineComment(_) | Token::BlockComment(_) | Token::UnterminatedComment => {
            "comment".to_string()
        }
    }
}

/// Parse Go source code to AST.
pub fn parse(source: &str) -> Result<SourceFile, ParseError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let stream = tokenize(source).map_err(|e| ParseError {
        message: e.message,
        span: Some(e.span),
        line: e.line,
        column: e.column,
    })?;

    let mut parser = Parser::new(source, stream);
    parser.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_specs(file: &SourceFile) -> Vec<&ValueSpec> {
        file.gen_decls(DeclKind::Const)
            .flat_map(|decl| decl.specs.iter())
            .filter_map(|spec| match spec {
                Spec::Value(value) => Some(value),
                _ => None,
            })
            .collect()
    }

    fn type_specs(file: &SourceFile) -> Vec<&TypeSpec> {
        file.gen_decls(DeclKind::Type)
            .flat_map(|decl| decl.specs.iter())
            .filter_map(|spec| match spec {
                Spec::Type(ty) => Some(ty),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_parse_response_codes() {
        let source = r#"package responsecodes

type TestResponseCodes int // EZENUM

const (
	Continue           TestResponseCodes = 100 // Continue: The client can continue with the request.
	SwitchingProtocols TestResponseCodes = 101 // Switching Protocols: The server understands the request.
	Ok                 TestResponseCodes = 200 // OK: The "request" was successful.
)
"#;

        let file = parse(source).unwrap();
        assert_eq!(file.package.name, "responsecodes");

        let types = type_specs(&file);
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name.name, "TestResponseCodes");
        assert_eq!(types[0].definition, "int");
        assert_eq!(types[0].comment.as_ref().unwrap().text(), "EZENUM");

        let consts = value_specs(&file);
        assert_eq!(consts.len(), 3);
        assert_eq!(consts[0].names[0].name, "Continue");
        assert_eq!(
            consts[0].ty,
            Some(TypeRef::Ident("TestResponseCodes".to_string()))
        );
        assert_eq!(consts[2].values, vec![Expr::IntLit("200".to_string())]);
        assert_eq!(
            consts[2].comment.as_ref().unwrap().list[0].text,
            r#"// OK: The "request" was successful."#
        );
    }

    #[test]
    fn test_parse_skips_imports_funcs_and_vars() {
        let source = r#"// Package doc.
package demo

import (
	"fmt"
	str "strings"
)

import _ "embed"

var table = map[string]int{
	"a": 1,
	"b": 2,
}

func (s Status) String() string {
	if s > 0 {
		return fmt.Sprintf("%d", s)
	}
	return str.ToLower("X")
}

func helper[T any](v T) T { return v }

func (l *List[T]) Len() int { return 0 }

type Status int
"#;

        let file = parse(source).unwrap();
        assert_eq!(file.gen_decls(DeclKind::Import).count(), 2);
        assert_eq!(file.gen_decls(DeclKind::Var).count(), 1);

        let funcs: Vec<_> = file
            .funcs()
            .map(|f| (f.name.name.as_str(), f.receiver.as_deref()))
            .collect();
        assert_eq!(
            funcs,
            vec![
                ("String", Some("Status")),
                ("helper", None),
                ("Len", Some("List"))
            ]
        );

        let imports: Vec<String> = file
            .gen_decls(DeclKind::Import)
            .flat_map(|d| d.specs.iter())
            .filter_map(|s| match s {
                Spec::Import(import) => Some(import.path.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(imports, vec!["fmt", "strings", "embed"]);
        assert_eq!(type_specs(&file)[0].name.name, "Status");
    }

    #[test]
    fn test_parse_untyped_and_implicit_specs() {
        let source = "package p\n\nconst (\n\tA Kind = iota // a\n\tB // b\n\tC, D = 7, 8 // c /* d */\n\tE = -1\n)\n";

        let file = parse(source).unwrap();
        let consts = value_specs(&file);
        assert_eq!(consts.len(), 4);

        assert_eq!(consts[0].values, vec![Expr::Other("iota".to_string())]);
        assert!(consts[1].ty.is_none());
        assert!(consts[1].values.is_empty());
        assert_eq!(consts[1].comment.as_ref().unwrap().text(), "b");

        assert_eq!(consts[2].names.len(), 2);
        assert!(consts[2].values.iter().all(Expr::is_int_lit));
        // `// c /* d */` is a single line comment
        assert_eq!(consts[2].comment.as_ref().unwrap().list.len(), 1);

        assert_eq!(consts[3].values, vec![Expr::Other("-1".to_string())]);
        assert!(consts[3].comment.is_none());
    }

    #[test]
    fn test_parse_multiple_trailing_block_comments() {
        let source = "package p\nconst X, Y T = 1, 2 /* x */ /* y */\n";
        let file = parse(source).unwrap();
        let consts = value_specs(&file);
        let comment = consts[0].comment.as_ref().unwrap();
        assert_eq!(comment.list.len(), 2);
        assert_eq!(comment.text(), "x\ny");
    }

    #[test]
    fn test_trailing_comment_does_not_swallow_next_doc() {
        let source = "package p\n\nconst (\n\tA T = 1 // a\n\t// doc for B\n\tB T = 2\n)\n";
        let file = parse(source).unwrap();
        let consts = value_specs(&file);

        assert_eq!(consts[0].comment.as_ref().unwrap().text(), "a");
        assert!(consts[1].comment.is_none());
        assert_eq!(consts[1].doc.as_ref().unwrap().text(), "doc for B");
    }

    #[test]
    fn test_doc_comment_on_ungrouped_type() {
        let source = "package p\n\n// Color is an enum.\n// EZENUM\ntype Color uint8\n";
        let file = parse(source).unwrap();
        let decl = file.gen_decls(DeclKind::Type).next().unwrap();
        assert_eq!(decl.doc.as_ref().unwrap().text(), "Color is an enum.\nEZENUM");
        assert!(type_specs(&file)[0].comment.is_none());
    }

    #[test]
    fn test_comment_followed_by_token_on_same_line_is_not_attached() {
        let source = "package p\nconst ( A T = 1 /* a */ )\n";
        let file = parse(source).unwrap();
        assert!(value_specs(&file)[0].comment.is_none());
    }

    #[test]
    fn test_grouped_types_with_generics_and_alias() {
        let source = "package p\n\ntype (\n\tPair[K comparable, V any] struct {\n\t\tKey K\n\t\tVal V\n\t}\n\tCode = int // EZENUM\n)\n";
        let file = parse(source).unwrap();
        let types = type_specs(&file);
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].name.name, "Pair");
        assert!(types[1].alias);
        assert!(types[1].comment.as_ref().unwrap().contains("EZENUM"));
    }

    #[test]
    fn test_missing_package_clause() {
        let err = parse("type X int\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("expected 'package'"));
    }

    #[test]
    fn test_unbalanced_braces() {
        let err = parse("package p\n\nfunc main() {\n\tif true {\n}\n").unwrap_err();
        assert!(err.message.contains("unexpected EOF"));
    }

    #[test]
    fn test_mismatched_closer() {
        let err = parse("package p\nvar x = f(1]\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("expected ')'"));
    }

    #[test]
    fn test_unexpected_top_level_token() {
        let err = parse("package p\n\nx := 1\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("expected declaration"));
    }

    #[test]
    fn test_missing_constant_value_expression() {
        let err = parse("package p\nconst A T = \n").unwrap_err();
        assert!(err.message.contains("expected expression"));
    }
}

//! Go lexer using the logos crate.
//!
//! Comments are kept (they carry the marker and the constant descriptions)
//! but are returned apart from the token stream, together with their line
//! positions. Semicolons are inserted at line ends following Go's automatic
//! semicolon rule so the parser can treat newlines as statement terminators.

use logos::Logos;
use std::ops::Range;

/// Tokens for Go source files.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // Keywords the declaration parser dispatches on. Every other keyword
    // lexes as an identifier.
    #[token("package")]
    Package,

    #[token("import")]
    Import,

    #[token("type")]
    Type,

    #[token("const")]
    Const,

    #[token("var")]
    Var,

    #[token("func")]
    Func,

    // Punctuation
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token("=")]
    Assign,

    #[token(".")]
    Dot,

    #[regex(r"\+\+|--|\+=|-=|\*=|/=|%=|&\^=|&\^|&=|\|=|\^=|<<=|>>=|<<|>>|&&|\|\||<-|==|!=|<=|>=|:=|\.\.\.|[+\-*/%&|^<>!~:]", |lex| lex.slice().to_string())]
    Operator(String),

    // Literals
    #[regex(r"0[xX][0-9a-fA-F_]+|0[bB][01_]+|0[oO][0-7_]+|[0-9][0-9_]*", |lex| lex.slice().to_string())]
    Int(String),

    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?|\.[0-9][0-9_]*([eE][+-]?[0-9]+)?|[0-9][0-9_]*[eE][+-]?[0-9]+", |lex| lex.slice().to_string())]
    Float(String),

    #[regex(r"[0-9][0-9_.]*([eE][+-]?[0-9]+)?i", |lex| lex.slice().to_string())]
    Imaginary(String),

    #[regex(r"'([^'\\\n]|\\[^\n])+'", |lex| lex.slice().to_string())]
    Rune(String),

    #[regex(r#""([^"\\\n]|\\[^\n])*""#, |lex| lex.slice().to_string())]
    String(String),

    #[regex(r"`[^`]*`", |lex| lex.slice().to_string())]
    RawString(String),

    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Comments keep their delimiters, the same way Go's own AST does.
    #[regex(r"//[^\n]*", callback = |lex| lex.slice().to_string(), allow_greedy = true)]
    LineComment(String),

    #[regex(r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/", |lex| lex.slice().to_string())]
    BlockComment(String),

    // Only wins when no terminated block comment matches.
    #[token("/*")]
    UnterminatedComment,
}

impl Token {
    /// Whether a line break after this token terminates the statement.
    fn ends_statement(&self) -> bool {
        match self {
            Token::Identifier(_)
            | Token::Int(_)
            | Token::Float(_)
            | Token::Imaginary(_)
            | Token::Rune(_)
            | Token::String(_)
            | Token::RawString(_)
            | Token::RParen
            | Token::RBracket
            | Token::RBrace => true,
            Token::Operator(op) => op == "++" || op == "--",
            _ => false,
        }
    }
}

/// A token with its span and line in the source.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Range<usize>,
    /// 1-based line of the first byte.
    pub line: usize,
    /// 1-based line of the last byte.
    pub end_line: usize,
    /// True for semicolons inserted at a line break or at end of input.
    pub implicit: bool,
}

/// A single `//` or `/* */` comment, delimiters included.
#[derive(Debug, Clone, PartialEq)]
pub struct RawComment {
    pub text: String,
    pub span: Range<usize>,
    pub line: usize,
    pub end_line: usize,
}

/// Output of [`tokenize`].
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    pub tokens: Vec<SpannedToken>,
    pub comments: Vec<RawComment>,
}

/// Maps byte offsets to 1-based line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    pub fn line(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }

    pub fn column(&self, offset: usize) -> usize {
        let line = self.line(offset);
        offset - self.starts[line - 1] + 1
    }
}

/// Tokenize a Go source file.
pub fn tokenize(source: &str) -> Result<TokenStream, LexError> {
    let lines = LineIndex::new(source);
    let mut stream = TokenStream::default();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let line = lines.line(span.start);
        let end_line = lines.line(span.end.saturating_sub(1).max(span.start));

        match result {
            Ok(Token::LineComment(text)) | Ok(Token::BlockComment(text)) => {
                stream.comments.push(RawComment {
                    text,
                    span,
                    line,
                    end_line,
                });
            }
            Ok(Token::UnterminatedComment) => {
                return Err(LexError {
                    span,
                    line,
                    column: lines.column(lexer.span().start),
                    message: "comment not terminated".to_string(),
                });
            }
            Ok(token) => {
                insert_semicolon(&mut stream.tokens, line);
                stream.tokens.push(SpannedToken {
                    token,
                    span,
                    line,
                    end_line,
                    implicit: false,
                });
            }
            Err(()) => {
                let start = span.start;
                let found: String = source[start..].chars().take(1).collect();
                return Err(LexError {
                    span,
                    line,
                    column: lines.column(start),
                    message: format!("unexpected character '{}'", found.escape_debug()),
                });
            }
        }
    }

    insert_semicolon(&mut stream.tokens, usize::MAX);
    Ok(stream)
}

/// Appends an implicit semicolon when the next token starts on a later line
/// than the previous one ended and the previous token can end a statement.
fn insert_semicolon(tokens: &mut Vec<SpannedToken>, next_line: usize) {
    let Some(last) = tokens.last() else {
        return;
    };
    if next_line > last.end_line && last.token.ends_statement() {
        let at = last.span.end;
        let line = last.end_line;
        tokens.push(SpannedToken {
            token: Token::Semicolon,
            span: at..at,
            line,
            end_line: line,
            implicit: true,
        });
    }
}

/// Lexer error.
#[derive(Debug, Clone)]
pub struct LexError {
    pub span: Range<usize>,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for LexError {}

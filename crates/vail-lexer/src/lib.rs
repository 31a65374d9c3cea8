// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Lexical analysis for Vail.
//!
//! This crate tokenizes Vail source code using logos.
//!
//! # Design
//!
//! - `TokenKind` — all Vail token types (keywords, operators, literals,
//!   identifiers)
//! - Newlines are tokens, not whitespace: statements are line-terminated
//! - `#` comments are tokens too, so the pretty-printer can preserve them
//! - String literals stay raw (quotes included); the parser decodes them
//!   so a bad escape gets a located diagnostic instead of a generic one
//! - The comparison family is one data-carrying variant, `Cmp(op, ?-flag)`,
//!   instead of twenty near-identical variants
//! - [`lex`] never fails: unrecognized input becomes an `Error` token the
//!   parser turns into a diagnostic
//!
//! # Examples
//!
//! ```
//! # use vail_lexer::{lex, TokenKind};
//! let tokens = lex("let x = 1 + 2\n", 0);
//! assert_eq!(tokens[0].kind, TokenKind::Let);
//! ```

use logos::Logos;
use vail_ast::{CmpOp, Span};

/// Vail token kind.
///
/// Represents all lexical elements of the language. Case-insensitive
/// comparison operators carry their `?` suffix as a flag on [`TokenKind::Cmp`].
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")] // Skip horizontal whitespace; \n is a token
pub enum TokenKind {
    // === Keywords ===
    /// Keyword `const`
    #[token("const")]
    Const,
    /// Keyword `let`
    #[token("let")]
    Let,
    /// Keyword `func`
    #[token("func")]
    Func,
    /// Keyword `return`
    #[token("return")]
    Return,
    /// Keyword `import`
    #[token("import")]
    Import,
    /// Keyword `as`
    #[token("as")]
    As,
    /// Keyword `from`
    #[token("from")]
    From,
    /// Keyword `if`
    #[token("if")]
    If,
    /// Keyword `else`
    #[token("else")]
    Else,
    /// Keyword `while`
    #[token("while")]
    While,
    /// Keyword `for`
    #[token("for")]
    For,
    /// Keyword `in`
    #[token("in")]
    In,

    // Literal keywords
    /// Boolean literal `true`
    #[token("true")]
    True,
    /// Boolean literal `false`
    #[token("false")]
    False,
    /// Literal `null`
    #[token("null")]
    Null,

    // === Operators ===
    /// Operator `+`
    #[token("+")]
    Plus,
    /// Operator `-`
    #[token("-")]
    Minus,
    /// Operator `*`
    #[token("*")]
    Star,
    /// Operator `/`
    #[token("/")]
    Slash,
    /// Operator `%`
    #[token("%")]
    Percent,
    /// Operator `!`
    #[token("!")]
    Bang,
    /// Operator `||`
    #[token("||")]
    OrOr,
    /// Operator `&&`
    #[token("&&")]
    AndAnd,
    /// Operator `=`
    #[token("=")]
    Assign,
    /// Operator `?` (ternary)
    #[token("?")]
    Question,
    /// Operator `:`
    #[token(":")]
    Colon,

    /// Comparison-family operator, with its case-insensitive `?` flag.
    ///
    /// `is`/`isnot` are word-shaped but live here, not with the keywords,
    /// because they parse at the same precedence level.
    // The callback bodies are braced: the derive parses the attribute
    // token stream itself, and a bare tuple literal trips it up.
    #[token("==", |_| { (CmpOp::Eq, false) })]
    #[token("==?", |_| { (CmpOp::Eq, true) })]
    #[token("!=", |_| { (CmpOp::Ne, false) })]
    #[token("!=?", |_| { (CmpOp::Ne, true) })]
    #[token(">", |_| { (CmpOp::Gt, false) })]
    #[token(">?", |_| { (CmpOp::Gt, true) })]
    #[token(">=", |_| { (CmpOp::Ge, false) })]
    #[token(">=?", |_| { (CmpOp::Ge, true) })]
    #[token("<", |_| { (CmpOp::Lt, false) })]
    #[token("<?", |_| { (CmpOp::Lt, true) })]
    #[token("<=", |_| { (CmpOp::Le, false) })]
    #[token("<=?", |_| { (CmpOp::Le, true) })]
    #[token("=~", |_| { (CmpOp::Match, false) })]
    #[token("=~?", |_| { (CmpOp::Match, true) })]
    #[token("!~", |_| { (CmpOp::NoMatch, false) })]
    #[token("!~?", |_| { (CmpOp::NoMatch, true) })]
    #[token("is", |_| { (CmpOp::Is, false) })]
    #[token("is?", |_| { (CmpOp::Is, true) })]
    #[token("isnot", |_| { (CmpOp::IsNot, false) })]
    #[token("isnot?", |_| { (CmpOp::IsNot, true) })]
    Cmp((CmpOp, bool)),

    // === Delimiters ===
    /// Delimiter `(`
    #[token("(")]
    LParen,
    /// Delimiter `)`
    #[token(")")]
    RParen,
    /// Delimiter `{`
    #[token("{")]
    LBrace,
    /// Delimiter `}`
    #[token("}")]
    RBrace,
    /// Delimiter `[`
    #[token("[")]
    LBracket,
    /// Delimiter `]`
    #[token("]")]
    RBracket,
    /// Delimiter `,`
    #[token(",")]
    Comma,
    /// Delimiter `.`
    #[token(".")]
    Dot,

    /// Statement terminator.
    #[token("\n")]
    Newline,

    /// `# ...` comment, text after the `#` with surrounding space trimmed.
    #[regex(r"#[^\n]*", |lex| lex.slice()[1..].trim().to_string())]
    Comment(String),

    // === Literals ===
    /// Integer literal, decimal or `0x` hex.
    ///
    /// Overflowing literals fail the callback and surface as `Error`
    /// tokens; the parser reports them at their location.
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok(), priority = 3)]
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| i64::from_str_radix(&lex.slice()[2..], 16).ok())]
    Int(i64),

    /// Float literal (e.g. 3.14, 1.0e-8)
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    /// String literal, raw text including quotes.
    ///
    /// Double-quoted with backslash escapes or single-quoted with `''`
    /// doubling; decoding happens in the parser via `vail_ast::strings`.
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice().to_string())]
    #[regex(r"'([^'\n]|'')*'", |lex| lex.slice().to_string())]
    Str(String),

    /// Identifier (also used for modifier words and type names)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    /// `&option` editor option reference
    #[regex(r"&[a-z][a-z]*", |lex| lex.slice()[1..].to_string())]
    OptionVar(String),

    /// `$NAME` environment variable reference
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice()[1..].to_string())]
    Env(String),

    /// `@r` register reference
    #[regex(r#"@[a-zA-Z0-9"\-:.%#=*+~_/]"#, |lex| lex.slice()[1..].to_string())]
    Reg(String),

    /// Unrecognized input, one token per bad character.
    ///
    /// The catch-all loses every priority dispute, so it only fires when
    /// nothing else matches; overflowing numeric literals land here too.
    #[regex(r".", |lex| lex.slice().to_string(), priority = 0)]
    Error(String),
}

impl TokenKind {
    /// Short description for parse error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Const => "`const`".into(),
            TokenKind::Let => "`let`".into(),
            TokenKind::Func => "`func`".into(),
            TokenKind::Return => "`return`".into(),
            TokenKind::Import => "`import`".into(),
            TokenKind::As => "`as`".into(),
            TokenKind::From => "`from`".into(),
            TokenKind::If => "`if`".into(),
            TokenKind::Else => "`else`".into(),
            TokenKind::While => "`while`".into(),
            TokenKind::For => "`for`".into(),
            TokenKind::In => "`in`".into(),
            TokenKind::True => "`true`".into(),
            TokenKind::False => "`false`".into(),
            TokenKind::Null => "`null`".into(),
            TokenKind::Plus => "`+`".into(),
            TokenKind::Minus => "`-`".into(),
            TokenKind::Star => "`*`".into(),
            TokenKind::Slash => "`/`".into(),
            TokenKind::Percent => "`%`".into(),
            TokenKind::Bang => "`!`".into(),
            TokenKind::OrOr => "`||`".into(),
            TokenKind::AndAnd => "`&&`".into(),
            TokenKind::Assign => "`=`".into(),
            TokenKind::Question => "`?`".into(),
            TokenKind::Colon => "`:`".into(),
            TokenKind::Cmp((op, ignore_case)) => {
                format!("`{}{}`", op.base_str(), if *ignore_case { "?" } else { "" })
            }
            TokenKind::LParen => "`(`".into(),
            TokenKind::RParen => "`)`".into(),
            TokenKind::LBrace => "`{`".into(),
            TokenKind::RBrace => "`}`".into(),
            TokenKind::LBracket => "`[`".into(),
            TokenKind::RBracket => "`]`".into(),
            TokenKind::Comma => "`,`".into(),
            TokenKind::Dot => "`.`".into(),
            TokenKind::Newline => "end of line".into(),
            TokenKind::Comment(_) => "comment".into(),
            TokenKind::Int(_) => "integer literal".into(),
            TokenKind::Float(_) => "float literal".into(),
            TokenKind::Str(_) => "string literal".into(),
            TokenKind::Ident(name) => format!("`{name}`"),
            TokenKind::OptionVar(name) => format!("`&{name}`"),
            TokenKind::Env(name) => format!("`${name}`"),
            TokenKind::Reg(name) => format!("`@{name}`"),
            TokenKind::Error(text) => format!("`{text}`"),
        }
    }
}

/// A token with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Tokenize one source file.
///
/// Never fails: unrecognized input becomes [`TokenKind::Error`] tokens.
/// End of input is the end of the vector; the parser's stream reports it
/// as "end of file".
pub fn lex(source: &str, file_id: u16) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut line: u16 = 1;
    let mut lexer = TokenKind::lexer(source);
    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::new(file_id, range.start as u32, range.end as u32, line);
        let kind = match result {
            Ok(kind) => kind,
            Err(()) => TokenKind::Error(lexer.slice().to_string()),
        };
        if kind == TokenKind::Newline {
            line = line.saturating_add(1);
        }
        tokens.push(Token { kind, span });
    }
    tokens
}

#[cfg(test)]
#[allow(clippy::approx_constant)] // Tests verify lexing of literal 3.14, not mathematical PI
mod tests {
    use super::*;

    /// Test helper: lex and drop spans.
    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source, 0).into_iter().map(|t| t.kind).collect()
    }

    fn ident(s: &str) -> TokenKind {
        TokenKind::Ident(s.to_string())
    }

    fn cmp(op: CmpOp, ignore_case: bool) -> TokenKind {
        TokenKind::Cmp((op, ignore_case))
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("const let func x constx"),
            vec![
                TokenKind::Const,
                TokenKind::Let,
                TokenKind::Func,
                ident("x"),
                ident("constx"),
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("42 3.14 1.0e-8 0xff"),
            vec![
                TokenKind::Int(42),
                TokenKind::Float(3.14),
                TokenKind::Float(1.0e-8),
                TokenKind::Int(255),
            ]
        );
    }

    #[test]
    fn strings_stay_raw() {
        assert_eq!(
            kinds(r#""a\nb" 'it''s'"#),
            vec![
                TokenKind::Str(r#""a\nb""#.to_string()),
                TokenKind::Str("'it''s'".to_string()),
            ]
        );
    }

    #[test]
    fn comparison_family() {
        assert_eq!(
            kinds("== ==? =~? isnot is? <="),
            vec![
                cmp(CmpOp::Eq, false),
                cmp(CmpOp::Eq, true),
                cmp(CmpOp::Match, true),
                cmp(CmpOp::IsNot, false),
                cmp(CmpOp::Is, true),
                cmp(CmpOp::Le, false),
            ]
        );
    }

    #[test]
    fn every_comparison_spelling_lexes() {
        let ops = [
            ("==", CmpOp::Eq),
            ("!=", CmpOp::Ne),
            (">", CmpOp::Gt),
            (">=", CmpOp::Ge),
            ("<", CmpOp::Lt),
            ("<=", CmpOp::Le),
            ("=~", CmpOp::Match),
            ("!~", CmpOp::NoMatch),
            ("is", CmpOp::Is),
            ("isnot", CmpOp::IsNot),
        ];
        for (spelling, op) in ops {
            assert_eq!(kinds(spelling), vec![cmp(op, false)], "{spelling}");
            let insensitive = format!("{spelling}?");
            assert_eq!(kinds(&insensitive), vec![cmp(op, true)], "{insensitive}");
        }
    }

    #[test]
    fn question_after_comparison_is_greedy() {
        // `a ==? b` is one operator; `a == ?` never happens without space
        assert_eq!(
            kinds("a ==? b ? c : d"),
            vec![
                ident("a"),
                cmp(CmpOp::Eq, true),
                ident("b"),
                TokenKind::Question,
                ident("c"),
                TokenKind::Colon,
                ident("d"),
            ]
        );
    }

    #[test]
    fn newlines_are_tokens() {
        assert_eq!(
            kinds("let x = 1\nx = 2\n"),
            vec![
                TokenKind::Let,
                ident("x"),
                TokenKind::Assign,
                TokenKind::Int(1),
                TokenKind::Newline,
                ident("x"),
                TokenKind::Assign,
                TokenKind::Int(2),
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn comments_are_tokens() {
        assert_eq!(
            kinds("x # trailing note\n"),
            vec![
                ident("x"),
                TokenKind::Comment("trailing note".to_string()),
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn editor_references() {
        assert_eq!(
            kinds(r#"&shiftwidth $HOME @" @a"#),
            vec![
                TokenKind::OptionVar("shiftwidth".to_string()),
                TokenKind::Env("HOME".to_string()),
                TokenKind::Reg("\"".to_string()),
                TokenKind::Reg("a".to_string()),
            ]
        );
    }

    #[test]
    fn ampersand_option_vs_logical_and() {
        assert_eq!(
            kinds("a && &wrap"),
            vec![
                ident("a"),
                TokenKind::AndAnd,
                TokenKind::OptionVar("wrap".to_string()),
            ]
        );
    }

    #[test]
    fn unrecognized_input_becomes_error_tokens() {
        let tokens = kinds("a ` b");
        assert_eq!(
            tokens,
            vec![
                ident("a"),
                TokenKind::Error("`".to_string()),
                ident("b"),
            ]
        );
    }

    #[test]
    fn spans_track_lines() {
        let tokens = lex("a\nbb\n", 0);
        assert_eq!(tokens[0].span.start_line, 1);
        assert_eq!(tokens[2].span.start_line, 2);
        assert_eq!(tokens[2].span.start, 2);
        assert_eq!(tokens[2].span.end, 4);
    }

    #[test]
    fn describe_for_error_messages() {
        assert_eq!(cmp(CmpOp::Ge, true).describe(), "`>=?`");
        assert_eq!(ident("foo").describe(), "`foo`");
    }
}

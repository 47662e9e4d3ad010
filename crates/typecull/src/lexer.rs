//! Lexical analysis for the type-declaration dialect.
//!
//! Tokenization uses logos. Whitespace is skipped by the lexer; comments are
//! surfaced as tokens because the parser inspects them for `Hint:` metadata
//! before discarding them.
//!
//! # Design
//!
//! - `Token` — all dialect token types (keywords, punctuation, literals,
//!   identifiers, comments)
//! - String literals accept single or double quotes and are unescaped here;
//!   the parser only ever sees the decoded text
//! - Number literals keep their source spelling (the dialect treats numbers
//!   as opaque literal types, so nothing downstream needs a parsed value)
//!
//! # Examples
//!
//! ```
//! # use typecull::lexer::*;
//! # use logos::Logos;
//! let source = "type Size=\"Small\"|\"Large\";";
//! let tokens: Vec<_> = Token::lexer(source).collect();
//! assert_eq!(tokens.len(), 7);
//! ```

use logos::{Lexer, Logos};

/// Dialect token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // === Keywords ===
    /// Keyword `type`
    #[token("type")]
    Type,
    /// Keyword `extends`
    #[token("extends")]
    Extends,
    /// Keyword `never`
    #[token("never")]
    Never,
    /// Keyword `any`
    #[token("any")]
    Any,
    /// Boolean literal type `true`
    #[token("true")]
    True,
    /// Boolean literal type `false`
    #[token("false")]
    False,

    // === Punctuation ===
    /// `=`
    #[token("=")]
    Eq,
    /// `<`
    #[token("<")]
    Lt,
    /// `>`
    #[token(">")]
    Gt,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semi,
    /// `:`
    #[token(":")]
    Colon,
    /// `|`
    #[token("|")]
    Pipe,
    /// `?`
    #[token("?")]
    Question,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,

    // === Literals ===
    /// Signed integer or float literal, kept as spelled.
    #[regex(r"[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),

    /// String literal in either quote style, unescaped.
    #[regex(r#""([^"\\\n]|\\.)*""#, unescape_string)]
    #[regex(r"'([^'\\\n]|\\.)*'", unescape_string)]
    Str(String),

    /// Identifier (type names, parameter names, field names).
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // === Comments ===
    /// Line comment; payload is the text after `//`.
    #[regex(r"//[^\n]*", callback = |lex| lex.slice()[2..].to_string(), allow_greedy = true)]
    LineComment(String),

    /// Block comment; payload is the text between `/*` and `*/`.
    #[regex(r"/\*([^*]|\*[^/])*\*+/", |lex| {
        let s = lex.slice();
        s[2..s.len() - 2].to_string()
    })]
    BlockComment(String),
}

/// Strip quotes and decode escape sequences.
///
/// Both quote styles decode the same escapes, so `'It\'s'` and `"It's"`
/// produce identical tokens. Unknown escapes and truncated `\u` sequences
/// reject the token, which the caller reports as a syntax error.
fn unescape_string(lex: &mut Lexer<Token>) -> Option<String> {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '\\' => out.push('\\'),
            '/' => out.push('/'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'u' => {
                let mut code = 0u32;
                for _ in 0..4 {
                    code = code * 16 + chars.next()?.to_digit(16)?;
                }
                out.push(char::from_u32(code)?);
            }
            _ => return None,
        }
    }
    Some(out)
}

impl Token {
    /// True for comment tokens, which the parser filters out after hint
    /// extraction.
    pub fn is_comment(&self) -> bool {
        matches!(self, Token::LineComment(_) | Token::BlockComment(_))
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Type => write!(f, "type"),
            Token::Extends => write!(f, "extends"),
            Token::Never => write!(f, "never"),
            Token::Any => write!(f, "any"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Eq => write!(f, "="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Comma => write!(f, ","),
            Token::Semi => write!(f, ";"),
            Token::Colon => write!(f, ":"),
            Token::Pipe => write!(f, "|"),
            Token::Question => write!(f, "?"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Number(n) => write!(f, "{}", n),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::Ident(id) => write!(f, "{}", id),
            Token::LineComment(text) => write!(f, "//{}", text),
            Token::BlockComment(text) => write!(f, "/*{}*/", text),
        }
    }
}

//! Recursive-descent parser for the type dialect.
//!
//! [`parse`] turns source text into a flat list of [`Declaration`]s. The
//! parser is fail-fast: the first error aborts the whole parse, there is no
//! recovery. Comments are filtered out of the token stream before descent,
//! except that a comment whose text starts with `Hint:` is remembered and
//! attached to the declaration that follows it. When several hints pile up
//! before the same declaration, the last one wins; a trailing hint with no
//! declaration after it is dropped.

mod error;
mod stream;
mod types;

pub use error::{ParseError, ParseErrorKind};

use logos::Logos;

use crate::ast::{Declaration, TypeParam};
use crate::lexer::Token;
use crate::span::Span;

use stream::TokenStream;

pub fn parse(source: &str) -> Result<Vec<Declaration>, ParseError> {
    let (tokens, hints) = lex_and_split(source)?;
    let mut stream = TokenStream::new(&tokens);
    let mut declarations = Vec::new();
    let mut hint_cursor = 0;
    while !stream.at_end() {
        // Every hint anchored at or before this declaration's first token
        // belongs to it; the last of them wins.
        let mut hint = None;
        while hint_cursor < hints.len() && hints[hint_cursor].0 <= stream.current_pos() {
            hint = Some(hints[hint_cursor].1.clone());
            hint_cursor += 1;
        }
        declarations.push(parse_declaration(&mut stream, hint)?);
    }
    Ok(declarations)
}

/// Lex the source, splitting comments out of the token stream. Hints are
/// anchored to the index of the next real token so the declaration loop can
/// tell which declaration they precede.
fn lex_and_split(source: &str) -> Result<(Vec<(Token, Span)>, Vec<(usize, String)>), ParseError> {
    let mut tokens = Vec::new();
    let mut hints = Vec::new();
    let mut lexer = Token::lexer(source);
    while let Some(result) = lexer.next() {
        let span = Span::from(lexer.span());
        match result {
            Ok(token) if token.is_comment() => {
                if let Some(text) = hint_text(&token) {
                    hints.push((tokens.len(), text));
                }
            }
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                return Err(ParseError::invalid_syntax(
                    format!("unrecognized token `{}`", &source[lexer.span()]),
                    span,
                ));
            }
        }
    }
    Ok((tokens, hints))
}

/// Extract the hint payload from a comment token, if it carries one. The
/// text is whitespace-normalized so a multi-line block hint still re-emits
/// as a single `//` line.
fn hint_text(token: &Token) -> Option<String> {
    let body = match token {
        Token::LineComment(text) | Token::BlockComment(text) => text,
        _ => return None,
    };
    let rest = body.trim_start().strip_prefix("Hint:")?;
    Some(rest.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn parse_declaration(
    stream: &mut TokenStream,
    hint: Option<String>,
) -> Result<Declaration, ParseError> {
    stream.expect(Token::Type)?;
    let name_span = stream.current_span();
    let name = expect_ident(stream, "as declaration name")?;
    let params = if stream.eat(&Token::Lt) {
        parse_params(stream)?
    } else {
        Vec::new()
    };
    stream.expect(Token::Eq)?;
    let body = types::parse_type(stream)?;
    stream.eat(&Token::Semi);
    Ok(Declaration {
        name,
        name_span,
        params,
        body,
        hint,
    })
}

/// Parameter list with the `<` already consumed: `T`, `T extends Bound`,
/// comma-separated.
fn parse_params(stream: &mut TokenStream) -> Result<Vec<TypeParam>, ParseError> {
    let mut params = Vec::new();
    loop {
        let name = expect_ident(stream, "as type parameter name")?;
        let constraint = if stream.eat(&Token::Extends) {
            Some(types::parse_type(stream)?)
        } else {
            None
        };
        params.push(TypeParam { name, constraint });
        if !stream.eat(&Token::Comma) {
            break;
        }
    }
    stream.expect(Token::Gt)?;
    Ok(params)
}

fn expect_ident(stream: &mut TokenStream, context: &str) -> Result<String, ParseError> {
    let span = stream.current_span();
    match stream.advance() {
        Some(Token::Ident(name)) => Ok(name.clone()),
        other => Err(ParseError::unexpected_token(other, context, span)),
    }
}

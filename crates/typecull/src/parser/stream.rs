//! Token stream wrapper for the hand-written parser.

use crate::lexer::Token;
use crate::span::Span;

use super::error::ParseError;

/// Token stream with lookahead and position tracking.
///
/// Each token is paired with its byte span from the source, so errors point
/// at real locations. The stream the parser sees is comment-free; hint
/// comments are pulled out beforehand (see [`super::parse`]).
pub struct TokenStream<'src> {
    tokens: &'src [(Token, Span)],
    pos: usize,
}

impl<'src> TokenStream<'src> {
    pub fn new(tokens: &'src [(Token, Span)]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> Option<&'src Token> {
        self.tokens.get(self.pos).map(|(tok, _)| tok)
    }

    /// Advance to the next token and return the consumed one.
    pub fn advance(&mut self) -> Option<&'src Token> {
        let token = self.tokens.get(self.pos).map(|(tok, _)| tok);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Check if the current token has the same discriminant as `expected`.
    pub fn check(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some(t) if std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    /// Consume the current token if it matches; report whether it did.
    pub fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect a specific token and advance past it.
    pub fn expect(&mut self, expected: Token) -> Result<Span, ParseError> {
        if self.check(&expected) {
            let span = self.current_span();
            self.advance();
            Ok(span)
        } else {
            Err(ParseError::expected_token(
                &expected,
                self.peek(),
                self.current_span(),
            ))
        }
    }

    /// Check if we've reached the end of the token stream.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Current position (token index), used to anchor hint lookups.
    pub fn current_pos(&self) -> usize {
        self.pos
    }

    /// Span of the current token, or a zero-length span at EOF.
    pub fn current_span(&self) -> Span {
        if let Some((_, span)) = self.tokens.get(self.pos) {
            *span
        } else if let Some((_, span)) = self.tokens.last() {
            Span::at(span.end)
        } else {
            Span::at(0)
        }
    }
}

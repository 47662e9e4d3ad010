//! Type-expression parsing.
//!
//! Grammar, in precedence order (loosest first):
//!
//! ```text
//! type     := "|"? array ("|" array)*
//! array    := primary ("[" "]")*
//! primary  := literal | template | "never" | "any" | "true" | "false"
//!           | reference | struct | "(" type ")"
//! template := "LITERAL" "<" string "," "[" (string ("," string)*)? "]" "," bool ">"
//! struct   := "{" (field (("," | ";") field)* ("," | ";")?)? "}"
//! field    := name "?"? ":" type
//! ```
//!
//! `CHOOSE`, `LITERAL`, `string`, `number`, and `boolean` are contextual:
//! they have their built-in meaning in type position but remain ordinary
//! identifiers everywhere else (so `type CHOOSE = "CHOOSE";` stays legal, as
//! do fields named `type`).

use crate::ast::{Field, LiteralValue, PrimitiveKind, SpecialKind, TypeExpr};
use crate::lexer::Token;

use super::error::ParseError;
use super::stream::TokenStream;

pub(super) fn parse_type(stream: &mut TokenStream) -> Result<TypeExpr, ParseError> {
    // A leading `|` before the first member is legal.
    stream.eat(&Token::Pipe);
    let mut members = vec![parse_array(stream)?];
    while stream.eat(&Token::Pipe) {
        members.push(parse_array(stream)?);
    }
    Ok(if members.len() == 1 {
        members.remove(0)
    } else {
        TypeExpr::Union { members }
    })
}

fn parse_array(stream: &mut TokenStream) -> Result<TypeExpr, ParseError> {
    let mut expr = parse_primary(stream)?;
    while stream.eat(&Token::LBracket) {
        stream.expect(Token::RBracket)?;
        expr = TypeExpr::Array {
            element: Box::new(expr),
        };
    }
    Ok(expr)
}

fn parse_primary(stream: &mut TokenStream) -> Result<TypeExpr, ParseError> {
    let span = stream.current_span();
    match stream.advance() {
        Some(Token::Never) => Ok(TypeExpr::Special(SpecialKind::Never)),
        Some(Token::Any) => Ok(TypeExpr::Special(SpecialKind::Any)),
        Some(Token::True) => Ok(TypeExpr::Primitive(PrimitiveKind::True)),
        Some(Token::False) => Ok(TypeExpr::Primitive(PrimitiveKind::False)),
        Some(Token::Number(text)) => Ok(TypeExpr::Literal {
            value: LiteralValue::Num(text.clone()),
        }),
        Some(Token::Str(text)) => Ok(TypeExpr::Literal {
            value: LiteralValue::Str(text.clone()),
        }),
        Some(Token::LParen) => {
            let inner = parse_type(stream)?;
            stream.expect(Token::RParen)?;
            Ok(inner)
        }
        Some(Token::LBrace) => parse_struct_body(stream),
        Some(Token::Ident(name)) => parse_named(stream, name),
        other => Err(ParseError::unexpected_token(other, "in type position", span)),
    }
}

/// An identifier in type position: either a contextual built-in form or a
/// reference, possibly with type arguments.
fn parse_named(stream: &mut TokenStream, name: &str) -> Result<TypeExpr, ParseError> {
    if name == "CHOOSE" {
        return Ok(TypeExpr::Special(SpecialKind::Choose));
    }
    if name == "LITERAL" && stream.check(&Token::Lt) {
        return parse_template(stream);
    }
    if let Some(primitive) = PrimitiveKind::from_keyword(name) {
        // `string<...>` falls through and fails resolution later.
        if !stream.check(&Token::Lt) {
            return Ok(TypeExpr::Primitive(primitive));
        }
    }
    let mut args = Vec::new();
    if stream.eat(&Token::Lt) {
        loop {
            args.push(parse_type(stream)?);
            if !stream.eat(&Token::Comma) {
                break;
            }
        }
        stream.expect(Token::Gt)?;
    }
    Ok(TypeExpr::Reference {
        name: name.to_string(),
        args,
    })
}

/// `LITERAL<"label", ["alias", ...], pinned>` with the leading `LITERAL`
/// already consumed.
fn parse_template(stream: &mut TokenStream) -> Result<TypeExpr, ParseError> {
    stream.expect(Token::Lt)?;
    let label = expect_string(stream, "as LITERAL label")?;
    stream.expect(Token::Comma)?;
    stream.expect(Token::LBracket)?;
    let mut aliases = Vec::new();
    if !stream.check(&Token::RBracket) {
        loop {
            aliases.push(expect_string(stream, "in LITERAL alias list")?);
            if !stream.eat(&Token::Comma) {
                break;
            }
        }
    }
    stream.expect(Token::RBracket)?;
    stream.expect(Token::Comma)?;
    let span = stream.current_span();
    let pinned = match stream.advance() {
        Some(Token::True) => true,
        Some(Token::False) => false,
        other => {
            return Err(ParseError::unexpected_token(
                other,
                "as LITERAL pin flag (expected `true` or `false`)",
                span,
            ))
        }
    };
    stream.expect(Token::Gt)?;
    Ok(TypeExpr::Template {
        label,
        aliases,
        pinned,
    })
}

/// Struct body with the `{` already consumed. Fields separate with `,` or
/// `;`, one trailing separator is allowed, and field names must be unique.
fn parse_struct_body(stream: &mut TokenStream) -> Result<TypeExpr, ParseError> {
    let mut fields: Vec<Field> = Vec::new();
    if stream.eat(&Token::RBrace) {
        return Ok(TypeExpr::Struct { fields });
    }
    loop {
        let name_span = stream.current_span();
        let name = expect_field_name(stream)?;
        if fields.iter().any(|f| f.name == name) {
            return Err(ParseError::invalid_syntax(
                format!("duplicate field `{}` in struct", name),
                name_span,
            ));
        }
        let optional = stream.eat(&Token::Question);
        stream.expect(Token::Colon)?;
        let ty = parse_type(stream)?;
        fields.push(Field { name, optional, ty });

        let separated = stream.eat(&Token::Comma) || stream.eat(&Token::Semi);
        if stream.eat(&Token::RBrace) {
            break;
        }
        if !separated {
            return Err(ParseError::unexpected_token(
                stream.peek(),
                "in struct body (expected `,`, `;`, or `}`)",
                stream.current_span(),
            ));
        }
    }
    Ok(TypeExpr::Struct { fields })
}

fn expect_string(stream: &mut TokenStream, context: &str) -> Result<String, ParseError> {
    let span = stream.current_span();
    match stream.advance() {
        Some(Token::Str(text)) => Ok(text.clone()),
        other => Err(ParseError::unexpected_token(other, context, span)),
    }
}

/// Field names admit keywords (`type`, `true`, ...) since TypeScript object
/// keys are unreserved; the menu schema really does use a `type:` field.
fn expect_field_name(stream: &mut TokenStream) -> Result<String, ParseError> {
    let span = stream.current_span();
    match stream.advance() {
        Some(Token::Ident(name)) => Ok(name.clone()),
        Some(Token::Type) => Ok("type".to_string()),
        Some(Token::Extends) => Ok("extends".to_string()),
        Some(Token::Never) => Ok("never".to_string()),
        Some(Token::Any) => Ok("any".to_string()),
        Some(Token::True) => Ok("true".to_string()),
        Some(Token::False) => Ok("false".to_string()),
        other => Err(ParseError::unexpected_token(other, "as field name", span)),
    }
}

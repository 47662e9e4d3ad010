//! Serialization back to dialect text.
//!
//! Output is minimal: no spaces around punctuation, one declaration per
//! line, hints re-emitted as a comment line above their declaration.
//! Strings always serialize double-quoted regardless of the source quote
//! style, numbers keep their source spelling, and templates collapse to
//! their quoted label. Rendering parsed output reproduces it exactly, so
//! serialization reaches a fixed point after one round trip.

use std::fmt::Write as _;

use crate::ast::{Declaration, LiteralValue, SpecialKind, TypeExpr};
use crate::prune::Pruned;

/// Render a pruned schema in the pruning engine's preorder.
pub(crate) fn render(pruned: &Pruned) -> String {
    render_declarations(pruned.iter())
}

/// Render declarations in iteration order, newline-separated.
///
/// [`Schema::render`](crate::Schema::render) and
/// [`Pruned::render`](crate::Pruned::render) are the usual entry points;
/// this is for callers working with [`parse`](crate::parse) output
/// directly.
pub fn render_declarations<'a>(
    declarations: impl Iterator<Item = &'a Declaration>,
) -> String {
    let mut out = String::new();
    for (i, decl) in declarations.enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_declaration(&mut out, decl);
    }
    out
}

fn write_declaration(out: &mut String, decl: &Declaration) {
    if let Some(hint) = &decl.hint {
        out.push_str("// ");
        out.push_str(hint);
        out.push('\n');
    }
    out.push_str("type ");
    out.push_str(&decl.name);
    if !decl.params.is_empty() {
        out.push('<');
        for (i, param) in decl.params.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&param.name);
            if let Some(constraint) = &param.constraint {
                out.push_str(" extends ");
                write_expr(out, constraint);
            }
        }
        out.push('>');
    }
    out.push('=');
    write_expr(out, &decl.body);
    out.push(';');
}

fn write_expr(out: &mut String, expr: &TypeExpr) {
    match expr {
        TypeExpr::Reference { name, args } => {
            out.push_str(name);
            if !args.is_empty() {
                out.push('<');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_expr(out, arg);
                }
                out.push('>');
            }
        }
        TypeExpr::Union { members } => {
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                write_expr(out, member);
            }
        }
        TypeExpr::Struct { fields } => {
            out.push('{');
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&field.name);
                if field.optional {
                    out.push('?');
                }
                out.push(':');
                write_expr(out, &field.ty);
            }
            out.push('}');
        }
        TypeExpr::Array { element } => {
            // `A|B[]` would bind the suffix to B alone.
            if matches!(element.as_ref(), TypeExpr::Union { .. }) {
                out.push('(');
                write_expr(out, element);
                out.push(')');
            } else {
                write_expr(out, element);
            }
            out.push_str("[]");
        }
        TypeExpr::Literal {
            value: LiteralValue::Str(text),
        } => write_string(out, text),
        TypeExpr::Literal {
            value: LiteralValue::Num(text),
        } => out.push_str(text),
        // Aliases and the pin flag are consumed at load; only the label is
        // part of the type.
        TypeExpr::Template { label, .. } => write_string(out, label),
        TypeExpr::Special(SpecialKind::Any) => out.push_str("any"),
        TypeExpr::Special(SpecialKind::Never) => out.push_str("never"),
        TypeExpr::Special(SpecialKind::Choose) => out.push_str("CHOOSE"),
        TypeExpr::Primitive(kind) => out.push_str(kind.keyword()),
    }
}

/// Double-quoted with the escapes the lexer decodes. Non-ASCII text is
/// written raw.
fn write_string(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

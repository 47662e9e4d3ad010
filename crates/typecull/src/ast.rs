//! Core data model for the type-declaration dialect.
//!
//! A schema is an ordered sequence of [`Declaration`]s whose bodies are
//! [`TypeExpr`] trees. Cross-references between declarations are by name
//! only, never by pointer, so recursive and mutually-recursive schemas are
//! representable without shared ownership; the name-keyed arena lives in
//! [`crate::graph::Graph`].
//!
//! Everything here derives `Eq` and `Hash` so expressions work as set and
//! map keys in the pruning engine's bookkeeping and in tests. Numeric
//! literals keep their source spelling for the same reason: text compares
//! and hashes cleanly where a float would not, and the serializer
//! reproduces the input exactly.

use crate::span::Span;

/// One named type definition: `type Name<P extends C> = body;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    /// Span of the declaration's name in the source, for load-error
    /// reporting.
    pub name_span: Span,
    pub params: Vec<TypeParam>,
    pub body: TypeExpr,
    /// Display comment attached from a preceding `Hint:` comment, re-emitted
    /// by the serializer.
    pub hint: Option<String>,
}

/// Generic parameter with an optional `extends` upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeParam {
    pub name: String,
    pub constraint: Option<TypeExpr>,
}

/// One struct member: `name?: T`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub optional: bool,
    pub ty: TypeExpr,
}

/// A type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// Use of a declared name or in-scope type parameter, possibly with
    /// arguments: `Name`, `Name<A, B>`.
    Reference { name: String, args: Vec<TypeExpr> },
    /// Alternation: `A | B | C`. Member order is display order.
    Union { members: Vec<TypeExpr> },
    /// Object type: `{ a: T, b?: U }`.
    Struct { fields: Vec<Field> },
    /// Array type: `T[]`.
    Array { element: Box<TypeExpr> },
    /// Literal type: `"Medium"`, `1`, `-4.5`.
    Literal { value: LiteralValue },
    /// Named literal with search aliases and a pin flag:
    /// `LITERAL<"Coca-Cola", ["coke"], true>`.
    Template {
        label: String,
        aliases: Vec<String>,
        pinned: bool,
    },
    /// `any` / `never` / `CHOOSE`.
    Special(SpecialKind),
    /// Built-in terminal types: `string`, `number`, `boolean`, `true`,
    /// `false`.
    Primitive(PrimitiveKind),
}

/// Literal payload. Numbers keep their source spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Str(String),
    Num(String),
}

/// Sentinel types with dedicated pruning behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    /// Matches anything; as a type argument it is the wildcard that disables
    /// filtering in the instantiated branch.
    Any,
    /// The empty type; produced by pruning when a branch is eliminated.
    Never,
    /// "Value intentionally unspecified"; never removed by pruning.
    Choose,
}

/// Built-in terminal types. They resolve without declarations and pass
/// through pruning unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    True,
    False,
}

impl PrimitiveKind {
    /// Keyword spelling, shared by the parser and serializer.
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::True => "true",
            PrimitiveKind::False => "false",
        }
    }

    /// Map a contextual keyword to its primitive, if it is one.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "string" => Some(PrimitiveKind::String),
            "number" => Some(PrimitiveKind::Number),
            "boolean" => Some(PrimitiveKind::Boolean),
            _ => None,
        }
    }
}

impl TypeExpr {
    /// Shorthand used throughout the pruning engine.
    pub fn is_never(&self) -> bool {
        matches!(self, TypeExpr::Special(SpecialKind::Never))
    }

    /// True for the `any` wildcard.
    pub fn is_any(&self) -> bool {
        matches!(self, TypeExpr::Special(SpecialKind::Any))
    }

    /// String literal constructor, mostly for tests.
    pub fn literal(text: impl Into<String>) -> Self {
        TypeExpr::Literal {
            value: LiteralValue::Str(text.into()),
        }
    }

    /// Bare reference constructor.
    pub fn reference(name: impl Into<String>) -> Self {
        TypeExpr::Reference {
            name: name.into(),
            args: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_structural_equality_as_map_key() {
        let a = TypeExpr::Union {
            members: vec![TypeExpr::literal("Small"), TypeExpr::literal("Large")],
        };
        let b = TypeExpr::Union {
            members: vec![TypeExpr::literal("Small"), TypeExpr::literal("Large")],
        };
        let mut memo: HashMap<TypeExpr, u32> = HashMap::new();
        memo.insert(a, 1);
        assert_eq!(memo.get(&b), Some(&1));
    }

    #[test]
    fn test_numeric_spelling_distinguishes() {
        let one = TypeExpr::Literal {
            value: LiteralValue::Num("1".into()),
        };
        let one_point_zero = TypeExpr::Literal {
            value: LiteralValue::Num("1.0".into()),
        };
        assert_ne!(one, one_point_zero);
    }

    #[test]
    fn test_special_helpers() {
        assert!(TypeExpr::Special(SpecialKind::Never).is_never());
        assert!(TypeExpr::Special(SpecialKind::Any).is_any());
        assert!(!TypeExpr::literal("never").is_never());
    }
}

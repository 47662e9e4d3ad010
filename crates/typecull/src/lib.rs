//! # typecull
//!
//! Query-driven pruning for TypeScript-style type schemas.
//!
//! A schema here is a list of `type` declarations describing every
//! expressible value in some catalog, with string literals for the
//! concrete choices. Realistic catalogs are far too large to hand to a
//! model whole, but any single request only touches a handful of
//! branches. This crate loads the schema once, indexes every string
//! literal, and per request prunes away each branch whose literals have
//! nothing in common with the request text.
//!
//! ## Architecture
//!
//! ```text
//! source text
//!     ↓ lexer    (logos tokens, comments surfaced for hints)
//!     ↓ parser   (recursive descent, fail-fast)
//! declarations
//!     ↓ graph    (name arena; duplicate/dangling/arity validation)
//!     ↓ index    (stemmed literal occurrences, postings per term)
//! schema
//!     ↓ prune    (liveness walk per query, cycle-safe)
//!     ↓ render   (minimal text, preorder from the root)
//! pruned text
//! ```
//!
//! Loading is the expensive half and happens once; [`Schema::prune`] takes
//! `&self` and can run per request.
//!
//! ## Usage
//!
//! ```rust
//! use typecull::{Query, Schema};
//!
//! let schema = Schema::load(
//!     "type Order={item:Taco|Burrito};\n\
//!      type Taco={name:\"Taco\"};\n\
//!      type Burrito={name:\"Burrito\"};",
//! )?;
//! let pruned = schema.prune(&Query::new("one taco please"))?;
//! assert_eq!(
//!     pruned.render(),
//!     "type Order={item:Taco};\ntype Taco={name:\"Taco\"};"
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod ast;
pub mod cart;
pub mod error;
pub mod graph;
pub mod index;
pub mod lexer;
pub mod parser;
pub mod prune;
pub mod render;
pub mod schema;
pub mod span;

pub use ast::{
    Declaration, Field, LiteralValue, PrimitiveKind, SpecialKind, TypeExpr, TypeParam,
};
pub use error::{LoadError, LoadResult, PruneError, PruneResult};
pub use graph::Graph;
pub use index::{InvertedIndex, LiveSet};
pub use parser::{parse, ParseError, ParseErrorKind};
pub use prune::Pruned;
pub use schema::{Query, Schema};
pub use span::{SourceText, Span};

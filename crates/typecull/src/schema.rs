//! Public entry points: load a schema once, prune it per query.
//!
//! [`Schema::load`] runs the full front half of the pipeline (parse,
//! graph validation, literal indexing) and the result is immutable, so one
//! loaded schema serves any number of concurrent [`Schema::prune`] calls.

use tracing::debug;

use crate::cart;
use crate::error::{LoadError, LoadResult, PruneError, PruneResult};
use crate::graph::Graph;
use crate::index::InvertedIndex;
use crate::parser;
use crate::prune::{self, Pruned};
use crate::render;
use crate::span::SourceText;

/// A loaded, validated, indexed schema.
#[derive(Debug, Clone)]
pub struct Schema {
    graph: Graph,
    index: InvertedIndex,
}

/// One pruning request: the user's words, the literal strings already in
/// their cart, and the declaration to start from.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Free-text user phrase. Matching is case-insensitive and stemmed, so
    /// "FRIES" and "fry" select the same literals.
    pub phrase: String,
    /// Structured cart state. Every string anywhere inside it counts as
    /// query text, keeping already-ordered items in the pruned schema.
    pub cart: Option<serde_json::Value>,
    /// Root declaration name; defaults to the schema's first declaration.
    pub root: Option<String>,
}

impl Query {
    pub fn new(phrase: impl Into<String>) -> Query {
        Query {
            phrase: phrase.into(),
            cart: None,
            root: None,
        }
    }

    pub fn with_cart(mut self, cart: serde_json::Value) -> Query {
        self.cart = Some(cart);
        self
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Query {
        self.root = Some(root.into());
        self
    }
}

impl Schema {
    /// Parse and validate `source`, then build the literal index.
    ///
    /// Fails on the first syntax error and on any duplicate declaration,
    /// dangling reference, or argument-count mismatch.
    pub fn load(source: &str) -> LoadResult<Schema> {
        let text = SourceText::new(source);
        let declarations =
            parser::parse(source).map_err(|err| LoadError::from_parse(err, &text))?;
        let graph = Graph::build(declarations)?;
        let index = InvertedIndex::build(&graph);
        debug!(
            declarations = graph.len(),
            terms = index.term_count(),
            "schema loaded"
        );
        Ok(Schema { graph, index })
    }

    /// Prune the schema down to the branches `query` makes live.
    pub fn prune(&self, query: &Query) -> PruneResult<Pruned> {
        let cart_literals = match &query.cart {
            Some(value) => cart::collect_strings(value),
            None => Vec::new(),
        };
        let live = self.index.match_query(&query.phrase, &cart_literals);
        let root = match &query.root {
            Some(root) => root.as_str(),
            None => match self.graph.iter().next() {
                Some(first) => first.name.as_str(),
                None => return Err(PruneError::EmptySchema),
            },
        };
        prune::prune(&self.graph, &self.index, &live, root)
    }

    /// Serialize the whole schema, unpruned, in source order.
    pub fn render(&self) -> String {
        render::render_declarations(self.graph.iter())
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MENU: &str = "type Order={item:Burger|Fries,note?:string};\ntype Burger={name:\"Wiseguy\"};\ntype Fries={name:\"French Fries\",size:Sizes};\ntype Sizes=\"Small\"|\"Large\"|CHOOSE;";

    #[test]
    fn test_load_and_render_full_schema() {
        let schema = Schema::load(MENU).expect("load failed");
        assert_eq!(schema.render(), MENU);
    }

    #[test]
    fn test_prune_defaults_to_first_declaration() {
        let schema = Schema::load(MENU).expect("load failed");
        let pruned = schema.prune(&Query::new("wiseguy")).expect("prune failed");
        assert_eq!(pruned.root(), "Order");
        assert_eq!(
            pruned.render(),
            "type Order={item:Burger,note?:string};\ntype Burger={name:\"Wiseguy\"};"
        );
    }

    #[test]
    fn test_explicit_root() {
        let schema = Schema::load(MENU).expect("load failed");
        let pruned = schema
            .prune(&Query::new("french fries large").with_root("Fries"))
            .expect("prune failed");
        assert_eq!(
            pruned.render(),
            "type Fries={name:\"French Fries\",size:Sizes};\ntype Sizes=\"Large\"|CHOOSE;"
        );
    }

    #[test]
    fn test_cart_strings_keep_items_live() {
        let schema = Schema::load(MENU).expect("load failed");
        let query = Query::new("").with_cart(json!({"items": [{"name": "Wiseguy"}]}));
        let pruned = schema.prune(&query).expect("prune failed");
        assert!(pruned.get("Burger").is_some());
        assert!(pruned.get("Fries").is_none());
    }

    #[test]
    fn test_unknown_root() {
        let schema = Schema::load(MENU).expect("load failed");
        let err = schema
            .prune(&Query::new("x").with_root("Nope"))
            .expect_err("should fail");
        assert_eq!(err, PruneError::UnknownRoot("Nope".to_string()));
    }

    #[test]
    fn test_empty_schema_cannot_be_pruned() {
        let schema = Schema::load("").expect("load failed");
        let err = schema.prune(&Query::default()).expect_err("should fail");
        assert_eq!(err, PruneError::EmptySchema);
        assert_eq!(err.to_string(), "cannot prune an empty schema");
    }

    #[test]
    fn test_syntax_error_carries_position() {
        let err = Schema::load("type A=;").expect_err("should fail");
        match err {
            LoadError::Syntax { line, column, .. } => {
                assert_eq!((line, column), (1, 8));
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_declaration_rejected() {
        let err = Schema::load("type A=1;\ntype A=2;").expect_err("should fail");
        assert!(matches!(err, LoadError::DuplicateDeclaration { name, .. } if name == "A"));
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let err = Schema::load("type A=Missing;").expect_err("should fail");
        assert!(matches!(err, LoadError::DanglingReference { name, .. } if name == "Missing"));
    }

    #[test]
    fn test_pinned_literal_survives_empty_query() {
        let source = "type Drinks=LITERAL<\"Coca-Cola\",[\"coke\"],true>|\"Sprite\";";
        let schema = Schema::load(source).expect("load failed");
        let pruned = schema.prune(&Query::default()).expect("prune failed");
        assert_eq!(pruned.render(), "type Drinks=\"Coca-Cola\";");
    }
}

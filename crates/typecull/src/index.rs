//! Literal inverted index and query matcher.
//!
//! Built once per schema by walking every declaration body, parameter
//! constraint, and reference argument list. Each string literal and each
//! `LITERAL` template contributes an occurrence; the postings map goes from
//! normalized term to the occurrences containing it. Normalization is
//! lowercasing plus Snowball English stemming per whitespace-delimited word,
//! applied identically to indexed text and query text, so "Fries" in the
//! schema matches "fry" in a phrase.
//!
//! Occurrence identity is (owning declaration, literal content): textually
//! identical literals in one declaration match exactly the same queries, so
//! they share one occurrence. Numeric literals are never indexed.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use rust_stemmers::{Algorithm, Stemmer};
use tracing::debug;

use crate::ast::{Declaration, LiteralValue, TypeExpr};
use crate::graph::Graph;

/// One indexed literal: the declaration that lexically contains it plus its
/// raw content (a literal's value or a template's label).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub declaration: usize,
    pub content: String,
    pub pinned: bool,
}

#[derive(Debug, Clone)]
pub struct InvertedIndex {
    occurrences: Vec<Occurrence>,
    /// Normalized term to occurrence ids, in first-indexed order.
    postings: IndexMap<String, Vec<usize>>,
    /// (declaration, content) to occurrence id, for filter-time lookups.
    keys: HashMap<(usize, String), usize>,
    pinned: Vec<usize>,
}

/// The occurrences a query made live. Pinned occurrences are always members,
/// whatever the query said.
#[derive(Debug, Clone, Default)]
pub struct LiveSet {
    ids: HashSet<usize>,
}

impl LiveSet {
    pub fn contains(&self, id: usize) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl InvertedIndex {
    pub fn build(graph: &Graph) -> InvertedIndex {
        let stemmer = english_stemmer();
        let mut index = InvertedIndex {
            occurrences: Vec::new(),
            postings: IndexMap::new(),
            keys: HashMap::new(),
            pinned: Vec::new(),
        };
        for (decl_index, decl) in graph.iter().enumerate() {
            index.visit_declaration(decl_index, decl, &stemmer);
        }
        debug!(
            terms = index.postings.len(),
            occurrences = index.occurrences.len(),
            "literal index built"
        );
        index
    }

    /// The occurrence id for a literal with `content` sitting in declaration
    /// `declaration`, if one was indexed.
    pub fn occurrence(&self, declaration: usize, content: &str) -> Option<usize> {
        self.keys
            .get(&(declaration, content.to_string()))
            .copied()
    }

    pub fn is_pinned(&self, id: usize) -> bool {
        self.occurrences
            .get(id)
            .map(|occ| occ.pinned)
            .unwrap_or(false)
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn occurrence_count(&self) -> usize {
        self.occurrences.len()
    }

    /// Match a free-text phrase and the cart's literal values against the
    /// index. An occurrence is live when any of its terms equals any
    /// normalized query term; pinned occurrences are live unconditionally.
    pub fn match_query(&self, phrase: &str, cart_literals: &[String]) -> LiveSet {
        let stemmer = english_stemmer();
        let mut terms: HashSet<String> = HashSet::new();
        normalize_into(phrase, &stemmer, &mut terms);
        for literal in cart_literals {
            normalize_into(literal, &stemmer, &mut terms);
        }

        let mut live = LiveSet::default();
        for term in &terms {
            if let Some(ids) = self.postings.get(term) {
                live.ids.extend(ids.iter().copied());
            }
        }
        live.ids.extend(self.pinned.iter().copied());
        debug!(
            query_terms = terms.len(),
            live = live.ids.len(),
            "query matched"
        );
        live
    }

    fn visit_declaration(&mut self, decl_index: usize, decl: &Declaration, stemmer: &Stemmer) {
        for param in &decl.params {
            if let Some(constraint) = &param.constraint {
                self.visit_expr(decl_index, constraint, stemmer);
            }
        }
        self.visit_expr(decl_index, &decl.body, stemmer);
    }

    fn visit_expr(&mut self, decl_index: usize, expr: &TypeExpr, stemmer: &Stemmer) {
        match expr {
            TypeExpr::Literal {
                value: LiteralValue::Str(text),
            } => {
                let id = self.intern(decl_index, text, false);
                self.post_terms(text, id, stemmer);
            }
            TypeExpr::Literal {
                value: LiteralValue::Num(_),
            } => {}
            TypeExpr::Template {
                label,
                aliases,
                pinned,
            } => {
                let id = self.intern(decl_index, label, *pinned);
                self.post_terms(label, id, stemmer);
                for alias in aliases {
                    self.post_terms(alias, id, stemmer);
                }
            }
            TypeExpr::Union { members } => {
                for member in members {
                    self.visit_expr(decl_index, member, stemmer);
                }
            }
            TypeExpr::Struct { fields } => {
                for field in fields {
                    self.visit_expr(decl_index, &field.ty, stemmer);
                }
            }
            TypeExpr::Array { element } => self.visit_expr(decl_index, element, stemmer),
            TypeExpr::Reference { args, .. } => {
                for arg in args {
                    self.visit_expr(decl_index, arg, stemmer);
                }
            }
            TypeExpr::Special(_) | TypeExpr::Primitive(_) => {}
        }
    }

    /// Occurrence for (declaration, content), creating it on first sight.
    /// A later pinned sighting upgrades an unpinned one.
    fn intern(&mut self, decl_index: usize, content: &str, pinned: bool) -> usize {
        if let Some(&id) = self.keys.get(&(decl_index, content.to_string())) {
            if pinned && !self.occurrences[id].pinned {
                self.occurrences[id].pinned = true;
                self.pinned.push(id);
            }
            return id;
        }
        let id = self.occurrences.len();
        self.occurrences.push(Occurrence {
            declaration: decl_index,
            content: content.to_string(),
            pinned,
        });
        self.keys.insert((decl_index, content.to_string()), id);
        if pinned {
            self.pinned.push(id);
        }
        id
    }

    fn post_terms(&mut self, text: &str, id: usize, stemmer: &Stemmer) {
        let mut terms = HashSet::new();
        normalize_into(text, stemmer, &mut terms);
        for term in terms {
            let ids = self.postings.entry(term).or_default();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
}

fn english_stemmer() -> Stemmer {
    Stemmer::create(Algorithm::English)
}

/// Lowercase `text`, stem each whitespace-delimited word, and collect the
/// stems into `out`.
fn normalize_into(text: &str, stemmer: &Stemmer, out: &mut HashSet<String>) {
    for word in text.to_lowercase().split_whitespace() {
        out.insert(stemmer.stem(word).into_owned());
    }
}

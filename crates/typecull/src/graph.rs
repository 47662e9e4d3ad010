//! Declaration graph.
//!
//! Declarations are keyed by name in source order. Building the graph
//! validates every reference up front: duplicate declarations, references
//! to names that do not exist, and argument-count mismatches are load
//! errors. Reference cycles are legal; recursive schemas prune fine because
//! the engine memoizes in-progress instantiations.

use indexmap::IndexMap;
use tracing::debug;

use crate::ast::{Declaration, TypeExpr};
use crate::error::{LoadError, LoadResult};

#[derive(Debug, Clone)]
pub struct Graph {
    declarations: IndexMap<String, Declaration>,
}

impl Graph {
    pub fn build(declarations: Vec<Declaration>) -> LoadResult<Graph> {
        let mut map = IndexMap::with_capacity(declarations.len());
        for decl in declarations {
            if map.contains_key(&decl.name) {
                return Err(LoadError::DuplicateDeclaration {
                    name: decl.name,
                    span: decl.name_span,
                });
            }
            map.insert(decl.name.clone(), decl);
        }
        let graph = Graph { declarations: map };
        graph.validate_references()?;
        debug!(declarations = graph.len(), "declaration graph built");
        Ok(graph)
    }

    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(name)
    }

    pub fn get_index(&self, index: usize) -> Option<&Declaration> {
        self.declarations.get_index(index).map(|(_, decl)| decl)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.declarations.get_index_of(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.values()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Check every reference in every declaration body and parameter
    /// constraint. Type parameters shadow top-level names inside their own
    /// declaration and take no arguments.
    fn validate_references(&self) -> LoadResult<()> {
        for decl in self.declarations.values() {
            let params: Vec<&str> = decl.params.iter().map(|p| p.name.as_str()).collect();
            for param in &decl.params {
                if let Some(constraint) = &param.constraint {
                    self.check_expr(constraint, &params, &decl.name)?;
                }
            }
            self.check_expr(&decl.body, &params, &decl.name)?;
        }
        Ok(())
    }

    fn check_expr(&self, expr: &TypeExpr, params: &[&str], owner: &str) -> LoadResult<()> {
        match expr {
            TypeExpr::Reference { name, args } => {
                if params.contains(&name.as_str()) {
                    if !args.is_empty() {
                        return Err(LoadError::ArityMismatch {
                            name: name.clone(),
                            owner: owner.to_string(),
                            expected: 0,
                            found: args.len(),
                        });
                    }
                    return Ok(());
                }
                let target = self.declarations.get(name).ok_or_else(|| {
                    LoadError::DanglingReference {
                        name: name.clone(),
                        owner: owner.to_string(),
                    }
                })?;
                if target.params.len() != args.len() {
                    return Err(LoadError::ArityMismatch {
                        name: name.clone(),
                        owner: owner.to_string(),
                        expected: target.params.len(),
                        found: args.len(),
                    });
                }
                for arg in args {
                    self.check_expr(arg, params, owner)?;
                }
                Ok(())
            }
            TypeExpr::Union { members } => {
                for member in members {
                    self.check_expr(member, params, owner)?;
                }
                Ok(())
            }
            TypeExpr::Struct { fields } => {
                for field in fields {
                    self.check_expr(&field.ty, params, owner)?;
                }
                Ok(())
            }
            TypeExpr::Array { element } => self.check_expr(element, params, owner),
            TypeExpr::Literal { .. }
            | TypeExpr::Template { .. }
            | TypeExpr::Special(_)
            | TypeExpr::Primitive(_) => Ok(()),
        }
    }
}

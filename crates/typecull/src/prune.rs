//! Query-driven pruning.
//!
//! The engine walks the graph from a root declaration, keeping only the
//! branches a query made live. Literals and templates survive when pinned,
//! live, or inside a declaration kept whole; `CHOOSE`, primitives, and
//! numeric literals always survive; unions drop dead members and collapse
//! to a lone survivor; a dead required field kills its struct.
//!
//! Declarations stay in their generic form: parameter lists keep their
//! constraints and parameter references pass through unfiltered. A
//! reference site survives when the target declaration stays inhabited,
//! and its arguments are kept exactly as written. An argument is a value
//! being bound, not a branch to narrow, so a declaration mentioned by an
//! argument is processed with filtering disabled; it behaves as if its
//! literals were part of the query.
//!
//! Cycles are broken by treating an in-progress declaration as viable; a
//! repair pass afterwards re-collapses any body whose target turned out to
//! be eliminated. A final compression pass inlines chains of bare
//! references, and a reachability sweep orders the surviving declarations
//! in first-discovery preorder for the serializer.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use crate::ast::{Declaration, Field, LiteralValue, SpecialKind, TypeExpr, TypeParam};
use crate::error::{PruneError, PruneResult};
use crate::graph::Graph;
use crate::index::{InvertedIndex, LiveSet};

/// The result of a prune: the surviving declarations in first-discovery
/// preorder from the root, ready to serialize.
#[derive(Debug, Clone)]
pub struct Pruned {
    pub(crate) declarations: IndexMap<String, Declaration>,
    pub(crate) root: String,
}

impl Pruned {
    pub fn render(&self) -> String {
        crate::render::render(self)
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.values()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }
}

pub fn prune(
    graph: &Graph,
    index: &InvertedIndex,
    live: &LiveSet,
    root: &str,
) -> PruneResult<Pruned> {
    if graph.get(root).is_none() {
        return Err(PruneError::UnknownRoot(root.to_string()));
    }
    let mut engine = Engine {
        graph,
        index,
        live,
        memo: HashMap::new(),
        in_progress: HashSet::new(),
        output: IndexMap::new(),
        kept_whole: HashSet::new(),
    };
    if engine.process(root, false) == Fate::Eliminated {
        return Err(PruneError::RootEliminated(root.to_string()));
    }
    if !engine.repair(root) {
        return Err(PruneError::RootEliminated(root.to_string()));
    }
    engine.compress();
    let declarations = reachable_in_preorder(&engine.output, root);
    debug!(kept = declarations.len(), root, "schema pruned");
    Ok(Pruned {
        declarations,
        root: root.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fate {
    Viable,
    Eliminated,
}

/// Filtering context for one declaration body: which declaration the
/// literals belong to, whether every literal is treated as live, and the
/// type parameters that shadow top-level names.
struct Ctx<'a> {
    decl_index: usize,
    keep_all: bool,
    locals: &'a [TypeParam],
}

impl Ctx<'_> {
    fn is_local(&self, name: &str) -> bool {
        self.locals.iter().any(|p| p.name == name)
    }
}

struct Engine<'a> {
    graph: &'a Graph,
    index: &'a InvertedIndex,
    live: &'a LiveSet,
    memo: HashMap<(String, bool), Fate>,
    in_progress: HashSet<(String, bool)>,
    output: IndexMap<String, Declaration>,
    /// Names whose output body was produced with filtering disabled. That
    /// body is a superset, so it wins when a name is kept both ways.
    kept_whole: HashSet<String>,
}

impl<'a> Engine<'a> {
    /// Filter one declaration, recording the surviving form. `keep_all`
    /// disables literal filtering for this declaration and everything it
    /// references. Returns whether the declaration stays inhabited.
    fn process(&mut self, name: &str, keep_all: bool) -> Fate {
        let key = (name.to_string(), keep_all);
        if let Some(&fate) = self.memo.get(&key) {
            return fate;
        }
        if self.in_progress.contains(&key) {
            // Cycle: assume viable and let the repair pass settle it if the
            // declaration is eliminated after all.
            return Fate::Viable;
        }
        let graph = self.graph;
        let found = graph
            .index_of(name)
            .and_then(|i| graph.get_index(i).map(|decl| (i, decl)));
        let (decl_index, decl) = match found {
            Some(found) => found,
            None => {
                // Load validation resolves every reference, so this only
                // happens for a name the graph never contained.
                self.memo.insert(key, Fate::Eliminated);
                return Fate::Eliminated;
            }
        };
        self.in_progress.insert(key.clone());

        let ctx = Ctx {
            decl_index,
            keep_all,
            locals: &decl.params,
        };
        let mut params = Vec::with_capacity(decl.params.len());
        let mut dead_constraint = false;
        for param in &decl.params {
            let constraint = param
                .constraint
                .as_ref()
                .map(|c| self.filter_expr(c, &ctx));
            if matches!(&constraint, Some(c) if c.is_never()) {
                dead_constraint = true;
            }
            params.push(TypeParam {
                name: param.name.clone(),
                constraint,
            });
        }
        let body = if dead_constraint {
            never()
        } else {
            self.filter_expr(&decl.body, &ctx)
        };

        let fate = if body.is_never() {
            Fate::Eliminated
        } else {
            Fate::Viable
        };
        self.in_progress.remove(&key);
        self.memo.insert(key, fate);
        if fate == Fate::Viable {
            let filtered = Declaration {
                name: decl.name.clone(),
                name_span: decl.name_span,
                params,
                body,
                hint: decl.hint.clone(),
            };
            self.record(name, filtered, keep_all);
        }
        fate
    }

    fn record(&mut self, name: &str, decl: Declaration, keep_all: bool) {
        if keep_all {
            self.kept_whole.insert(name.to_string());
            self.output.insert(name.to_string(), decl);
        } else if !self.kept_whole.contains(name) {
            self.output.insert(name.to_string(), decl);
        }
    }

    fn filter_expr(&mut self, expr: &TypeExpr, ctx: &Ctx) -> TypeExpr {
        match expr {
            TypeExpr::Literal {
                value: LiteralValue::Str(text),
            } => {
                if ctx.keep_all || self.is_live(ctx.decl_index, text) {
                    expr.clone()
                } else {
                    never()
                }
            }
            // Numbers are never indexed, so no query can kill them.
            TypeExpr::Literal {
                value: LiteralValue::Num(_),
            } => expr.clone(),
            TypeExpr::Template { label, .. } => {
                if ctx.keep_all || self.is_live(ctx.decl_index, label) {
                    expr.clone()
                } else {
                    never()
                }
            }
            TypeExpr::Special(_) | TypeExpr::Primitive(_) => expr.clone(),
            TypeExpr::Union { members } => {
                let mut kept = Vec::new();
                for member in members {
                    let filtered = self.filter_expr(member, ctx);
                    if !filtered.is_never() {
                        kept.push(filtered);
                    }
                }
                match kept.len() {
                    0 => never(),
                    1 => kept.remove(0),
                    _ => TypeExpr::Union { members: kept },
                }
            }
            TypeExpr::Struct { fields } => {
                let mut kept = Vec::new();
                let mut dead_required = false;
                for field in fields {
                    let ty = self.filter_expr(&field.ty, ctx);
                    if ty.is_never() {
                        if !field.optional {
                            dead_required = true;
                        }
                    } else {
                        kept.push(Field {
                            name: field.name.clone(),
                            optional: field.optional,
                            ty,
                        });
                    }
                }
                if dead_required {
                    never()
                } else {
                    TypeExpr::Struct { fields: kept }
                }
            }
            TypeExpr::Array { element } => {
                let filtered = self.filter_expr(element, ctx);
                if filtered.is_never() {
                    never()
                } else {
                    TypeExpr::Array {
                        element: Box::new(filtered),
                    }
                }
            }
            TypeExpr::Reference { name, args } => {
                if ctx.is_local(name) {
                    return expr.clone();
                }
                match self.process(name, ctx.keep_all) {
                    Fate::Eliminated => never(),
                    Fate::Viable => {
                        for arg in args {
                            self.keep_argument(arg, ctx);
                        }
                        expr.clone()
                    }
                }
            }
        }
    }

    fn is_live(&self, decl_index: usize, content: &str) -> bool {
        self.index
            .occurrence(decl_index, content)
            .map_or(false, |id| self.live.contains(id) || self.index.is_pinned(id))
    }

    /// Arguments of a surviving reference stay as written. A declaration an
    /// argument mentions is a value the caller bound, so it must remain
    /// inhabited in the output; process it with filtering disabled.
    fn keep_argument(&mut self, arg: &TypeExpr, ctx: &Ctx) {
        match arg {
            TypeExpr::Reference { name, args } => {
                if !ctx.is_local(name) {
                    self.process(name, true);
                }
                for arg in args {
                    self.keep_argument(arg, ctx);
                }
            }
            TypeExpr::Union { members } => {
                for member in members {
                    self.keep_argument(member, ctx);
                }
            }
            TypeExpr::Struct { fields } => {
                for field in fields {
                    self.keep_argument(&field.ty, ctx);
                }
            }
            TypeExpr::Array { element } => self.keep_argument(element, ctx),
            TypeExpr::Literal { .. }
            | TypeExpr::Template { .. }
            | TypeExpr::Special(_)
            | TypeExpr::Primitive(_) => {}
        }
    }

    /// References accepted while their target was still on the processing
    /// stack may point at declarations that were eliminated afterwards.
    /// Re-collapse bodies until every surviving reference resolves,
    /// removing declarations that collapse to `never`. Returns false when
    /// the root itself falls.
    fn repair(&mut self, root: &str) -> bool {
        loop {
            let rewrites: Vec<(String, Vec<TypeParam>, TypeExpr)> = self
                .output
                .iter()
                .map(|(name, decl)| {
                    let params = decl
                        .params
                        .iter()
                        .map(|p| TypeParam {
                            name: p.name.clone(),
                            constraint: p
                                .constraint
                                .as_ref()
                                .map(|c| self.resolve_missing(c, &decl.params)),
                        })
                        .collect::<Vec<_>>();
                    let body = self.resolve_missing(&decl.body, &decl.params);
                    (name.clone(), params, body)
                })
                .collect();

            let mut removed = false;
            for (name, params, body) in rewrites {
                let dead = body.is_never()
                    || params
                        .iter()
                        .any(|p| matches!(&p.constraint, Some(c) if c.is_never()));
                if dead {
                    self.output.shift_remove(&name);
                    removed = true;
                } else if let Some(decl) = self.output.get_mut(&name) {
                    decl.params = params;
                    decl.body = body;
                }
            }
            if !removed {
                break;
            }
        }
        self.output.contains_key(root)
    }

    /// Rewrite `expr` turning references to eliminated declarations into
    /// `never`, then re-apply the structural collapse rules.
    fn resolve_missing(&self, expr: &TypeExpr, locals: &[TypeParam]) -> TypeExpr {
        match expr {
            TypeExpr::Reference { name, args } => {
                if locals.iter().any(|p| p.name == *name) {
                    return expr.clone();
                }
                if !self.output.contains_key(name)
                    || args.iter().any(|arg| self.argument_dangles(arg, locals))
                {
                    return never();
                }
                expr.clone()
            }
            TypeExpr::Union { members } => {
                let mut kept = Vec::new();
                for member in members {
                    let resolved = self.resolve_missing(member, locals);
                    if !resolved.is_never() {
                        kept.push(resolved);
                    }
                }
                match kept.len() {
                    0 => never(),
                    1 => kept.remove(0),
                    _ => TypeExpr::Union { members: kept },
                }
            }
            TypeExpr::Struct { fields } => {
                let mut kept = Vec::new();
                for field in fields {
                    let ty = self.resolve_missing(&field.ty, locals);
                    if ty.is_never() {
                        if !field.optional {
                            return never();
                        }
                    } else {
                        kept.push(Field {
                            name: field.name.clone(),
                            optional: field.optional,
                            ty,
                        });
                    }
                }
                TypeExpr::Struct { fields: kept }
            }
            TypeExpr::Array { element } => {
                let resolved = self.resolve_missing(element, locals);
                if resolved.is_never() {
                    never()
                } else {
                    TypeExpr::Array {
                        element: Box::new(resolved),
                    }
                }
            }
            _ => expr.clone(),
        }
    }

    /// Whether an argument kept as written mentions a declaration that is
    /// no longer in the output.
    fn argument_dangles(&self, arg: &TypeExpr, locals: &[TypeParam]) -> bool {
        match arg {
            TypeExpr::Reference { name, args } => {
                (!locals.iter().any(|p| p.name == *name) && !self.output.contains_key(name))
                    || args.iter().any(|a| self.argument_dangles(a, locals))
            }
            TypeExpr::Union { members } => {
                members.iter().any(|m| self.argument_dangles(m, locals))
            }
            TypeExpr::Struct { fields } => fields
                .iter()
                .any(|f| self.argument_dangles(&f.ty, locals)),
            TypeExpr::Array { element } => self.argument_dangles(element, locals),
            _ => false,
        }
    }

    /// Inline chains of bare references: a parameterless declaration whose
    /// body is just another parameterless declaration's name takes the
    /// concrete body at the end of the chain. The stranded links then drop
    /// out at the reachability sweep. A chain that revisits a name is a
    /// pure reference cycle and is left alone.
    fn compress(&mut self) {
        let names: Vec<String> = self.output.keys().cloned().collect();
        for name in names {
            let mut visited = HashSet::new();
            visited.insert(name.clone());
            let mut cursor = name.clone();
            let resolved = loop {
                let target = match self.output.get(&cursor) {
                    Some(decl) if decl.params.is_empty() => match &decl.body {
                        TypeExpr::Reference { name: target, args } if args.is_empty() => {
                            target.clone()
                        }
                        body if cursor != name => break Some(body.clone()),
                        _ => break None,
                    },
                    _ => break None,
                };
                if !visited.insert(target.clone()) {
                    break None;
                }
                cursor = target;
            };
            if let Some(body) = resolved {
                if let Some(decl) = self.output.get_mut(&name) {
                    decl.body = body;
                }
            }
        }
    }
}

fn never() -> TypeExpr {
    TypeExpr::Special(SpecialKind::Never)
}

/// Collect the declarations reachable from `root` in first-discovery
/// preorder: a reference visits its target declaration before its
/// arguments, and constraints are walked before the body.
fn reachable_in_preorder(
    output: &IndexMap<String, Declaration>,
    root: &str,
) -> IndexMap<String, Declaration> {
    let mut ordered = IndexMap::new();
    visit_declaration(output, root, &mut ordered);
    ordered
}

fn visit_declaration(
    output: &IndexMap<String, Declaration>,
    name: &str,
    ordered: &mut IndexMap<String, Declaration>,
) {
    if ordered.contains_key(name) {
        return;
    }
    let decl = match output.get(name) {
        Some(decl) => decl,
        None => return,
    };
    ordered.insert(name.to_string(), decl.clone());
    for param in &decl.params {
        if let Some(constraint) = &param.constraint {
            visit_expr(output, constraint, &decl.params, ordered);
        }
    }
    visit_expr(output, &decl.body, &decl.params, ordered);
}

fn visit_expr(
    output: &IndexMap<String, Declaration>,
    expr: &TypeExpr,
    locals: &[TypeParam],
    ordered: &mut IndexMap<String, Declaration>,
) {
    match expr {
        TypeExpr::Reference { name, args } => {
            if !locals.iter().any(|p| p.name == *name) {
                visit_declaration(output, name, ordered);
            }
            for arg in args {
                visit_expr(output, arg, locals, ordered);
            }
        }
        TypeExpr::Union { members } => {
            for member in members {
                visit_expr(output, member, locals, ordered);
            }
        }
        TypeExpr::Struct { fields } => {
            for field in fields {
                visit_expr(output, &field.ty, locals, ordered);
            }
        }
        TypeExpr::Array { element } => visit_expr(output, element, locals, ordered),
        TypeExpr::Literal { .. }
        | TypeExpr::Template { .. }
        | TypeExpr::Special(_)
        | TypeExpr::Primitive(_) => {}
    }
}

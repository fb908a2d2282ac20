//! Join dependency graph.
//!
//! Every association path used by a query is resolved here, once. The graph
//! is rooted at the queried relation; each node is a table instance with its
//! final alias and each edge one association hop with its join kind and
//! natural join predicate. A fresh graph is built for every compile.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, trace};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::Direction;

use super::alias::{AliasTracker, TableAlias};
use crate::config::Settings;
use crate::dsl::{AssociationPath, JoinKind, PathKey, Segment};
use crate::error::{DslError, DslResult};
use crate::schema::{AssociationDef, AssociationKind, AssociationTarget, RelationDef, Schema};
use crate::sql::{lit_str, table_col, Expr, ExprExt, Join, TableRef};

/// One association hop in the join graph.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinEdge {
    pub association: String,
    pub kind: JoinKind,
    /// Whether the kind was requested rather than defaulted.
    pub explicit: bool,
    pub on: Expr,
}

/// Graph location of a resolved path. Through associations add two edges.
#[derive(Debug, Clone)]
struct Hop {
    node: NodeIndex,
    edges: Vec<EdgeIndex>,
}

/// Resolves association paths to joined, aliased tables.
#[derive(Debug, Clone)]
pub struct JoinDependency {
    schema: Arc<Schema>,
    settings: Settings,
    graph: DiGraph<TableAlias, JoinEdge>,
    root: NodeIndex,
    hops: HashMap<PathKey, Hop>,
    aliases: AliasTracker,
}

impl JoinDependency {
    /// An empty graph rooted at `root`.
    pub fn new(schema: Arc<Schema>, root: &str, settings: &Settings) -> Self {
        let mut aliases = AliasTracker::new(&settings.aliases.separator);
        let mut graph = DiGraph::new();
        let root = graph.add_node(aliases.assign(root, root));

        Self {
            schema,
            settings: settings.clone(),
            graph,
            root,
            hops: HashMap::new(),
            aliases,
        }
    }

    pub fn root(&self) -> &TableAlias {
        &self.graph[self.root]
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Number of joined tables, root excluded.
    pub fn len(&self) -> usize {
        self.graph.node_count() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep generated aliases clear of a name chosen by the caller.
    pub fn reserve_alias(&mut self, name: &str) {
        self.aliases.reserve(name);
    }

    /// Alias of the table at the end of `path`.
    ///
    /// Unresolved paths are joined on demand unless implicit joins are
    /// disabled, in which case they fail.
    pub fn find_alias(&mut self, path: &AssociationPath) -> DslResult<TableAlias> {
        if self.settings.joins.implicit {
            return self.ensure(path);
        }
        self.lookup(path)
            .cloned()
            .ok_or_else(|| DslError::alias_resolution(path, "association is not joined"))
    }

    /// Alias of an already resolved path.
    pub fn lookup(&self, path: &AssociationPath) -> Option<&TableAlias> {
        if path.is_empty() {
            return Some(self.root());
        }
        self.hops.get(&path.key()).map(|hop| &self.graph[hop.node])
    }

    /// Resolve `path`, joining every hop that isn't joined yet.
    pub fn ensure(&mut self, path: &AssociationPath) -> DslResult<TableAlias> {
        let max_depth = self.settings.joins.max_depth;
        if path.len() > max_depth {
            return Err(DslError::alias_resolution(
                path,
                format!("path is deeper than {} joins", max_depth),
            ));
        }

        let mut current = self.root;
        for (depth, segment) in path.segments().iter().enumerate() {
            let prefix = path.prefix(depth + 1);
            let key = prefix.key();

            if let Some(hop) = self.hops.get(&key).cloned() {
                trace!("join path '{}' already resolved", prefix);
                if let Some(kind) = segment.join {
                    self.upgrade(&hop.edges, kind);
                }
                current = hop.node;
                continue;
            }

            let hop = self.add_hop(current, segment, &prefix)?;
            current = hop.node;
            self.hops.insert(key, hop);
        }

        Ok(self.graph[current].clone())
    }

    /// Record an explicit `on` join as the table of `path`.
    ///
    /// The join is emitted with the graph's own joins, and later references
    /// to `path` resolve to its table instead of joining the association
    /// again.
    pub fn bind_explicit(&mut self, path: &AssociationPath, join: Join) -> DslResult<()> {
        let max_depth = self.settings.joins.max_depth;
        if path.len() > max_depth {
            return Err(DslError::alias_resolution(
                path,
                format!("path is deeper than {} joins", max_depth),
            ));
        }
        let key = path.key();
        if self.hops.contains_key(&key) {
            return Err(DslError::InvalidJoinSpecification(format!(
                "'{}' is already joined",
                path
            )));
        }
        let segment = path
            .last()
            .ok_or_else(|| DslError::Internal("explicit join bound to the root".into()))?;
        let on = join.on.ok_or_else(|| {
            DslError::Internal(format!("explicit join on '{}' has no predicate", path))
        })?;

        let parent = path.prefix(path.len() - 1);
        let owner = if parent.is_empty() {
            self.root
        } else {
            self.ensure(&parent)?;
            self.hops.get(&parent.key()).map(|hop| hop.node).ok_or_else(|| {
                DslError::Internal(format!("'{}' resolved to no table", parent))
            })?
        };

        let table = match &join.table.alias {
            Some(alias) => TableAlias::aliased(&join.table.table, alias),
            None => TableAlias::unaliased(&join.table.table),
        };
        self.aliases.reserve(table.name());
        debug!(
            "joining '{}' as '{}' on an explicit predicate",
            table.relation,
            table.name()
        );

        let node = self.graph.add_node(table);
        let edge = self.graph.add_edge(
            owner,
            node,
            JoinEdge {
                association: segment.name.clone(),
                kind: join.join_type.into(),
                explicit: true,
                on,
            },
        );
        self.hops.insert(
            key,
            Hop {
                node,
                edges: vec![edge],
            },
        );
        Ok(())
    }

    /// Join clauses for every resolved hop, parents before children.
    pub fn joins(&self) -> Vec<Join> {
        self.graph
            .node_indices()
            .filter(|&idx| idx != self.root)
            .filter_map(|idx| {
                let parent = self
                    .graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()?;
                let edge = &self.graph[self.graph.find_edge(parent, idx)?];
                let table = &self.graph[idx];

                let mut table_ref = TableRef::new(&table.relation);
                if let Some(alias) = &table.alias {
                    table_ref = table_ref.with_alias(alias);
                }

                Some(Join {
                    join_type: edge.kind.into(),
                    table: table_ref,
                    on: Some(edge.on.clone()),
                })
            })
            .collect()
    }

    fn upgrade(&mut self, edges: &[EdgeIndex], kind: JoinKind) {
        for &edge in edges {
            let weight = &mut self.graph[edge];
            if !weight.explicit {
                debug!("join '{}' becomes {:?}", weight.association, kind);
                weight.kind = kind;
                weight.explicit = true;
            }
        }
    }

    fn add_hop(
        &mut self,
        owner: NodeIndex,
        segment: &Segment,
        prefix: &AssociationPath,
    ) -> DslResult<Hop> {
        let schema = Arc::clone(&self.schema);
        let owner_def = schema.require(&self.graph[owner].relation)?;
        let association = owner_def.require_association(&segment.name)?;

        match &association.target {
            AssociationTarget::Relation(name) => {
                let target = schema.require(name)?;
                let candidate = self
                    .aliases
                    .association_candidate(&association.name, &owner_def.name);
                let (node, edge) =
                    self.link(owner, owner_def, association, target, &candidate, segment);
                Ok(Hop {
                    node,
                    edges: vec![edge],
                })
            }
            AssociationTarget::Polymorphic { .. } => {
                let model = segment.polymorphic.as_deref().ok_or_else(|| {
                    DslError::alias_resolution(prefix, "polymorphic association requires of()")
                })?;
                let target = schema
                    .relation_for_model(model)
                    .ok_or_else(|| DslError::UnknownRelation(model.to_string()))?;
                let candidate = self
                    .aliases
                    .association_candidate(&association.name, &owner_def.name);
                let (node, edge) =
                    self.link(owner, owner_def, association, target, &candidate, segment);
                Ok(Hop {
                    node,
                    edges: vec![edge],
                })
            }
            AssociationTarget::Through { through, source } => {
                let through_def = owner_def.require_association(through)?;
                let intermediate = fixed_target(&schema, through_def, prefix)?;
                let source_def = intermediate.require_association(source)?;
                let target = fixed_target(&schema, source_def, prefix)?;

                let candidate = self
                    .aliases
                    .through_candidate(&intermediate.name, &owner_def.name);
                let (middle, first) =
                    self.link(owner, owner_def, through_def, intermediate, &candidate, segment);

                let candidate = self
                    .aliases
                    .association_candidate(&association.name, &owner_def.name);
                let (node, second) =
                    self.link(middle, intermediate, source_def, target, &candidate, segment);

                Ok(Hop {
                    node,
                    edges: vec![first, second],
                })
            }
        }
    }

    fn link(
        &mut self,
        owner: NodeIndex,
        owner_def: &RelationDef,
        association: &AssociationDef,
        target: &RelationDef,
        candidate: &str,
        segment: &Segment,
    ) -> (NodeIndex, EdgeIndex) {
        let owner_name = self.graph[owner].name().to_string();
        let alias = self.aliases.assign(&target.name, candidate);
        let on = natural_predicate(
            owner_def,
            &owner_name,
            association,
            target,
            alias.name(),
            segment.polymorphic.as_deref(),
        );
        debug!(
            "joining '{}' as '{}' through '{}'",
            target.name,
            alias.name(),
            association.name
        );

        let node = self.graph.add_node(alias);
        let edge = self.graph.add_edge(
            owner,
            node,
            JoinEdge {
                association: association.name.clone(),
                kind: segment.join.unwrap_or(self.settings.joins.default_kind),
                explicit: segment.join.is_some(),
                on,
            },
        );
        (node, edge)
    }
}

fn fixed_target<'a>(
    schema: &'a Schema,
    association: &AssociationDef,
    path: &AssociationPath,
) -> DslResult<&'a RelationDef> {
    match association.target_relation() {
        Some(name) => schema.require(name),
        None => Err(DslError::alias_resolution(
            path,
            format!("'{}' has no fixed target relation", association.name),
        )),
    }
}

/// Foreign-key join predicate for one association hop.
fn natural_predicate(
    owner: &RelationDef,
    owner_name: &str,
    association: &AssociationDef,
    target: &RelationDef,
    target_name: &str,
    polymorphic: Option<&str>,
) -> Expr {
    match association.kind {
        AssociationKind::BelongsTo => {
            let pk = association
                .primary_key
                .as_deref()
                .unwrap_or(&target.primary_key);
            let on = table_col(target_name, pk).eq(table_col(owner_name, &association.foreign_key));
            match (&association.target, polymorphic) {
                (AssociationTarget::Polymorphic { type_column }, Some(model)) => {
                    on.and(table_col(owner_name, type_column).eq(lit_str(model)))
                }
                _ => on,
            }
        }
        AssociationKind::HasOne | AssociationKind::HasMany => {
            let pk = association
                .primary_key
                .as_deref()
                .unwrap_or(&owner.primary_key);
            let on = table_col(target_name, &association.foreign_key).eq(table_col(owner_name, pk));
            match &association.inverse_type_column {
                Some(type_column) => {
                    on.and(table_col(target_name, type_column).eq(lit_str(&owner.model)))
                }
                None => on,
            }
        }
    }
}

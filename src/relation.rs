//! Relations: a root table plus the joins and conditions added to it.
//!
//! ```ignore
//! let posts = Relation::new(schema, "posts")?
//!     .joining(|s| Ok(s.assoc("author")?.outer()))?
//!     .where_has(|s| Ok(s.assoc("author")?.col("name")?.eq("Yo Gotti")))?;
//!
//! println!("{}", posts.to_sql()?);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::compile::Compiler;
use crate::config::Settings;
use crate::dsl::{Built, CompareOp, Node, Scope, Table};
use crate::error::{DslError, DslResult};
use crate::join::JoinDependency;
use crate::schema::Schema;
use crate::sql::{table_star, Query, TableRef};
use crate::value::Value;

/// A query under construction.
///
/// Builder methods consume and return the relation. Nothing is resolved
/// until [`Relation::to_query`], which compiles against a fresh join graph
/// every time.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    schema: Arc<Schema>,
    settings: Settings,
    table: Table,
    joins: Vec<Table>,
    conditions: Vec<Node>,
    select: Vec<Node>,
    limit: Option<u64>,
}

impl Relation {
    pub fn new(schema: Arc<Schema>, table: &str) -> DslResult<Self> {
        let root = Table::root(Arc::clone(&schema), table)?;
        Ok(Self {
            schema,
            settings: Settings::default(),
            table: root,
            joins: Vec::new(),
            conditions: Vec::new(),
            select: Vec::new(),
            limit: None,
        })
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Scope for blocks evaluated against this relation.
    pub fn scope(&self) -> Scope {
        Scope::with_settings(self.table.clone(), self.settings.clone())
    }

    pub fn conditions(&self) -> &[Node] {
        &self.conditions
    }

    /// Join association paths given in dotted form (`"author.comments"`).
    pub fn joins(mut self, paths: &[&str]) -> DslResult<Self> {
        for dotted in paths {
            let mut table = self.table.clone();
            for name in dotted.split('.').map(str::trim).filter(|s| !s.is_empty()) {
                table = table.assoc(name)?;
            }
            if table.is_root() {
                return Err(DslError::InvalidJoinSpecification(format!(
                    "'{}' names no association",
                    dotted
                )));
            }
            self.joins.push(table);
        }
        Ok(self)
    }

    /// Join the table(s) built by `block`.
    pub fn joining<F, B>(mut self, block: F) -> DslResult<Self>
    where
        F: FnOnce(&Scope) -> DslResult<B>,
        B: Into<Built>,
    {
        match block(&self.scope())?.into() {
            Built::Nil => {}
            Built::Table(table) => self.joins.push(table),
            Built::Tables(tables) => self.joins.extend(tables),
            Built::Node(_) => {
                return Err(DslError::InvalidJoinSpecification(
                    "joining block must build a table, not a condition".into(),
                ))
            }
        }
        Ok(self)
    }

    /// Add the condition built by `block`.
    pub fn where_has<F, B>(mut self, block: F) -> DslResult<Self>
    where
        F: FnOnce(&Scope) -> DslResult<B>,
        B: Into<Built>,
    {
        match block(&self.scope())?.into() {
            Built::Nil => {}
            Built::Node(node) => self.conditions.push(node),
            Built::Table(_) | Built::Tables(_) => {
                return Err(DslError::InvalidJoinSpecification(
                    "where block must build a condition; join tables with joining".into(),
                ))
            }
        }
        Ok(self)
    }

    /// Replace the select list with the nodes built by `block`.
    pub fn selecting<F>(mut self, block: F) -> DslResult<Self>
    where
        F: FnOnce(&Scope) -> DslResult<Vec<Node>>,
    {
        self.select = block(&self.scope())?;
        Ok(self)
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Compile into a query tree.
    pub fn to_query(&self) -> DslResult<Query> {
        let root = self
            .table
            .name()
            .ok_or_else(|| DslError::Internal("relation has no root table".into()))?;
        let mut deps = JoinDependency::new(Arc::clone(&self.schema), root, &self.settings);
        let mut compiler = Compiler::new(&mut deps);

        let mut explicit = Vec::new();
        for table in &self.joins {
            let compiled = compiler.compile_join(table)?;
            if let Some(join) = compiler.apply_join(compiled)? {
                explicit.push(join);
            }
        }

        let filters = self
            .conditions
            .iter()
            .map(|node| compiler.compile(node))
            .collect::<DslResult<Vec<_>>>()?;

        let select = if self.select.is_empty() {
            vec![table_star(root)]
        } else {
            self.select
                .iter()
                .map(|node| compiler.compile(node))
                .collect::<DslResult<Vec<_>>>()?
        };

        debug!(
            "compiled relation '{}' with {} join(s)",
            root,
            deps.len() + explicit.len()
        );

        let mut query = Query::new().select(select).from(TableRef::new(root));
        for join in deps.joins().into_iter().chain(explicit) {
            query = query.join(join);
        }
        for filter in filters {
            query = query.filter(filter);
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        Ok(query)
    }

    /// Compile and render as SQL text.
    pub fn to_sql(&self) -> DslResult<String> {
        Ok(self.to_query()?.to_sql())
    }

    /// Plain equality conditions on the root table's own columns.
    ///
    /// Only top-level conjuncts count; `IS NULL` maps to `Value::Null`.
    pub fn where_values_hash(&self) -> BTreeMap<String, Value> {
        let mut values = BTreeMap::new();
        for node in self.conditions.iter().flat_map(Node::conjuncts) {
            match node {
                Node::Compare {
                    left,
                    op: CompareOp::Eq,
                    right,
                } => {
                    let pair = match (&**left, &**right) {
                        (Node::Attribute(attr), Node::Value(value))
                        | (Node::Value(value), Node::Attribute(attr)) => Some((attr, value)),
                        _ => None,
                    };
                    if let Some((attr, value)) = pair {
                        if self.is_root_attribute(attr.table()) {
                            let value = match attr.column_type() {
                                Some(column_type) => value.clone().cast(column_type),
                                None => value.clone(),
                            };
                            values.insert(attr.name().to_string(), value);
                        }
                    }
                }
                Node::IsNull {
                    expr,
                    negated: false,
                } => {
                    if let Node::Attribute(attr) = &**expr {
                        if self.is_root_attribute(attr.table()) {
                            values.insert(attr.name().to_string(), Value::Null);
                        }
                    }
                }
                _ => {}
            }
        }
        values
    }

    fn is_root_attribute(&self, table: &Table) -> bool {
        table.is_root() && table.alias_name().is_none() && table.name() == self.table.name()
    }
}

//! The context a condition block is evaluated in.

use super::attribute::Attribute;
use super::node::Node;
use super::table::{Resolved, Table};
use crate::config::Settings;
use crate::error::DslResult;
use crate::relation::Relation;
use crate::value::Value;

/// What a block produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Built {
    /// Nothing; no condition or join is added.
    Nil,
    Node(Node),
    Table(Table),
    Tables(Vec<Table>),
}

impl From<Node> for Built {
    fn from(node: Node) -> Self {
        Built::Node(node)
    }
}

impl From<Option<Node>> for Built {
    fn from(node: Option<Node>) -> Self {
        node.map(Built::Node).unwrap_or(Built::Nil)
    }
}

impl From<Attribute> for Built {
    fn from(attr: Attribute) -> Self {
        Built::Node(Node::Attribute(attr))
    }
}

impl From<Table> for Built {
    fn from(table: Table) -> Self {
        Built::Table(table)
    }
}

impl From<Vec<Table>> for Built {
    fn from(tables: Vec<Table>) -> Self {
        Built::Tables(tables)
    }
}

impl From<()> for Built {
    fn from(_: ()) -> Self {
        Built::Nil
    }
}

/// Names in reach of a block, plus the SQL helper functions.
///
/// Blocks always receive the scope explicitly:
///
/// ```ignore
/// relation.where_has(|s| Ok(s.assoc("author")?.col("name")?.eq("Yo Gotti")))?
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    table: Table,
    settings: Settings,
}

impl Scope {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            settings: Settings::default(),
        }
    }

    pub fn with_settings(table: Table, settings: Settings) -> Self {
        Self { table, settings }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get(&self, name: &str) -> DslResult<Resolved> {
        self.table.get(name)
    }

    pub fn col(&self, name: &str) -> DslResult<Attribute> {
        self.table.col(name)
    }

    pub fn assoc(&self, name: &str) -> DslResult<Table> {
        self.table.assoc(name)
    }

    /// Function call, `NAME(args...)`.
    pub fn func<I, A>(&self, name: &str, args: I) -> Node
    where
        I: IntoIterator<Item = A>,
        A: Into<Node>,
    {
        Node::Function {
            name: name.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn coalesce<I, A>(&self, args: I) -> Node
    where
        I: IntoIterator<Item = A>,
        A: Into<Node>,
    {
        self.func("coalesce", args)
    }

    /// `EXISTS (subquery)`. The relation is compiled immediately.
    pub fn exists(&self, relation: &Relation) -> DslResult<Node> {
        Ok(Node::Exists {
            query: Box::new(relation.to_query()?),
            negated: false,
        })
    }

    /// `NOT EXISTS (subquery)`.
    pub fn not_exists(&self, relation: &Relation) -> DslResult<Node> {
        Ok(Node::Exists {
            query: Box::new(relation.to_query()?),
            negated: true,
        })
    }

    /// Scalar subquery.
    pub fn subselect(&self, relation: &Relation) -> DslResult<Node> {
        Ok(Node::Subselect(Box::new(relation.to_query()?)))
    }

    /// Raw SQL, emitted verbatim.
    pub fn sql(&self, raw: &str) -> Node {
        Node::Raw(raw.to_string())
    }

    /// A literal value.
    pub fn quoted(&self, value: impl Into<Value>) -> Node {
        Node::Value(value.into())
    }
}

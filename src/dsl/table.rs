//! Tables and association tables.
//!
//! A [`Table`] is an immutable value. `alias`, `inner`, `outer`, `on` and
//! `of` all return a modified copy and leave the receiver untouched, so a
//! table can be shared freely between conditions.

use std::sync::Arc;

use super::attribute::Attribute;
use super::node::{Node, NodeExt};
use super::path::{AssociationPath, JoinKind, Segment};
use super::scope::{Built, Scope};
use crate::error::{DslError, DslResult};
use crate::schema::{AssociationDef, AssociationKind, AssociationTarget, Entity, RelationDef, Schema};
use crate::value::Value;

/// Result of looking a name up on a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Attribute(Attribute),
    Table(Table),
}

impl Resolved {
    pub fn into_attribute(self) -> Option<Attribute> {
        match self {
            Resolved::Attribute(attr) => Some(attr),
            Resolved::Table(_) => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Resolved::Table(table) => Some(table),
            Resolved::Attribute(_) => None,
        }
    }
}

/// A relation as referenced from a condition: either a root table or a table
/// reached by following associations from one.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: Option<Arc<Schema>>,
    /// Underlying table name. `None` for a polymorphic association before `of`.
    relation: Option<String>,
    alias: Option<String>,
    join: Option<JoinKind>,
    on: Option<Box<Node>>,
    path: AssociationPath,
    association: Option<AssociationDef>,
    parent: Option<Box<Table>>,
}

impl Table {
    /// A root table backed by schema metadata.
    pub fn root(schema: Arc<Schema>, name: &str) -> DslResult<Self> {
        schema.require(name)?;
        Ok(Self {
            schema: Some(schema),
            relation: Some(name.to_string()),
            alias: None,
            join: None,
            on: None,
            path: AssociationPath::root(),
            association: None,
            parent: None,
        })
    }

    /// A table with no metadata. Any column name is accepted.
    pub fn named(name: &str) -> Self {
        Self {
            schema: None,
            relation: Some(name.to_string()),
            alias: None,
            join: None,
            on: None,
            path: AssociationPath::root(),
            association: None,
            parent: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn schema(&self) -> Option<&Arc<Schema>> {
        self.schema.as_ref()
    }

    /// Underlying table name.
    pub fn name(&self) -> Option<&str> {
        self.relation.as_deref()
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The alias if set, otherwise the table name.
    pub fn qualified_name(&self) -> Option<&str> {
        self.alias.as_deref().or(self.relation.as_deref())
    }

    pub fn path(&self) -> &AssociationPath {
        &self.path
    }

    pub fn association(&self) -> Option<&AssociationDef> {
        self.association.as_ref()
    }

    pub fn join_kind(&self) -> Option<JoinKind> {
        self.join
    }

    pub fn on_predicate(&self) -> Option<&Node> {
        self.on.as_deref()
    }

    pub fn parent(&self) -> Option<&Table> {
        self.parent.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn relation_def(&self) -> Option<&RelationDef> {
        let schema = self.schema.as_ref()?;
        schema.relation(self.relation.as_deref()?)
    }

    // =========================================================================
    // Derivations
    // =========================================================================

    /// Copy of this table under another name.
    pub fn alias(&self, name: &str) -> Table {
        let mut table = self.clone();
        table.alias = Some(name.to_string());
        table
    }

    /// Copy of this table joined with `LEFT OUTER JOIN`.
    pub fn outer(&self) -> Table {
        self.with_join(JoinKind::Outer)
    }

    /// Copy of this table joined with `INNER JOIN`.
    pub fn inner(&self) -> Table {
        self.with_join(JoinKind::Inner)
    }

    fn with_join(&self, kind: JoinKind) -> Table {
        let mut table = self.clone();
        table.join = Some(kind);
        if let Some(segment) = table.path.last_mut() {
            segment.join = Some(kind);
        }
        table
    }

    /// Copy of this table joined explicitly on `predicate`.
    pub fn on(&self, predicate: Option<Node>) -> DslResult<Table> {
        let predicate = predicate.ok_or_else(|| {
            DslError::InvalidJoinSpecification(format!(
                "join on '{}' needs a predicate or a builder block",
                self.display_name()
            ))
        })?;
        let mut table = self.clone();
        table.on = Some(Box::new(predicate));
        Ok(table)
    }

    /// Copy of this table joined on the predicate built by `block`.
    ///
    /// The block is scoped to this table.
    pub fn on_with<F, B>(&self, block: F) -> DslResult<Table>
    where
        F: FnOnce(&Scope) -> DslResult<B>,
        B: Into<Built>,
    {
        let scope = Scope::new(self.clone());
        match block(&scope)?.into() {
            Built::Node(node) => self.on(Some(node)),
            Built::Nil => self.on(None),
            Built::Table(_) | Built::Tables(_) => Err(DslError::InvalidJoinSpecification(
                format!("join block for '{}' must build a predicate", self.display_name()),
            )),
        }
    }

    /// Copy of a polymorphic association table bound to the relation of `model`.
    pub fn of(&self, model: &str) -> DslResult<Table> {
        match &self.association {
            Some(assoc) if assoc.is_polymorphic() => {}
            _ => {
                return Err(DslError::alias_resolution(
                    &self.path,
                    format!("'{}' is not a polymorphic association", self.display_name()),
                ))
            }
        }

        let schema = self
            .schema
            .as_ref()
            .ok_or_else(|| DslError::UnknownRelation(model.to_string()))?;
        let target = schema
            .relation_for_model(model)
            .ok_or_else(|| DslError::UnknownRelation(model.to_string()))?;

        let mut table = self.clone();
        table.relation = Some(target.name.clone());
        if let Some(segment) = table.path.last_mut() {
            segment.polymorphic = Some(model.to_string());
        }
        Ok(table)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Look a name up on this table.
    ///
    /// Checked in order: the table's own alias, declared columns, declared
    /// associations. Tables without metadata accept any name as a column.
    pub fn resolve(&self, name: &str) -> Option<Resolved> {
        if self.alias.as_deref() == Some(name) {
            return Some(Resolved::Table(self.clone()));
        }

        let Some(def) = self.relation_def() else {
            return match (&self.schema, &self.relation) {
                (None, Some(_)) => Some(Resolved::Attribute(self.attribute(name))),
                _ => None,
            };
        };

        if def.find_column(name).is_some() {
            return Some(Resolved::Attribute(self.attribute(name)));
        }

        self.assoc(name).ok().map(Resolved::Table)
    }

    /// Like [`Table::resolve`], failing when nothing matches.
    pub fn get(&self, name: &str) -> DslResult<Resolved> {
        self.require_relation()?;
        self.resolve(name)
            .ok_or_else(|| DslError::unknown_attribute(&self.display_name(), name))
    }

    /// A declared column.
    pub fn col(&self, name: &str) -> DslResult<Attribute> {
        self.require_relation()?;
        match self.relation_def() {
            Some(def) if def.find_column(name).is_none() => {
                Err(DslError::unknown_attribute(&def.name, name))
            }
            _ => Ok(self.attribute(name)),
        }
    }

    /// A column reference without checking it against metadata.
    pub fn attribute(&self, name: &str) -> Attribute {
        Attribute::new(self.clone(), name)
    }

    /// The table reached by following association `name`.
    pub fn assoc(&self, name: &str) -> DslResult<Table> {
        self.require_relation()?;
        let Some(def) = self.relation_def() else {
            return Err(DslError::unknown_attribute(&self.display_name(), name));
        };
        let association = def.require_association(name)?;
        let target = match &self.schema {
            Some(schema) => schema
                .association_target(def, association)?
                .map(|target| target.name.clone()),
            None => None,
        };

        Ok(Table {
            schema: self.schema.clone(),
            relation: target,
            alias: None,
            join: None,
            on: None,
            path: self.path.child(Segment::new(name)),
            association: Some(association.clone()),
            parent: Some(Box::new(self.clone())),
        })
    }

    fn require_relation(&self) -> DslResult<()> {
        if self.relation.is_none() {
            return Err(DslError::alias_resolution(
                &self.path,
                "polymorphic association requires of()",
            ));
        }
        Ok(())
    }

    fn display_name(&self) -> String {
        match self.qualified_name() {
            Some(name) => name.to_string(),
            None => self.path.to_string(),
        }
    }

    // =========================================================================
    // Record comparison
    // =========================================================================

    /// Condition matching rows associated with `record`.
    ///
    /// For `belongs_to` this compares the owner's foreign key with the
    /// record's key; for `has_one`/`has_many` the target's primary key.
    pub fn eq_record(&self, record: &dyn Entity) -> DslResult<Node> {
        let pairs = self.record_keys(record)?;
        Ok(pairs
            .into_iter()
            .map(|(attr, value)| attr.eq(value))
            .reduce(|acc, node| acc.and(node))
            .unwrap_or_else(|| Node::Value(Value::Bool(true))))
    }

    /// Negation of [`Table::eq_record`].
    pub fn ne_record(&self, record: &dyn Entity) -> DslResult<Node> {
        let mut pairs = self.record_keys(record)?;
        if pairs.len() == 1 {
            let (attr, value) = pairs.remove(0);
            return Ok(attr.not_eq(value));
        }
        Ok(self.eq_record(record)?.not())
    }

    fn record_keys(&self, record: &dyn Entity) -> DslResult<Vec<(Attribute, Value)>> {
        let record_pk = self.record_primary_key(record);
        let read = |column: &str| {
            record
                .read_attribute(column)
                .ok_or_else(|| DslError::unknown_attribute(record.model_name(), column))
        };

        let (association, parent) = match (&self.association, &self.parent) {
            (Some(association), Some(parent)) => (association, parent),
            _ => {
                let pk = self
                    .relation_def()
                    .map(|def| def.primary_key.clone())
                    .unwrap_or_else(|| "id".to_string());
                return Ok(vec![(self.attribute(&pk), read(&record_pk)?)]);
            }
        };

        match association.kind {
            AssociationKind::BelongsTo => {
                let pk = association.primary_key.as_deref().unwrap_or(&record_pk);
                let mut keys = vec![(parent.attribute(&association.foreign_key), read(pk)?)];
                if let AssociationTarget::Polymorphic { type_column } = &association.target {
                    keys.push((
                        parent.attribute(type_column),
                        Value::from(record.model_name()),
                    ));
                }
                Ok(keys)
            }
            AssociationKind::HasOne | AssociationKind::HasMany => {
                let pk = self
                    .relation_def()
                    .map(|def| def.primary_key.clone())
                    .unwrap_or_else(|| record_pk.clone());
                Ok(vec![(self.attribute(&pk), read(&record_pk)?)])
            }
        }
    }

    fn record_primary_key(&self, record: &dyn Entity) -> String {
        self.schema
            .as_ref()
            .and_then(|schema| schema.relation_for_model(record.model_name()))
            .or_else(|| self.relation_def())
            .map(|def| def.primary_key.clone())
            .unwrap_or_else(|| "id".to_string())
    }
}

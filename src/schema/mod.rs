//! Relation metadata consumed from the host ORM.
//!
//! The compiler only needs a narrow view of the host's schema: table names,
//! primary keys, column types and association declarations. [`Schema`] is
//! that view, built once and shared immutably behind an `Arc`.
//!
//! ```ignore
//! let schema = Schema::new()
//!     .with_relation(
//!         RelationDef::new("authors", "Author")
//!             .column("name", ColumnType::String)
//!             .has_many("posts", "posts"),
//!     )
//!     .with_relation(
//!         RelationDef::new("posts", "Post")
//!             .column("title", ColumnType::String)
//!             .belongs_to("author", "authors"),
//!     );
//! ```

mod entity;
pub mod naming;

pub use entity::{Entity, Record};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{DslError, DslResult};

/// Column types relevant to literal casting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Text,
    Boolean,
    DateTime,
}

/// A declared column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: ColumnType,
}

/// Cardinality of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    /// The owner holds the foreign key.
    BelongsTo,
    /// The target holds the foreign key; at most one target row.
    HasOne,
    /// The target holds the foreign key.
    HasMany,
}

/// Where an association points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationTarget {
    /// A fixed relation, by table name.
    Relation(String),
    /// A polymorphic `belongs_to`; the concrete relation is chosen with `of`.
    Polymorphic { type_column: String },
    /// Reached by following `through` on the owner, then `source` on its target.
    Through { through: String, source: String },
}

/// A declared association from one relation to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationDef {
    pub name: String,
    pub kind: AssociationKind,
    pub target: AssociationTarget,
    /// Foreign key column. Lives on the owner for `belongs_to`, on the target
    /// otherwise; unused for through associations.
    pub foreign_key: String,
    /// Overrides the referenced primary key (target pk for `belongs_to`, owner pk otherwise).
    pub primary_key: Option<String>,
    /// For `has_many ... as: interface`: the discriminator column on the target.
    pub inverse_type_column: Option<String>,
}

impl AssociationDef {
    pub fn is_polymorphic(&self) -> bool {
        matches!(self.target, AssociationTarget::Polymorphic { .. })
    }

    /// The target table name, if it is fixed.
    pub fn target_relation(&self) -> Option<&str> {
        match &self.target {
            AssociationTarget::Relation(name) => Some(name),
            AssociationTarget::Polymorphic { .. } | AssociationTarget::Through { .. } => None,
        }
    }
}

/// Metadata for one relation (table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    pub name: String,
    pub model: String,
    pub primary_key: String,
    pub columns: Vec<ColumnDef>,
    pub associations: Vec<AssociationDef>,
}

impl RelationDef {
    /// Declare a relation with an integer `id` primary key.
    pub fn new(name: &str, model: &str) -> Self {
        Self {
            name: name.to_string(),
            model: model.to_string(),
            primary_key: "id".to_string(),
            columns: vec![ColumnDef {
                name: "id".to_string(),
                data_type: ColumnType::Integer,
            }],
            associations: vec![],
        }
    }

    pub fn with_primary_key(mut self, column: &str) -> Self {
        self.primary_key = column.to_string();
        self
    }

    pub fn column(mut self, name: &str, data_type: ColumnType) -> Self {
        self.columns.retain(|c| c.name != name);
        self.columns.push(ColumnDef {
            name: name.to_string(),
            data_type,
        });
        self
    }

    /// `belongs_to name` targeting `target`, foreign key `{name}_id` on this relation.
    ///
    /// Also declares the foreign key column if it isn't declared yet.
    pub fn belongs_to(self, name: &str, target: &str) -> Self {
        let foreign_key = format!("{}_id", name);
        self.with_fk_column(&foreign_key).association(AssociationDef {
            name: name.to_string(),
            kind: AssociationKind::BelongsTo,
            target: AssociationTarget::Relation(target.to_string()),
            foreign_key,
            primary_key: None,
            inverse_type_column: None,
        })
    }

    /// Polymorphic `belongs_to interface`: columns `{interface}_id` and `{interface}_type`.
    pub fn belongs_to_polymorphic(self, interface: &str) -> Self {
        let foreign_key = format!("{}_id", interface);
        let type_column = naming::type_column_for(interface);
        self.with_fk_column(&foreign_key)
            .column(&type_column, ColumnType::String)
            .association(AssociationDef {
                name: interface.to_string(),
                kind: AssociationKind::BelongsTo,
                target: AssociationTarget::Polymorphic { type_column },
                foreign_key,
                primary_key: None,
                inverse_type_column: None,
            })
    }

    /// `has_many name` targeting `target`, foreign key derived from this model's name.
    pub fn has_many(self, name: &str, target: &str) -> Self {
        let foreign_key = naming::foreign_key_for(&self.model);
        self.association(AssociationDef {
            name: name.to_string(),
            kind: AssociationKind::HasMany,
            target: AssociationTarget::Relation(target.to_string()),
            foreign_key,
            primary_key: None,
            inverse_type_column: None,
        })
    }

    /// `has_one name` targeting `target`, foreign key derived from this model's name.
    pub fn has_one(self, name: &str, target: &str) -> Self {
        let foreign_key = naming::foreign_key_for(&self.model);
        self.association(AssociationDef {
            name: name.to_string(),
            kind: AssociationKind::HasOne,
            target: AssociationTarget::Relation(target.to_string()),
            foreign_key,
            primary_key: None,
            inverse_type_column: None,
        })
    }

    /// `has_many name, as: interface`: the inverse side of a polymorphic `belongs_to`.
    pub fn has_many_as(self, name: &str, target: &str, interface: &str) -> Self {
        self.association(AssociationDef {
            name: name.to_string(),
            kind: AssociationKind::HasMany,
            target: AssociationTarget::Relation(target.to_string()),
            foreign_key: format!("{}_id", interface),
            primary_key: None,
            inverse_type_column: Some(naming::type_column_for(interface)),
        })
    }

    /// `has_many name, through: through, source: source`.
    ///
    /// The target relation is resolved from the through association when joining.
    pub fn has_many_through(self, name: &str, through: &str, source: &str) -> Self {
        self.association(AssociationDef {
            name: name.to_string(),
            kind: AssociationKind::HasMany,
            target: AssociationTarget::Through {
                through: through.to_string(),
                source: source.to_string(),
            },
            foreign_key: String::new(),
            primary_key: None,
            inverse_type_column: None,
        })
    }

    /// Declare an arbitrary association, replacing any with the same name.
    pub fn association(mut self, association: AssociationDef) -> Self {
        self.associations.retain(|a| a.name != association.name);
        self.associations.push(association);
        self
    }

    fn with_fk_column(self, foreign_key: &str) -> Self {
        if self.find_column(foreign_key).is_some() {
            self
        } else {
            self.column(foreign_key, ColumnType::Integer)
        }
    }

    pub fn find_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn find_association(&self, name: &str) -> Option<&AssociationDef> {
        self.associations.iter().find(|a| a.name == name)
    }

    /// Look up an association or fail with `UnknownAttribute`.
    pub fn require_association(&self, name: &str) -> DslResult<&AssociationDef> {
        self.find_association(name)
            .ok_or_else(|| DslError::unknown_attribute(&self.name, name))
    }
}

/// Registry of relation metadata, keyed by table name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    relations: HashMap<String, RelationDef>,
    models: HashMap<String, String>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a relation, replacing any previous definition for the same table.
    pub fn with_relation(mut self, relation: RelationDef) -> Self {
        self.models
            .insert(relation.model.clone(), relation.name.clone());
        self.relations.insert(relation.name.clone(), relation);
        self
    }

    pub fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.get(name)
    }

    /// Look up a relation by its model name (`Post` → `posts`).
    pub fn relation_for_model(&self, model: &str) -> Option<&RelationDef> {
        self.models
            .get(model)
            .and_then(|name| self.relations.get(name))
    }

    /// Look up a relation or fail with `UnknownRelation`.
    pub fn require(&self, name: &str) -> DslResult<&RelationDef> {
        self.relation(name)
            .ok_or_else(|| DslError::UnknownRelation(name.to_string()))
    }

    /// The relation an association ends at.
    ///
    /// Returns `None` for a polymorphic `belongs_to`, whose target depends on
    /// the model picked with `of`. Through associations are followed to the
    /// target of their source association.
    pub fn association_target(
        &self,
        owner: &RelationDef,
        association: &AssociationDef,
    ) -> DslResult<Option<&RelationDef>> {
        match &association.target {
            AssociationTarget::Relation(name) => self.require(name).map(Some),
            AssociationTarget::Polymorphic { .. } => Ok(None),
            AssociationTarget::Through { through, source } => {
                let through_def = owner.require_association(through)?;
                let intermediate = match through_def.target_relation() {
                    Some(name) => self.require(name)?,
                    None => {
                        return Err(DslError::alias_resolution(
                            &association.name,
                            format!("through association '{}' has no fixed target", through),
                        ))
                    }
                };
                let source_def = intermediate.require_association(source)?;
                match source_def.target_relation() {
                    Some(name) => self.require(name).map(Some),
                    None => Err(DslError::alias_resolution(
                        &association.name,
                        format!("source association '{}' has no fixed target", source),
                    )),
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

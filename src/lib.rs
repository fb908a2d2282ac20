//! # Sieve
//!
//! Expression-tree query conditions compiled to relational algebra.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Condition blocks  (|s: &Scope| -> Node/Table)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [dsl]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Node tree over Tables / Attributes / paths           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [join]
//! ┌─────────────────────────────────────────────────────────┐
//! │   JoinDependency (petgraph, memoized paths, aliases)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compile]
//! ┌─────────────────────────────────────────────────────────┐
//! │          sql::Query / sql::Expr / sql::Join              │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Table and association metadata comes from a [`schema::Schema`] supplied
//! by the caller.

pub mod compile;
pub mod config;
pub mod dsl;
pub mod error;
pub mod join;
pub mod relation;
pub mod schema;
pub mod sql;
pub mod value;

#[cfg(test)]
pub(crate) mod test_utils;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{build, CompiledExpression};
    pub use crate::config::Settings;
    pub use crate::dsl::{Attribute, Built, JoinKind, Node, NodeExt, Resolved, Scope, Table};
    pub use crate::error::{DslError, DslResult};
    pub use crate::join::{AssociationTree, CompiledJoin, JoinExpression};
    pub use crate::relation::Relation;
    pub use crate::schema::{ColumnType, Entity, Record, RelationDef, Schema};
    pub use crate::value::Value;
}

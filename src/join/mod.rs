//! Join resolution.
//!
//! - [`dependency`] - the per-query join graph and alias lookup
//! - [`alias`] - alias naming
//! - [`expression`] - compiled join shapes

pub mod alias;
pub mod dependency;
pub mod expression;

pub use alias::{AliasTracker, TableAlias};
pub use dependency::{JoinDependency, JoinEdge};
pub use expression::{AssociationTree, CompiledJoin, JoinExpression};

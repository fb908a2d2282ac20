//! Condition-building DSL.
//!
//! - [`table`] - tables, association traversal and record comparison
//! - [`attribute`] - column references
//! - [`node`] - the expression tree and its operators
//! - [`scope`] - the explicit context blocks are evaluated in
//! - [`path`] - association paths and join kinds

pub mod attribute;
pub mod node;
pub mod path;
pub mod scope;
pub mod table;

pub use attribute::Attribute;
pub use node::{ArithmeticOp, CompareOp, Node, NodeExt};
pub use path::{AssociationPath, JoinKind, PathKey, Segment};
pub use scope::{Built, Scope};
pub use table::{Resolved, Table};

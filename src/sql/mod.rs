//! Relational-algebra tree.
//!
//! The typed SQL AST that compiled conditions and joins are emitted into:
//!
//! - [`expr`] - predicate/expression nodes
//! - [`query`] - SELECT shell, table references and joins
//! - [`token`] - token stream and ANSI-style text rendering

pub mod expr;
pub mod query;
pub mod token;

pub use expr::{
    col, func, lit_bool, lit_float, lit_int, lit_null, lit_str, table_col, table_star,
    BinaryOperator, Expr, ExprExt, Literal, UnaryOperator,
};
pub use query::{Join, JoinType, Query, TableRef};
pub use token::{Token, TokenStream};

//! Compilation of expression trees into relational-algebra nodes.
//!
//! ```text
//! Block → Node tree → (JoinDependency resolves aliases) → sql::Expr / sql::Join
//! ```
//!
//! Attributes are bound to their final table alias only here. Attributes of
//! root tables, explicitly aliased tables and tables joined with an `on`
//! predicate use the table's own name; association attributes go through
//! the join dependency, which joins the association on first use.
//!
//! # Example
//!
//! ```ignore
//! use sieve::compile::{build, CompiledExpression};
//!
//! let scope = relation.scope();
//! let compiled = build(&scope, |s| Ok(s.assoc("author")?.col("name")?.eq("Yo Gotti")))?;
//! if let Some(CompiledExpression::Predicate { expr, joins }) = compiled {
//!     println!("{}", expr);
//! }
//! ```

use log::trace;

use crate::dsl::{
    ArithmeticOp, AssociationPath, Attribute, Built, CompareOp, Node, PathKey, Scope, Table,
};
use crate::error::{DslError, DslResult};
use crate::join::{AssociationTree, CompiledJoin, JoinDependency, JoinExpression};
use crate::sql::{table_col, BinaryOperator, Expr, Join, TableRef, UnaryOperator};
use crate::value::Value;

// ============================================================================
// Compiler
// ============================================================================

/// Compiles nodes and join tables against one join dependency.
pub struct Compiler<'a> {
    deps: &'a mut JoinDependency,
    /// Path of the table whose `on` predicate is being compiled, and its name.
    bound: Option<(PathKey, String)>,
}

impl<'a> Compiler<'a> {
    pub fn new(deps: &'a mut JoinDependency) -> Self {
        Self { deps, bound: None }
    }

    pub fn dependency(&self) -> &JoinDependency {
        self.deps
    }

    /// Compile a node, resolving every attribute's table alias.
    pub fn compile(&mut self, node: &Node) -> DslResult<Expr> {
        Ok(match node {
            Node::Attribute(attr) => self.compile_attribute(attr)?,
            Node::Value(value) => value.to_expr()?,
            Node::Raw(sql) => Expr::Raw(sql.clone()),

            Node::Compare { left, op, right } => {
                let (left, right) = if matches!(op, CompareOp::Like | CompareOp::NotLike) {
                    (self.compile(left)?, self.compile(right)?)
                } else {
                    (self.operand(left, right)?, self.operand(right, left)?)
                };
                binary(left, compare_operator(*op), right)
            }

            Node::IsNull { expr, negated } => Expr::IsNull {
                expr: Box::new(self.compile(expr)?),
                negated: *negated,
            },

            Node::In {
                expr,
                values,
                negated,
            } => {
                let values = values
                    .iter()
                    .map(|value| self.operand(value, expr))
                    .collect::<DslResult<Vec<_>>>()?;
                Expr::In {
                    expr: Box::new(self.compile(expr)?),
                    values,
                    negated: *negated,
                }
            }

            Node::InSubquery {
                expr,
                query,
                negated,
            } => Expr::InSubquery {
                expr: Box::new(self.compile(expr)?),
                subquery: query.clone(),
                negated: *negated,
            },

            Node::Arithmetic { left, op, right } => Expr::Paren(Box::new(binary(
                self.operand(left, right)?,
                arithmetic_operator(*op),
                self.operand(right, left)?,
            ))),

            Node::And(left, right) => binary(
                self.compile(left)?,
                BinaryOperator::And,
                self.compile(right)?,
            ),

            Node::Or(left, right) => Expr::Paren(Box::new(binary(
                self.compile(left)?,
                BinaryOperator::Or,
                self.compile(right)?,
            ))),

            Node::Not(inner) => Expr::UnaryOp {
                op: UnaryOperator::Not,
                expr: Box::new(Expr::Paren(Box::new(self.compile(inner)?))),
            },

            Node::Function { name, args } => Expr::Function {
                name: name.clone(),
                args: args
                    .iter()
                    .map(|arg| self.compile(arg))
                    .collect::<DslResult<Vec<_>>>()?,
            },

            Node::Exists { query, negated } => Expr::Exists {
                subquery: query.clone(),
                negated: *negated,
            },

            Node::Subselect(query) => Expr::Subquery(query.clone()),

            Node::Grouping(inner) => Expr::Paren(Box::new(self.compile(inner)?)),
        })
    }

    /// Compile `node`, casting a plain value to the column type of `other`.
    fn operand(&mut self, node: &Node, other: &Node) -> DslResult<Expr> {
        match (node, other) {
            (Node::Value(value), Node::Attribute(attr)) => cast_for(value, attr).to_expr(),
            _ => self.compile(node),
        }
    }

    fn compile_attribute(&mut self, attr: &Attribute) -> DslResult<Expr> {
        let table = attr.table();

        if table.is_root()
            || table.alias_name().is_some()
            || table.on_predicate().is_some()
            || table.schema().is_none()
        {
            let name = table.qualified_name().ok_or_else(|| {
                DslError::alias_resolution(table.path(), "polymorphic association requires of()")
            })?;
            return Ok(table_col(name, attr.name()));
        }

        if let Some((key, name)) = &self.bound {
            if *key == table.path().key() {
                return Ok(table_col(name, attr.name()));
            }
        }

        let origin = origin(table);
        let root = self.deps.root().relation.as_str();
        if origin.name() != Some(root) {
            return Err(DslError::alias_resolution(
                table.path(),
                format!(
                    "path starts at '{}', not at '{}'",
                    origin.qualified_name().unwrap_or_default(),
                    root
                ),
            ));
        }

        let alias = self.deps.find_alias(table.path())?;
        trace!("'{}.{}' resolved to '{}'", table.path(), attr.name(), alias.name());
        Ok(table_col(alias.name(), attr.name()))
    }

    /// Compile a join table into its join directive.
    ///
    /// - an `on` predicate gives an explicit join
    /// - polymorphic or outer hops give a [`JoinExpression`]
    /// - anything else is a plain [`AssociationTree`]
    pub fn compile_join(&mut self, table: &Table) -> DslResult<CompiledJoin> {
        if let Some(on) = table.on_predicate() {
            let relation = table.name().ok_or_else(|| {
                DslError::alias_resolution(table.path(), "polymorphic association requires of()")
            })?;
            let mut table_ref = TableRef::new(relation);
            if let Some(alias) = table.alias_name() {
                table_ref = table_ref.with_alias(alias);
            }
            self.deps.reserve_alias(table_ref.name());

            let kind = table
                .join_kind()
                .unwrap_or(self.deps.settings().joins.default_kind);
            let previous = self
                .bound
                .replace((table.path().key(), table_ref.name().to_string()));
            let on = self.compile(on);
            self.bound = previous;
            let on = on?;
            let root = self.deps.root().relation.as_str();
            let path = if origin(table).name() == Some(root) {
                table.path().clone()
            } else {
                AssociationPath::root()
            };
            return Ok(CompiledJoin::Explicit {
                path,
                join: Join {
                    join_type: kind.into(),
                    table: table_ref,
                    on: Some(on),
                },
            });
        }

        if let Some(alias) = table.alias_name() {
            return Err(DslError::InvalidJoinSpecification(format!(
                "aliased table '{}' must be joined with an on predicate",
                alias
            )));
        }

        let path = table.path();
        if path.is_empty() {
            return Err(DslError::InvalidJoinSpecification(format!(
                "'{}' is not an association and has no on predicate",
                table.qualified_name().unwrap_or_default()
            )));
        }
        if table.name().is_none() {
            return Err(DslError::alias_resolution(
                path,
                "polymorphic association requires of()",
            ));
        }

        if path.is_polymorphic() || path.has_outer() {
            Ok(CompiledJoin::Expression(JoinExpression::new(path.clone())))
        } else {
            Ok(CompiledJoin::Associations(AssociationTree::from_path(path)))
        }
    }

    /// Add a compiled join to the dependency.
    ///
    /// Association joins, explicit ones included, go into the join graph.
    /// Explicit joins of tables outside the graph are returned for the caller
    /// to emit.
    pub fn apply_join(&mut self, join: CompiledJoin) -> DslResult<Option<Join>> {
        match join {
            CompiledJoin::Explicit { path, join } if path.is_empty() => Ok(Some(join)),
            CompiledJoin::Explicit { path, join } => {
                self.deps.bind_explicit(&path, join)?;
                Ok(None)
            }
            CompiledJoin::Expression(expression) => {
                self.deps.ensure(expression.path())?;
                Ok(None)
            }
            CompiledJoin::Associations(tree) => {
                for path in tree.paths() {
                    self.deps.ensure(&path)?;
                }
                Ok(None)
            }
        }
    }
}

impl Table {
    /// Compile this table as a join against `deps`.
    pub fn compile_join(&self, deps: &mut JoinDependency) -> DslResult<CompiledJoin> {
        Compiler::new(deps).compile_join(self)
    }
}

fn origin(table: &Table) -> &Table {
    let mut current = table;
    while let Some(parent) = current.parent() {
        current = parent;
    }
    current
}

fn cast_for(value: &Value, attr: &Attribute) -> Value {
    match attr.column_type() {
        Some(column_type) => value.clone().cast(column_type),
        None => value.clone(),
    }
}

fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

fn compare_operator(op: CompareOp) -> BinaryOperator {
    match op {
        CompareOp::Eq => BinaryOperator::Eq,
        CompareOp::NotEq => BinaryOperator::Ne,
        CompareOp::Gt => BinaryOperator::Gt,
        CompareOp::Gte => BinaryOperator::Gte,
        CompareOp::Lt => BinaryOperator::Lt,
        CompareOp::Lte => BinaryOperator::Lte,
        CompareOp::Like => BinaryOperator::Like,
        CompareOp::NotLike => BinaryOperator::NotLike,
    }
}

fn arithmetic_operator(op: ArithmeticOp) -> BinaryOperator {
    match op {
        ArithmeticOp::Plus => BinaryOperator::Plus,
        ArithmeticOp::Minus => BinaryOperator::Minus,
        ArithmeticOp::Times => BinaryOperator::Mul,
        ArithmeticOp::Divide => BinaryOperator::Div,
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// What a block compiles to.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledExpression {
    /// A predicate, with the association joins it needs.
    Predicate { expr: Expr, joins: Vec<Join> },
    /// Plain association joins.
    Associations(AssociationTree),
    /// Association join needing type filters or outer joins.
    JoinExpression(JoinExpression),
    /// Explicit join with an `on` predicate.
    Explicit(Join),
}

impl From<CompiledJoin> for CompiledExpression {
    fn from(join: CompiledJoin) -> Self {
        match join {
            CompiledJoin::Explicit { join, .. } => CompiledExpression::Explicit(join),
            CompiledJoin::Expression(expression) => CompiledExpression::JoinExpression(expression),
            CompiledJoin::Associations(tree) => CompiledExpression::Associations(tree),
        }
    }
}

/// Evaluate `block` in `scope` and compile the result against a fresh join
/// dependency rooted at the scope's table.
///
/// Returns `None` when the block produced nothing.
pub fn build<F, B>(scope: &Scope, block: F) -> DslResult<Option<CompiledExpression>>
where
    F: FnOnce(&Scope) -> DslResult<B>,
    B: Into<Built>,
{
    let built = block(scope)?.into();
    let root = origin(scope.table());
    let root_name = root
        .name()
        .ok_or_else(|| DslError::Internal("scope table has no relation".into()))?;
    let schema = root.schema().cloned().unwrap_or_default();
    let mut deps = JoinDependency::new(schema, root_name, scope.settings());
    let mut compiler = Compiler::new(&mut deps);

    let compiled = match built {
        Built::Nil => return Ok(None),
        Built::Node(node) => {
            let expr = compiler.compile(&node)?;
            CompiledExpression::Predicate {
                expr,
                joins: deps.joins(),
            }
        }
        Built::Table(table) => compiler.compile_join(&table)?.into(),
        Built::Tables(tables) => {
            let mut merged = AssociationTree::new();
            for table in &tables {
                match compiler.compile_join(table)? {
                    CompiledJoin::Associations(tree) => merged.merge(tree),
                    other if tables.len() == 1 => return Ok(Some(other.into())),
                    _ => {
                        return Err(DslError::InvalidJoinSpecification(
                            "only plain association joins can be combined in one block".into(),
                        ))
                    }
                }
            }
            if merged.is_empty() {
                return Ok(None);
            }
            CompiledExpression::Associations(merged)
        }
    };

    Ok(Some(compiled))
}

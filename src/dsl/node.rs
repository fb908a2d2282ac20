//! Expression nodes built by condition blocks.
//!
//! Nodes are plain immutable values. Operators on [`Attribute`] and [`Node`]
//! come from [`NodeExt`], with `&`, `|`, `!` and arithmetic operators
//! provided through `std::ops`.

use std::ops::{Add, BitAnd, BitOr, Div, Mul, Not, Sub};

use super::attribute::Attribute;
use crate::sql::Query;
use crate::value::Value;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Plus,
    Minus,
    Times,
    Divide,
}

/// An expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Attribute(Attribute),
    Value(Value),
    /// SQL text emitted verbatim.
    Raw(String),
    Compare {
        left: Box<Node>,
        op: CompareOp,
        right: Box<Node>,
    },
    IsNull {
        expr: Box<Node>,
        negated: bool,
    },
    In {
        expr: Box<Node>,
        values: Vec<Node>,
        negated: bool,
    },
    InSubquery {
        expr: Box<Node>,
        query: Box<Query>,
        negated: bool,
    },
    Arithmetic {
        left: Box<Node>,
        op: ArithmeticOp,
        right: Box<Node>,
    },
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Not(Box<Node>),
    Function {
        name: String,
        args: Vec<Node>,
    },
    Exists {
        query: Box<Query>,
        negated: bool,
    },
    /// Scalar subquery.
    Subselect(Box<Query>),
    Grouping(Box<Node>),
}

impl Node {
    /// Split a conjunction into its top-level operands.
    pub fn conjuncts(&self) -> Vec<&Node> {
        match self {
            Node::And(left, right) => {
                let mut nodes = left.conjuncts();
                nodes.extend(right.conjuncts());
                nodes
            }
            Node::Grouping(inner) => inner.conjuncts(),
            other => vec![other],
        }
    }
}

/// Operators shared by attributes and nodes.
pub trait NodeExt: Sized {
    fn into_node(self) -> Node;

    /// `=`; comparing with `Value::Null` yields `IS NULL`.
    fn eq(self, other: impl Into<Node>) -> Node {
        match other.into() {
            Node::Value(Value::Null) => Node::IsNull {
                expr: Box::new(self.into_node()),
                negated: false,
            },
            other => compare(self.into_node(), CompareOp::Eq, other),
        }
    }

    /// `<>`; comparing with `Value::Null` yields `IS NOT NULL`.
    fn not_eq(self, other: impl Into<Node>) -> Node {
        match other.into() {
            Node::Value(Value::Null) => Node::IsNull {
                expr: Box::new(self.into_node()),
                negated: true,
            },
            other => compare(self.into_node(), CompareOp::NotEq, other),
        }
    }

    fn gt(self, other: impl Into<Node>) -> Node {
        compare(self.into_node(), CompareOp::Gt, other.into())
    }

    fn gte(self, other: impl Into<Node>) -> Node {
        compare(self.into_node(), CompareOp::Gte, other.into())
    }

    fn lt(self, other: impl Into<Node>) -> Node {
        compare(self.into_node(), CompareOp::Lt, other.into())
    }

    fn lte(self, other: impl Into<Node>) -> Node {
        compare(self.into_node(), CompareOp::Lte, other.into())
    }

    fn like(self, pattern: impl Into<Node>) -> Node {
        compare(self.into_node(), CompareOp::Like, pattern.into())
    }

    fn not_like(self, pattern: impl Into<Node>) -> Node {
        compare(self.into_node(), CompareOp::NotLike, pattern.into())
    }

    fn in_list<I, V>(self, values: I) -> Node
    where
        I: IntoIterator<Item = V>,
        V: Into<Node>,
    {
        Node::In {
            expr: Box::new(self.into_node()),
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    fn not_in<I, V>(self, values: I) -> Node
    where
        I: IntoIterator<Item = V>,
        V: Into<Node>,
    {
        Node::In {
            expr: Box::new(self.into_node()),
            values: values.into_iter().map(Into::into).collect(),
            negated: true,
        }
    }

    /// `IN (SELECT ...)` over an already compiled query.
    fn in_subquery(self, query: Query) -> Node {
        Node::InSubquery {
            expr: Box::new(self.into_node()),
            query: Box::new(query),
            negated: false,
        }
    }

    fn not_in_subquery(self, query: Query) -> Node {
        Node::InSubquery {
            expr: Box::new(self.into_node()),
            query: Box::new(query),
            negated: true,
        }
    }

    fn plus(self, other: impl Into<Node>) -> Node {
        arithmetic(self.into_node(), ArithmeticOp::Plus, other.into())
    }

    fn minus(self, other: impl Into<Node>) -> Node {
        arithmetic(self.into_node(), ArithmeticOp::Minus, other.into())
    }

    fn times(self, other: impl Into<Node>) -> Node {
        arithmetic(self.into_node(), ArithmeticOp::Times, other.into())
    }

    fn divided_by(self, other: impl Into<Node>) -> Node {
        arithmetic(self.into_node(), ArithmeticOp::Divide, other.into())
    }

    fn and(self, other: impl Into<Node>) -> Node {
        Node::And(Box::new(self.into_node()), Box::new(other.into()))
    }

    fn or(self, other: impl Into<Node>) -> Node {
        Node::Or(Box::new(self.into_node()), Box::new(other.into()))
    }

    fn not(self) -> Node {
        Node::Not(Box::new(self.into_node()))
    }

    fn grouped(self) -> Node {
        Node::Grouping(Box::new(self.into_node()))
    }
}

impl NodeExt for Node {
    fn into_node(self) -> Node {
        self
    }
}

impl NodeExt for Attribute {
    fn into_node(self) -> Node {
        Node::Attribute(self)
    }
}

fn compare(left: Node, op: CompareOp, right: Node) -> Node {
    Node::Compare {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

fn arithmetic(left: Node, op: ArithmeticOp, right: Node) -> Node {
    Node::Arithmetic {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

// =============================================================================
// Operator overloads
// =============================================================================

impl<T: Into<Node>> BitAnd<T> for Node {
    type Output = Node;

    fn bitand(self, rhs: T) -> Node {
        NodeExt::and(self, rhs)
    }
}

impl<T: Into<Node>> BitOr<T> for Node {
    type Output = Node;

    fn bitor(self, rhs: T) -> Node {
        NodeExt::or(self, rhs)
    }
}

impl Not for Node {
    type Output = Node;

    fn not(self) -> Node {
        NodeExt::not(self)
    }
}

macro_rules! arithmetic_ops {
    ($($ty:ty),*) => {
        $(
            impl<T: Into<Node>> Add<T> for $ty {
                type Output = Node;

                fn add(self, rhs: T) -> Node {
                    NodeExt::plus(self, rhs)
                }
            }

            impl<T: Into<Node>> Sub<T> for $ty {
                type Output = Node;

                fn sub(self, rhs: T) -> Node {
                    NodeExt::minus(self, rhs)
                }
            }

            impl<T: Into<Node>> Mul<T> for $ty {
                type Output = Node;

                fn mul(self, rhs: T) -> Node {
                    NodeExt::times(self, rhs)
                }
            }

            impl<T: Into<Node>> Div<T> for $ty {
                type Output = Node;

                fn div(self, rhs: T) -> Node {
                    NodeExt::divided_by(self, rhs)
                }
            }
        )*
    };
}

arithmetic_ops!(Node, Attribute);

// =============================================================================
// Conversions
// =============================================================================

impl From<Attribute> for Node {
    fn from(attr: Attribute) -> Self {
        Node::Attribute(attr)
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::Value(value)
    }
}

macro_rules! value_conversions {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Node::Value(Value::from(value))
                }
            }
        )*
    };
}

value_conversions!(i64, i32, f64, bool, &str, String);

impl<T: Into<Value>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        Node::Value(Value::from(value))
    }
}

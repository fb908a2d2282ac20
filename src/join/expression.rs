//! The three shapes a compiled join can take.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dsl::{AssociationPath, Segment};
use crate::sql::Join;

/// Nested association names, e.g. `{author: {comments: {}}}`.
///
/// Handed over when a join needs nothing beyond the default inner join of
/// each association.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AssociationTree(BTreeMap<String, AssociationTree>);

impl AssociationTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: &AssociationPath) -> Self {
        path.segments()
            .iter()
            .rev()
            .fold(AssociationTree::new(), |inner, segment| {
                let mut tree = AssociationTree::new();
                tree.0.insert(segment.name.clone(), inner);
                tree
            })
    }

    /// Merge `other` into this tree.
    pub fn merge(&mut self, other: AssociationTree) {
        for (name, subtree) in other.0 {
            self.0.entry(name).or_default().merge(subtree);
        }
    }

    pub fn get(&self, name: &str) -> Option<&AssociationTree> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Root-to-leaf paths, in name order.
    pub fn paths(&self) -> Vec<AssociationPath> {
        let mut paths = Vec::new();
        self.collect_paths(&AssociationPath::root(), &mut paths);
        paths
    }

    fn collect_paths(&self, prefix: &AssociationPath, paths: &mut Vec<AssociationPath>) {
        for (name, subtree) in &self.0 {
            let path = prefix.child(Segment::new(name));
            if subtree.is_empty() {
                paths.push(path);
            } else {
                subtree.collect_paths(&path, paths);
            }
        }
    }
}

/// A join along an association path that needs more than a plain inner
/// join: a polymorphic type filter or an outer join on some hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinExpression {
    path: AssociationPath,
}

impl JoinExpression {
    pub fn new(path: AssociationPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &AssociationPath {
        &self.path
    }

    pub fn is_polymorphic(&self) -> bool {
        self.path.is_polymorphic()
    }

    pub fn is_outer(&self) -> bool {
        self.path.has_outer()
    }
}

/// A compiled join directive.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledJoin {
    /// Explicit join with its own `ON` predicate. `path` is the association
    /// it joins, empty for tables joined outside the association graph.
    Explicit { path: AssociationPath, join: Join },
    /// Association join that needs type filters or outer joins.
    Expression(JoinExpression),
    /// Plain association join.
    Associations(AssociationTree),
}

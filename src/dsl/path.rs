//! Association paths: the route from a root table to an associated table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sql::JoinType;

/// How an association hop is joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    #[default]
    Inner,
    Outer,
}

impl From<JoinKind> for JoinType {
    fn from(kind: JoinKind) -> Self {
        match kind {
            JoinKind::Inner => JoinType::Inner,
            JoinKind::Outer => JoinType::Left,
        }
    }
}

impl From<JoinType> for JoinKind {
    fn from(join_type: JoinType) -> Self {
        match join_type {
            JoinType::Inner => JoinKind::Inner,
            JoinType::Left => JoinKind::Outer,
        }
    }
}

/// One hop of an association path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Association name declared on the owning relation.
    pub name: String,
    /// Concrete model chosen with `of` for a polymorphic association.
    pub polymorphic: Option<String>,
    /// Join kind requested for this hop; `None` uses the configured default.
    pub join: Option<JoinKind>,
}

impl Segment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            polymorphic: None,
            join: None,
        }
    }
}

/// Identity of a path for memoization. Join kind is not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathKey(Vec<(String, Option<String>)>);

/// Ordered association hops from a root table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationPath {
    segments: Vec<Segment>,
}

impl AssociationPath {
    /// The empty path, which names the root table itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a dotted path such as `author.comments`.
    pub fn parse(dotted: &str) -> Self {
        Self {
            segments: dotted
                .split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Segment::new)
                .collect(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Segment> {
        self.segments.last_mut()
    }

    /// A new path extended by one hop.
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// The first `len` hops of this path.
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            segments: self.segments[..len.min(self.segments.len())].to_vec(),
        }
    }

    pub fn key(&self) -> PathKey {
        PathKey(
            self.segments
                .iter()
                .map(|s| (s.name.clone(), s.polymorphic.clone()))
                .collect(),
        )
    }

    pub fn is_polymorphic(&self) -> bool {
        self.segments.iter().any(|s| s.polymorphic.is_some())
    }

    pub fn has_outer(&self) -> bool {
        self.segments
            .iter()
            .any(|s| s.join == Some(JoinKind::Outer))
    }
}

impl fmt::Display for AssociationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment.name)?;
            if let Some(model) = &segment.polymorphic {
                write!(f, "({})", model)?;
            }
        }
        Ok(())
    }
}

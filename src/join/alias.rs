//! Alias assignment for tables in a join graph.
//!
//! The first occurrence of a table is used under its own name. Later
//! occurrences get a name derived from the association that reached them
//! and the table that owns it:
//!
//! | Hop | Candidate |
//! |-----|-----------|
//! | association `author` from `posts` | `authors_posts` |
//! | through-intermediate `authors` from `posts` | `authors_posts_join` |
//!
//! A taken candidate is suffixed with the smallest free counter from 2.

use std::collections::HashSet;

use crate::schema::naming::pluralize;

/// A table instance in a query, with its finalized alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableAlias {
    pub relation: String,
    pub alias: Option<String>,
}

impl TableAlias {
    pub fn unaliased(relation: &str) -> Self {
        Self {
            relation: relation.to_string(),
            alias: None,
        }
    }

    pub fn aliased(relation: &str, alias: &str) -> Self {
        Self {
            relation: relation.to_string(),
            alias: Some(alias.to_string()),
        }
    }

    /// The name columns are qualified with.
    pub fn name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.relation)
    }
}

/// Tracks names already taken in one query.
#[derive(Debug, Clone)]
pub struct AliasTracker {
    separator: String,
    used: HashSet<String>,
}

impl AliasTracker {
    pub fn new(separator: &str) -> Self {
        Self {
            separator: separator.to_string(),
            used: HashSet::new(),
        }
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Mark a name as taken, e.g. an explicit alias chosen by the caller.
    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    /// Claim `relation`, falling back to `candidate` when it is taken.
    pub fn assign(&mut self, relation: &str, candidate: &str) -> TableAlias {
        if self.used.insert(relation.to_string()) {
            return TableAlias::unaliased(relation);
        }

        let mut alias = candidate.to_string();
        let mut counter = 2;
        while self.used.contains(&alias) {
            alias = format!("{}{}{}", candidate, self.separator, counter);
            counter += 1;
        }
        self.used.insert(alias.clone());
        TableAlias::aliased(relation, &alias)
    }

    /// `{pluralized association}{sep}{owner table}`.
    pub fn association_candidate(&self, association: &str, owner: &str) -> String {
        format!("{}{}{}", pluralize(association), self.separator, owner)
    }

    /// `{intermediate table}{sep}{owner table}{sep}join`.
    pub fn through_candidate(&self, intermediate: &str, owner: &str) -> String {
        format!(
            "{}{sep}{}{sep}join",
            intermediate,
            owner,
            sep = self.separator
        )
    }
}

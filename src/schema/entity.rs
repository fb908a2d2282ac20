//! Loaded records, as seen by condition building.

use std::collections::BTreeMap;

use crate::value::Value;

/// A loaded record whose key values can be compared against.
pub trait Entity {
    /// Model name of the record (`Author`).
    fn model_name(&self) -> &str;

    /// Read a column value; `None` when the record has no such attribute.
    fn read_attribute(&self, column: &str) -> Option<Value>;
}

/// A plain attribute map implementing [`Entity`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    model: String,
    attributes: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(column.to_string(), value.into());
        self
    }
}

impl Entity for Record {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn read_attribute(&self, column: &str) -> Option<Value> {
        self.attributes.get(column).cloned()
    }
}

//! Column references on tables.

use super::table::Table;
use crate::schema::ColumnType;

/// A column on a [`Table`].
///
/// The owning table's alias is not looked up here; the compiler resolves it
/// once the whole join graph for the query is known.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    table: Table,
    name: String,
}

impl Attribute {
    pub fn new(table: Table, name: &str) -> Self {
        Self {
            table,
            name: name.to_string(),
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of the column, when the table's relation is known.
    pub fn column_type(&self) -> Option<ColumnType> {
        self.table
            .relation_def()
            .and_then(|def| def.find_column(&self.name))
            .map(|column| column.data_type)
    }
}

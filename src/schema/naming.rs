//! Naming conventions shared by schema defaults and join aliasing.
//!
//! Uses the `inflector` crate, with a small table of irregular plurals that
//! show up in table names.

use inflector::Inflector;

static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("medium", "media"),
    ("index", "indices"),
];

/// Pluralize an association or table name.
///
/// Already-plural names come back unchanged, so `author_comments` stays
/// `author_comments` while `author` becomes `authors`.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    // Only the last underscore-separated word is inflected.
    let (prefix, last) = match word.rfind('_') {
        Some(idx) => word.split_at(idx + 1),
        None => ("", word),
    };

    let lower = last.to_lowercase();
    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *singular || lower == *plural {
            return format!("{}{}", prefix, plural);
        }
    }

    format!("{}{}", prefix, last.to_plural())
}

/// Default foreign key column for a model name: `Author` → `author_id`.
pub fn foreign_key_for(model: &str) -> String {
    format!("{}_id", model.to_snake_case())
}

/// Default discriminator column for a polymorphic interface: `imageable` → `imageable_type`.
pub fn type_column_for(interface: &str) -> String {
    format!("{}_type", interface)
}

//! Shared fixtures for unit tests.

use std::sync::Arc;

use crate::schema::{ColumnType, RelationDef, Schema};

/// A small blog schema: authors, posts, comments, polymorphic pictures,
/// plus stations/shows with differently typed `frequency` columns.
pub fn blog_schema() -> Arc<Schema> {
    Arc::new(
        Schema::new()
            .with_relation(
                RelationDef::new("authors", "Author")
                    .column("name", ColumnType::String)
                    .column("age", ColumnType::Integer)
                    .column("ugly", ColumnType::Boolean)
                    .has_many("posts", "posts")
                    .has_many("comments", "comments")
                    .has_many_as("pictures", "pictures", "imageable"),
            )
            .with_relation(
                RelationDef::new("posts", "Post")
                    .column("title", ColumnType::String)
                    .column("published_at", ColumnType::DateTime)
                    .column("view_count", ColumnType::Integer)
                    .belongs_to("author", "authors")
                    .belongs_to("parent", "posts")
                    .has_many("comments", "comments")
                    .has_many_through("author_comments", "author", "comments")
                    .has_many_as("pictures", "pictures", "imageable"),
            )
            .with_relation(
                RelationDef::new("comments", "Comment")
                    .column("body", ColumnType::Text)
                    .belongs_to("post", "posts")
                    .belongs_to("author", "authors"),
            )
            .with_relation(
                RelationDef::new("pictures", "Picture")
                    .column("url", ColumnType::String)
                    .belongs_to_polymorphic("imageable"),
            )
            .with_relation(
                RelationDef::new("stations", "Station")
                    .column("frequency", ColumnType::Float)
                    .has_many("shows", "shows"),
            )
            .with_relation(
                RelationDef::new("shows", "Show")
                    .column("frequency", ColumnType::String)
                    .belongs_to("station", "stations"),
            ),
    )
}

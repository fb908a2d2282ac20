#[path = "../support/mod.rs"]
mod support;

use sieve::dsl::{JoinKind, Node, NodeExt, Resolved, Table};
use sieve::error::DslError;
use sieve::schema::Record;

fn posts() -> Table {
    Table::root(support::schema(), "posts").unwrap()
}

#[test]
fn test_alias_leaves_original_untouched() {
    let posts = posts();
    let aliased = posts.alias("p");
    let _ = aliased.alias("q");

    assert_eq!(posts.qualified_name(), Some("posts"));
    assert_eq!(aliased.qualified_name(), Some("p"));
}

#[test]
fn test_derivations_are_independent() {
    let author = posts().assoc("author").unwrap();
    let outer = author.outer();
    let aliased = outer.alias("a");

    assert_eq!(author.join_kind(), None);
    assert_eq!(author.alias_name(), None);
    assert_eq!(outer.alias_name(), None);
    assert_eq!(aliased.join_kind(), Some(JoinKind::Outer));
}

#[test]
fn test_on_requires_predicate() {
    let author = posts().assoc("author").unwrap();
    assert!(matches!(
        author.on(None),
        Err(DslError::InvalidJoinSpecification(_))
    ));
    assert!(matches!(
        author.on_with(|_| Ok(())),
        Err(DslError::InvalidJoinSpecification(_))
    ));
}

#[test]
fn test_resolve_columns_then_associations() {
    let posts = posts();

    let title = posts.resolve("title").and_then(Resolved::into_attribute).unwrap();
    assert_eq!(title.name(), "title");

    let author = posts.resolve("author").and_then(Resolved::into_table).unwrap();
    assert_eq!(author.name(), Some("authors"));

    assert_eq!(
        posts.get("nonexistent").unwrap_err(),
        DslError::UnknownAttribute {
            relation: "posts".into(),
            name: "nonexistent".into(),
        }
    );
}

#[test]
fn test_nested_association_lookup() {
    let table = posts()
        .assoc("author")
        .and_then(|author| author.assoc("posts"))
        .and_then(|posts| posts.assoc("comments"))
        .unwrap();
    assert_eq!(table.path().to_string(), "author.posts.comments");
}

#[test]
fn test_unknown_association_on_nested_table() {
    let err = posts().assoc("author").unwrap().assoc("editor").unwrap_err();
    assert_eq!(
        err,
        DslError::UnknownAttribute {
            relation: "authors".into(),
            name: "editor".into(),
        }
    );
}

#[test]
fn test_belongs_to_compares_with_record_key() {
    let author = Record::new("Author").with("id", 42);
    let node = posts().assoc("author").unwrap().eq_record(&author).unwrap();
    let expected = posts().attribute("author_id").eq(42);
    assert_eq!(node, expected);
}

#[test]
fn test_not_equal_record() {
    let author = Record::new("Author").with("id", 42);
    let node = posts().assoc("author").unwrap().ne_record(&author).unwrap();
    let expected = posts().attribute("author_id").not_eq(42);
    assert_eq!(node, expected);
}

#[test]
fn test_has_many_compares_target_key() {
    let comment = Record::new("Comment").with("id", 9);
    let comments = posts().assoc("comments").unwrap();
    let node = comments.eq_record(&comment).unwrap();
    assert_eq!(node, comments.attribute("id").eq(9));
}

#[test]
fn test_polymorphic_record_adds_type() {
    let post = Record::new("Post").with("id", 3);
    let pictures = Table::root(support::schema(), "pictures").unwrap();
    let node = pictures.assoc("imageable").unwrap().eq_record(&post).unwrap();

    let expected = pictures
        .attribute("imageable_id")
        .eq(3)
        .and(pictures.attribute("imageable_type").eq("Post"));
    assert_eq!(node, expected);

    let negated = pictures.assoc("imageable").unwrap().ne_record(&post).unwrap();
    assert!(matches!(negated, Node::Not(_)));
}

#[test]
fn test_record_missing_key_fails() {
    let author = Record::new("Author").with("name", "nobody");
    let err = posts().assoc("author").unwrap().eq_record(&author).unwrap_err();
    assert!(matches!(err, DslError::UnknownAttribute { .. }));
}

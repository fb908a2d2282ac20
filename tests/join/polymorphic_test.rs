#[path = "../support/mod.rs"]
mod support;

use insta::assert_snapshot;
use sieve::compile::{build, CompiledExpression};
use sieve::dsl::NodeExt;
use sieve::error::DslError;

#[test]
fn test_polymorphic_join_adds_type_condition() {
    let sql = support::relation("pictures")
        .joining(|s| s.assoc("imageable")?.of("Post"))
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "pictures".* FROM "pictures" INNER JOIN "posts" ON "posts"."id" = "pictures"."imageable_id" AND "pictures"."imageable_type" = 'Post'"#
    );
}

#[test]
fn test_polymorphic_outer_join() {
    let sql = support::relation("pictures")
        .joining(|s| Ok(s.assoc("imageable")?.of("Author")?.outer()))
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "pictures".* FROM "pictures" LEFT OUTER JOIN "authors" ON "authors"."id" = "pictures"."imageable_id" AND "pictures"."imageable_type" = 'Author'"#
    );
}

#[test]
fn test_polymorphic_condition_joins_implicitly() {
    let sql = support::relation("pictures")
        .where_has(|s| Ok(s.assoc("imageable")?.of("Post")?.col("title")?.eq("Hello")))
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "pictures".* FROM "pictures" INNER JOIN "posts" ON "posts"."id" = "pictures"."imageable_id" AND "pictures"."imageable_type" = 'Post' WHERE "posts"."title" = 'Hello'"#
    );
}

#[test]
fn test_two_polymorphic_targets_get_separate_joins() {
    let sql = support::relation("pictures")
        .joining(|s| {
            Ok(vec![
                s.assoc("imageable")?.of("Post")?,
                s.assoc("imageable")?.of("Author")?,
            ])
        })
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "pictures".* FROM "pictures" INNER JOIN "posts" ON "posts"."id" = "pictures"."imageable_id" AND "pictures"."imageable_type" = 'Post' INNER JOIN "authors" ON "authors"."id" = "pictures"."imageable_id" AND "pictures"."imageable_type" = 'Author'"#
    );
}

#[test]
fn test_inverse_polymorphic_has_many() {
    let sql = support::relation("authors")
        .joins(&["pictures"])
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "authors".* FROM "authors" INNER JOIN "pictures" ON "pictures"."imageable_id" = "authors"."id" AND "pictures"."imageable_type" = 'Author'"#
    );
}

#[test]
fn test_polymorphic_without_of_fails() {
    let err = support::relation("pictures")
        .joining(|s| s.assoc("imageable"))
        .unwrap()
        .to_query()
        .unwrap_err();
    assert!(matches!(err, DslError::AliasResolution { .. }));

    let err = support::relation("pictures")
        .where_has(|s| Ok(s.assoc("imageable")?.col("id")?.eq(1)))
        .unwrap_err();
    assert!(matches!(err, DslError::AliasResolution { .. }));
}

#[test]
fn test_of_requires_known_model() {
    let err = support::relation("pictures")
        .joining(|s| s.assoc("imageable")?.of("Spaceship"))
        .unwrap_err();
    assert_eq!(err, DslError::UnknownRelation("Spaceship".into()));
}

#[test]
fn test_build_returns_join_expression() {
    let relation = support::relation("pictures");
    let compiled = build(&relation.scope(), |s| s.assoc("imageable")?.of("Post")).unwrap();

    match compiled {
        Some(CompiledExpression::JoinExpression(expression)) => {
            assert!(expression.is_polymorphic());
            assert_eq!(expression.path().to_string(), "imageable(Post)");
        }
        other => panic!("unexpected: {:?}", other),
    }
}

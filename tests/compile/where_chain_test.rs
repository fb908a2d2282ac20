#[path = "../support/mod.rs"]
mod support;

use insta::assert_snapshot;
use sieve::compile::{build, CompiledExpression};
use sieve::dsl::{Node, NodeExt, Scope, Table};
use sieve::error::DslError;
use sieve::schema::Record;
use sieve::value::Value;

#[test]
fn test_association_condition() {
    let sql = support::relation("posts")
        .where_has(|s| Ok(s.assoc("author")?.col("name")?.eq("Yo Gotti")))
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "posts".* FROM "posts" INNER JOIN "authors" ON "authors"."id" = "posts"."author_id" WHERE "authors"."name" = 'Yo Gotti'"#
    );
}

#[test]
fn test_nil_comparison() {
    let sql = support::relation("posts")
        .where_has(|s| Ok(s.col("published_at")?.eq(Value::Null)))
        .unwrap()
        .where_has(|s| Ok(s.col("title")?.not_eq(Value::Null)))
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "posts".* FROM "posts" WHERE "posts"."published_at" IS NULL AND "posts"."title" IS NOT NULL"#
    );
}

#[test]
fn test_record_comparison() {
    let author = Record::new("Author").with("id", 42);
    let sql = support::relation("posts")
        .where_has(|s| s.assoc("author")?.eq_record(&author))
        .unwrap()
        .to_sql()
        .unwrap();
    assert_snapshot!(sql, @r#"SELECT "posts".* FROM "posts" WHERE "posts"."author_id" = 42"#);

    let sql = support::relation("posts")
        .where_has(|s| s.assoc("author")?.ne_record(&author))
        .unwrap()
        .to_sql()
        .unwrap();
    assert_snapshot!(sql, @r#"SELECT "posts".* FROM "posts" WHERE "posts"."author_id" <> 42"#);
}

#[test]
fn test_like_or() {
    let sql = support::relation("posts")
        .where_has(|s| {
            Ok(s.col("title")?.like("%Rails%") | s.col("title")?.not_like("%Django%"))
        })
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "posts".* FROM "posts" WHERE ("posts"."title" LIKE '%Rails%' OR "posts"."title" NOT LIKE '%Django%')"#
    );
}

#[test]
fn test_not() {
    let sql = support::relation("posts")
        .where_has(|s| Ok(!(s.col("view_count")?.gt(10) & s.col("title")?.eq("x"))))
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "posts".* FROM "posts" WHERE NOT ("posts"."view_count" > 10 AND "posts"."title" = 'x')"#
    );
}

#[test]
fn test_arithmetic() {
    let sql = support::relation("posts")
        .where_has(|s| Ok((s.col("id")? + 1).gt(s.col("view_count")? * 2)))
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "posts".* FROM "posts" WHERE ("posts"."id" + 1) > ("posts"."view_count" * 2)"#
    );
}

#[test]
fn test_functions() {
    let sql = support::relation("authors")
        .where_has(|s| {
            Ok(s.coalesce([Node::from(s.col("name")?), s.quoted("anonymous")])
                .eq("Yo Gotti"))
        })
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "authors".* FROM "authors" WHERE COALESCE("authors"."name", 'anonymous') = 'Yo Gotti'"#
    );

    let sql = support::relation("authors")
        .where_has(|s| Ok(s.func("lower", [s.col("name")?]).eq("yo gotti")))
        .unwrap()
        .to_sql()
        .unwrap();
    assert_snapshot!(
        sql,
        @r#"SELECT "authors".* FROM "authors" WHERE LOWER("authors"."name") = 'yo gotti'"#
    );
}

#[test]
fn test_in_list() {
    let sql = support::relation("posts")
        .where_has(|s| Ok(s.col("id")?.in_list([1, 2, 3]) & s.col("title")?.not_in(["a", "b"])))
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "posts".* FROM "posts" WHERE "posts"."id" IN (1, 2, 3) AND "posts"."title" NOT IN ('a', 'b')"#
    );
}

#[test]
fn test_empty_in_list() {
    let sql = support::relation("posts")
        .where_has(|s| Ok(s.col("id")?.in_list(Vec::<i64>::new())))
        .unwrap()
        .to_sql()
        .unwrap();
    assert_snapshot!(sql, @r#"SELECT "posts".* FROM "posts" WHERE FALSE"#);
}

#[test]
fn test_in_subquery() {
    let authors = support::relation("authors")
        .where_has(|s| Ok(s.col("ugly")?.eq(true)))
        .unwrap()
        .selecting(|s| Ok(vec![s.col("id")?.into()]))
        .unwrap();

    let sql = support::relation("posts")
        .where_has(|s| Ok(s.col("author_id")?.in_subquery(authors.to_query()?)))
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "posts".* FROM "posts" WHERE "posts"."author_id" IN (SELECT "authors"."id" FROM "authors" WHERE "authors"."ugly" = TRUE)"#
    );
}

#[test]
fn test_exists_and_not_exists() {
    let posts = support::relation("posts");
    let outer = posts.table().clone();

    let comments = support::relation("comments")
        .where_has(|s| Ok(s.col("post_id")?.eq(outer.col("id")?)))
        .unwrap();

    let sql = posts
        .clone()
        .where_has(|s| s.exists(&comments))
        .unwrap()
        .to_sql()
        .unwrap();
    assert_snapshot!(
        sql,
        @r#"SELECT "posts".* FROM "posts" WHERE EXISTS (SELECT "comments".* FROM "comments" WHERE "comments"."post_id" = "posts"."id")"#
    );

    let sql = posts
        .where_has(|s| s.not_exists(&comments))
        .unwrap()
        .to_sql()
        .unwrap();
    assert_snapshot!(
        sql,
        @r#"SELECT "posts".* FROM "posts" WHERE NOT EXISTS (SELECT "comments".* FROM "comments" WHERE "comments"."post_id" = "posts"."id")"#
    );
}

#[test]
fn test_scalar_subselect() {
    let count = support::relation("comments")
        .selecting(|s| Ok(vec![s.func("count", [s.sql("*")])]))
        .unwrap();

    let sql = support::relation("posts")
        .where_has(|s| Ok(s.col("view_count")?.gt(s.subselect(&count)?)))
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "posts".* FROM "posts" WHERE "posts"."view_count" > (SELECT COUNT(*) FROM "comments")"#
    );
}

#[test]
fn test_column_types_are_preserved() {
    let sql = support::relation("stations")
        .where_has(|s| Ok(s.col("frequency")?.eq("99.7")))
        .unwrap()
        .to_sql()
        .unwrap();
    assert_snapshot!(sql, @r#"SELECT "stations".* FROM "stations" WHERE "stations"."frequency" = 99.7"#);

    let sql = support::relation("shows")
        .where_has(|s| Ok(s.col("frequency")?.eq(99.7)))
        .unwrap()
        .to_sql()
        .unwrap();
    assert_snapshot!(sql, @r#"SELECT "shows".* FROM "shows" WHERE "shows"."frequency" = '99.7'"#);
}

#[test]
fn test_non_finite_float_is_an_error() {
    let relation = support::relation("stations")
        .where_has(|s| Ok(s.col("frequency")?.eq(f64::NAN)))
        .unwrap();
    assert!(matches!(relation.to_sql(), Err(DslError::InvalidValue(_))));

    let relation = support::relation("stations")
        .where_has(|s| Ok(s.col("frequency")?.in_list([1.5, f64::INFINITY])))
        .unwrap();
    assert!(matches!(relation.to_sql(), Err(DslError::InvalidValue(_))));
}

#[test]
fn test_simple_table() {
    let scope = Scope::new(Table::named("widgets"));
    let compiled = build(&scope, |s| Ok(s.col("sprocket")?.eq(1) & s.col("gear")?.lt(2))).unwrap();

    match compiled {
        Some(CompiledExpression::Predicate { expr, joins }) => {
            assert_eq!(expr.to_sql(), r#""widgets"."sprocket" = 1 AND "widgets"."gear" < 2"#);
            assert!(joins.is_empty());
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_where_values_hash() {
    let relation = support::relation("posts")
        .where_has(|s| Ok(s.col("title")?.eq("Hello") & s.col("view_count")?.eq(3.0)))
        .unwrap()
        .where_has(|s| Ok(s.col("published_at")?.eq(Value::Null)))
        .unwrap()
        .where_has(|s| Ok(s.assoc("author")?.col("name")?.eq("Yo Gotti")))
        .unwrap();

    let hash = relation.where_values_hash();
    let keys: Vec<&str> = hash.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["published_at", "title", "view_count"]);
    assert_eq!(hash["view_count"], Value::Int(3));
    assert_eq!(hash["published_at"], Value::Null);
}

#[test]
fn test_build_predicate_carries_joins() {
    let relation = support::relation("posts");
    let compiled = build(&relation.scope(), |s| {
        Ok(s.assoc("author")?.col("name")?.eq("Yo Gotti"))
    })
    .unwrap();

    match compiled {
        Some(CompiledExpression::Predicate { expr, joins }) => {
            assert_eq!(expr.to_sql(), r#""authors"."name" = 'Yo Gotti'"#);
            assert_eq!(joins.len(), 1);
        }
        other => panic!("unexpected: {:?}", other),
    }
}

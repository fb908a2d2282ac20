#[path = "../support/mod.rs"]
mod support;

use insta::assert_snapshot;
use sieve::config::Settings;
use sieve::dsl::{AssociationPath, NodeExt};
use sieve::error::DslError;
use sieve::join::{JoinDependency, TableAlias};

fn deps() -> JoinDependency {
    JoinDependency::new(support::schema(), "posts", &Settings::default())
}

#[test]
fn test_same_path_resolves_to_same_alias() {
    let mut deps = deps();
    let path = AssociationPath::parse("author.comments");

    let first = deps.find_alias(&path).unwrap();
    let second = deps.find_alias(&path).unwrap();

    assert_eq!(first, second);
    assert_eq!(deps.joins().len(), 2);
}

#[test]
fn test_different_paths_to_same_relation_get_different_aliases() {
    let mut deps = deps();
    let direct = deps.find_alias(&AssociationPath::parse("comments")).unwrap();
    let through_author = deps
        .find_alias(&AssociationPath::parse("author.comments"))
        .unwrap();

    assert_ne!(direct.name(), through_author.name());
}

#[test]
fn test_alias_collision_gets_counter() {
    let mut deps = deps();
    let first = deps.find_alias(&AssociationPath::parse("author.posts")).unwrap();
    let second = deps
        .find_alias(&AssociationPath::parse("parent.author.posts"))
        .unwrap();

    assert_eq!(first, TableAlias::aliased("posts", "posts_authors"));
    assert_eq!(second, TableAlias::aliased("posts", "posts_authors_2"));
}

#[test]
fn test_repeated_condition_joins_once() {
    let sql = support::relation("posts")
        .where_has(|s| {
            let name = s.assoc("author")?.col("name")?;
            Ok(name.clone().eq("Yo Gotti") | name.eq("Jeezy"))
        })
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "posts".* FROM "posts" INNER JOIN "authors" ON "authors"."id" = "posts"."author_id" WHERE ("authors"."name" = 'Yo Gotti' OR "authors"."name" = 'Jeezy')"#
    );
}

#[test]
fn test_self_join_through_author() {
    let sql = support::relation("posts")
        .where_has(|s| Ok(s.assoc("author")?.assoc("posts")?.col("title")?.eq("Sequel")))
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "posts".* FROM "posts" INNER JOIN "authors" ON "authors"."id" = "posts"."author_id" INNER JOIN "posts" AS "posts_authors" ON "posts_authors"."author_id" = "authors"."id" WHERE "posts_authors"."title" = 'Sequel'"#
    );
}

#[test]
fn test_through_association_alias() {
    let sql = support::relation("posts")
        .joins(&["comments", "author_comments"])
        .unwrap()
        .to_sql()
        .unwrap();

    assert_snapshot!(
        sql,
        @r#"SELECT "posts".* FROM "posts" INNER JOIN "comments" ON "comments"."post_id" = "posts"."id" INNER JOIN "authors" ON "authors"."id" = "posts"."author_id" INNER JOIN "comments" AS "author_comments_posts" ON "author_comments_posts"."author_id" = "authors"."id""#
    );
}

#[test]
fn test_through_intermediate_alias() {
    let mut deps = deps();
    deps.find_alias(&AssociationPath::parse("author")).unwrap();
    let target = deps
        .find_alias(&AssociationPath::parse("author_comments"))
        .unwrap();

    let tables: Vec<String> = deps
        .joins()
        .into_iter()
        .map(|join| join.table.name().to_string())
        .collect();
    assert_eq!(tables, vec!["authors", "authors_posts_join", "comments"]);
    assert_eq!(target.name(), "comments");
}

#[test]
fn test_undeclared_association() {
    let err = deps()
        .find_alias(&AssociationPath::parse("author.editor"))
        .unwrap_err();
    assert_eq!(
        err,
        DslError::UnknownAttribute {
            relation: "authors".into(),
            name: "editor".into(),
        }
    );
}

#[test]
fn test_custom_separator() {
    let settings = Settings::from_toml_str("[aliases]\nseparator = \"__\"\n").unwrap();
    let mut deps = JoinDependency::new(support::schema(), "posts", &settings);
    let alias = deps.find_alias(&AssociationPath::parse("author.posts")).unwrap();
    assert_eq!(alias.name(), "posts__authors");
}

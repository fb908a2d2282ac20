use std::fs;
use std::path::PathBuf;

use sieve::config::{Settings, SettingsError};
use sieve::dsl::JoinKind;

fn scratch_file(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("sieve-{}-{}", std::process::id(), name));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.joins.default_kind, JoinKind::Inner);
    assert!(settings.joins.implicit);
    assert_eq!(settings.joins.max_depth, 8);
    assert_eq!(settings.aliases.separator, "_");
}

#[test]
fn test_empty_document_uses_defaults() {
    assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
}

#[test]
fn test_full_document() {
    let settings = Settings::from_toml_str(
        r#"
[joins]
default_kind = "outer"
implicit = false
max_depth = 3

[aliases]
separator = "__"
"#,
    )
    .unwrap();

    assert_eq!(settings.joins.default_kind, JoinKind::Outer);
    assert!(!settings.joins.implicit);
    assert_eq!(settings.joins.max_depth, 3);
    assert_eq!(settings.aliases.separator, "__");
}

#[test]
fn test_invalid_values() {
    let err = Settings::from_toml_str("[aliases]\nseparator = \"\"\n").unwrap_err();
    assert!(matches!(err, SettingsError::InvalidConfig(_)));

    let err = Settings::from_toml_str("[joins]\nmax_depth = 0\n").unwrap_err();
    assert!(matches!(err, SettingsError::InvalidConfig(_)));

    let err = Settings::from_toml_str("[joins]\ndefault_kind = \"cross\"\n").unwrap_err();
    assert!(matches!(err, SettingsError::ParseError(_)));
}

#[test]
fn test_load_file() {
    let path = scratch_file("load.toml", "[joins]\nmax_depth = 2\n");
    let settings = Settings::load(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(settings.joins.max_depth, 2);
    assert!(settings.joins.implicit);
}

#[test]
fn test_load_missing_file() {
    let path = std::env::temp_dir().join("sieve-does-not-exist.toml");
    match Settings::load(&path) {
        Err(SettingsError::FileNotFound(missing)) => assert_eq!(missing, path),
        other => panic!("unexpected: {:?}", other),
    }
}

//! Black-box tests over the command line interface.

use assert_cmd::Command;
use predicates::prelude::*;

const VALID: &str = r#"
namespace Shop {
    const int32_t MAX_ITEMS = 1 << 6;
    enum Status : int32_t { Open = 1, Closed = 2, }
    interface IOrder {
        string_t Id;
        Status State writable;
        dict<string_t, int32_t[]> Lines;
        void Cancel(string_t reason);
    }
}
"#;

const INVALID: &str = r#"
namespace Shop {
    interface IOrder { Unknown Child; }
}
"#;

fn minimidl() -> Command {
    Command::cargo_bin("minimidl").unwrap()
}

#[test]
fn check_accepts_a_valid_definition() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.midl");
    std::fs::write(&path, VALID).unwrap();

    minimidl().arg("check").arg(&path).assert().success();
}

#[test]
fn check_reads_stdin() {
    minimidl()
        .arg("check")
        .arg("-")
        .write_stdin(VALID)
        .assert()
        .success();
}

#[test]
fn check_reports_semantic_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.midl");
    std::fs::write(&path, INVALID).unwrap();

    minimidl()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown type `Unknown`"));
}

#[test]
fn check_reports_missing_files() {
    minimidl()
        .arg("check")
        .arg("does-not-exist.midl")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("couldn't read"));
}

#[test]
fn types_prints_ownership_classes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.midl");
    std::fs::write(&path, VALID).unwrap();

    minimidl()
        .arg("types")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("string_t"))
        .stdout(predicate::str::contains("reference-counted"))
        .stdout(predicate::str::contains("value"));
}

#[test]
fn cache_then_types_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("shop.midl");
    let cache = dir.path().join("shop.json");
    std::fs::write(&source, VALID).unwrap();

    minimidl()
        .arg("cache")
        .arg(&source)
        .arg("--output")
        .arg(&cache)
        .assert()
        .success();

    minimidl()
        .arg("types")
        .arg("--cache")
        .arg(&cache)
        .assert()
        .success()
        .stdout(predicate::str::contains("dict<string_t, int32_t[]>"));
}

#[test]
fn types_rejects_a_tampered_cache() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("shop.midl");
    let cache = dir.path().join("shop.json");
    std::fs::write(&source, VALID).unwrap();

    minimidl()
        .arg("cache")
        .arg(&source)
        .arg("-o")
        .arg(&cache)
        .assert()
        .success();

    let text = std::fs::read_to_string(&cache).unwrap();
    std::fs::write(&cache, text.replace("\"schema_version\": 1", "\"schema_version\": 42")).unwrap();

    minimidl()
        .arg("types")
        .arg("--cache")
        .arg(&cache)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("schema version"));
}

#[test]
fn cache_refuses_an_invalid_definition() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("shop.midl");
    let cache = dir.path().join("shop.json");
    std::fs::write(&source, INVALID).unwrap();

    minimidl()
        .arg("cache")
        .arg(&source)
        .arg("-o")
        .arg(&cache)
        .assert()
        .failure()
        .code(1);

    assert!(!cache.exists());
}

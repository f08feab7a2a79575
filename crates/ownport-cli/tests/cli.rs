//! Integration tests for the `ownport` binary.
//!
//! Each test migrates a file inside a fresh temporary directory and checks
//! the exit status, the status line and the written output.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use ownport_syntax::{CppProvider, SyntaxProvider};
use predicates::prelude::*;
use predicates::str::contains;
use rstest::{fixture, rstest};
use tempfile::TempDir;

const PREAMBLE: &str = "#include \"tools.h\"\n\n";

#[fixture]
fn workspace() -> TempDir {
    tempfile::tempdir().unwrap_or_else(|err| panic!("temp dir: {err}"))
}

fn write_source(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap_or_else(|err| panic!("write {name}: {err}"));
    path
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

// =============================================================================
// Successful runs
// =============================================================================

#[rstest]
fn rewrites_are_written_next_to_the_input(workspace: TempDir) {
    let input = write_source(
        &workspace,
        "node.cpp",
        "struct Node {\n    Node *next;\n};\n",
    );

    cargo_bin_cmd!("ownport")
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("Src file changed."));

    assert_eq!(
        read(&with_suffix(&input, ".tmp")),
        format!("{PREAMBLE}struct Node {{\n    boost::shared_ptr<Node> next;\n}};\n")
    );
    assert_eq!(read(&input), "struct Node {\n    Node *next;\n};\n");
}

#[rstest]
fn unchanged_sources_produce_no_output(workspace: TempDir) {
    let input = write_source(&workspace, "plain.cpp", "int main() { return 0; }\n");

    cargo_bin_cmd!("ownport")
        .arg(&input)
        .assert()
        .success()
        .stderr(contains("No changes."));

    assert!(!with_suffix(&input, ".tmp").exists());
}

#[rstest]
fn suffix_flag_selects_the_output_path(workspace: TempDir) {
    let input = write_source(&workspace, "a.cpp", "void f() { int *p = new int; }\n");

    cargo_bin_cmd!("ownport")
        .arg(&input)
        .args(["--suffix", ".migrated"])
        .assert()
        .success();

    assert!(with_suffix(&input, ".migrated").exists());
    assert!(!with_suffix(&input, ".tmp").exists());
}

#[rstest]
fn config_file_overrides_spellings(workspace: TempDir) {
    let input = write_source(&workspace, "a.cpp", "struct S {\n    int *p;\n};\n");
    let config = write_source(
        &workspace,
        "ownport.json",
        r#"{ "suffix": ".out", "rewrite": { "owning_type": "std::shared_ptr", "support_header": "memory" } }"#,
    );

    cargo_bin_cmd!("ownport")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    assert_eq!(
        read(&with_suffix(&input, ".out")),
        "#include \"memory\"\n\nstruct S {\n    std::shared_ptr<int> p;\n};\n"
    );
}

#[rstest]
fn json_trees_replace_the_parser(workspace: TempDir) {
    let source = "void run() {\n    Foo *p = new Foo;\n}\n";
    let tree = CppProvider::new()
        .and_then(|mut provider| provider.provide(source.as_bytes()))
        .unwrap_or_else(|err| panic!("lower: {err}"));
    let document = serde_json::to_string(&tree).unwrap_or_else(|err| panic!("json: {err}"));
    let input = write_source(&workspace, "run.cpp", source);
    let tree_path = write_source(&workspace, "run.json", &document);

    cargo_bin_cmd!("ownport")
        .arg(&input)
        .arg("--tree")
        .arg(&tree_path)
        .assert()
        .success()
        .stdout(contains("Src file changed."));

    assert!(read(&with_suffix(&input, ".tmp")).contains(
        "boost::shared_ptr<Foo> p = boost::shared_ptr<Foo>(new Foo, util::deleter<Foo>());"
    ));
}

#[rstest]
fn observations_are_logged_with_their_position(workspace: TempDir) {
    let input = write_source(
        &workspace,
        "array.cpp",
        "void f() {\n    int *a = new int[4];\n}\n",
    );

    cargo_bin_cmd!("ownport")
        .arg(&input)
        .args(["--log-filter", "info"])
        .assert()
        .success()
        .stderr(contains("line=2").and(contains("column=14")));
}

#[rstest]
fn lenient_mode_migrates_around_syntax_errors(workspace: TempDir) {
    let input = write_source(&workspace, "broken.cpp", "int *p = 0;\nvoid f() {\n");

    cargo_bin_cmd!("ownport")
        .arg(&input)
        .arg("--lenient")
        .assert()
        .success();
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn missing_input_argument_is_a_usage_error() {
    cargo_bin_cmd!("ownport")
        .assert()
        .code(2)
        .stderr(contains("INPUT"));
}

#[rstest]
fn unreadable_input_fails(workspace: TempDir) {
    let input = workspace.path().join("absent.cpp");

    cargo_bin_cmd!("ownport")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("failed to read"));
}

#[rstest]
fn syntax_errors_fail_in_strict_mode(workspace: TempDir) {
    let input = write_source(&workspace, "broken.cpp", "int *p = 0;\nvoid f() {\n");

    cargo_bin_cmd!("ownport")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("broken.cpp"));

    assert!(!with_suffix(&input, ".tmp").exists());
}

#[rstest]
fn malformed_trees_fail(workspace: TempDir) {
    let input = write_source(&workspace, "a.cpp", "int x;\n");
    let tree_path = write_source(&workspace, "a.json", "{ \"span\": ");

    cargo_bin_cmd!("ownport")
        .arg(&input)
        .arg("--tree")
        .arg(&tree_path)
        .assert()
        .failure();
}

#[rstest]
fn invalid_log_filters_fail(workspace: TempDir) {
    let input = write_source(&workspace, "a.cpp", "int x;\n");

    cargo_bin_cmd!("ownport")
        .arg(&input)
        .args(["--log-filter", "ownport=loud"])
        .assert()
        .failure()
        .stderr(contains("invalid log filter"));
}

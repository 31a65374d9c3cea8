//! End-to-end driver tests: real files in, real files out.

use std::path::PathBuf;

use vail_analyze::Policy;
use vail_emit::Format;
use vailc::{build, BuildOptions};

fn write_source(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn options(paths: Vec<PathBuf>, format: Format) -> BuildOptions {
    BuildOptions {
        paths,
        format,
        policy: Policy::all(),
    }
}

#[tokio::test]
async fn builds_a_valid_file_next_to_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(
        &dir,
        "greet.vail",
        "func greet(name) {\n  return \"hello \" + name\n}\ngreet(\"world\")\n",
    );

    let errors = build(options(vec![src.clone()], Format::Vim)).await;
    assert!(errors.is_empty(), "{errors:?}");

    let out = std::fs::read_to_string(dir.path().join("greet.vim")).unwrap();
    assert!(out.contains("function! s:greet(name) abort"));
    assert!(out.contains("return \"hello \" + a:name"));
    assert!(out.contains("call s:greet(\"world\")"));
}

#[tokio::test]
async fn diagnostics_point_into_the_right_file() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(&dir, "bad.vail", "let x = 1\nlet x = 2\n");

    let errors = build(options(vec![src.clone()], Format::Vim)).await;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("bad.vail:2:"), "{errors:?}");
    assert!(errors[0].contains("duplicate declaration of `x`"));
    assert!(!dir.path().join("bad.vim").exists());
}

#[tokio::test]
async fn independent_files_aggregate_their_errors() {
    let dir = tempfile::tempdir().unwrap();
    let bad_a = write_source(&dir, "a.vail", "return 1\n");
    let bad_b = write_source(&dir, "b.vail", "let y = missing\n");
    let good = write_source(&dir, "c.vail", "let z = 1\n");

    let errors = build(options(vec![bad_a, bad_b, good], Format::Vim)).await;
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert!(errors.iter().any(|e| e.contains("outside of a function")));
    assert!(errors.iter().any(|e| e.contains("undeclared variable `missing`")));
    // The good file still compiled.
    assert_eq!(
        std::fs::read_to_string(dir.path().join("c.vim")).unwrap(),
        "let s:z = 1\n"
    );
}

#[tokio::test]
async fn parse_errors_block_output_for_that_file_only() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(&dir, "broken.vail", "let ok = a == b == c\n");

    let errors = build(options(vec![src], Format::Vim)).await;
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("cannot be chained"));
    assert!(!dir.path().join("broken.vim").exists());
}

#[tokio::test]
async fn sexp_and_pretty_formats_write_their_own_extensions() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(&dir, "unit.vail", "let r = 1 + 2 * 3\n");

    let errors = build(options(vec![src.clone()], Format::Sexp)).await;
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("unit.sexp")).unwrap(),
        "(let r (+ 1 (* 2 3)))\n"
    );

    let errors = build(options(vec![src], Format::Pretty)).await;
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("unit.pretty")).unwrap(),
        "let r = 1 + 2 * 3\n"
    );
}

#[tokio::test]
async fn missing_input_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_source(&dir, "ok.vail", "let x = 1\n");
    let missing = dir.path().join("nope.vail");

    let errors = build(options(vec![missing, good], Format::Vim)).await;
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("nope.vail"));
    assert!(dir.path().join("ok.vim").exists());
}

//! The `build` operation.
//!
//! # Design
//!
//! - **One pipeline per file** - every input file gets its own chain of
//!   stage tasks (lex, parse, analyze, generate, write) with no state
//!   shared across files; files fan out through a `JoinSet`
//! - **Single-item channels** - stages are connected by bounded channels
//!   of capacity one, so a fast producer waits for its consumer; a stage
//!   ends by dropping its sender, and the closed channel propagates
//!   shutdown downstream
//! - **Atomic output** - the writer renders into a temp file in the
//!   output directory and renames it into place only after every chunk
//!   arrived cleanly; an error chunk discards the temp file
//! - **Aggregated errors** - diagnostics from independent files never
//!   block each other; the driver collects everything and reports at the
//!   end

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info};

use vail_analyze::{Analyzer, Policy};
use vail_ast::{Node, NodeIdGen, SourceMap};
use vail_emit::{Chunk, Format};
use vail_lexer::Token;
use vail_parser::collect_errors;

/// Source file extension the compiler claims.
pub const SOURCE_EXTENSION: &str = "vail";

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Files to compile; empty means discover under the current directory.
    pub paths: Vec<PathBuf>,
    pub format: Format,
    pub policy: Policy,
}

/// Compile every requested file concurrently.
///
/// Returns all error lines across all files; an empty vector means the
/// build succeeded.
pub async fn build(options: BuildOptions) -> Vec<String> {
    let paths = if options.paths.is_empty() {
        match discover_sources(Path::new(".")) {
            Ok(paths) => paths,
            Err(err) => return vec![format!("{err:#}")],
        }
    } else {
        options.paths.clone()
    };
    info!(files = paths.len(), "starting build");

    let mut pipelines = JoinSet::new();
    for path in paths {
        let format = options.format;
        let policy = options.policy.clone();
        pipelines.spawn(async move { compile_file(path, format, policy).await });
    }

    let mut errors = Vec::new();
    while let Some(joined) = pipelines.join_next().await {
        match joined {
            Ok(file_errors) => errors.extend(file_errors),
            Err(err) => errors.push(format!("pipeline task failed: {err}")),
        }
    }
    errors
}

/// Recursively find source files under `dir`, in sorted order.
fn discover_sources(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("cannot list {}", dir.display()))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    entries.sort();
    for path in entries {
        if path.is_dir() {
            found.extend(discover_sources(&path)?);
        } else if path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            found.push(path);
        }
    }
    Ok(found)
}

/// Run one file through the staged pipeline. Returns rendered error
/// lines; empty means the file compiled and its output was written.
async fn compile_file(path: PathBuf, format: Format, policy: Policy) -> Vec<String> {
    let source = match tokio::fs::read_to_string(&path).await {
        Ok(source) => source,
        Err(err) => return vec![format!("{}: {err}", path.display())],
    };
    let mut map = SourceMap::default();
    let file_id = map.add_file(path.clone(), source.clone());
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unit".to_string());
    let output_path = path.with_extension(format.extension());

    let (token_tx, mut token_rx) = mpsc::channel::<Vec<Token>>(1);
    let (unit_tx, mut unit_rx) = mpsc::channel::<Node>(1);
    let (checked_tx, mut checked_rx) =
        mpsc::channel::<Result<Node, Vec<vail_ast::Diagnostic>>>(1);
    let (chunk_tx, mut chunk_rx) = mpsc::channel::<Chunk>(1);

    let lex = tokio::spawn(async move {
        let tokens = vail_lexer::lex(&source, file_id);
        token_tx.send(tokens).await.ok();
    });

    let parse = tokio::spawn(async move {
        while let Some(tokens) = token_rx.recv().await {
            let mut ids = NodeIdGen::new();
            let unit = vail_parser::parse(&tokens, file_id, &mut ids);
            if unit_tx.send(unit).await.is_err() {
                break;
            }
        }
    });

    let analyze = tokio::spawn(async move {
        let analyzer = Analyzer::new(policy);
        while let Some(unit) = unit_rx.recv().await {
            // Parse errors end the unit here; the tree is not analyzable.
            let parse_errors = collect_errors(&unit);
            let result = if parse_errors.is_empty() {
                analyzer.analyze(&unit)
            } else {
                Err(parse_errors)
            };
            if checked_tx.send(result).await.is_err() {
                break;
            }
        }
    });

    let generate = tokio::spawn(async move {
        let mut failures: Vec<Vec<vail_ast::Diagnostic>> = Vec::new();
        while let Some(result) = checked_rx.recv().await {
            match result {
                Ok(unit) => {
                    for chunk in format.render(&unit, &stem) {
                        if chunk_tx.send(chunk).await.is_err() {
                            return failures;
                        }
                    }
                }
                Err(diags) => failures.push(diags),
            }
        }
        failures
    });

    let write = tokio::spawn(async move {
        let mut output = String::new();
        let mut received_any = false;
        while let Some(chunk) = chunk_rx.recv().await {
            match chunk {
                Ok(text) => {
                    received_any = true;
                    output.push_str(&text);
                }
                Err(err) => return Err(err.to_string()),
            }
        }
        if !received_any {
            // An upstream failure produced no chunks; nothing to write.
            return Ok(());
        }
        write_atomic(&output_path, &output).map_err(|err| format!("{err:#}"))?;
        debug!(path = %output_path.display(), "wrote output");
        Ok(())
    });

    let mut errors = Vec::new();
    for stage in [lex, parse, analyze] {
        if let Err(err) = stage.await {
            errors.push(format!("{}: stage failed: {err}", path.display()));
        }
    }
    match generate.await {
        Ok(failures) => {
            for diags in failures {
                errors.extend(diags.iter().map(|d| d.render(&map)));
            }
        }
        Err(err) => errors.push(format!("{}: stage failed: {err}", path.display())),
    }
    match write.await {
        Ok(Ok(())) => {}
        Ok(Err(message)) => errors.push(message),
        Err(err) => errors.push(format!("{}: stage failed: {err}", path.display())),
    }
    errors
}

/// Write through a temp file in the destination directory, then rename
/// into place so other processes never observe a partial file.
fn write_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("cannot create temp file in {}", dir.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("cannot write {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("cannot replace {}", path.display()))?;
    Ok(())
}

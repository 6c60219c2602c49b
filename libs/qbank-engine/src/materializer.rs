/// Source Materializer - writes a submission into its workspace
///
/// **Java:**
/// - Code without the literal `public class` is wrapped into a `TestCode`
///   class with a `main` method (a textual check, not a parse)
/// - Code with a `public class Name` declaration at the start of a line is
///   written to `Name.java`; mentions in comments or mid-line do not count
///
/// **Python / JavaScript:**
/// - Line endings are normalized to `\n`
/// - Every line is trimmed, unless the language keeps indentation
///
/// Files are always written as UTF-8.
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::workspace::Workspace;

pub const JAVA_DEFAULT_CLASS: &str = "TestCode";
const JAVA_CLASS_MARKER: &str = "public class";

lazy_static! {
    static ref JAVA_PUBLIC_CLASS: Regex =
        Regex::new(r"(?m)^[ \t]*public[ \t]+(?:(?:final|abstract)[ \t]+)?class[ \t]+([A-Za-z_$][A-Za-z0-9_$]*)")
            .expect("valid regex");
}

/// A source file written into a workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub dir: PathBuf,
    /// File stem; the launcher class for Java
    pub entry: String,
}

impl SourceFile {
    pub fn new(path: PathBuf) -> Self {
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let entry = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, dir, entry }
    }

    /// Substitute `{file}`, `{dir}` and `{class}` in a configured argv
    pub fn expand(&self, argv: &[String]) -> Vec<String> {
        let file = self.path.to_string_lossy();
        let dir = self.dir.to_string_lossy();
        argv.iter()
            .map(|arg| {
                arg.replace("{file}", &file)
                    .replace("{dir}", &dir)
                    .replace("{class}", &self.entry)
            })
            .collect()
    }
}

/// Produce the Java file text and its public class name
pub fn java_source(code: &str) -> (String, String) {
    if !code.contains(JAVA_CLASS_MARKER) {
        let wrapped = format!(
            "public class {JAVA_DEFAULT_CLASS} {{\n    public static void main(String[] args) {{\n        {code}\n    }}\n}}"
        );
        return (JAVA_DEFAULT_CLASS.to_string(), wrapped);
    }

    let class_name = JAVA_PUBLIC_CLASS
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| JAVA_DEFAULT_CLASS.to_string());
    (class_name, code.to_string())
}

/// Normalize script source before it is written
pub fn normalize_script(code: &str, preserve_indentation: bool) -> String {
    let unified = code.replace("\r\n", "\n").replace('\r', "\n");
    unified
        .split('\n')
        .map(|line| {
            if preserve_indentation {
                line.trim_end()
            } else {
                line.trim()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `contents` to `file_name` inside the workspace
pub async fn write_source(
    workspace: &Workspace,
    file_name: &str,
    contents: &str,
) -> Result<SourceFile> {
    let path = workspace.path().join(file_name);
    tokio::fs::write(&path, contents.as_bytes())
        .await
        .with_context(|| format!("Failed to write source file {}", path.display()))?;

    debug!(path = %path.display(), bytes = contents.len(), "Source materialized");
    Ok(SourceFile::new(path))
}

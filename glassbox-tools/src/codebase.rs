//! Codebase oracle tools.
//!
//! Answer technical questions about the codebase itself: where a symbol
//! is defined, what a file contains, and where a symbol is referenced.
//! Search is regex-based over the configured codebase root, with
//! bounded result counts and bounded file reads.

use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use glassbox_types::{Tool, ToolContext};

/// Directories never descended into during search.
const SKIP_DIRS: &[&str] = &[
    ".git",
    "target",
    "node_modules",
    ".next",
    "dist",
    "build",
    ".venv",
    "__pycache__",
];

/// File extensions included in search.
const SEARCH_EXTENSIONS: &[&str] = &[
    "rs", "ts", "tsx", "js", "jsx", "py", "toml", "md", "json", "yaml", "yml",
];

/// Result-count bound for symbol search.
const MAX_SYMBOL_RESULTS: usize = 20;
/// Result-count bound for reference search.
const MAX_REFERENCE_RESULTS: usize = 50;

/// Errors from codebase oracle tools.
#[derive(Debug, Error)]
pub enum CodebaseError {
    /// Filesystem access failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested path escapes the configured codebase root.
    #[error("path outside codebase root: {0}")]
    OutsideRoot(String),

    /// The requested file does not exist.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The search pattern could not be compiled.
    #[error("invalid search pattern: {0}")]
    Pattern(String),
}

/// Configuration shared by the codebase oracle tools.
#[derive(Debug, Clone)]
pub struct CodebaseConfig {
    /// Root directory of the codebase to search.
    pub root: PathBuf,
    /// Maximum lines returned by a single file read.
    pub max_file_lines: usize,
}

impl CodebaseConfig {
    /// Config rooted at the given directory, with the default read bound.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_file_lines: 500,
        }
    }
}

/// Location of a symbol in the codebase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolLocation {
    /// Path relative to the codebase root.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// Code snippet around the symbol, hit line marked with `>>>`.
    pub snippet: String,
}

/// Result of a symbol definition search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindSymbolResult {
    /// The searched symbol.
    pub symbol: String,
    /// Definition sites found.
    pub locations: Vec<SymbolLocation>,
    /// Total matches found (before the result bound).
    pub total_found: usize,
}

/// A reference to a symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    /// Path relative to the codebase root.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// The line of code containing the reference.
    pub context: String,
}

/// Result of a reference search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindReferencesResult {
    /// The searched symbol.
    pub symbol: String,
    /// Reference sites found.
    pub references: Vec<Reference>,
    /// Total matches found (before the result bound).
    pub total_found: usize,
}

/// Content of a file with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContent {
    /// Path relative to the codebase root.
    pub file_path: String,
    /// The (possibly clipped) content.
    pub content: String,
    /// 1-based first line returned.
    pub start_line: usize,
    /// 1-based last line returned.
    pub end_line: usize,
    /// Total lines in the file.
    pub total_lines: usize,
    /// Language tag derived from the extension.
    pub language: String,
}

fn language_for(path: &Path) -> String {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("rs") => "rust",
        Some("ts") | Some("tsx") => "typescript",
        Some("js") | Some("jsx") => "javascript",
        Some("py") => "python",
        Some("toml") => "toml",
        Some("md") => "markdown",
        Some("json") => "json",
        Some("yaml") | Some("yml") => "yaml",
        _ => "text",
    }
    .to_string()
}

fn should_skip(path: &Path) -> bool {
    path.components().any(|component| {
        matches!(
            component,
            Component::Normal(name) if SKIP_DIRS.iter().any(|skip| name == *skip)
        )
    })
}

/// Recursively collect searchable files under `dir`.
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), CodebaseError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        // A vanished or unreadable directory shrinks the result set; it
        // does not fail the search.
        Err(_) => return Ok(()),
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if should_skip(&path) {
            continue;
        }
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SEARCH_EXTENSIONS.contains(&ext))
        {
            files.push(path);
        }
    }
    Ok(())
}

/// Definition-site pattern for a symbol across the supported languages.
fn definition_regex(symbol: &str) -> Result<Regex, CodebaseError> {
    let escaped = regex::escape(symbol);
    let pattern = format!(
        r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?(?:fn|struct|enum|trait|mod|const|static|type|def|class|function|interface|let|var)\s+{escaped}\b"
    );
    Regex::new(&pattern).map_err(|e| CodebaseError::Pattern(e.to_string()))
}

fn word_regex(symbol: &str) -> Result<Regex, CodebaseError> {
    let escaped = regex::escape(symbol);
    Regex::new(&format!(r"\b{escaped}\b")).map_err(|e| CodebaseError::Pattern(e.to_string()))
}

/// Snippet of `context` lines around a 1-based hit line, hit marked `>>>`.
fn snippet(lines: &[&str], line_num: usize, context: usize) -> String {
    let start = line_num.saturating_sub(context + 1);
    let end = (line_num + context).min(lines.len());
    (start..end)
        .map(|i| {
            let marker = if i + 1 == line_num { ">>> " } else { "    " };
            format!("{marker}{}: {}", i + 1, lines[i])
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

fn find_definitions(
    config: &CodebaseConfig,
    symbol: &str,
) -> Result<FindSymbolResult, CodebaseError> {
    let pattern = definition_regex(symbol)?;
    let mut files = Vec::new();
    collect_files(&config.root, &mut files)?;
    files.sort();

    let mut locations = Vec::new();
    let mut total_found = 0;
    for path in files {
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        let lines: Vec<&str> = content.lines().collect();
        for (idx, line) in lines.iter().enumerate() {
            if pattern.is_match(line) {
                total_found += 1;
                if locations.len() < MAX_SYMBOL_RESULTS {
                    locations.push(SymbolLocation {
                        file: relative_path(&config.root, &path),
                        line: idx + 1,
                        snippet: snippet(&lines, idx + 1, 2),
                    });
                }
            }
        }
    }

    Ok(FindSymbolResult {
        symbol: symbol.to_string(),
        locations,
        total_found,
    })
}

fn find_usages(
    config: &CodebaseConfig,
    symbol: &str,
) -> Result<FindReferencesResult, CodebaseError> {
    let word = word_regex(symbol)?;
    let definition = definition_regex(symbol)?;
    let mut files = Vec::new();
    collect_files(&config.root, &mut files)?;
    files.sort();

    let mut references = Vec::new();
    let mut total_found = 0;
    for path in files {
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        for (idx, line) in content.lines().enumerate() {
            if word.is_match(line) && !definition.is_match(line) {
                total_found += 1;
                if references.len() < MAX_REFERENCE_RESULTS {
                    references.push(Reference {
                        file: relative_path(&config.root, &path),
                        line: idx + 1,
                        context: line.trim_end().to_string(),
                    });
                }
            }
        }
    }

    Ok(FindReferencesResult {
        symbol: symbol.to_string(),
        references,
        total_found,
    })
}

fn read_file(
    config: &CodebaseConfig,
    file_path: &str,
    start_line: Option<usize>,
    end_line: Option<usize>,
) -> Result<FileContent, CodebaseError> {
    let requested = Path::new(file_path);
    if requested.is_absolute()
        || requested
            .components()
            .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(CodebaseError::OutsideRoot(file_path.to_string()));
    }

    let full_path = config.root.join(requested);
    if !full_path.is_file() {
        return Err(CodebaseError::NotFound(file_path.to_string()));
    }

    let content = std::fs::read_to_string(&full_path)?;
    let lines: Vec<&str> = content.lines().collect();
    let total_lines = lines.len();

    let start = start_line.unwrap_or(1).max(1);
    let requested_end = end_line.unwrap_or(total_lines).min(total_lines);
    // Clip the window to the configured read bound.
    let end = requested_end.min(start.saturating_add(config.max_file_lines).saturating_sub(1));

    let selected = if start > requested_end {
        String::new()
    } else {
        lines[start - 1..end].join("\n")
    };

    Ok(FileContent {
        file_path: file_path.to_string(),
        content: selected,
        start_line: start,
        end_line: end,
        total_lines,
        language: language_for(requested),
    })
}

/// Arguments for [`FindSymbol`] and [`FindReferences`].
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SymbolArgs {
    /// The function, struct, class, or variable name to look up.
    pub symbol_name: String,
}

/// Arguments for [`GetFileContent`].
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FileContentArgs {
    /// Path relative to the codebase root.
    pub file_path: String,
    /// 1-based first line to read (default 1).
    pub start_line: Option<usize>,
    /// 1-based last line to read (default end of file).
    pub end_line: Option<usize>,
}

/// Tool locating where a symbol is defined.
pub struct FindSymbol {
    config: Arc<CodebaseConfig>,
}

impl FindSymbol {
    /// Create the tool over a codebase config.
    pub fn new(config: Arc<CodebaseConfig>) -> Self {
        Self { config }
    }
}

impl Tool for FindSymbol {
    const NAME: &'static str = "find_symbol";
    type Args = SymbolArgs;
    type Output = FindSymbolResult;
    type Error = CodebaseError;

    fn description(&self) -> &str {
        "Find where a function, struct, or type is defined in the codebase."
    }

    fn call(
        &self,
        args: SymbolArgs,
        _ctx: &ToolContext,
    ) -> impl Future<Output = Result<FindSymbolResult, Self::Error>> + Send {
        let config = self.config.clone();
        async move { find_definitions(&config, &args.symbol_name) }
    }
}

/// Tool reading a file with line bounds.
pub struct GetFileContent {
    config: Arc<CodebaseConfig>,
}

impl GetFileContent {
    /// Create the tool over a codebase config.
    pub fn new(config: Arc<CodebaseConfig>) -> Self {
        Self { config }
    }
}

impl Tool for GetFileContent {
    const NAME: &'static str = "get_file_content";
    type Args = FileContentArgs;
    type Output = FileContent;
    type Error = CodebaseError;

    fn description(&self) -> &str {
        "Read and explain a file from the codebase, optionally bounded to a line range."
    }

    fn call(
        &self,
        args: FileContentArgs,
        _ctx: &ToolContext,
    ) -> impl Future<Output = Result<FileContent, Self::Error>> + Send {
        let config = self.config.clone();
        async move { read_file(&config, &args.file_path, args.start_line, args.end_line) }
    }
}

/// Tool finding usages of a symbol (definition lines excluded).
pub struct FindReferences {
    config: Arc<CodebaseConfig>,
}

impl FindReferences {
    /// Create the tool over a codebase config.
    pub fn new(config: Arc<CodebaseConfig>) -> Self {
        Self { config }
    }
}

impl Tool for FindReferences {
    const NAME: &'static str = "find_references";
    type Args = SymbolArgs;
    type Output = FindReferencesResult;
    type Error = CodebaseError;

    fn description(&self) -> &str {
        "Find where a symbol is used across the codebase to understand how components connect."
    }

    fn call(
        &self,
        args: SymbolArgs,
        _ctx: &ToolContext,
    ) -> impl Future<Output = Result<FindReferencesResult, Self::Error>> + Send {
        let config = self.config.clone();
        async move { find_usages(&config, &args.symbol_name) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (tempfile::TempDir, Arc<CodebaseConfig>) {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(
            dir.path().join("src/main.rs"),
            "fn main() {\n    run_server();\n}\n\nfn run_server() {\n    println!(\"up\");\n}\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("src/lib.rs"),
            "pub struct Server;\n\nimpl Server {\n    pub fn start(&self) {}\n}\n",
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("target/debug")).unwrap();
        std::fs::write(dir.path().join("target/debug/skip.rs"), "fn run_server() {}\n").unwrap();
        let config = Arc::new(CodebaseConfig::new(dir.path()));
        (dir, config)
    }

    #[test]
    fn finds_definition_with_marked_snippet() {
        let (_dir, config) = fixture();
        let result = find_definitions(&config, "run_server").unwrap();
        assert_eq!(result.total_found, 1);
        assert_eq!(result.locations[0].file, "src/main.rs");
        assert_eq!(result.locations[0].line, 5);
        assert!(result.locations[0].snippet.contains(">>> 5: fn run_server()"));
    }

    #[test]
    fn skip_dirs_are_not_searched() {
        let (_dir, config) = fixture();
        let result = find_definitions(&config, "run_server").unwrap();
        assert!(result.locations.iter().all(|l| !l.file.contains("target")));
    }

    #[test]
    fn finds_struct_definition() {
        let (_dir, config) = fixture();
        let result = find_definitions(&config, "Server").unwrap();
        assert_eq!(result.total_found, 1);
        assert_eq!(result.locations[0].file, "src/lib.rs");
    }

    #[test]
    fn references_exclude_definition_lines() {
        let (_dir, config) = fixture();
        let result = find_usages(&config, "run_server").unwrap();
        assert_eq!(result.total_found, 1);
        assert_eq!(result.references[0].file, "src/main.rs");
        assert_eq!(result.references[0].line, 2);
        assert!(result.references[0].context.contains("run_server()"));
    }

    #[test]
    fn reads_file_with_line_window() {
        let (_dir, config) = fixture();
        let content = read_file(&config, "src/main.rs", Some(5), Some(7)).unwrap();
        assert_eq!(content.start_line, 5);
        assert_eq!(content.end_line, 7);
        assert_eq!(content.total_lines, 7);
        assert_eq!(content.language, "rust");
        assert!(content.content.starts_with("fn run_server()"));
    }

    #[test]
    fn read_clips_to_max_file_lines() {
        let dir = tempfile::tempdir().unwrap();
        let long = (1..=50).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        std::fs::write(dir.path().join("big.md"), long).unwrap();
        let config = CodebaseConfig {
            root: dir.path().to_path_buf(),
            max_file_lines: 10,
        };
        let content = read_file(&config, "big.md", None, None).unwrap();
        assert_eq!(content.start_line, 1);
        assert_eq!(content.end_line, 10);
        assert_eq!(content.total_lines, 50);
    }

    #[test]
    fn traversal_is_rejected() {
        let (_dir, config) = fixture();
        assert!(matches!(
            read_file(&config, "../etc/passwd", None, None),
            Err(CodebaseError::OutsideRoot(_))
        ));
        assert!(matches!(
            read_file(&config, "/etc/passwd", None, None),
            Err(CodebaseError::OutsideRoot(_))
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let (_dir, config) = fixture();
        assert!(matches!(
            read_file(&config, "src/nope.rs", None, None),
            Err(CodebaseError::NotFound(_))
        ));
    }
}

//! Transformation functions for GitHub REST API responses
//!
//! Everything needed to turn a repository URL plus the raw metadata, tree and
//! blob payloads into a [`RepoContext`], without touching the network.

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Blobs whose decoded payload is larger than this are left out of the context.
pub const MAX_FILE_BYTES: usize = 100_000;

/// Branch used when the repository metadata does not name one.
pub const DEFAULT_BRANCH: &str = "main";

/// Path segments that exclude a tree entry regardless of its extension.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "dist",
    "build",
];

/// Extensions (lowercase, with the leading dot) considered text.
pub const TEXT_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".ts", ".tsx", ".jsx", ".java", ".go", ".rs", ".rb", ".php", ".c", ".h", ".cpp",
    ".hpp", ".cs", ".swift", ".kt", ".scala", ".sh", ".bash", ".zsh", ".yaml", ".yml", ".json",
    ".toml", ".ini", ".md", ".txt", ".html", ".css", ".scss", ".vue", ".svelte", ".rkt", ".r",
    ".sql", ".graphql", ".proto", ".mdx", ".env",
];

// =============================================================================
// API Response Types (Deserialization)
// =============================================================================

/// Repository metadata from `GET /repos/{owner}/{repo}`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GitHubRepository {
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// Recursive tree from `GET /repos/{owner}/{repo}/git/trees/{branch}`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GitHubTree {
    #[serde(default)]
    pub tree: Vec<GitHubTreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

/// A single entry of a tree listing
#[derive(Debug, Deserialize, Clone)]
pub struct GitHubTreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub sha: String,
}

/// Blob payload from `GET /repos/{owner}/{repo}/git/blobs/{sha}`
#[derive(Debug, Deserialize, Clone)]
pub struct GitHubBlob {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: String,
}

// =============================================================================
// Domain Models
// =============================================================================

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

/// Path and text content of a file collected from the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileContent {
    pub path: String,
    pub content: String,
}

/// Repository metadata and the text files handed to the model.
#[derive(Debug, Clone, Serialize)]
pub struct RepoContext {
    pub owner: String,
    pub repo: String,
    pub default_branch: String,
    /// Files in tree listing order.
    pub files: Vec<FileContent>,
}

/// Error returned when a repository URL can't be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoUrlError {
    #[error("Invalid GitHub repo URL: {0}")]
    Invalid(String),
}

// =============================================================================
// Transformation Functions
// =============================================================================

const URL_PREFIXES: &[&str] = &["https://github.com/", "http://github.com/", "git@github.com:"];

/// Parse a GitHub repository URL into its owner and name.
///
/// Accepts `https://github.com/<owner>/<repo>[.git]` and
/// `git@github.com:<owner>/<repo>[.git]`. Scheme, host and the `.git` suffix
/// match case-insensitively; owner and repo keep their casing.
pub fn parse_github_url(repo_url: &str) -> Result<RepoRef, RepoUrlError> {
    let invalid = || RepoUrlError::Invalid(repo_url.to_string());

    let trimmed = repo_url.trim();
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

    let rest = URL_PREFIXES
        .iter()
        .find_map(|prefix| strip_prefix_ignore_case(trimmed, prefix))
        .ok_or_else(invalid)?;

    let (owner, repo) = rest.split_once('/').ok_or_else(invalid)?;
    let repo = strip_suffix_ignore_case(repo, ".git").unwrap_or(repo);

    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(invalid());
    }

    Ok(RepoRef {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let split = text.len().checked_sub(suffix.len())?;
    let tail = text.get(split..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &text[..split])
}

/// Whether any segment of `path` is a skipped directory.
pub fn is_skipped_path(path: &str) -> bool {
    path.split('/').any(|segment| SKIP_DIRS.contains(&segment))
}

/// Whether a path looks like a text file.
///
/// Files without an extension (`Dockerfile`, `Makefile`) count as text.
pub fn is_likely_text(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);

    match file_name.rsplit_once('.') {
        None => true,
        Some((_, ext)) => {
            let ext = format!(".{}", ext.to_lowercase());
            TEXT_EXTENSIONS.contains(&ext.as_str())
        }
    }
}

/// Select the tree entries worth downloading, keeping tree order.
pub fn select_text_blobs(tree: &GitHubTree) -> Vec<&GitHubTreeEntry> {
    tree.tree
        .iter()
        .filter(|entry| entry.entry_type == "blob")
        .filter(|entry| !is_skipped_path(&entry.path) && is_likely_text(&entry.path))
        .collect()
}

/// Decode a blob payload into text.
///
/// Returns `None` for non-base64 encodings, undecodable payloads and payloads
/// over [`MAX_FILE_BYTES`]. Invalid UTF-8 is replaced, never rejected.
pub fn decode_blob(blob: &GitHubBlob) -> Option<String> {
    if blob.encoding != "base64" {
        return None;
    }

    // GitHub wraps base64 content at 60 columns.
    let compact: String = blob
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let raw = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .ok()?;

    if raw.len() > MAX_FILE_BYTES {
        return None;
    }

    Some(String::from_utf8_lossy(&raw).into_owned())
}

/// Branch to read the tree from.
pub fn resolve_default_branch(repository: &GitHubRepository) -> String {
    repository
        .default_branch
        .as_deref()
        .filter(|branch| !branch.is_empty())
        .unwrap_or(DEFAULT_BRANCH)
        .to_string()
}

use crate::config::Settings;
use crate::prelude::*;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;

// Import domain models and pure functions from core
use anytool_core::github::{
    decode_blob, parse_github_url, resolve_default_branch, select_text_blobs, FileContent,
    GitHubBlob, GitHubRepository, GitHubTree, GitHubTreeEntry, RepoContext, RepoRef,
};

/// Create the HTTP client used for every GitHub API call
pub fn create_github_client(settings: &Settings) -> Result<reqwest::Client> {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github.v3+json"),
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(concat!("anytool/", env!("CARGO_PKG_VERSION")))
        .timeout(settings.http_timeout())
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}

/// Fetch a public repository's text files.
///
/// Parses the URL, resolves the default branch, lists the recursive tree and
/// downloads every eligible blob. The returned files follow tree order.
pub async fn fetch_repo_context(
    client: &reqwest::Client,
    settings: &Settings,
    repo_url: &str,
) -> AppResult<RepoContext> {
    let RepoRef { owner, repo } = parse_github_url(repo_url)?;
    let base = f!("{}/repos/{}/{}", settings.github_api_url(), owner, repo);

    let metadata: GitHubRepository = get_json(client.get(&base)).await?;
    let default_branch = resolve_default_branch(&metadata);

    let tree: GitHubTree = get_json(
        client
            .get(f!("{base}/git/trees/{default_branch}"))
            .query(&[("recursive", "1")]),
    )
    .await?;

    if tree.truncated {
        log::warn!("Tree listing for {owner}/{repo} is truncated, some files will be missing");
    }

    let entries: Vec<GitHubTreeEntry> = select_text_blobs(&tree).into_iter().cloned().collect();
    log::debug!(
        "{owner}/{repo}@{default_branch}: {} tree entries, {} candidate blobs",
        tree.tree.len(),
        entries.len()
    );

    let files: Vec<Option<FileContent>> = stream::iter(entries)
        .map(|entry| {
            let client = client.clone();
            let base = base.clone();
            async move { fetch_file(&client, &base, entry).await }
        })
        .buffered(settings.blob_concurrency())
        .try_collect()
        .await?;
    let files: Vec<FileContent> = files.into_iter().flatten().collect();

    log::info!("Loaded {} text files from {owner}/{repo}", files.len());

    Ok(RepoContext {
        owner,
        repo,
        default_branch,
        files,
    })
}

/// Download one blob, or `None` when it is not usable text.
async fn fetch_file(
    client: &reqwest::Client,
    base: &str,
    entry: GitHubTreeEntry,
) -> AppResult<Option<FileContent>> {
    let blob: GitHubBlob = get_json(client.get(f!("{base}/git/blobs/{}", entry.sha))).await?;

    let Some(content) = decode_blob(&blob) else {
        log::debug!("Skipping {}: not decodable or too large", entry.path);
        return Ok(None);
    };

    Ok(Some(FileContent {
        path: entry.path,
        content,
    }))
}

async fn get_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> AppResult<T> {
    let response = request.send().await?;

    if !response.status().is_success() {
        return Err(Error::UpstreamFetch(f!(
            "GitHub API returned status {} for {}",
            response.status(),
            response.url()
        )));
    }

    Ok(response.json::<T>().await?)
}

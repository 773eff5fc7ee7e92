//! Dataset retrieval.
//!
//! Stages the raw CSV into the local data directory before an analysis run.
//! A source is either an HTTP(S) URL or a local file or directory, such as
//! the folder a dataset download tool unpacked into. The analysis itself
//! only ever reads the staged local file.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Downloads `url` and returns the response body.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// True for `.csv` and `.csv.gz` file names.
fn is_dataset_file(path: &Path) -> bool {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    name.ends_with(".csv") || name.ends_with(".csv.gz")
}

/// Last path segment of a URL, ignoring any query string.
fn url_file_name(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let name = parsed.path_segments()?.last()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Copies dataset files from a local file or directory into `data_dir`.
fn stage_local(source: &Path, data_dir: &Path) -> Result<Vec<PathBuf>> {
    let candidates: Vec<PathBuf> = if source.is_dir() {
        let mut files = Vec::new();
        for entry in fs::read_dir(source)? {
            let path = entry?.path();
            if path.is_file() && is_dataset_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        files
    } else {
        vec![source.to_path_buf()]
    };

    let mut staged = Vec::new();
    for src in candidates {
        let name = src
            .file_name()
            .ok_or_else(|| anyhow!("'{}' has no file name", src.display()))?;
        let dest = data_dir.join(name);

        // copying a file onto itself truncates it
        if dest.exists() && fs::canonicalize(&src)? == fs::canonicalize(&dest)? {
            info!(path = %dest.display(), "Dataset file already staged");
            staged.push(dest);
            continue;
        }

        info!(from = %src.display(), to = %dest.display(), "Copying dataset file");
        fs::copy(&src, &dest)
            .with_context(|| format!("Failed to copy '{}'", src.display()))?;
        staged.push(dest);
    }

    Ok(staged)
}

/// Stages a dataset from `source` into `data_dir` and returns the staged paths.
///
/// URLs are downloaded with `client`; anything else is treated as a local
/// path. A directory contributes every `.csv`/`.csv.gz` file directly inside it.
#[tracing::instrument(skip(client, data_dir), fields(data_dir = %data_dir.display()))]
pub async fn stage_dataset<C: HttpClient>(
    client: &C,
    source: &str,
    data_dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create '{}'", data_dir.display()))?;

    let staged = if source.starts_with("http://") || source.starts_with("https://") {
        let name = url_file_name(source).unwrap_or_else(|| "dataset.csv".to_string());
        let bytes = fetch_bytes(client, source).await?;
        debug!(bytes = bytes.len(), "Dataset downloaded");

        let dest = data_dir.join(name);
        fs::write(&dest, &bytes)
            .with_context(|| format!("Failed to write '{}'", dest.display()))?;
        vec![dest]
    } else {
        stage_local(Path::new(source), data_dir)?
    };

    if staged.is_empty() {
        return Err(anyhow!("No CSV files found in '{}'", source));
    }

    info!(files = staged.len(), "Dataset staged");
    Ok(staged)
}

//! Archive download over HTTP
//!
//! Downloads stream to a file inside the caller's scratch directory. All
//! failures surface as typed network errors; a 404 on a GitHub codeload URL
//! is mapped to a repository-not-found error since that is what it means in
//! practice.

use futures_util::StreamExt;
use quartex_core::error::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default network timeout for downloads
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// HTTP downloader for source archives
pub struct ArchiveDownloader {
    client: reqwest::Client,
}

impl ArchiveDownloader {
    /// Create a downloader with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a downloader with a caller-configured timeout
    ///
    /// A timeout surfaces as a network error, not a distinct error kind.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quartex/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Build the codeload tarball URL for a GitHub ref
    pub fn github_archive_url(owner: &str, repo: &str, git_ref: &str) -> String {
        format!("https://codeload.github.com/{owner}/{repo}/tar.gz/{git_ref}")
    }

    /// Download a GitHub tarball for a resolved ref into `dest_dir`
    pub async fn download_github_archive(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        let url = Self::github_archive_url(owner, repo, git_ref);
        info!("Downloading {}/{}@{}", owner, repo, git_ref);
        match self.download_url(&url, dest_dir).await {
            Err(Error::Network {
                status: Some(404), ..
            }) => Err(Error::repository_not_found(format!(
                "{owner}/{repo} (ref {git_ref})"
            ))),
            Err(Error::Network {
                status: Some(status @ (401 | 403)),
                ..
            }) => Err(Error::authentication(format!(
                "access to {owner}/{repo} denied (HTTP {status})"
            ))),
            other => other,
        }
    }

    /// Download a URL into `dest_dir`, returning the downloaded file path
    pub async fn download_url(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        debug!("Downloading archive from: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::network(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network_with_status(
                format!("download from {url} failed"),
                status.as_u16(),
            ));
        }

        let file_name = url
            .rsplit('/')
            .next()
            .filter(|n| !n.is_empty())
            .unwrap_or("archive.tar.gz");
        let dest_path = dest_dir.join(file_name);

        let mut file = std::fs::File::create(&dest_path)?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| Error::network(format!("download from {url} aborted: {e}")))?;
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
        }

        debug!("Downloaded {} bytes to {:?}", downloaded, dest_path);
        Ok(dest_path)
    }
}

//! Registry snapshot loading
//!
//! The registry is an external, read-only catalogue of known extension
//! repositories, fetched as a JSON snapshot keyed by `owner/repo`. Snapshots
//! are cached on disk for a TTL; when the network fails an expired cache is
//! served as a fallback rather than aborting.

use quartex_core::error::{Error, Result};
use quartex_core::types::registry::RegistrySnapshot;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default registry repository (`owner/repo` on GitHub)
const DEFAULT_REGISTRY_REPO: &str = "quartex-dev/registry";
const GITHUB_RAW_URL: &str = "https://raw.githubusercontent.com";
const CACHE_TTL: Duration = Duration::from_secs(3600); // 1 hour
const SNAPSHOT_FILE: &str = "registry.json";

/// Registry snapshot client with a TTL file cache
pub struct RegistryClient {
    repo: String,
    branch: String,
    cache_dir: PathBuf,
    timeout: Duration,
}

impl RegistryClient {
    /// Create a client against the default registry repository
    ///
    /// The cache lives under the user cache directory
    /// (`~/.cache/quartex/registry` on Linux).
    pub fn new() -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| Error::extension("could not determine user cache directory"))?
            .join("quartex/registry");
        Ok(Self {
            repo: DEFAULT_REGISTRY_REPO.to_string(),
            branch: "main".to_string(),
            cache_dir,
            timeout: Duration::from_secs(30),
        })
    }

    /// Override the registry repository (`owner/repo`)
    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = repo.into();
        self
    }

    /// Override the cache directory
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Override the network timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn snapshot_url(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            GITHUB_RAW_URL, self.repo, self.branch, SNAPSHOT_FILE
        )
    }

    fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(SNAPSHOT_FILE)
    }

    /// Check if a cached file is still within the TTL
    fn is_cache_valid(path: &Path) -> bool {
        if let Ok(metadata) = std::fs::metadata(path) {
            if let Ok(modified) = metadata.modified() {
                if let Ok(elapsed) = modified.elapsed() {
                    return elapsed < CACHE_TTL;
                }
            }
        }
        false
    }

    /// Load the registry snapshot, fetching when the cache is stale
    ///
    /// Falls back to an expired cache when the fetch fails; only errors when
    /// neither the network nor any cache can produce a snapshot.
    pub async fn load(&self) -> Result<RegistrySnapshot> {
        std::fs::create_dir_all(&self.cache_dir)?;
        let cache_path = self.cache_path();

        let content = if Self::is_cache_valid(&cache_path) {
            debug!("Using cached registry snapshot");
            std::fs::read_to_string(&cache_path)?
        } else {
            debug!("Fetching fresh registry snapshot");
            match self.fetch().await {
                Ok(content) => {
                    std::fs::write(&cache_path, &content)?;
                    info!("Cached registry snapshot for future use");
                    content
                }
                Err(e) => {
                    warn!("Failed to fetch registry: {}. Trying cache...", e);
                    if cache_path.exists() {
                        warn!("Using expired registry cache as fallback");
                        std::fs::read_to_string(&cache_path)?
                    } else {
                        return Err(e);
                    }
                }
            }
        };

        let snapshot: RegistrySnapshot = serde_json::from_str(&content)?;
        debug!("Loaded registry snapshot with {} entries", snapshot.len());
        Ok(snapshot)
    }

    /// Fetch the snapshot from the network
    async fn fetch(&self) -> Result<String> {
        let url = self.snapshot_url();
        debug!("Fetching registry from: {}", url);

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::network(format!("failed to create HTTP client: {e}")))?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::network(format!("registry fetch failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network_with_status(
                format!("registry fetch from {url} failed"),
                status.as_u16(),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| Error::network(format!("registry fetch failed: {e}")))
    }

    /// Remove the cached snapshot so the next load fetches fresh
    pub fn invalidate_cache(&self) -> Result<()> {
        let cache_path = self.cache_path();
        if cache_path.exists() {
            std::fs::remove_file(&cache_path)?;
            info!("Invalidated registry cache");
        }
        Ok(())
    }
}

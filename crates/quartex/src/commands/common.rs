//! Shared command plumbing

use quartex_core::types::registry::RegistrySnapshot;
use quartex_staging::{RegistryClient, StageOptions};
use std::time::Duration;
use tracing::warn;

use crate::cli::NetworkArgs;

pub fn stage_options(network: &NetworkArgs) -> StageOptions {
    StageOptions {
        timeout: Some(Duration::from_secs(network.timeout)),
    }
}

/// Load the registry snapshot, best-effort
///
/// Install-style commands only need the registry for ref resolution, so a
/// failure here degrades to `None` with a warning instead of aborting.
pub async fn load_registry(network: &NetworkArgs) -> Option<RegistrySnapshot> {
    let client = match RegistryClient::new() {
        Ok(client) => client,
        Err(e) => {
            warn!("Registry unavailable: {}", e);
            return None;
        }
    };

    let mut client = client.with_timeout(Duration::from_secs(network.timeout));
    if let Some(repo) = &network.registry_repo {
        client = client.with_repo(repo.clone());
    }
    if let Some(cache_dir) = &network.cache_dir {
        client = client.with_cache_dir(cache_dir.clone());
    }

    match client.load().await {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!("Failed to load registry: {}", e);
            None
        }
    }
}

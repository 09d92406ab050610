//! Certificate store provider implementations

pub mod aws;
pub mod memory;

pub use aws::IamCertificateStore;
pub use memory::InMemoryCertificateStore;

use crate::{CertificateStoreService, ProviderConfig, Result};
use std::sync::Arc;
use tracing::info;

/// Builds the provider selected in configuration.
///
/// # Errors
/// Fails when a snapshot file cannot be loaded.
pub async fn from_config(config: &ProviderConfig) -> Result<Arc<dyn CertificateStoreService>> {
    match config {
        ProviderConfig::Iam(iam_config) => {
            info!(region = ?iam_config.region, "Initializing AWS IAM certificate store");
            let provider = IamCertificateStore::new(iam_config.clone()).await?;
            Ok(Arc::new(provider))
        }
        ProviderConfig::Snapshot(snapshot) => {
            info!(path = %snapshot.path.display(), "Loading certificate store snapshot");
            let provider = InMemoryCertificateStore::from_snapshot_file(&snapshot.path)?;
            Ok(Arc::new(provider))
        }
    }
}

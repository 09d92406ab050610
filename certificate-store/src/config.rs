//! Configuration for the certificate store

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `IAM_CERTS__PROVIDER__TYPE=snapshot`.
pub const ENV_PREFIX: &str = "IAM_CERTS";

/// Default configuration file looked up when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "iam-certs.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificateStoreConfig {
    /// Active provider
    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Iam(IamConfig),
    Snapshot(SnapshotConfig),
}

/// AWS IAM connection settings. Anything left unset falls back to the SDK
/// default provider chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IamConfig {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
}

/// JSON snapshot of `GetServerCertificate` responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    pub path: PathBuf,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Iam(IamConfig::default())
    }
}

impl CertificateStoreConfig {
    /// Loads the optional configuration file, then applies `IAM_CERTS__*`
    /// environment overrides. The provider type defaults to `iam`, so
    /// `IAM_CERTS__PROVIDER__REGION` alone selects IAM in that region.
    ///
    /// # Errors
    /// Returns [`crate::CertificateError::Configuration`] when a source cannot
    /// be parsed or the merged values do not describe a provider.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_from(file, environment())
    }

    fn load_from(file: Option<&Path>, env: config::Environment) -> Result<Self> {
        let file = file.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        let settings = config::Config::builder()
            .set_default("provider.type", "iam")?
            .add_source(config::File::from(file).required(false))
            .add_source(env)
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}

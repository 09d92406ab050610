//! # Certificate Store
//!
//! Read-only access to TLS server certificates stored in the AWS IAM
//! certificate store.
//!
//! ## Components:
//! - [`CertificateRecord`]: metadata, PEM body and chain of one stored certificate
//! - [`CertificateDirectory`]: lists and filters certificates through a
//!   [`CertificateStoreService`]
//!
//! ## Providers:
//! - AWS IAM ([`IamCertificateStore`])
//! - In-memory, optionally loaded from a JSON snapshot ([`InMemoryCertificateStore`])
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use certificate_store::{CertificateDirectory, CertificateFilter, IamCertificateStore, IamConfig};
//!
//! # async fn run() -> certificate_store::Result<()> {
//! let store = IamCertificateStore::new(IamConfig::default()).await?;
//! let directory = CertificateDirectory::new(Arc::new(store));
//!
//! let mut listing = directory.list_certificates(CertificateFilter::default()).await?;
//! while let Some(certificate) = listing.next().await {
//!     let certificate = certificate?;
//!     println!("{} expires {}", certificate, certificate.expiration());
//! }
//! # Ok(())
//! # }
//! ```

pub mod arn;
pub mod config;
pub mod directory;
pub mod error;
pub mod providers;
pub mod record;

pub use arn::looks_like_server_certificate_arn;
pub use crate::config::*;
pub use directory::{CertificateDirectory, CertificateFilter, CertificateListing};
pub use error::*;
pub use providers::{IamCertificateStore, InMemoryCertificateStore};
pub use record::{sort_by_upload_date, CertificateRecord, RawCertificateEntry};

use async_trait::async_trait;

/// Result type for certificate store operations
pub type Result<T> = std::result::Result<T, CertificateError>;

/// The external store holding server certificates.
///
/// Implementations own transport, credentials and pagination. Every call is
/// a fresh request; nothing is cached on this side of the seam.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CertificateStoreService: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Every server certificate in the store, in store order.
    ///
    /// Stores whose listing omits the PEM payload return entries without
    /// `CertificateBody`; the directory describes those by name only when a
    /// caller reaches them.
    async fn list_all_server_certificates(&self) -> Result<Vec<RawCertificateEntry>>;

    /// A single server certificate by name.
    ///
    /// # Errors
    /// [`CertificateError::NotFound`] when the store has no certificate with
    /// that name, [`CertificateError::Service`] for any other failure.
    async fn get_server_certificate_by_name(&self, name: &str) -> Result<RawCertificateEntry>;
}

//! Read-only queries over a certificate store

use crate::{CertificateError, CertificateRecord, CertificateStoreService, RawCertificateEntry, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Which certificates a listing yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateFilter {
    /// Drop certificates that are expired when they are reached
    pub valid_only: bool,
    /// Exact, case-sensitive certificate name
    pub name: Option<String>,
}

impl Default for CertificateFilter {
    fn default() -> Self {
        Self {
            valid_only: true,
            name: None,
        }
    }
}

impl CertificateFilter {
    /// Every certificate, expired or not.
    pub fn all() -> Self {
        Self {
            valid_only: false,
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn include_expired(mut self) -> Self {
        self.valid_only = false;
        self
    }

    pub fn matches(&self, record: &CertificateRecord, now: DateTime<Utc>) -> bool {
        if let Some(name) = &self.name {
            if record.name() != name {
                return false;
            }
        }
        !self.valid_only || record.is_valid_at(now)
    }
}

/// Lazily completed, normalized and filtered view of one store listing.
///
/// Entries are handled only as [`CertificateListing::next`] is awaited.
/// Entries whose name cannot match the filter are skipped unread; entries
/// listed without their PEM payload are described by name at that point,
/// so a caller that stops early never pays for the rest. Validity is judged
/// against the clock when each record is reached. A malformed entry or a
/// failed describe is yielded as an error and ends the listing. Cloning
/// restarts from the same snapshot.
#[derive(Clone)]
pub struct CertificateListing {
    store: Arc<dyn CertificateStoreService>,
    entries: std::vec::IntoIter<RawCertificateEntry>,
    filter: CertificateFilter,
    failed: bool,
}

impl fmt::Debug for CertificateListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateListing")
            .field("store", &self.store.name())
            .field("remaining", &self.entries.len())
            .field("filter", &self.filter)
            .field("failed", &self.failed)
            .finish()
    }
}

impl CertificateListing {
    fn new(
        store: Arc<dyn CertificateStoreService>,
        entries: Vec<RawCertificateEntry>,
        filter: CertificateFilter,
    ) -> Self {
        Self {
            store,
            entries: entries.into_iter(),
            filter,
            failed: false,
        }
    }

    /// Next matching certificate, `None` once the listing is exhausted or
    /// has failed.
    pub async fn next(&mut self) -> Option<Result<CertificateRecord>> {
        if self.failed {
            return None;
        }

        while let Some(raw) = self.entries.next() {
            if let (Some(wanted), Some(name)) = (&self.filter.name, &raw.server_certificate_name) {
                if wanted != name {
                    continue;
                }
            }

            match self.complete(raw).await {
                Ok(Some(record)) => {
                    if self.filter.matches(&record, Utc::now()) {
                        return Some(Ok(record));
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }

        None
    }

    /// Drains the listing, stopping at the first error.
    pub async fn try_collect(mut self) -> Result<Vec<CertificateRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await {
            records.push(record?);
        }
        Ok(records)
    }

    /// Describes an entry that was listed without its payload. `None` when
    /// the certificate was deleted after the listing was taken.
    async fn complete(&self, raw: RawCertificateEntry) -> Result<Option<CertificateRecord>> {
        if raw.certificate_body.is_some() {
            return CertificateRecord::try_from(raw).map(Some);
        }

        let name = raw
            .server_certificate_name
            .ok_or(CertificateError::MissingField { field: "ServerCertificateName" })?;

        match self.store.get_server_certificate_by_name(&name).await {
            Ok(described) => CertificateRecord::try_from(described).map(Some),
            Err(CertificateError::NotFound(_)) => {
                debug!(name = %name, "Server certificate deleted since listing");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Server certificates held by a [`CertificateStoreService`].
///
/// Holds no state of its own: every query goes to the store.
#[derive(Clone)]
pub struct CertificateDirectory {
    store: Arc<dyn CertificateStoreService>,
}

impl CertificateDirectory {
    pub fn new(store: Arc<dyn CertificateStoreService>) -> Self {
        Self { store }
    }

    /// Name of the backing provider
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Lists stored certificates matching `filter`, in store order.
    ///
    /// One request fetches the whole collection; describing, normalization
    /// and filtering happen as the returned listing is consumed.
    ///
    /// # Errors
    /// Store failures are returned unchanged. Malformed entries surface as
    /// items of the listing.
    pub async fn list_certificates(&self, filter: CertificateFilter) -> Result<CertificateListing> {
        let entries = self.store.list_all_server_certificates().await?;
        debug!(
            count = entries.len(),
            valid_only = filter.valid_only,
            name = ?filter.name,
            "Fetched server certificate listing"
        );
        Ok(CertificateListing::new(self.store.clone(), entries, filter))
    }

    /// Fetches one certificate by name directly from the store.
    ///
    /// # Errors
    /// [`crate::CertificateError::NotFound`] when no certificate has that
    /// name; other store failures unchanged.
    pub async fn get_by_name(&self, name: &str) -> Result<CertificateRecord> {
        debug!(name = %name, "Getting server certificate");
        let raw = self.store.get_server_certificate_by_name(name).await?;
        CertificateRecord::try_from(raw)
    }

    /// Most recently uploaded certificate matching `filter`, if any.
    ///
    /// Consumes the whole listing, so every entry is normalized.
    pub async fn latest(&self, filter: CertificateFilter) -> Result<Option<CertificateRecord>> {
        let records = self.list_certificates(filter).await?.try_collect().await?;
        Ok(records.into_iter().max_by(CertificateRecord::cmp_upload_date))
    }
}

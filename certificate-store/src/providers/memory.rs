//! In-memory certificate store, optionally seeded from a JSON snapshot

use crate::{CertificateError, CertificateStoreService, RawCertificateEntry, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Store that keeps entries in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryCertificateStore {
    entries: RwLock<Vec<RawCertificateEntry>>,
}

/// Snapshot file layout: a list of `GetServerCertificate` results.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Snapshot {
    server_certificates: Vec<SnapshotCertificate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SnapshotCertificate {
    #[serde(default)]
    server_certificate_metadata: SnapshotMetadata,
    certificate_body: Option<String>,
    certificate_chain: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SnapshotMetadata {
    server_certificate_name: Option<String>,
    arn: Option<String>,
    expiration: Option<DateTime<Utc>>,
    path: Option<String>,
    server_certificate_id: Option<String>,
    upload_date: Option<DateTime<Utc>>,
}

/// An absent `CertificateChain` means none was uploaded, as in IAM responses,
/// and becomes the empty chain.
impl From<SnapshotCertificate> for RawCertificateEntry {
    fn from(certificate: SnapshotCertificate) -> Self {
        let metadata = certificate.server_certificate_metadata;
        RawCertificateEntry {
            server_certificate_name: metadata.server_certificate_name,
            arn: metadata.arn,
            expiration: metadata.expiration,
            path: metadata.path,
            server_certificate_id: metadata.server_certificate_id,
            upload_date: metadata.upload_date,
            certificate_body: certificate.certificate_body,
            certificate_chain: Some(certificate.certificate_chain.unwrap_or_default()),
        }
    }
}

impl InMemoryCertificateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: impl IntoIterator<Item = RawCertificateEntry>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().collect()),
        }
    }

    /// Parses a snapshot document.
    ///
    /// Entries are taken as they are; incomplete ones are reported when a
    /// directory normalizes them, not here.
    pub fn from_snapshot_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Ok(Self::with_entries(
            snapshot.server_certificates.into_iter().map(RawCertificateEntry::from),
        ))
    }

    pub fn from_snapshot_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CertificateError::Snapshot(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_snapshot_json(&json)
    }

    /// Adds an entry, replacing any entry with the same name in place.
    pub fn insert(&self, entry: RawCertificateEntry) {
        let mut entries = self.entries.write();
        let existing = entries.iter_mut().find(|e| {
            e.server_certificate_name.is_some()
                && e.server_certificate_name == entry.server_certificate_name
        });
        match existing {
            Some(slot) => *slot = entry,
            None => entries.push(entry),
        }
    }

    /// Removes every entry with the given name. Returns whether any existed.
    pub fn remove(&self, name: &str) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.server_certificate_name.as_deref() != Some(name));
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CertificateStoreService for InMemoryCertificateStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn list_all_server_certificates(&self) -> Result<Vec<RawCertificateEntry>> {
        let entries = self.entries.read().clone();
        debug!(count = entries.len(), "Listing in-memory server certificates");
        Ok(entries)
    }

    async fn get_server_certificate_by_name(&self, name: &str) -> Result<RawCertificateEntry> {
        self.entries
            .read()
            .iter()
            .find(|e| e.server_certificate_name.as_deref() == Some(name))
            .cloned()
            .ok_or_else(|| CertificateError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, arn: &str) -> RawCertificateEntry {
        RawCertificateEntry {
            server_certificate_name: Some(name.to_string()),
            arn: Some(arn.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn lists_in_insertion_order() {
        let store = InMemoryCertificateStore::new();
        store.insert(entry("b", "arn2"));
        store.insert(entry("a", "arn1"));

        let names: Vec<_> = store
            .list_all_server_certificates()
            .await
            .unwrap()
            .into_iter()
            .filter_map(|e| e.server_certificate_name)
            .collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[tokio::test]
    async fn insert_replaces_same_name() {
        let store = InMemoryCertificateStore::with_entries([entry("a", "arn1"), entry("b", "arn2")]);
        store.insert(entry("a", "arn3"));

        assert_eq!(store.len(), 2);
        let fetched = store.get_server_certificate_by_name("a").await.unwrap();
        assert_eq!(fetched.arn.as_deref(), Some("arn3"));
    }

    #[tokio::test]
    async fn removed_entries_are_not_found() {
        let store = InMemoryCertificateStore::with_entries([entry("a", "arn1")]);

        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert!(store.is_empty());

        let err = store.get_server_certificate_by_name("a").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn snapshot_flattens_metadata() {
        let json = r#"{
            "ServerCertificates": [
                {
                    "ServerCertificateMetadata": {
                        "Path": "/",
                        "ServerCertificateName": "senza-example-org",
                        "ServerCertificateId": "ASCA0000",
                        "Arn": "arn:aws:iam::123:server-certificate/senza-example-org",
                        "UploadDate": "2016-05-10T10:00:00Z",
                        "Expiration": "2017-05-10T10:00:00Z"
                    },
                    "CertificateBody": "body",
                    "CertificateChain": "chain"
                },
                {
                    "CertificateBody": "orphan"
                }
            ]
        }"#;

        let store = InMemoryCertificateStore::from_snapshot_json(json).unwrap();
        let entries = store.entries.read();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].server_certificate_name.as_deref(), Some("senza-example-org"));
        assert_eq!(entries[0].certificate_chain.as_deref(), Some("chain"));
        assert!(entries[1].arn.is_none());
        assert_eq!(entries[1].certificate_body.as_deref(), Some("orphan"));
        assert_eq!(entries[1].certificate_chain.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn chainless_snapshot_entry_normalizes_with_empty_chain() {
        let json = r#"{
            "ServerCertificates": [
                {
                    "ServerCertificateMetadata": {
                        "Path": "/",
                        "ServerCertificateName": "senza-no-chain",
                        "ServerCertificateId": "ASCA0001",
                        "Arn": "arn:aws:iam::123:server-certificate/senza-no-chain",
                        "UploadDate": "2016-05-10T10:00:00Z",
                        "Expiration": "2017-05-10T10:00:00Z"
                    },
                    "CertificateBody": "body"
                }
            ]
        }"#;

        let store = InMemoryCertificateStore::from_snapshot_json(json).unwrap();
        let raw = store.get_server_certificate_by_name("senza-no-chain").await.unwrap();
        let record = crate::CertificateRecord::try_from(raw).unwrap();
        assert_eq!(record.certificate_chain(), "");
    }

    #[test]
    fn unreadable_snapshot_is_reported() {
        let err = InMemoryCertificateStore::from_snapshot_file(Path::new("/nonexistent/snapshot.json"))
            .unwrap_err();
        assert!(matches!(err, CertificateError::Snapshot(_)));
    }

    #[test]
    fn malformed_snapshot_is_reported() {
        let err = InMemoryCertificateStore::from_snapshot_json("{\"ServerCertificates\": 3}").unwrap_err();
        assert!(matches!(err, CertificateError::Serde(_)));
    }
}

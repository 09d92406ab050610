//! Server certificate records

use crate::{CertificateError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A server certificate as reported by the certificate store, before
/// normalization.
///
/// Field names follow the IAM wire contract. Every field is optional here
/// so that a store response lacking one can be detected and reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawCertificateEntry {
    pub server_certificate_name: Option<String>,
    pub arn: Option<String>,
    pub expiration: Option<DateTime<Utc>>,
    pub path: Option<String>,
    pub server_certificate_id: Option<String>,
    pub upload_date: Option<DateTime<Utc>>,
    pub certificate_body: Option<String>,
    pub certificate_chain: Option<String>,
}

/// Server certificate stored in IAM.
///
/// Immutable once built. Two records are equal when they share an ARN,
/// whatever their other fields say: the store does not reuse ARNs, so a
/// difference elsewhere only means the same resource was read at another
/// time.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateRecord {
    name: String,
    arn: String,
    path: String,
    certificate_id: String,
    upload_date: DateTime<Utc>,
    expiration: DateTime<Utc>,
    certificate_body: String,
    certificate_chain: String,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T> {
    value.ok_or(CertificateError::MissingField { field })
}

impl TryFrom<RawCertificateEntry> for CertificateRecord {
    type Error = CertificateError;

    fn try_from(raw: RawCertificateEntry) -> Result<Self> {
        Ok(Self {
            name: required(raw.server_certificate_name, "ServerCertificateName")?,
            arn: required(raw.arn, "Arn")?,
            expiration: required(raw.expiration, "Expiration")?,
            path: required(raw.path, "Path")?,
            certificate_id: required(raw.server_certificate_id, "ServerCertificateId")?,
            upload_date: required(raw.upload_date, "UploadDate")?,
            certificate_body: required(raw.certificate_body, "CertificateBody")?,
            certificate_chain: required(raw.certificate_chain, "CertificateChain")?,
        })
    }
}

impl CertificateRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arn(&self) -> &str {
        &self.arn
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn certificate_id(&self) -> &str {
        &self.certificate_id
    }

    pub fn upload_date(&self) -> DateTime<Utc> {
        self.upload_date
    }

    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    /// PEM encoded certificate
    pub fn certificate_body(&self) -> &str {
        &self.certificate_body
    }

    /// PEM encoded chain, empty when none was uploaded
    pub fn certificate_chain(&self) -> &str {
        &self.certificate_chain
    }

    /// Checks if the certificate is still valid now.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Checks if the certificate is valid at `when`.
    ///
    /// Only the expiration is considered. A certificate stops being valid at
    /// the exact instant it expires.
    pub fn is_valid_at(&self, when: DateTime<Utc>) -> bool {
        when < self.expiration
    }

    /// Chronological order by upload date. Earlier uploads sort first; ties
    /// compare equal.
    pub fn cmp_upload_date(&self, other: &Self) -> Ordering {
        self.upload_date.cmp(&other.upload_date)
    }

    pub fn is_older_than(&self, other: &Self) -> bool {
        self.upload_date < other.upload_date
    }
}

/// Sorts oldest upload first. Stable, so records uploaded at the same
/// instant keep their relative order.
pub fn sort_by_upload_date(records: &mut [CertificateRecord]) {
    records.sort_by(CertificateRecord::cmp_upload_date);
}

impl PartialEq for CertificateRecord {
    fn eq(&self, other: &Self) -> bool {
        self.arn == other.arn
    }
}

impl Eq for CertificateRecord {}

impl Hash for CertificateRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.arn.hash(state);
    }
}

impl fmt::Display for CertificateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ServerCertificate: {}>", self.name)
    }
}

//! AWS IAM server certificate store

use crate::config::IamConfig;
use crate::{CertificateError, CertificateStoreService, RawCertificateEntry, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_iam::operation::get_server_certificate::GetServerCertificateError;
use aws_sdk_iam::primitives::DateTime as AwsDateTime;
use aws_sdk_iam::types::{ServerCertificate, ServerCertificateMetadata};
use aws_sdk_iam::Client;
use chrono::{DateTime, Utc};
use tracing::debug;

pub struct IamCertificateStore {
    client: Client,
}

impl IamCertificateStore {
    /// Connects using the SDK default credential chain, narrowed by `config`.
    pub async fn new(config: IamConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = config.region {
            loader = loader.region(aws_config::Region::new(region));
        }
        if let Some(profile) = config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint_url) = config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }

        let sdk_config = loader.load().await;
        Ok(Self::from_client(Client::new(&sdk_config)))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn describe(&self, name: &str) -> Result<RawCertificateEntry> {
        let response = self
            .client
            .get_server_certificate()
            .server_certificate_name(name)
            .send()
            .await
            .map_err(|e| {
                let missing = e
                    .as_service_error()
                    .is_some_and(GetServerCertificateError::is_no_such_entity_exception);
                if missing {
                    CertificateError::NotFound(name.to_string())
                } else {
                    CertificateError::service(e)
                }
            })?;

        described_entry(response.server_certificate())
    }
}

fn to_chrono(value: Option<&AwsDateTime>) -> Option<DateTime<Utc>> {
    value.and_then(|d| DateTime::from_timestamp(d.secs(), d.subsec_nanos()))
}

/// A response without its `ServerCertificate` element is a broken transport
/// response, not a malformed certificate.
fn described_entry(certificate: Option<&ServerCertificate>) -> Result<RawCertificateEntry> {
    certificate.map(raw_entry).ok_or_else(|| {
        CertificateError::Service("GetServerCertificate response has no ServerCertificate".into())
    })
}

/// Listing entry: metadata only, body and chain left for a describe call.
fn metadata_entry(metadata: &ServerCertificateMetadata) -> RawCertificateEntry {
    RawCertificateEntry {
        server_certificate_name: Some(metadata.server_certificate_name().to_string()),
        arn: Some(metadata.arn().to_string()),
        expiration: to_chrono(metadata.expiration()),
        path: Some(metadata.path().to_string()),
        server_certificate_id: Some(metadata.server_certificate_id().to_string()),
        upload_date: to_chrono(metadata.upload_date()),
        certificate_body: None,
        certificate_chain: None,
    }
}

/// Flattens a `GetServerCertificate` result.
///
/// IAM leaves `CertificateChain` out when no chain was uploaded; that is
/// reported as an empty chain.
fn raw_entry(certificate: &ServerCertificate) -> RawCertificateEntry {
    let metadata: Option<&ServerCertificateMetadata> = certificate.server_certificate_metadata();

    RawCertificateEntry {
        server_certificate_name: metadata.map(|m| m.server_certificate_name().to_string()),
        arn: metadata.map(|m| m.arn().to_string()),
        expiration: to_chrono(metadata.and_then(ServerCertificateMetadata::expiration)),
        path: metadata.map(|m| m.path().to_string()),
        server_certificate_id: metadata.map(|m| m.server_certificate_id().to_string()),
        upload_date: to_chrono(metadata.and_then(ServerCertificateMetadata::upload_date)),
        certificate_body: Some(certificate.certificate_body().to_string()),
        certificate_chain: Some(certificate.certificate_chain().unwrap_or_default().to_string()),
    }
}

#[async_trait]
impl CertificateStoreService for IamCertificateStore {
    fn name(&self) -> &str {
        "aws-iam"
    }

    /// One paginated `ListServerCertificates` walk. IAM lists metadata
    /// only, so the entries carry no body or chain.
    async fn list_all_server_certificates(&self) -> Result<Vec<RawCertificateEntry>> {
        debug!("Listing server certificates from AWS IAM");

        let mut entries = Vec::new();
        let mut pages = self.client.list_server_certificates().into_paginator().send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(CertificateError::service)?;
            entries.extend(page.server_certificate_metadata_list().iter().map(metadata_entry));
        }

        Ok(entries)
    }

    async fn get_server_certificate_by_name(&self, name: &str) -> Result<RawCertificateEntry> {
        debug!(name = %name, "Getting server certificate from AWS IAM");
        self.describe(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CertificateRecord;

    fn metadata() -> ServerCertificateMetadata {
        ServerCertificateMetadata::builder()
            .path("/")
            .server_certificate_name("senza-example-org")
            .server_certificate_id("ASCA0000")
            .arn("arn:aws:iam::123:server-certificate/senza-example-org")
            .upload_date(AwsDateTime::from_secs_and_nanos(1_500_000_000, 500))
            .expiration(AwsDateTime::from_secs(1_600_000_000))
            .build()
            .unwrap()
    }

    #[test]
    fn flattens_sdk_certificate() {
        let certificate = ServerCertificate::builder()
            .server_certificate_metadata(metadata())
            .certificate_body("body")
            .certificate_chain("chain")
            .build()
            .unwrap();

        let record = CertificateRecord::try_from(raw_entry(&certificate)).unwrap();
        assert_eq!(record.name(), "senza-example-org");
        assert_eq!(record.upload_date().timestamp(), 1_500_000_000);
        assert_eq!(record.upload_date().timestamp_subsec_nanos(), 500);
        assert_eq!(record.expiration().timestamp(), 1_600_000_000);
        assert_eq!(record.certificate_chain(), "chain");
    }

    #[test]
    fn absent_chain_becomes_empty() {
        let certificate = ServerCertificate::builder()
            .server_certificate_metadata(metadata())
            .certificate_body("body")
            .build()
            .unwrap();

        let raw = raw_entry(&certificate);
        assert_eq!(raw.certificate_chain.as_deref(), Some(""));
    }

    #[test]
    fn listing_entries_leave_payload_for_describe() {
        let entry = metadata_entry(&metadata());

        assert_eq!(entry.server_certificate_name.as_deref(), Some("senza-example-org"));
        assert_eq!(entry.expiration.map(|e| e.timestamp()), Some(1_600_000_000));
        assert!(entry.certificate_body.is_none());
        assert!(entry.certificate_chain.is_none());
    }

    #[test]
    fn response_without_certificate_is_a_service_error() {
        let err = described_entry(None).unwrap_err();
        assert!(matches!(err, CertificateError::Service(_)));
        assert!(err.to_string().contains("no ServerCertificate"));
    }

    // Requires AWS credentials with iam:ListServerCertificates and
    // iam:GetServerCertificate.
    #[tokio::test]
    #[ignore]
    async fn test_iam_operations() {
        let store = IamCertificateStore::new(IamConfig::default()).await.unwrap();

        let entries = store.list_all_server_certificates().await.unwrap();
        for entry in entries {
            let name = entry.server_certificate_name.clone().unwrap();
            let fetched = store.get_server_certificate_by_name(&name).await.unwrap();
            let record = CertificateRecord::try_from(fetched).unwrap();
            assert_eq!(Some(record.arn()), entry.arn.as_deref());
        }

        let missing = store
            .get_server_certificate_by_name("certificate-that-does-not-exist")
            .await
            .unwrap_err();
        assert!(missing.is_not_found());
    }
}

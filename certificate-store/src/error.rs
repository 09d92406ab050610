//! Error types for the certificate store

use thiserror::Error;

/// Boxed error returned by a certificate store provider.
pub type ServiceSource = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum CertificateError {
    #[error("Certificate entry is missing required field {field}")]
    MissingField { field: &'static str },

    #[error("Server certificate not found: {0}")]
    NotFound(String),

    #[error("Certificate store service error: {0}")]
    Service(#[source] ServiceSource),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl CertificateError {
    /// Wraps a provider failure without altering it.
    pub fn service<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CertificateError::Service(Box::new(err))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CertificateError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn service_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = CertificateError::service(io);

        assert!(err.to_string().contains("access denied"));
        assert!(err.source().is_some());
        assert!(!err.is_not_found());
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = CertificateError::MissingField { field: "UploadDate" };
        assert_eq!(
            err.to_string(),
            "Certificate entry is missing required field UploadDate"
        );
    }
}

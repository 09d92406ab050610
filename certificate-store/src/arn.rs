//! Amazon Resource Name helpers

/// Prefix shared by every IAM resource ARN.
pub const IAM_ARN_PREFIX: &str = "arn:aws:iam:";

/// Resource type marker of IAM server certificates.
pub const SERVER_CERTIFICATE_MARKER: &str = "server-certificate";

/// Checks if an ARN refers to an IAM server certificate.
///
/// Pure string test: users, roles and other IAM resources share the prefix
/// but not the `server-certificate` resource type. The resource is not
/// looked up.
pub fn looks_like_server_certificate_arn(arn: Option<&str>) -> bool {
    match arn {
        None => false,
        Some(arn) => arn.starts_with(IAM_ARN_PREFIX) && arn.contains(SERVER_CERTIFICATE_MARKER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_arn_is_not_a_certificate() {
        assert!(!looks_like_server_certificate_arn(None));
    }

    #[test]
    fn server_certificate_arn_is_recognised() {
        assert!(looks_like_server_certificate_arn(Some(
            "arn:aws:iam::123:server-certificate/foo"
        )));
        assert!(looks_like_server_certificate_arn(Some(
            "arn:aws:iam::123456789012:server-certificate/division_abc/subdivision_xyz/ProdServerCert"
        )));
    }

    #[test]
    fn other_iam_resources_are_rejected() {
        assert!(!looks_like_server_certificate_arn(Some("arn:aws:iam::123:user/foo")));
        assert!(!looks_like_server_certificate_arn(Some("arn:aws:iam::123:role/server")));
    }

    #[test]
    fn other_services_are_rejected() {
        assert!(!looks_like_server_certificate_arn(Some(
            "arn:aws:acm:eu-central-1:123:certificate/server-certificate"
        )));
        assert!(!looks_like_server_certificate_arn(Some("")));
    }
}

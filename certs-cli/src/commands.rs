//! Subcommand implementations

use std::process::ExitCode;

use anyhow::Context;
use certificate_store::{
    looks_like_server_certificate_arn, sort_by_upload_date, CertificateDirectory, CertificateFilter,
    CertificateRecord,
};

use crate::output;

pub fn filter(include_expired: bool, name: Option<String>) -> CertificateFilter {
    let filter = match name {
        Some(name) => CertificateFilter::default().named(name),
        None => CertificateFilter::default(),
    };
    if include_expired {
        filter.include_expired()
    } else {
        filter
    }
}

pub async fn list(
    directory: &CertificateDirectory,
    filter: CertificateFilter,
    sort: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut listing = directory
        .list_certificates(filter)
        .await
        .with_context(|| format!("failed to list certificates from {}", directory.store_name()))?;

    if sort || json {
        let mut records = listing.try_collect().await?;
        if sort {
            sort_by_upload_date(&mut records);
        }
        if json {
            println!("{}", serde_json::to_string_pretty(&records)?);
        } else {
            output::print_header();
            records.iter().for_each(output::print_row);
        }
        return Ok(());
    }

    // Rows are printed as they are read so a malformed entry stops the
    // table where it occurs.
    output::print_header();
    while let Some(record) = listing.next().await {
        output::print_row(&record?);
    }
    Ok(())
}

pub async fn get(directory: &CertificateDirectory, name: &str, json: bool) -> anyhow::Result<()> {
    let record = directory.get_by_name(name).await?;
    print_record(&record, json)
}

pub async fn latest(
    directory: &CertificateDirectory,
    filter: CertificateFilter,
    json: bool,
) -> anyhow::Result<()> {
    match directory.latest(filter).await? {
        Some(record) => print_record(&record, json),
        None => anyhow::bail!("no matching server certificate"),
    }
}

pub fn check_arn(arn: &str) -> ExitCode {
    if looks_like_server_certificate_arn(Some(arn)) {
        println!("{arn} is an IAM server certificate ARN");
        ExitCode::SUCCESS
    } else {
        println!("{arn} is not an IAM server certificate ARN");
        ExitCode::FAILURE
    }
}

fn print_record(record: &CertificateRecord, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        output::print_details(record);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_defaults_to_valid_only() {
        assert_eq!(filter(false, None), CertificateFilter::default());
    }

    #[test]
    fn filter_carries_name_and_expired_flag() {
        let filter = filter(true, Some("senza".to_string()));
        assert!(!filter.valid_only);
        assert_eq!(filter.name.as_deref(), Some("senza"));
    }
}

//! Terminal rendering of certificate records

use certificate_store::CertificateRecord;
use chrono::{DateTime, Utc};
use colored::*;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

fn date(value: DateTime<Utc>) -> String {
    value.format(DATE_FORMAT).to_string()
}

fn status(record: &CertificateRecord, width: usize) -> ColoredString {
    if record.is_valid() {
        format!("{:<width$}", "VALID").bright_green()
    } else {
        format!("{:<width$}", "EXPIRED").bright_red()
    }
}

pub fn print_header() {
    println!(
        "{}",
        format!(
            "{:<32} {:<8} {:<24} {:<24} {}",
            "NAME", "STATUS", "UPLOADED", "EXPIRES", "ARN"
        )
        .bold()
    );
}

pub fn print_row(record: &CertificateRecord) {
    // Pad before coloring; escape codes would otherwise count toward width.
    println!(
        "{} {} {:<24} {:<24} {}",
        format!("{:<32}", record.name()).bright_cyan(),
        status(record, 8),
        date(record.upload_date()),
        date(record.expiration()),
        record.arn().bright_black()
    );
}

pub fn print_details(record: &CertificateRecord) {
    println!("{}", record.to_string().bold());
    println!("  {:<15} {}", "ARN:", record.arn());
    println!("  {:<15} {}", "Path:", record.path());
    println!("  {:<15} {}", "Certificate ID:", record.certificate_id());
    println!("  {:<15} {}", "Uploaded:", date(record.upload_date()));
    println!("  {:<15} {} ({})", "Expires:", date(record.expiration()), status(record, 0));
    println!(
        "  {:<15} {}",
        "Chain:",
        if record.certificate_chain().is_empty() { "none" } else { "present" }
    );
}

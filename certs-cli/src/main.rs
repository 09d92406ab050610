use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use certificate_store::{providers, CertificateDirectory, CertificateStoreConfig};

mod commands;
mod output;

/// Inspect TLS server certificates stored in AWS IAM
#[derive(Parser, Debug)]
#[command(name = "iam-certs", version)]
#[command(about = "Inspect TLS server certificates stored in AWS IAM")]
struct Args {
    /// Configuration file path (defaults to iam-certs.toml when present)
    #[arg(short, long, env = "IAM_CERTS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored certificates
    List {
        /// Also list certificates that have expired
        #[arg(long)]
        include_expired: bool,

        /// Only certificates with exactly this name
        #[arg(long)]
        name: Option<String>,

        /// Sort by upload date, oldest first
        #[arg(long)]
        sort: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one certificate by name
    Get {
        name: String,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show the most recently uploaded certificate
    Latest {
        /// Only certificates with exactly this name
        #[arg(long)]
        name: Option<String>,

        /// Also consider certificates that have expired
        #[arg(long)]
        include_expired: bool,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Check whether an ARN refers to an IAM server certificate
    CheckArn { arn: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    init_tracing(args.verbose, args.log_json);

    let config = args.config.as_deref();
    match args.command {
        Command::List {
            include_expired,
            name,
            sort,
            json,
        } => {
            let directory = open_directory(config).await?;
            commands::list(&directory, commands::filter(include_expired, name), sort, json).await?;
        }
        Command::Get { name, json } => {
            let directory = open_directory(config).await?;
            commands::get(&directory, &name, json).await?;
        }
        Command::Latest {
            name,
            include_expired,
            json,
        } => {
            let directory = open_directory(config).await?;
            commands::latest(&directory, commands::filter(include_expired, name), json).await?;
        }
        // Offline: needs neither configuration nor credentials.
        Command::CheckArn { arn } => return Ok(commands::check_arn(&arn)),
    }

    Ok(ExitCode::SUCCESS)
}

async fn open_directory(config: Option<&Path>) -> anyhow::Result<CertificateDirectory> {
    let config = CertificateStoreConfig::load(config)?;
    debug!(provider = ?config.provider, "Loaded configuration");

    let store = providers::from_config(&config.provider).await?;
    Ok(CertificateDirectory::new(store))
}

fn init_tracing(verbose: bool, json: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("certificate_store={level},certs_cli={level},aws_config=warn").into()
    });

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .init();
    } else {
        let use_colors = std::env::var("NO_COLOR").is_err() && atty::is(atty::Stream::Stderr);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(use_colors)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

//! CLI command definitions and execution
//!
//! Each sub-command lives in its own module with an `Args` struct and an
//! `execute` function. Failures bubble up as `anyhow::Error` and are turned
//! into an exit code in one place.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use s3lib_core::{ConfigManager, Credentials, Defaults};
use s3lib_s3::Connection;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod cp;
mod get;
mod head;
mod ls;
mod put;
mod rm;
mod sign;
mod url;

/// s3 - object storage client
///
/// Talks to S3-compatible services using legacy HMAC-SHA1 request signing.
#[derive(Parser, Debug)]
#[command(name = "s3")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Service host [default: s3.amazonaws.com]
    #[arg(long, global = true, env = "S3_HOST")]
    pub host: Option<String>,

    /// Service port; 443 switches to HTTPS [default: 80]
    #[arg(long, global = true, env = "S3_PORT")]
    pub port: Option<u16>,

    /// Credentials file holding the access id and secret on two lines
    #[arg(long, global = true, value_name = "PATH")]
    pub creds: Option<PathBuf>,

    /// Connect and read timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List buckets, or the keys of a bucket
    Ls(ls::LsArgs),

    /// Download an object
    Get(get::GetArgs),

    /// Upload an object from a file or stdin
    Put(put::PutArgs),

    /// Remove one or more objects
    Rm(rm::RmArgs),

    /// Copy an object on the server side
    Cp(cp::CpArgs),

    /// Show object metadata
    Head(head::HeadArgs),

    /// Sign a browser-upload policy document
    Sign(sign::SignArgs),

    /// Print the public URL of an object
    Url(url::UrlArgs),
}

/// Connection flags shared by every command
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub creds: Option<PathBuf>,
    pub timeout: Option<u64>,
}

impl ConnectionOptions {
    /// Configured defaults with command-line flags applied on top
    pub fn defaults(&self) -> s3lib_core::Result<Defaults> {
        let config = ConfigManager::new()?.load()?;
        Ok(self.apply(config.defaults))
    }

    fn apply(&self, mut defaults: Defaults) -> Defaults {
        if let Some(host) = &self.host {
            defaults.host = host.clone();
        }
        if let Some(port) = self.port {
            defaults.port = port;
        }
        if let Some(timeout) = self.timeout {
            defaults.timeout_secs = Some(timeout);
        }
        defaults
    }

    pub fn credentials(&self) -> s3lib_core::Result<Credentials> {
        Credentials::load(self.creds.as_deref())
    }

    /// Resolve settings and credentials into a connection
    pub fn connect(&self) -> s3lib_core::Result<(Connection, Defaults)> {
        let defaults = self.defaults()?;
        let connection = Connection::from_defaults(self.credentials()?, &defaults);
        tracing::debug!(
            host = %defaults.host,
            port = defaults.port,
            "resolved connection settings"
        );
        Ok((connection, defaults))
    }
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let formatter = Formatter::new(OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        quiet: cli.quiet,
    });
    let options = ConnectionOptions {
        host: cli.host,
        port: cli.port,
        creds: cli.creds,
        timeout: cli.timeout,
    };

    let result = match cli.command {
        Commands::Ls(args) => ls::execute(args, &options, &formatter).await,
        Commands::Get(args) => get::execute(args, &options, &formatter).await,
        Commands::Put(args) => put::execute(args, &options, &formatter).await,
        Commands::Rm(args) => rm::execute(args, &options, &formatter).await,
        Commands::Cp(args) => cp::execute(args, &options, &formatter).await,
        Commands::Head(args) => head::execute(args, &options, &formatter).await,
        Commands::Sign(args) => sign::execute(args, &options, &formatter).await,
        Commands::Url(args) => url::execute(args, &options, &formatter).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            ExitCode::from_error(&e)
        }
    }
}

/// `bucket/key`, for messages
fn display_path(bucket: &str, key: &str) -> String {
    format!("{bucket}/{key}")
}

//! cp command - Server-side copy
//!
//! The source object's metadata is replaced by the headers given here.

use anyhow::Result;
use clap::Args;
use s3lib_core::parse_headers;
use serde::Serialize;

use super::{ConnectionOptions, display_path};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Copy an object on the server side
#[derive(Args, Debug)]
pub struct CpArgs {
    pub src_bucket: String,

    pub src_key: String,

    pub dst_bucket: String,

    pub dst_key: String,

    /// Metadata header for the copy, e.g. `x-amz-meta-owner:me` (repeatable)
    #[arg(long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CpOutput {
    status: &'static str,
    source: String,
    target: String,
}

/// Execute the cp command
pub async fn execute(
    args: CpArgs,
    options: &ConnectionOptions,
    formatter: &Formatter,
) -> Result<ExitCode> {
    let headers = parse_headers(&args.headers)?;
    let (connection, _) = options.connect()?;
    let mut client = connection.open()?;

    client
        .copy_object(
            &args.src_bucket,
            &args.src_key,
            &args.dst_bucket,
            &args.dst_key,
            headers,
        )
        .await?;

    let source = display_path(&args.src_bucket, &args.src_key);
    let target = display_path(&args.dst_bucket, &args.dst_key);
    if formatter.is_json() {
        formatter.json(&CpOutput {
            status: "success",
            source,
            target,
        });
    } else {
        formatter.success(&format!("Copied {source} to {target}"));
    }

    Ok(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use crate::commands::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_parse() {
        let cli = Cli::try_parse_from([
            "s3",
            "cp",
            "pacific",
            "flotsam",
            "atlantic",
            "jetsam",
            "--header",
            "Content-Type:text/plain",
        ])
        .unwrap();
        let Commands::Cp(args) = cli.command else {
            panic!("expected cp");
        };
        assert_eq!(args.src_bucket, "pacific");
        assert_eq!(args.src_key, "flotsam");
        assert_eq!(args.dst_bucket, "atlantic");
        assert_eq!(args.dst_key, "jetsam");
        assert_eq!(args.headers, vec!["Content-Type:text/plain"]);
    }

    #[test]
    fn test_parse_requires_destination() {
        assert!(Cli::try_parse_from(["s3", "cp", "pacific", "flotsam", "atlantic"]).is_err());
    }
}

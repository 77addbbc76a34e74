//! url command - Print the public URL of an object
//!
//! Uses the configured host; no credentials are read.

use anyhow::Result;
use clap::Args;
use s3lib_s3::object_url;

use super::ConnectionOptions;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Print the public URL of an object
#[derive(Args, Debug)]
pub struct UrlArgs {
    pub bucket: String,

    pub key: String,
}

/// Execute the url command
pub async fn execute(
    args: UrlArgs,
    options: &ConnectionOptions,
    formatter: &Formatter,
) -> Result<ExitCode> {
    let defaults = options.defaults()?;
    let url = object_url(&defaults.host, &args.bucket, &args.key)?;

    if formatter.is_json() {
        formatter.json(&serde_json::json!({ "url": url.as_str() }));
    } else {
        formatter.println(url.as_str());
    }

    Ok(ExitCode::Success)
}

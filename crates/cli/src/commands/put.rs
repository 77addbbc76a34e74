//! put command - Upload an object
//!
//! Reads the body from a file, or from stdin when no file is given. The
//! whole body is buffered so that its MD5 can be signed.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use s3lib_core::{Headers, parse_headers};
use serde::Serialize;

use super::{ConnectionOptions, display_path};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Upload an object
#[derive(Args, Debug)]
pub struct PutArgs {
    pub bucket: String,

    pub key: String,

    /// Source file [default: stdin]
    pub file: Option<PathBuf>,

    /// Extra request header, e.g. `x-amz-acl:public-read` (repeatable)
    #[arg(long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PutOutput {
    status: &'static str,
    target: String,
    size_bytes: usize,
    size_human: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    etag: Option<String>,
}

/// Execute the put command
pub async fn execute(
    args: PutArgs,
    options: &ConnectionOptions,
    formatter: &Formatter,
) -> Result<ExitCode> {
    let mut headers = parse_headers(&args.headers)?;

    let body = match &args.file {
        Some(path) => {
            guess_content_type(&mut headers, path);
            tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?
        }
        None => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read from stdin")?;
            buffer
        }
    };

    let (connection, _) = options.connect()?;
    let mut client = connection.open()?;

    let size = body.len();
    let response_headers = client
        .put_object(&args.bucket, &args.key, body, headers)
        .await?;

    let target = display_path(&args.bucket, &args.key);
    let size_human = humansize::format_size(size as u64, humansize::BINARY);
    let etag = response_headers.get("ETag").map(str::to_string);

    if formatter.is_json() {
        formatter.json(&PutOutput {
            status: "success",
            target,
            size_bytes: size,
            size_human,
            etag,
        });
    } else {
        formatter.success(&format!("Uploaded {target} ({size_human})"));
        if let Some(etag) = etag {
            formatter.println(&etag);
        }
    }

    Ok(ExitCode::Success)
}

/// Fill in `Content-Type` from the file extension unless one was given
fn guess_content_type(headers: &mut Headers, path: &Path) {
    if headers.contains("Content-Type") {
        return;
    }
    if let Some(mime) = mime_guess::from_path(path).first_raw() {
        tracing::debug!(content_type = mime, "guessed content type");
        headers.insert("Content-Type", mime);
    }
}

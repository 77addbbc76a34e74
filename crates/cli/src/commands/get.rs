//! get command - Download an object
//!
//! Writes the object body to a file, or to stdout when no file is given,
//! one chunk at a time as it arrives.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use s3lib_core::parse_headers;
use s3lib_s3::ObjectBody;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{ConnectionOptions, display_path};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Download an object
#[derive(Args, Debug)]
pub struct GetArgs {
    pub bucket: String,

    pub key: String,

    /// Destination file [default: stdout]
    pub file: Option<PathBuf>,

    /// Extra request header, e.g. `Range:bytes=0-99` (repeatable)
    #[arg(long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GetOutput {
    status: &'static str,
    source: String,
    target: String,
    size_bytes: u64,
    size_human: String,
}

/// Execute the get command
pub async fn execute(
    args: GetArgs,
    options: &ConnectionOptions,
    formatter: &Formatter,
) -> Result<ExitCode> {
    let headers = parse_headers(&args.headers)?;
    let (connection, _) = options.connect()?;
    let mut client = connection.open()?;

    let mut object = client.get_object(&args.bucket, &args.key, headers).await?;
    let source = display_path(&args.bucket, &args.key);

    match &args.file {
        Some(path) => {
            let mut file = tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let size = copy_body(&mut object, &mut file).await?;

            let size_human = humansize::format_size(size, humansize::BINARY);
            if formatter.is_json() {
                formatter.json(&GetOutput {
                    status: "success",
                    source,
                    target: path.display().to_string(),
                    size_bytes: size,
                    size_human,
                });
            } else {
                formatter.success(&format!(
                    "Downloaded {source} to {} ({size_human})",
                    path.display()
                ));
            }
        }
        None => {
            copy_body(&mut object, &mut tokio::io::stdout()).await?;
        }
    }

    drop(object);
    client.close();
    Ok(ExitCode::Success)
}

/// Write the object body to `writer` as it arrives, returning its size
async fn copy_body<W>(object: &mut ObjectBody<'_>, writer: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    while let Some(chunk) = object.chunk().await? {
        writer
            .write_all(&chunk)
            .await
            .context("Failed to write object data")?;
    }
    writer.flush().await.context("Failed to flush output")?;
    Ok(object.received())
}

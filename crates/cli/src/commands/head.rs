//! head command - Show object metadata

use anyhow::Result;
use clap::Args;
use s3lib_core::Headers;
use serde_json::{Map, Value};

use super::ConnectionOptions;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Show object metadata
#[derive(Args, Debug)]
pub struct HeadArgs {
    pub bucket: String,

    pub key: String,
}

/// Execute the head command
pub async fn execute(
    args: HeadArgs,
    options: &ConnectionOptions,
    formatter: &Formatter,
) -> Result<ExitCode> {
    let (connection, _) = options.connect()?;
    let mut client = connection.open()?;
    let headers = client.head_object(&args.bucket, &args.key).await?;

    if formatter.is_json() {
        formatter.json(&headers_json(&headers));
    } else {
        for (name, value) in headers.iter() {
            formatter.println(&format!("{name}: {value}"));
        }
    }

    Ok(ExitCode::Success)
}

fn headers_json(headers: &Headers) -> Value {
    let object: Map<String, Value> = headers
        .iter()
        .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
        .collect();
    Value::Object(object)
}

//! rm command - Remove objects
//!
//! A single key is removed with a plain DELETE. Several keys (or an
//! explicit `--batch`) go through multi-object delete requests, and the
//! service's verdict is printed per key.

use anyhow::Result;
use clap::Args;
use s3lib_core::{DeleteOutcome, DeleteStatus};
use serde::Serialize;

use super::{ConnectionOptions, display_path};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Remove objects
#[derive(Args, Debug)]
pub struct RmArgs {
    pub bucket: String,

    /// Keys to remove
    #[arg(required = true)]
    pub keys: Vec<String>,

    /// Keys per delete request [default: 500]
    #[arg(long, value_name = "N")]
    pub batch: Option<usize>,

    /// Only report keys that could not be deleted
    #[arg(long)]
    pub errors_only: bool,
}

#[derive(Debug, Serialize)]
struct OutcomeOutput<'a> {
    key: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl<'a> From<&'a DeleteOutcome> for OutcomeOutput<'a> {
    fn from(outcome: &'a DeleteOutcome) -> Self {
        let (code, message) = match &outcome.status {
            DeleteStatus::Deleted => (None, None),
            DeleteStatus::Failed { code, message } => (code.as_deref(), message.as_deref()),
        };
        Self {
            key: &outcome.key,
            status: outcome.status.tag(),
            code,
            message,
        }
    }
}

/// Execute the rm command
pub async fn execute(
    args: RmArgs,
    options: &ConnectionOptions,
    formatter: &Formatter,
) -> Result<ExitCode> {
    let (connection, defaults) = options.connect()?;
    let mut client = connection.open()?;

    if args.keys.len() == 1 && args.batch.is_none() {
        let key = &args.keys[0];
        client.delete_object(&args.bucket, key).await?;
        formatter.success(&format!("Removed {}", display_path(&args.bucket, key)));
        return Ok(ExitCode::Success);
    }

    let batch_size = args.batch.unwrap_or(defaults.delete_batch);
    let outcomes = client
        .delete_objects(&args.bucket, args.keys, batch_size, args.errors_only)
        .await?;

    let outputs: Vec<OutcomeOutput<'_>> = outcomes.iter().map(OutcomeOutput::from).collect();
    if formatter.is_json() {
        formatter.json(&outputs);
    } else {
        for output in &outputs {
            formatter.println(&render_outcome(output));
        }
    }

    let failed = outcomes.iter().filter(|o| !o.status.is_deleted()).count();
    if failed > 0 {
        formatter.warning(&format!("{failed} key(s) could not be removed"));
        Ok(ExitCode::GeneralError)
    } else {
        Ok(ExitCode::Success)
    }
}

fn render_outcome(output: &OutcomeOutput<'_>) -> String {
    let mut line = format!("{}\t{}", output.status, output.key);
    if let Some(code) = output.code {
        line.push('\t');
        line.push_str(code);
    }
    line
}

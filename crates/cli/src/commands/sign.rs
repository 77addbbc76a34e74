//! sign command - Sign a POST-form policy document
//!
//! Prints the base64 policy on the first line and its signature on the
//! second. Only credentials are needed; nothing is sent.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use s3lib_core::sign_policy;

use super::ConnectionOptions;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Sign a browser-upload policy document
#[derive(Args, Debug)]
pub struct SignArgs {
    /// Policy document [default: stdin]
    pub file: Option<PathBuf>,
}

/// Execute the sign command
pub async fn execute(
    args: SignArgs,
    options: &ConnectionOptions,
    formatter: &Formatter,
) -> Result<ExitCode> {
    let document = match &args.file {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read from stdin")?;
            buffer
        }
    };

    let credentials = options.credentials()?;
    let signed = sign_policy(credentials.secret(), &document);

    if formatter.is_json() {
        formatter.json(&serde_json::json!({
            "policy": signed.policy,
            "signature": signed.signature,
        }));
    } else {
        formatter.println(&signed.policy);
        formatter.println(&signed.signature);
    }

    Ok(ExitCode::Success)
}

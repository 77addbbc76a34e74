//! ls command - List buckets or keys
//!
//! Without a bucket, lists the account's buckets. With one, walks every key
//! page by page and prints each entry as soon as its page arrives.

use anyhow::Result;
use clap::{Args, ValueEnum};
use s3lib_core::ObjectEntry;
use s3lib_s3::ListOptions;
use serde_json::{Map, Value};

use super::ConnectionOptions;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// List buckets or keys
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Bucket to list; omit to list buckets
    pub bucket: Option<String>,

    /// Start listing after this key
    #[arg(long, value_name = "KEY")]
    pub mark: Option<String>,

    /// Only list keys beginning with this prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Keys requested per page
    #[arg(long, value_name = "N")]
    pub batch: Option<u32>,

    /// Columns to print, comma separated
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_value = "Key",
        ignore_case = true
    )]
    pub fields: Vec<Field>,

    /// Print sizes in human-readable units
    #[arg(short = 'H', long)]
    pub human: bool,
}

/// A column of the key listing
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    #[value(name = "Key")]
    Key,
    #[value(name = "ETag")]
    ETag,
    #[value(name = "Size")]
    Size,
    #[value(name = "LastModified")]
    LastModified,
}

/// Execute the ls command
pub async fn execute(
    args: LsArgs,
    options: &ConnectionOptions,
    formatter: &Formatter,
) -> Result<ExitCode> {
    let (connection, defaults) = options.connect()?;
    let mut client = connection.open()?;

    let Some(bucket) = args.bucket else {
        let names = client.list_buckets().await?;
        if formatter.is_json() {
            formatter.json(&names);
        } else {
            for name in &names {
                formatter.println(name);
            }
        }
        return Ok(ExitCode::Success);
    };

    let list_options = ListOptions {
        marker: args.mark,
        prefix: args.prefix,
        max_keys: args.batch.or(defaults.list_batch),
    };

    let mut lister = client.list_keys(bucket, list_options);
    let mut count = 0usize;
    while let Some(entry) = lister.next().await? {
        if formatter.is_json() {
            formatter.json_line(&json_entry(&entry, &args.fields));
        } else {
            formatter.println(&render_row(&entry, &args.fields, args.human));
        }
        count += 1;
    }
    tracing::debug!(keys = count, pages = lister.pages(), "listing complete");

    Ok(ExitCode::Success)
}

fn format_size(size: u64, human: bool) -> String {
    if human {
        humansize::format_size(size, humansize::BINARY)
    } else {
        size.to_string()
    }
}

/// Tab-separated text row; absent values print as empty columns
fn render_row(entry: &ObjectEntry, fields: &[Field], human: bool) -> String {
    fields
        .iter()
        .map(|field| match field {
            Field::Key => entry.key.clone(),
            Field::ETag => entry.etag.clone().unwrap_or_default(),
            Field::Size => entry
                .size
                .map(|s| format_size(s, human))
                .unwrap_or_default(),
            Field::LastModified => entry.last_modified.clone().unwrap_or_default(),
        })
        .collect::<Vec<_>>()
        .join("\t")
}

fn json_entry(entry: &ObjectEntry, fields: &[Field]) -> Value {
    let mut object = Map::new();
    for field in fields {
        match field {
            Field::Key => {
                object.insert("key".into(), entry.key.clone().into());
            }
            Field::ETag => {
                if let Some(etag) = &entry.etag {
                    object.insert("etag".into(), etag.clone().into());
                }
            }
            Field::Size => {
                if let Some(size) = entry.size {
                    object.insert("size".into(), size.into());
                }
            }
            Field::LastModified => {
                if let Some(modified) = &entry.last_modified {
                    object.insert("last_modified".into(), modified.clone().into());
                }
            }
        }
    }
    Value::Object(object)
}

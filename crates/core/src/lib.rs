//! s3lib-core: protocol logic for the s3lib object storage client
//!
//! This crate provides everything that does not need a network:
//! - Credential and configuration loading
//! - Query argument and header encoding
//! - Request canonicalization and legacy HMAC-SHA1 signing
//! - Listing, bucket and batch-delete XML handling
//! - The `Transport` trait the operation layer sends requests through

pub mod batch;
pub mod config;
pub mod credentials;
pub mod encoding;
pub mod error;
pub mod request;
pub mod signing;
pub mod traits;
pub mod xml;

pub use batch::{Batches, batchify};
pub use config::{Config, ConfigManager, Defaults};
pub use credentials::Credentials;
pub use encoding::{ArgValue, Headers, QueryArgs, encode_key, parse_header, parse_headers};
pub use error::{Error, Result};
pub use request::{Method, RequestDescriptor, RequestSigner, SignedRequest};
pub use signing::{SignedPolicy, sign_policy};
pub use traits::{
    DeleteOutcome, DeleteStatus, ListPage, ObjectEntry, Response, StreamedResponse, Transport,
};

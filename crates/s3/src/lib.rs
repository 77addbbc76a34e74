//! s3lib-s3: HTTP connection and object operations for s3lib
//!
//! Signing and parsing live in `s3lib-core`; this crate sends the signed
//! requests over a keep-alive HTTP connection and exposes the object
//! operations and the paginated key listing.

pub mod client;
pub mod connection;
pub mod pagination;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ListOptions, ObjectBody, S3Client, object_url};
pub use connection::Connection;
pub use pagination::KeyLister;
pub use transport::HttpTransport;

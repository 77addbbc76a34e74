//! Transport trait and shared result types
//!
//! The transport is the only piece of the library that touches the
//! network. The operation layer is written against this trait so it can be
//! driven by a mock in tests.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::Serialize;

use crate::encoding::Headers;
use crate::error::Result;
use crate::request::SignedRequest;

/// A response whose body has been read to the end
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Reason phrase, e.g. `Not Found`
    pub reason: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// A response whose body is still being received
pub struct StreamedResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Headers,
    pub body: BoxStream<'static, Result<Bytes>>,
}

impl StreamedResponse {
    /// Wrap an already drained response
    pub fn buffered(response: Response) -> Self {
        let body = if response.body.is_empty() {
            stream::empty().boxed()
        } else {
            stream::once(async move { Ok(Bytes::from(response.body)) }).boxed()
        };
        Self {
            status: response.status,
            reason: response.reason,
            headers: response.headers,
            body,
        }
    }

    /// Read the rest of the body into memory
    pub async fn drain(self) -> Result<Response> {
        let mut stream = self.body;
        let mut body = Vec::new();
        while let Some(chunk) = stream.try_next().await? {
            body.extend_from_slice(&chunk);
        }
        Ok(Response {
            status: self.status,
            reason: self.reason,
            headers: self.headers,
            body,
        })
    }
}

impl fmt::Debug for StreamedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamedResponse")
            .field("status", &self.status)
            .field("reason", &self.reason)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Sends one signed request
///
/// [`Transport::send`] must not return before the body has been fully read,
/// so that the underlying connection can serve the next request. With
/// [`Transport::send_streaming`] draining the body is left to the caller.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, request: SignedRequest) -> Result<Response>;

    /// Send a request and hand back the body unread
    ///
    /// The default implementation buffers through [`Transport::send`].
    async fn send_streaming(&mut self, request: SignedRequest) -> Result<StreamedResponse> {
        self.send(request).await.map(StreamedResponse::buffered)
    }
}

/// One `Contents` element of a bucket listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectEntry {
    pub key: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

/// One page of a bucket listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub entries: Vec<ObjectEntry>,
    /// More keys follow the last entry
    pub truncated: bool,
}

impl ListPage {
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }
}

/// How the service answered for one key of a batch delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteStatus {
    Deleted,
    Failed {
        code: Option<String>,
        message: Option<String>,
    },
}

impl DeleteStatus {
    /// Element name the service used for this key
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Deleted => "Deleted",
            Self::Failed { .. } => "Error",
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub key: String,
    pub status: DeleteStatus,
}

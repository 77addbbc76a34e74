//! Object operations
//!
//! Every operation is one signed request followed by a status check. Any
//! status other than the operation's expected one becomes
//! [`Error::Protocol`] carrying the drained response body.

use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use futures::TryStreamExt;
use futures::stream::BoxStream;
use s3lib_core::encoding::encode_key;
use s3lib_core::xml;
use s3lib_core::{
    Credentials, DeleteOutcome, Error, Headers, ListPage, Method, QueryArgs, RequestDescriptor,
    RequestSigner, Response, Result, SignedRequest, Transport, batchify,
};
use url::Url;

use crate::pagination::KeyLister;
use crate::transport::HttpTransport;

/// Options for one listing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Start strictly after this key
    pub marker: Option<String>,
    pub prefix: Option<String>,
    /// Upper bound on keys per page
    pub max_keys: Option<u32>,
}

impl ListOptions {
    fn to_args(&self) -> QueryArgs {
        QueryArgs::new()
            .value_opt("marker", self.marker.as_deref())
            .value_opt("prefix", self.prefix.as_deref())
            .value_opt("max-keys", self.max_keys.map(|n| n.to_string()))
    }
}

/// Body of a downloaded object, read chunk by chunk
///
/// Borrows the client, so no other request can start on it until the body
/// is dropped. Dropping it before the end abandons the connection.
pub struct ObjectBody<'a> {
    headers: Headers,
    body: BoxStream<'static, Result<Bytes>>,
    received: u64,
    _client: PhantomData<&'a mut ()>,
}

impl ObjectBody<'_> {
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Size announced by the server
    pub fn content_length(&self) -> Option<u64> {
        self.headers.get("Content-Length")?.parse().ok()
    }

    /// Bytes handed out so far
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Next chunk of the body, or `None` once it has been read to the end
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        let chunk = self.body.try_next().await?;
        if let Some(chunk) = &chunk {
            self.received += chunk.len() as u64;
        }
        Ok(chunk)
    }

    /// Read the rest of the body into memory
    pub async fn bytes(mut self) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        while let Some(chunk) = self.chunk().await? {
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

impl fmt::Debug for ObjectBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBody")
            .field("headers", &self.headers)
            .field("received", &self.received)
            .finish_non_exhaustive()
    }
}

/// Client bound to one host and one transport handle
///
/// Operations take `&mut self`, so requests on one client never overlap.
/// Dropping the client (or calling [`S3Client::close`]) releases the
/// transport.
pub struct S3Client<T: Transport = HttpTransport> {
    transport: T,
    credentials: Credentials,
    host: String,
}

impl<T: Transport> S3Client<T> {
    pub fn new(transport: T, credentials: Credentials, host: impl Into<String>) -> Self {
        let host = host.into();
        tracing::debug!(host = %host, "connection opened");
        Self {
            transport,
            credentials,
            host,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the transport handle
    pub fn close(self) {
        drop(self);
    }

    fn sign(&self, request: RequestDescriptor) -> SignedRequest {
        RequestSigner::new(&self.credentials, &self.host).sign_now(request)
    }

    /// Sign, send and check the status of one request
    async fn execute(&mut self, request: RequestDescriptor, expected: u16) -> Result<Response> {
        let signed = self.sign(request);
        let response = self.transport.send(signed).await?;
        expect_status(response, expected)
    }

    /// Names of every bucket owned by the account
    pub async fn list_buckets(&mut self) -> Result<Vec<String>> {
        let response = self.execute(RequestDescriptor::new(Method::Get), 200).await?;
        xml::parse_list_buckets(&response.body)
    }

    /// Fetch a single listing page
    pub async fn list_bucket(&mut self, bucket: &str, options: &ListOptions) -> Result<ListPage> {
        let request = RequestDescriptor::new(Method::Get)
            .bucket(bucket)
            .args(options.to_args());
        let response = self.execute(request, 200).await?;
        xml::parse_list_objects(&response.body)
    }

    /// Lazily walk every key of a bucket, one page at a time
    pub fn list_keys(&mut self, bucket: impl Into<String>, options: ListOptions) -> KeyLister<'_, T> {
        KeyLister::new(self, bucket.into(), options)
    }

    /// Download an object
    ///
    /// The body is left on the wire for the caller to read. An error
    /// response is drained here and reported as [`Error::Protocol`].
    pub async fn get_object(
        &mut self,
        bucket: &str,
        key: &str,
        headers: Headers,
    ) -> Result<ObjectBody<'_>> {
        let request = RequestDescriptor::new(Method::Get)
            .bucket(bucket)
            .key(key)
            .headers(headers);
        let signed = self.sign(request);
        let response = self.transport.send_streaming(signed).await?;
        if response.status != 200 {
            let response = response.drain().await?;
            return Err(Error::protocol(
                response.status,
                response.reason,
                &response.body,
            ));
        }

        Ok(ObjectBody {
            headers: response.headers,
            body: response.body,
            received: 0,
            _client: PhantomData,
        })
    }

    /// Fetch object metadata
    pub async fn head_object(&mut self, bucket: &str, key: &str) -> Result<Headers> {
        let request = RequestDescriptor::new(Method::Head).bucket(bucket).key(key);
        let response = self.execute(request, 200).await?;
        Ok(response.headers)
    }

    /// Upload an object, returning the response headers (`ETag` among them)
    pub async fn put_object(
        &mut self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        headers: Headers,
    ) -> Result<Headers> {
        let request = RequestDescriptor::new(Method::Put)
            .bucket(bucket)
            .key(key)
            .headers(headers)
            .body(body);
        let response = self.execute(request, 200).await?;
        Ok(response.headers)
    }

    pub async fn delete_object(&mut self, bucket: &str, key: &str) -> Result<()> {
        let request = RequestDescriptor::new(Method::Delete).bucket(bucket).key(key);
        self.execute(request, 204).await?;
        Ok(())
    }

    /// Delete up to one request's worth of keys
    ///
    /// With `quiet`, the service only reports keys that failed.
    pub async fn delete_batch<S: AsRef<str>>(
        &mut self,
        bucket: &str,
        keys: &[S],
        quiet: bool,
    ) -> Result<Vec<DeleteOutcome>> {
        let request = RequestDescriptor::new(Method::Post)
            .bucket(bucket)
            .args(QueryArgs::new().flag("delete"))
            .body(xml::render_delete_body(keys, quiet));
        let response = self.execute(request, 200).await?;
        let outcomes = xml::parse_delete_result(&response.body)?;

        for outcome in outcomes.iter().filter(|o| !o.status.is_deleted()) {
            tracing::warn!(key = %outcome.key, status = ?outcome.status, "failed to delete key");
        }
        Ok(outcomes)
    }

    /// Delete any number of keys, `batch_size` keys per request
    ///
    /// Outcomes are returned in request order. A failing request stops the
    /// walk; per-key failures do not.
    pub async fn delete_objects<I>(
        &mut self,
        bucket: &str,
        keys: I,
        batch_size: usize,
        quiet: bool,
    ) -> Result<Vec<DeleteOutcome>>
    where
        I: IntoIterator<Item = String>,
    {
        let mut outcomes = Vec::new();
        for batch in batchify(batch_size, keys)? {
            tracing::debug!(bucket, keys = batch.len(), "deleting batch");
            outcomes.extend(self.delete_batch(bucket, batch.as_slice(), quiet).await?);
        }
        Ok(outcomes)
    }

    /// Server-side copy with metadata replaced by `headers`
    pub async fn copy_object(
        &mut self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
        headers: Headers,
    ) -> Result<()> {
        let mut merged = headers;
        merged.insert(
            "x-amz-copy-source",
            format!("/{src_bucket}/{}", encode_key(src_key)),
        );
        merged.insert("x-amz-metadata-directive", "REPLACE");

        let request = RequestDescriptor::new(Method::Put)
            .bucket(dst_bucket)
            .key(dst_key)
            .headers(merged);
        let response = self.execute(request, 200).await?;

        // A copy can fail after the 200 status line has been sent
        if xml::parse_error_code(&response.body).is_some() {
            return Err(Error::protocol(
                response.status,
                response.reason,
                &response.body,
            ));
        }
        Ok(())
    }

    pub fn object_url(&self, bucket: &str, key: &str) -> Result<Url> {
        object_url(&self.host, bucket, key)
    }
}

impl<T: Transport> Drop for S3Client<T> {
    fn drop(&mut self) {
        tracing::debug!(host = %self.host, "connection closed");
    }
}

/// Path-style public URL of an object
pub fn object_url(host: &str, bucket: &str, key: &str) -> Result<Url> {
    let mut url = Url::parse(&format!("https://{host}/"))?;
    url.path_segments_mut()
        .map_err(|()| Error::InvalidInput(format!("Cannot build an object URL on {host}")))?
        .pop_if_empty()
        .push(bucket)
        .extend(key.split('/'));
    Ok(url)
}

fn expect_status(response: Response, expected: u16) -> Result<Response> {
    if response.status == expected {
        Ok(response)
    } else {
        Err(Error::protocol(
            response.status,
            response.reason,
            &response.body,
        ))
    }
}

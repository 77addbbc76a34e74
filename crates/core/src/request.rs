//! Signed request assembly
//!
//! Turns a [`RequestDescriptor`] into a [`SignedRequest`] whose headers carry
//! `Authorization`, `Host` and `Date`. Two resource strings are derived:
//! the wire path (`/` + key + every query argument) and the canonical
//! resource that gets signed (`/bucket/key` + sub-resource arguments only).

use std::fmt;

use crate::credentials::Credentials;
use crate::encoding::{Headers, QueryArgs, encode_key, is_amz_header, split_headers};
use crate::signing;

/// HTTP methods used by the object API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Head,
    Delete,
    Post,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Head => "HEAD",
            Method::Delete => "DELETE",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything an operation knows about the request it wants to make
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Absent for service-level requests such as listing buckets
    pub bucket: Option<String>,
    pub key: Option<String>,
    pub args: QueryArgs,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl RequestDescriptor {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            bucket: None,
            key: None,
            args: QueryArgs::new(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn args(mut self, args: QueryArgs) -> Self {
        self.args = args;
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// `/bucket/key?subresource`, as the signature sees it
    pub fn canonical_resource(&self) -> String {
        let mut resource = String::from("/");
        if let Some(bucket) = &self.bucket {
            resource.push_str(bucket);
            resource.push('/');
            if let Some(key) = &self.key {
                resource.push_str(&encode_key(key));
            }
        }
        resource.push_str(&self.args.to_canonical_string());
        resource
    }

    /// `/key?args`, as sent on the request line
    pub fn wire_resource(&self) -> String {
        let mut resource = String::from("/");
        if let Some(key) = &self.key {
            resource.push_str(&encode_key(key));
        }
        resource.push_str(&self.args.to_query_string());
        resource
    }
}

/// A fully authenticated request, ready for a transport
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub method: Method,
    /// Value of the `Host` header (`bucket.host` or the bare host)
    pub host: String,
    /// Path and query string for the request line
    pub resource: String,
    pub headers: Headers,
    pub body: Vec<u8>,
    pub string_to_sign: String,
}

/// Signs request descriptors for one account against one host
#[derive(Debug, Clone, Copy)]
pub struct RequestSigner<'a> {
    credentials: &'a Credentials,
    host: &'a str,
}

impl<'a> RequestSigner<'a> {
    pub fn new(credentials: &'a Credentials, host: &'a str) -> Self {
        Self { credentials, host }
    }

    /// Sign a request as of `at`
    pub fn sign(&self, request: RequestDescriptor, at: jiff::Timestamp) -> SignedRequest {
        let http_date = signing::http_date(at);
        let canonical_resource = request.canonical_resource();
        let resource = request.wire_resource();

        let content_type = request.headers.get("Content-Type").unwrap_or("").to_string();
        let content_md5 = signing::content_md5(&request.body);

        // Content-Type travels in its own slot; only prefixed headers form the block
        let (special, _regular) = split_headers(&request.headers);
        let amz_headers: Headers = special
            .into_iter()
            .filter(|(name, _)| is_amz_header(name))
            .collect();

        let string_to_sign = signing::string_to_sign(
            request.method.as_str(),
            &content_md5,
            &content_type,
            &http_date,
            &amz_headers,
            &canonical_resource,
        );
        let signature = signing::sign(self.credentials.secret(), &string_to_sign);

        let host = match &request.bucket {
            Some(bucket) => format!("{bucket}.{}", self.host),
            None => self.host.to_string(),
        };

        let mut headers = request.headers;
        headers.insert("Host", host.clone());
        headers.insert("Date", http_date);
        headers.insert(
            "Authorization",
            format!("AWS {}:{signature}", self.credentials.access_id()),
        );
        headers.insert("Connection", "keep-alive");
        if !content_md5.is_empty() {
            headers.insert("Content-MD5", content_md5);
        }

        tracing::debug!(
            method = %request.method,
            resource = %resource,
            string_to_sign = %string_to_sign.escape_default(),
            "signed request"
        );

        SignedRequest {
            method: request.method,
            host,
            resource,
            headers,
            body: request.body,
            string_to_sign,
        }
    }

    /// Sign a request with the current time
    pub fn sign_now(&self, request: RequestDescriptor) -> SignedRequest {
        self.sign(request, jiff::Timestamp::now())
    }
}

//! Connection settings and client acquisition
//!
//! A [`Connection`] is inert until [`Connection::open`] creates the
//! transport. The returned [`S3Client`] owns that transport and releases it
//! when dropped, whether the operations it ran succeeded or not.

use std::time::Duration;

use s3lib_core::config::{DEFAULT_HOST, DEFAULT_PORT};
use s3lib_core::{Credentials, Defaults, Result, Transport};

use crate::client::S3Client;
use crate::transport::HttpTransport;

#[derive(Debug, Clone)]
pub struct Connection {
    credentials: Credentials,
    host: String,
    port: u16,
    timeout: Option<Duration>,
}

impl Connection {
    /// Connection to `s3.amazonaws.com:80` with no timeout
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout: None,
        }
    }

    /// Connection using configured defaults
    pub fn from_defaults(credentials: Credentials, defaults: &Defaults) -> Self {
        Self {
            credentials,
            host: defaults.host.clone(),
            port: defaults.port,
            timeout: defaults.timeout(),
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host_name(&self) -> &str {
        &self.host
    }

    pub fn port_number(&self) -> u16 {
        self.port
    }

    /// Create the transport and hand it to a new client
    pub fn open(&self) -> Result<S3Client<HttpTransport>> {
        let transport = HttpTransport::new(&self.host, self.port, self.timeout)?;
        Ok(self.open_with(transport))
    }

    /// Build a client over a caller-supplied transport
    pub fn open_with<T: Transport>(&self, transport: T) -> S3Client<T> {
        S3Client::new(transport, self.credentials.clone(), self.host.clone())
    }
}

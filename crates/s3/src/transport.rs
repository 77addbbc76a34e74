//! reqwest-backed transport
//!
//! Requests go to `host:port` over plain HTTP unless the port is 443. The
//! signed `Host` header is sent as-is, which gives virtual-host addressing
//! (`bucket.host`) without resolving the bucket subdomain.

use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::Client;
use s3lib_core::{
    Error, Headers, Method, Response, Result, SignedRequest, StreamedResponse, Transport,
};

/// HTTP transport holding one keep-alive connection to the service
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: Client,
    base_url: String,
}

impl HttpTransport {
    /// `timeout` bounds connecting and each wait for response data, not the
    /// whole transfer
    pub fn new(host: &str, port: u16, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().pool_max_idle_per_host(1);
        if let Some(timeout) = timeout {
            builder = builder.connect_timeout(timeout).read_timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url(host, port),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn base_url(host: &str, port: u16) -> String {
    let scheme = if port == 443 { "https" } else { "http" };
    format!("{scheme}://{host}:{port}")
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Put => reqwest::Method::PUT,
        Method::Head => reqwest::Method::HEAD,
        Method::Delete => reqwest::Method::DELETE,
        Method::Post => reqwest::Method::POST,
    }
}

/// Reason phrase as sent by the server, or the canonical one for the status
fn reason_phrase(response: &reqwest::Response) -> String {
    match response.extensions().get::<hyper::ext::ReasonPhrase>() {
        Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
        None => response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&mut self, request: SignedRequest) -> Result<Response> {
        self.send_streaming(request).await?.drain().await
    }

    async fn send_streaming(&mut self, request: SignedRequest) -> Result<StreamedResponse> {
        let url = format!("{}{}", self.base_url, request.resource);
        let mut request_builder = self.http_client.request(http_method(request.method), &url);

        for (name, value) in request.headers.iter() {
            request_builder = request_builder.header(name, value);
        }

        if !request.body.is_empty() || request.method == Method::Put {
            request_builder = request_builder.body(request.body);
        }

        let response = request_builder
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Request failed: {e}")))?;

        let status = response.status().as_u16();
        let reason = reason_phrase(&response);
        let headers: Headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response
            .bytes_stream()
            .map_err(|e| Error::Transport(format!("Failed to read response: {e}")))
            .boxed();

        Ok(StreamedResponse {
            status,
            reason,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use s3lib_core::{Credentials, QueryArgs, RequestDescriptor, RequestSigner};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    #[test]
    fn test_base_url_scheme() {
        assert_eq!(base_url("s3.amazonaws.com", 80), "http://s3.amazonaws.com:80");
        assert_eq!(base_url("s3.amazonaws.com", 443), "https://s3.amazonaws.com:443");
        assert_eq!(base_url("localhost", 9000), "http://localhost:9000");
    }

    #[test]
    fn test_http_method() {
        assert_eq!(http_method(Method::Get), reqwest::Method::GET);
        assert_eq!(http_method(Method::Post), reqwest::Method::POST);
        assert_eq!(http_method(Method::Head), reqwest::Method::HEAD);
    }

    /// Accept one connection and read the request head off it
    async fn accept_request(listener: &TcpListener) -> (TcpStream, String) {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        while !received.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
        }
        (socket, String::from_utf8_lossy(&received).into_owned())
    }

    /// Serve one canned response and hand back the raw request head
    async fn serve_once(listener: TcpListener, reply: &'static str) -> String {
        let (mut socket, head) = accept_request(&listener).await;
        socket.write_all(reply.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        head
    }

    async fn bind() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    fn get_request() -> SignedRequest {
        let credentials = Credentials::new("id", "secret");
        RequestSigner::new(&credentials, "127.0.0.1")
            .sign_now(RequestDescriptor::new(Method::Get).bucket("b").key("k"))
    }

    #[tokio::test]
    async fn test_send_uses_signed_host_and_drains_body() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(serve_once(
            listener,
            "HTTP/1.1 404 Not Found\r\nContent-Length: 30\r\nx-amz-request-id: 42\r\n\r\n<Error><Code>NoSuchKey</Code>\n",
        ));

        let credentials = Credentials::new("id", "secret");
        let signer = RequestSigner::new(&credentials, "127.0.0.1");
        let request = signer.sign_now(
            RequestDescriptor::new(Method::Get)
                .bucket("photos")
                .key("a b.jpg")
                .args(QueryArgs::new().flag("acl")),
        );

        let mut transport = HttpTransport::new("127.0.0.1", port, None).unwrap();
        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.reason, "Not Found");
        assert_eq!(response.headers.get("x-amz-request-id"), Some("42"));
        assert_eq!(response.body, b"<Error><Code>NoSuchKey</Code>\n");

        let head = server.await.unwrap().to_ascii_lowercase();
        assert!(head.starts_with("get /a%20b.jpg?acl http/1.1\r\n"));
        assert!(head.contains("host: photos.127.0.0.1\r\n"));
        assert!(head.contains("authorization: aws id:"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let credentials = Credentials::new("id", "secret");
        let request = RequestSigner::new(&credentials, "127.0.0.1")
            .sign_now(RequestDescriptor::new(Method::Get));

        let mut transport = HttpTransport::new("127.0.0.1", port, None).unwrap();
        let err = transport.send(request).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_timeout_bounds_each_read_not_the_transfer() {
        let (listener, port) = bind().await;
        let server = tokio::spawn(async move {
            let (mut socket, _) = accept_request(&listener).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 6\r\n\r\n")
                .await
                .unwrap();
            for byte in b"abcdef" {
                tokio::time::sleep(Duration::from_millis(400)).await;
                socket.write_all(&[*byte]).await.unwrap();
            }
            socket.shutdown().await.unwrap();
        });

        let mut transport =
            HttpTransport::new("127.0.0.1", port, Some(Duration::from_secs(1))).unwrap();
        let response = transport.send(get_request()).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"abcdef");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_stalled_body_times_out() {
        let (listener, port) = bind().await;
        let server = tokio::spawn(async move {
            let (mut socket, _) = accept_request(&listener).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 6\r\n\r\nab")
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(socket);
        });

        let mut transport =
            HttpTransport::new("127.0.0.1", port, Some(Duration::from_millis(200))).unwrap();
        let err = transport.send(get_request()).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        server.abort();
    }

    #[tokio::test]
    async fn test_reason_phrase_from_server() {
        let (listener, port) = bind().await;
        let server = tokio::spawn(serve_once(
            listener,
            "HTTP/1.1 503 Slow Down Please\r\nContent-Length: 0\r\n\r\n",
        ));

        let mut transport = HttpTransport::new("127.0.0.1", port, None).unwrap();
        let response = transport.send(get_request()).await.unwrap();
        assert_eq!(response.status, 503);
        assert_eq!(response.reason, "Slow Down Please");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_streaming_yields_chunks_as_they_arrive() {
        let (listener, port) = bind().await;
        let (release, released) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let (mut socket, _) = accept_request(&listener).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 6\r\nETag: \"e\"\r\n\r\nabc")
                .await
                .unwrap();
            released.await.unwrap();
            socket.write_all(b"def").await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let mut transport = HttpTransport::new("127.0.0.1", port, None).unwrap();
        let mut response = transport.send_streaming(get_request()).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.headers.get("etag"), Some("\"e\""));

        // The second half is only sent once the first has been received
        let first = response.body.try_next().await.unwrap().unwrap();
        assert_eq!(&first[..], b"abc");
        release.send(()).unwrap();

        let rest = response.drain().await.unwrap();
        assert_eq!(rest.body, b"def");
        server.await.unwrap();
    }
}

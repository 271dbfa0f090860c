//! Minimal HTTP/1.1 GET client.
//!
//! Uses `std::net::TcpStream` for the connection and speaks HTTP/1.1 by
//! hand. HTTPS goes through rustls when the "tls" feature is enabled.
//!
//! # Design Notes
//!
//! - The TCP destination can differ from the URI host. The Host header and
//!   the TLS server name always come from the URI.
//! - Responses are read until the server closes the connection
//!   (`Connection: close`); chunked transfer encoding is decoded. A timeout
//!   only ends the read when the message is already complete.
//! - Certificate problems never abort the request. They are returned as a
//!   warning next to the response.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};
use url::{Host, Url};

use crate::CheckError;

/// HTTP response from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase from the status line
    pub reason: String,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: String,
}

impl HttpResponse {
    /// Client or server error (4xx/5xx)
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Get a header value by name (case-insensitive)
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response plus anything noticed while fetching it
#[derive(Debug, Clone)]
pub struct HttpExchange {
    pub response: HttpResponse,
    /// Certificate validation problem, if any
    pub warning: Option<String>,
}

/// Configuration for HTTP requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Read/write timeout in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            connect_timeout_ms: 30000,
            read_timeout_ms: 100000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

/// Where a GET is aimed, taken from an absolute URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub scheme: Scheme,
    /// Host without IPv6 brackets, used for resolution and TLS server name
    pub host: String,
    pub port: u16,
    /// Value of the Host header
    pub authority: String,
    /// Path and query, always starting with '/'
    pub path: String,
}

impl RequestTarget {
    pub fn from_url(url: &Url) -> Result<Self, CheckError> {
        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => {
                return Err(CheckError::UnsupportedScheme {
                    scheme: other.to_string(),
                })
            }
        };

        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => {
                return Err(CheckError::InvalidEndpoint {
                    endpoint: url.to_string(),
                })
            }
        };

        let host_str = url.host_str().unwrap_or(&host);
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host_str, port),
            None => host_str.to_string(),
        };

        let mut path = url.path().to_string();
        if path.is_empty() {
            path.push('/');
        }
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        Ok(RequestTarget {
            scheme,
            port: url.port_or_known_default().unwrap_or(scheme.default_port()),
            host,
            authority,
            path,
        })
    }
}

/// Simple HTTP client
pub struct HttpClient {
    config: HttpConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Self {
        HttpClient {
            config: HttpConfig::default(),
        }
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpConfig) -> Self {
        HttpClient { config }
    }

    /// GET the target, optionally connecting to `route_via` instead of the
    /// target's own host.
    pub fn get(
        &self,
        target: &RequestTarget,
        route_via: Option<&str>,
    ) -> Result<HttpExchange, CheckError> {
        let (host, routed) = match route_via {
            Some(via) => (via.trim_start_matches('[').trim_end_matches(']'), true),
            None => (target.host.as_str(), false),
        };

        info!(
            host = %target.authority,
            path = %target.path,
            via = host,
            port = target.port,
            "sending GET"
        );

        let addrs = self.resolve(host, target.port, routed)?;
        let stream = self.connect(&addrs, &format!("{}:{}", host, target.port))?;
        let request = self.build_request(target);

        match target.scheme {
            Scheme::Http => self.exchange_plain(stream, target, &request),
            Scheme::Https => self.exchange_tls(stream, target, &request),
        }
    }

    fn resolve(&self, host: &str, port: u16, routed: bool) -> Result<Vec<SocketAddr>, CheckError> {
        let resolved = (host, port)
            .to_socket_addrs()
            .map(|addrs| addrs.collect::<Vec<_>>());

        match resolved {
            Ok(addrs) if !addrs.is_empty() => {
                debug!(host, count = addrs.len(), "resolved");
                Ok(addrs)
            }
            Ok(_) if routed => Err(CheckError::HostNotFound {
                host: host.to_string(),
            }),
            Ok(_) => Err(CheckError::Resolve {
                host: host.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "No address resolved"),
            }),
            Err(e) if routed => {
                debug!(host, error = %e, "routing host did not resolve");
                Err(CheckError::HostNotFound {
                    host: host.to_string(),
                })
            }
            Err(e) => Err(CheckError::Resolve {
                host: host.to_string(),
                source: e,
            }),
        }
    }

    fn connect(&self, addrs: &[SocketAddr], address: &str) -> Result<TcpStream, CheckError> {
        let timeout = Duration::from_millis(self.config.connect_timeout_ms);
        let mut last_error = None;

        for addr in addrs {
            debug!(%addr, "connecting");
            match TcpStream::connect_timeout(addr, timeout) {
                Ok(stream) => {
                    let io_timeout = Some(Duration::from_millis(self.config.read_timeout_ms));
                    stream.set_read_timeout(io_timeout).ok();
                    stream.set_write_timeout(io_timeout).ok();
                    return Ok(stream);
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(CheckError::Connect {
            address: address.to_string(),
            source: last_error
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "No address resolved")),
        })
    }

    fn exchange_plain(
        &self,
        mut stream: TcpStream,
        target: &RequestTarget,
        request: &str,
    ) -> Result<HttpExchange, CheckError> {
        stream
            .write_all(request.as_bytes())
            .map_err(|e| CheckError::Io {
                context: format!("writing request to {}", target.authority),
                source: e,
            })?;

        let response = self.read_response(&mut stream, &target.authority)?;
        Ok(HttpExchange {
            response,
            warning: None,
        })
    }

    #[cfg(feature = "tls")]
    fn exchange_tls(
        &self,
        mut stream: TcpStream,
        target: &RequestTarget,
        request: &str,
    ) -> Result<HttpExchange, CheckError> {
        use std::sync::Arc;

        use crate::net::tls::{CertificateWarnings, RecordingVerifier};

        let warnings = CertificateWarnings::default();
        let verifier = RecordingVerifier::new(warnings.clone())?;

        let config = rustls::ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(verifier))
            .with_no_client_auth();

        let server_name = rustls::pki_types::ServerName::try_from(target.host.clone())
            .map_err(|_| CheckError::Tls(format!("Invalid server name: {}", target.host)))?;

        let mut conn = rustls::ClientConnection::new(Arc::new(config), server_name)
            .map_err(|e| CheckError::Tls(e.to_string()))?;

        let mut tls_stream = rustls::Stream::new(&mut conn, &mut stream);

        tls_stream
            .write_all(request.as_bytes())
            .map_err(|e| CheckError::Io {
                context: format!("TLS write to {}", target.authority),
                source: e,
            })?;

        let response = self.read_response(&mut tls_stream, &target.authority)?;
        Ok(HttpExchange {
            response,
            warning: warnings.take(),
        })
    }

    #[cfg(not(feature = "tls"))]
    fn exchange_tls(
        &self,
        _stream: TcpStream,
        _target: &RequestTarget,
        _request: &str,
    ) -> Result<HttpExchange, CheckError> {
        Err(CheckError::TlsUnavailable)
    }

    fn build_request(&self, target: &RequestTarget) -> String {
        format!(
            "GET {} HTTP/1.1\r\n\
             Host: {}\r\n\
             User-Agent: check-service/{}\r\n\
             Accept: */*\r\n\
             Connection: close\r\n\
             \r\n",
            target.path,
            target.authority,
            env!("CARGO_PKG_VERSION")
        )
    }

    fn read_response<R: Read>(&self, reader: &mut R, peer: &str) -> Result<HttpResponse, CheckError> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 8192];

        loop {
            match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) && is_complete(&buffer) =>
                {
                    // Server kept the connection open after a full message
                    break;
                }
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    // Peer closed without TLS close_notify
                    break;
                }
                Err(e) => {
                    return Err(CheckError::Io {
                        context: format!("reading response from {}", peer),
                        source: e,
                    });
                }
            }
        }

        debug!(bytes = buffer.len(), "response read");
        parse_response(&buffer)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Whether `buffer` holds a whole message as announced by its headers.
/// A body without length or chunking only ends at EOF.
fn is_complete(buffer: &[u8]) -> bool {
    let Some(header_end) = find(buffer, b"\r\n\r\n") else {
        return false;
    };
    let headers = String::from_utf8_lossy(&buffer[..header_end]).to_ascii_lowercase();
    let body = &buffer[header_end + 4..];

    let header = |name: &str| {
        headers.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            (key.trim() == name).then(|| value.trim().to_string())
        })
    };

    if header("transfer-encoding").map_or(false, |te| te.contains("chunked")) {
        return body.ends_with(b"0\r\n\r\n");
    }

    header("content-length")
        .and_then(|len| len.parse::<usize>().ok())
        .map_or(false, |len| body.len() >= len)
}

fn parse_response(buffer: &[u8]) -> Result<HttpResponse, CheckError> {
    let header_end = find(buffer, b"\r\n\r\n").ok_or_else(|| {
        CheckError::MalformedResponse("no header/body separator".to_string())
    })?;

    let header_section = String::from_utf8_lossy(&buffer[..header_end]);
    let raw_body = &buffer[header_end + 4..];

    // Parse status line
    let mut lines = header_section.lines();
    let status_line = lines
        .next()
        .ok_or_else(|| CheckError::MalformedResponse("Empty response".to_string()))?;

    let (status, reason) = parse_status_line(status_line)?;

    // Parse headers
    let mut headers = Vec::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    let mut response = HttpResponse {
        status,
        reason,
        headers,
        body: String::new(),
    };

    let chunked = response
        .get_header("transfer-encoding")
        .map_or(false, |te| te.to_ascii_lowercase().contains("chunked"));

    let body = if chunked {
        decode_chunked(raw_body)?
    } else {
        let length = response
            .get_header("content-length")
            .and_then(|len| len.parse::<usize>().ok())
            .unwrap_or(raw_body.len());
        raw_body[..length.min(raw_body.len())].to_vec()
    };

    response.body = String::from_utf8_lossy(&body).into_owned();
    Ok(response)
}

fn parse_status_line(line: &str) -> Result<(u16, String), CheckError> {
    // Format: "HTTP/1.1 200 OK"
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        return Err(CheckError::MalformedResponse(format!(
            "Invalid status line: {}",
            line
        )));
    }

    let code = parts.next().unwrap_or_default();
    let status = code.parse().map_err(|_| {
        CheckError::MalformedResponse(format!("Invalid status code: {}", code))
    })?;

    let reason = match parts.next().map(str::trim) {
        Some(reason) if !reason.is_empty() => reason.to_string(),
        _ => default_reason(status).to_string(),
    };

    Ok((status, reason))
}

/// Reason phrase for servers that omit one
fn default_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}

fn decode_chunked(body: &[u8]) -> Result<Vec<u8>, CheckError> {
    let mut result = Vec::new();
    let mut remaining = body;

    loop {
        // Find chunk size line
        let size_end = find(remaining, b"\r\n").ok_or_else(|| {
            CheckError::MalformedResponse("Invalid chunked encoding".to_string())
        })?;

        let size_line = String::from_utf8_lossy(&remaining[..size_end]);
        // Drop chunk extensions
        let size_str = size_line.split(';').next().unwrap_or_default().trim();
        let chunk_size = usize::from_str_radix(size_str, 16).map_err(|_| {
            CheckError::MalformedResponse(format!("Invalid chunk size: {}", size_str))
        })?;

        if chunk_size == 0 {
            break;
        }

        let chunk_start = size_end + 2;
        let chunk_end = chunk_start.checked_add(chunk_size).ok_or_else(|| {
            CheckError::MalformedResponse(format!("Invalid chunk size: {}", size_str))
        })?;

        if chunk_end > remaining.len() {
            // Incomplete chunk, take what we have
            result.extend_from_slice(&remaining[chunk_start..]);
            break;
        }

        result.extend_from_slice(&remaining[chunk_start..chunk_end]);
        // Skip chunk data and trailing \r\n
        remaining = &remaining[(chunk_end + 2).min(remaining.len())..];
    }

    Ok(result)
}

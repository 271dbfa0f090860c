//! The production checker: a real HTTP GET over the network.

use tracing::{debug, info};
use url::Url;

use crate::check::{CheckRequest, Checker};
use crate::engine::result::CheckOutcome;
use crate::net::client::{HttpClient, HttpConfig, HttpExchange, RequestTarget};
use crate::CheckError;

/// Redirect hops followed before giving up
pub const DEFAULT_MAX_REDIRECTS: u32 = 50;

/// Checks a host by issuing a GET to it
pub struct HostChecker {
    client: HttpClient,
    max_redirects: u32,
}

impl HostChecker {
    pub fn new() -> Self {
        Self::with_config(HttpConfig::default())
    }

    pub fn with_config(config: HttpConfig) -> Self {
        HostChecker {
            client: HttpClient::with_config(config),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    pub fn with_max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// GET `url`, following redirects. Every hop goes through the same
    /// routing host; Host header and server name follow the new location.
    fn fetch(&self, mut url: Url, route_via: Option<&str>) -> Result<HttpExchange, CheckError> {
        let mut redirects = 0;
        let mut warning = None;

        loop {
            let target = RequestTarget::from_url(&url)?;
            let mut exchange = self.client.get(&target, route_via)?;
            warning = warning.or(exchange.warning.take());

            let location = match redirect_location(&exchange).map(str::to_string) {
                Some(location) => location,
                None => {
                    exchange.warning = warning;
                    return Ok(exchange);
                }
            };

            if redirects >= self.max_redirects {
                return Err(CheckError::Other(format!(
                    "Too many redirects: gave up after {} at {}",
                    redirects, url
                )));
            }
            redirects += 1;

            url = url.join(&location).map_err(|_| {
                CheckError::MalformedResponse(format!("Invalid redirect location: {}", location))
            })?;
            info!(status = exchange.response.status, location = %url, "following redirect");
        }
    }
}

fn redirect_location(exchange: &HttpExchange) -> Option<&str> {
    match exchange.response.status {
        301 | 302 | 303 | 307 | 308 => exchange.response.get_header("location"),
        _ => None,
    }
}

impl Default for HostChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for HostChecker {
    fn check(&self, request: &CheckRequest) -> Result<CheckOutcome, CheckError> {
        let url = Url::parse(&request.uri).map_err(|e| {
            debug!(uri = %request.uri, error = %e, "URI rejected");
            CheckError::InvalidEndpoint {
                endpoint: request.uri.clone(),
            }
        })?;

        let exchange = self.fetch(url, request.dns_override.as_deref())?;
        let response = exchange.response;

        // Error statuses are surfaced as failures carrying the response
        if response.is_error() {
            return Err(CheckError::ErrorResponse {
                response,
                warning: exchange.warning,
            });
        }

        Ok(CheckOutcome {
            status: Some(response.status),
            reason: response.reason,
            body: response.body,
            warning: exchange.warning,
        })
    }
}

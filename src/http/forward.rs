//! Request forwarding with retry.
//!
//! One [`Forwarder`] is shared by every plain-request session. Per
//! request it buffers the complete inbound body, builds the outbound
//! request once, and drives the retry policy over attempts sent through
//! the fixed upstream proxy. Redirects are never followed and bodies are
//! never re-encoded; whatever the upstream answered is what the client
//! gets, minus the reserved headers.

use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response};
use thiserror::Error;

use crate::config::ProxyConfig;
use crate::http::headers::filter_headers;
use crate::http::token::RequestToken;
use crate::resilience::classify::is_silent_transient;
use crate::resilience::retries::RetryPolicy;

/// Injected header carrying the original request target.
pub const REQUEST_URI_HEADER: &str = "request-uri";
/// Injected cache-defeating header carrying the correlation token.
pub const CACHE_TOKEN_HEADER: &str = "cache-token";

/// Error type for forwarder construction.
#[derive(Debug, Error)]
pub enum ForwarderError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Everything needed to replay one upstream attempt. Built once per
/// inbound request and reused unmodified across retries.
struct OutboundSpec {
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Option<Bytes>,
}

/// A fully buffered upstream response.
struct UpstreamResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

/// Forwards plain HTTP requests through the upstream proxy.
pub struct Forwarder {
    client: reqwest::Client,
    policy: RetryPolicy,
    attempt_timeout: Duration,
}

impl Forwarder {
    pub fn new(config: &ProxyConfig) -> Result<Self, ForwarderError> {
        let client = reqwest::Client::builder()
            .proxy(reqwest::Proxy::all(config.upstream.url())?)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            policy: RetryPolicy::new(config.retries.max_attempts, config.retries.delay()),
            attempt_timeout: config.timeouts.attempt(),
        })
    }

    /// Handles one inbound request end to end.
    ///
    /// Always produces a response; exhaustion without any upstream answer
    /// becomes a bare 503 with an empty body.
    pub async fn handle(&self, request: Request<Incoming>) -> Response<Full<Bytes>> {
        let (parts, body) = request.into_parts();

        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read inbound request body");
                return empty_response(StatusCode::BAD_REQUEST);
            }
        };

        let token = RequestToken::new();
        let url = parts.uri.to_string();
        let path = request_path(&url).unwrap_or_else(|| parts.uri.path().to_string());

        let mut headers = filter_headers(&parts.headers);
        if let Ok(value) = HeaderValue::from_str(&url) {
            headers.insert(HeaderName::from_static(REQUEST_URI_HEADER), value);
        }
        if let Ok(value) = HeaderValue::from_str(token.as_str()) {
            headers.insert(HeaderName::from_static(CACHE_TOKEN_HEADER), value);
        }

        let spec = OutboundSpec {
            method: parts.method,
            url,
            headers,
            body: if body.is_empty() { None } else { Some(body) },
        };

        let started = Instant::now();
        let client = &self.client;
        let attempt_timeout = self.attempt_timeout;
        let spec_ref = &spec;
        let log_token = &token;
        let log_path = path.as_str();

        let outcome = self
            .policy
            .run(
                move |attempt| {
                    tracing::info!(token = %log_token, path = %log_path, "Try # {attempt}");
                    send_attempt(client, attempt_timeout, spec_ref)
                },
                |response: &UpstreamResponse| response.status != StatusCode::SERVICE_UNAVAILABLE,
                |attempt, err: &reqwest::Error| {
                    if is_silent_transient(err) {
                        tracing::debug!(
                            token = %log_token,
                            attempt,
                            error = %err,
                            "transient upstream error"
                        );
                    } else {
                        tracing::error!(
                            token = %log_token,
                            attempt,
                            error = %err,
                            "unexpected upstream error"
                        );
                    }
                },
            )
            .await;

        let response = match outcome {
            Some(upstream) => {
                let mut builder = Response::builder().status(upstream.status);
                if let Some(headers) = builder.headers_mut() {
                    *headers = filter_headers(&upstream.headers);
                }
                builder
                    .body(Full::new(upstream.body))
                    .unwrap_or_else(|_| empty_response(StatusCode::SERVICE_UNAVAILABLE))
            }
            None => empty_response(StatusCode::SERVICE_UNAVAILABLE),
        };

        tracing::info!(
            token = %token,
            path = %path,
            "Fin {:.3}s",
            started.elapsed().as_secs_f64()
        );
        response
    }
}

/// One upstream attempt: send through the proxy, buffer the whole answer.
/// A mid-body failure counts as a failed attempt, not a partial response.
async fn send_attempt(
    client: &reqwest::Client,
    timeout: Duration,
    spec: &OutboundSpec,
) -> Result<UpstreamResponse, reqwest::Error> {
    let mut builder = client
        .request(spec.method.clone(), &spec.url)
        .headers(spec.headers.clone())
        .timeout(timeout);
    if let Some(body) = &spec.body {
        builder = builder.body(body.clone());
    }

    let response = builder.send().await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?;

    Ok(UpstreamResponse {
        status,
        headers,
        body,
    })
}

/// Path component of an absolute request target, for log correlation.
fn request_path(target: &str) -> Option<String> {
    url::Url::parse(target).ok().map(|url| url.path().to_string())
}

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

//! Request execution engine.
//!
//! # Data Flow
//! ```text
//! HttpRequest
//!     → encode body, build TLS config + transport
//!     → round trip (caller headers, Content-Type, Authorization on every hop)
//!     → 3xx? next hop under the redirect budget : read final response
//!     → RawResponse
//! ```
//!
//! # Design Decisions
//! - Redirects are followed here instead of by reqwest, which strips
//!   `Authorization` on cross-host hops
//! - The whole call (all hops plus the body read) runs under the client
//!   timeout and the caller's context
//! - Every failure is logged here with its full error chain

use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::context::Context;
use crate::error::{ClientError, Result};
use crate::http::client::HttpClient;
use crate::http::redirect::{self, Hop, RedirectState};
use crate::http::request::HttpRequest;
use crate::http::response::{self, RawResponse};
use crate::net::{build_tls_config, build_transport};
use crate::observability::metrics;

/// Execute `request` with the policy of `client`.
pub(crate) async fn execute<B: Serialize + Sync>(
    cx: &Context,
    client: &HttpClient,
    request: &HttpRequest<B>,
) -> Result<RawResponse> {
    let request_id = Uuid::new_v4();
    let span = tracing::debug_span!(
        "request",
        request_id = %request_id,
        method = %request.method,
    );

    async {
        let start = Instant::now();
        let result = execute_inner(cx, client, request, start).await;

        match &result {
            Ok(response) => {
                metrics::record_request(request.method.as_str(), response.status.as_u16(), start);
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %request.endpoint,
                    kind = e.kind(),
                    error = %e.chain(),
                    "Doing request failed"
                );
                metrics::record_error(e.kind());
            }
        }
        result
    }
    .instrument(span)
    .await
}

async fn execute_inner<B: Serialize + Sync>(
    cx: &Context,
    client: &HttpClient,
    request: &HttpRequest<B>,
    start: Instant,
) -> Result<RawResponse> {
    let header_names: Vec<&str> = request.headers.keys().map(String::as_str).collect();
    tracing::debug!(
        method = %request.method,
        endpoint = %request.endpoint,
        headers = ?header_names,
        has_body = request.body.is_some(),
        "Request Object"
    );

    let body = request.encode_body()?;
    let url = request.validate()?;
    let headers = request.header_map()?;

    let config = client.config();
    let tls = build_tls_config(config)?;
    let transport = build_transport(config, tls)?;

    let first = Hop {
        method: request.method.clone(),
        url,
        body,
    };
    let redirects = RedirectState::new(config.max_redirects);
    let round_trips = follow(&transport, client, &headers, first, redirects, start);

    let Some(timeout) = config.call_timeout() else {
        return cx.run(round_trips).await?;
    };
    match cx.run(tokio::time::timeout(timeout, round_trips)).await? {
        Ok(result) => result,
        Err(_elapsed) => Err(ClientError::Timeout(timeout)),
    }
}

/// Issue hops until a final response arrives or the redirect budget is spent.
async fn follow(
    transport: &reqwest::Client,
    client: &HttpClient,
    headers: &HeaderMap,
    mut hop: Hop,
    mut redirects: RedirectState,
    start: Instant,
) -> Result<RawResponse> {
    loop {
        let response = round_trip(transport, client, headers, &hop).await?;
        let status = response.status();

        let Some(next) = redirect::next_hop(status, response.headers(), &hop) else {
            return response::read_response(
                response,
                start,
                redirects.hops_followed(),
                client.config().call_timeout(),
            )
            .await;
        };

        if let Err(e) = redirects.follow() {
            tracing::error!(location = %next.url, "{}", e);
            return Err(e);
        }
        tracing::debug!(
            status = %status,
            from = %hop.url,
            to = %next.url,
            method = %next.method,
            hop = redirects.hops_followed(),
            "Following redirect"
        );

        drop(response);
        hop = next;
    }
}

async fn round_trip(
    transport: &reqwest::Client,
    client: &HttpClient,
    headers: &HeaderMap,
    hop: &Hop,
) -> Result<reqwest::Response> {
    let mut hop_headers = headers.clone();
    if hop.body.is_some() && !hop_headers.contains_key(CONTENT_TYPE) {
        hop_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    if let Some(authorization) = client.authorization() {
        hop_headers.insert(AUTHORIZATION, authorization.clone());
    }

    let body = hop.body.clone().unwrap_or_default();
    transport
        .request(hop.method.clone(), hop.url.clone())
        .headers(hop_headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            ClientError::from_reqwest(e, client.config().call_timeout(), ClientError::Transport)
        })
}

//! The read-through handler shared by every republished endpoint route.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use lingo_relay::{apply_selected, response_cache_key, RequestContext};

use crate::api_error::RelayApiError;
use crate::response_cache::CachedResponse;
use crate::GatewayState;

pub(crate) async fn handle_relay(
    state: Arc<GatewayState>,
    endpoint_name: String,
    path_params: BTreeMap<String, String>,
    query_pairs: Vec<(String, String)>,
) -> Response {
    match relay_response(&state, &endpoint_name, path_params, query_pairs).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

async fn relay_response(
    state: &GatewayState,
    endpoint_name: &str,
    path_params: BTreeMap<String, String>,
    query_pairs: Vec<(String, String)>,
) -> Result<Response, RelayApiError> {
    let endpoint = state.registry.by_name(endpoint_name).ok_or_else(|| {
        RelayApiError::internal(
            "unregistered_endpoint",
            format!("endpoint '{endpoint_name}' is not registered"),
        )
    })?;
    let context = RequestContext::build(endpoint, path_params, query_pairs)
        .map_err(RelayApiError::from_relay)?;
    let local_path = endpoint
        .template()
        .resolve_local_path(&context.path_params)
        .map_err(RelayApiError::from_relay)?;
    let cache_key = response_cache_key(endpoint.name(), &local_path, &context.cache_query());
    if let Some(hit) = state.cache.fetch(&cache_key) {
        return Ok(hit.into_http_response());
    }

    let payload = state
        .upstream
        .fetch_json(&context.upstream_url, &context.forward_query)
        .await?;
    let modified = apply_selected(endpoint, &payload.value, context.modification.as_deref())
        .map_err(RelayApiError::from_relay)?;
    let body = serde_json::to_string_pretty(&modified).map_err(|error| {
        RelayApiError::internal("encode_failed", format!("could not encode reply: {error}"))
    })?;

    let mut headers = vec![
        ("content-type".to_string(), "application/json".to_string()),
        ("access-control-allow-origin".to_string(), "*".to_string()),
        (
            "x-documentation".to_string(),
            endpoint.docs_url().to_string(),
        ),
        ("x-url".to_string(), context.upstream_url.clone()),
        (
            "x-url-template".to_string(),
            endpoint.template().raw().to_string(),
        ),
    ];
    headers.extend(payload.vendor_headers);

    let reply = CachedResponse {
        status: 200,
        headers,
        body,
    };
    state
        .cache
        .store(&cache_key, reply.clone(), state.cache_ttl_seconds);
    Ok(reply.into_http_response())
}

//! Badge endpoints: JSON payloads for the renderer's endpoint mode and
//! redirects into its static mode.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use lingo_relay::{
    compute_progress, parse_badge_filename, response_cache_key, static_badge_url, BadgePayload,
    EndpointRole, RelayError, StatKind,
};

use crate::api_error::RelayApiError;
use crate::response_cache::CachedResponse;
use crate::GatewayState;

pub(crate) const BADGE_PROJECT_ROUTE: &str = "/badge/{organization}/project/{project}/{filename}";
pub(crate) const BADGE_LANGUAGE_ROUTE: &str =
    "/badge/{organization}/project/{project}/language/{language}/{filename}";

pub(crate) async fn handle_project_badge(
    State(state): State<Arc<GatewayState>>,
    Path((organization, project, filename)): Path<(String, String, String)>,
) -> Response {
    match badge_response(&state, &organization, &project, None, &filename).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn handle_language_badge(
    State(state): State<Arc<GatewayState>>,
    Path((organization, project, language, filename)): Path<(String, String, String, String)>,
) -> Response {
    match badge_response(&state, &organization, &project, Some(language), &filename).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

async fn badge_response(
    state: &GatewayState,
    organization: &str,
    project: &str,
    language: Option<String>,
    filename: &str,
) -> Result<Response, RelayApiError> {
    let (stat, extension) = parse_badge_filename(filename).ok_or_else(|| {
        RelayApiError::not_found(format!("badge filename '{filename}' has no file extension"))
    })?;
    let kind: StatKind = stat.parse().map_err(RelayApiError::from_relay)?;

    let mut local_path = format!("/badge/{organization}/project/{project}");
    if let Some(language) = &language {
        local_path.push_str(&format!("/language/{language}"));
    }
    local_path.push_str(&format!("/{filename}"));

    let cache_key = response_cache_key("badge", &local_path, &[]);
    if let Some(hit) = state.cache.fetch(&cache_key) {
        return Ok(hit.into_http_response());
    }

    let endpoint = state
        .registry
        .by_role(EndpointRole::Resources)
        .ok_or_else(|| {
            RelayApiError::internal(
                "missing_resources_endpoint",
                "no resource-statistics endpoint is registered",
            )
        })?;
    let mut bindings = BTreeMap::new();
    bindings.insert("organization".to_string(), organization.to_string());
    bindings.insert("project".to_string(), project.to_string());
    let upstream_url = endpoint
        .template()
        .resolve(&bindings)
        .map_err(RelayApiError::from_relay)?;
    let query: Vec<(String, String)> = language
        .iter()
        .map(|code| ("language_code".to_string(), code.clone()))
        .collect();

    let payload = state.upstream.fetch_json(&upstream_url, &query).await?;
    let resources = payload
        .value
        .as_array()
        .ok_or_else(|| RelayApiError::from_relay(RelayError::ExpectedResourceArray))?;
    let fraction = compute_progress(resources, kind).map_err(RelayApiError::from_relay)?;
    let badge = BadgePayload::for_fraction(project, fraction);

    let reply = if extension == "json" {
        let body = serde_json::to_string_pretty(&badge).map_err(|error| {
            RelayApiError::internal("encode_failed", format!("could not encode badge: {error}"))
        })?;
        CachedResponse {
            status: 200,
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("access-control-allow-origin".to_string(), "*".to_string()),
            ],
            body,
        }
    } else {
        // Any other extension defers rendering to the badge service.
        let target = static_badge_url(&state.badge_renderer_base, &badge);
        CachedResponse {
            status: 303,
            headers: vec![
                ("location".to_string(), target.to_string()),
                ("access-control-allow-origin".to_string(), "*".to_string()),
            ],
            body: String::new(),
        }
    };
    state
        .cache
        .store(&cache_key, reply.clone(), state.cache_ttl_seconds);
    Ok(reply.into_http_response())
}

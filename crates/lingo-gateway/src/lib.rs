//! HTTP shell for the translation relay: configuration, shared state,
//! router assembly, and the serve loop. The pure relay semantics live in
//! `lingo-relay`.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use lingo_relay::{DynamicBadge, EndpointRegistry};
use serde_json::json;
use tokio::net::TcpListener;
use url::Url;

mod api_error;
mod badge_routes;
mod catalog;
mod index_page;
mod relay_routes;
mod response_cache;
mod upstream;

#[cfg(test)]
mod tests;

use api_error::RelayApiError;
use response_cache::ResponseCache;
use upstream::UpstreamClient;

pub const GATEWAY_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind: String,
    pub cache_ttl_seconds: u64,
    pub upstream_username: String,
    pub upstream_password: String,
    pub upstream_web_base_url: String,
    pub upstream_api_base_url: String,
    pub upstream_timeout_ms: u64,
    pub badge_renderer_base_url: String,
    pub public_https: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
            cache_ttl_seconds: 60,
            upstream_username: "api".to_string(),
            upstream_password: String::new(),
            upstream_web_base_url: "https://www.transifex.com".to_string(),
            upstream_api_base_url: "https://api.transifex.com".to_string(),
            upstream_timeout_ms: 30_000,
            badge_renderer_base_url: "https://img.shields.io".to_string(),
            public_https: false,
        }
    }
}

/// Shared immutable state behind every route. The endpoint registry and
/// badge list never change after startup; only the response cache does.
#[derive(Debug)]
pub struct GatewayState {
    pub(crate) upstream: UpstreamClient,
    pub(crate) upstream_web_base_url: String,
    pub(crate) upstream_api_base_url: String,
    pub(crate) registry: EndpointRegistry,
    pub(crate) dynamic_badges: Vec<DynamicBadge>,
    pub(crate) cache: ResponseCache,
    pub(crate) cache_ttl_seconds: u64,
    pub(crate) badge_renderer_base: Url,
    pub(crate) public_https: bool,
}

impl GatewayState {
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        if config.upstream_password.trim().is_empty() {
            bail!("--upstream-password must be provided");
        }
        parse_base_url("--upstream-web-base-url", &config.upstream_web_base_url)?;
        parse_base_url("--upstream-api-base-url", &config.upstream_api_base_url)?;
        let badge_renderer_base =
            parse_base_url("--badge-renderer-base-url", &config.badge_renderer_base_url)?;
        let registry = catalog::builtin_endpoints(
            &config.upstream_web_base_url,
            &config.upstream_api_base_url,
        )
        .context("assemble builtin endpoint catalog")?;
        Ok(Self {
            upstream: UpstreamClient::from_config(config)?,
            upstream_web_base_url: config.upstream_web_base_url.clone(),
            upstream_api_base_url: config.upstream_api_base_url.clone(),
            registry,
            dynamic_badges: catalog::builtin_dynamic_badges(),
            cache: ResponseCache::new(),
            cache_ttl_seconds: config.cache_ttl_seconds,
            badge_renderer_base,
            public_https: config.public_https,
        })
    }
}

/// Parse a base-URL flag. Route patterns and upstream requests both
/// derive from these, so a base must be an absolute http(s) URL; a
/// scheme-less value like `localhost:8080` parses as an opaque URL and is
/// rejected here rather than failing route registration later.
fn parse_base_url(flag: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid {flag} {raw}"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        bail!("invalid {flag} {raw}: expected an http(s) base URL");
    }
    Ok(url)
}

pub async fn run_gateway(config: GatewayConfig) -> Result<()> {
    let bind = config
        .bind
        .parse::<std::net::SocketAddr>()
        .with_context(|| format!("invalid --bind address {}", config.bind))?;
    let state = Arc::new(GatewayState::from_config(&config)?);
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("bind relay gateway listener on {bind}"))?;
    let local_addr = listener
        .local_addr()
        .context("resolve local bind address")?;
    println!(
        "relay gateway listening: addr={} endpoints={} cache_ttl_seconds={}",
        local_addr,
        state.registry.len(),
        state.cache_ttl_seconds
    );
    let app = build_gateway_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("serve relay gateway")?;
    Ok(())
}

pub fn build_gateway_router(state: Arc<GatewayState>) -> Router {
    let mut router: Router<Arc<GatewayState>> = Router::new()
        .route("/", get(index_page::handle_index))
        .route("/status", get(handle_status));
    for endpoint in state.registry.iter() {
        let name = endpoint.name().to_string();
        let route_path = endpoint.template().route_path();
        router = router.route(
            &route_path,
            get(
                move |State(state): State<Arc<GatewayState>>,
                      Path(params): Path<BTreeMap<String, String>>,
                      Query(pairs): Query<Vec<(String, String)>>| async move {
                    relay_routes::handle_relay(state, name, params, pairs).await
                },
            ),
        );
    }
    router
        .route(
            badge_routes::BADGE_PROJECT_ROUTE,
            get(badge_routes::handle_project_badge),
        )
        .route(
            badge_routes::BADGE_LANGUAGE_ROUTE,
            get(badge_routes::handle_language_badge),
        )
        .fallback(handle_not_found)
        .with_state(state)
}

async fn handle_status(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(json!({
        "schema_version": GATEWAY_SCHEMA_VERSION,
        "status": "ready",
        "upstream_web_base": state.upstream_web_base_url,
        "upstream_api_base": state.upstream_api_base_url,
        "endpoint_count": state.registry.len(),
        "cached_entry_count": state.cache.entry_count(),
        "cache_ttl_seconds": state.cache_ttl_seconds,
    }))
}

async fn handle_not_found() -> impl IntoResponse {
    RelayApiError::not_found("no route matches this path")
}

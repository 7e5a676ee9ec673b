use clap::{ArgAction, Parser};

use lingo_gateway::GatewayConfig;

#[derive(Debug, Parser)]
#[command(
    name = "lingo",
    about = "Caching relay and badge service for the Transifex translation API",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long,
        env = "LINGO_BIND",
        default_value = "0.0.0.0:5000",
        help = "Socket address the relay listens on"
    )]
    pub(crate) bind: String,

    #[arg(
        long = "cache-ttl-seconds",
        env = "LINGO_CACHE_TTL_SECONDS",
        default_value_t = 60,
        help = "Seconds a relayed response stays servable from the cache"
    )]
    pub(crate) cache_ttl_seconds: u64,

    #[arg(
        long = "upstream-username",
        env = "LINGO_UPSTREAM_USERNAME",
        default_value = "api",
        help = "Basic-auth username for the upstream API"
    )]
    pub(crate) upstream_username: String,

    #[arg(
        long = "upstream-password",
        env = "LINGO_UPSTREAM_PASSWORD",
        hide_env_values = true,
        help = "Transifex API password, see https://www.transifex.com/user/settings/api/"
    )]
    pub(crate) upstream_password: Option<String>,

    #[arg(
        long = "upstream-web-base-url",
        env = "LINGO_UPSTREAM_WEB_BASE_URL",
        default_value = "https://www.transifex.com",
        help = "Base URL for the upstream website API endpoints"
    )]
    pub(crate) upstream_web_base_url: String,

    #[arg(
        long = "upstream-api-base-url",
        env = "LINGO_UPSTREAM_API_BASE_URL",
        default_value = "https://api.transifex.com",
        help = "Base URL for the upstream statistics API endpoints"
    )]
    pub(crate) upstream_api_base_url: String,

    #[arg(
        long = "upstream-timeout-ms",
        env = "LINGO_UPSTREAM_TIMEOUT_MS",
        default_value_t = 30_000,
        help = "Upstream request timeout in milliseconds (floor 1000)"
    )]
    pub(crate) upstream_timeout_ms: u64,

    #[arg(
        long = "badge-renderer-base-url",
        env = "LINGO_BADGE_RENDERER_BASE_URL",
        default_value = "https://img.shields.io",
        help = "Badge renderer used for redirects and dynamic badge links"
    )]
    pub(crate) badge_renderer_base_url: String,

    #[arg(
        long = "public-https",
        env = "LINGO_PUBLIC_HTTPS",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Advertise https self-URLs on the index page (for use behind a TLS proxy)"
    )]
    pub(crate) public_https: bool,
}

impl Cli {
    pub(crate) fn into_gateway_config(self) -> GatewayConfig {
        GatewayConfig {
            bind: self.bind,
            cache_ttl_seconds: self.cache_ttl_seconds,
            upstream_username: self.upstream_username,
            upstream_password: self.upstream_password.unwrap_or_default(),
            upstream_web_base_url: self.upstream_web_base_url,
            upstream_api_base_url: self.upstream_api_base_url,
            upstream_timeout_ms: self.upstream_timeout_ms,
            badge_renderer_base_url: self.badge_renderer_base_url,
            public_https: self.public_https,
        }
    }
}

//! Landing page listing every republished endpoint and badge pattern.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::HOST;
use axum::http::HeaderMap;
use axum::response::Response;
use lingo_relay::dynamic_badge_url;

use crate::badge_routes::{BADGE_LANGUAGE_ROUTE, BADGE_PROJECT_ROUTE};
use crate::response_cache::CachedResponse;
use crate::GatewayState;

pub(crate) const INDEX_CACHE_KEY: &str = "index-page";

/// The page is host-derived but static otherwise; a short fixed TTL keeps
/// it out of the per-response cache churn.
pub(crate) const INDEX_CACHE_TTL_SECONDS: u64 = 30;

const EXAMPLE_VALUES: [(&str, &str); 4] = [
    ("organization", "example-org"),
    ("project", "example-project"),
    ("language", "de"),
    ("resource_slug", "example-resource"),
];

pub(crate) async fn handle_index(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
) -> Response {
    if let Some(hit) = state.cache.fetch(INDEX_CACHE_KEY) {
        return hit.into_http_response();
    }
    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    let scheme = if state.public_https { "https" } else { "http" };
    let base_url = format!("{scheme}://{host}");
    let reply = CachedResponse {
        status: 200,
        headers: vec![
            (
                "content-type".to_string(),
                "text/html; charset=utf-8".to_string(),
            ),
            ("access-control-allow-origin".to_string(), "*".to_string()),
        ],
        body: render_index_page(&state, &base_url),
    };
    state
        .cache
        .store(INDEX_CACHE_KEY, reply.clone(), INDEX_CACHE_TTL_SECONDS);
    reply.into_http_response()
}

fn render_index_page(state: &GatewayState, base_url: &str) -> String {
    let mut endpoint_rows = String::new();
    for endpoint in state.registry.iter() {
        let route = endpoint.template().route_path();
        let example = fill_examples(&route);
        let mut modification_rows = String::new();
        for modification in endpoint.modifications() {
            modification_rows.push_str(&format!(
                "<li><a href=\"{example}?modification={name}\"><code>?modification={name}</code></a> {description}</li>\n",
                name = modification.name(),
                description = escape_html(modification.description()),
            ));
        }
        let modifications = if modification_rows.is_empty() {
            String::new()
        } else {
            format!("<ul>\n{modification_rows}</ul>\n")
        };
        endpoint_rows.push_str(&format!(
            r#"<div class="panel">
<h3><code>{route}</code></h3>
<p>mirrors <code>{template}</code> (<a href="{docs}">API documentation</a>)</p>
<p>example: <a href="{example}"><code>{example}</code></a></p>
{modifications}</div>
"#,
            route = escape_html(&route),
            template = escape_html(endpoint.template().raw()),
            docs = endpoint.docs_url(),
        ));
    }

    let project_badge_json = fill_examples(BADGE_PROJECT_ROUTE).replace("{filename}", "translated.json");
    let project_badge_svg = fill_examples(BADGE_PROJECT_ROUTE).replace("{filename}", "translated.svg");
    let language_badge_svg =
        fill_examples(BADGE_LANGUAGE_ROUTE).replace("{filename}", "reviewed.svg");

    let mut dynamic_rows = String::new();
    for badge in &state.dynamic_badges {
        let data_url = format!("{base_url}{}", fill_examples(badge.app_path));
        let renderer_url = dynamic_badge_url(&state.badge_renderer_base, badge, &data_url);
        dynamic_rows.push_str(&format!(
            "<li><a href=\"{renderer_url}\">{name}</a> ({description}), extracted with <code>{query}</code></li>\n",
            name = escape_html(badge.name),
            description = escape_html(badge.description),
            query = escape_html(badge.query_expression),
        ));
    }

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>lingo translation relay</title>
  <style>
    :root {{
      color-scheme: light;
      font-family: "IBM Plex Sans", "Segoe UI", sans-serif;
    }}
    body {{
      margin: 0;
      background: linear-gradient(160deg, #f4f6f8 0%, #eef2f7 100%);
      color: #13232f;
    }}
    .container {{
      max-width: 980px;
      margin: 0 auto;
      padding: 1.5rem;
    }}
    h1 {{
      margin: 0 0 0.5rem 0;
      font-size: 1.5rem;
    }}
    h3 {{
      margin: 0 0 0.4rem 0;
      font-size: 1.05rem;
    }}
    p {{
      margin: 0.25rem 0 0.6rem 0;
      color: #3a4f5f;
    }}
    .panel {{
      background: #ffffff;
      border: 1px solid #d2dde6;
      border-radius: 12px;
      padding: 1rem;
      margin-bottom: 1rem;
      box-shadow: 0 8px 20px rgba(12, 25, 38, 0.06);
    }}
    code {{
      background: #eef2f7;
      border-radius: 4px;
      padding: 0.1rem 0.3rem;
      font-size: 0.9rem;
    }}
    a {{
      color: #0f7d5f;
    }}
  </style>
</head>
<body>
  <div class="container">
    <h1>lingo translation relay</h1>
    <p>A caching read-through relay for the Transifex API with badge endpoints for project pages.</p>
    <h2>Endpoints</h2>
{endpoint_rows}
    <h2>Badges</h2>
    <div class="panel">
      <p>patterns: <code>{project_pattern}</code> and <code>{language_pattern}</code></p>
      <p>The statistic is <code>translated</code> or <code>reviewed</code>. A <code>.json</code> extension returns the badge payload; any other extension redirects to the rendered image.</p>
      <ul>
        <li><a href="{project_badge_json}"><code>{project_badge_json}</code></a></li>
        <li><a href="{project_badge_svg}"><code>{project_badge_svg}</code></a></li>
        <li><a href="{language_badge_svg}"><code>{language_badge_svg}</code></a></li>
      </ul>
    </div>
    <h2>Dynamic badges</h2>
    <div class="panel">
      <ul>
{dynamic_rows}      </ul>
    </div>
  </div>
</body>
</html>
"#,
        project_pattern = escape_html(BADGE_PROJECT_ROUTE),
        language_pattern = escape_html(BADGE_LANGUAGE_ROUTE),
    )
}

fn fill_examples(text: &str) -> String {
    let mut out = text.to_string();
    for (name, value) in EXAMPLE_VALUES {
        out = out.replace(&format!("{{{name}}}"), value);
        out = out.replace(&format!("<{name}>"), value);
    }
    out
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_examples_fill_both_placeholder_syntaxes() {
        assert_eq!(
            fill_examples("/organizations/{organization}/projects/{project}/resources/"),
            "/organizations/example-org/projects/example-project/resources/"
        );
        assert_eq!(
            fill_examples("/resources/?language_code=<language>"),
            "/resources/?language_code=de"
        );
    }

    #[test]
    fn template_text_is_safe_inside_markup() {
        assert_eq!(
            escape_html("https://host/projects/<project>/"),
            "https://host/projects/&lt;project&gt;/"
        );
    }
}

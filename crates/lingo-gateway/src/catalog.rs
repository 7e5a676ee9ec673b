//! Builtin endpoint catalog mirroring the upstream translation API.
//!
//! The registry is assembled once at startup from the configured base
//! URLs so tests can point it at a mock server.

use lingo_relay::{
    summarize_resources, DynamicBadge, EndpointDescriptor, EndpointRegistry, EndpointRole,
    RelayError,
};

pub(crate) const PROJECTS_ENDPOINT_NAME: &str = "projects";
pub(crate) const RESOURCES_ENDPOINT_NAME: &str = "project-resources";
pub(crate) const TRANSLATION_STRINGS_ENDPOINT_NAME: &str = "translation-strings";

pub(crate) fn builtin_endpoints(
    web_base_url: &str,
    api_base_url: &str,
) -> Result<EndpointRegistry, RelayError> {
    let web = web_base_url.trim_end_matches('/');
    let api = api_base_url.trim_end_matches('/');
    let endpoints = vec![
        EndpointDescriptor::new(
            PROJECTS_ENDPOINT_NAME,
            EndpointRole::Projects,
            &format!("{web}/api/2/projects/"),
            "https://docs.transifex.com/api/projects",
        )?,
        EndpointDescriptor::new(
            RESOURCES_ENDPOINT_NAME,
            EndpointRole::Resources,
            &format!("{api}/organizations/<organization>/projects/<project>/resources/"),
            "https://docs.transifex.com/api/resources",
        )?
        .with_modification(summarize_resources()),
        EndpointDescriptor::new(
            TRANSLATION_STRINGS_ENDPOINT_NAME,
            EndpointRole::Translations,
            &format!(
                "{web}/api/2/project/<project>/resource/<resource_slug>/translation/<language>/strings/"
            ),
            "https://docs.transifex.com/api/translations",
        )?,
    ];
    EndpointRegistry::new(endpoints)
}

/// Badges the renderer computes itself by fetching our summarized
/// resource document and evaluating a JSONPath expression on it.
pub(crate) fn builtin_dynamic_badges() -> Vec<DynamicBadge> {
    vec![
        DynamicBadge {
            name: "translated strings",
            description: "share of strings with a translation",
            app_path: "/organizations/<organization>/projects/<project>/resources/?language_code=<language>&modification=summarize_resources",
            query_expression: "$.stats.translated.percentage",
        },
        DynamicBadge {
            name: "reviewed strings",
            description: "share of strings whose translation is reviewed",
            app_path: "/organizations/<organization>/projects/<project>/resources/?language_code=<language>&modification=summarize_resources",
            query_expression: "$.stats.reviewed.percentage",
        },
    ]
}

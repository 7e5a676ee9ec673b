//! Relay engine for republishing a translation-management REST API:
//! endpoint descriptors and URL templates, response cache keys, named
//! response modifications, statistics aggregation, and badge synthesis.
//! The HTTP shell lives in `lingo-gateway`; everything here is pure.

pub mod badge;
pub mod cache_key;
pub mod endpoint;
pub mod error;
pub mod modification;
pub mod stats;

pub use badge::{
    color_for_fraction, dynamic_badge_url, parse_badge_filename, static_badge_url, BadgePayload,
    DynamicBadge, BADGE_SCHEMA_VERSION,
};
pub use cache_key::response_cache_key;
pub use endpoint::{
    EndpointDescriptor, EndpointRegistry, EndpointRole, PathTemplate, RequestContext,
    TemplateSegment,
};
pub use error::RelayError;
pub use modification::{
    apply_selected, summarize_resources, Modification, MODIFICATION_QUERY_PARAM,
};
pub use stats::{aggregate_statistic, compute_progress, AggregatedStatistic, StatKind};

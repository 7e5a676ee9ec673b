//! Endpoint descriptors, URL templates, and the startup registry.

use std::collections::BTreeMap;

use crate::error::RelayError;
use crate::modification::{Modification, MODIFICATION_QUERY_PARAM};

/// One piece of a parsed URL template: literal text or a named slot filled
/// from the request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment {
    Literal(String),
    Param(String),
}

/// Parsed form of a bracketed URL template such as
/// `https://host/api/2/project/<project>/resources/`.
///
/// Keeps both the full upstream view and a path-only view, so the local
/// route pattern and the upstream request URL always agree on parameter
/// slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<TemplateSegment>,
    path_segments: Vec<TemplateSegment>,
}

impl PathTemplate {
    pub fn parse(raw: &str) -> Result<Self, RelayError> {
        let mut segments = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        let mut rest = raw;
        while let Some(open) = rest.find('<') {
            if open > 0 {
                segments.push(TemplateSegment::Literal(rest[..open].to_string()));
            }
            let after_open = &rest[open + 1..];
            let Some(close) = after_open.find('>') else {
                return Err(RelayError::UnterminatedParam {
                    template: raw.to_string(),
                });
            };
            let name = &after_open[..close];
            if name.is_empty()
                || !name
                    .bytes()
                    .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
            {
                return Err(RelayError::InvalidParamName {
                    name: name.to_string(),
                });
            }
            if seen.iter().any(|existing| existing.as_str() == name) {
                return Err(RelayError::DuplicateParam {
                    name: name.to_string(),
                });
            }
            seen.push(name.to_string());
            segments.push(TemplateSegment::Param(name.to_string()));
            rest = &after_open[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(TemplateSegment::Literal(rest.to_string()));
        }

        let path_segments = strip_origin_segments(&segments);
        Ok(Self {
            raw: raw.to_string(),
            segments,
            path_segments,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parameter names in template order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            TemplateSegment::Param(name) => Some(name.as_str()),
            TemplateSegment::Literal(_) => None,
        })
    }

    /// Local route for this template: the path component with `<name>`
    /// slots rewritten to the `{name}` capture syntax.
    pub fn route_path(&self) -> String {
        let mut out = String::new();
        for segment in &self.path_segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Param(name) => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            }
        }
        out
    }

    /// Substitute bound values into the full template, yielding the
    /// upstream request URL. A missing binding is an error; a partially
    /// substituted URL is never produced.
    pub fn resolve(&self, params: &BTreeMap<String, String>) -> Result<String, RelayError> {
        substitute(&self.segments, params)
    }

    /// The same substitution over the path component only, used for cache
    /// keys.
    pub fn resolve_local_path(
        &self,
        params: &BTreeMap<String, String>,
    ) -> Result<String, RelayError> {
        substitute(&self.path_segments, params)
    }
}

fn substitute(
    segments: &[TemplateSegment],
    params: &BTreeMap<String, String>,
) -> Result<String, RelayError> {
    let mut out = String::new();
    for segment in segments {
        match segment {
            TemplateSegment::Literal(text) => out.push_str(text),
            TemplateSegment::Param(name) => {
                let value = params.get(name).ok_or_else(|| RelayError::MissingParamValue {
                    name: name.clone(),
                })?;
                out.push_str(value);
            }
        }
    }
    Ok(out)
}

fn strip_origin_segments(segments: &[TemplateSegment]) -> Vec<TemplateSegment> {
    let mut path_segments = segments.to_vec();
    let trimmed_first = match path_segments.first() {
        Some(TemplateSegment::Literal(text)) => Some(strip_origin(text).to_string()),
        _ => None,
    };
    if let Some(text) = trimmed_first {
        if text.is_empty() {
            path_segments.remove(0);
        } else {
            path_segments[0] = TemplateSegment::Literal(text);
        }
    }
    path_segments
}

fn strip_origin(text: &str) -> &str {
    let Some(scheme_end) = text.find("://") else {
        return text;
    };
    let rest = &text[scheme_end + 3..];
    match rest.find('/') {
        Some(slash) => &rest[slash..],
        None => "",
    }
}

/// Functional role of an endpoint within the catalog. Badge handlers look
/// up the resource-statistics endpoint by role rather than by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    Projects,
    Resources,
    Translations,
}

/// Immutable description of one republished upstream endpoint.
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    name: String,
    role: EndpointRole,
    template: PathTemplate,
    docs_url: String,
    modifications: BTreeMap<String, Modification>,
}

impl EndpointDescriptor {
    pub fn new(
        name: &str,
        role: EndpointRole,
        url_template: &str,
        docs_url: &str,
    ) -> Result<Self, RelayError> {
        Ok(Self {
            name: name.to_string(),
            role,
            template: PathTemplate::parse(url_template)?,
            docs_url: docs_url.to_string(),
            modifications: BTreeMap::new(),
        })
    }

    /// Register a named transform. Names are unique per endpoint; a
    /// repeated name replaces the earlier entry.
    pub fn with_modification(mut self, modification: Modification) -> Self {
        self.modifications
            .insert(modification.name().to_string(), modification);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> EndpointRole {
        self.role
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn docs_url(&self) -> &str {
        &self.docs_url
    }

    pub fn modification(&self, name: &str) -> Option<&Modification> {
        self.modifications.get(name)
    }

    pub fn modifications(&self) -> impl Iterator<Item = &Modification> {
        self.modifications.values()
    }
}

/// Endpoint set built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    endpoints: Vec<EndpointDescriptor>,
}

impl EndpointRegistry {
    pub fn new(endpoints: Vec<EndpointDescriptor>) -> Result<Self, RelayError> {
        for (index, endpoint) in endpoints.iter().enumerate() {
            if endpoints[..index]
                .iter()
                .any(|existing| existing.name() == endpoint.name())
            {
                return Err(RelayError::DuplicateEndpointName {
                    name: endpoint.name().to_string(),
                });
            }
        }
        Ok(Self { endpoints })
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        self.endpoints.iter()
    }

    pub fn by_name(&self, name: &str) -> Option<&EndpointDescriptor> {
        self.endpoints.iter().find(|endpoint| endpoint.name() == name)
    }

    pub fn by_role(&self, role: EndpointRole) -> Option<&EndpointDescriptor> {
        self.endpoints.iter().find(|endpoint| endpoint.role() == role)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// Everything derived from one inbound request before the upstream call.
///
/// The reserved modification parameter is split off here: it participates
/// in the cache key but is never forwarded upstream.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub path_params: BTreeMap<String, String>,
    pub forward_query: Vec<(String, String)>,
    pub modification: Option<String>,
    pub upstream_url: String,
}

impl RequestContext {
    pub fn build(
        endpoint: &EndpointDescriptor,
        path_params: BTreeMap<String, String>,
        query_pairs: Vec<(String, String)>,
    ) -> Result<Self, RelayError> {
        let mut forward_query = Vec::with_capacity(query_pairs.len());
        let mut modification = None;
        for (name, value) in query_pairs {
            if name == MODIFICATION_QUERY_PARAM {
                modification = Some(value);
            } else {
                forward_query.push((name, value));
            }
        }
        let upstream_url = endpoint.template().resolve(&path_params)?;
        Ok(Self {
            path_params,
            forward_query,
            modification,
            upstream_url,
        })
    }

    /// Query pairs identifying this request in the cache, including the
    /// reserved modification selector.
    pub fn cache_query(&self) -> Vec<(String, String)> {
        let mut pairs = self.forward_query.clone();
        if let Some(name) = &self.modification {
            pairs.push((MODIFICATION_QUERY_PARAM.to_string(), name.clone()));
        }
        pairs
    }
}

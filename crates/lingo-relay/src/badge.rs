//! Shields-compatible badge payloads and renderer URLs.

use serde::Serialize;
use url::Url;

/// Schema version the badge renderer expects in endpoint payloads.
pub const BADGE_SCHEMA_VERSION: u32 = 1;

/// JSON payload consumed by the badge renderer's endpoint mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgePayload {
    schema_version: u32,
    label: String,
    message: String,
    color: String,
}

impl BadgePayload {
    /// Build a payload for a completion fraction in `[0.0, 1.0]`. The
    /// message is the whole-number percentage, rounded half away from
    /// zero, so `0.495` renders as `50%`.
    pub fn for_fraction(label: &str, fraction: f64) -> Self {
        Self {
            schema_version: BADGE_SCHEMA_VERSION,
            label: label.to_string(),
            message: format!("{}%", (fraction * 100.0).round() as i64),
            color: color_for_fraction(fraction),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn color(&self) -> &str {
        &self.color
    }
}

/// Six-digit hex color fading red at 0.0 through olive to green at 1.0.
pub fn color_for_fraction(fraction: f64) -> String {
    let red = (255.0 * (1.0 - fraction)).round() as u8;
    let green = (255.0 * fraction).round() as u8;
    format!("{red:02x}{green:02x}00")
}

/// Split a badge path segment into statistic name and file extension.
/// Only the last dot separates; `translated.min.svg` keeps the prefix
/// intact. Segments without an extension are not badge requests.
pub fn parse_badge_filename(segment: &str) -> Option<(&str, &str)> {
    let (stat, extension) = segment.rsplit_once('.')?;
    if stat.is_empty() || extension.is_empty() {
        return None;
    }
    Some((stat, extension))
}

/// A renderer-side dynamic badge: the renderer fetches `app_path` from
/// this service and extracts the value itself via `query_expression`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicBadge {
    pub name: &'static str,
    pub description: &'static str,
    pub app_path: &'static str,
    pub query_expression: &'static str,
}

/// Renderer URL for a precomputed label/message/color triple.
pub fn static_badge_url(renderer_base: &Url, payload: &BadgePayload) -> Url {
    let mut url = renderer_base.clone();
    url.set_path("/static/v1");
    url.query_pairs_mut()
        .clear()
        .append_pair("label", payload.label())
        .append_pair("message", payload.message())
        .append_pair("color", payload.color());
    url
}

/// Renderer URL that pulls `data_url` and evaluates the badge's JSONPath
/// expression on the response.
pub fn dynamic_badge_url(renderer_base: &Url, badge: &DynamicBadge, data_url: &str) -> Url {
    let mut url = renderer_base.clone();
    url.set_path("/badge/dynamic/json");
    url.query_pairs_mut()
        .clear()
        .append_pair("url", data_url)
        .append_pair("query", badge.query_expression)
        .append_pair("label", badge.name);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_color_endpoints_are_pure_red_and_green() {
        assert_eq!(color_for_fraction(0.0), "ff0000");
        assert_eq!(color_for_fraction(1.0), "00ff00");
    }

    #[test]
    fn color_midpoint_rounds_both_channels_up() {
        assert_eq!(color_for_fraction(0.5), "808000");
    }

    #[test]
    fn regression_message_rounds_half_away_from_zero() {
        assert_eq!(BadgePayload::for_fraction("demo", 0.495).message(), "50%");
        assert_eq!(BadgePayload::for_fraction("demo", 0.494).message(), "49%");
        assert_eq!(BadgePayload::for_fraction("demo", 0.0).message(), "0%");
        assert_eq!(BadgePayload::for_fraction("demo", 1.0).message(), "100%");
    }

    #[test]
    fn payload_serializes_with_camel_case_schema_version() {
        let payload = BadgePayload::for_fraction("myproject", 1.0);
        let encoded = serde_json::to_value(&payload).expect("encode payload");
        assert_eq!(encoded["schemaVersion"], 1);
        assert_eq!(encoded["label"], "myproject");
        assert_eq!(encoded["message"], "100%");
        assert_eq!(encoded["color"], "00ff00");
    }

    #[test]
    fn unit_filename_splits_on_the_last_dot() {
        assert_eq!(
            parse_badge_filename("translated.json"),
            Some(("translated", "json"))
        );
        assert_eq!(
            parse_badge_filename("translated.min.svg"),
            Some(("translated.min", "svg"))
        );
    }

    #[test]
    fn regression_filename_without_extension_is_rejected() {
        assert_eq!(parse_badge_filename("translated"), None);
        assert_eq!(parse_badge_filename(".json"), None);
        assert_eq!(parse_badge_filename("x."), None);
    }

    #[test]
    fn static_url_carries_the_payload_as_query_pairs() {
        let base = Url::parse("https://img.example.com").expect("parse base");
        let payload = BadgePayload::for_fraction("myproject", 0.5);
        let url = static_badge_url(&base, &payload);
        assert_eq!(url.path(), "/static/v1");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("label".to_string(), "myproject".to_string()),
                ("message".to_string(), "50%".to_string()),
                ("color".to_string(), "808000".to_string()),
            ]
        );
    }

    #[test]
    fn dynamic_url_points_the_renderer_back_at_the_data_source() {
        let base = Url::parse("https://img.example.com").expect("parse base");
        let badge = DynamicBadge {
            name: "translated strings",
            description: "share of translated strings",
            app_path: "/organizations/acme/projects/site/resources/",
            query_expression: "$.stats.translated.percentage",
        };
        let url = dynamic_badge_url(&base, &badge, "https://relay.example.com/data");
        assert_eq!(url.path(), "/badge/dynamic/json");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("url".to_string(), "https://relay.example.com/data".to_string()),
                ("query".to_string(), "$.stats.translated.percentage".to_string()),
                ("label".to_string(), "translated strings".to_string()),
            ]
        );
    }
}

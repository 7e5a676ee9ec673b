//! Deterministic cache keys for relayed responses.

use url::form_urlencoded;

/// Cache identity for one relayed response: endpoint name, resolved local
/// path, and the normalized query string. Query pairs sort
/// lexicographically so inbound ordering never splits the cache, and each
/// name and value is form-encoded so a `&` or `=` inside one pair never
/// reads as a pair boundary. The reserved modification selector stays in
/// the key; each transform caches its own response.
pub fn response_cache_key(
    endpoint_name: &str,
    local_path: &str,
    query_pairs: &[(String, String)],
) -> String {
    let mut pairs = query_pairs.to_vec();
    pairs.sort();
    let mut key = format!("{endpoint_name}:{local_path}");
    if !pairs.is_empty() {
        let mut encoded = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &pairs {
            encoded.append_pair(name, value);
        }
        key.push('?');
        key.push_str(&encoded.finish());
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn unit_key_is_deterministic_across_query_orderings() {
        let forward = response_cache_key(
            "projects",
            "/api/2/projects/",
            &pairs(&[("a", "1"), ("b", "2")]),
        );
        let reversed = response_cache_key(
            "projects",
            "/api/2/projects/",
            &pairs(&[("b", "2"), ("a", "1")]),
        );
        assert_eq!(forward, reversed);
        assert_eq!(forward, "projects:/api/2/projects/?a=1&b=2");
    }

    #[test]
    fn key_without_query_is_name_and_path() {
        assert_eq!(
            response_cache_key("projects", "/api/2/projects/", &[]),
            "projects:/api/2/projects/"
        );
    }

    #[test]
    fn unit_key_changes_with_any_identity_component() {
        let base = response_cache_key(
            "project-resources",
            "/organizations/acme/projects/site/resources/",
            &pairs(&[("language_code", "de")]),
        );
        let other_name = response_cache_key(
            "projects",
            "/organizations/acme/projects/site/resources/",
            &pairs(&[("language_code", "de")]),
        );
        let other_path = response_cache_key(
            "project-resources",
            "/organizations/acme/projects/blog/resources/",
            &pairs(&[("language_code", "de")]),
        );
        let other_query = response_cache_key(
            "project-resources",
            "/organizations/acme/projects/site/resources/",
            &pairs(&[("language_code", "fr")]),
        );
        assert_ne!(base, other_name);
        assert_ne!(base, other_path);
        assert_ne!(base, other_query);
    }

    #[test]
    fn regression_embedded_separators_stay_inside_one_pair() {
        let single = response_cache_key(
            "projects",
            "/api/2/projects/",
            &pairs(&[("a", "1&b=2")]),
        );
        let split = response_cache_key(
            "projects",
            "/api/2/projects/",
            &pairs(&[("a", "1"), ("b", "2")]),
        );
        assert_ne!(single, split);
        assert_eq!(single, "projects:/api/2/projects/?a=1%26b%3D2");
    }

    #[test]
    fn regression_modification_selector_is_part_of_the_key() {
        let plain = response_cache_key(
            "project-resources",
            "/organizations/acme/projects/site/resources/",
            &[],
        );
        let summarized = response_cache_key(
            "project-resources",
            "/organizations/acme/projects/site/resources/",
            &pairs(&[("modification", "summarize_resources")]),
        );
        assert_ne!(plain, summarized);
    }
}

// src/internal/registry/registry.rs

use std::collections::{HashMap, HashSet};
use tracing::warn;

use super::search::SearchIndex;
use crate::internal::parser::types::EndpointDescriptor;

/// Number of known paths echoed back with a not-found error.
pub const KNOWN_PATHS_LIMIT: usize = 50;

/// Read-only collection of registered GET endpoints.
///
/// Built once at startup; insertion order is document order and is the
/// order used for empty-query search results.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: Vec<EndpointDescriptor>,
    by_path: HashMap<String, usize>,
    search: SearchIndex,
    hidden_tags: HashSet<String>,
}

/// A concrete request path matched against a registered template
#[derive(Debug, Clone)]
pub struct TemplateMatch<'a> {
    pub endpoint: &'a EndpointDescriptor,
    /// Path parameter values taken from the concrete path, in template order.
    pub path_values: Vec<(String, String)>,
}

impl EndpointRegistry {
    pub fn new(endpoints: Vec<EndpointDescriptor>) -> Self {
        let mut unique: Vec<EndpointDescriptor> = Vec::with_capacity(endpoints.len());
        let mut by_path = HashMap::with_capacity(endpoints.len());

        for endpoint in endpoints {
            if by_path.contains_key(&endpoint.path) {
                warn!("Duplicate endpoint path {}; keeping the first", endpoint.path);
                continue;
            }
            by_path.insert(endpoint.path.clone(), unique.len());
            unique.push(endpoint);
        }

        let search = SearchIndex::build(&unique);
        Self {
            endpoints: unique,
            by_path,
            search,
            hidden_tags: HashSet::new(),
        }
    }

    pub fn with_hidden_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.hidden_tags = tags.into_iter().collect();
        self
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&EndpointDescriptor> {
        self.by_path.get(path).map(|&i| &self.endpoints[i])
    }

    pub fn endpoints(&self) -> &[EndpointDescriptor] {
        &self.endpoints
    }

    pub(crate) fn search_index(&self) -> &SearchIndex {
        &self.search
    }

    /// Whether an endpoint is left out of search results.
    pub fn is_hidden(&self, endpoint: &EndpointDescriptor) -> bool {
        self.hidden_tags.iter().any(|tag| endpoint.has_tag(tag))
    }

    /// Sorted registered paths, truncated to `limit`.
    pub fn known_paths(&self, limit: usize) -> Vec<String> {
        let mut paths: Vec<String> = self.endpoints.iter().map(|e| e.path.clone()).collect();
        paths.sort();
        paths.truncate(limit);
        paths
    }

    /// Match a concrete path such as `/stock/AAPL/greeks` to a template such
    /// as `/stock/{ticker}/greeks`.
    ///
    /// The template with the most literal segment matches wins; ties go to
    /// registry order.
    pub fn match_concrete(&self, concrete: &str) -> Option<TemplateMatch<'_>> {
        if concrete.contains('{') {
            return None;
        }
        let concrete_segments = split_segments(concrete);

        let mut best: Option<(usize, TemplateMatch<'_>)> = None;
        for endpoint in &self.endpoints {
            let template_segments = split_segments(&endpoint.path);
            if template_segments.len() != concrete_segments.len() {
                continue;
            }

            let mut path_values = Vec::new();
            let mut literal_matches = 0;
            let mut matched = true;
            for (template, value) in template_segments.iter().zip(&concrete_segments) {
                match placeholder_name(template) {
                    Some(name) => {
                        let decoded = urlencoding::decode(value)
                            .map(|v| v.into_owned())
                            .unwrap_or_else(|_| value.to_string());
                        path_values.push((name.to_string(), decoded));
                    }
                    None if template == value => literal_matches += 1,
                    None => {
                        matched = false;
                        break;
                    }
                }
            }
            if !matched || path_values.is_empty() {
                continue;
            }

            if best.as_ref().map_or(true, |(best_score, _)| literal_matches > *best_score) {
                best = Some((literal_matches, TemplateMatch { endpoint, path_values }));
            }
        }

        best.map(|(_, m)| m)
    }

    /// Best-effort template suggestion for a path that matched nothing:
    /// same segment count, most literal segments in common.
    pub fn suggest_template(&self, concrete: &str) -> Option<String> {
        let concrete_segments = split_segments(concrete);
        let mut best: Option<(usize, &str)> = None;

        for endpoint in &self.endpoints {
            let template_segments = split_segments(&endpoint.path);
            if template_segments.len() != concrete_segments.len() {
                continue;
            }
            let score = template_segments
                .iter()
                .zip(&concrete_segments)
                .filter(|(t, c)| placeholder_name(t).is_none() && t == c)
                .count();
            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, &endpoint.path));
            }
        }

        best.map(|(_, path)| path.to_string())
    }
}

fn split_segments(path: &str) -> Vec<&str> {
    path.trim()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn placeholder_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::parser::types::{ParamDescriptor, ParamLocation, ParamType, GET};

    fn endpoint(path: &str) -> EndpointDescriptor {
        let parameters = crate::internal::parser::resolver::path_placeholders(path)
            .into_iter()
            .map(|name| ParamDescriptor::new(name, ParamLocation::Path, ParamType::STRING))
            .collect();
        EndpointDescriptor {
            path: path.to_string(),
            method: GET.to_string(),
            summary: String::new(),
            tags: Vec::new(),
            parameters,
            response_schema: None,
        }
    }

    fn registry(paths: &[&str]) -> EndpointRegistry {
        EndpointRegistry::new(paths.iter().map(|p| endpoint(p)).collect())
    }

    #[test]
    fn test_duplicate_paths_keep_first() {
        let mut second = endpoint("/a");
        second.summary = "second".to_string();
        let registry = EndpointRegistry::new(vec![endpoint("/a"), second, endpoint("/b")]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("/a").unwrap().summary, "");
    }

    #[test]
    fn test_match_concrete_prefers_literal_segments() {
        let registry = registry(&["/stock/{ticker}/{kind}", "/stock/{ticker}/greeks"]);

        let matched = registry.match_concrete("/stock/AAPL/greeks").unwrap();
        assert_eq!(matched.endpoint.path, "/stock/{ticker}/greeks");
        assert_eq!(
            matched.path_values,
            vec![("ticker".to_string(), "AAPL".to_string())]
        );
    }

    #[test]
    fn test_match_concrete_decodes_values() {
        let registry = registry(&["/stock/{ticker}"]);
        let matched = registry.match_concrete("/stock/BRK%2EB").unwrap();
        assert_eq!(matched.path_values[0].1, "BRK.B");
    }

    #[test]
    fn test_match_concrete_requires_same_shape() {
        let registry = registry(&["/stock/{ticker}/greeks", "/market/tide"]);

        assert!(registry.match_concrete("/stock/AAPL").is_none());
        assert!(registry.match_concrete("/stock/AAPL/flow").is_none());
        // Literal-only templates are exact lookups, not inference targets.
        assert!(registry.match_concrete("/market/tide").is_none());
        assert!(registry.match_concrete("/stock/{symbol}/greeks").is_none());
    }

    #[test]
    fn test_suggest_template() {
        let registry = registry(&["/stock/{ticker}/greeks", "/market/tide"]);
        assert_eq!(
            registry.suggest_template("/stock/AAPL/greek"),
            Some("/stock/{ticker}/greeks".to_string())
        );
        assert_eq!(registry.suggest_template("/a/b/c/d"), None);
    }

    #[test]
    fn test_known_paths_sorted_and_limited() {
        let registry = registry(&["/c", "/a", "/b"]);
        assert_eq!(registry.known_paths(2), vec!["/a", "/b"]);
    }
}

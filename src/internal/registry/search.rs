// src/internal/registry/search.rs

use std::cmp::Reverse;
use std::collections::HashSet;

use super::registry::EndpointRegistry;
use crate::internal::parser::types::{EndpointDescriptor, EndpointSummary};

pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Per-endpoint token sets, aligned with registry order.
#[derive(Debug, Default)]
pub struct SearchIndex {
    tokens: Vec<HashSet<String>>,
}

impl SearchIndex {
    pub fn build(endpoints: &[EndpointDescriptor]) -> Self {
        let tokens = endpoints
            .iter()
            .map(|endpoint| {
                let mut set = HashSet::new();
                set.extend(tokenize(&endpoint.path));
                set.extend(tokenize(&endpoint.summary));
                for tag in &endpoint.tags {
                    set.extend(tokenize(tag));
                }
                set
            })
            .collect();
        Self { tokens }
    }

    fn score(&self, index: usize, query: &[String]) -> usize {
        self.tokens
            .get(index)
            .map_or(0, |set| query.iter().filter(|t| set.contains(*t)).count())
    }
}

/// Lowercase and split on anything that is not alphanumeric.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl EndpointRegistry {
    /// Keyword search over path segments, summaries and tags.
    ///
    /// An empty query lists the first `limit` endpoints in registry order.
    /// Otherwise endpoints are ranked by how many distinct query tokens they
    /// contain, ties broken by path.
    pub fn search_endpoints(&self, query: &str, limit: Option<usize>) -> Vec<EndpointSummary> {
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

        let mut query_tokens = tokenize(query);
        let mut seen = HashSet::new();
        query_tokens.retain(|t| seen.insert(t.clone()));

        let visible = self
            .endpoints()
            .iter()
            .enumerate()
            .filter(|(_, endpoint)| !self.is_hidden(endpoint));

        if query_tokens.is_empty() {
            return visible
                .take(limit)
                .map(|(_, endpoint)| EndpointSummary::from(endpoint))
                .collect();
        }

        let index = self.search_index();
        let mut hits: Vec<(usize, &EndpointDescriptor)> = visible
            .map(|(i, endpoint)| (index.score(i, &query_tokens), endpoint))
            .filter(|(score, _)| *score > 0)
            .collect();

        hits.sort_by(|(a_score, a), (b_score, b)| {
            Reverse(a_score)
                .cmp(&Reverse(b_score))
                .then_with(|| a.path.cmp(&b.path))
        });

        hits.into_iter()
            .take(limit)
            .map(|(_, endpoint)| EndpointSummary::from(endpoint))
            .collect()
    }
}

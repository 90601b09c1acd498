//! Endpoint descriptors and the immutable endpoint table
//!
//! An [`Endpoint`] pairs a logical path with its [`Access`] mode and, for
//! queries only, the id of a static snapshot that may stand in for the live
//! response. The table is built once at startup and never mutated.
//!
//! Paths are templates: a segment written `{name}` matches any single
//! non-empty segment, so `/api/sales/leads/{id}` covers every lead. When both
//! a literal and a template match (`/api/materials/smart` vs
//! `/api/materials/{id}`), the literal wins.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a static fallback resource (a file name such as `fabric.json`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FallbackId(String);

impl FallbackId {
    /// Create fallback id
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get id as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Plain file name: non-empty, no separators, no parent references
    fn is_plain_file_name(&self) -> bool {
        !self.0.is_empty()
            && !self.0.contains(['/', '\\'])
            && self.0 != "."
            && self.0 != ".."
    }
}

impl fmt::Display for FallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FallbackId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Whether an endpoint reads or changes server-side state
///
/// Set explicitly per endpoint rather than inferred from the HTTP method, so
/// a safe non-GET read can still be declared a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Read-only retrieval; may be served from a fallback snapshot
    Query,
    /// Creates or modifies state; never served from a snapshot
    Mutation,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => f.write_str("query"),
            Self::Mutation => f.write_str("mutation"),
        }
    }
}

/// Endpoint descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    path: String,
    access: Access,
    fallback: Option<FallbackId>,
}

impl Endpoint {
    /// Read-only endpoint with no fallback
    #[inline]
    pub fn query(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            access: Access::Query,
            fallback: None,
        }
    }

    /// Mutating endpoint
    #[inline]
    pub fn mutation(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            access: Access::Mutation,
            fallback: None,
        }
    }

    /// Attach a static fallback resource
    ///
    /// Accepted here for any access mode; [`EndpointTable::new`] rejects it
    /// on mutations.
    #[inline]
    #[must_use]
    pub fn with_fallback(mut self, id: impl Into<FallbackId>) -> Self {
        self.fallback = Some(id.into());
        self
    }

    /// Path template
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Access mode
    #[inline]
    #[must_use]
    pub fn access(&self) -> Access {
        self.access
    }

    /// Fallback resource, if any
    #[inline]
    #[must_use]
    pub fn fallback(&self) -> Option<&FallbackId> {
        self.fallback.as_ref()
    }

    /// Whether the template contains `{param}` segments
    #[inline]
    #[must_use]
    pub fn is_template(&self) -> bool {
        self.path.split('/').any(is_param_segment)
    }

    /// Check whether a concrete path (without query string) matches
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        if !self.is_template() {
            return self.path == path;
        }

        let mut template = self.path.split('/');
        let mut concrete = path.split('/');
        loop {
            match (template.next(), concrete.next()) {
                (None, None) => return true,
                (Some(t), Some(c)) if is_param_segment(t) => {
                    if c.is_empty() {
                        return false;
                    }
                }
                (Some(t), Some(c)) if t == c => {}
                _ => return false,
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.path.starts_with('/') || self.path.contains(['?', '#']) {
            return Err(ConfigError::InvalidPath(self.path.clone()));
        }
        match (&self.fallback, self.access) {
            (Some(id), Access::Mutation) => Err(ConfigError::FallbackOnMutation {
                path: self.path.clone(),
                fallback: id.to_string(),
            }),
            (Some(id), Access::Query) if !id.is_plain_file_name() => {
                Err(ConfigError::InvalidFallbackId(id.to_string()))
            }
            _ => Ok(()),
        }
    }
}

fn is_param_segment(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

/// Strip query string and fragment from a request path
#[inline]
#[must_use]
pub fn path_only(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

/// Immutable set of endpoint descriptors
#[derive(Debug, Clone, Default)]
pub struct EndpointTable {
    endpoints: Vec<Endpoint>,
}

impl EndpointTable {
    /// Build a validated table
    ///
    /// # Errors
    /// - `ConfigError::FallbackOnMutation` if a mutation carries a fallback
    /// - `ConfigError::DuplicateEndpoint` if an (access, path) pair repeats
    /// - `ConfigError::InvalidPath` / `ConfigError::InvalidFallbackId`
    pub fn new(endpoints: impl IntoIterator<Item = Endpoint>) -> Result<Self, ConfigError> {
        let mut table: Vec<Endpoint> = Vec::new();

        for endpoint in endpoints {
            endpoint.validate()?;
            if table
                .iter()
                .any(|e| e.access == endpoint.access && e.path == endpoint.path)
            {
                return Err(ConfigError::DuplicateEndpoint {
                    access: endpoint.access,
                    path: endpoint.path,
                });
            }
            table.push(endpoint);
        }

        Ok(Self { endpoints: table })
    }

    /// Find the descriptor for a concrete path under the given access mode
    #[must_use]
    pub fn lookup(&self, access: Access, path: &str) -> Option<&Endpoint> {
        let path = path_only(path);
        let candidates = || self.endpoints.iter().filter(move |e| e.access == access);

        candidates()
            .find(|e| !e.is_template() && e.path == path)
            .or_else(|| candidates().find(|e| e.is_template() && e.matches(path)))
    }

    /// Fallback id of the query registered for this path
    #[inline]
    #[must_use]
    pub fn fallback_for(&self, path: &str) -> Option<&FallbackId> {
        self.lookup(Access::Query, path).and_then(Endpoint::fallback)
    }

    /// Whether any descriptor covers this path
    #[inline]
    #[must_use]
    pub fn is_registered(&self, path: &str) -> bool {
        self.lookup(Access::Query, path).is_some() || self.lookup(Access::Mutation, path).is_some()
    }

    /// Iterate over descriptors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    /// Number of descriptors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Check if table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_table() -> EndpointTable {
        EndpointTable::new([
            Endpoint::query("/api/sales").with_fallback("sales.json"),
            Endpoint::query("/api/materials/smart"),
            Endpoint::query("/api/materials/{id}"),
            Endpoint::mutation("/api/sales/leads"),
            Endpoint::mutation("/api/sales/leads/{id}"),
            Endpoint::query("/api/factory/workorders"),
            Endpoint::mutation("/api/factory/workorders"),
        ])
        .unwrap()
    }

    #[test]
    fn fallback_on_mutation_is_rejected() {
        let result = EndpointTable::new([Endpoint::mutation("/api/sales/leads").with_fallback("sales.json")]);
        assert!(matches!(result, Err(ConfigError::FallbackOnMutation { .. })));
    }

    #[test]
    fn duplicate_endpoint_is_rejected() {
        let result = EndpointTable::new([Endpoint::query("/api/deploy"), Endpoint::query("/api/deploy")]);
        assert!(matches!(result, Err(ConfigError::DuplicateEndpoint { .. })));
    }

    #[test]
    fn same_path_may_be_query_and_mutation() {
        let table = sample_table();
        assert!(table.lookup(Access::Query, "/api/factory/workorders").is_some());
        assert!(table.lookup(Access::Mutation, "/api/factory/workorders").is_some());
    }

    #[test]
    fn invalid_paths_and_ids_are_rejected() {
        assert!(matches!(
            EndpointTable::new([Endpoint::query("api/deploy")]),
            Err(ConfigError::InvalidPath(_))
        ));
        assert!(matches!(
            EndpointTable::new([Endpoint::query("/api/deploy?x=1")]),
            Err(ConfigError::InvalidPath(_))
        ));
        assert!(matches!(
            EndpointTable::new([Endpoint::query("/api/deploy").with_fallback("../secrets.json")]),
            Err(ConfigError::InvalidFallbackId(_))
        ));
    }

    #[test]
    fn literal_wins_over_template() {
        let table = sample_table();
        let smart = table.lookup(Access::Query, "/api/materials/smart").unwrap();
        assert_eq!(smart.path(), "/api/materials/smart");

        let by_id = table.lookup(Access::Query, "/api/materials/m-42").unwrap();
        assert_eq!(by_id.path(), "/api/materials/{id}");
    }

    #[test]
    fn template_requires_same_segment_count() {
        let endpoint = Endpoint::mutation("/api/sales/leads/{id}");
        assert!(endpoint.matches("/api/sales/leads/abc"));
        assert!(!endpoint.matches("/api/sales/leads"));
        assert!(!endpoint.matches("/api/sales/leads/"));
        assert!(!endpoint.matches("/api/sales/leads/abc/notes"));
    }

    #[test]
    fn fallback_lookup_is_exact_per_path() {
        let table = sample_table();
        assert_eq!(table.fallback_for("/api/sales").map(FallbackId::as_str), Some("sales.json"));
        // A nested path never inherits its parent's snapshot
        assert_eq!(table.fallback_for("/api/sales/leads"), None);
        assert_eq!(table.fallback_for("/api/sales?region=Lisboa").map(FallbackId::as_str), Some("sales.json"));
    }

    #[test]
    fn path_only_strips_query_and_fragment() {
        assert_eq!(path_only("/api/materials?category=steel"), "/api/materials");
        assert_eq!(path_only("/api/deploy#top"), "/api/deploy");
        assert_eq!(path_only("/health"), "/health");
    }

    proptest! {
        #[test]
        fn prop_template_matches_any_non_empty_segment(id in "[A-Za-z0-9_.~-]{1,24}") {
            let endpoint = Endpoint::query("/api/patents/{id}");
            let path = format!("/api/patents/{id}");
            prop_assert!(endpoint.matches(&path));
        }

        #[test]
        fn prop_literal_only_matches_itself(path in "/[a-z]{1,8}(/[a-z]{1,8}){0,3}") {
            let endpoint = Endpoint::query("/api/fabric");
            prop_assert_eq!(endpoint.matches(&path), path == "/api/fabric");
        }
    }
}

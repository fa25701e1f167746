//! The page location whose query string carries view settings.

use std::fmt;

use super::params::{QueryMap, encode_query, parse_query};

/// Read and replace the current URL query without navigating.
pub trait Location: Send + fmt::Debug {
    /// Path part of the location, e.g. `/finance-report/detail`.
    fn path(&self) -> &str;

    /// Current query string, without the leading `?`.
    fn query(&self) -> String;

    /// Replace the query string in place.
    fn replace(&mut self, query: &QueryMap);

    /// Path plus query, as it would appear in the address bar.
    fn href(&self) -> String {
        let query = self.query();
        if query.is_empty() {
            self.path().to_string()
        } else {
            format!("{}?{query}", self.path())
        }
    }
}

/// An in-memory location for the terminal front-end and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLocation {
    path: String,
    query: QueryMap,
    replacements: usize,
}

impl MemoryLocation {
    /// Create a location from a path and query string.
    #[must_use]
    pub fn new(path: impl Into<String>, query: &str) -> Self {
        Self {
            path: path.into(),
            query: parse_query(query),
            replacements: 0,
        }
    }

    /// Split an href such as `/blocks?vsdisp=true` into path and query.
    #[must_use]
    pub fn from_href(href: &str) -> Self {
        match href.split_once('?') {
            Some((path, query)) => Self::new(path, query),
            None => Self::new(href, ""),
        }
    }

    /// How many times the query was replaced.
    #[must_use]
    pub const fn replacements(&self) -> usize {
        self.replacements
    }

    /// The current query as ordered pairs.
    #[must_use]
    pub fn pairs(&self) -> &QueryMap {
        &self.query
    }
}

impl Location for MemoryLocation {
    fn path(&self) -> &str {
        &self.path
    }

    fn query(&self) -> String {
        encode_query(&self.query)
    }

    fn replace(&mut self, query: &QueryMap) {
        tracing::debug!("Replacing query of {} with {:?}", self.path, query);
        self.query = query.clone();
        self.replacements += 1;
    }
}

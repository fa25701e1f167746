//! Generic query-parameter store.
//!
//! A [`ParamStore`] knows a fixed set of recognized keys, each with a
//! declared default. It projects a URL query string onto those keys and
//! serializes settings back, leaving out every key that equals its default.

use std::collections::BTreeMap;
use std::fmt;

use url::form_urlencoded;

// ============================================================================
// Parameter Specification
// ============================================================================

/// How a recognized parameter is read from the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Free text; empty means "use the default".
    Text,
    /// Boolean flag; only the exact string `true` turns it on.
    Flag,
}

/// A recognized query parameter and its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Query-string key.
    pub key: &'static str,
    /// How the value is read.
    pub kind: ParamKind,
    /// Default value in its string form.
    pub default: &'static str,
}

impl ParamSpec {
    /// A text parameter.
    #[must_use]
    pub const fn text(key: &'static str, default: &'static str) -> Self {
        Self {
            key,
            kind: ParamKind::Text,
            default,
        }
    }

    /// A boolean flag parameter.
    #[must_use]
    pub const fn flag(key: &'static str, default: bool) -> Self {
        Self {
            key,
            kind: ParamKind::Flag,
            default: if default { "true" } else { "false" },
        }
    }

    /// The default as a typed value.
    #[must_use]
    pub fn default_value(&self) -> ParamValue {
        match self.kind {
            ParamKind::Text => ParamValue::Text(self.default.to_string()),
            ParamKind::Flag => ParamValue::Flag(self.default == "true"),
        }
    }
}

// ============================================================================
// Parameter Values
// ============================================================================

/// A settings value: text or flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Text value.
    Text(String),
    /// Flag value.
    Flag(bool),
}

impl ParamValue {
    /// Returns `true` for empty text and for a cleared flag.
    ///
    /// Such values are never written to the URL.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Flag(on) => !on,
        }
    }

    /// Text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Flag(_) => None,
        }
    }

    /// Flag content, if this is a flag value.
    #[must_use]
    pub const fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(on) => Some(*on),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Flag(on) => write!(f, "{on}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Settings keyed by parameter name.
pub type Params = BTreeMap<&'static str, ParamValue>;

/// An ordered query mapping, ready to be written to a URL.
pub type QueryMap = Vec<(String, String)>;

/// Parse a query string (with or without a leading `?`) into ordered pairs.
#[must_use]
pub fn parse_query(query: &str) -> QueryMap {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Encode a query mapping as `k=v&k2=v2`.
#[must_use]
pub fn encode_query(query: &QueryMap) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.iter())
        .finish()
}

// ============================================================================
// Parameter Store
// ============================================================================

/// Projection of URL query parameters onto a fixed, defaulted key set.
#[derive(Debug, Clone, Copy)]
pub struct ParamStore {
    specs: &'static [ParamSpec],
}

impl ParamStore {
    /// Create a store for the given recognized keys.
    #[must_use]
    pub const fn new(specs: &'static [ParamSpec]) -> Self {
        Self { specs }
    }

    /// The recognized keys, in declaration order.
    #[must_use]
    pub const fn specs(&self) -> &'static [ParamSpec] {
        self.specs
    }

    /// Look up the spec for a key.
    #[must_use]
    pub fn spec(&self, key: &str) -> Option<&'static ParamSpec> {
        self.specs.iter().find(|s| s.key == key)
    }

    /// The default settings.
    #[must_use]
    pub fn defaults(&self) -> Params {
        self.specs
            .iter()
            .map(|s| (s.key, s.default_value()))
            .collect()
    }

    /// Read settings from a query string.
    ///
    /// Unrecognized keys are dropped. A recognized key falls back to its
    /// default when absent or empty; a flag is on only for the exact value
    /// `true`. When a key repeats, the last occurrence wins.
    #[must_use]
    pub fn init(&self, query: &str) -> Params {
        let mut params = self.defaults();
        for (key, value) in parse_query(query) {
            let Some(spec) = self.spec(&key) else {
                continue;
            };
            let parsed = match spec.kind {
                ParamKind::Text if value.is_empty() => spec.default_value(),
                ParamKind::Text => ParamValue::Text(value),
                ParamKind::Flag if value == "true" => ParamValue::Flag(true),
                ParamKind::Flag => spec.default_value(),
            };
            params.insert(spec.key, parsed);
        }
        params
    }

    /// Returns `true` when `value` equals the declared default of `key`.
    ///
    /// Values are compared by their string form, so `0` and `"0"` match.
    #[must_use]
    pub fn is_default(&self, key: &str, value: &ParamValue) -> bool {
        self.spec(key)
            .is_some_and(|spec| value.to_string() == spec.default)
    }

    /// Serialize settings into the minimal query mapping.
    ///
    /// Blank values and values equal to their default are left out. Keys
    /// are emitted in declaration order.
    #[must_use]
    pub fn serialize(&self, settings: &Params) -> QueryMap {
        self.specs
            .iter()
            .filter_map(|spec| {
                let value = settings.get(spec.key)?;
                if value.is_blank() || self.is_default(spec.key, value) {
                    return None;
                }
                Some((spec.key.to_string(), value.to_string()))
            })
            .collect()
    }

    /// Merge settings into an existing query and drop defaults.
    ///
    /// Unrecognized keys of `existing` are kept in place unless blank.
    /// Recognized keys take the value from `settings`.
    #[must_use]
    pub fn merge_into(&self, existing: &QueryMap, settings: &Params) -> QueryMap {
        let mut merged: QueryMap = Vec::with_capacity(existing.len() + settings.len());
        for (key, value) in existing {
            if self.spec(key).is_some() || merged.iter().any(|(k, _)| k == key) {
                continue;
            }
            if !value.is_empty() {
                merged.push((key.clone(), value.clone()));
            }
        }
        merged.extend(self.serialize(settings));
        merged
    }
}

// ============================================================================
// Tests
// ============================================================================

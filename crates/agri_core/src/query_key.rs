//! crates/agri_core/src/query_key.rs
//!
//! Hierarchical cache keys. Every key is the tuple of its parent extended by one
//! discriminator, so invalidating a prefix reaches every key beneath it.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::RecordId;

/// One segment of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    /// An entity namespace or an operation discriminator (`"list"`, `"detail"`).
    Name(&'static str),
    Id(RecordId),
    Params(QueryParams),
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Name(name) => f.write_str(name),
            KeyPart::Id(id) => write!(f, "#{}", id),
            KeyPart::Params(params) => write!(f, "{}", params),
        }
    }
}

/// An ordered, immutable tuple identifying one cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    pub fn root(namespace: &'static str) -> Self {
        QueryKey(vec![KeyPart::Name(namespace)])
    }

    /// Returns a new key one level deeper than `self`.
    pub fn child(&self, part: KeyPart) -> Self {
        let mut parts = self.0.clone();
        parts.push(part);
        QueryKey(parts)
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    /// True when `prefix` is `self` or one of its ancestors.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in &self.0 {
            if !first {
                f.write_str("/")?;
            }
            write!(f, "{}", part)?;
            first = false;
        }
        Ok(())
    }
}

//=========================================================================================
// Query Parameters
//=========================================================================================

/// Normalized list parameters.
///
/// Backed by a sorted map so two parameter sets with the same entries compare
/// and hash equal no matter the order they were inserted in. Absent values are
/// never stored, which keeps "unset" and "not mentioned" indistinguishable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    pub fn insert_opt<V: ToString>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Owned `(key, value)` pairs, ready to hand to a transport as a query string.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        f.write_str("}")
    }
}

/// Converts a typed parameter object into its normalized form.
pub trait ToQueryParams {
    fn to_query_params(&self) -> QueryParams;
}

impl ToQueryParams for QueryParams {
    fn to_query_params(&self) -> QueryParams {
        self.clone()
    }
}

impl ToQueryParams for () {
    fn to_query_params(&self) -> QueryParams {
        QueryParams::new()
    }
}

//=========================================================================================
// Per-Entity Key Factories
//=========================================================================================

const LIST: &str = "list";
const DETAIL: &str = "detail";

/// Key factory for one entity namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityKeys {
    namespace: &'static str,
}

impl EntityKeys {
    pub const fn new(namespace: &'static str) -> Self {
        Self { namespace }
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    pub fn all(&self) -> QueryKey {
        QueryKey::root(self.namespace)
    }

    pub fn lists(&self) -> QueryKey {
        self.all().child(KeyPart::Name(LIST))
    }

    pub fn list(&self, params: &impl ToQueryParams) -> QueryKey {
        self.lists().child(KeyPart::Params(params.to_query_params()))
    }

    pub fn details(&self) -> QueryKey {
        self.all().child(KeyPart::Name(DETAIL))
    }

    pub fn detail(&self, id: RecordId) -> QueryKey {
        self.details().child(KeyPart::Id(id))
    }
}

pub const REPORT_KEYS: EntityKeys = EntityKeys::new("reports");
pub const SOIL_TYPE_KEYS: EntityKeys = EntityKeys::new("soil-types");
pub const PLOT_STATUS_KEYS: EntityKeys = EntityKeys::new("plot-statuses");
pub const TASK_KEYS: EntityKeys = EntityKeys::new("tasks");
pub const SEASON_KEYS: EntityKeys = EntityKeys::new("seasons");

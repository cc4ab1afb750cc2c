//! Metadata records attached to every content node.
//!
//! A [`Meta`] is either a scalar string or a record of named children — the
//! minimal shape that covers both uses the engine has for metadata:
//!
//! - per-file records built by the directory walker (and merged from TOML
//!   sidecar files), carrying keys like `file_extension`, `published`, and
//!   `content_type`;
//! - layout / text-processor references, which are either a bare string
//!   (`layout = "article"`) or a record with a `name` child
//!   (`[layout] name = "article"`).
//!
//! All scalars are strings. TOML sidecars may use native booleans or numbers;
//! [`Meta::from_toml`] stringifies them, so `published = false` and
//! `published = "false"` behave identically — which is exactly the
//! "boolean-as-string" publish rule: a node is published unless its
//! `published` key is the literal string `"false"`.

use serde::Serialize;
use std::collections::BTreeMap;

/// Recognized metadata keys. All optional; consumers fall back per key.
pub const KEY_FILE_EXTENSION: &str = "file_extension";
pub const KEY_PUBLISHED: &str = "published";
pub const KEY_CONTENT_TYPE: &str = "content_type";
pub const KEY_NAME: &str = "name";

/// A metadata value: scalar string or string-keyed record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Meta {
    Value(String),
    Record(BTreeMap<String, Meta>),
}

impl Meta {
    /// An empty record.
    pub fn empty() -> Self {
        Meta::Record(BTreeMap::new())
    }

    /// The scalar value, if this meta is one.
    pub fn string(&self) -> Option<&str> {
        match self {
            Meta::Value(s) => Some(s),
            Meta::Record(_) => None,
        }
    }

    /// Child lookup; `None` for scalars and missing keys.
    pub fn get(&self, key: &str) -> Option<&Meta> {
        match self {
            Meta::Value(_) => None,
            Meta::Record(map) => map.get(key),
        }
    }

    /// Scalar value of a child, if present.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Meta::string)
    }

    /// Insert a child. Inserting into a scalar replaces it with a record.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Meta>) {
        match self {
            Meta::Record(map) => {
                map.insert(key.into(), value.into());
            }
            Meta::Value(_) => {
                let mut map = BTreeMap::new();
                map.insert(key.into(), value.into());
                *self = Meta::Record(map);
            }
        }
    }

    /// Overlay `other`'s children onto this record. `other`'s keys win;
    /// scalar `other` replaces `self` wholesale.
    pub fn merge(&mut self, other: Meta) {
        match other {
            Meta::Value(_) => *self = other,
            Meta::Record(children) => {
                for (key, value) in children {
                    self.insert(key, value);
                }
            }
        }
    }

    /// The publish rule: published unless `published` is exactly `"false"`.
    pub fn published(&self) -> bool {
        self.get_str(KEY_PUBLISHED) != Some("false")
    }

    /// Convert a parsed TOML document or value, stringifying scalars.
    ///
    /// Arrays become records keyed by element position (`"0"`, `"1"`, ...),
    /// matching the indexed-token view the name model has of array siblings.
    pub fn from_toml(value: toml::Value) -> Meta {
        match value {
            toml::Value::String(s) => Meta::Value(s),
            toml::Value::Integer(i) => Meta::Value(i.to_string()),
            toml::Value::Float(f) => Meta::Value(f.to_string()),
            toml::Value::Boolean(b) => Meta::Value(b.to_string()),
            toml::Value::Datetime(d) => Meta::Value(d.to_string()),
            toml::Value::Array(items) => Meta::Record(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), Meta::from_toml(v)))
                    .collect(),
            ),
            toml::Value::Table(table) => Meta::Record(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Meta::from_toml(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Meta {
    fn from(s: &str) -> Self {
        Meta::Value(s.to_string())
    }
}

impl From<String> for Meta {
    fn from(s: String) -> Self {
        Meta::Value(s)
    }
}

//! Flattening of nested mock data into query parameters.
//!
//! The mock BBB server only accepts flat query strings. Configuration sent to
//! it is built as [`MockData`], an insertion-ordered mapping whose values are
//! either scalars or one level of nested scalars. [`flatten`] turns it into
//! [`FlatParam`]s: scalars keep their key, nested entries become
//! `{outer}_{inner}`.
//!
//! Deeper nesting cannot be expressed by [`MockValue`], so the one-level
//! contract holds by construction.

/// A single `(name, value)` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatParam {
    pub name: String,
    pub value: String,
}

impl FlatParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A value in [`MockData`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockValue {
    Scalar(String),
    Nested(Vec<(String, String)>),
}

/// Insertion-ordered mock configuration.
///
/// Inserting an existing key replaces its value but keeps the position of
/// the first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockData {
    entries: Vec<(String, MockValue)>,
}

impl MockData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a scalar entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.put(key.into(), MockValue::Scalar(value.into()));
    }

    /// Insert or replace a nested entry.
    pub fn insert_nested<K, V, I>(&mut self, key: impl Into<String>, entries: I)
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let nested = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.put(key.into(), MockValue::Nested(nested));
    }

    /// Builder-style scalar insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder-style nested insert.
    #[must_use]
    pub fn with_nested<K, V, I>(mut self, key: impl Into<String>, entries: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.insert_nested(key, entries);
        self
    }

    /// Look up an entry by key.
    pub fn get(&self, key: &str) -> Option<&MockValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MockValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn put(&mut self, key: String, value: MockValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }
}

/// Flatten mock data into ordered query parameters.
///
/// Output order follows key insertion order, then inner insertion order.
pub fn flatten(config: &MockData) -> Vec<FlatParam> {
    let mut params = Vec::with_capacity(config.len());

    for (key, value) in config.iter() {
        match value {
            MockValue::Scalar(v) => params.push(FlatParam::new(key, v.as_str())),
            MockValue::Nested(inner) => {
                for (subkey, subvalue) in inner {
                    params.push(FlatParam::new(
                        format!("{}_{}", key, subkey),
                        subvalue.as_str(),
                    ));
                }
            }
        }
    }

    params
}

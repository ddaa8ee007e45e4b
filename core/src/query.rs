//! Query-string parameters for list endpoints.

use std::collections::BTreeMap;

/// Ordered set of query parameters.
///
/// Keys encode in sorted order and repeated values keep insertion order, so
/// the same parameters always produce the same query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl ToString) {
        self.params
            .entry(key.into())
            .or_default()
            .push(value.to_string());
    }

    /// Add `key=value` only when `value` is present and non-empty.
    pub fn add_non_empty(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.add(key, value);
        }
    }

    pub fn extend(&mut self, other: QueryParams) {
        for (key, values) in other.params {
            self.params.entry(key).or_default().extend(values);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Percent-encoded `k=v&k=v` form, without a leading `?`.
    pub fn encode(&self) -> String {
        self.params
            .iter()
            .flat_map(|(key, values)| {
                values
                    .iter()
                    .map(move |value| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Append to `url`, joining onto an existing query string with `&`.
    /// An empty set leaves `url` untouched.
    pub fn append_to(&self, url: &mut String) {
        if self.is_empty() {
            return;
        }
        match url.find('?') {
            None => url.push('?'),
            Some(idx) if idx + 1 < url.len() && !url.ends_with('&') => url.push('&'),
            Some(_) => {}
        }
        url.push_str(&self.encode());
    }
}

//! Tag-aware metric keys.
//!
//! A metric is stored in the registry under a single string key made of its bare name followed by
//! its tags, sorted by tag key so that the same tag set always produces the same key:
//!
//! ```text
//! requests[ method="GET" status="200"]
//! ```
//!
//! Decoding hands the tag portion back verbatim; it is only ever appended to rendered lines.

use std::fmt;

/// Canonical marker of a delta counter name (U+2206, INCREMENT).
pub const DELTA_PREFIX: &str = "\u{2206}";

/// Alternate marker of a delta counter name (U+0394, GREEK CAPITAL LETTER DELTA).
///
/// Both glyphs render the same, and either may turn up depending on how a name was typed.
pub const ALT_DELTA_PREFIX: &str = "\u{0394}";

/// Encodes a metric name and its tags into a registry key.
///
/// Tags may be supplied in any order; they are sorted by key.  A name without tags is returned
/// unchanged.
pub fn encode_key<I, K, V>(name: &str, tags: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let tags = render_tags(tags);
    if tags.is_empty() {
        name.to_owned()
    } else {
        format!("{}[ {}]", name, tags)
    }
}

/// Splits a registry key into its name and its pre-rendered tag string.
pub fn decode_key(key: &str) -> (&str, &str) {
    match key.split_once('[') {
        None => (key, ""),
        Some((name, rest)) => {
            let tags = rest.strip_suffix(']').unwrap_or(rest);
            (name, tags.trim())
        },
    }
}

/// Renders tags as space-separated `key="value"` pairs, sorted by key.
pub fn render_tags<I, K, V>(tags: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(K, V)> = tags.into_iter().collect();
    pairs.sort_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));

    let rendered: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k.as_ref(), v.as_ref()))
        .collect();
    rendered.join(" ")
}

/// Whether `name` starts with either form of the delta marker.
pub fn has_delta_prefix(name: &str) -> bool { strip_delta_prefix(name).is_some() }

/// Returns `name` with the delta marker prepended, unless it already carries one.
pub fn delta_counter_name(name: &str) -> String {
    if has_delta_prefix(name) {
        name.to_owned()
    } else {
        format!("{}{}", DELTA_PREFIX, name)
    }
}

fn strip_delta_prefix(name: &str) -> Option<&str> {
    name.strip_prefix(DELTA_PREFIX)
        .or_else(|| name.strip_prefix(ALT_DELTA_PREFIX))
}

/// The identity of a registered metric.
///
/// Whether a counter reports deltas is a property of its identity, decided once at registration.
/// The textual delta marker only exists in keys and on the wire; the `name` held here never
/// carries it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MetricId {
    name: String,
    tags: String,
    delta: bool,
}

impl MetricId {
    /// Builds an identity from a name, which may carry a delta marker, and its tags.
    pub fn new<I, K, V>(name: &str, tags: I) -> MetricId
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let (name, delta) = match strip_delta_prefix(name) {
            Some(stripped) => (stripped, true),
            None => (name, false),
        };

        MetricId {
            name: name.to_owned(),
            tags: render_tags(tags),
            delta,
        }
    }

    /// Builds a delta identity, whether or not `name` carries the marker.
    pub fn delta<I, K, V>(name: &str, tags: I) -> MetricId
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut id = MetricId::new(name, tags);
        id.delta = true;
        id
    }

    /// Parses an identity back out of a registry key.
    pub fn from_key(key: &str) -> MetricId {
        let (name, tags) = decode_key(key);
        let (name, delta) = match strip_delta_prefix(name) {
            Some(stripped) => (stripped, true),
            None => (name, false),
        };

        MetricId {
            name: name.to_owned(),
            tags: tags.to_owned(),
            delta,
        }
    }

    /// The bare metric name, without any delta marker.
    pub fn name(&self) -> &str { &self.name }

    /// The rendered tag string, empty when there are no tags.
    pub fn tags(&self) -> &str { &self.tags }

    pub fn is_delta(&self) -> bool { self.delta }

    /// The registry key.  Delta identities always use the canonical marker.
    pub fn key(&self) -> String { self.to_string() }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.delta {
            f.write_str(DELTA_PREFIX)?;
        }
        f.write_str(&self.name)?;
        if !self.tags.is_empty() {
            write!(f, "[ {}]", self.tags)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        decode_key, delta_counter_name, encode_key, has_delta_prefix, MetricId, ALT_DELTA_PREFIX,
        DELTA_PREFIX,
    };
    use std::collections::{BTreeMap, HashMap};

    #[test]
    fn test_encode_key_sorts_tags() {
        let key = encode_key("foo", vec![("zone", "b"), ("app", "web")]);
        assert_eq!(key, "foo[ app=\"web\" zone=\"b\"]");
    }

    #[test]
    fn test_encode_key_without_tags() {
        let tags: HashMap<String, String> = HashMap::new();
        assert_eq!(encode_key("foo", &tags), "foo");
        assert_eq!(decode_key("foo"), ("foo", ""));
    }

    #[test]
    fn test_encode_key_is_order_independent() {
        let mut first = HashMap::new();
        for (k, v) in &[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")] {
            first.insert(k.to_string(), v.to_string());
        }
        let mut second = HashMap::new();
        for (k, v) in &[("d", "4"), ("c", "3"), ("b", "2"), ("a", "1")] {
            second.insert(k.to_string(), v.to_string());
        }
        let third: BTreeMap<_, _> = first.clone().into_iter().collect();

        let key = encode_key("foo", &first);
        assert_eq!(key, encode_key("foo", &second));
        assert_eq!(key, encode_key("foo", &third));
        assert_eq!(decode_key(&key).0, "foo");
    }

    #[test]
    fn test_decode_key() {
        let key = encode_key("foo.bar", vec![("key1", "val1"), ("key2", "val2")]);
        let (name, tags) = decode_key(&key);
        assert_eq!(name, "foo.bar");
        assert_eq!(tags, "key1=\"val1\" key2=\"val2\"");
    }

    #[test]
    fn test_delta_counter_name() {
        let name = delta_counter_name("foo");
        assert!(name.starts_with(DELTA_PREFIX));
        assert_eq!(delta_counter_name(&name), name);

        let alt = format!("{}foo", ALT_DELTA_PREFIX);
        assert!(has_delta_prefix(&alt));
        assert_eq!(delta_counter_name(&alt), alt);
        assert!(!has_delta_prefix("foo"));
    }

    #[test]
    fn test_metric_id_delta_marker() {
        let tags = vec![("k", "v")];
        let plain = MetricId::new("foo", tags.clone());
        assert!(!plain.is_delta());
        assert_eq!(plain.key(), "foo[ k=\"v\"]");

        let canonical = MetricId::new(&delta_counter_name("foo"), tags.clone());
        let alternate = MetricId::new(&format!("{}foo", ALT_DELTA_PREFIX), tags.clone());
        let flagged = MetricId::delta("foo", tags);
        assert!(canonical.is_delta());
        assert_eq!(canonical.name(), "foo");
        assert_eq!(canonical, alternate);
        assert_eq!(canonical, flagged);
        assert_eq!(canonical.key(), format!("{}foo[ k=\"v\"]", DELTA_PREFIX));
    }

    #[test]
    fn test_metric_id_from_key() {
        let id = MetricId::delta("foo", vec![("b", "2"), ("a", "1")]);
        let parsed = MetricId::from_key(&id.key());
        assert_eq!(parsed, id);
        assert_eq!(parsed.tags(), "a=\"1\" b=\"2\"");

        let untagged = MetricId::from_key("bar");
        assert_eq!(untagged.name(), "bar");
        assert_eq!(untagged.tags(), "");
        assert!(!untagged.is_delta());
    }
}

//! # Parameter Package
//!
//! An ordered, loosely-typed key/value bag used to describe controllers and
//! bindings when talking to the emulation core.
//!
//! ## Wire Format
//!
//! Pairs are written as `key:value` and joined with `,`. Inside keys and
//! values the delimiters are escaped:
//!
//! | Character | Escape |
//! |-----------|--------|
//! | `:` | `$0` |
//! | `,` | `$1` |
//! | `$` | `$2` |
//!
//! This lets a serialized package be stored as a value of another package
//! (for example a stick's `modifier` binding).

use std::fmt;
use std::str::FromStr;
use tracing::debug;

const KEY_VALUE_SEPARATOR: char = ':';
const PARAM_SEPARATOR: char = ',';
const ESCAPE_CHARACTER: char = '$';

/// Ordered string key/value bag
///
/// Lookup is case-sensitive and exact-match. Not synchronized; share it
/// behind a lock if several threads need to mutate it.
///
/// # Examples
///
/// ```
/// use controller_bridge::param_package::ParamPackage;
///
/// let mut params = ParamPackage::new();
/// params.set("engine", "host");
/// params.set("port", 1);
///
/// assert_eq!(params.serialize(), "engine:host,port:1");
/// assert_eq!(params.get_int("port", 0), 1);
/// assert_eq!(params.get_int("missing", 7), 7);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamPackage {
    entries: Vec<(String, String)>,
}

impl ParamPackage {
    /// Creates an empty package.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a serialized package.
    ///
    /// Segments that are not exactly one `key:value` pair are skipped. Empty
    /// input yields an empty package.
    pub fn parse(serialized: &str) -> Self {
        let mut package = Self::new();
        if serialized.is_empty() {
            return package;
        }

        for segment in serialized.split(PARAM_SEPARATOR) {
            let mut parts = segment.split(KEY_VALUE_SEPARATOR);
            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(value), None) => {
                    package.set(unescape(key), unescape(value));
                }
                _ => {
                    debug!("Skipping malformed parameter segment: {:?}", segment);
                }
            }
        }

        package
    }

    /// Serializes all pairs in insertion order.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut serialized = String::new();
        for (index, (key, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                serialized.push(PARAM_SEPARATOR);
            }
            serialized.push_str(&escape(key));
            serialized.push(KEY_VALUE_SEPARATOR);
            serialized.push_str(&escape(value));
        }
        serialized
    }

    /// Returns the raw value for `key`, if present.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value for `key`, or `default` when absent.
    #[must_use]
    pub fn get_str(&self, key: &str, default: &str) -> String {
        self.value(key).unwrap_or(default).to_string()
    }

    /// Returns the value for `key` parsed as an integer, or `default`.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.value(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Returns the value for `key` parsed as a float, or `default`.
    #[must_use]
    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        self.value(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Returns the value for `key` as a boolean, or `default`.
    ///
    /// Accepts `true`/`false` and `1`/`0`.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.value(key).map(str::trim) {
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            _ => default,
        }
    }

    /// Inserts or overwrites `key`.
    ///
    /// An existing key keeps its position; a new key is appended.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Returns true when `key` is present.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    /// Removes `key`, returning its previous value.
    pub fn erase(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ParamPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromStr for ParamPackage {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for ParamPackage {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut package = Self::new();
        for (key, value) in iter {
            package.set(key, value);
        }
        package
    }
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            ESCAPE_CHARACTER => escaped.push_str("$2"),
            KEY_VALUE_SEPARATOR => escaped.push_str("$0"),
            PARAM_SEPARATOR => escaped.push_str("$1"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn unescape(escaped: &str) -> String {
    let mut raw = String::with_capacity(escaped.len());
    let mut chars = escaped.chars().peekable();
    while let Some(c) = chars.next() {
        if c != ESCAPE_CHARACTER {
            raw.push(c);
            continue;
        }
        match chars.peek() {
            Some('0') => raw.push(KEY_VALUE_SEPARATOR),
            Some('1') => raw.push(PARAM_SEPARATOR),
            Some('2') => raw.push(ESCAPE_CHARACTER),
            // Unknown escape, keep the text as written
            _ => {
                raw.push(c);
                continue;
            }
        }
        chars.next();
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParamPackage {
        [("engine", "host"), ("guid", "0ce6054c"), ("port", "2")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_serialize_preserves_insertion_order() {
        let mut params = ParamPackage::new();
        params.set("zeta", "1");
        params.set("alpha", "2");
        params.set("mid", "3");
        assert_eq!(params.serialize(), "zeta:1,alpha:2,mid:3");
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut params = sample();
        params.set("guid", "ffff");
        assert_eq!(params.serialize(), "engine:host,guid:ffff,port:2");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_parse_inverts_serialize() {
        let params = sample();
        assert_eq!(ParamPackage::parse(&params.serialize()), params);
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(ParamPackage::parse("").is_empty());
    }

    #[test]
    fn test_parse_skips_malformed_segments() {
        let params = ParamPackage::parse("engine:host,garbage,a:b:c,,port:3");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get_str("engine", ""), "host");
        assert_eq!(params.get_int("port", 0), 3);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let params = sample();
        assert!(params.has("port"));
        assert!(!params.has("Port"));
        assert_eq!(params.get_int("PORT", -1), -1);
    }

    #[test]
    fn test_typed_getters_fall_back_on_parse_failure() {
        let mut params = ParamPackage::new();
        params.set("port", "two");
        params.set("range", "0.75");
        params.set("deadzone", "abc");
        params.set("invert", "1");

        assert_eq!(params.get_int("port", 9), 9);
        assert_eq!(params.get_int("range", 4), 4);
        assert_eq!(params.get_float("range", 0.0), 0.75);
        assert_eq!(params.get_float("deadzone", 0.1), 0.1);
        assert!(params.get_bool("invert", false));
        assert!(params.get_bool("missing", true));
        assert_eq!(params.get_str("missing", "none"), "none");
    }

    #[test]
    fn test_delimiters_are_escaped() {
        let mut params = ParamPackage::new();
        params.set("display", "Pad: 1, $5");
        let serialized = params.serialize();
        assert_eq!(serialized, "display:Pad$0 1$1 $25");
        assert_eq!(ParamPackage::parse(&serialized), params);
    }

    #[test]
    fn test_nested_package_round_trip() {
        let mut modifier = ParamPackage::new();
        modifier.set("engine", "keyboard");
        modifier.set("code", 42);

        let mut stick = ParamPackage::new();
        stick.set("engine", "host");
        stick.set("modifier", modifier.serialize());

        let restored = ParamPackage::parse(&stick.serialize());
        let inner = ParamPackage::parse(&restored.get_str("modifier", ""));
        assert_eq!(inner, modifier);
    }

    #[test]
    fn test_unknown_escape_is_kept() {
        let params = ParamPackage::parse("name:a$9b");
        assert_eq!(params.get_str("name", ""), "a$9b");
    }

    #[test]
    fn test_erase_and_clear() {
        let mut params = sample();
        assert_eq!(params.erase("guid").as_deref(), Some("0ce6054c"));
        assert_eq!(params.erase("guid"), None);
        assert_eq!(params.serialize(), "engine:host,port:2");

        params.clear();
        assert!(params.is_empty());
        assert_eq!(params.serialize(), "");
    }

    #[test]
    fn test_display_and_from_str() {
        let params = sample();
        let parsed: ParamPackage = params.to_string().parse().unwrap();
        assert_eq!(parsed, params);
        assert_eq!(
            parsed.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            vec!["engine", "guid", "port"]
        );
    }
}

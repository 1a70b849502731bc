// ABOUTME: Generic insertion-ordered key/value container holding typed records.
// ABOUTME: Lists are the special case of integer keys 0..n; serializes as a JSON array in that case.

use std::cmp::Ordering;
use std::fmt;

use serde::de::{DeserializeOwned, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Result, ScrapeError};

/// Collection key: an integer position or a string label.
///
/// Keys built from strings are canonical: "3" and `3` are the same key, as
/// they are once serialized. Construct string keys through `From`, not the
/// `Str` variant, to keep that invariant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    /// Canonical integer strings ("3", "-1") become integer keys.
    pub fn parse(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(i) if i.to_string() == s => Key::Int(i),
            _ => Key::Str(s.to_string()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{}", i),
            Key::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<u32> for Key {
    fn from(i: u32) -> Self {
        Key::Int(i64::from(i))
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Int(i as i64)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::parse(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        match Key::parse(&s) {
            Key::Int(i) => Key::Int(i),
            Key::Str(_) => Key::Str(s),
        }
    }
}

/// Insertion-ordered mapping from [`Key`] to `V`.
///
/// Keys are unique. `put` and `push` mutate in place; `filter`, `except`,
/// `map`, `slice` and the sorts return a new collection and leave `self`
/// untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<V> {
    items: Vec<(Key, V)>,
}

impl<V> Default for Collection<V> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<V> Collection<V> {
    /// Builds a list: values keyed 0..n in iteration order.
    pub fn new<I: IntoIterator<Item = V>>(values: I) -> Self {
        Self {
            items: values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (Key::from(i), v))
                .collect(),
        }
    }

    /// Builds from explicit pairs; a repeated key overwrites the earlier value
    /// in place.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<Key>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut collection = Self::default();
        for (k, v) in pairs {
            collection.put(k, v);
        }
        collection
    }

    /// Inserts or replaces. A replaced key keeps its position.
    pub fn put(&mut self, key: impl Into<Key>, value: V) -> &mut Self {
        let key = key.into();
        match self.position(&key) {
            Some(i) => self.items[i].1 = value,
            None => self.items.push((key, value)),
        }
        self
    }

    /// Appends under the next integer key (one past the largest integer key).
    pub fn push(&mut self, value: V) -> &mut Self {
        let next = self
            .items
            .iter()
            .filter_map(|(k, _)| match k {
                Key::Int(i) => Some(*i + 1),
                Key::Str(_) => None,
            })
            .max()
            .unwrap_or(0)
            .max(0);
        self.items.push((Key::Int(next), value));
        self
    }

    pub fn get(&self, key: &Key) -> Option<&V> {
        self.position(key).map(|i| &self.items[i].1)
    }

    pub fn get_or<'a>(&'a self, key: &Key, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    pub fn has(&self, key: &Key) -> bool {
        self.position(key).is_some()
    }

    pub fn remove(&mut self, key: &Key) -> Option<V> {
        self.position(key).map(|i| self.items.remove(i).1)
    }

    fn position(&self, key: &Key) -> Option<usize> {
        self.items.iter().position(|(k, _)| k == key)
    }

    /// Runs `f` on every entry in order.
    pub fn each<F: FnMut(&V, &Key)>(&self, mut f: F) -> &Self {
        for (k, v) in &self.items {
            f(v, k);
        }
        self
    }

    pub fn contains<F: Fn(&V) -> bool>(&self, predicate: F) -> bool {
        self.items.iter().any(|(_, v)| predicate(v))
    }

    pub fn first(&self) -> Option<&V> {
        self.items.first().map(|(_, v)| v)
    }

    /// Transforms every value, keeping keys.
    pub fn map<U, F: FnMut(&V, &Key) -> U>(&self, mut f: F) -> Collection<U> {
        Collection {
            items: self
                .items
                .iter()
                .map(|(k, v)| (k.clone(), f(v, k)))
                .collect(),
        }
    }

    /// Folds the values in order and returns the accumulator.
    pub fn reduce<A, F: FnMut(A, &V, &Key) -> A>(&self, initial: A, mut f: F) -> A {
        self.items
            .iter()
            .fold(initial, |carry, (k, v)| f(carry, v, k))
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn keys(&self) -> Vec<&Key> {
        self.items.iter().map(|(k, _)| k).collect()
    }

    pub fn values(&self) -> Vec<&V> {
        self.items.iter().map(|(_, v)| v).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &V)> {
        self.items.iter().map(|(k, v)| (k, v))
    }

    /// True when keys are exactly 0..n in order.
    pub fn is_list(&self) -> bool {
        self.items
            .iter()
            .enumerate()
            .all(|(i, (k, _))| *k == Key::Int(i as i64))
    }
}

impl<V: Clone> Collection<V> {
    /// Entries for which `f` holds, keys preserved.
    pub fn filter<F: Fn(&V, &Key) -> bool>(&self, f: F) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|(k, v)| f(v, k))
                .cloned()
                .collect(),
        }
    }

    /// Every entry whose key is not in `keys`.
    pub fn except(&self, keys: &[Key]) -> Self {
        self.filter(|_, k| !keys.contains(k))
    }

    /// Keys-preserving slice. A negative `offset` counts from the end; `None`
    /// length runs to the end.
    pub fn slice(&self, offset: isize, length: Option<usize>) -> Self {
        let len = self.items.len();
        let start = if offset < 0 {
            len.saturating_sub(offset.unsigned_abs())
        } else {
            (offset as usize).min(len)
        };
        let end = match length {
            Some(n) => start.saturating_add(n).min(len),
            None => len,
        };
        Self {
            items: self.items[start..end].to_vec(),
        }
    }

    /// Stable sort by comparator; the result is re-indexed as a list.
    pub fn sort_by<F: FnMut(&V, &V) -> Ordering>(&self, mut cmp: F) -> Self {
        let mut values: Vec<V> = self.items.iter().map(|(_, v)| v.clone()).collect();
        values.sort_by(|a, b| cmp(a, b));
        Self::new(values)
    }

    /// Stable sort by a derived key; the result is re-indexed as a list.
    pub fn sort_by_key<K: Ord, F: FnMut(&V) -> K>(&self, mut f: F) -> Self {
        self.sort_by(|a, b| f(a).cmp(&f(b)))
    }
}

impl<V: Clone + PartialOrd> Collection<V> {
    /// Ascending by value, keys preserved. Incomparable values keep their order.
    pub fn sort_asc(&self) -> Self {
        let mut items = self.items.clone();
        items.sort_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        Self { items }
    }

    /// Descending by value, keys preserved.
    pub fn sort_desc(&self) -> Self {
        let mut items = self.items.clone();
        items.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(Ordering::Equal));
        Self { items }
    }
}

impl<V: PartialEq> Collection<V> {
    pub fn contains_value(&self, value: &V) -> bool {
        self.items.iter().any(|(_, v)| v == value)
    }

    /// Values with duplicates removed, first occurrence wins.
    pub fn unique_values(&self) -> Vec<&V> {
        let mut seen: Vec<&V> = Vec::new();
        for (_, v) in &self.items {
            if !seen.contains(&v) {
                seen.push(v);
            }
        }
        seen
    }
}

impl<V: Serialize> Collection<V> {
    /// First value whose serialized `field` equals `value`.
    pub fn first_where(&self, field: &str, value: &Value) -> Option<&V> {
        self.items
            .iter()
            .find(|(_, v)| {
                serde_json::to_value(v)
                    .ok()
                    .and_then(|plain| plain.get(field).cloned())
                    .is_some_and(|found| &found == value)
            })
            .map(|(_, v)| v)
    }

    /// Plain JSON form, nested collections and records flattened recursively.
    pub fn to_array(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn to_json(&self) -> String {
        self.to_array().to_string()
    }
}

impl<V: DeserializeOwned> Collection<V> {
    /// Builds from a plain JSON array or object; anything else is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(_) | Value::Object(_) => serde_json::from_value(value).map_err(|e| {
                ScrapeError::invalid_input("Collection", "Collection::from_value", Some(e.into()))
            }),
            other => Err(ScrapeError::invalid_input(
                "Collection",
                "Collection::from_value",
                Some(anyhow::anyhow!(
                    "items must be an array or object, got {}",
                    other
                )),
            )),
        }
    }
}

impl Collection<Value> {
    /// Flattens nested JSON arrays up to `depth` levels into one list.
    pub fn flatten(value: &Value, depth: usize) -> Vec<Value> {
        let mut result = Vec::new();
        flatten_into(value, depth, &mut result);
        result
    }
}

fn flatten_into(value: &Value, depth: usize, out: &mut Vec<Value>) {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        other => {
            out.push(other.clone());
            return;
        }
    };
    for item in items {
        if depth > 1 && (item.is_array() || item.is_object()) {
            flatten_into(item, depth - 1, out);
        } else {
            out.push(item.clone());
        }
    }
}

impl<V> IntoIterator for Collection<V> {
    type Item = (Key, V);
    type IntoIter = std::vec::IntoIter<(Key, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<V> FromIterator<V> for Collection<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<V: Serialize> Serialize for Collection<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.is_list() {
            let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
            for (_, v) in &self.items {
                seq.serialize_element(v)?;
            }
            seq.end()
        } else {
            let mut map = serializer.serialize_map(Some(self.items.len()))?;
            for (k, v) in &self.items {
                map.serialize_entry(&k.to_string(), v)?;
            }
            map.end()
        }
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Collection<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(CollectionVisitor(std::marker::PhantomData))
    }
}

struct CollectionVisitor<V>(std::marker::PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for CollectionVisitor<V> {
    type Value = Collection<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array or a map")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(v) = seq.next_element()? {
            values.push(v);
        }
        Ok(Collection::new(values))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
        let mut collection = Collection::default();
        while let Some((k, v)) = map.next_entry::<String, V>()? {
            collection.put(Key::parse(&k), v);
        }
        Ok(collection)
    }
}

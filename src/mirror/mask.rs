//! Filter mask: which sub-collections an export run includes.
//!
//! A mask level maps sanitized child names to nested masks. An empty nested
//! mask means "include this subtree fully"; a name missing from a level
//! excludes that child and everything below it. Names written as `false`
//! are remembered so a level listing only exclusions never reads as the
//! full marker.

use crate::utils::sanitize;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterMask {
    children: BTreeMap<String, FilterMask>,
    excluded: BTreeSet<String>,
}

/// Outcome of looking a collection up in a mask level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion<'a> {
    /// Include the whole subtree without further lookups.
    Full,
    /// Skip the node and its subtree.
    Excluded,
    /// Include the node's own items; filter its children through the nested mask.
    Partial(&'a FilterMask),
}

impl FilterMask {
    /// The empty marker: include everything below.
    pub fn full() -> Self {
        Self::default()
    }

    /// Build a level from raw names; keys are sanitized and duplicates merged.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, FilterMask)>,
        S: AsRef<str>,
    {
        let mut mask = Self::default();
        for (name, child) in entries {
            mask.insert(name.as_ref(), child);
        }
        mask
    }

    /// Build a mask from `/`-separated collection paths relative to the root.
    ///
    /// `["AI", "Bio/Genetics"]` includes `AI` fully and, under `Bio`, only
    /// `Genetics` (plus `Bio`'s own items).
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mask: Option<FilterMask> = None;
        for path in paths {
            let segments: Vec<&str> =
                path.as_ref().split('/').map(str::trim).filter(|s| !s.is_empty()).collect();
            let Some((last, parents)) = segments.split_last() else { continue };
            let mut leaf = Self::from_entries([(*last, Self::full())]);
            for parent in parents.iter().rev() {
                leaf = Self::from_entries([(*parent, leaf)]);
            }
            mask = Some(match mask {
                Some(acc) => acc.merged(leaf),
                None => leaf,
            });
        }
        mask.unwrap_or_default()
    }

    pub fn is_full(&self) -> bool {
        self.children.is_empty() && self.excluded.is_empty()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Nested mask for an already-sanitized child name.
    pub fn get(&self, sanitized_name: &str) -> Option<&FilterMask> {
        self.children.get(sanitized_name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Names explicitly excluded at this level.
    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }

    fn insert(&mut self, name: &str, child: FilterMask) {
        let key = sanitize(name);
        self.excluded.remove(&key);
        let merged = match self.children.remove(&key) {
            Some(existing) => existing.merged(child),
            None => child,
        };
        self.children.insert(key, merged);
    }

    /// Record `name` as excluded unless it is already included.
    fn exclude(&mut self, name: &str) {
        let key = sanitize(name);
        if !self.children.contains_key(&key) {
            self.excluded.insert(key);
        }
    }

    /// Union of two masks. A full marker on either side wins, and an
    /// inclusion wins over an exclusion of the same name.
    fn merged(self, other: FilterMask) -> FilterMask {
        if self.is_full() || other.is_full() {
            return FilterMask::full();
        }
        let mut result = self;
        for (key, child) in other.children {
            result.insert(&key, child);
        }
        for key in other.excluded {
            result.exclude(&key);
        }
        result
    }
}

/// Three-way lookup of a collection in the current mask level.
///
/// `mask == None` is the default full export, and an empty level is the
/// full marker wherever it appears.
pub fn evaluate<'a>(mask: Option<&'a FilterMask>, sanitized_name: &str) -> Inclusion<'a> {
    let Some(mask) = mask.filter(|m| !m.is_full()) else {
        return Inclusion::Full;
    };
    match mask.get(sanitized_name) {
        None => Inclusion::Excluded,
        Some(child) if child.is_full() => Inclusion::Full,
        Some(child) => Inclusion::Partial(child),
    }
}

/// Wire form of one mask entry: nested object, `true`, or `null` (both full),
/// or `false` (excluded, like a missing key).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Flag(bool),
    Nested(BTreeMap<String, Option<RawEntry>>),
}

fn from_raw(raw: BTreeMap<String, Option<RawEntry>>) -> FilterMask {
    let mut mask = FilterMask::default();
    let mut excluded = Vec::new();
    for (name, entry) in raw {
        match entry {
            None | Some(RawEntry::Flag(true)) => mask.insert(&name, FilterMask::full()),
            Some(RawEntry::Flag(false)) => excluded.push(name),
            Some(RawEntry::Nested(nested)) => mask.insert(&name, from_raw(nested)),
        }
    }
    for name in excluded {
        mask.exclude(&name);
    }
    mask
}

impl Serialize for FilterMask {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.children.len() + self.excluded.len()))?;
        for (name, child) in &self.children {
            map.serialize_entry(name, child)?;
        }
        for name in &self.excluded {
            map.serialize_entry(name, &false)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FilterMask {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Option<RawEntry>>::deserialize(deserializer)?;
        Ok(from_raw(raw))
    }
}

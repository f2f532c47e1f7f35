// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Resource names: wildcard patterns and the concrete identifiers they expand to.
//!
//! A name has the textual form `domain:key=value[,key=value]*`. The domain and
//! any value may contain the `*` and `?` wildcards, and a bare `*` entry in the
//! property list (e.g. `java.lang:type=GarbageCollector,*`) turns the name into
//! a property-list pattern that also matches resources carrying extra keys.

use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Error raised when a resource name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid resource name `{input}`: {reason}")]
pub struct PatternError {
    /// The offending text, verbatim.
    pub input: String,
    /// What is wrong with it.
    pub reason: String,
}

impl PatternError {
    fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// The key properties of a resource name, in the order they were written.
///
/// Iteration follows insertion order, which keeps key generation stable across
/// calls. Equality and hashing ignore the order.
#[derive(Debug, Clone, Default)]
pub struct PropertyList {
    entries: Vec<(String, String)>,
}

impl PropertyList {
    /// Creates an empty property list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a property. Returns `false` (and leaves the list untouched) if
    /// the key is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains_key(&key) {
            return false;
        }
        self.entries.push((key, value.into()));
        true
    }

    /// Returns the value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if `key` is one of the properties.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no properties.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Formats the list as `k=v,k=v` in insertion order.
    pub fn to_key_string(&self) -> String {
        join_pairs(self.entries.iter())
    }

    /// Formats the list as `k=v,k=v` sorted by key.
    pub fn to_canonical_string(&self) -> String {
        join_pairs(self.sorted().into_iter())
    }

    fn sorted(&self) -> Vec<&(String, String)> {
        let mut sorted: Vec<_> = self.entries.iter().collect();
        sorted.sort();
        sorted
    }
}

fn join_pairs<'a>(pairs: impl Iterator<Item = &'a (String, String)>) -> String {
    pairs
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}

impl PartialEq for PropertyList {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.sorted() == other.sorted()
    }
}

impl Eq for PropertyList {}

impl Hash for PropertyList {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyList {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut list = PropertyList::new();
        for (key, value) in iter {
            list.insert(key, value);
        }
        list
    }
}

/// A possibly-wildcarded name identifying one or more resources.
#[derive(Debug, Clone)]
pub struct ResourcePattern {
    domain: String,
    properties: PropertyList,
    property_list_pattern: bool,
}

impl ResourcePattern {
    /// Parses a pattern such as `java.lang:type=MemoryPool,name=*`.
    pub fn parse(input: &str) -> Result<Self, PatternError> {
        let parsed = parse_name(input)?;
        Ok(Self {
            domain: parsed.domain,
            properties: parsed.properties,
            property_list_pattern: parsed.property_list_pattern,
        })
    }

    /// The domain part, which may contain wildcards.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The key properties, in the order they were written.
    pub fn properties(&self) -> &PropertyList {
        &self.properties
    }

    /// Returns `true` if the property list ends with the `*` entry.
    pub fn is_property_list_pattern(&self) -> bool {
        self.property_list_pattern
    }

    /// Returns `true` if this pattern can match more than one resource.
    pub fn is_pattern(&self) -> bool {
        self.property_list_pattern
            || has_wildcard(&self.domain)
            || self.properties.iter().any(|(_, v)| has_wildcard(v))
    }

    /// Tests whether a concrete resource falls under this pattern.
    pub fn matches(&self, resource: &ResourceId) -> bool {
        if !wildcard_match(&self.domain, resource.domain()) {
            return false;
        }
        if !self.property_list_pattern && self.properties.len() != resource.properties().len() {
            return false;
        }
        self.properties
            .iter()
            .all(|(key, expected)| match resource.properties().get(key) {
                Some(actual) => wildcard_match(expected, actual),
                None => false,
            })
    }

    /// The pattern with its properties sorted by key.
    pub fn canonical_name(&self) -> String {
        format_name(
            &self.domain,
            &self.properties.to_canonical_string(),
            self.property_list_pattern,
        )
    }
}

impl PartialEq for ResourcePattern {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain
            && self.property_list_pattern == other.property_list_pattern
            && self.properties == other.properties
    }
}

impl Eq for ResourcePattern {}

impl Hash for ResourcePattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain.hash(state);
        self.property_list_pattern.hash(state);
        self.properties.hash(state);
    }
}

impl Display for ResourcePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_name(
            &self.domain,
            &self.properties.to_key_string(),
            self.property_list_pattern,
        ))
    }
}

impl FromStr for ResourcePattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ResourceId> for ResourcePattern {
    fn from(id: ResourceId) -> Self {
        Self {
            domain: id.domain,
            properties: id.properties,
            property_list_pattern: false,
        }
    }
}

/// The name of exactly one resource: a pattern with every wildcard resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    domain: String,
    properties: PropertyList,
}

impl ResourceId {
    /// Parses a concrete name. Wildcards anywhere are rejected.
    pub fn parse(input: &str) -> Result<Self, PatternError> {
        let parsed = parse_name(input)?;
        if parsed.property_list_pattern
            || has_wildcard(&parsed.domain)
            || parsed.properties.iter().any(|(_, v)| has_wildcard(v))
        {
            return Err(PatternError::new(
                input,
                "a concrete resource name cannot contain wildcards",
            ));
        }
        Ok(Self {
            domain: parsed.domain,
            properties: parsed.properties,
        })
    }

    /// The domain part.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The key properties, in the order they were written.
    pub fn properties(&self) -> &PropertyList {
        &self.properties
    }

    /// The key properties formatted as `k=v,k=v` in written order.
    pub fn key_property_list_string(&self) -> String {
        self.properties.to_key_string()
    }

    /// The name with its properties sorted by key.
    pub fn canonical_name(&self) -> String {
        format_name(&self.domain, &self.properties.to_canonical_string(), false)
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.properties.to_key_string())
    }
}

impl FromStr for ResourceId {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct ParsedName {
    domain: String,
    properties: PropertyList,
    property_list_pattern: bool,
}

fn parse_name(input: &str) -> Result<ParsedName, PatternError> {
    let (domain, rest) = input
        .split_once(':')
        .ok_or_else(|| PatternError::new(input, "missing `:` between domain and properties"))?;
    if domain.contains('\n') {
        return Err(PatternError::new(input, "domain contains a newline"));
    }
    if rest.is_empty() {
        return Err(PatternError::new(input, "key property list is empty"));
    }

    let mut properties = PropertyList::new();
    let mut property_list_pattern = false;
    for segment in split_properties(input, rest)? {
        if segment == "*" {
            if property_list_pattern {
                return Err(PatternError::new(input, "`*` appears more than once"));
            }
            property_list_pattern = true;
            continue;
        }
        let (key, value) = segment
            .split_once('=')
            .ok_or_else(|| PatternError::new(input, format!("`{segment}` is not key=value")))?;
        validate_key(input, key)?;
        validate_value(input, key, value)?;
        if !properties.insert(key, value) {
            return Err(PatternError::new(input, format!("duplicate key `{key}`")));
        }
    }
    if properties.is_empty() && !property_list_pattern {
        return Err(PatternError::new(input, "key property list is empty"));
    }

    Ok(ParsedName {
        domain: domain.to_string(),
        properties,
        property_list_pattern,
    })
}

/// Splits on commas that are not inside a quoted value.
fn split_properties<'a>(input: &str, rest: &'a str) -> Result<Vec<&'a str>, PatternError> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                segments.push(&rest[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_quotes {
        return Err(PatternError::new(input, "unterminated quoted value"));
    }
    segments.push(&rest[start..]);
    Ok(segments)
}

fn validate_key(input: &str, key: &str) -> Result<(), PatternError> {
    if key.is_empty() {
        return Err(PatternError::new(input, "empty key"));
    }
    if key.contains(|c: char| matches!(c, ':' | '*' | '?' | '"' | '\n')) {
        return Err(PatternError::new(input, format!("illegal character in key `{key}`")));
    }
    Ok(())
}

fn validate_value(input: &str, key: &str, value: &str) -> Result<(), PatternError> {
    if value.is_empty() {
        return Err(PatternError::new(input, format!("empty value for key `{key}`")));
    }
    if value.starts_with('"') {
        if value.len() < 2 || !value.ends_with('"') {
            return Err(PatternError::new(input, format!("badly quoted value for key `{key}`")));
        }
        return Ok(());
    }
    if value.contains(|c: char| matches!(c, ':' | '"' | '=' | '\n')) {
        return Err(PatternError::new(
            input,
            format!("illegal character in value for key `{key}`"),
        ));
    }
    Ok(())
}

fn format_name(domain: &str, properties: &str, property_list_pattern: bool) -> String {
    match (properties.is_empty(), property_list_pattern) {
        (true, true) => format!("{domain}:*"),
        (false, true) => format!("{domain}:{properties},*"),
        _ => format!("{domain}:{properties}"),
    }
}

fn has_wildcard(text: &str) -> bool {
    !text.starts_with('"') && text.contains(['*', '?'])
}

/// Glob match supporting `*` (any run of characters) and `?` (one character).
/// Quoted values are compared literally.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    if !has_wildcard(pattern) {
        return pattern == text;
    }
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        match pattern.get(p) {
            Some(&'*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

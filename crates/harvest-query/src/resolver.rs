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

//! `${NAME}` placeholder expansion for configuration strings.
//!
//! `${NAME}` is replaced by the environment variable `NAME`, and
//! `${NAME:default}` falls back to `default` when the variable is unset.
//! Placeholders that cannot be resolved are left as written.

use std::env;

/// Expands every placeholder in `value`.
pub fn resolve(value: &str) -> String {
    resolve_with(value, |name| env::var(name).ok())
}

/// Expands every entry of a list.
pub fn resolve_list(values: &[String]) -> Vec<String> {
    values.iter().map(|value| resolve(value)).collect()
}

fn resolve_with(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let body = &after[..end];
        let (name, default) = match body.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (body, None),
        };
        match lookup(name).or_else(|| default.map(str::to_string)) {
            Some(resolved) => out.push_str(&resolved),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

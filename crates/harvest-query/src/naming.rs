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

//! Key fragment construction from a resource's key properties.
//!
//! When a wildcard pattern expands to several resources, the results of each
//! resource need a distinguishing part in their output key. A
//! [`NamingStrategy`] turns the matched resource's properties into that part.

use harvest_core::PropertyList;

/// Separator used between key parts unless dotted keys are allowed.
pub const DEFAULT_SEPARATOR: &str = "_";

/// Separator used when dotted keys are allowed.
pub const DOTTED_SEPARATOR: &str = ".";

/// How the key fragment of a matched resource is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingStrategy {
    /// Passes the already-known type-name string through unchanged.
    Default {
        /// Separator between key parts.
        separator: &'static str,
    },
    /// Emits the values of the listed properties, in list order, ahead of
    /// the default fragment.
    Prepending {
        /// Separator between key parts.
        separator: &'static str,
        /// Property names to look up.
        type_names: Vec<String>,
    },
    /// Emits `name<sep>value` for every property of the resource.
    UseAll {
        /// Separator between key parts.
        separator: &'static str,
    },
}

impl NamingStrategy {
    /// Picks the strategy for a query's flags. `use_all_type_names` wins over
    /// a non-empty `type_names` list.
    pub fn select(type_names: &[String], allow_dotted_keys: bool, use_all_type_names: bool) -> Self {
        let separator = if allow_dotted_keys {
            DOTTED_SEPARATOR
        } else {
            DEFAULT_SEPARATOR
        };
        if use_all_type_names {
            NamingStrategy::UseAll { separator }
        } else if !type_names.is_empty() {
            NamingStrategy::Prepending {
                separator,
                type_names: type_names.to_vec(),
            }
        } else {
            NamingStrategy::Default { separator }
        }
    }

    /// The separator this strategy joins with.
    pub fn separator(&self) -> &'static str {
        match self {
            NamingStrategy::Default { separator }
            | NamingStrategy::Prepending { separator, .. }
            | NamingStrategy::UseAll { separator } => *separator,
        }
    }

    /// Builds the key fragment for one resource.
    ///
    /// `type_name` is the fragment already computed by the caller, if any.
    pub fn build(&self, properties: &PropertyList, type_name: Option<&str>) -> String {
        match self {
            NamingStrategy::Default { .. } => type_name.unwrap_or_default().to_string(),
            NamingStrategy::Prepending {
                separator,
                type_names,
            } => {
                let mut parts: Vec<&str> = type_names
                    .iter()
                    .filter_map(|name| properties.get(name))
                    .collect();
                if let Some(fragment) = type_name.filter(|f| !f.is_empty()) {
                    parts.push(fragment);
                }
                parts.join(*separator)
            }
            NamingStrategy::UseAll { separator } => properties
                .iter()
                .flat_map(|(name, value)| [name, value])
                .collect::<Vec<_>>()
                .join(*separator),
        }
    }
}

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

//! Flat result records handed to output sinks.

use harvest_core::AttributeValue;
use serde::Serialize;

/// One value read from one attribute of one resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    /// Name of the attribute the value came from.
    pub attribute_name: String,
    /// Implementation class of the resource.
    pub class_name: String,
    /// Domain of the resource.
    pub domain: String,
    /// The resource's key properties, `k=v,k=v` in written order.
    pub type_name: String,
    /// First key part: the result alias, the domain or the class name.
    pub key_prefix: String,
    /// Fragment built by the query's naming strategy. May be empty.
    pub key_fragment: String,
    /// Path into a composite value, empty for a whole attribute.
    pub value_path: Vec<String>,
    /// The value itself.
    pub value: AttributeValue,
    /// Milliseconds since the Unix epoch at fetch time.
    pub epoch_millis: u64,
}

impl ResultRecord {
    /// The ordered key parts: prefix, fragment (when non-empty), attribute
    /// name and any value path.
    pub fn key_parts(&self) -> Vec<&str> {
        let mut parts = Vec::with_capacity(3 + self.value_path.len());
        parts.push(self.key_prefix.as_str());
        if !self.key_fragment.is_empty() {
            parts.push(self.key_fragment.as_str());
        }
        parts.push(self.attribute_name.as_str());
        parts.extend(self.value_path.iter().map(String::as_str));
        parts
    }

    /// The key parts joined by `separator`.
    pub fn key(&self, separator: &str) -> String {
        self.key_parts().join(separator)
    }
}

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

//! JSON configuration: process files, servers and query entries.
//!
//! A process file looks like:
//!
//! ```json
//! {
//!   "servers": [{
//!     "host": "localhost",
//!     "port": 9999,
//!     "queries": [{
//!       "obj": "java.lang:type=Memory",
//!       "attr": ["HeapMemoryUsage"],
//!       "outputWriters": [{"@class": "log"}]
//!     }]
//!   }]
//! }
//! ```

use crate::error::{QueryError, QueryResult};
use crate::query::QuerySpec;
use crate::sink::{SinkDescriptor, SinkFactoryRegistry};
use harvest_core::ServerContext;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One query entry as written in configuration.
///
/// Fields serialize in the order `obj, attr, typeNames, resultAlias, keys,
/// allowDottedKeys, useAllTypeNames, outputWriters, useObjDomainAsKey`;
/// absent optional fields are omitted. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfig {
    /// Resource pattern, e.g. `java.lang:type=Memory`.
    pub obj: String,
    /// Attributes to fetch; absent or empty fetches all of them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<Vec<String>>,
    /// Key properties used for naming results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_names: Option<Vec<String>>,
    /// Overrides the key prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_alias: Option<String>,
    /// Supplemental keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
    /// Keep dots in keys and join key parts with `.`.
    #[serde(default)]
    pub allow_dotted_keys: bool,
    /// Name results from every key property.
    #[serde(default)]
    pub use_all_type_names: bool,
    /// Sinks to send results to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_writers: Option<Vec<SinkDescriptor>>,
    /// Use the resource domain as key prefix instead of the class name.
    #[serde(default)]
    pub use_obj_domain_as_key: bool,
}

impl QueryConfig {
    /// Builds the query, resolving each `outputWriters` entry through `registry`.
    pub fn build(&self, registry: &SinkFactoryRegistry) -> QueryResult<QuerySpec> {
        let factories = self
            .output_writers
            .iter()
            .flatten()
            .map(|descriptor| registry.resolve(descriptor))
            .collect::<QueryResult<Vec<_>>>()?;

        let mut builder = QuerySpec::builder()
            .obj(self.obj.clone())
            .add_attrs(self.attr.iter().flatten().cloned())
            .add_type_names(self.type_names.iter().flatten().cloned())
            .add_keys(self.keys.iter().flatten().cloned())
            .allow_dotted_keys(self.allow_dotted_keys)
            .use_all_type_names(self.use_all_type_names)
            .use_obj_domain_as_key(self.use_obj_domain_as_key)
            .add_output_sinks(factories);
        if let Some(alias) = &self.result_alias {
            builder = builder.result_alias(alias.clone());
        }
        builder.build()
    }
}

/// One monitored server and its queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Host name or address.
    pub host: String,
    /// Management port.
    pub port: u16,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Queries to run against this server.
    #[serde(default)]
    pub queries: Vec<QueryConfig>,
}

impl ServerConfig {
    /// The context handed to sinks for results from this server.
    pub fn context(&self) -> ServerContext {
        ServerContext {
            host: self.host.clone(),
            port: self.port,
            alias: self.alias.clone(),
        }
    }

    /// Builds every query, dropping entries equal to an earlier one.
    pub fn build_queries(&self, registry: &SinkFactoryRegistry) -> QueryResult<Vec<QuerySpec>> {
        let mut queries: Vec<QuerySpec> = Vec::with_capacity(self.queries.len());
        for config in &self.queries {
            let query = config.build(registry)?;
            if queries.contains(&query) {
                log::debug!("Dropping duplicate query {} for {}", query, self.context());
                continue;
            }
            queries.push(query);
        }
        Ok(queries)
    }
}

/// A whole process file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// File name the process was loaded from, if any.
    #[serde(skip)]
    pub name: Option<String>,
    /// Servers to query.
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

impl ProcessConfig {
    /// Parses a process document.
    pub fn from_json_str(json: &str) -> QueryResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a process file, naming the process after the file.
    pub fn from_path(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| QueryError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let mut process = Self::from_json_str(&json)?;
        process.name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Ok(process)
    }
}

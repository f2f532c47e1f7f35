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

//! Errors raised while building, executing and dispatching queries.

use harvest_core::{PatternError, ServerError};
use std::path::PathBuf;

/// A specialized `Result` type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// An error that can occur within the query core.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The `obj` pattern could not be parsed.
    #[error("invalid object name: {input}")]
    InvalidPattern {
        /// The offending pattern text.
        input: String,
        /// Why it was rejected.
        #[source]
        source: PatternError,
    },
    /// A sink factory failed while the query was being built.
    #[error("output sink #{index} could not be created")]
    SinkConstruction {
        /// Position of the factory in configuration order.
        index: usize,
        /// The factory's error.
        #[source]
        source: anyhow::Error,
    },
    /// An `outputWriters` entry names a sink type nobody registered.
    #[error("unknown output sink type `{0}`")]
    UnknownSinkType(String),
    /// A registered sink type rejected the settings of an `outputWriters` entry.
    #[error("output sink type `{class}` rejected its settings")]
    SinkFactory {
        /// The sink type.
        class: String,
        /// The constructor's error.
        #[source]
        source: anyhow::Error,
    },
    /// Resolving the pattern against the server failed.
    #[error("discovery failed for pattern {pattern}")]
    Discovery {
        /// The query pattern.
        pattern: String,
        /// The server's error.
        #[source]
        source: ServerError,
    },
    /// Fetching attributes from one resource failed.
    #[error("fetch failed for resource {resource} of query {pattern} (attributes {attributes:?})")]
    Fetch {
        /// The query pattern.
        pattern: String,
        /// The concrete resource name.
        resource: String,
        /// The attributes being fetched, empty if the failure came first.
        attributes: Vec<String>,
        /// The server's error.
        #[source]
        source: ServerError,
    },
    /// An output sink rejected the results.
    #[error("output sink #{index} failed for query {query}")]
    Dispatch {
        /// Position of the sink in configuration order.
        index: usize,
        /// The query pattern.
        query: String,
        /// The sink's error.
        #[source]
        source: anyhow::Error,
    },
    /// A configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// A configuration file could not be read.
    #[error("failed to read configuration file {path:?}")]
    ReadConfig {
        /// The file being read.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },
}

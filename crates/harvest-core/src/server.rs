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

//! The contract a remote management server must fulfil.
//!
//! Connections, transports and authentication live behind this trait; the
//! query core only ever sees resource names and attribute values.

use crate::pattern::{ResourceId, ResourcePattern};
use crate::value::Attribute;
use std::fmt::{self, Display};

/// Identifies the server a batch of results came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerContext {
    /// Host name or address.
    pub host: String,
    /// Port of the management endpoint.
    pub port: u16,
    /// Optional human-friendly name used in output keys.
    pub alias: Option<String>,
}

impl ServerContext {
    /// Creates a context for `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            alias: None,
        }
    }

    /// Sets the alias, returning the updated context.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The alias if set, otherwise `host:port`.
    pub fn label(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => format!("{}:{}", self.host, self.port),
        }
    }
}

impl Display for ServerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Root cause attached to an unmarshalling failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnmarshalCause {
    /// The value's type is not available on this side of the connection.
    #[error("class not found: {0}")]
    ClassNotFound(String),
    /// Anything else.
    #[error("{0}")]
    Other(String),
}

/// Failures reported by a [`ManagementServer`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServerError {
    /// The connection to the server failed.
    #[error("I/O failure: {0}")]
    Io(String),
    /// The named resource is not registered on the server.
    #[error("resource not found: {0}")]
    InstanceNotFound(String),
    /// The server could not describe the resource.
    #[error("introspection failed: {0}")]
    Introspection(String),
    /// The server failed while invoking an attribute getter.
    #[error("reflection failure: {0}")]
    Reflection(String),
    /// A returned value could not be decoded.
    #[error("unmarshalling failed: {message}")]
    Unmarshal {
        /// Description of the failure.
        message: String,
        /// The underlying cause, if known.
        #[source]
        cause: Option<UnmarshalCause>,
    },
}

impl ServerError {
    /// Returns `true` for failures that only mean a value type is unknown
    /// locally; those are skipped instead of failing the resource.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            ServerError::Unmarshal {
                cause: Some(UnmarshalCause::ClassNotFound(_)),
                ..
            }
        )
    }
}

/// A connection to a remote management server.
///
/// Implementations must be usable from several threads at once; each query
/// execution borrows the server for its whole duration.
pub trait ManagementServer: Send + Sync {
    /// Resolves a pattern to every concrete resource it matches.
    /// No match is an empty vector, not an error.
    fn query_names(&self, pattern: &ResourcePattern) -> Result<Vec<ResourceId>, ServerError>;

    /// Lists the names of every attribute the resource exposes.
    fn attribute_names(&self, resource: &ResourceId) -> Result<Vec<String>, ServerError>;

    /// The implementation class name of the resource.
    fn class_name(&self, resource: &ResourceId) -> Result<String, ServerError>;

    /// The domain of the resource.
    fn domain(&self, resource: &ResourceId) -> Result<String, ServerError> {
        Ok(resource.domain().to_string())
    }

    /// Fetches the named attributes in one call. Attributes the server cannot
    /// read may be left out of the result.
    fn attribute_values(
        &self,
        resource: &ResourceId,
        names: &[String],
    ) -> Result<Vec<Attribute>, ServerError>;
}

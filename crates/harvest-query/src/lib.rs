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

//! # Harvest Query
//!
//! Resolves a resource pattern on a management server, fetches attributes
//! from every match, names each value with a stable key and hands the
//! records to the query's output sinks.
//!
//! ```no_run
//! use harvest_query::{InMemoryServer, QueryExecutor, QuerySpec};
//! use harvest_core::ServerContext;
//!
//! # fn main() -> Result<(), harvest_query::QueryError> {
//! let server = InMemoryServer::new();
//! let query = QuerySpec::builder()
//!     .obj("java.lang:type=MemoryPool,name=*")
//!     .add_attr("Usage")
//!     .add_type_name("name")
//!     .build()?;
//!
//! let execution = QueryExecutor::new(&server).execute(&query)?;
//! query.run_output_sinks(&ServerContext::new("localhost", 9999), &execution.results)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod naming;
pub mod processor;
pub mod query;
pub mod record;
pub mod resolver;
pub mod server;
pub mod sink;

pub use config::{ProcessConfig, QueryConfig, ServerConfig};
pub use error::{QueryError, QueryResult};
pub use execution::{Execution, QueryExecutor};
pub use naming::NamingStrategy;
pub use processor::{PassThroughProcessor, ProcessorInput, ResultProcessor};
pub use query::{QuerySpec, QuerySpecBuilder};
pub use record::ResultRecord;
pub use server::InMemoryServer;
pub use sink::{OutputSink, OutputSinkFactory, SinkDescriptor, SinkFactoryRegistry};

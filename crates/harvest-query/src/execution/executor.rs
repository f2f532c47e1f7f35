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

//! Discovery and attribute fetch for one query.

use crate::error::{QueryError, QueryResult};
use crate::processor::{PassThroughProcessor, ProcessorInput, ResultProcessor};
use crate::query::QuerySpec;
use crate::record::ResultRecord;
use harvest_core::{ManagementServer, ResourceId, ServerContext};
use std::time::{SystemTime, UNIX_EPOCH};

/// Outcome of running a query over every resource its pattern matched.
#[derive(Debug, Default)]
pub struct Execution {
    /// Resources returned by discovery, in server order.
    pub resources: Vec<ResourceId>,
    /// Records from every resource that was fetched successfully.
    pub results: Vec<ResultRecord>,
    /// One error per resource whose fetch failed.
    pub failures: Vec<QueryError>,
}

impl Execution {
    /// Returns `true` if no resource failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Executes queries against one server connection.
///
/// The executor holds no state of its own; it is cheap to create per
/// execution and blocks for as long as the server calls take.
pub struct QueryExecutor<'a> {
    server: &'a dyn ManagementServer,
    processor: &'a dyn ResultProcessor,
}

impl<'a> QueryExecutor<'a> {
    /// Creates an executor that passes values through unflattened.
    pub fn new(server: &'a dyn ManagementServer) -> Self {
        Self {
            server,
            processor: &PassThroughProcessor,
        }
    }

    /// Creates an executor with a custom result processor.
    pub fn with_processor(
        server: &'a dyn ManagementServer,
        processor: &'a dyn ResultProcessor,
    ) -> Self {
        Self { server, processor }
    }

    /// Resolves the query pattern to concrete resources.
    pub fn discover(&self, query: &QuerySpec) -> QueryResult<Vec<ResourceId>> {
        self.server
            .query_names(query.pattern())
            .map_err(|source| QueryError::Discovery {
                pattern: query.pattern().to_string(),
                source,
            })
    }

    /// Fetches the query's attributes from one resource.
    ///
    /// With no configured attributes every attribute the resource exposes is
    /// fetched. Nothing is fetched when that set is empty. A value whose type
    /// is unknown locally yields no records instead of an error.
    pub fn fetch(&self, query: &QuerySpec, resource: &ResourceId) -> QueryResult<Vec<ResultRecord>> {
        let fetch_error = |attributes: &[String], source| QueryError::Fetch {
            pattern: query.pattern().to_string(),
            resource: resource.to_string(),
            attributes: attributes.to_vec(),
            source,
        };

        let class_name = self
            .server
            .class_name(resource)
            .map_err(|source| fetch_error(&[], source))?;
        let attributes = if query.attributes().is_empty() {
            self.server
                .attribute_names(resource)
                .map_err(|source| fetch_error(&[], source))?
        } else {
            query.attributes().to_vec()
        };
        if attributes.is_empty() {
            return Ok(Vec::new());
        }

        log::debug!(
            "Executing resource [{}] from query [{}]",
            resource.canonical_name(),
            query
        );
        let values = match self.server.attribute_values(resource, &attributes) {
            Ok(values) => values,
            Err(err) if err.is_benign() => {
                log::debug!("Bad unmarshall, continuing: {}", err);
                return Ok(Vec::new());
            }
            Err(err) => return Err(fetch_error(&attributes, err)),
        };
        let domain = self
            .server
            .domain(resource)
            .map_err(|source| fetch_error(&attributes, source))?;

        Ok(self.processor.process(ProcessorInput {
            query,
            resource,
            class_name,
            domain,
            attributes: values,
            epoch_millis: now_millis(),
        }))
    }

    /// Discovers and fetches every matched resource.
    ///
    /// Only a discovery failure is returned as `Err`; a resource that fails to
    /// fetch is recorded in [`Execution::failures`] and the others still run.
    pub fn execute(&self, query: &QuerySpec) -> QueryResult<Execution> {
        let resources = self.discover(query)?;
        let mut execution = Execution::default();
        for resource in &resources {
            match self.fetch(query, resource) {
                Ok(records) => execution.results.extend(records),
                Err(err) => {
                    log::warn!("Skipping resource {}: {}", resource, err);
                    execution.failures.push(err);
                }
            }
        }
        execution.resources = resources;
        Ok(execution)
    }

    /// Executes the query and hands its results to every output sink.
    pub fn run(&self, context: &ServerContext, query: &QuerySpec) -> QueryResult<Execution> {
        let execution = self.execute(query)?;
        query.run_output_sinks(context, &execution.results)?;
        Ok(execution)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

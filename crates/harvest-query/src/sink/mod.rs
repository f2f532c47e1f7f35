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

//! Output sink contracts.
//!
//! Concrete sinks (files, network endpoints, aggregators) live outside this
//! crate. A query owns one sink per configured factory, created once when the
//! query is built and reused for every execution.

pub mod registry;

use crate::query::QuerySpec;
use crate::record::ResultRecord;
use harvest_core::ServerContext;
use std::fmt::Debug;
use std::sync::Arc;

/// A destination for query results.
///
/// One instance is shared by every execution of its query, so `write` takes
/// `&self`; sinks that keep state need interior mutability.
pub trait OutputSink: Send + Sync + Debug {
    /// Consumes one batch of results. Called even when `results` is empty.
    fn write(
        &self,
        server: &ServerContext,
        query: &QuerySpec,
        results: &[ResultRecord],
    ) -> anyhow::Result<()>;
}

/// Creates the sink a query will write to.
pub trait OutputSinkFactory: Send + Sync + Debug {
    /// Builds a new sink instance.
    fn create(&self) -> anyhow::Result<Arc<dyn OutputSink>>;
}

pub use registry::{SinkDescriptor, SinkFactoryRegistry, SinkSettings};

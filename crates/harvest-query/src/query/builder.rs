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

//! Fluent construction of [`QuerySpec`] values.

use super::QuerySpec;
use crate::error::{QueryError, QueryResult};
use crate::naming::NamingStrategy;
use crate::resolver;
use crate::sink::OutputSinkFactory;
use harvest_core::ResourcePattern;
use std::sync::Arc;

/// Accumulates the parts of a query, then builds it once.
///
/// Append methods keep duplicates. Every method consumes and returns the
/// builder, so one builder belongs to one construction sequence.
#[derive(Debug, Clone, Default)]
pub struct QuerySpecBuilder {
    obj: Option<String>,
    attributes: Vec<String>,
    keys: Vec<String>,
    type_names: Vec<String>,
    result_alias: Option<String>,
    use_obj_domain_as_key: bool,
    allow_dotted_keys: bool,
    use_all_type_names: bool,
    sink_factories: Vec<Arc<dyn OutputSinkFactory>>,
}

impl QuerySpecBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resource pattern text.
    pub fn obj(mut self, obj: impl Into<String>) -> Self {
        self.obj = Some(obj.into());
        self
    }

    /// Appends one attribute name.
    pub fn add_attr(mut self, attr: impl Into<String>) -> Self {
        self.attributes.push(attr.into());
        self
    }

    /// Appends several attribute names.
    pub fn add_attrs<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.extend(attrs.into_iter().map(Into::into));
        self
    }

    /// Appends one supplemental key.
    pub fn add_key(mut self, key: impl Into<String>) -> Self {
        self.keys.push(key.into());
        self
    }

    /// Appends several supplemental keys.
    pub fn add_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Appends one key property used for naming.
    pub fn add_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_names.push(type_name.into());
        self
    }

    /// Appends several key properties used for naming.
    pub fn add_type_names<I, S>(mut self, type_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_names.extend(type_names.into_iter().map(Into::into));
        self
    }

    /// Sets the result alias.
    pub fn result_alias(mut self, alias: impl Into<String>) -> Self {
        self.result_alias = Some(alias.into());
        self
    }

    /// Uses the resource domain as key prefix.
    pub fn use_obj_domain_as_key(mut self, value: bool) -> Self {
        self.use_obj_domain_as_key = value;
        self
    }

    /// Allows dots in keys and switches the separator to `.`.
    pub fn allow_dotted_keys(mut self, value: bool) -> Self {
        self.allow_dotted_keys = value;
        self
    }

    /// Names results from every key property of the resource.
    pub fn use_all_type_names(mut self, value: bool) -> Self {
        self.use_all_type_names = value;
        self
    }

    /// Appends one sink factory.
    pub fn add_output_sink(mut self, factory: Arc<dyn OutputSinkFactory>) -> Self {
        self.sink_factories.push(factory);
        self
    }

    /// Appends several sink factories.
    pub fn add_output_sinks<I>(mut self, factories: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn OutputSinkFactory>>,
    {
        self.sink_factories.extend(factories);
        self
    }

    /// Builds the query.
    ///
    /// Fails if the pattern does not parse or if any sink factory fails. Each
    /// factory is invoked exactly once, in order.
    pub fn build(self) -> QueryResult<QuerySpec> {
        let obj = self.obj.unwrap_or_default();
        let pattern = ResourcePattern::parse(&obj).map_err(|source| QueryError::InvalidPattern {
            input: obj.clone(),
            source,
        })?;

        let mut type_names: Vec<String> = Vec::with_capacity(self.type_names.len());
        for name in self.type_names {
            if !type_names.contains(&name) {
                type_names.push(name);
            }
        }
        let naming = NamingStrategy::select(
            &type_names,
            self.allow_dotted_keys,
            self.use_all_type_names,
        );

        let sinks = self
            .sink_factories
            .iter()
            .enumerate()
            .map(|(index, factory)| {
                factory
                    .create()
                    .map_err(|source| QueryError::SinkConstruction { index, source })
            })
            .collect::<QueryResult<Vec<_>>>()?;

        Ok(QuerySpec {
            pattern,
            keys: resolver::resolve_list(&self.keys),
            attributes: resolver::resolve_list(&self.attributes),
            type_names,
            result_alias: self.result_alias,
            use_obj_domain_as_key: self.use_obj_domain_as_key,
            allow_dotted_keys: self.allow_dotted_keys,
            use_all_type_names: self.use_all_type_names,
            sink_factories: self.sink_factories,
            sinks,
            naming,
        })
    }
}

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

//! The immutable description of one query.

pub mod builder;

use crate::error::QueryResult;
use crate::execution::dispatch;
use crate::naming::NamingStrategy;
use crate::record::ResultRecord;
use crate::sink::{OutputSink, OutputSinkFactory};
use harvest_core::{PropertyList, ResourcePattern, ServerContext};
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub use builder::QuerySpecBuilder;

/// What to query on a management server, how to name the results and where
/// to send them.
///
/// A `QuerySpec` never changes after construction and can be shared freely
/// between threads running executions of it.
///
/// Equality and hashing only look at the pattern, the `keys` list, the
/// attribute names, the result alias and the *number* of output sinks. Two
/// queries that differ only in `typeNames` or in a flag such as
/// `allowDottedKeys` compare equal, which is what lets duplicate entries from several
/// configuration fragments collapse into one.
#[derive(Debug)]
pub struct QuerySpec {
    pattern: ResourcePattern,
    keys: Vec<String>,
    attributes: Vec<String>,
    type_names: Vec<String>,
    result_alias: Option<String>,
    use_obj_domain_as_key: bool,
    allow_dotted_keys: bool,
    use_all_type_names: bool,
    sink_factories: Vec<Arc<dyn OutputSinkFactory>>,
    sinks: Vec<Arc<dyn OutputSink>>,
    naming: NamingStrategy,
}

impl QuerySpec {
    /// Starts a new builder.
    pub fn builder() -> QuerySpecBuilder {
        QuerySpecBuilder::new()
    }

    /// The resource pattern to resolve.
    pub fn pattern(&self) -> &ResourcePattern {
        &self.pattern
    }

    /// Supplemental key list.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Attribute names to fetch. Empty means every attribute of the resource.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Key properties used when naming results, in configured order.
    pub fn type_names(&self) -> &[String] {
        &self.type_names
    }

    /// Overrides the default key prefix when set.
    pub fn result_alias(&self) -> Option<&str> {
        self.result_alias.as_deref()
    }

    /// Use the resource domain instead of the class name as key prefix.
    pub fn use_obj_domain_as_key(&self) -> bool {
        self.use_obj_domain_as_key
    }

    /// Whether keys may contain dots.
    pub fn allow_dotted_keys(&self) -> bool {
        self.allow_dotted_keys
    }

    /// Whether every key property takes part in naming.
    pub fn use_all_type_names(&self) -> bool {
        self.use_all_type_names
    }

    /// The factories the sinks were created from.
    pub fn output_sink_factories(&self) -> &[Arc<dyn OutputSinkFactory>] {
        &self.sink_factories
    }

    /// The live sinks, one per factory, in factory order.
    pub fn output_sinks(&self) -> &[Arc<dyn OutputSink>] {
        &self.sinks
    }

    /// The naming strategy chosen at construction.
    pub fn naming(&self) -> &NamingStrategy {
        &self.naming
    }

    /// Separator between key parts.
    pub fn separator(&self) -> &'static str {
        self.naming.separator()
    }

    /// Builds the key fragment for a matched resource.
    pub fn make_type_name_value_string(
        &self,
        properties: &PropertyList,
        type_name: Option<&str>,
    ) -> String {
        self.naming.build(properties, type_name)
    }

    /// First key part for results of a resource: the alias if set, else the
    /// domain or the class name. The alias is used as written; dots in the
    /// domain or class name become underscores unless dotted keys are allowed.
    pub fn key_prefix(&self, class_name: &str, domain: &str) -> String {
        if let Some(alias) = &self.result_alias {
            return alias.clone();
        }
        let prefix = if self.use_obj_domain_as_key {
            domain
        } else {
            class_name
        };
        if self.allow_dotted_keys {
            prefix.to_string()
        } else {
            prefix.replace('.', "_")
        }
    }

    /// Hands `results` to every output sink in order. See [`dispatch::dispatch`].
    pub fn run_output_sinks(
        &self,
        server: &ServerContext,
        results: &[ResultRecord],
    ) -> QueryResult<()> {
        dispatch::dispatch(server, self, results)
    }
}

impl PartialEq for QuerySpec {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.keys == other.keys
            && self.attributes == other.attributes
            && self.result_alias == other.result_alias
            && self.sinks.len() == other.sinks.len()
    }
}

impl Eq for QuerySpec {}

impl Hash for QuerySpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
        self.keys.hash(state);
        self.attributes.hash(state);
        self.result_alias.hash(state);
        self.sinks.len().hash(state);
    }
}

impl Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Query(obj={}, attr={:?}, typeNames={:?}, resultAlias={:?}, keys={:?}, \
             allowDottedKeys={}, useAllTypeNames={}, useObjDomainAsKey={})",
            self.pattern,
            self.attributes,
            self.type_names,
            self.result_alias,
            self.keys,
            self.allow_dotted_keys,
            self.use_all_type_names,
            self.use_obj_domain_as_key,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::OutputSink;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    #[derive(Debug)]
    struct NullSink;

    impl OutputSink for NullSink {
        fn write(&self, _: &ServerContext, _: &QuerySpec, _: &[ResultRecord]) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[derive(Debug)]
    struct NullFactory;

    impl OutputSinkFactory for NullFactory {
        fn create(&self) -> anyhow::Result<Arc<dyn OutputSink>> {
            Ok(Arc::new(NullSink))
        }
    }

    fn base() -> QuerySpecBuilder {
        QuerySpec::builder()
            .obj("java.lang:type=MemoryPool,name=*")
            .add_attr("Usage")
            .add_type_name("name")
            .result_alias("pools")
    }

    fn hash_of(query: &QuerySpec) -> u64 {
        let mut hasher = DefaultHasher::new();
        query.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_equality_ignores_flags() {
        let a = base().build().unwrap();
        let b = base().allow_dotted_keys(true).use_all_type_names(true).build().unwrap();
        let c = base().use_obj_domain_as_key(true).build().unwrap();

        assert_eq!(a, a);
        assert_eq!(a, b);
        assert_eq!(b, a);
        assert_eq!(b, c);
        assert_eq!(a, c);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a.naming(), b.naming());
    }

    #[test]
    fn test_equality_tracks_identity_fields() {
        let a = base().build().unwrap();
        assert_ne!(a, base().add_attr("PeakUsage").build().unwrap());
        assert_ne!(a, base().add_key("k").build().unwrap());
        assert_ne!(a, base().result_alias("other").build().unwrap());
        assert_ne!(
            a,
            base()
                .obj("java.lang:type=MemoryPool,name=PS*")
                .build()
                .unwrap()
        );
    }

    #[test]
    fn test_equality_ignores_type_names() {
        let a = base().build().unwrap();
        let extra_name = base().add_type_name("type").build().unwrap();
        let no_names = QuerySpec::builder()
            .obj("java.lang:type=MemoryPool,name=*")
            .add_attr("Usage")
            .result_alias("pools")
            .build()
            .unwrap();

        assert_eq!(a, extra_name);
        assert_eq!(a, no_names);
        assert_eq!(hash_of(&a), hash_of(&extra_name));
        assert_ne!(a.naming(), no_names.naming());
        assert_ne!(a, base().add_key("used").build().unwrap());
    }

    #[test]
    fn test_equality_counts_sinks_not_contents() {
        let one = base()
            .add_output_sink(Arc::new(NullFactory))
            .build()
            .unwrap();
        let other_one = base()
            .add_output_sink(Arc::new(NullFactory))
            .build()
            .unwrap();
        let two = base()
            .add_output_sink(Arc::new(NullFactory))
            .add_output_sink(Arc::new(NullFactory))
            .build()
            .unwrap();

        assert_eq!(one, other_one);
        assert_ne!(one, two);
    }

    #[test]
    fn test_duplicates_collapse_in_a_set() {
        let mut set = HashSet::new();
        set.insert(base().build().unwrap());
        set.insert(base().allow_dotted_keys(true).build().unwrap());
        set.insert(base().add_attr("PeakUsage").build().unwrap());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_key_prefix_selection() {
        let aliased = base().build().unwrap();
        assert_eq!(aliased.key_prefix("sun.Impl", "java.lang"), "pools");

        let by_class = QuerySpec::builder().obj("java.lang:type=Memory").build().unwrap();
        assert_eq!(by_class.key_prefix("sun.Impl", "java.lang"), "sun_Impl");

        let by_domain = QuerySpec::builder()
            .obj("java.lang:type=Memory")
            .use_obj_domain_as_key(true)
            .allow_dotted_keys(true)
            .build()
            .unwrap();
        assert_eq!(by_domain.key_prefix("sun.Impl", "java.lang"), "java.lang");

        let domain_undotted = QuerySpec::builder()
            .obj("java.lang:type=Memory")
            .use_obj_domain_as_key(true)
            .build()
            .unwrap();
        assert_eq!(domain_undotted.key_prefix("sun.Impl", "java.lang"), "java_lang");
    }

    #[test]
    fn test_alias_prefix_is_kept_verbatim() {
        let query = QuerySpec::builder()
            .obj("java.lang:type=Memory")
            .result_alias("jvm.memory")
            .build()
            .unwrap();
        assert!(!query.allow_dotted_keys());
        assert_eq!(query.key_prefix("sun.Impl", "java.lang"), "jvm.memory");
    }

    #[test]
    fn test_display_names_the_query() {
        let text = base().build().unwrap().to_string();
        assert!(text.starts_with("Query(obj=java.lang:type=MemoryPool,name=*"));
        assert!(text.contains("attr=[\"Usage\"]"));
    }

    #[test]
    fn test_query_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QuerySpec>();
    }
}

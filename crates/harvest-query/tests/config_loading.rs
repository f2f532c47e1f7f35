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

use harvest_core::{Attribute, AttributeValue, ServerContext};
use harvest_query::sink::SinkSettings;
use harvest_query::{
    InMemoryServer, OutputSink, OutputSinkFactory, ProcessConfig, QueryExecutor, QuerySpec,
    ResultRecord, SinkFactoryRegistry,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

type Journal = Arc<Mutex<Vec<(String, usize)>>>;

#[derive(Debug)]
struct CollectSink {
    label: String,
    journal: Journal,
}

impl OutputSink for CollectSink {
    fn write(
        &self,
        _server: &ServerContext,
        _query: &QuerySpec,
        results: &[ResultRecord],
    ) -> anyhow::Result<()> {
        self.journal
            .lock()
            .unwrap()
            .push((self.label.clone(), results.len()));
        Ok(())
    }
}

#[derive(Debug)]
struct CollectFactory {
    label: String,
    journal: Journal,
}

impl OutputSinkFactory for CollectFactory {
    fn create(&self) -> anyhow::Result<Arc<dyn OutputSink>> {
        Ok(Arc::new(CollectSink {
            label: self.label.clone(),
            journal: self.journal.clone(),
        }))
    }
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn registry(journal: &Journal) -> SinkFactoryRegistry {
    let journal = journal.clone();
    let mut registry = SinkFactoryRegistry::new();
    registry.register("collect", move |settings: &SinkSettings| {
        let label = settings
            .get("label")
            .and_then(|v| v.as_str())
            .unwrap_or("unnamed")
            .to_string();
        Ok(Arc::new(CollectFactory {
            label,
            journal: journal.clone(),
        }) as Arc<dyn OutputSinkFactory>)
    });
    registry
}

#[test]
fn test_loading_from_file() {
    let process = ProcessConfig::from_path(fixture("example.json")).unwrap();
    assert_eq!(process.name.as_deref(), Some("example.json"));

    let server = &process.servers[0];
    assert_eq!(server.context().label(), "example-jvm");
    assert_eq!(server.queries.len(), 3);

    let memory = server
        .queries
        .iter()
        .find(|q| q.obj == "java.lang:type=Memory")
        .expect("memory query should be present");
    assert_eq!(
        memory.attr.as_ref().map(|attrs| attrs[0].as_str()),
        Some("HeapMemoryUsage")
    );
}

#[test]
fn test_duplicate_entries_collapse_to_first() {
    let journal = Journal::default();
    let process = ProcessConfig::from_path(fixture("example.json")).unwrap();
    let queries = process.servers[0].build_queries(&registry(&journal)).unwrap();

    assert_eq!(queries.len(), 2);
    assert!(!queries[0].use_obj_domain_as_key());
    assert_eq!(queries[1].type_names(), ["name"]);
}

#[test]
fn test_configured_queries_run_against_server() {
    let jvm = InMemoryServer::new();
    jvm.register(
        "java.lang:type=Memory",
        "sun.management.MemoryImpl",
        vec![
            Attribute::new("HeapMemoryUsage", AttributeValue::Integer(200)),
            Attribute::new("NonHeapMemoryUsage", AttributeValue::Integer(50)),
        ],
    )
    .unwrap();
    for collector in ["PS Scavenge", "PS MarkSweep"] {
        jvm.register(
            &format!("java.lang:type=GarbageCollector,name={collector}"),
            "sun.management.GarbageCollectorImpl",
            vec![
                Attribute::new("CollectionCount", 3_i64),
                Attribute::new("CollectionTime", 41_i64),
            ],
        )
        .unwrap();
    }

    let journal = Journal::default();
    let process = ProcessConfig::from_path(fixture("example.json")).unwrap();
    let server = &process.servers[0];
    let queries = server.build_queries(&registry(&journal)).unwrap();
    let executor = QueryExecutor::new(&jvm);

    let mut keys = Vec::new();
    for query in &queries {
        let execution = executor.run(&server.context(), query).unwrap();
        keys.extend(execution.results.iter().map(|r| r.key(query.separator())));
    }

    assert_eq!(
        *journal.lock().unwrap(),
        vec![("memory".to_string(), 2), ("gc".to_string(), 4)]
    );
    assert_eq!(
        keys,
        vec![
            "memory_HeapMemoryUsage",
            "memory_NonHeapMemoryUsage",
            "sun.management.GarbageCollectorImpl.PS Scavenge.CollectionCount",
            "sun.management.GarbageCollectorImpl.PS Scavenge.CollectionTime",
            "sun.management.GarbageCollectorImpl.PS MarkSweep.CollectionCount",
            "sun.management.GarbageCollectorImpl.PS MarkSweep.CollectionTime",
        ]
    );
}

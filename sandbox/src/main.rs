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

// Harvest Sandbox
// Runs every configured query once against a snapshot-backed server.
//
// Usage: sandbox [process.json] [snapshot.json]

mod log_sink;

use anyhow::{Context, Result};
use harvest_query::server::ServerSnapshot;
use harvest_query::sink::SinkSettings;
use harvest_query::{
    InMemoryServer, OutputSinkFactory, ProcessConfig, QueryExecutor, SinkFactoryRegistry,
};
use log_sink::LogSinkFactory;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

fn data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let process_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| data_file("process.json"));
    let snapshot_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| data_file("snapshot.json"));

    let process = ProcessConfig::from_path(&process_path)?;
    let snapshot_json = fs::read_to_string(&snapshot_path)
        .with_context(|| format!("reading snapshot {}", snapshot_path.display()))?;
    let snapshot: ServerSnapshot = serde_json::from_str(&snapshot_json)
        .with_context(|| format!("parsing snapshot {}", snapshot_path.display()))?;
    let jvm = InMemoryServer::from_snapshot(&snapshot)?;
    log::info!(
        "Loaded process {:?} with {} resources",
        process.name,
        jvm.resource_count()
    );

    let mut registry = SinkFactoryRegistry::new();
    registry.register("log", |settings: &SinkSettings| {
        Ok(Arc::new(LogSinkFactory::from_settings(settings)?) as Arc<dyn OutputSinkFactory>)
    });

    let executor = QueryExecutor::new(&jvm);
    for server in &process.servers {
        let context = server.context();
        for query in server.build_queries(&registry)? {
            match executor.run(&context, &query) {
                Ok(execution) => {
                    for failure in execution.failures {
                        log::warn!("{:#}", anyhow::Error::from(failure));
                    }
                }
                Err(err) => log::error!("{:#}", anyhow::Error::from(err)),
            }
        }
    }

    Ok(())
}

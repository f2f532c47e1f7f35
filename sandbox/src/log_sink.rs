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

//! An output sink that writes every record to the log.

use harvest_core::ServerContext;
use harvest_query::sink::SinkSettings;
use harvest_query::{OutputSink, OutputSinkFactory, QuerySpec, ResultRecord};
use log::Level;
use std::sync::Arc;

#[derive(Debug)]
pub struct LogSink {
    level: Level,
}

impl OutputSink for LogSink {
    fn write(
        &self,
        server: &ServerContext,
        query: &QuerySpec,
        results: &[ResultRecord],
    ) -> anyhow::Result<()> {
        for record in results {
            log::log!(
                self.level,
                "[{}] {} = {}",
                server,
                record.key(query.separator()),
                record.value
            );
        }
        Ok(())
    }
}

/// Builds [`LogSink`]s. Reads an optional `level` setting (default `info`).
#[derive(Debug)]
pub struct LogSinkFactory {
    level: Level,
}

impl LogSinkFactory {
    pub fn from_settings(settings: &SinkSettings) -> anyhow::Result<Self> {
        let level = match settings.get("level").and_then(|v| v.as_str()) {
            Some(name) => name
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown log level `{name}`"))?,
            None => Level::Info,
        };
        Ok(Self { level })
    }
}

impl OutputSinkFactory for LogSinkFactory {
    fn create(&self) -> anyhow::Result<Arc<dyn OutputSink>> {
        Ok(Arc::new(LogSink { level: self.level }))
    }
}

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

//! Hands a query's results to its output sinks.

use crate::error::{QueryError, QueryResult};
use crate::query::QuerySpec;
use crate::record::ResultRecord;
use harvest_core::ServerContext;

/// Calls every sink of `query`, in configuration order, with the full result
/// batch.
///
/// Sinks run even when `results` is empty. The first failing sink stops the
/// dispatch; later sinks are not called.
pub fn dispatch(
    server: &ServerContext,
    query: &QuerySpec,
    results: &[ResultRecord],
) -> QueryResult<()> {
    for (index, sink) in query.output_sinks().iter().enumerate() {
        sink.write(server, query, results)
            .map_err(|source| QueryError::Dispatch {
                index,
                query: query.pattern().to_string(),
                source,
            })?;
    }
    log::debug!("Finished running output sinks for query: {}", query);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{OutputSink, OutputSinkFactory};
    use std::sync::{Arc, Mutex};

    /// Appends its tag to a shared journal on every write.
    #[derive(Debug)]
    struct JournalSink {
        tag: &'static str,
        fail: bool,
        journal: Arc<Mutex<Vec<(&'static str, usize)>>>,
    }

    impl OutputSink for JournalSink {
        fn write(
            &self,
            _server: &ServerContext,
            _query: &QuerySpec,
            results: &[ResultRecord],
        ) -> anyhow::Result<()> {
            self.journal.lock().unwrap().push((self.tag, results.len()));
            if self.fail {
                anyhow::bail!("{} is down", self.tag);
            }
            Ok(())
        }
    }

    #[derive(Debug)]
    struct JournalFactory {
        tag: &'static str,
        fail: bool,
        journal: Arc<Mutex<Vec<(&'static str, usize)>>>,
    }

    impl OutputSinkFactory for JournalFactory {
        fn create(&self) -> anyhow::Result<Arc<dyn OutputSink>> {
            Ok(Arc::new(JournalSink {
                tag: self.tag,
                fail: self.fail,
                journal: self.journal.clone(),
            }))
        }
    }

    fn query_with(
        sinks: &[(&'static str, bool)],
        journal: &Arc<Mutex<Vec<(&'static str, usize)>>>,
    ) -> QuerySpec {
        let factories = sinks.iter().map(|&(tag, fail)| {
            Arc::new(JournalFactory {
                tag,
                fail,
                journal: journal.clone(),
            }) as Arc<dyn OutputSinkFactory>
        });
        QuerySpec::builder()
            .obj("java.lang:type=Memory")
            .add_output_sinks(factories)
            .build()
            .unwrap()
    }

    #[test]
    fn test_sinks_run_in_order_even_without_results() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let query = query_with(&[("first", false), ("second", false)], &journal);

        dispatch(&ServerContext::new("localhost", 9999), &query, &[]).unwrap();

        assert_eq!(*journal.lock().unwrap(), vec![("first", 0), ("second", 0)]);
    }

    #[test]
    fn test_first_failure_stops_dispatch() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let query = query_with(
            &[("first", false), ("broken", true), ("third", false)],
            &journal,
        );

        let err = query
            .run_output_sinks(&ServerContext::new("localhost", 9999), &[])
            .unwrap_err();

        assert!(matches!(err, QueryError::Dispatch { index: 1, .. }));
        assert_eq!(*journal.lock().unwrap(), vec![("first", 0), ("broken", 0)]);
    }

    #[test]
    fn test_no_sinks_is_a_no_op() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let query = query_with(&[], &journal);
        assert!(dispatch(&ServerContext::new("localhost", 9999), &query, &[]).is_ok());
        assert!(journal.lock().unwrap().is_empty());
    }
}

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

//! Registry mapping sink type names from configuration to factories.

use super::OutputSinkFactory;
use crate::error::{QueryError, QueryResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Settings attached to an `outputWriters` entry, minus its type.
pub type SinkSettings = serde_json::Map<String, serde_json::Value>;

/// Builds a factory from the settings of one `outputWriters` entry.
pub type SinkFactoryConstructor =
    Box<dyn Fn(&SinkSettings) -> anyhow::Result<Arc<dyn OutputSinkFactory>> + Send + Sync>;

/// One `outputWriters` entry: a type name plus free-form settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkDescriptor {
    /// The registered sink type.
    #[serde(rename = "@class")]
    pub class: String,
    /// Everything else in the entry.
    #[serde(flatten)]
    pub settings: SinkSettings,
}

impl SinkDescriptor {
    /// Creates a descriptor with no settings.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            settings: SinkSettings::new(),
        }
    }
}

/// Known sink types, looked up by the `@class` of each descriptor.
#[derive(Default)]
pub struct SinkFactoryRegistry {
    constructors: HashMap<String, SinkFactoryConstructor>,
}

impl SinkFactoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a sink type. A later registration under the same name
    /// replaces the earlier one.
    pub fn register<F>(&mut self, class: impl Into<String>, constructor: F)
    where
        F: Fn(&SinkSettings) -> anyhow::Result<Arc<dyn OutputSinkFactory>> + Send + Sync + 'static,
    {
        let class = class.into();
        log::info!("Registered output sink type: {}", class);
        self.constructors.insert(class, Box::new(constructor));
    }

    /// Returns `true` if `class` has been registered.
    pub fn contains(&self, class: &str) -> bool {
        self.constructors.contains_key(class)
    }

    /// Number of registered sink types.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Turns a descriptor into a factory.
    pub fn resolve(&self, descriptor: &SinkDescriptor) -> QueryResult<Arc<dyn OutputSinkFactory>> {
        let constructor = self
            .constructors
            .get(&descriptor.class)
            .ok_or_else(|| QueryError::UnknownSinkType(descriptor.class.clone()))?;
        constructor(&descriptor.settings).map_err(|source| QueryError::SinkFactory {
            class: descriptor.class.clone(),
            source,
        })
    }
}

impl fmt::Debug for SinkFactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<_> = self.constructors.keys().collect();
        classes.sort();
        f.debug_struct("SinkFactoryRegistry")
            .field("classes", &classes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::OutputSink;

    #[derive(Debug)]
    struct NamedFactory(String);

    impl OutputSinkFactory for NamedFactory {
        fn create(&self) -> anyhow::Result<Arc<dyn OutputSink>> {
            anyhow::bail!("not needed in this test")
        }
    }

    fn registry() -> SinkFactoryRegistry {
        let mut registry = SinkFactoryRegistry::new();
        registry.register("named", |settings: &SinkSettings| {
            let name = settings
                .get("name")
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow::anyhow!("`name` setting is required"))?;
            Ok(Arc::new(NamedFactory(name.to_string())) as Arc<dyn OutputSinkFactory>)
        });
        registry
    }

    #[test]
    fn test_descriptor_deserialization() {
        let descriptor: SinkDescriptor =
            serde_json::from_str(r#"{"@class": "named", "name": "stdout", "debug": true}"#).unwrap();
        assert_eq!(descriptor.class, "named");
        assert_eq!(descriptor.settings.len(), 2);
        assert_eq!(descriptor.settings["name"], "stdout");
    }

    #[test]
    fn test_resolve_registered_type() {
        let registry = registry();
        assert!(registry.contains("named"));
        assert_eq!(registry.len(), 1);

        let descriptor: SinkDescriptor =
            serde_json::from_str(r#"{"@class": "named", "name": "stdout"}"#).unwrap();
        let factory = registry.resolve(&descriptor).unwrap();
        assert!(format!("{factory:?}").contains("stdout"));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = registry()
            .resolve(&SinkDescriptor::new("graphite"))
            .unwrap_err();
        assert!(matches!(err, QueryError::UnknownSinkType(ref class) if class == "graphite"));
    }

    #[test]
    fn test_constructor_failure_propagates() {
        let err = registry().resolve(&SinkDescriptor::new("named")).unwrap_err();
        assert!(matches!(err, QueryError::SinkFactory { ref class, .. } if class == "named"));
    }
}

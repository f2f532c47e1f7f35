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

use harvest_core::{
    Attribute, ManagementServer, PatternError, ResourceId, ResourcePattern, ServerError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

/// A resource entry of a [`ServerSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSnapshot {
    /// Concrete resource name.
    pub name: String,
    /// Implementation class reported for the resource.
    pub class_name: String,
    /// Attribute values, in the order `attribute_names` reports them.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// Serializable contents of an [`InMemoryServer`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerSnapshot {
    /// Every resource on the server.
    #[serde(default)]
    pub resources: Vec<ResourceSnapshot>,
}

#[derive(Debug, Clone)]
struct RegisteredResource {
    id: ResourceId,
    class_name: String,
    attributes: Vec<Attribute>,
}

/// Management server backed by process memory.
///
/// This implementation provides:
/// - Thread-safe concurrent access through `RwLock`
/// - Discovery in registration order
/// - Injectable discovery and per-resource fetch failures
/// - A count of batched attribute fetches
#[derive(Debug, Default)]
pub struct InMemoryServer {
    resources: RwLock<Vec<RegisteredResource>>,
    fetch_failures: RwLock<HashMap<ResourceId, ServerError>>,
    discovery_failure: RwLock<Option<ServerError>>,
    fetch_calls: AtomicUsize,
}

impl InMemoryServer {
    /// Creates an empty server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a server holding every resource of `snapshot`.
    pub fn from_snapshot(snapshot: &ServerSnapshot) -> Result<Self, PatternError> {
        let server = Self::new();
        for resource in &snapshot.resources {
            server.register(
                &resource.name,
                resource.class_name.clone(),
                resource.attributes.clone(),
            )?;
        }
        Ok(server)
    }

    /// Registers a resource, replacing any previous one with the same name.
    pub fn register(
        &self,
        name: &str,
        class_name: impl Into<String>,
        attributes: Vec<Attribute>,
    ) -> Result<ResourceId, PatternError> {
        let id = ResourceId::parse(name)?;
        let entry = RegisteredResource {
            id: id.clone(),
            class_name: class_name.into(),
            attributes,
        };
        let mut resources = self.resources.write().unwrap_or_else(PoisonError::into_inner);
        match resources.iter_mut().find(|r| r.id == id) {
            Some(existing) => *existing = entry,
            None => resources.push(entry),
        }
        Ok(id)
    }

    /// Removes a resource. Returns `false` if it was not registered.
    pub fn remove(&self, id: &ResourceId) -> bool {
        let mut resources = self.resources.write().unwrap_or_else(PoisonError::into_inner);
        let before = resources.len();
        resources.retain(|r| &r.id != id);
        resources.len() != before
    }

    /// Makes every attribute fetch of `id` fail with `error`.
    pub fn fail_fetch(&self, id: &ResourceId, error: ServerError) {
        self.fetch_failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), error);
    }

    /// Makes every discovery fail with `error`.
    pub fn fail_discovery(&self, error: ServerError) {
        *self
            .discovery_failure
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Removes all injected failures.
    pub fn clear_failures(&self) {
        self.fetch_failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        *self
            .discovery_failure
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Number of `attribute_values` calls served so far.
    pub fn fetch_call_count(&self) -> usize {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    /// Number of registered resources.
    pub fn resource_count(&self) -> usize {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn with_resource<T>(
        &self,
        id: &ResourceId,
        f: impl FnOnce(&RegisteredResource) -> T,
    ) -> Result<T, ServerError> {
        let resources = self.resources.read().unwrap_or_else(PoisonError::into_inner);
        resources
            .iter()
            .find(|r| &r.id == id)
            .map(f)
            .ok_or_else(|| ServerError::InstanceNotFound(id.to_string()))
    }
}

impl ManagementServer for InMemoryServer {
    fn query_names(&self, pattern: &ResourcePattern) -> Result<Vec<ResourceId>, ServerError> {
        if let Some(error) = self
            .discovery_failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }
        let resources = self.resources.read().unwrap_or_else(PoisonError::into_inner);
        Ok(resources
            .iter()
            .filter(|r| pattern.matches(&r.id))
            .map(|r| r.id.clone())
            .collect())
    }

    fn attribute_names(&self, resource: &ResourceId) -> Result<Vec<String>, ServerError> {
        self.with_resource(resource, |r| {
            r.attributes.iter().map(|a| a.name.clone()).collect()
        })
    }

    fn class_name(&self, resource: &ResourceId) -> Result<String, ServerError> {
        self.with_resource(resource, |r| r.class_name.clone())
    }

    fn attribute_values(
        &self,
        resource: &ResourceId,
        names: &[String],
    ) -> Result<Vec<Attribute>, ServerError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(error) = self
            .fetch_failures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource)
        {
            return Err(error.clone());
        }
        self.with_resource(resource, |r| {
            names
                .iter()
                .filter_map(|name| r.attributes.iter().find(|a| &a.name == name))
                .cloned()
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_core::AttributeValue;

    fn pattern(text: &str) -> ResourcePattern {
        ResourcePattern::parse(text).unwrap()
    }

    fn memory_pools() -> InMemoryServer {
        let server = InMemoryServer::new();
        for name in ["PS Eden Space", "PS Survivor Space", "PS Old Gen"] {
            server
                .register(
                    &format!("java.lang:type=MemoryPool,name={name}"),
                    "sun.management.MemoryPoolImpl",
                    vec![Attribute::new("Valid", true)],
                )
                .unwrap();
        }
        server
    }

    #[test]
    fn test_discovery_matches_in_registration_order() {
        let server = memory_pools();
        let found = server
            .query_names(&pattern("java.lang:type=MemoryPool,name=PS*Space"))
            .unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|id| id.properties().get("name").unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["PS Eden Space", "PS Survivor Space"]);
    }

    #[test]
    fn test_register_replaces_existing() {
        let server = memory_pools();
        let id = server
            .register(
                "java.lang:name=PS Old Gen,type=MemoryPool",
                "Replaced",
                Vec::new(),
            )
            .unwrap();
        assert_eq!(server.resource_count(), 3);
        assert_eq!(server.class_name(&id).unwrap(), "Replaced");
        assert!(server.remove(&id));
        assert!(!server.remove(&id));
        assert_eq!(server.resource_count(), 2);
    }

    #[test]
    fn test_attribute_values_in_requested_order() {
        let server = InMemoryServer::new();
        let id = server
            .register(
                "java.lang:type=Runtime",
                "sun.management.RuntimeImpl",
                vec![
                    Attribute::new("Uptime", 1_000_i64),
                    Attribute::new("VmName", "HotSpot"),
                ],
            )
            .unwrap();

        let values = server
            .attribute_values(&id, &["VmName".into(), "Missing".into(), "Uptime".into()])
            .unwrap();
        assert_eq!(
            values,
            vec![
                Attribute::new("VmName", "HotSpot"),
                Attribute::new("Uptime", AttributeValue::Integer(1_000)),
            ]
        );
        assert_eq!(server.fetch_call_count(), 1);
    }

    #[test]
    fn test_injected_failures() {
        let server = memory_pools();
        let id = ResourceId::parse("java.lang:type=MemoryPool,name=PS Old Gen").unwrap();
        server.fail_fetch(&id, ServerError::Io("timeout".into()));
        server.fail_discovery(ServerError::Io("refused".into()));

        assert!(server.query_names(&pattern("java.lang:*")).is_err());
        assert_eq!(
            server.attribute_values(&id, &["Valid".into()]),
            Err(ServerError::Io("timeout".into()))
        );

        server.clear_failures();
        assert_eq!(server.query_names(&pattern("java.lang:*")).unwrap().len(), 3);
        assert!(server.attribute_values(&id, &["Valid".into()]).is_ok());
    }

    #[test]
    fn test_snapshot_loading() {
        let snapshot: ServerSnapshot = serde_json::from_str(
            r#"{"resources": [{
                "name": "java.lang:type=Memory",
                "className": "sun.management.MemoryImpl",
                "attributes": [{"name": "HeapMemoryUsage", "value": {"used": 10, "max": 100}}]
            }]}"#,
        )
        .unwrap();
        let server = InMemoryServer::from_snapshot(&snapshot).unwrap();
        let id = ResourceId::parse("java.lang:type=Memory").unwrap();
        assert_eq!(server.attribute_names(&id).unwrap(), vec!["HeapMemoryUsage"]);
        assert_eq!(server.domain(&id).unwrap(), "java.lang");
    }

    #[test]
    fn test_snapshot_with_wildcard_name_is_rejected() {
        let snapshot = ServerSnapshot {
            resources: vec![ResourceSnapshot {
                name: "java.lang:type=*".into(),
                class_name: "X".into(),
                attributes: Vec::new(),
            }],
        };
        assert!(InMemoryServer::from_snapshot(&snapshot).is_err());
    }
}

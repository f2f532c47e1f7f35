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

//! The result-flattening contract and the pass-through processor.

use crate::query::QuerySpec;
use crate::record::ResultRecord;
use harvest_core::{Attribute, ResourceId};

/// Everything a processor gets for one fetched resource.
#[derive(Debug)]
pub struct ProcessorInput<'a> {
    /// The query being executed.
    pub query: &'a QuerySpec,
    /// The concrete resource the attributes came from.
    pub resource: &'a ResourceId,
    /// Implementation class of the resource.
    pub class_name: String,
    /// Domain of the resource.
    pub domain: String,
    /// Fetched attributes, raw.
    pub attributes: Vec<Attribute>,
    /// Fetch time in milliseconds since the Unix epoch.
    pub epoch_millis: u64,
}

/// Turns raw attribute values into flat records.
///
/// Implementations name their records through
/// [`QuerySpec::make_type_name_value_string`] and [`QuerySpec::key_prefix`].
pub trait ResultProcessor: Send + Sync {
    /// Produces the records for one resource.
    fn process(&self, input: ProcessorInput<'_>) -> Vec<ResultRecord>;
}

/// Emits one record per attribute with the value left as fetched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughProcessor;

impl ResultProcessor for PassThroughProcessor {
    fn process(&self, input: ProcessorInput<'_>) -> Vec<ResultRecord> {
        let query = input.query;
        let type_name = input.resource.key_property_list_string();
        let key_prefix = query.key_prefix(&input.class_name, &input.domain);
        let key_fragment = query.make_type_name_value_string(input.resource.properties(), None);

        input
            .attributes
            .into_iter()
            .map(|attribute| ResultRecord {
                attribute_name: attribute.name,
                class_name: input.class_name.clone(),
                domain: input.domain.clone(),
                type_name: type_name.clone(),
                key_prefix: key_prefix.clone(),
                key_fragment: key_fragment.clone(),
                value_path: Vec::new(),
                value: attribute.value,
                epoch_millis: input.epoch_millis,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_core::AttributeValue;

    #[test]
    fn test_pass_through_names_each_attribute() {
        let query = QuerySpec::builder()
            .obj("java.lang:type=MemoryPool,name=*")
            .add_type_name("name")
            .build()
            .unwrap();
        let resource = ResourceId::parse("java.lang:type=MemoryPool,name=PS Eden Space").unwrap();

        let records = PassThroughProcessor.process(ProcessorInput {
            query: &query,
            resource: &resource,
            class_name: "sun.management.MemoryPoolImpl".into(),
            domain: "java.lang".into(),
            attributes: vec![
                Attribute::new("CollectionUsageThreshold", 0_i64),
                Attribute::new("Valid", true),
            ],
            epoch_millis: 1_000,
        });

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].key("_"),
            "sun_management_MemoryPoolImpl_PS Eden Space_CollectionUsageThreshold"
        );
        assert_eq!(records[1].value, AttributeValue::Bool(true));
        assert_eq!(records[1].type_name, "type=MemoryPool,name=PS Eden Space");
        assert_eq!(records[1].epoch_millis, 1_000);
    }
}

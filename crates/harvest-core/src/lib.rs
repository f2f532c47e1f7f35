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

//! # Harvest Core
//!
//! Resource names, attribute values and the management-server contract that
//! the query layer is written against.

#![warn(missing_docs)]

pub mod pattern;
pub mod server;
pub mod value;

pub use pattern::{PatternError, PropertyList, ResourceId, ResourcePattern};
pub use server::{ManagementServer, ServerContext, ServerError, UnmarshalCause};
pub use value::{Attribute, AttributeValue};

// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! # Blobgraph Core
//!
//! The engine behind `blobgraph`: it turns a typed object graph, shared and cyclic
//! references included, into a set of named blobs addressed by path, and back.
//!
//! ## Architecture
//!
//! - **`graph`**: the [`GraphSerializer`] entry points
//! - **`serializer`**: the [`Formattable`] trait and the per-category algorithms
//!   (primitives, collections, dictionaries, arrays, records, shared handles)
//! - **`types`**: structural categories and the class-identifier classifier
//! - **`meta`**: record descriptors, the metadata record and its XML codec, and the
//!   line escaping used by bulk primitive blobs
//! - **`resolver`**: write/read contexts, identity tables and the type registry
//! - **`archive`**: the blob container codecs (pack and, with the `zip` feature, zip)
//! - **`path`**: node paths and blob names
//! - **`buffer`**: little-endian reader and writer used by the pack container
//! - **`error`** and **`config`**
//!
//! ## Layout of a graph
//!
//! Every node has a metadata blob `<path>Info`. The root path is empty, so the root
//! metadata is the blob `Info`; a record member `Items` of the root lives at `Items/`,
//! its third element at `Items/2/`. Primitive elements of a collection are not nodes:
//! they are stored together, one escaped line each, in `<path>Data`. A value reached a
//! second time through the same `Rc` or `Arc` is written as a pointer record naming the
//! path where it was first written.
//!
//! ```rust
//! use blobgraph_core::archive::MemoryArchive;
//! use blobgraph_core::GraphSerializer;
//!
//! let graph = GraphSerializer::default();
//! let mut archive = MemoryArchive::new();
//! graph.serialize_into(&vec![1i32, 2, 3], &mut archive).unwrap();
//! assert!(archive.contains("Info"));
//! assert_eq!(archive.get("Data"), Some(&b"1\n2\n3"[..]));
//!
//! let back: Vec<i32> = graph.deserialize_from(&archive).unwrap();
//! assert_eq!(back, vec![1, 2, 3]);
//! ```

pub mod archive;
pub mod buffer;
pub mod config;
pub mod error;
pub mod graph;
pub mod meta;
pub mod path;
pub mod resolver;
pub mod serializer;
pub mod types;

pub use archive::{ArchiveFormat, BlobSink, BlobSource, MemoryArchive};
pub use config::{Config, DEFAULT_MAX_DEPTH};
pub use error::Error;
pub use graph::GraphSerializer;
pub use meta::{FormattableValue, InfoCodec, MemberDescriptor, MetaRecord, XmlInfoCodec};
pub use path::NodePath;
pub use resolver::type_resolver::{TypeLoader, TypeRegistry};
pub use serializer::any::{AnyMap, AnySequence, AnySet};
pub use serializer::multi_array::MultiArray;
pub use serializer::trait_object::AnyRecord;
pub use serializer::{Formattable, Record, RecordHooks};
pub use types::{
    Category, CollectionKind, DictionaryKind, InterfaceKind, PrimitiveKind, TypeDescriptor,
};

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

//! # Blobgraph
//!
//! Blobgraph serializes typed object graphs, shared and cyclic references included,
//! into a set of named blobs addressed by path, packed in a single container.
//!
//! ## Key Features
//!
//! - **Identity preservation**: a value reached twice through the same `Rc` or `Arc` is
//!   written once; later occurrences become pointer records, so cycles round-trip
//! - **Structural categories**: primitives, arrays, collections, dictionaries,
//!   multi-dimensional arrays and user records, each with a fixed blob layout
//! - **Interface slots**: fields typed [`AnySequence`], [`AnySet`], [`AnyMap`] or
//!   `Box<dyn AnyRecord>` come back as whatever concrete kind was recorded
//! - **Optional members**: failures on members marked `#[graph(optional)]` are dropped
//!   and the member keeps its default
//! - **Pluggable containers**: a compact pack format by default, ZIP with the `zip`
//!   feature, or any [`BlobSink`] / [`BlobSource`]
//!
//! ## Quick Start
//!
//! ```rust, ignore
//! use blobgraph::{Error, Formattable, GraphSerializer};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! #[derive(Formattable, Default)]
//! struct Employee {
//!     name: String,
//!     manager: Option<Rc<RefCell<Employee>>>,
//! }
//!
//! fn main() -> Result<(), Error> {
//!     let graph = GraphSerializer::default();
//!     graph.register::<Employee>()?;
//!
//!     let boss = Rc::new(RefCell::new(Employee { name: "Ada".into(), manager: None }));
//!     // a self-managed employee closes a cycle
//!     boss.borrow_mut().manager = Some(boss.clone());
//!
//!     let bytes = graph.serialize(&boss)?;
//!     let back: Rc<RefCell<Employee>> = graph.deserialize(&bytes)?;
//!     let manager = back.borrow().manager.clone().unwrap();
//!     assert!(Rc::ptr_eq(&back, &manager));
//!     Ok(())
//! }
//! ```
//!
//! ## Blob layout
//!
//! | blob             | content                                                     |
//! |------------------|-------------------------------------------------------------|
//! | `<path>Info`     | metadata record: class name and attributes of the node      |
//! | `<path>Data`     | primitive elements of a collection or array, one per line    |
//! | `<path>Keys`     | primitive keys of a dictionary, one per line                 |
//! | `<path>Values`   | primitive values of a dictionary, one per line               |
//!
//! The root path is empty. Members of a record live at `<path><key>/`, elements at
//! `<path><index>/`, dictionary entries at `<path><index>/Key/` and `<path><index>/Value/`.
//!
//! ## Without derive
//!
//! Containers of primitives need no registration:
//!
//! ```rust
//! use blobgraph::GraphSerializer;
//! use std::collections::HashMap;
//!
//! let graph = GraphSerializer::default();
//! let mut map = HashMap::new();
//! map.insert(1u32, vec!["a\tb".to_string(), "c\rd".to_string()]);
//! let bytes = graph.serialize(&map).unwrap();
//! let back: HashMap<u32, Vec<String>> = graph.deserialize(&bytes).unwrap();
//! assert_eq!(back, map);
//! ```

pub use blobgraph_core::{
    archive::{ArchiveFormat, BlobSink, BlobSource, MemoryArchive},
    config::{Config, DEFAULT_MAX_DEPTH},
    error::Error,
    graph::GraphSerializer,
    meta::MemberDescriptor,
    path::NodePath,
    resolver::type_resolver::{TypeLoader, TypeRegistry},
    serializer::any::{AnyMap, AnySequence, AnySet},
    serializer::multi_array::MultiArray,
    serializer::trait_object::AnyRecord,
    serializer::{Formattable, Record, RecordHooks},
    types::{
        Category, CollectionKind, DictionaryKind, InterfaceKind, PrimitiveKind, TypeDescriptor,
    },
};
pub use blobgraph_derive::Formattable;

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

#![allow(dead_code)]

use blobgraph::{GraphSerializer, MemoryArchive};
use blobgraph_core::Formattable;

/// Serializes `value`, reads it back and checks that nothing changed.
pub fn test_roundtrip<T>(graph: &GraphSerializer, value: T)
where
    T: Formattable + PartialEq + std::fmt::Debug,
{
    let bytes = graph.serialize(&value).unwrap();
    let result: T = graph.deserialize(&bytes).unwrap();
    assert_eq!(value, result);
}

/// Writes `value` into an in-memory archive so individual blobs can be inspected.
pub fn write_blobs<T: Formattable>(graph: &GraphSerializer, value: &T) -> MemoryArchive {
    let mut archive = MemoryArchive::new();
    graph.serialize_into(value, &mut archive).unwrap();
    archive
}

/// Content of the blob `name` as text.
pub fn blob_text(archive: &MemoryArchive, name: &str) -> String {
    let bytes = archive
        .get(name)
        .unwrap_or_else(|| panic!("no blob named `{name}`"));
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Routes engine logs to the test harness output; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

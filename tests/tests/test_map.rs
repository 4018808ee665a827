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

use blobgraph::{AnyMap, AnySequence, DictionaryKind, Error, GraphSerializer};
use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap};

mod test_helpers;
use test_helpers::{blob_text, test_roundtrip, write_blobs};

#[test]
fn test_hash_map() {
    let graph = GraphSerializer::default();
    let mut map = HashMap::new();
    map.insert("one".to_string(), 1i32);
    map.insert("two".to_string(), 2);
    map.insert("three".to_string(), 3);
    test_roundtrip(&graph, map);
    test_roundtrip(&graph, HashMap::<u8, bool>::new());
}

#[test]
fn test_sorted_map_layout() {
    let graph = GraphSerializer::default();
    let map = BTreeMap::from([(2u32, "b".to_string()), (1, "a\tb".to_string())]);
    let archive = write_blobs(&graph, &map);
    assert_eq!(
        blob_text(&archive, "Info"),
        concat!(
            r#"<Info class="SortedMap">"#,
            r#"<V k="IsPrimitiveKey">True</V>"#,
            r#"<V k="IsPrimitiveValue">True</V>"#,
            r#"<V k="Count">2</V>"#,
            "</Info>"
        )
    );
    assert_eq!(blob_text(&archive, "Keys"), "1\n2");
    assert_eq!(blob_text(&archive, "Values"), "a\\tb\nb");
    test_roundtrip(&graph, map);
}

#[test]
fn test_empty_map_has_no_bulk_blobs() {
    let graph = GraphSerializer::default();
    let archive = write_blobs(&graph, &BTreeMap::<String, String>::new());
    assert!(!archive.contains("Keys"));
    assert!(!archive.contains("Values"));
    assert_eq!(archive.len(), 1);
}

#[test]
fn test_map_with_node_values() {
    let graph = GraphSerializer::default();
    let map = BTreeMap::from([
        ("evens".to_string(), vec![2i32, 4]),
        ("odds".to_string(), vec![1, 3, 5]),
    ]);
    let archive = write_blobs(&graph, &map);
    assert_eq!(blob_text(&archive, "Keys"), "evens\nodds");
    assert!(!archive.contains("Values"));
    assert_eq!(blob_text(&archive, "0/Value/Data"), "2\n4");
    assert_eq!(blob_text(&archive, "1/Value/Data"), "1\n3\n5");
    test_roundtrip(&graph, map);
}

#[test]
fn test_map_with_node_keys() {
    let graph = GraphSerializer::default();
    let map = BTreeMap::from([(vec![1u8, 2], 'x'), (vec![], 'y')]);
    let archive = write_blobs(&graph, &map);
    assert!(archive.contains("0/Key/Info"));
    assert!(archive.contains("1/Key/Info"));
    assert_eq!(blob_text(&archive, "Values"), "y\nx");
    test_roundtrip(&graph, map);
}

#[test]
fn test_nested_maps() {
    let graph = GraphSerializer::default();
    let mut inner = HashMap::new();
    inner.insert(1i64, Some("one".to_string()));
    inner.insert(2, None);
    let outer = BTreeMap::from([("numbers".to_string(), inner)]);
    test_roundtrip(&graph, outer);
}

#[test]
fn test_concurrent_map() {
    let graph = GraphSerializer::default();
    let map: DashMap<String, u64> = DashMap::new();
    map.insert("a".to_string(), 1);
    map.insert("b".to_string(), 2);
    let bytes = graph.serialize(&map).unwrap();
    let restored: DashMap<String, u64> = graph.deserialize(&bytes).unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(*restored.get("a").unwrap(), 1);
    assert_eq!(*restored.get("b").unwrap(), 2);
}

#[test]
fn test_dictionary_is_not_a_sequence() {
    let graph = GraphSerializer::default();
    let bytes = graph
        .serialize(&BTreeMap::from([(1i32, 2i32)]))
        .unwrap();
    let err = graph.deserialize::<Vec<i32>>(&bytes).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_, _)), "{err}");
    let err = graph.deserialize::<AnySequence<i32>>(&bytes).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_, _)), "{err}");

    let bytes = graph.serialize(&vec![1i32, 2]).unwrap();
    let err = graph.deserialize::<AnyMap<i32, i32>>(&bytes).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_, _)), "{err}");
}

#[test]
fn test_map_kinds_are_kept_by_interface_slot() {
    let graph = GraphSerializer::default();
    let bytes = graph
        .serialize(&BTreeMap::from([(3i32, 'c'), (1, 'a')]))
        .unwrap();
    let restored: AnyMap<i32, char> = graph.deserialize(&bytes).unwrap();
    assert_eq!(restored.kind(), DictionaryKind::SortedMap);
    match restored {
        AnyMap::Sorted(map) => assert_eq!(map, BTreeMap::from([(1, 'a'), (3, 'c')])),
        other => panic!("unexpected {other:?}"),
    }
}

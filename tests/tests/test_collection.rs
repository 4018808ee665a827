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

use blobgraph::{Error, GraphSerializer};
use dashmap::DashSet;
use std::collections::{BTreeSet, HashSet, LinkedList, VecDeque};

mod test_helpers;
use test_helpers::{blob_text, test_roundtrip, write_blobs};

#[test]
fn test_vec() {
    let graph = GraphSerializer::default();
    test_roundtrip(&graph, vec![1i32, 2, 3]);
    test_roundtrip(&graph, vec!["hello".to_string(), "world".to_string()]);
    test_roundtrip(&graph, Vec::<u64>::new());
}

#[test]
fn test_inline_vec_layout() {
    let graph = GraphSerializer::default();
    let archive = write_blobs(&graph, &vec![7u16, 8, 9]);
    let paths: Vec<&str> = archive.paths().collect();
    assert_eq!(paths, vec!["Info", "Data"]);
    assert_eq!(
        blob_text(&archive, "Info"),
        r#"<Info class="List"><V k="IsPrimitive">True</V><V k="Count">3</V></Info>"#
    );
    assert_eq!(blob_text(&archive, "Data"), "7\n8\n9");
}

#[test]
fn test_empty_collection_has_no_data_blob() {
    let graph = GraphSerializer::default();
    let archive = write_blobs(&graph, &Vec::<i32>::new());
    assert!(archive.contains("Info"));
    assert!(!archive.contains("Data"));
    assert_eq!(archive.len(), 1);

    let archive = write_blobs(&graph, &BTreeSet::<String>::new());
    assert!(!archive.contains("Data"));
}

#[test]
fn test_nested_vec() {
    let graph = GraphSerializer::default();
    let value = vec![vec![1i32, 2], vec![], vec![3]];
    let archive = write_blobs(&graph, &value);
    assert!(blob_text(&archive, "Info").contains(r#"<V k="IsPrimitive">False</V>"#));
    assert_eq!(blob_text(&archive, "0/Data"), "1\n2");
    assert!(archive.contains("1/Info"));
    assert!(!archive.contains("1/Data"));
    assert_eq!(blob_text(&archive, "2/Data"), "3");
    test_roundtrip(&graph, value);
}

#[test]
fn test_vec_of_options() {
    let graph = GraphSerializer::default();
    test_roundtrip(&graph, vec![Some(1i64), None, Some(-3)]);
    test_roundtrip(&graph, vec![Some(vec![1u8]), None, Some(vec![])]);
}

#[test]
fn test_deque_and_linked_list() {
    let graph = GraphSerializer::default();
    let mut deque = VecDeque::new();
    deque.push_back(2);
    deque.push_front(1);
    deque.push_back(3);
    test_roundtrip(&graph, deque);

    let list: LinkedList<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
    test_roundtrip(&graph, list);

    let archive = write_blobs(&graph, &VecDeque::from(vec![1i8]));
    assert!(blob_text(&archive, "Info").starts_with(r#"<Info class="Queue">"#));
}

#[test]
fn test_sets() {
    let graph = GraphSerializer::default();
    let hash: HashSet<i32> = [5, 1, 9, 3].into_iter().collect();
    test_roundtrip(&graph, hash);

    let sorted: BTreeSet<String> = ["pear", "apple", "fig"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let archive = write_blobs(&graph, &sorted);
    assert_eq!(blob_text(&archive, "Data"), "apple\nfig\npear");
    test_roundtrip(&graph, sorted);

    let concurrent: DashSet<u32> = DashSet::new();
    concurrent.insert(10);
    concurrent.insert(20);
    let bytes = graph.serialize(&concurrent).unwrap();
    let restored: DashSet<u32> = graph.deserialize(&bytes).unwrap();
    let mut items: Vec<u32> = restored.iter().map(|v| *v).collect();
    items.sort();
    assert_eq!(items, vec![10, 20]);
}

#[test]
fn test_set_kinds_are_not_interchangeable() {
    let graph = GraphSerializer::default();
    let bytes = graph.serialize(&vec![1, 2, 3]).unwrap();
    let err = graph.deserialize::<HashSet<i32>>(&bytes).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_, _)), "{err}");

    let bytes = graph.serialize(&BTreeSet::from([1, 2])).unwrap();
    let err = graph.deserialize::<Vec<i32>>(&bytes).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_, _)), "{err}");
}

#[test]
fn test_primitive_flag_mismatch() {
    let graph = GraphSerializer::default();
    let bytes = graph.serialize(&vec![vec![1i32]]).unwrap();
    let err = graph.deserialize::<Vec<i32>>(&bytes).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_, _)), "{err}");
}

#[test]
fn test_missing_data_blob() {
    let graph = GraphSerializer::default();
    let mut archive = write_blobs(&graph, &vec![1i32, 2]);
    archive.remove("Data");
    let err = graph.deserialize_from::<Vec<i32>>(&archive).unwrap_err();
    assert!(matches!(err, Error::MissingEntry(_)), "{err}");
}

#[test]
fn test_line_count_mismatch() {
    let graph = GraphSerializer::default();
    let mut archive = write_blobs(&graph, &vec![1i32, 2, 3]);
    archive.insert("Data", b"1\n2".to_vec());
    let err = graph.deserialize_from::<Vec<i32>>(&archive).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{err}");
}

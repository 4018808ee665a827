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

use blobgraph::{Error, GraphSerializer, MultiArray};

mod test_helpers;
use test_helpers::{blob_text, test_roundtrip, write_blobs};

#[test]
fn test_fixed_arrays() {
    let graph = GraphSerializer::default();
    test_roundtrip(&graph, [1i32, 2, 3]);
    test_roundtrip(&graph, ["a".to_string(), "b\nc".to_string()]);
    test_roundtrip(&graph, [[1u8, 2], [3, 4]]);
    test_roundtrip(&graph, [0f64; 0]);

    let archive = write_blobs(&graph, &[true, false]);
    assert!(blob_text(&archive, "Info").starts_with(r#"<Info class="Array">"#));
    assert_eq!(blob_text(&archive, "Data"), "True\nFalse");
}

#[test]
fn test_boxed_slice() {
    let graph = GraphSerializer::default();
    let values: Box<[i16]> = vec![-1, 0, 1].into_boxed_slice();
    test_roundtrip(&graph, values);

    // fixed arrays and boxed slices share the array class
    let bytes = graph.serialize(&[7u32, 8]).unwrap();
    let restored: Box<[u32]> = graph.deserialize(&bytes).unwrap();
    assert_eq!(&*restored, &[7, 8]);
}

#[test]
fn test_array_length_mismatch() {
    let graph = GraphSerializer::default();
    let bytes = graph.serialize(&[1i32, 2]).unwrap();
    let err = graph.deserialize::<[i32; 3]>(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{err}");
}

#[test]
fn test_array_is_not_a_list() {
    let graph = GraphSerializer::default();
    let bytes = graph.serialize(&[1i32, 2]).unwrap();
    let err = graph.deserialize::<Vec<i32>>(&bytes).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_, _)), "{err}");
}

#[test]
fn test_multi_array_layout() {
    let graph = GraphSerializer::default();
    let grid = MultiArray::from_vec(&[2, 3], vec![1i32, 2, 3, 4, 5, 6]).unwrap();
    assert_eq!(grid.get(&[1, 0]), Some(&4));

    let archive = write_blobs(&graph, &grid);
    assert_eq!(
        blob_text(&archive, "Info"),
        concat!(
            r#"<Info class="MultiArray">"#,
            r#"<V k="Rank">2</V>"#,
            r#"<V k="Lengths">2,3</V>"#,
            r#"<V k="Count">6</V>"#,
            r#"<V k="IsPrimitive">True</V>"#,
            "</Info>"
        )
    );
    assert_eq!(
        blob_text(&archive, "Data"),
        "0\t0\t1\n0\t1\t2\n0\t2\t3\n1\t0\t4\n1\t1\t5\n1\t2\t6"
    );
    test_roundtrip(&graph, grid);
}

#[test]
fn test_multi_array_text_cells() {
    let graph = GraphSerializer::default();
    let mut cube = MultiArray::filled(&[2, 2, 2], String::new()).unwrap();
    cube.set(&[1, 1, 1], "tab\there".to_string()).unwrap();
    cube.set(&[0, 1, 0], "line\nbreak".to_string()).unwrap();
    test_roundtrip(&graph, cube);
}

#[test]
fn test_multi_array_node_cells() {
    let graph = GraphSerializer::default();
    let grid = MultiArray::from_vec(
        &[2, 2],
        vec![vec![1u8], vec![], vec![2, 3], vec![4]],
    )
    .unwrap();
    let archive = write_blobs(&graph, &grid);
    assert!(!archive.contains("Data"));
    assert_eq!(blob_text(&archive, "2/Indices/Data"), "1\n0");
    assert_eq!(blob_text(&archive, "2/Value/Data"), "2\n3");
    test_roundtrip(&graph, grid);
}

#[test]
fn test_empty_multi_array() {
    let graph = GraphSerializer::default();
    let empty = MultiArray::from_vec(&[0, 4], Vec::<i32>::new()).unwrap();
    let archive = write_blobs(&graph, &empty);
    assert_eq!(archive.len(), 1);
    test_roundtrip(&graph, empty);
}

#[test]
fn test_multi_array_rejects_rank_one() {
    assert!(MultiArray::from_vec(&[3], vec![1, 2, 3]).is_err());
    assert!(MultiArray::from_vec(&[2, 2], vec![1, 2, 3]).is_err());
}

#[test]
fn test_incomplete_multi_array() {
    let graph = GraphSerializer::default();
    let grid = MultiArray::from_vec(&[2, 2], vec![1i32, 2, 3, 4]).unwrap();
    let mut archive = write_blobs(&graph, &grid);
    archive.insert("Data", b"0\t0\t1\n0\t1\t2\n1\t0\t3\n1\t0\t4".to_vec());
    let err = graph.deserialize_from::<MultiArray<i32>>(&archive).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{err}");
}

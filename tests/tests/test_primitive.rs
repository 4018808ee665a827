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

use blobgraph::{Error, Formattable, GraphSerializer};
use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use num_complex::Complex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration as StdDuration;

mod test_helpers;
use test_helpers::{blob_text, test_roundtrip, write_blobs};

#[derive(Formattable, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Color {
    Red,
    Green,
    #[graph(rename = "Azure")]
    Blue,
}

#[test]
fn test_integers() {
    let graph = GraphSerializer::default();
    test_roundtrip(&graph, 0i32);
    test_roundtrip(&graph, i8::MIN);
    test_roundtrip(&graph, i16::MAX);
    test_roundtrip(&graph, i64::MIN);
    test_roundtrip(&graph, i128::MAX);
    test_roundtrip(&graph, u8::MAX);
    test_roundtrip(&graph, u64::MAX);
    test_roundtrip(&graph, u128::MAX);
    test_roundtrip(&graph, usize::MAX);
    test_roundtrip(&graph, vec![-1isize, 0, 1]);
}

#[test]
fn test_root_primitive_is_one_node() {
    let graph = GraphSerializer::default();
    let archive = write_blobs(&graph, &42i32);
    assert_eq!(archive.len(), 1);
    assert_eq!(
        blob_text(&archive, "Info"),
        r#"<Info class="Integer"><V k="Value">42</V></Info>"#
    );
}

#[test]
fn test_float_sentinels() {
    let graph = GraphSerializer::default();
    let values = vec![f64::MIN, f64::MAX, 0.1, f64::INFINITY, f64::NEG_INFINITY, -0.5];
    let archive = write_blobs(&graph, &values);
    assert_eq!(
        blob_text(&archive, "Data"),
        "MinValue\nMaxValue\n0.1\nInfinity\n-Infinity\n-0.5"
    );
    test_roundtrip(&graph, values);
    test_roundtrip(&graph, vec![f32::MIN, f32::MAX, 1.0f32 / 3.0]);
    test_roundtrip(&graph, 1.0f64 / 3.0);

    let bytes = graph.serialize(&f64::NAN).unwrap();
    assert!(graph.deserialize::<f64>(&bytes).unwrap().is_nan());
}

#[test]
fn test_bool() {
    let graph = GraphSerializer::default();
    let archive = write_blobs(&graph, &vec![true, false, true]);
    assert_eq!(blob_text(&archive, "Data"), "True\nFalse\nTrue");
    test_roundtrip(&graph, true);
    test_roundtrip(&graph, vec![false, true]);
}

#[test]
fn test_control_characters_in_bulk_text() {
    let graph = GraphSerializer::default();
    let values = vec!["a\tb".to_string(), "c\rd".to_string()];
    let archive = write_blobs(&graph, &values);
    assert_eq!(archive.get("Data").unwrap(), b"a\\tb\nc\\rd");
    test_roundtrip(&graph, values);

    test_roundtrip(
        &graph,
        vec![
            "line\nbreak".to_string(),
            "back\\slash".to_string(),
            "\r\n\t".to_string(),
            String::new(),
        ],
    );
}

#[test]
fn test_null_strings() {
    let graph = GraphSerializer::default();
    let values = vec![
        Some("x".to_string()),
        None,
        Some("\\N".to_string()),
        Some(String::new()),
    ];
    let archive = write_blobs(&graph, &values);
    assert_eq!(blob_text(&archive, "Data"), "x\n\\N\n\\\\N\n");
    test_roundtrip(&graph, values);
}

#[test]
fn test_null_in_non_nullable_slot() {
    let graph = GraphSerializer::default();
    let bytes = graph.serialize(&vec![Some("x".to_string()), None]).unwrap();
    let err = graph.deserialize::<Vec<String>>(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{err}");
}

#[test]
fn test_char() {
    let graph = GraphSerializer::default();
    test_roundtrip(&graph, 'z');
    test_roundtrip(&graph, vec!['a', '\t', '\n', '\\', 'é', '中']);
}

#[test]
fn test_date_times() {
    let graph = GraphSerializer::default();
    let naive = NaiveDate::from_ymd_opt(2024, 2, 29)
        .unwrap()
        .and_hms_nano_opt(23, 59, 58, 123_456_789)
        .unwrap();
    test_roundtrip(&graph, naive);
    test_roundtrip(&graph, Utc.timestamp_opt(1_700_000_000, 987_654_321).unwrap());
    test_roundtrip(&graph, Local.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    test_roundtrip(&graph, NaiveDate::from_ymd_opt(1999, 12, 31).unwrap());
    test_roundtrip(&graph, vec![NaiveDateTime::default(), naive]);
}

#[test]
fn test_date_time_kind_is_recorded() {
    let graph = GraphSerializer::default();
    let utc = Utc.with_ymd_and_hms(2020, 5, 17, 8, 0, 0).unwrap();
    let archive = write_blobs(&graph, &vec![utc]);
    assert_eq!(
        blob_text(&archive, "Data"),
        "2020-05-17T08:00:00.000000000|Utc"
    );

    // an unspecified stamp may be read into a UTC slot
    let naive = utc.naive_utc();
    let bytes = graph.serialize(&naive).unwrap();
    let restored: chrono::DateTime<Utc> = graph.deserialize(&bytes).unwrap();
    assert_eq!(restored, utc);
}

#[test]
fn test_spans() {
    let graph = GraphSerializer::default();
    test_roundtrip(&graph, chrono::Duration::milliseconds(-1500));
    test_roundtrip(&graph, chrono::Duration::seconds(86_400 * 400));
    test_roundtrip(&graph, chrono::Duration::zero());
    test_roundtrip(&graph, StdDuration::new(12, 5));
    test_roundtrip(&graph, vec![StdDuration::from_millis(250), StdDuration::ZERO]);
}

#[test]
fn test_decimal_and_complex() {
    let graph = GraphSerializer::default();
    test_roundtrip(&graph, Decimal::from_str("-1234.5678").unwrap());
    test_roundtrip(&graph, vec![Decimal::MAX, Decimal::MIN, Decimal::ZERO]);
    test_roundtrip(&graph, Complex::new(1.5f64, -2.25));
    test_roundtrip(&graph, vec![Complex::new(0.0f32, 1.0), Complex::new(-3.0, 0.5)]);
}

#[test]
fn test_enum() {
    let graph = GraphSerializer::default();
    test_roundtrip(&graph, Color::Green);
    let colors = vec![Color::Red, Color::Blue, Color::Green];
    let archive = write_blobs(&graph, &colors);
    assert_eq!(blob_text(&archive, "Data"), "Red\nAzure\nGreen");
    test_roundtrip(&graph, colors);
    assert_eq!(Color::graph_default(), Color::Red);
}

#[test]
fn test_unknown_enum_variant() {
    let graph = GraphSerializer::default();
    let bytes = graph
        .serialize(&vec!["Red".to_string(), "Blue".to_string()])
        .unwrap();
    let err = graph.deserialize::<Vec<Color>>(&bytes).unwrap_err();
    assert!(matches!(err, Error::ParseError(_)), "{err}");
}

#[test]
fn test_null_root() {
    let graph = GraphSerializer::default();
    let bytes = graph.serialize(&Option::<String>::None).unwrap();
    assert_eq!(graph.deserialize::<Option<String>>(&bytes).unwrap(), None);
    assert_eq!(graph.deserialize::<String>(&bytes).unwrap(), "");
    assert_eq!(graph.deserialize::<i32>(&bytes).unwrap(), 0);
    assert_eq!(graph.deserialize::<Vec<u8>>(&bytes).unwrap(), Vec::<u8>::new());
}

#[test]
fn test_mismatched_primitive() {
    let graph = GraphSerializer::default();
    let bytes = graph.serialize(&5i32).unwrap();
    let err = graph.deserialize::<String>(&bytes).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_, _)), "{err}");

    let bytes = graph
        .serialize(&vec!["12".to_string(), "x".to_string()])
        .unwrap();
    let err = graph.deserialize::<Vec<i32>>(&bytes).unwrap_err();
    assert!(matches!(err, Error::ParseError(_)), "{err}");
}

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

use crate::error::Error;
use crate::serializer::parse_failure;
use crate::types::PrimitiveKind;

fn string_to_text(v: &String) -> Result<String, Error> {
    Ok(v.clone())
}

fn string_from_text(text: &str) -> Result<String, Error> {
    Ok(text.to_string())
}

impl_primitive!(
    String,
    PrimitiveKind::String,
    String::new(),
    string_to_text,
    string_from_text
);

fn char_to_text(v: &char) -> Result<String, Error> {
    Ok(v.to_string())
}

fn char_from_text(text: &str) -> Result<char, Error> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(parse_failure::<char>(text, "expected exactly one character")),
    }
}

impl_primitive!(char, PrimitiveKind::Char, '\0', char_to_text, char_from_text);

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

//! Support for unit-only enums, which are primitives spelled by variant name.
//!
//! `#[derive(Formattable)]` on an enum generates the match arms and calls into here.

use crate::error::Error;
use std::any::type_name;

/// Error for a stored name that matches no variant of `T`.
#[cold]
pub fn unknown_variant<T>(text: &str) -> Error {
    Error::parse_error(format!(
        "`{text}` is not a variant of {}",
        type_name::<T>()
    ))
}

/// Error for a null stored in a non-nullable enum slot.
#[cold]
pub fn null_variant<T>() -> Error {
    crate::serializer::null_primitive::<T>()
}

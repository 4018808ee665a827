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
use std::any::type_name;

/// Implements [`Formattable`] for a scalar stored as one text value.
macro_rules! impl_primitive {
    ($ty:ty, $kind:expr, $default:expr, $to_text:path, $from_text:path) => {
        impl $crate::serializer::Formattable for $ty {
            #[inline(always)]
            fn graph_category() -> $crate::types::Category {
                $crate::types::Category::Primitive($kind)
            }

            fn graph_default() -> Self {
                $default
            }

            fn graph_write(
                &self,
                context: &mut $crate::resolver::context::WriteContext<'_>,
                path: &$crate::path::NodePath,
            ) -> Result<(), $crate::error::Error> {
                $crate::serializer::write_primitive(self, context, path)
            }

            fn graph_read(
                context: &mut $crate::resolver::context::ReadContext<'_>,
                path: &$crate::path::NodePath,
            ) -> Result<Self, $crate::error::Error> {
                $crate::serializer::read_primitive(context, path)
            }

            #[inline(always)]
            fn graph_to_text(&self) -> Result<Option<String>, $crate::error::Error> {
                $to_text(self).map(Some)
            }

            #[inline(always)]
            fn graph_from_text(text: Option<&str>) -> Result<Self, $crate::error::Error> {
                match text {
                    Some(text) => $from_text(text),
                    None => Err($crate::serializer::null_primitive::<Self>()),
                }
            }
        }
    };
}

pub mod any;
mod arc;
mod array;
mod bool;
pub mod collection;
mod core;
mod datetime;
mod decimal;
pub mod enum_;
mod list;
pub mod map;
pub mod multi_array;
mod number;
mod option;
mod rc;
mod refcell;
mod mutex;
mod set;
mod string;
pub mod struct_;
pub mod trait_object;

pub use self::core::{
    expect_value_node, is_inline, read_node, read_primitive, runtime_class, write_node,
    write_primitive, Formattable, Record, RecordHooks,
};

/// Error for a null value stored where a non-nullable primitive is declared.
#[cold]
pub fn null_primitive<T: ?Sized>() -> Error {
    Error::invalid_data(format!(
        "null stored for non-nullable {}",
        type_name::<T>()
    ))
}

/// Error for a text value that does not parse as `T`.
#[cold]
pub fn parse_failure<T: ?Sized>(text: &str, reason: impl std::fmt::Display) -> Error {
    Error::parse_error(format!(
        "cannot parse `{text}` as {}: {reason}",
        type_name::<T>()
    ))
}

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
use crate::path::NodePath;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::collection::{read_collection_vec, write_collection};
use crate::serializer::Formattable;
use crate::types::{Category, TypeDescriptor, ARRAY_CLASS};
use std::any::type_name;

/// Validates that the stored length matches the fixed array size `N`.
#[inline(always)]
fn validate_array_length(actual: usize, expected: usize, path: &NodePath) -> Result<(), Error> {
    if actual != expected {
        return Err(Error::invalid_data(format!(
            "array length mismatch at `{path}`: expected {expected}, got {actual}"
        )));
    }
    Ok(())
}

impl<T: Formattable, const N: usize> Formattable for [T; N] {
    #[inline(always)]
    fn graph_category() -> Category {
        Category::Array
    }

    fn graph_descriptor() -> TypeDescriptor {
        TypeDescriptor::with_elements(
            type_name::<Self>(),
            Category::Array,
            vec![T::graph_descriptor()],
        )
    }

    fn graph_default() -> Self {
        std::array::from_fn(|_| T::graph_default())
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        write_collection::<T, _>(context, path, ARRAY_CLASS, N, self.iter())
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let (header, items) = read_collection_vec::<T>(context, path, Category::Array)?;
        validate_array_length(header.count, N, path)?;
        items.try_into().map_err(|v: Vec<T>| {
            Error::invalid_data(format!(
                "array at `{path}` produced {} elements, expected {N}",
                v.len()
            ))
        })
    }
}

impl<T: Formattable> Formattable for Box<[T]> {
    #[inline(always)]
    fn graph_category() -> Category {
        Category::Array
    }

    fn graph_descriptor() -> TypeDescriptor {
        TypeDescriptor::with_elements(
            type_name::<Self>(),
            Category::Array,
            vec![T::graph_descriptor()],
        )
    }

    fn graph_default() -> Self {
        Box::new([])
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        write_collection::<T, _>(context, path, ARRAY_CLASS, self.len(), self.iter())
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let (_, items) = read_collection_vec::<T>(context, path, Category::Array)?;
        Ok(items.into_boxed_slice())
    }
}

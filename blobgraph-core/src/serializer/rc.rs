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
use crate::serializer::{read_node, Formattable};
use crate::types::{Category, TypeDescriptor};
use std::any::type_name;
use std::rc::Rc;

/// Materializes the shared node at `path`, or returns the handle already built there.
///
/// Pointer records are followed to their target, reading it first if the traversal has
/// not reached it yet. Interior-mutable contents are published in the path table before
/// they are filled, which is what lets a cycle close on a node still being read.
pub(super) fn read_shared<H, T>(context: &mut ReadContext<'_>, path: &NodePath) -> Result<H, Error>
where
    H: Formattable + Clone + AsRef<T> + From<T>,
    T: Formattable,
{
    if let Some(handle) = context.ref_reader.get::<H>(path)? {
        return Ok(handle);
    }
    let meta = context.meta(path)?;
    if let Some(target) = meta.points_to() {
        let target = NodePath::parse(target).ok_or_else(|| {
            Error::invalid_ref(format!("malformed pointer target `{target}` at `{path}`"))
        })?;
        if let Some(handle) = context.ref_reader.get::<H>(&target)? {
            return Ok(handle);
        }
        if target == *path || context.ref_reader.is_pending(&target) {
            return Err(Error::invalid_ref(format!(
                "`{path}` points to `{target}` while it is still being read; \
                cyclic nodes of {} need a RefCell, Mutex or RwLock",
                type_name::<T>()
            )));
        }
        return read_node::<H>(context, &target);
    }
    if meta.is_null() {
        return Err(Error::invalid_data(format!(
            "null stored at `{path}` for non-nullable {}",
            type_name::<H>()
        )));
    }

    if T::graph_is_cell() {
        let handle = H::from(T::graph_default());
        context.ref_reader.store(path, handle.clone());
        handle.as_ref().graph_fill(context, path)?;
        return Ok(handle);
    }

    context.ref_reader.begin(path);
    let value = T::graph_read(context, path);
    context.ref_reader.end(path);
    let handle = H::from(value?);
    context.ref_reader.store(path, handle.clone());
    Ok(handle)
}

impl<T: Formattable> Formattable for Rc<T> {
    #[inline(always)]
    fn graph_category() -> Category {
        T::graph_category()
    }

    fn graph_runtime_category(&self) -> Category {
        (**self).graph_runtime_category()
    }

    fn graph_descriptor() -> TypeDescriptor {
        T::graph_descriptor()
    }

    #[inline(always)]
    fn graph_is_shared() -> bool {
        true
    }

    fn graph_default() -> Self {
        Rc::new(T::graph_default())
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        match context.ref_writer.try_write_rc_ref(self, path) {
            Some(first) => context.write_pointer(path, &first),
            None => T::graph_write(self.as_ref(), context, path),
        }
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        read_shared::<Self, T>(context, path)
    }
}

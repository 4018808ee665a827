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

//! The collection algorithm shared by lists, queues, sets and arrays.
//!
//! Metadata `{IsPrimitive, Count}` is written first. Primitive elements are then joined
//! into one `Data` blob, one escaped line each; any other element becomes a child node
//! at `<path><index>/`. An empty collection owns no `Data` blob.

use crate::error::Error;
use crate::meta::{bool_text, decode_line, split_lines, LineWriter, MetaRecord};
use crate::path::{BlobKind, NodePath};
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{expect_value_node, is_inline, read_node, write_node, Formattable};
use crate::types::{keys, resolve_slot, Category};
use std::any::type_name;
use std::marker::PhantomData;
use std::ops::Deref;

/// Upper bound on speculative preallocation from a recorded count.
pub(crate) const MAX_PREALLOCATION: usize = 1 << 16;

pub struct CollectionWriter<'p, T> {
    path: &'p NodePath,
    inline: bool,
    lines: LineWriter,
    index: usize,
    count: usize,
    _element: PhantomData<fn(&T)>,
}

impl<'p, T: Formattable> CollectionWriter<'p, T> {
    pub fn begin(
        context: &mut WriteContext<'_>,
        path: &'p NodePath,
        class_name: &str,
        count: usize,
    ) -> Result<Self, Error> {
        let inline = is_inline::<T>();
        let mut meta = MetaRecord::new(class_name);
        meta.insert(keys::IS_PRIMITIVE, Some(bool_text(inline).to_string()));
        meta.insert_display(keys::COUNT, count);
        context.write_meta(path, &meta)?;
        Ok(CollectionWriter {
            path,
            inline,
            lines: LineWriter::new(),
            index: 0,
            count,
            _element: PhantomData,
        })
    }

    pub fn push(&mut self, item: &T, context: &mut WriteContext<'_>) -> Result<(), Error> {
        if self.inline {
            let text = item.graph_to_text()?;
            self.lines.push(text.as_deref());
        } else {
            write_node(item, context, &self.path.element(self.index))?;
        }
        self.index += 1;
        Ok(())
    }

    pub fn finish(self, context: &mut WriteContext<'_>) -> Result<(), Error> {
        if self.index != self.count {
            return Err(Error::invalid_data(format!(
                "collection at `{}` yielded {} elements, expected {}",
                self.path, self.index, self.count
            )));
        }
        if self.inline && self.count > 0 {
            context.add_blob(self.path.blob(BlobKind::Data), self.lines.into_bytes());
        }
        Ok(())
    }
}

/// Writes a collection whose items dereference to `T`.
pub fn write_collection<T, I>(
    context: &mut WriteContext<'_>,
    path: &NodePath,
    class_name: &str,
    count: usize,
    items: I,
) -> Result<(), Error>
where
    T: Formattable,
    I: IntoIterator,
    I::Item: Deref<Target = T>,
{
    let mut writer = CollectionWriter::<T>::begin(context, path, class_name, count)?;
    for item in items {
        writer.push(&item, context)?;
    }
    writer.finish(context)
}

#[derive(Clone, Copy, Debug)]
pub struct CollectionHeader {
    /// Concrete category recorded for the node.
    pub category: Category,
    pub inline: bool,
    pub count: usize,
}

impl CollectionHeader {
    pub fn capacity(&self) -> usize {
        self.count.min(MAX_PREALLOCATION)
    }
}

pub fn read_collection_header<T: Formattable>(
    context: &mut ReadContext<'_>,
    path: &NodePath,
    declared: Category,
) -> Result<CollectionHeader, Error> {
    let meta = context.meta(path)?;
    expect_value_node(&meta, path, declared.describe())?;
    let category = resolve_slot(declared, meta.class_name())?;
    let inline = meta.require_bool(keys::IS_PRIMITIVE)?;
    check_inline::<T>(inline, path)?;
    let count = meta.require_usize(keys::COUNT)?;
    Ok(CollectionHeader {
        category,
        inline,
        count,
    })
}

pub(crate) fn check_inline<T: Formattable>(recorded: bool, path: &NodePath) -> Result<(), Error> {
    if recorded != is_inline::<T>() {
        let recorded = if recorded {
            "primitive elements"
        } else {
            "node elements"
        };
        return Err(Error::type_mismatch(
            format!("{} at `{path}`", type_name::<T>()),
            recorded,
        ));
    }
    Ok(())
}

/// Decodes the lines of a primitive bulk blob.
pub(crate) fn read_inline_values<T: Formattable>(
    context: &ReadContext<'_>,
    path: &NodePath,
    kind: BlobKind,
    count: usize,
) -> Result<Vec<T>, Error> {
    let blob = context.blob_text(path, kind)?;
    let lines = split_lines(&blob, count).map_err(|e| e.at_path(path.as_str()))?;
    let mut values = Vec::with_capacity(count.min(MAX_PREALLOCATION));
    for line in lines {
        let text = decode_line(line)?;
        values.push(T::graph_from_text(text.as_deref()).map_err(|e| e.at_path(path.as_str()))?);
    }
    Ok(values)
}

/// Reads every element described by `header`, handing each to `push` in stored order.
pub fn read_collection_items<T, F>(
    context: &mut ReadContext<'_>,
    path: &NodePath,
    header: &CollectionHeader,
    mut push: F,
) -> Result<(), Error>
where
    T: Formattable,
    F: FnMut(T) -> Result<(), Error>,
{
    if header.count == 0 {
        return Ok(());
    }
    if header.inline {
        for value in read_inline_values::<T>(context, path, BlobKind::Data, header.count)? {
            push(value)?;
        }
    } else {
        for i in 0..header.count {
            push(read_node::<T>(context, &path.element(i))?)?;
        }
    }
    Ok(())
}

/// Reads a collection stored at `path` into a `Vec`, in stored order.
pub fn read_collection_vec<T: Formattable>(
    context: &mut ReadContext<'_>,
    path: &NodePath,
    declared: Category,
) -> Result<(CollectionHeader, Vec<T>), Error> {
    let header = read_collection_header::<T>(context, path, declared)?;
    let mut items = Vec::with_capacity(header.capacity());
    read_collection_items::<T, _>(context, path, &header, |item| {
        items.push(item);
        Ok(())
    })?;
    Ok((header, items))
}

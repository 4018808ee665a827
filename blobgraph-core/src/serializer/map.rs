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

//! The dictionary algorithm.
//!
//! Metadata carries `{IsPrimitiveKey, IsPrimitiveValue, Count}`. Each side is stored on
//! its own: primitive keys go to the `Keys` blob and primitive values to `Values`, one
//! escaped line per entry; non-primitive keys and values become child nodes at
//! `<path><index>/Key/` and `<path><index>/Value/`.

use crate::error::Error;
use crate::meta::{bool_text, LineWriter, MetaRecord};
use crate::path::{BlobKind, NodePath};
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::collection::{check_inline, read_inline_values, MAX_PREALLOCATION};
use crate::serializer::{expect_value_node, is_inline, read_node, write_node, Formattable};
use crate::types::{keys, resolve_slot, Category, DictionaryKind, TypeDescriptor};
use dashmap::DashMap;
use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

pub struct DictionaryWriter<'p, K, V> {
    path: &'p NodePath,
    inline_key: bool,
    inline_value: bool,
    keys: LineWriter,
    values: LineWriter,
    index: usize,
    count: usize,
    _entry: PhantomData<fn(&K, &V)>,
}

impl<'p, K: Formattable, V: Formattable> DictionaryWriter<'p, K, V> {
    pub fn begin(
        context: &mut WriteContext<'_>,
        path: &'p NodePath,
        class_name: &str,
        count: usize,
    ) -> Result<Self, Error> {
        let inline_key = is_inline::<K>();
        let inline_value = is_inline::<V>();
        let mut meta = MetaRecord::new(class_name);
        meta.insert(keys::IS_PRIMITIVE_KEY, Some(bool_text(inline_key).to_string()));
        meta.insert(
            keys::IS_PRIMITIVE_VALUE,
            Some(bool_text(inline_value).to_string()),
        );
        meta.insert_display(keys::COUNT, count);
        context.write_meta(path, &meta)?;
        Ok(DictionaryWriter {
            path,
            inline_key,
            inline_value,
            keys: LineWriter::new(),
            values: LineWriter::new(),
            index: 0,
            count,
            _entry: PhantomData,
        })
    }

    pub fn push(&mut self, key: &K, value: &V, context: &mut WriteContext<'_>) -> Result<(), Error> {
        if self.inline_key {
            let text = key.graph_to_text()?;
            self.keys.push(text.as_deref());
        } else {
            write_node(key, context, &self.path.entry_key(self.index))?;
        }
        if self.inline_value {
            let text = value.graph_to_text()?;
            self.values.push(text.as_deref());
        } else {
            write_node(value, context, &self.path.entry_value(self.index))?;
        }
        self.index += 1;
        Ok(())
    }

    pub fn finish(self, context: &mut WriteContext<'_>) -> Result<(), Error> {
        if self.index != self.count {
            return Err(Error::invalid_data(format!(
                "dictionary at `{}` yielded {} entries, expected {}",
                self.path, self.index, self.count
            )));
        }
        if self.count > 0 {
            if self.inline_key {
                context.add_blob(self.path.blob(BlobKind::Keys), self.keys.into_bytes());
            }
            if self.inline_value {
                context.add_blob(self.path.blob(BlobKind::Values), self.values.into_bytes());
            }
        }
        Ok(())
    }
}

/// Writes a dictionary from borrowed entries.
pub fn write_dictionary<'a, K, V, I>(
    context: &mut WriteContext<'_>,
    path: &NodePath,
    class_name: &str,
    count: usize,
    entries: I,
) -> Result<(), Error>
where
    K: Formattable,
    V: Formattable,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    let mut writer = DictionaryWriter::<K, V>::begin(context, path, class_name, count)?;
    for (key, value) in entries {
        writer.push(key, value, context)?;
    }
    writer.finish(context)
}

#[derive(Clone, Copy, Debug)]
pub struct DictionaryHeader {
    pub category: Category,
    pub inline_key: bool,
    pub inline_value: bool,
    pub count: usize,
}

impl DictionaryHeader {
    pub fn capacity(&self) -> usize {
        self.count.min(MAX_PREALLOCATION)
    }
}

pub fn read_dictionary_header<K: Formattable, V: Formattable>(
    context: &mut ReadContext<'_>,
    path: &NodePath,
    declared: Category,
) -> Result<DictionaryHeader, Error> {
    let meta = context.meta(path)?;
    expect_value_node(&meta, path, declared.describe())?;
    let category = resolve_slot(declared, meta.class_name())?;
    let inline_key = meta.require_bool(keys::IS_PRIMITIVE_KEY)?;
    let inline_value = meta.require_bool(keys::IS_PRIMITIVE_VALUE)?;
    check_inline::<K>(inline_key, path)?;
    check_inline::<V>(inline_value, path)?;
    let count = meta.require_usize(keys::COUNT)?;
    Ok(DictionaryHeader {
        category,
        inline_key,
        inline_value,
        count,
    })
}

fn read_side<T: Formattable>(
    context: &mut ReadContext<'_>,
    path: &NodePath,
    inline: bool,
    kind: BlobKind,
    child: fn(&NodePath, usize) -> NodePath,
    count: usize,
) -> Result<Vec<T>, Error> {
    if inline {
        return read_inline_values::<T>(context, path, kind, count);
    }
    let mut items = Vec::with_capacity(count.min(MAX_PREALLOCATION));
    for i in 0..count {
        items.push(read_node::<T>(context, &child(path, i))?);
    }
    Ok(items)
}

/// Reads every entry described by `header` and hands the pairs to `insert` in stored order.
pub fn read_dictionary_entries<K, V, F>(
    context: &mut ReadContext<'_>,
    path: &NodePath,
    header: &DictionaryHeader,
    mut insert: F,
) -> Result<(), Error>
where
    K: Formattable,
    V: Formattable,
    F: FnMut(K, V) -> Result<(), Error>,
{
    if header.count == 0 {
        return Ok(());
    }
    let keys = read_side::<K>(
        context,
        path,
        header.inline_key,
        BlobKind::Keys,
        NodePath::entry_key,
        header.count,
    )?;
    let values = read_side::<V>(
        context,
        path,
        header.inline_value,
        BlobKind::Values,
        NodePath::entry_value,
        header.count,
    )?;
    for (key, value) in keys.into_iter().zip(values) {
        insert(key, value)?;
    }
    Ok(())
}

fn descriptor<D: 'static, K: Formattable, V: Formattable>(category: Category) -> TypeDescriptor {
    TypeDescriptor::with_elements(
        type_name::<D>(),
        category,
        vec![K::graph_descriptor(), V::graph_descriptor()],
    )
}

impl<K, V, S> Formattable for HashMap<K, V, S>
where
    K: Formattable + Eq + Hash,
    V: Formattable,
    S: BuildHasher + Default + 'static,
{
    #[inline(always)]
    fn graph_category() -> Category {
        Category::Dictionary(DictionaryKind::HashMap)
    }

    fn graph_descriptor() -> TypeDescriptor {
        descriptor::<Self, K, V>(Self::graph_category())
    }

    fn graph_default() -> Self {
        HashMap::default()
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        write_dictionary(
            context,
            path,
            DictionaryKind::HashMap.identifier(),
            self.len(),
            self.iter(),
        )
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let header = read_dictionary_header::<K, V>(context, path, Self::graph_category())?;
        let mut map = HashMap::with_capacity_and_hasher(header.capacity(), S::default());
        read_dictionary_entries::<K, V, _>(context, path, &header, |k, v| {
            map.insert(k, v);
            Ok(())
        })?;
        Ok(map)
    }
}

impl<K: Formattable + Ord, V: Formattable> Formattable for BTreeMap<K, V> {
    #[inline(always)]
    fn graph_category() -> Category {
        Category::Dictionary(DictionaryKind::SortedMap)
    }

    fn graph_descriptor() -> TypeDescriptor {
        descriptor::<Self, K, V>(Self::graph_category())
    }

    fn graph_default() -> Self {
        BTreeMap::new()
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        write_dictionary(
            context,
            path,
            DictionaryKind::SortedMap.identifier(),
            self.len(),
            self.iter(),
        )
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let header = read_dictionary_header::<K, V>(context, path, Self::graph_category())?;
        let mut map = BTreeMap::new();
        read_dictionary_entries::<K, V, _>(context, path, &header, |k, v| {
            map.insert(k, v);
            Ok(())
        })?;
        Ok(map)
    }
}

impl<K, V, S> Formattable for DashMap<K, V, S>
where
    K: Formattable + Eq + Hash,
    V: Formattable,
    S: BuildHasher + Clone + Default + 'static,
{
    #[inline(always)]
    fn graph_category() -> Category {
        Category::Dictionary(DictionaryKind::ConcurrentMap)
    }

    fn graph_descriptor() -> TypeDescriptor {
        descriptor::<Self, K, V>(Self::graph_category())
    }

    fn graph_default() -> Self {
        DashMap::default()
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        let mut writer = DictionaryWriter::<K, V>::begin(
            context,
            path,
            DictionaryKind::ConcurrentMap.identifier(),
            self.len(),
        )?;
        for entry in self.iter() {
            writer.push(entry.key(), entry.value(), context)?;
        }
        writer.finish(context)
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let header = read_dictionary_header::<K, V>(context, path, Self::graph_category())?;
        let map = DashMap::with_capacity_and_hasher(header.capacity(), S::default());
        read_dictionary_entries::<K, V, _>(context, path, &header, |k, v| {
            map.insert(k, v);
            Ok(())
        })?;
        Ok(map)
    }
}

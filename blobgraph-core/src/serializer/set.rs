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
use crate::serializer::collection::{
    read_collection_header, read_collection_items, write_collection, CollectionWriter,
};
use crate::serializer::Formattable;
use crate::types::{Category, CollectionKind, TypeDescriptor};
use dashmap::DashSet;
use std::any::type_name;
use std::collections::{BTreeSet, HashSet};
use std::hash::{BuildHasher, Hash};

/// Sets are enumerated in their own iteration order, which for hashed kinds is not
/// stable across runs. Compare sorted contents after a round trip.
impl<T, S> Formattable for HashSet<T, S>
where
    T: Formattable + Eq + Hash,
    S: BuildHasher + Default + 'static,
{
    #[inline(always)]
    fn graph_category() -> Category {
        Category::Collection(CollectionKind::HashSet)
    }

    fn graph_descriptor() -> TypeDescriptor {
        TypeDescriptor::with_elements(
            type_name::<Self>(),
            Self::graph_category(),
            vec![T::graph_descriptor()],
        )
    }

    fn graph_default() -> Self {
        HashSet::default()
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        write_collection::<T, _>(
            context,
            path,
            CollectionKind::HashSet.identifier(),
            self.len(),
            self.iter(),
        )
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let header = read_collection_header::<T>(context, path, Self::graph_category())?;
        let mut set = HashSet::with_capacity_and_hasher(header.capacity(), S::default());
        read_collection_items::<T, _>(context, path, &header, |item| {
            set.insert(item);
            Ok(())
        })?;
        Ok(set)
    }
}

impl<T: Formattable + Ord> Formattable for BTreeSet<T> {
    #[inline(always)]
    fn graph_category() -> Category {
        Category::Collection(CollectionKind::SortedSet)
    }

    fn graph_descriptor() -> TypeDescriptor {
        TypeDescriptor::with_elements(
            type_name::<Self>(),
            Self::graph_category(),
            vec![T::graph_descriptor()],
        )
    }

    fn graph_default() -> Self {
        BTreeSet::new()
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        write_collection::<T, _>(
            context,
            path,
            CollectionKind::SortedSet.identifier(),
            self.len(),
            self.iter(),
        )
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let header = read_collection_header::<T>(context, path, Self::graph_category())?;
        let mut set = BTreeSet::new();
        read_collection_items::<T, _>(context, path, &header, |item| {
            set.insert(item);
            Ok(())
        })?;
        Ok(set)
    }
}

impl<T, S> Formattable for DashSet<T, S>
where
    T: Formattable + Eq + Hash,
    S: BuildHasher + Clone + Default + 'static,
{
    #[inline(always)]
    fn graph_category() -> Category {
        Category::Collection(CollectionKind::ConcurrentSet)
    }

    fn graph_descriptor() -> TypeDescriptor {
        TypeDescriptor::with_elements(
            type_name::<Self>(),
            Self::graph_category(),
            vec![T::graph_descriptor()],
        )
    }

    fn graph_default() -> Self {
        DashSet::default()
    }

    /// The count is taken up front and re-checked after the walk, so a set mutated
    /// concurrently fails instead of writing a torn node.
    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        let mut writer = CollectionWriter::<T>::begin(
            context,
            path,
            CollectionKind::ConcurrentSet.identifier(),
            self.len(),
        )?;
        for item in self.iter() {
            writer.push(item.key(), context)?;
        }
        writer.finish(context)
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let header = read_collection_header::<T>(context, path, Self::graph_category())?;
        let set = DashSet::with_capacity_and_hasher(header.capacity(), S::default());
        read_collection_items::<T, _>(context, path, &header, |item| {
            set.insert(item);
            Ok(())
        })?;
        Ok(set)
    }
}

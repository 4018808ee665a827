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
use crate::types::{Category, CollectionKind, TypeDescriptor};
use std::any::type_name;
use std::collections::{LinkedList, VecDeque};

impl<T: Formattable> Formattable for Vec<T> {
    #[inline(always)]
    fn graph_category() -> Category {
        Category::Collection(CollectionKind::List)
    }

    fn graph_descriptor() -> TypeDescriptor {
        TypeDescriptor::with_elements(
            type_name::<Self>(),
            Self::graph_category(),
            vec![T::graph_descriptor()],
        )
    }

    fn graph_default() -> Self {
        Vec::new()
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        write_collection::<T, _>(
            context,
            path,
            CollectionKind::List.identifier(),
            self.len(),
            self.iter(),
        )
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let (_, items) = read_collection_vec::<T>(context, path, Self::graph_category())?;
        Ok(items)
    }
}

impl<T: Formattable> Formattable for VecDeque<T> {
    #[inline(always)]
    fn graph_category() -> Category {
        Category::Collection(CollectionKind::Queue)
    }

    fn graph_descriptor() -> TypeDescriptor {
        TypeDescriptor::with_elements(
            type_name::<Self>(),
            Self::graph_category(),
            vec![T::graph_descriptor()],
        )
    }

    fn graph_default() -> Self {
        VecDeque::new()
    }

    /// Front of the queue first.
    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        write_collection::<T, _>(
            context,
            path,
            CollectionKind::Queue.identifier(),
            self.len(),
            self.iter(),
        )
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let (_, items) = read_collection_vec::<T>(context, path, Self::graph_category())?;
        Ok(VecDeque::from(items))
    }
}

impl<T: Formattable> Formattable for LinkedList<T> {
    #[inline(always)]
    fn graph_category() -> Category {
        Category::Collection(CollectionKind::LinkedList)
    }

    fn graph_descriptor() -> TypeDescriptor {
        TypeDescriptor::with_elements(
            type_name::<Self>(),
            Self::graph_category(),
            vec![T::graph_descriptor()],
        )
    }

    fn graph_default() -> Self {
        LinkedList::new()
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        write_collection::<T, _>(
            context,
            path,
            CollectionKind::LinkedList.identifier(),
            self.len(),
            self.iter(),
        )
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let (_, items) = read_collection_vec::<T>(context, path, Self::graph_category())?;
        Ok(items.into_iter().collect())
    }
}

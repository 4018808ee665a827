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

//! Interface-typed container slots.
//!
//! A field declared as [`AnySequence`], [`AnySet`] or [`AnyMap`] accepts whichever
//! concrete kind was recorded: a node written as a `Queue` comes back as
//! `AnySequence::Queue`, a `SortedMap` as `AnyMap::Sorted`, and so on.

use crate::error::Error;
use crate::path::NodePath;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::collection::{
    read_collection_header, read_collection_items, write_collection, CollectionWriter,
};
use crate::serializer::map::{
    read_dictionary_entries, read_dictionary_header, write_dictionary, DictionaryWriter,
};
use crate::serializer::{runtime_class, Formattable};
use crate::types::{Category, CollectionKind, DictionaryKind, InterfaceKind, TypeDescriptor};
use dashmap::{DashMap, DashSet};
use std::any::type_name;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::Hash;

#[cold]
fn wrong_kind(interface: InterfaceKind, category: Category) -> Error {
    Error::type_mismatch(interface.identifier(), category.describe())
}

/// Any ordered, non-set collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnySequence<T> {
    List(Vec<T>),
    LinkedList(LinkedList<T>),
    Queue(VecDeque<T>),
    /// Last element is the top. Enumerated top first.
    Stack(Vec<T>),
}

impl<T> Default for AnySequence<T> {
    fn default() -> Self {
        AnySequence::List(Vec::new())
    }
}

impl<T> AnySequence<T> {
    /// An empty sequence of `kind`. Set kinds are rejected.
    pub fn with_capacity(kind: CollectionKind, capacity: usize) -> Result<Self, Error> {
        Ok(match kind {
            CollectionKind::List => AnySequence::List(Vec::with_capacity(capacity)),
            CollectionKind::LinkedList => AnySequence::LinkedList(LinkedList::new()),
            CollectionKind::Queue => AnySequence::Queue(VecDeque::with_capacity(capacity)),
            CollectionKind::Stack => AnySequence::Stack(Vec::with_capacity(capacity)),
            other => {
                return Err(Error::unsupported(format!(
                    "{} is not a sequence kind",
                    other.identifier()
                )))
            }
        })
    }

    pub fn kind(&self) -> CollectionKind {
        match self {
            AnySequence::List(_) => CollectionKind::List,
            AnySequence::LinkedList(_) => CollectionKind::LinkedList,
            AnySequence::Queue(_) => CollectionKind::Queue,
            AnySequence::Stack(_) => CollectionKind::Stack,
        }
    }

    /// Appends at the back; for a stack, pushes a new top.
    pub fn push(&mut self, item: T) {
        match self {
            AnySequence::List(v) | AnySequence::Stack(v) => v.push(item),
            AnySequence::LinkedList(l) => l.push_back(item),
            AnySequence::Queue(q) => q.push_back(item),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AnySequence::List(v) | AnySequence::Stack(v) => v.len(),
            AnySequence::LinkedList(l) => l.len(),
            AnySequence::Queue(q) => q.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements in stored order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        match self {
            AnySequence::List(v) => Box::new(v.iter()),
            AnySequence::Stack(v) => Box::new(v.iter().rev()),
            AnySequence::LinkedList(l) => Box::new(l.iter()),
            AnySequence::Queue(q) => Box::new(q.iter()),
        }
    }

    /// Rebuilds a sequence of `kind` from elements in stored order.
    fn from_stored(kind: CollectionKind, mut items: Vec<T>) -> Result<Self, Error> {
        Ok(match kind {
            CollectionKind::List => AnySequence::List(items),
            CollectionKind::LinkedList => AnySequence::LinkedList(items.into_iter().collect()),
            CollectionKind::Queue => AnySequence::Queue(VecDeque::from(items)),
            CollectionKind::Stack => {
                items.reverse();
                AnySequence::Stack(items)
            }
            other => return Self::with_capacity(other, 0),
        })
    }
}

impl<T: Formattable> Formattable for AnySequence<T> {
    #[inline(always)]
    fn graph_category() -> Category {
        Category::Interface(InterfaceKind::Sequence)
    }

    fn graph_runtime_category(&self) -> Category {
        Category::Collection(self.kind())
    }

    fn graph_descriptor() -> TypeDescriptor {
        TypeDescriptor::with_elements(
            type_name::<Self>(),
            Self::graph_category(),
            vec![T::graph_descriptor()],
        )
    }

    fn graph_default() -> Self {
        AnySequence::default()
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        write_collection::<T, _>(context, path, runtime_class(self)?, self.len(), self.iter())
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let header = read_collection_header::<T>(context, path, Self::graph_category())?;
        let kind = match header.category {
            Category::Collection(kind) if !kind.is_set() => kind,
            other => return Err(wrong_kind(InterfaceKind::Sequence, other)),
        };
        let mut items = Vec::with_capacity(header.capacity());
        read_collection_items::<T, _>(context, path, &header, |item| {
            items.push(item);
            Ok(())
        })?;
        AnySequence::from_stored(kind, items)
    }
}

/// Any set-like collection.
#[derive(Debug)]
pub enum AnySet<T: Eq + Hash> {
    Hash(HashSet<T>),
    Sorted(BTreeSet<T>),
    Concurrent(DashSet<T>),
}

impl<T: Eq + Hash> Default for AnySet<T> {
    fn default() -> Self {
        AnySet::Hash(HashSet::new())
    }
}

impl<T: Eq + Hash + Ord> AnySet<T> {
    pub fn with_capacity(kind: CollectionKind, capacity: usize) -> Result<Self, Error> {
        Ok(match kind {
            CollectionKind::HashSet => AnySet::Hash(HashSet::with_capacity(capacity)),
            CollectionKind::SortedSet => AnySet::Sorted(BTreeSet::new()),
            CollectionKind::ConcurrentSet => AnySet::Concurrent(DashSet::with_capacity(capacity)),
            other => {
                return Err(Error::unsupported(format!(
                    "{} is not a set kind",
                    other.identifier()
                )))
            }
        })
    }

    pub fn kind(&self) -> CollectionKind {
        match self {
            AnySet::Hash(_) => CollectionKind::HashSet,
            AnySet::Sorted(_) => CollectionKind::SortedSet,
            AnySet::Concurrent(_) => CollectionKind::ConcurrentSet,
        }
    }

    /// Returns false if the value was already present.
    pub fn insert(&mut self, item: T) -> bool {
        match self {
            AnySet::Hash(s) => s.insert(item),
            AnySet::Sorted(s) => s.insert(item),
            AnySet::Concurrent(s) => s.insert(item),
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        match self {
            AnySet::Hash(s) => s.contains(item),
            AnySet::Sorted(s) => s.contains(item),
            AnySet::Concurrent(s) => s.contains(item),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AnySet::Hash(s) => s.len(),
            AnySet::Sorted(s) => s.len(),
            AnySet::Concurrent(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Formattable + Eq + Hash + Ord> Formattable for AnySet<T> {
    #[inline(always)]
    fn graph_category() -> Category {
        Category::Interface(InterfaceKind::Set)
    }

    fn graph_runtime_category(&self) -> Category {
        Category::Collection(self.kind())
    }

    fn graph_descriptor() -> TypeDescriptor {
        TypeDescriptor::with_elements(
            type_name::<Self>(),
            Self::graph_category(),
            vec![T::graph_descriptor()],
        )
    }

    fn graph_default() -> Self {
        AnySet::default()
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        let identifier = runtime_class(self)?;
        match self {
            AnySet::Hash(s) => write_collection::<T, _>(context, path, identifier, s.len(), s),
            AnySet::Sorted(s) => write_collection::<T, _>(context, path, identifier, s.len(), s),
            AnySet::Concurrent(s) => {
                let mut writer = CollectionWriter::<T>::begin(context, path, identifier, s.len())?;
                for item in s.iter() {
                    writer.push(item.key(), context)?;
                }
                writer.finish(context)
            }
        }
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let header = read_collection_header::<T>(context, path, Self::graph_category())?;
        let mut set = match header.category {
            Category::Collection(kind) if kind.is_set() => {
                AnySet::with_capacity(kind, header.capacity())?
            }
            other => return Err(wrong_kind(InterfaceKind::Set, other)),
        };
        read_collection_items::<T, _>(context, path, &header, |item| {
            set.insert(item);
            Ok(())
        })?;
        Ok(set)
    }
}

/// Any dictionary.
#[derive(Debug)]
pub enum AnyMap<K: Eq + Hash, V> {
    Hash(HashMap<K, V>),
    Sorted(BTreeMap<K, V>),
    /// Entries kept sorted by key.
    SortedList(Vec<(K, V)>),
    Concurrent(DashMap<K, V>),
}

impl<K: Eq + Hash, V> Default for AnyMap<K, V> {
    fn default() -> Self {
        AnyMap::Hash(HashMap::new())
    }
}

impl<K: Eq + Hash + Ord, V> AnyMap<K, V> {
    pub fn with_capacity(kind: DictionaryKind, capacity: usize) -> Self {
        match kind {
            DictionaryKind::HashMap => AnyMap::Hash(HashMap::with_capacity(capacity)),
            DictionaryKind::SortedMap => AnyMap::Sorted(BTreeMap::new()),
            DictionaryKind::SortedList => AnyMap::SortedList(Vec::with_capacity(capacity)),
            DictionaryKind::ConcurrentMap => AnyMap::Concurrent(DashMap::with_capacity(capacity)),
        }
    }

    pub fn kind(&self) -> DictionaryKind {
        match self {
            AnyMap::Hash(_) => DictionaryKind::HashMap,
            AnyMap::Sorted(_) => DictionaryKind::SortedMap,
            AnyMap::SortedList(_) => DictionaryKind::SortedList,
            AnyMap::Concurrent(_) => DictionaryKind::ConcurrentMap,
        }
    }

    /// Inserts or replaces the value under `key`, returning the previous one.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self {
            AnyMap::Hash(m) => m.insert(key, value),
            AnyMap::Sorted(m) => m.insert(key, value),
            AnyMap::SortedList(entries) => {
                match entries.binary_search_by(|(k, _)| k.cmp(&key)) {
                    Ok(i) => Some(std::mem::replace(&mut entries[i].1, value)),
                    Err(i) => {
                        entries.insert(i, (key, value));
                        None
                    }
                }
            }
            AnyMap::Concurrent(m) => m.insert(key, value),
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        match self {
            AnyMap::Hash(m) => m.contains_key(key),
            AnyMap::Sorted(m) => m.contains_key(key),
            AnyMap::SortedList(entries) => entries.binary_search_by(|(k, _)| k.cmp(key)).is_ok(),
            AnyMap::Concurrent(m) => m.contains_key(key),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AnyMap::Hash(m) => m.len(),
            AnyMap::Sorted(m) => m.len(),
            AnyMap::SortedList(entries) => entries.len(),
            AnyMap::Concurrent(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Formattable for AnyMap<K, V>
where
    K: Formattable + Eq + Hash + Ord,
    V: Formattable,
{
    #[inline(always)]
    fn graph_category() -> Category {
        Category::Interface(InterfaceKind::Map)
    }

    fn graph_runtime_category(&self) -> Category {
        Category::Dictionary(self.kind())
    }

    fn graph_descriptor() -> TypeDescriptor {
        TypeDescriptor::with_elements(
            type_name::<Self>(),
            Self::graph_category(),
            vec![K::graph_descriptor(), V::graph_descriptor()],
        )
    }

    fn graph_default() -> Self {
        AnyMap::default()
    }

    fn graph_write(&self, context: &mut WriteContext<'_>, path: &NodePath) -> Result<(), Error> {
        let identifier = runtime_class(self)?;
        let count = self.len();
        match self {
            AnyMap::Hash(m) => write_dictionary(context, path, identifier, count, m.iter()),
            AnyMap::Sorted(m) => write_dictionary(context, path, identifier, count, m.iter()),
            AnyMap::SortedList(entries) => write_dictionary(
                context,
                path,
                identifier,
                count,
                entries.iter().map(|(k, v)| (k, v)),
            ),
            AnyMap::Concurrent(m) => {
                let mut writer = DictionaryWriter::<K, V>::begin(context, path, identifier, count)?;
                for entry in m.iter() {
                    writer.push(entry.key(), entry.value(), context)?;
                }
                writer.finish(context)
            }
        }
    }

    fn graph_read(context: &mut ReadContext<'_>, path: &NodePath) -> Result<Self, Error> {
        let header = read_dictionary_header::<K, V>(context, path, Self::graph_category())?;
        let mut map = match header.category {
            Category::Dictionary(kind) => AnyMap::with_capacity(kind, header.capacity()),
            other => return Err(wrong_kind(InterfaceKind::Map, other)),
        };
        read_dictionary_entries::<K, V, _>(context, path, &header, |k, v| {
            map.insert(k, v);
            Ok(())
        })?;
        Ok(map)
    }
}

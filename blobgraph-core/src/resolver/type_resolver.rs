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

use super::context::ReadContext;
use crate::error::Error;
use crate::meta::{FormattableType, MemberDescriptor, RecordLayout};
use crate::path::NodePath;
use crate::serializer::struct_::read_record;
use crate::serializer::trait_object::AnyRecord;
use crate::serializer::Record;
use crate::types::is_reserved_class_name;
use parking_lot::{Condvar, Mutex, RwLock};
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

type ReadAnyFn = fn(&mut ReadContext<'_>, &NodePath) -> Result<Box<dyn AnyRecord>, Error>;
type DescribeFn = fn(&FormattableType) -> Result<Vec<MemberDescriptor>, Error>;

/// Type-erased entry points of a registered record, used by polymorphic slots and
/// registry diagnostics.
#[derive(Clone)]
pub struct Harness {
    read_any_fn: ReadAnyFn,
    describe_fn: DescribeFn,
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness").finish_non_exhaustive()
    }
}

fn read_any<R: Record>(
    context: &mut ReadContext<'_>,
    path: &NodePath,
) -> Result<Box<dyn AnyRecord>, Error> {
    Ok(Box::new(read_record::<R>(context, path)?))
}

fn describe<R: Record>(descriptor: &FormattableType) -> Result<Vec<MemberDescriptor>, Error> {
    Ok(descriptor.layout::<R>()?.describe())
}

impl Harness {
    pub fn of<R: Record>() -> Harness {
        Harness {
            read_any_fn: read_any::<R>,
            describe_fn: describe::<R>,
        }
    }

    #[inline(always)]
    pub fn get_read_any_fn(&self) -> ReadAnyFn {
        self.read_any_fn
    }

    #[inline(always)]
    pub fn get_describe_fn(&self) -> DescribeFn {
        self.describe_fn
    }
}

#[derive(Default)]
struct RegistryState {
    loading: bool,
    sealed: bool,
}

#[derive(Default)]
struct RegistryTables {
    by_name: HashMap<String, Vec<Arc<FormattableType>>>,
    by_type: HashMap<TypeId, Arc<FormattableType>>,
    by_definition: HashMap<&'static str, Vec<Arc<FormattableType>>>,
}

/// Registered record types, shared by every serializer that holds the registry.
///
/// Registration happens inside [`TypeRegistry::load`]; while a load is running every
/// serialize and deserialize call waits in [`TypeRegistry::wait_ready`]. Loaded
/// descriptors are never removed.
#[derive(Default)]
pub struct TypeRegistry {
    state: Mutex<RegistryState>,
    ready: Condvar,
    tables: RwLock<RegistryTables>,
}

/// Clears the loading flag even if the load closure panics.
struct LoadingGuard<'a>(&'a TypeRegistry);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.state.lock().loading = false;
        self.0.ready.notify_all();
    }
}

/// Collects registrations during a [`TypeRegistry::load`].
pub struct TypeLoader {
    staged: Vec<FormattableType>,
}

impl TypeLoader {
    /// Registers `T` under its declared class name.
    pub fn register<T: Record>(&mut self) -> Result<(), Error> {
        self.register_as::<T>(T::graph_class_name())
    }

    /// Registers `T` under `name`.
    pub fn register_as<T: Record>(&mut self, name: &str) -> Result<(), Error> {
        if name.is_empty() || is_reserved_class_name(name) {
            return Err(Error::config(format!(
                "`{name}` cannot be used as the class name of {}",
                type_name::<T>()
            )));
        }
        if self.staged.iter().any(|t| t.type_id() == TypeId::of::<T>()) {
            return Err(Error::config(format!(
                "{} registered twice in one load",
                type_name::<T>()
            )));
        }
        let descriptor = FormattableType::new::<T>(name);
        // build now so accessor and key problems surface at registration time
        let _layout: Arc<RecordLayout<T>> = descriptor.layout::<T>()?;
        self.staged.push(descriptor);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` as one exclusive load. Registrations are committed only if `f` and
    /// every registration succeed.
    pub fn load<F>(&self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut TypeLoader) -> Result<(), Error>,
    {
        {
            let mut state = self.state.lock();
            while state.loading {
                self.ready.wait(&mut state);
            }
            if state.sealed {
                return Err(Error::registry_closed(
                    "type registry is sealed; no further registration is accepted",
                ));
            }
            state.loading = true;
        }
        let _guard = LoadingGuard(self);
        let mut loader = TypeLoader { staged: Vec::new() };
        f(&mut loader)?;
        self.commit(loader.staged)
    }

    fn commit(&self, staged: Vec<FormattableType>) -> Result<(), Error> {
        let mut tables = self.tables.write();
        for descriptor in &staged {
            if let Some(existing) = tables.by_type.get(&descriptor.type_id()) {
                return Err(Error::config(format!(
                    "{} is already registered as `{}`",
                    descriptor.type_name(),
                    existing.name()
                )));
            }
        }
        let count = staged.len();
        for descriptor in staged {
            let descriptor = Arc::new(descriptor);
            tables
                .by_name
                .entry(descriptor.name().to_string())
                .or_default()
                .push(descriptor.clone());
            tables
                .by_definition
                .entry(descriptor.definition())
                .or_default()
                .push(descriptor.clone());
            tables.by_type.insert(descriptor.type_id(), descriptor);
        }
        debug!(registered = count, total = tables.by_type.len(), "type registry loaded");
        Ok(())
    }

    /// Registers `T` under its declared class name in a load of its own.
    pub fn register<T: Record>(&self) -> Result<(), Error> {
        self.load(|loader| loader.register::<T>())
    }

    pub fn register_as<T: Record>(&self, name: &str) -> Result<(), Error> {
        self.load(|loader| loader.register_as::<T>(name))
    }

    /// Rejects every later registration.
    pub fn seal(&self) {
        let mut state = self.state.lock();
        while state.loading {
            self.ready.wait(&mut state);
        }
        state.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.state.lock().sealed
    }

    pub fn is_ready(&self) -> bool {
        !self.state.lock().loading
    }

    /// Blocks until no load is in progress.
    pub fn wait_ready(&self) {
        let mut state = self.state.lock();
        while state.loading {
            self.ready.wait(&mut state);
        }
    }

    pub fn by_type(&self, type_id: TypeId) -> Option<Arc<FormattableType>> {
        self.tables.read().by_type.get(&type_id).cloned()
    }

    pub fn by_name(&self, class_name: &str) -> Vec<Arc<FormattableType>> {
        self.tables
            .read()
            .by_name
            .get(class_name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().by_name.keys().cloned().collect();
        names.sort();
        names
    }

    /// Members of the record registered first under `class_name`, in serialization order.
    pub fn describe(&self, class_name: &str) -> Result<Vec<MemberDescriptor>, Error> {
        let candidates = self.by_name(class_name);
        let descriptor = candidates
            .first()
            .ok_or_else(|| Error::unknown_class(class_name.to_string()))?;
        descriptor.members()
    }

    pub fn len(&self) -> usize {
        self.tables.read().by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Descriptor used to write `R`: its own registration, or the registration of
    /// another instantiation of the same generic definition.
    pub fn descriptor_for<R: Record>(&self) -> Result<Arc<FormattableType>, Error> {
        let tables = self.tables.read();
        if let Some(descriptor) = tables.by_type.get(&TypeId::of::<R>()) {
            return Ok(descriptor.clone());
        }
        tables
            .by_definition
            .get(R::graph_definition())
            .and_then(|list| list.first().cloned())
            .ok_or_else(|| {
                Error::unsupported(format!("type {} is not registered", type_name::<R>()))
            })
    }

    /// Descriptor used to read a node recorded as `class_name` into a slot of type `R`:
    /// exact class name and type first, then class name and same generic definition.
    pub fn resolve_record<R: Record>(
        &self,
        class_name: &str,
    ) -> Result<Arc<FormattableType>, Error> {
        let tables = self.tables.read();
        let candidates = tables
            .by_name
            .get(class_name)
            .ok_or_else(|| Error::unknown_class(class_name.to_string()))?;
        if let Some(exact) = candidates
            .iter()
            .find(|t| t.type_id() == TypeId::of::<R>())
        {
            return Ok(exact.clone());
        }
        candidates
            .iter()
            .find(|t| t.definition() == R::graph_definition())
            .cloned()
            .ok_or_else(|| Error::type_mismatch(type_name::<R>(), class_name.to_string()))
    }
}

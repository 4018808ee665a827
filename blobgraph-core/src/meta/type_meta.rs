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

//! Record model: member descriptors, per-instantiation layouts and type descriptors.

use crate::error::Error;
use crate::path::{is_valid_segment, NodePath};
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::Harness;
use crate::serializer::{is_inline, read_node, write_node, Formattable, Record};
use crate::types::TypeDescriptor;
use parking_lot::RwLock;
use std::any::{type_name, Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Bound get/set access to one member of a record `R`.
pub trait ValueAccess<R>: Send + Sync {
    fn type_name(&self) -> &'static str;

    /// Category and element types of the member's declared type.
    fn descriptor(&self) -> TypeDescriptor;

    /// Whether the member is stored as text in the record's attribute map.
    fn is_inline(&self) -> bool;

    fn to_text(&self, record: &R) -> Result<Option<String>, Error>;

    fn from_text(&self, record: &mut R, text: Option<&str>) -> Result<(), Error>;

    fn write(
        &self,
        record: &R,
        context: &mut WriteContext<'_>,
        path: &NodePath,
    ) -> Result<(), Error>;

    fn read(
        &self,
        record: &mut R,
        context: &mut ReadContext<'_>,
        path: &NodePath,
    ) -> Result<(), Error>;
}

/// Accessor for a field of type `F` reached through plain borrows.
pub struct FieldAccessor<R, F> {
    get: fn(&R) -> &F,
    get_mut: fn(&mut R) -> &mut F,
}

impl<R, F> FieldAccessor<R, F> {
    pub fn new(get: fn(&R) -> &F, get_mut: fn(&mut R) -> &mut F) -> Self {
        FieldAccessor { get, get_mut }
    }
}

impl<R: 'static, F: Formattable> ValueAccess<R> for FieldAccessor<R, F> {
    fn type_name(&self) -> &'static str {
        type_name::<F>()
    }

    fn descriptor(&self) -> TypeDescriptor {
        F::graph_descriptor()
    }

    fn is_inline(&self) -> bool {
        is_inline::<F>()
    }

    fn to_text(&self, record: &R) -> Result<Option<String>, Error> {
        (self.get)(record).graph_to_text()
    }

    fn from_text(&self, record: &mut R, text: Option<&str>) -> Result<(), Error> {
        *(self.get_mut)(record) = F::graph_from_text(text)?;
        Ok(())
    }

    fn write(
        &self,
        record: &R,
        context: &mut WriteContext<'_>,
        path: &NodePath,
    ) -> Result<(), Error> {
        write_node((self.get)(record), context, path)
    }

    fn read(
        &self,
        record: &mut R,
        context: &mut ReadContext<'_>,
        path: &NodePath,
    ) -> Result<(), Error> {
        let value = read_node::<F>(context, path)?;
        *(self.get_mut)(record) = value;
        Ok(())
    }
}

/// Lifts an accessor of an embedded base record `B` onto the derived record `R`.
pub struct BaseAccessor<R, B> {
    get: fn(&R) -> &B,
    get_mut: fn(&mut R) -> &mut B,
    inner: Box<dyn ValueAccess<B>>,
}

impl<R: 'static, B: 'static> ValueAccess<R> for BaseAccessor<R, B> {
    fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }

    fn descriptor(&self) -> TypeDescriptor {
        self.inner.descriptor()
    }

    fn is_inline(&self) -> bool {
        self.inner.is_inline()
    }

    fn to_text(&self, record: &R) -> Result<Option<String>, Error> {
        self.inner.to_text((self.get)(record))
    }

    fn from_text(&self, record: &mut R, text: Option<&str>) -> Result<(), Error> {
        self.inner.from_text((self.get_mut)(record), text)
    }

    fn write(
        &self,
        record: &R,
        context: &mut WriteContext<'_>,
        path: &NodePath,
    ) -> Result<(), Error> {
        self.inner.write((self.get)(record), context, path)
    }

    fn read(
        &self,
        record: &mut R,
        context: &mut ReadContext<'_>,
        path: &NodePath,
    ) -> Result<(), Error> {
        self.inner.read((self.get_mut)(record), context, path)
    }
}

/// One serialized member of a record: key, ordering key, optional flag and accessor.
pub struct FormattableValue<R> {
    name: Cow<'static, str>,
    order: i32,
    optional: bool,
    access: Box<dyn ValueAccess<R>>,
}

impl<R: 'static> FormattableValue<R> {
    pub fn field<F: Formattable>(
        name: &'static str,
        get: fn(&R) -> &F,
        get_mut: fn(&mut R) -> &mut F,
    ) -> Self {
        FormattableValue {
            name: Cow::Borrowed(name),
            order: 0,
            optional: false,
            access: Box::new(FieldAccessor::new(get, get_mut)),
        }
    }

    /// Wraps any accessor, for members that are not plain fields.
    pub fn custom<S: Into<Cow<'static, str>>>(name: S, access: Box<dyn ValueAccess<R>>) -> Self {
        FormattableValue {
            name: name.into(),
            order: 0,
            optional: false,
            access,
        }
    }

    /// Members of the base record `B` embedded in `R`, lifted in their own order.
    pub fn inherit<B: Record>(get: fn(&R) -> &B, get_mut: fn(&mut R) -> &mut B) -> Vec<Self> {
        B::graph_values()
            .into_iter()
            .map(|value| FormattableValue {
                name: value.name,
                order: value.order,
                optional: value.optional,
                access: Box::new(BaseAccessor {
                    get,
                    get_mut,
                    inner: value.access,
                }),
            })
            .collect()
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn access(&self) -> &dyn ValueAccess<R> {
        self.access.as_ref()
    }

    pub fn describe(&self) -> MemberDescriptor {
        MemberDescriptor {
            name: self.name.to_string(),
            optional: self.optional,
            descriptor: self.access.descriptor(),
        }
    }
}

impl<R: 'static> std::fmt::Debug for FormattableValue<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormattableValue")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("optional", &self.optional)
            .field("type", &self.access.type_name())
            .finish()
    }
}

/// Built metadata of one concrete record type: factory plus sorted members.
pub struct RecordLayout<R> {
    values: Vec<FormattableValue<R>>,
    factory: fn() -> R,
}

impl<R: Record> RecordLayout<R> {
    pub fn build() -> Result<Self, Error> {
        let mut values: Vec<FormattableValue<R>> = Vec::new();
        for value in R::graph_values() {
            if !is_valid_segment(value.name()) {
                return Err(Error::config(format!(
                    "member key `{}` of {} cannot be used as a path segment",
                    value.name(),
                    type_name::<R>()
                )));
            }
            // base members come first, so the base declaration of a key governs
            if let Some(existing) = values.iter().find(|v| v.name() == value.name()) {
                debug!(
                    key = existing.name(),
                    record = type_name::<R>(),
                    "redeclared member ignored in favour of the base declaration"
                );
                continue;
            }
            values.push(value);
        }
        values.sort_by_key(|v| v.order);
        Ok(RecordLayout {
            values,
            factory: R::graph_factory,
        })
    }
}

impl<R: 'static> RecordLayout<R> {
    pub fn values(&self) -> &[FormattableValue<R>] {
        &self.values
    }

    pub fn create(&self) -> R {
        (self.factory)()
    }

    /// Members in serialization order.
    pub fn describe(&self) -> Vec<MemberDescriptor> {
        self.values.iter().map(FormattableValue::describe).collect()
    }
}

/// A member of a registered record as the classifier sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberDescriptor {
    pub name: String,
    pub optional: bool,
    pub descriptor: TypeDescriptor,
}

/// Registered record descriptor: one per declared type definition and name.
///
/// Layouts are built lazily per concrete instantiation and cached for the lifetime of
/// the descriptor.
pub struct FormattableType {
    name: String,
    definition: &'static str,
    type_id: TypeId,
    type_name: &'static str,
    harness: Harness,
    layouts: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl FormattableType {
    pub fn new<R: Record>(name: impl Into<String>) -> Self {
        FormattableType {
            name: name.into(),
            definition: R::graph_definition(),
            type_id: TypeId::of::<R>(),
            type_name: type_name::<R>(),
            harness: Harness::of::<R>(),
            layouts: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definition(&self) -> &'static str {
        self.definition
    }

    /// `TypeId` of the instantiation this descriptor was registered with.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    pub fn built_layouts(&self) -> usize {
        self.layouts.read().len()
    }

    /// Members of the registered instantiation, building its layout if needed.
    pub fn members(&self) -> Result<Vec<MemberDescriptor>, Error> {
        (self.harness.get_describe_fn())(self)
    }

    /// Layout of the instantiation `R`, built on first use.
    pub fn layout<R: Record>(&self) -> Result<Arc<RecordLayout<R>>, Error> {
        if R::graph_definition() != self.definition {
            return Err(Error::config(format!(
                "{} is not an instantiation of `{}`",
                type_name::<R>(),
                self.definition
            )));
        }
        let key = TypeId::of::<R>();
        let cached = self.layouts.read().get(&key).cloned();
        let erased = match cached {
            Some(layout) => layout,
            None => {
                let built: Arc<dyn Any + Send + Sync> = Arc::new(RecordLayout::<R>::build()?);
                debug!(class = %self.name, ty = type_name::<R>(), "record layout built");
                self.layouts.write().entry(key).or_insert(built).clone()
            }
        };
        erased.downcast::<RecordLayout<R>>().map_err(|_| {
            Error::config(format!("cached layout of {} has the wrong type", type_name::<R>()))
        })
    }
}

impl std::fmt::Debug for FormattableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormattableType")
            .field("name", &self.name)
            .field("definition", &self.definition)
            .field("type_name", &self.type_name)
            .finish()
    }
}

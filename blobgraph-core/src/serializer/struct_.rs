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

//! Write and read algorithms for user records.
//!
//! A record is one node. Inline members (primitives) become attributes of its metadata;
//! every other member becomes a child node at `<path><key>/`. The metadata blob is
//! emitted last, after the members and the serialized hook.

use crate::error::Error;
use crate::meta::{FormattableValue, MetaRecord};
use crate::path::{BlobKind, NodePath};
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{expect_value_node, Record};
use std::any::type_name;
use tracing::warn;

/// Whether a failure on `value` is dropped instead of failing the whole call.
#[inline]
fn tolerated<R: 'static>(value: &FormattableValue<R>, strict: bool, err: &Error) -> bool {
    value.is_optional() && !strict && err.is_recoverable()
}

pub fn write_record<R: Record>(
    record: &R,
    context: &mut WriteContext<'_>,
    path: &NodePath,
) -> Result<(), Error> {
    let descriptor = context.get_registry().descriptor_for::<R>()?;
    let layout = descriptor.layout::<R>()?;
    let strict = context.get_config().is_strict_optional();
    record.on_serializing();

    let mut meta = MetaRecord::new(descriptor.name());
    for value in layout.values() {
        let access = value.access();
        let checkpoint = context.checkpoint();
        let result = if access.is_inline() {
            access
                .to_text(record)
                .map(|text| meta.insert(value.name(), text))
        } else {
            access.write(record, context, &path.child(value.name()))
        };
        if let Err(err) = result {
            if !tolerated(value, strict, &err) {
                return Err(err);
            }
            context.rollback(checkpoint);
            warn!(
                path = %path,
                member = value.name(),
                error = %err,
                "optional member dropped while writing"
            );
        }
    }
    record.on_serialized();
    context.write_meta(path, &meta)
}

pub fn read_record<R: Record>(
    context: &mut ReadContext<'_>,
    path: &NodePath,
) -> Result<R, Error> {
    let meta = context.meta(path)?;
    expect_value_node(&meta, path, type_name::<R>())?;
    let descriptor = context
        .get_registry()
        .resolve_record::<R>(meta.class_name())?;
    let layout = descriptor.layout::<R>()?;
    let strict = context.get_config().is_strict_optional();

    let mut record = layout.create();
    record.on_deserializing();
    for value in layout.values() {
        let access = value.access();
        let checkpoint = context.checkpoint();
        let result = if access.is_inline() {
            match meta.get(value.name()) {
                Some(text) => access
                    .from_text(&mut record, text)
                    .map_err(|e| e.at_path(path.as_str())),
                None => Err(Error::missing_field(
                    value.name().to_string(),
                    path.to_string(),
                )),
            }
        } else {
            let child = path.child(value.name());
            if context.has_blob(&child, BlobKind::Info) {
                access.read(&mut record, context, &child)
            } else {
                Err(Error::missing_field(
                    value.name().to_string(),
                    path.to_string(),
                ))
            }
        };
        if let Err(err) = result {
            if !tolerated(value, strict, &err) {
                return Err(err);
            }
            context.rollback(checkpoint);
            warn!(
                path = %path,
                member = value.name(),
                error = %err,
                "optional member left at its default while reading"
            );
        }
    }
    record.on_deserialized();
    Ok(record.substitute())
}

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

//! Parsing of `#[graph(...)]` attributes.
//!
//! Field attributes:
//! - `rename = "Key"`: member key used in paths and attribute maps (default: field name)
//! - `order = N`: ordering key; members are stable-sorted by it (default: 0)
//! - `optional`: failures while writing or reading the member are dropped
//! - `skip`: the member is not serialized and keeps its factory value
//! - `base`: the field embeds a base record whose members are inherited
//!
//! Container attributes:
//! - `name = "Class"`: class identifier used when registering without a name
//! - `factory = "path::to::fn"`: constructor used instead of `Default::default`
//! - `hooks`: the type implements `RecordHooks` itself

use crate::util::is_valid_key;
use syn::spanned::Spanned;
use syn::{Attribute, Field, LitInt, LitStr, Variant};

/// Parsed `#[graph(...)]` attributes of a struct field.
#[derive(Debug, Clone, Default)]
pub struct GraphFieldMeta {
    pub rename: Option<String>,
    pub order: i32,
    pub optional: bool,
    pub skip: bool,
    pub base: bool,
}

impl GraphFieldMeta {
    /// Member key: the rename if given, otherwise the field identifier.
    pub fn key(&self, field: &Field) -> String {
        match (&self.rename, &field.ident) {
            (Some(rename), _) => rename.clone(),
            (None, Some(ident)) => ident.to_string().trim_start_matches("r#").to_string(),
            (None, None) => String::new(),
        }
    }
}

/// Parsed `#[graph(...)]` attributes of the deriving type.
#[derive(Debug, Clone, Default)]
pub struct GraphContainerMeta {
    pub name: Option<String>,
    pub factory: Option<syn::Path>,
    pub hooks: bool,
}

fn graph_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("graph"))
}

fn parse_key(lit: &LitStr) -> syn::Result<String> {
    let value = lit.value();
    if !is_valid_key(&value) {
        return Err(syn::Error::new(
            lit.span(),
            "member key must be non-empty and must not contain `/`",
        ));
    }
    Ok(value)
}

pub fn parse_field_meta(field: &Field) -> syn::Result<GraphFieldMeta> {
    let mut meta = GraphFieldMeta::default();
    for attr in graph_attrs(&field.attrs) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("rename") {
                let lit: LitStr = nested.value()?.parse()?;
                meta.rename = Some(parse_key(&lit)?);
            } else if nested.path.is_ident("order") {
                let lit: LitInt = nested.value()?.parse()?;
                meta.order = lit.base10_parse()?;
            } else if nested.path.is_ident("optional") {
                meta.optional = true;
            } else if nested.path.is_ident("skip") {
                meta.skip = true;
            } else if nested.path.is_ident("base") {
                meta.base = true;
            } else {
                return Err(nested.error("unknown graph field attribute"));
            }
            Ok(())
        })?;
    }
    if meta.base && (meta.rename.is_some() || meta.optional || meta.skip || meta.order != 0) {
        return Err(syn::Error::new(
            field.span(),
            "`base` cannot be combined with other graph attributes",
        ));
    }
    Ok(meta)
}

pub fn parse_container_meta(attrs: &[Attribute]) -> syn::Result<GraphContainerMeta> {
    let mut meta = GraphContainerMeta::default();
    for attr in graph_attrs(attrs) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("name") {
                let lit: LitStr = nested.value()?.parse()?;
                meta.name = Some(parse_key(&lit)?);
            } else if nested.path.is_ident("factory") {
                let lit: LitStr = nested.value()?.parse()?;
                if meta.factory.is_some() {
                    return Err(syn::Error::new(
                        lit.span(),
                        "a record can designate only one factory",
                    ));
                }
                meta.factory = Some(lit.parse()?);
            } else if nested.path.is_ident("hooks") {
                meta.hooks = true;
            } else {
                return Err(nested.error("unknown graph container attribute"));
            }
            Ok(())
        })?;
    }
    Ok(meta)
}

/// Text written for an enum variant: its `rename`, or its identifier.
pub fn parse_variant_name(variant: &Variant) -> syn::Result<String> {
    let mut name = variant.ident.to_string();
    for attr in graph_attrs(&variant.attrs) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("rename") {
                let lit: LitStr = nested.value()?.parse()?;
                name = lit.value();
                Ok(())
            } else {
                Err(nested.error("unknown graph variant attribute"))
            }
        })?;
    }
    Ok(name)
}

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

//! Code generation for records (named structs).

use crate::object::field_meta::{parse_container_meta, parse_field_meta, GraphContainerMeta};
use crate::util::add_formattable_bounds;
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::HashSet;
use syn::spanned::Spanned;
use syn::{DataStruct, DeriveInput, Fields};

fn gen_values(data: &DataStruct) -> syn::Result<TokenStream> {
    let fields = match &data.fields {
        Fields::Named(named) => &named.named,
        other => {
            return Err(syn::Error::new(
                other.span(),
                "Formattable records need named fields",
            ))
        }
    };

    let mut bases = Vec::new();
    let mut own = Vec::new();
    let mut keys = HashSet::new();
    for field in fields {
        let meta = parse_field_meta(field)?;
        if meta.skip {
            continue;
        }
        let ident = &field.ident;
        let ty = &field.ty;
        if meta.base {
            bases.push(quote! {
                values.extend(::blobgraph_core::meta::FormattableValue::<Self>::inherit::<#ty>(
                    |r| &r.#ident,
                    |r| &mut r.#ident,
                ));
            });
            continue;
        }
        let key = meta.key(field);
        if !keys.insert(key.clone()) {
            return Err(syn::Error::new(
                field.span(),
                format!("member key `{key}` is declared twice"),
            ));
        }
        let order = meta.order;
        let optional = meta.optional;
        own.push(quote! {
            values.push(
                ::blobgraph_core::meta::FormattableValue::<Self>::field::<#ty>(
                    #key,
                    |r| &r.#ident,
                    |r| &mut r.#ident,
                )
                .with_order(#order)
                .with_optional(#optional),
            );
        });
    }

    Ok(quote! {
        #[allow(unused_mut)]
        let mut values: ::std::vec::Vec<::blobgraph_core::meta::FormattableValue<Self>> =
            ::std::vec::Vec::new();
        #(#bases)*
        #(#own)*
        values
    })
}

pub fn derive_record(ast: &DeriveInput, data: &DataStruct) -> syn::Result<TokenStream> {
    let GraphContainerMeta {
        name: class_name,
        factory,
        hooks,
    } = parse_container_meta(&ast.attrs)?;
    let name = &ast.ident;
    let class_name = class_name.unwrap_or_else(|| name.to_string());
    let generics = add_formattable_bounds(&ast.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let values = gen_values(data)?;
    let factory = match factory {
        Some(path) => quote! { #path() },
        None => quote! { <Self as ::std::default::Default>::default() },
    };
    let hooks_impl = if hooks {
        quote! {}
    } else {
        quote! {
            impl #impl_generics ::blobgraph_core::serializer::RecordHooks
                for #name #ty_generics #where_clause {}
        }
    };

    Ok(quote! {
        impl #impl_generics ::blobgraph_core::serializer::Formattable
            for #name #ty_generics #where_clause
        {
            #[inline(always)]
            fn graph_category() -> ::blobgraph_core::types::Category {
                ::blobgraph_core::types::Category::Record
            }

            fn graph_default() -> Self {
                <Self as ::blobgraph_core::serializer::Record>::graph_factory()
            }

            fn graph_write(
                &self,
                context: &mut ::blobgraph_core::resolver::context::WriteContext<'_>,
                path: &::blobgraph_core::path::NodePath,
            ) -> ::std::result::Result<(), ::blobgraph_core::error::Error> {
                ::blobgraph_core::serializer::struct_::write_record(self, context, path)
            }

            fn graph_read(
                context: &mut ::blobgraph_core::resolver::context::ReadContext<'_>,
                path: &::blobgraph_core::path::NodePath,
            ) -> ::std::result::Result<Self, ::blobgraph_core::error::Error> {
                ::blobgraph_core::serializer::struct_::read_record::<Self>(context, path)
            }
        }

        impl #impl_generics ::blobgraph_core::serializer::Record
            for #name #ty_generics #where_clause
        {
            fn graph_definition() -> &'static str {
                ::std::concat!(::std::module_path!(), "::", ::std::stringify!(#name))
            }

            fn graph_class_name() -> &'static str {
                #class_name
            }

            fn graph_values() -> ::std::vec::Vec<::blobgraph_core::meta::FormattableValue<Self>> {
                #values
            }

            fn graph_factory() -> Self {
                #factory
            }
        }

        #hooks_impl
    })
}

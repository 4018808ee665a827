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

//! Unit-only enums are primitives written as their variant name.

use crate::object::field_meta::parse_variant_name;
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::HashSet;
use syn::spanned::Spanned;
use syn::{DataEnum, DeriveInput, Fields};

pub fn derive_enum(ast: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let mut idents = Vec::new();
    let mut texts = Vec::new();
    let mut seen = HashSet::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "Formattable enums must be unit-only",
            ));
        }
        let text = parse_variant_name(variant)?;
        if !seen.insert(text.clone()) {
            return Err(syn::Error::new(
                variant.span(),
                format!("variant name `{text}` is used twice"),
            ));
        }
        idents.push(&variant.ident);
        texts.push(text);
    }
    let first = idents.first().ok_or_else(|| {
        syn::Error::new(ast.ident.span(), "Formattable enums need at least one variant")
    })?;

    Ok(quote! {
        impl #impl_generics ::blobgraph_core::serializer::Formattable
            for #name #ty_generics #where_clause
        {
            #[inline(always)]
            fn graph_category() -> ::blobgraph_core::types::Category {
                ::blobgraph_core::types::Category::Primitive(
                    ::blobgraph_core::types::PrimitiveKind::Enum,
                )
            }

            fn graph_default() -> Self {
                Self::#first
            }

            fn graph_write(
                &self,
                context: &mut ::blobgraph_core::resolver::context::WriteContext<'_>,
                path: &::blobgraph_core::path::NodePath,
            ) -> ::std::result::Result<(), ::blobgraph_core::error::Error> {
                ::blobgraph_core::serializer::write_primitive(self, context, path)
            }

            fn graph_read(
                context: &mut ::blobgraph_core::resolver::context::ReadContext<'_>,
                path: &::blobgraph_core::path::NodePath,
            ) -> ::std::result::Result<Self, ::blobgraph_core::error::Error> {
                ::blobgraph_core::serializer::read_primitive(context, path)
            }

            fn graph_to_text(
                &self,
            ) -> ::std::result::Result<
                ::std::option::Option<::std::string::String>,
                ::blobgraph_core::error::Error,
            > {
                let text = match self {
                    #( Self::#idents => #texts, )*
                };
                ::std::result::Result::Ok(::std::option::Option::Some(text.to_string()))
            }

            fn graph_from_text(
                text: ::std::option::Option<&str>,
            ) -> ::std::result::Result<Self, ::blobgraph_core::error::Error> {
                match text {
                    #( ::std::option::Option::Some(#texts) => ::std::result::Result::Ok(Self::#idents), )*
                    ::std::option::Option::Some(other) => ::std::result::Result::Err(
                        ::blobgraph_core::serializer::enum_::unknown_variant::<Self>(other),
                    ),
                    ::std::option::Option::None => ::std::result::Result::Err(
                        ::blobgraph_core::serializer::enum_::null_variant::<Self>(),
                    ),
                }
            }
        }
    })
}

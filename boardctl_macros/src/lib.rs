// This file is part of boardctl, an application to access registers and DMA regions of memory mapped hardware boards.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// boardctl is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// boardctl is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! Procedural macros for boardctl.
//!
//! `#[backend(kind = "...")]` is placed on a backend struct that has an associated
//! `fn open(descriptor: &DeviceDescriptor) -> Result<Self, BoardError>`. It generates a
//! `BACKEND_KIND` constant and a `register_backend()` function which adds the struct to the
//! backend registry under the given kind.

use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemStruct, LitStr, parse_macro_input};

#[proc_macro_attribute]
pub fn backend(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut kind: Option<LitStr> = None;
    let kind_parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("kind") {
            kind = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported backend property, expected `kind`"))
        }
    });
    parse_macro_input!(attr with kind_parser);
    let item = parse_macro_input!(item as ItemStruct);

    let Some(kind) = kind else {
        return syn::Error::new_spanned(&item.ident, "#[backend] requires `kind = \"...\"`")
            .to_compile_error()
            .into();
    };
    if kind.value().is_empty() {
        return syn::Error::new_spanned(&kind, "backend kind must not be empty")
            .to_compile_error()
            .into();
    }

    let ident = &item.ident;
    quote! {
        #item

        impl #ident {
            /// Descriptor kind this backend is registered under.
            pub const BACKEND_KIND: &'static str = #kind;

            fn construct_backend(
                descriptor: &crate::dmap::DeviceDescriptor,
            ) -> ::std::result::Result<
                ::std::boxed::Box<dyn crate::backends::backend::Device>,
                crate::error::BoardError,
            > {
                let device = #ident::open(descriptor)?;
                Ok(::std::boxed::Box::new(device))
            }

            /// Add this backend to the global backend registry.
            pub fn register_backend() {
                crate::backends::backend::register_backend(#kind, Self::construct_backend);
            }
        }
    }
    .into()
}

//! Record derive macro implementation

mod attrs;

use attrs::{Kind, get_field_attr, get_table_name};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let type_name = name.to_string();
    let table_name = get_table_name(&input)?.unwrap_or_else(|| type_name.to_lowercase());

    let mut descriptors = Vec::new();
    let mut params = Vec::new();
    let mut targets = Vec::new();

    for field in fields {
        let attr = get_field_attr(field)?;
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let Some(column) = attr.column else {
            if attr.primary_key || attr.computed.is_some() || attr.prefix.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "db attributes on an unmapped field, add `column = \"...\"`",
                ));
            }
            continue;
        };

        let field_name = ident.to_string();
        let mut descriptor = quote! { pgmap::FieldDescriptor::new(#field_name, #column) };
        if attr.primary_key {
            descriptor = quote! { #descriptor.primary_key() };
        }
        if let Some(expr) = &attr.computed {
            descriptor = quote! { #descriptor.computed(#expr) };
        }
        if let Some(prefix) = &attr.prefix {
            descriptor = quote! { #descriptor.prefix(#prefix) };
        }
        match attr.kind {
            Kind::Raw => {}
            Kind::Time => descriptor = quote! { #descriptor.kind(pgmap::ValueKind::Time) },
            Kind::Json => descriptor = quote! { #descriptor.kind(pgmap::ValueKind::Json) },
        }
        descriptors.push(descriptor);

        params.push(match attr.kind {
            Kind::Raw => quote! { pgmap::Param::borrowed(&self.#ident) },
            Kind::Time => quote! { pgmap::time_param(&self.#ident) },
            Kind::Json => quote! { pgmap::json_param(&self.#ident)? },
        });

        targets.push(match attr.kind {
            Kind::Json => quote! { pgmap::FieldTarget::Json(&mut self.#ident) },
            _ => quote! { pgmap::FieldTarget::Column(&mut self.#ident) },
        });
    }

    if descriptors.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "Record requires at least one field with #[db(column = \"...\")]",
        ));
    }

    Ok(quote! {
        impl #impl_generics pgmap::Record for #name #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;

            fn table_name() -> &'static str {
                #table_name
            }

            fn fields() -> &'static [pgmap::FieldDescriptor] {
                const FIELDS: &[pgmap::FieldDescriptor] = &[#(#descriptors),*];
                FIELDS
            }

            fn params(&self) -> pgmap::OrmResult<::std::vec::Vec<pgmap::Param<'_>>> {
                ::std::result::Result::Ok(::std::vec![#(#params),*])
            }

            fn targets(&mut self) -> ::std::vec::Vec<pgmap::FieldTarget<'_>> {
                ::std::vec![#(#targets),*]
            }
        }
    })
}

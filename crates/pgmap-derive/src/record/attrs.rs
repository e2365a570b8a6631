//! Attribute parsing for the Record derive macro.
//!
//! Handles struct-level and field-level `#[db(...)]` attributes.

use syn::{DeriveInput, Result};

/// How a field is bound, from `kind = "..."`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(super) enum Kind {
    Raw,
    Time,
    Json,
}

/// Parsed field-level `#[db(...)]` attribute.
pub(super) struct FieldAttr {
    pub column: Option<String>,
    pub primary_key: bool,
    pub computed: Option<String>,
    pub prefix: Option<String>,
    pub kind: Kind,
}

impl Default for FieldAttr {
    fn default() -> Self {
        Self {
            column: None,
            primary_key: false,
            computed: None,
            prefix: None,
            kind: Kind::Raw,
        }
    }
}

impl FieldAttr {
    /// Fold another `#[db(...)]` on the same field into this one.
    fn merge(&mut self, other: FieldAttr) {
        self.primary_key |= other.primary_key;
        if other.column.is_some() {
            self.column = other.column;
        }
        if other.computed.is_some() {
            self.computed = other.computed;
        }
        if other.prefix.is_some() {
            self.prefix = other.prefix;
        }
        if other.kind != Kind::Raw {
            self.kind = other.kind;
        }
    }
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        // Comma-separated `key = "value"` pairs or bare flags
        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;

            if ident == "pk" {
                attr.primary_key = true;
            } else {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitStr = input.parse()?;

                if ident == "column" {
                    attr.column = Some(value.value());
                } else if ident == "computed" {
                    attr.computed = Some(value.value());
                } else if ident == "prefix" {
                    attr.prefix = Some(value.value());
                } else if ident == "kind" {
                    attr.kind = match value.value().as_str() {
                        "time" => Kind::Time,
                        "json" => Kind::Json,
                        other => {
                            return Err(syn::Error::new_spanned(
                                &value,
                                format!("unknown kind `{other}`, expected \"time\" or \"json\""),
                            ));
                        }
                    };
                } else {
                    return Err(syn::Error::new_spanned(
                        &ident,
                        format!("unknown db attribute `{ident}`"),
                    ));
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        if !input.is_empty() {
            return Err(input.error("expected `,`"));
        }

        Ok(attr)
    }
}

/// Collect every `#[db(...)]` on a field.
pub(super) fn get_field_attr(field: &syn::Field) -> Result<FieldAttr> {
    let mut attr = FieldAttr::default();
    for a in &field.attrs {
        if a.path().is_ident("db") {
            attr.merge(a.parse_args::<FieldAttr>()?);
        }
    }
    Ok(attr)
}

/// Table name from struct-level `#[db(table = "...")]`, if present.
pub(super) fn get_table_name(input: &DeriveInput) -> Result<Option<String>> {
    let mut table = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("db") {
            continue;
        }
        let nested = attr.parse_args::<syn::MetaNameValue>()?;
        if !nested.path.is_ident("table") {
            return Err(syn::Error::new_spanned(
                &nested.path,
                "unknown db attribute on struct, expected `table`",
            ));
        }
        match &nested.value {
            syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(lit),
                ..
            }) => table = Some(lit.value()),
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "expected a string literal table name",
                ));
            }
        }
    }
    Ok(table)
}

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

/// Derive macro for the `Monomer` trait.
///
/// Works on structs with named fields. One field must hold the node's
/// `Backbone` (display name, children, dynamic attributes); it is found by
/// its type, or marked explicitly with `#[monomer(backbone)]`. Every other
/// field becomes a declared attribute, converted through `AttrValue`.
///
/// # Example
///
/// ```ignore
/// use dendrimer_core::{Backbone, Monomer};
///
/// #[derive(Debug, Default, Monomer)]
/// struct Person {
///     #[monomer(backbone)]
///     backbone: Backbone,
///     age: i64,
///     #[monomer(read_only)]
///     id: i64,
/// }
/// ```
///
/// # Attributes
///
/// Container level:
/// - `#[monomer(rename = "Tag")]` - type tag other than the struct name
/// - `#[monomer(crate = path)]` - crate path override for generated code
///
/// Field level:
/// - `#[monomer(backbone)]` - the backbone field
/// - `#[monomer(skip)]` - not an attribute at all
/// - `#[monomer(rename = "name")]` - attribute name other than the field name
/// - `#[monomer(read_only)]` - readable but rejects writes
#[proc_macro_derive(Monomer, attributes(monomer))]
pub fn derive_monomer(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_monomer_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_monomer_impl(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let container = parse_container_attrs(&input.attrs)?;
    let krate = container
        .crate_path
        .map(|p| quote! { #p })
        .unwrap_or_else(|| quote! { ::dendrimer_core });
    let type_tag = container.rename.unwrap_or_else(|| name.to_string());

    let fields = match &input.data {
        syn::Data::Struct(syn::DataStruct {
            fields: syn::Fields::Named(named),
            ..
        }) => &named.named,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Monomer can only be derived for structs with named fields",
            ));
        }
    };

    let backbone = find_backbone(fields)?;

    struct Attr<'a> {
        ident: &'a syn::Ident,
        ty: &'a syn::Type,
        name: String,
        writable: bool,
    }

    let mut attrs: Vec<Attr> = Vec::new();
    for field in fields {
        let ident = field.ident.as_ref().unwrap();
        if ident == backbone {
            continue;
        }
        let field_attrs = parse_field_attrs(&field.attrs)?;
        if field_attrs.skip {
            continue;
        }
        let name = field_attrs.rename.unwrap_or_else(|| ident.to_string());
        if name == "name" {
            return Err(syn::Error::new_spanned(
                field,
                "`name` is the reserved display-name key; rename this attribute",
            ));
        }
        attrs.push(Attr {
            ident,
            ty: &field.ty,
            name,
            writable: !field_attrs.read_only,
        });
    }

    let spec_entries = attrs.iter().map(|a| {
        let name = &a.name;
        let writable = a.writable;
        quote! { #krate::AttrSpec::new(#name, true, #writable) }
    });

    let get_arms = attrs.iter().map(|a| {
        let name = &a.name;
        let ident = a.ident;
        quote! { #name => Some(#krate::AttrValue::to_scalar(&self.#ident)), }
    });

    let set_arms = attrs.iter().map(|a| {
        let name = &a.name;
        let ident = a.ident;
        let ty = a.ty;
        if a.writable {
            quote! {
                #name => match <#ty as #krate::AttrValue>::from_scalar(&value) {
                    Some(converted) => {
                        self.#ident = converted;
                        Ok(())
                    }
                    None => Err(#krate::AttrError::TypeMismatch(name.to_string())),
                },
            }
        } else {
            quote! {
                #name => Err(#krate::AttrError::Unwritable(name.to_string())),
            }
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::Monomer for #name #ty_generics #where_clause {
            fn type_tag(&self) -> &str {
                #type_tag
            }

            fn name(&self) -> &str {
                self.#backbone.name()
            }

            fn set_name(&mut self, name: &str) {
                self.#backbone.set_name(name);
            }

            fn attributes(&self) -> ::std::vec::Vec<#krate::AttrSpec> {
                ::std::vec![#(#spec_entries),*]
            }

            fn get(&self, name: &str) -> ::std::option::Option<#krate::Scalar> {
                match name {
                    #(#get_arms)*
                    _ => self.#backbone.get_dynamic(name),
                }
            }

            fn set(
                &mut self,
                name: &str,
                value: #krate::Scalar,
            ) -> ::std::result::Result<(), #krate::AttrError> {
                match name {
                    #(#set_arms)*
                    _ => {
                        self.#backbone.set_dynamic(name, value);
                        Ok(())
                    }
                }
            }

            fn dynamic_attributes(&self) -> &#krate::IndexMap<::std::string::String, #krate::Scalar> {
                self.#backbone.dynamic_attributes()
            }

            fn children(&self) -> &[::std::boxed::Box<dyn #krate::Monomer>] {
                self.#backbone.children()
            }

            fn children_mut(
                &mut self,
            ) -> &mut ::std::vec::Vec<::std::boxed::Box<dyn #krate::Monomer>> {
                self.#backbone.children_mut()
            }

            fn attach(&mut self, child: ::std::boxed::Box<dyn #krate::Monomer>) {
                self.#backbone.attach(child);
            }
        }
    })
}

/// Locates the backbone field: an explicit `#[monomer(backbone)]` wins,
/// otherwise a single field whose type is named `Backbone`.
fn find_backbone(
    fields: &syn::punctuated::Punctuated<syn::Field, syn::Token![,]>,
) -> syn::Result<&syn::Ident> {
    let mut explicit = None;
    let mut by_type = None;

    for field in fields {
        let attrs = parse_field_attrs(&field.attrs)?;
        let ident = field.ident.as_ref().unwrap();
        if attrs.backbone {
            if explicit.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field can be the backbone",
                ));
            }
            explicit = Some(ident);
        }
        if is_backbone_type(&field.ty) {
            by_type = Some(ident);
        }
    }

    explicit.or(by_type).ok_or_else(|| {
        syn::Error::new(
            proc_macro2::Span::call_site(),
            "Monomer needs a Backbone field (mark it with #[monomer(backbone)])",
        )
    })
}

fn is_backbone_type(ty: &syn::Type) -> bool {
    if let syn::Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Backbone";
        }
    }
    false
}

#[derive(Default)]
struct ContainerAttrs {
    rename: Option<String>,
    crate_path: Option<syn::Path>,
}

fn parse_container_attrs(attrs: &[syn::Attribute]) -> syn::Result<ContainerAttrs> {
    let mut result = ContainerAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("monomer") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: syn::LitStr = meta.value()?.parse()?;
                result.rename = Some(value.value());
            } else if meta.path.is_ident("crate") {
                result.crate_path = Some(meta.value()?.parse()?);
            } else {
                return Err(meta.error("unknown container attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

#[derive(Default)]
struct FieldAttrs {
    backbone: bool,
    skip: bool,
    read_only: bool,
    rename: Option<String>,
}

fn parse_field_attrs(attrs: &[syn::Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("monomer") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("backbone") {
                result.backbone = true;
            } else if meta.path.is_ident("skip") {
                result.skip = true;
            } else if meta.path.is_ident("read_only") {
                result.read_only = true;
            } else if meta.path.is_ident("rename") {
                let value: syn::LitStr = meta.value()?.parse()?;
                result.rename = Some(value.value());
            } else {
                return Err(meta.error("unknown field attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

//! Derive macro for soa-store column signatures.
//!
//! `#[derive(Row)]` turns a struct into a `soa_store::Row`: each field becomes one
//! column, in declaration order, addressable as `column::<I>()`.
//!
//! ```ignore
//! #[derive(Clone, Copy, Row)]
//! struct Body { position: [f32; 3], velocity: [f32; 3], mass: f32 }
//!
//! let store = ColumnarStore::<Body>::new();
//! let masses: &[f32] = store.column::<2>();
//! ```
//!
//! # Field rules
//!
//! Every field type must be a `Component` (`Copy + Send + Sync + Zeroable +
//! 'static`); the compiler enforces that through generated bounds. On top of
//! that the derive rejects field types that are `Copy` but still wrong for
//! a column:
//!
//! - References (`&'static T`) - columns hold owned values.
//! - Raw pointers - rows move on every growth and swap-remove, so pointers
//!   into or between rows dangle. Store row indices instead.
//! - `PhantomData` - takes a column slot but carries no data.
//!
//! Enums, unions and field-less structs cannot be rows.

use proc_macro::TokenStream;
use quote::{quote, quote_spanned};
use syn::{
    Data, DeriveInput, Fields, GenericArgument, Member, PathArguments, Type, spanned::Spanned,
};

/// Derive macro for soa-store rows.
///
/// # Examples
///
/// ```ignore
/// #[derive(Clone, Copy, Row)]
/// struct Particle { position: [f32; 3], life: f32 }
///
/// #[derive(Clone, Copy, Row)]
/// struct Pair(u32, u32);
/// ```
#[proc_macro_derive(Row)]
pub fn derive_row(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(errors) => TokenStream::from(errors.into_iter().collect::<proc_macro2::TokenStream>()),
    }
}

fn expand(input: &DeriveInput) -> Result<proc_macro2::TokenStream, Vec<proc_macro2::TokenStream>> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(_) => {
            return Err(vec![quote_spanned! {
                input.span() =>
                compile_error!("Enums cannot derive Row. A row is a struct with one field per column.");
            }]);
        }
        Data::Union(_) => {
            return Err(vec![quote_spanned! {
                input.span() =>
                compile_error!("Unions cannot derive Row. Use a struct instead.");
            }]);
        }
    };

    let columns: Vec<(Member, &Type)> = match fields {
        Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|f| f.ident.clone().map(|ident| (Member::Named(ident), &f.ty)))
            .collect(),
        Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .map(|(i, f)| (Member::Unnamed(i.into()), &f.ty))
            .collect(),
        Fields::Unit => Vec::new(),
    };

    if columns.is_empty() {
        return Err(vec![quote_spanned! {
            input.span() =>
            compile_error!("Row needs at least one field. Each field becomes a column.");
        }]);
    }

    let mut errors = Vec::new();
    for (_, ty) in &columns {
        check_type(ty, &mut errors);
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let count = columns.len();
    let members: Vec<&Member> = columns.iter().map(|(member, _)| member).collect();
    let types: Vec<&Type> = columns.iter().map(|(_, ty)| *ty).collect();
    let indices: Vec<syn::Index> = (0..count).map(syn::Index::from).collect();

    let mut generics = input.generics.clone();
    {
        let where_clause = generics.make_where_clause();
        for ty in &types {
            where_clause
                .predicates
                .push(syn::parse_quote!(#ty: ::soa_store::Component));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let column_at = indices.iter().zip(&types).map(|(index, ty)| {
        quote! {
            // SAFETY: field `#index` is column `#index`
            unsafe impl #impl_generics ::soa_store::ColumnAt<#index> for #name #ty_generics #where_clause {
                type Type = #ty;
            }
        }
    });

    Ok(quote! {
        const _: () = {
            // SAFETY: one layout per field in declaration order, and
            // write/read touch column `i` only as field `i`'s type
            unsafe impl #impl_generics ::soa_store::Row for #name #ty_generics #where_clause {
                const COLUMNS: usize = #count;

                fn layouts() -> ::soa_store::__private::SmallVec<[::soa_store::ColumnLayout; 8]> {
                    let mut layouts = ::soa_store::__private::SmallVec::new();
                    #( layouts.push(::soa_store::ColumnLayout::of::<#types>()); )*
                    layouts
                }

                #[inline]
                unsafe fn write(self, columns: &mut [::soa_store::AlignedColumn], index: usize) {
                    // SAFETY: forwarded from the caller
                    unsafe {
                        #( ::soa_store::row::write_column::<#types>(&mut columns[#indices], index, self.#members); )*
                    }
                }

                #[inline]
                unsafe fn read(columns: &[::soa_store::AlignedColumn], index: usize) -> Self {
                    // SAFETY: forwarded from the caller
                    unsafe {
                        Self {
                            #( #members: ::soa_store::row::read_column::<#types>(&columns[#indices], index), )*
                        }
                    }
                }
            }

            #( #column_at )*
        };
    })
}

fn check_type(ty: &Type, errors: &mut Vec<proc_macro2::TokenStream>) {
    match ty {
        Type::Path(type_path) => {
            if let Some(segment) = type_path.path.segments.last() {
                if segment.ident == "PhantomData" {
                    errors.push(quote_spanned! {
                        ty.span() =>
                        compile_error!("PhantomData fields would each take a column slot without storing data.\n\
                                       Put the marker on a wrapper type instead of the row.");
                    });
                    return;
                }

                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    for arg in &args.args {
                        if let GenericArgument::Type(inner) = arg {
                            check_type(inner, errors);
                        }
                    }
                }
            }
        }
        Type::Array(array) => check_type(&array.elem, errors),
        Type::Tuple(tuple) => {
            for elem in &tuple.elems {
                check_type(elem, errors);
            }
        }
        Type::Paren(paren) => check_type(&paren.elem, errors),
        Type::Group(group) => check_type(&group.elem, errors),
        Type::Reference(_) => {
            errors.push(quote_spanned! {
                ty.span() =>
                compile_error!("References are not allowed in rows. Columns store owned values.\n\
                               Use the actual type, not a reference to it.");
            });
        }
        Type::Ptr(_) => {
            errors.push(quote_spanned! {
                ty.span() =>
                compile_error!("Raw pointers are not allowed in rows.\n\
                               Rows are moved on growth and swap-remove, so pointers go stale.\n\
                               Store a row or chunk index instead.");
            });
        }
        Type::TraitObject(_) | Type::ImplTrait(_) => {
            errors.push(quote_spanned! {
                ty.span() =>
                compile_error!("Row fields must be concrete, sized component types.");
            });
        }
        _ => {}
    }
}

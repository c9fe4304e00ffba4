extern crate proc_macro2;

use proc_macro::TokenStream;
use quote::quote;

fn get_enum_variants(
    input: &syn::DeriveInput,
) -> &syn::punctuated::Punctuated<syn::Variant, syn::token::Comma> {
    let variants = match &input.data {
        syn::Data::Enum(enum_item) => &enum_item.variants,
        _ => panic!("Input must be an enum."),
    };

    assert!(
        variants.iter().all(|v| v.fields.is_empty()),
        "All variants must have no fields."
    );

    variants
}

#[proc_macro_derive(InteropGetName)]
pub fn interop_get_name_derive(input: TokenStream) -> TokenStream {
    let syn_item: syn::DeriveInput = syn::parse(input).unwrap();
    let name = &syn_item.ident;
    let variants = get_enum_variants(&syn_item);

    let variant_names = variants.iter().map(|v| {
        let mut name = v.ident.to_string().into_bytes();
        name.push(0);
        proc_macro2::Literal::byte_string(&name[..])
    });

    let expanded = quote! {
        impl InteropGetName for #name {
            fn interop_name(&self) -> &'static [u8] {
                const NAMES: &[&[u8]] = &[#(#variant_names),*];
                &NAMES[*self as usize]
            }
        }
    };
    expanded.into()
}

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitInt};

pub(crate) fn handle_derive_bit(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let offset = parse_offset(&input.attrs)?;

    // Collect variant idents in declared order
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            name,
            "Bit can be derived only for enums",
        ));
    };
    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Bit supports only fieldless enum variants",
            ));
        }
        variants.push(&variant.ident);
    }

    if offset as usize + variants.len() > 64 {
        return Err(syn::Error::new_spanned(
            name,
            "Bit supports at most 64 bits including the offset",
        ));
    }

    let arms = variants.iter().enumerate().map(|(i, v)| {
        let shift = offset + i as u32;
        quote! { #name::#v => 1u64 << #shift }
    });
    let all = variants
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, _)| acc | (1u64 << (offset + i as u32)));

    Ok(quote! {
        impl ::joystick_bit_mask::Bitable for #name {
            const VARIANTS: &'static [Self] = &[#( #name::#variants ),*];
            const ALL: u64 = #all;

            #[inline]
            fn bit(&self) -> u64 {
                match self { #( #arms, )* }
            }

            #[inline]
            fn index(&self) -> u32 { self.bit().trailing_zeros() }
        }
    })
}

/// Reads `#[bit(offset = N)]`, defaulting to 0.
fn parse_offset(attrs: &[Attribute]) -> syn::Result<u32> {
    let mut offset = 0u32;
    for attr in attrs {
        if !attr.path().is_ident("bit") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("offset") {
                let lit: LitInt = meta.value()?.parse()?;
                offset = lit.base10_parse()?;
                Ok(())
            } else {
                Err(meta.error("unsupported bit attribute"))
            }
        })?;
    }
    Ok(offset)
}

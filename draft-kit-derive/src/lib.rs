use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Error, Fields, LitStr, Result, parse_macro_input};

#[proc_macro_derive(FormField, attributes(field))]
pub fn derive_form_field(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_form_field(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_form_field(input: &DeriveInput) -> Result<proc_macro2::TokenStream> {
    let Data::Enum(data) = &input.data else {
        return Err(Error::new_spanned(
            &input.ident,
            "FormField can only be derived for enums",
        ));
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut variants = Vec::new();
    let mut keys = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(Error::new_spanned(
                variant,
                "FormField variants cannot carry data",
            ));
        }
        let key = find_field_key(&variant.attrs, &variant.ident)?;
        if let Some(previous) = keys.iter().find(|k: &&LitStr| k.value() == key.value()) {
            return Err(Error::new_spanned(
                &key,
                format!("duplicate field key `{}`", previous.value()),
            ));
        }
        variants.push(&variant.ident);
        keys.push(key);
    }

    Ok(quote! {
        impl #impl_generics draft_kit::FormField for #name #ty_generics #where_clause {
            const ALL: &'static [Self] = &[#(Self::#variants),*];

            fn key(&self) -> &'static str {
                match self {
                    #(Self::#variants => #keys,)*
                }
            }
        }
    })
}

fn find_field_key(attrs: &[Attribute], variant: &syn::Ident) -> Result<LitStr> {
    let attr = attrs
        .iter()
        .find(|attr| attr.path().is_ident("field"))
        .ok_or_else(|| Error::new_spanned(variant, "missing #[field(\"...\")] attribute"))?;

    let key = attr.parse_args::<LitStr>()?;
    if key.value().trim().is_empty() {
        return Err(Error::new_spanned(key, "field key cannot be empty"));
    }
    Ok(key)
}

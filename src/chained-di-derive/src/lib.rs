mod attrs;
mod impls;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use syn::Result as SynResult;

/// Implements `Component` for the type of an `impl` block whose constructor
/// is annotated with `#[inject]`.
///
/// `#[component]` exposes the type as itself, while `#[component(dyn Trait)]`
/// exposes it as the given service type. Constructor arguments are requested
/// with `get` by default, with `try_get` when annotated with `#[optional]`,
/// and with `get_all` when annotated with `#[collect]`.
#[proc_macro_attribute]
pub fn component(attr: TokenStream, item: TokenStream) -> TokenStream {
    match component_impl(attr, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn component_impl(attr: TokenStream, item: TokenStream) -> SynResult<TokenStream2> {
    let attr_data = attrs::parse_attributes(attr)?;
    let expanded = impls::expand_implementation(item, attr_data)?;
    Ok(expanded)
}

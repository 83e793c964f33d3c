use proc_macro::TokenStream;
use syn::{Error as SynError, Result as SynResult, Type};

#[derive(Debug)]
pub enum AttributeData {
    /// The component is exposed as itself.
    Default,
    /// The component is exposed as the given service type, e.g. `dyn Trait`.
    Service(Box<Type>),
}

pub fn parse_attributes(attr: TokenStream) -> SynResult<AttributeData> {
    if attr.is_empty() {
        return Ok(AttributeData::Default);
    }

    match syn::parse::<Type>(attr) {
        Ok(service) => Ok(AttributeData::Service(Box::new(service))),
        Err(err) => Err(SynError::new(
            err.span(),
            "expects the service type the component is exposed as, e.g. `#[component(dyn Trait)]`",
        )),
    }
}

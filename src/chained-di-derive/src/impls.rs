use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{quote, ToTokens};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::token::Comma;
use syn::visit_mut::{self, VisitMut};
use syn::{
    AngleBracketedGenericArguments, Attribute, Error as SynError, FnArg, GenericArgument, Ident,
    ImplItem, ImplItemFn, ItemImpl, Meta, Path, PathArguments, Result as SynResult, ReturnType,
    Signature, Type, TypePath,
};

use crate::attrs::AttributeData;

const RETURN_TYPE_MESSAGE: &str = "a constructor's return type should be `Self` or `Result<Self, E>`";

#[derive(Debug)]
struct ConstructorData {
    self_type: TypePath,
    identifier: Ident,
    arguments: Vec<ArgumentData>,
    return_type: ReturnTypeData,
}

#[derive(Debug)]
struct ArgumentData {
    span: Span,
    request: RequestData,
}

#[derive(Debug)]
enum RequestData {
    Required,
    Optional,
    Collect,
}

#[derive(Debug)]
enum ReturnTypeData {
    Infallible,
    Result { error_type: TypePath },
}

struct AttributeRemovalVisitor;

impl AttributeRemovalVisitor {
    fn is_custom_attribute(attr: &Attribute) -> bool {
        let name = first_ident(attr.meta.path());
        ["inject", "optional", "collect"]
            .iter()
            .any(|custom| name.is_some_and(|name| name == custom))
    }
}

impl VisitMut for AttributeRemovalVisitor {
    fn visit_attributes_mut(&mut self, attrs: &mut Vec<Attribute>) {
        attrs.retain(|attr| !Self::is_custom_attribute(attr));
        attrs
            .iter_mut()
            .for_each(|attr| visit_mut::visit_attribute_mut(self, attr));
    }
}

fn first_ident(path: &Path) -> Option<&Ident> {
    path.segments.first().map(|segment| &segment.ident)
}

pub fn expand_implementation(
    impls: TokenStream,
    attr_data: AttributeData,
) -> SynResult<TokenStream2> {
    let mut impls = match syn::parse::<ItemImpl>(impls) {
        Ok(impls) => impls,
        Err(err) => {
            return Err(SynError::new(
                err.span(),
                "`#[component]` should be annotated on the `impl` block",
            ))
        }
    };

    if let Some((_, path, _)) = &impls.trait_ {
        return Err(SynError::new(
            path.span(),
            "`#[component]` should be annotated on an inherent `impl` block",
        ));
    }

    let self_type = get_self_type(&impls)?;
    let signature = get_constructor_signature(&impls.items, impls.span())?;
    let ctor_data = parse_constructor(self_type, signature)?;

    let expanded = expand_component_implementation(ctor_data, attr_data);

    let mut visitor = AttributeRemovalVisitor;
    visitor.visit_item_impl_mut(&mut impls);

    Ok(quote! {
        #impls
        #expanded
    })
}

fn get_self_type(impls: &ItemImpl) -> SynResult<TypePath> {
    if let Type::Path(ty) = impls.self_ty.as_ref() {
        Ok(ty.clone())
    } else {
        Err(SynError::new(impls.self_ty.span(), "invalid self type"))
    }
}

fn get_constructor_signature(items: &[ImplItem], impl_span: Span) -> SynResult<Signature> {
    let ctors: Vec<_> = items
        .iter()
        .filter_map(filter_and_map_item_fn)
        .filter(is_annotated_with_inject)
        .collect();

    let signature = match ctors.as_slice() {
        [ctor] => ctor.sig.clone(),
        [] => {
            return Err(SynError::new(
                impl_span,
                "no associated function is annotated with `#[inject]`",
            ))
        }
        _ => {
            return Err(SynError::new(
                impl_span,
                "only one associated function can be annotated with `#[inject]`",
            ))
        }
    };

    if let Some(FnArg::Receiver(rec)) = signature.inputs.first() {
        return Err(SynError::new(
            rec.span(),
            "method is not allowed to be annotated with `#[inject]`",
        ));
    }

    if let Some(asyncness) = &signature.asyncness {
        return Err(SynError::new(
            asyncness.span(),
            "a constructor annotated with `#[inject]` can't be `async`",
        ));
    }

    Ok(signature)
}

fn filter_and_map_item_fn(item: &ImplItem) -> Option<&ImplItemFn> {
    if let ImplItem::Fn(impl_fn) = item {
        Some(impl_fn)
    } else {
        None
    }
}

fn is_annotated_with_inject(item_fn: &&ImplItemFn) -> bool {
    item_fn.attrs.iter().any(|attr| {
        let content = attr.meta.to_token_stream().to_string();
        &content == "inject"
    })
}

fn parse_constructor(self_type: TypePath, signature: Signature) -> SynResult<ConstructorData> {
    let identifier = signature.ident;
    let arguments = parse_constructor_arguments(signature.inputs)?;
    let return_type = parse_constructor_return_type(signature.output, &self_type)?;

    Ok(ConstructorData {
        self_type,
        identifier,
        arguments,
        return_type,
    })
}

fn parse_constructor_arguments(inputs: Punctuated<FnArg, Comma>) -> SynResult<Vec<ArgumentData>> {
    inputs
        .into_iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(arg) => Some(arg),
            FnArg::Receiver(_) => None,
        })
        .map(|arg| {
            let span = arg.span();
            parse_argument_attributes(arg.attrs).map(|request| ArgumentData { span, request })
        })
        .collect()
}

fn parse_argument_attributes(attrs: Vec<Attribute>) -> SynResult<RequestData> {
    let mut res = None;

    for attr in attrs {
        let span = attr.span();
        let Some(name) = first_ident(attr.meta.path()).map(ToString::to_string) else {
            continue;
        };

        let data = match name.as_str() {
            "optional" => RequestData::Optional,
            "collect" => RequestData::Collect,
            _ => continue,
        };

        if !matches!(attr.meta, Meta::Path(_)) {
            return Err(SynError::new(
                span,
                format!("`#[{name}]` doesn't receive any argument"),
            ));
        }

        if res.is_some() {
            return Err(SynError::new(
                span,
                "only one attribute of `#[optional]` or `#[collect]` is allowed",
            ));
        }
        res = Some(data);
    }

    Ok(res.unwrap_or(RequestData::Required))
}

fn parse_constructor_return_type(
    output: ReturnType,
    self_type: &TypePath,
) -> SynResult<ReturnTypeData> {
    let ReturnType::Type(_, return_type) = output else {
        return Err(SynError::new(output.span(), RETURN_TYPE_MESSAGE));
    };
    let Type::Path(return_type) = *return_type else {
        return Err(SynError::new(return_type.span(), RETURN_TYPE_MESSAGE));
    };

    let segments = &return_type.path.segments;
    let names: Vec<_> = segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect();

    if &return_type == self_type || names == ["Self"] {
        return Ok(ReturnTypeData::Infallible);
    }

    let is_result = names == ["Result"] || names == ["std", "result", "Result"];
    match segments.last() {
        Some(last) if is_result => parse_result_return_type(&last.arguments, self_type),
        _ => Err(SynError::new(return_type.span(), RETURN_TYPE_MESSAGE)),
    }
}

fn parse_result_return_type(
    type_args: &PathArguments,
    self_type: &TypePath,
) -> SynResult<ReturnTypeData> {
    let PathArguments::AngleBracketed(AngleBracketedGenericArguments {
        args: type_args, ..
    }) = type_args
    else {
        return Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE));
    };

    let mut args = type_args.iter();
    let (
        Some(GenericArgument::Type(Type::Path(first_type))),
        Some(GenericArgument::Type(Type::Path(error_type))),
        None,
    ) = (args.next(), args.next(), args.next())
    else {
        return Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE));
    };

    let is_self = first_type == self_type
        || (first_type.path.segments.len() == 1
            && first_ident(&first_type.path).is_some_and(|ident| ident == "Self"));

    if is_self {
        Ok(ReturnTypeData::Result {
            error_type: error_type.clone(),
        })
    } else {
        Err(SynError::new(first_type.span(), RETURN_TYPE_MESSAGE))
    }
}

fn expand_component_implementation(
    ctor_data: ConstructorData,
    attr_data: AttributeData,
) -> TokenStream2 {
    let self_type = &ctor_data.self_type;
    let constructor = &ctor_data.identifier;

    let associated_type_service = if let AttributeData::Service(service) = &attr_data {
        quote! { type Service = #service; }
    } else {
        quote! { type Service = #self_type; }
    };

    let associated_type_error =
        if let ReturnTypeData::Result { error_type } = &ctor_data.return_type {
            quote! { type Error = #error_type; }
        } else {
            quote! { type Error = ::std::convert::Infallible; }
        };

    let get_dep_statements = ctor_data
        .arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let dep = Ident::new(&format!("dep{i}"), arg.span);
            match &arg.request {
                RequestData::Required => quote! { let #dep = injector.get()?; },
                RequestData::Optional => quote! { let #dep = injector.try_get()?; },
                RequestData::Collect => quote! { let #dep = injector.get_all()?; },
            }
        })
        .collect::<TokenStream2>();

    let dep_args = ctor_data
        .arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let dep = Ident::new(&format!("dep{i}"), arg.span);
            quote! { #dep, }
        })
        .collect::<TokenStream2>();

    let wire_deps = if let ReturnTypeData::Infallible = &ctor_data.return_type {
        quote! { Ok(Ok(#self_type::#constructor(#dep_args))) }
    } else {
        quote! { Ok(#self_type::#constructor(#dep_args)) }
    };

    quote! {
        impl ::chained_di::strategy::component::Component for #self_type {
            #associated_type_service
            #associated_type_error

            fn construct<I>(injector: &I) -> ::std::result::Result<
                ::std::result::Result<Self, Self::Error>,
                ::chained_di::container::injector::InjectorError
            >
            where
                I: ::chained_di::container::injector::TypedInjector + ?Sized
            {
                #get_dep_statements
                #wire_deps
            }

            fn post_process(self) -> ::std::sync::Arc<Self::Service> {
                ::std::sync::Arc::new(self)
            }
        }
    }
}

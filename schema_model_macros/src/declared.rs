use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parenthesized, punctuated::Punctuated, Data, DeriveInput, Expr, Field, Fields, GenericArgument,
    LitBool, LitStr, Path, PathArguments, Token, Type,
};

pub fn derive_declared_model(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "DeclaredModel derive needs a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "DeclaredModel derive only supports structs",
            ))
        }
    };

    let settings = ModelSettings::from_input(input)?;
    let mut properties = Vec::new();
    for field in fields {
        if let Some(property) = PropertySpec::from_field(field)? {
            properties.push(property.to_tokens());
        }
    }

    let options = settings.options_tokens();
    let filters = settings.filters.as_ref().map(|path| {
        quote! {
            fn filters() -> ::schema_model::FilterRegistry {
                #path()
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::schema_model::DeclaredModel for #name #ty_generics #where_clause {
            fn schema() -> ::schema_model::Schema {
                ::schema_model::Schema::new()
                    #(#properties)*
            }

            fn options() -> ::schema_model::ModelOptions {
                #options
            }

            #filters
        }
    })
}

/// Struct-level `#[model(...)]` settings.
#[derive(Default)]
struct ModelSettings {
    strict: Option<bool>,
    throw_on_strict_error: Option<bool>,
    immutable: Option<bool>,
    return_empty_value: Option<bool>,
    use_getters: Option<bool>,
    use_setters: Option<bool>,
    name_strategy: Option<LitStr>,
    validators: Vec<Expr>,
    filters: Option<Path>,
}

impl ModelSettings {
    fn from_input(input: &DeriveInput) -> syn::Result<Self> {
        let mut settings = ModelSettings::default();
        for attr in &input.attrs {
            if !attr.path().is_ident("model") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("strict") {
                    settings.strict = Some(flag(&meta)?);
                } else if meta.path.is_ident("throw_on_strict_error") {
                    settings.throw_on_strict_error = Some(flag(&meta)?);
                } else if meta.path.is_ident("immutable") {
                    settings.immutable = Some(flag(&meta)?);
                } else if meta.path.is_ident("return_empty_value") {
                    settings.return_empty_value = Some(flag(&meta)?);
                } else if meta.path.is_ident("use_getters") {
                    settings.use_getters = Some(flag(&meta)?);
                } else if meta.path.is_ident("use_setters") {
                    settings.use_setters = Some(flag(&meta)?);
                } else if meta.path.is_ident("name_strategy") {
                    settings.name_strategy = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("validators") {
                    settings.validators.extend(expr_list(&meta)?);
                } else if meta.path.is_ident("filters") {
                    settings.filters = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("unsupported model setting"));
                }
                Ok(())
            })?;
        }
        Ok(settings)
    }

    fn options_tokens(&self) -> TokenStream2 {
        let mut calls = Vec::new();
        let flags = [
            ("strict", self.strict),
            ("throw_on_strict_error", self.throw_on_strict_error),
            ("immutable", self.immutable),
            ("return_empty_value", self.return_empty_value),
            ("use_getters", self.use_getters),
            ("use_setters", self.use_setters),
        ];
        for (setter, value) in flags {
            if let Some(value) = value {
                let setter = syn::Ident::new(setter, proc_macro2::Span::call_site());
                calls.push(quote! { .#setter(#value) });
            }
        }
        if let Some(strategy) = &self.name_strategy {
            calls.push(quote! { .name_strategy(#strategy) });
        }
        for validator in &self.validators {
            calls.push(quote! { .validator(#validator) });
        }
        quote! {
            ::schema_model::ModelOptions::default() #(#calls)*
        }
    }
}

/// Field-level `#[prop(...)]` settings.
struct PropertySpec {
    key: String,
    ty: Type,
    filter: Option<TokenStream2>,
    default: Option<TokenStream2>,
    computed: Vec<LitStr>,
    constraints: Vec<Expr>,
    validate: Option<Expr>,
    hidden: bool,
    groups: Vec<LitStr>,
}

impl PropertySpec {
    fn from_field(field: &Field) -> syn::Result<Option<Self>> {
        let Some(ident) = &field.ident else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };

        let mut spec = PropertySpec {
            key: ident.to_string(),
            ty: field.ty.clone(),
            filter: None,
            default: None,
            computed: Vec::new(),
            constraints: Vec::new(),
            validate: None,
            hidden: false,
            groups: Vec::new(),
        };
        let mut skip = false;

        for attr in &field.attrs {
            if !attr.path().is_ident("prop") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                } else if meta.path.is_ident("rename") {
                    let key: LitStr = meta.value()?.parse()?;
                    spec.key = key.value();
                } else if meta.path.is_ident("filter") {
                    let name: LitStr = meta.value()?.parse()?;
                    spec.set_filter(&meta, quote! { ::schema_model::Filter::from(#name) })?;
                } else if meta.path.is_ident("filter_fn") {
                    let path: Path = meta.value()?.parse()?;
                    spec.set_filter(&meta, quote! { ::schema_model::Filter::custom(#path) })?;
                } else if meta.path.is_ident("map") {
                    let path: Path = meta.value()?.parse()?;
                    spec.set_filter(&meta, quote! { ::schema_model::Filter::map(#path) })?;
                } else if meta.path.is_ident("model") {
                    let ty = &field.ty;
                    spec.set_filter(
                        &meta,
                        quote! {
                            ::schema_model::Filter::model(::schema_model::ModelFactory::of::<#ty>())
                        },
                    )?;
                } else if meta.path.is_ident("default") {
                    let value: Expr = meta.value()?.parse()?;
                    spec.default = Some(quote! { .value(#value) });
                } else if meta.path.is_ident("default_fn") {
                    let path: Path = meta.value()?.parse()?;
                    spec.default = Some(quote! {
                        .value_with(|| ::core::convert::Into::<::schema_model::serde_json::Value>::into(#path()))
                    });
                } else if meta.path.is_ident("computed") {
                    let content;
                    parenthesized!(content in meta.input);
                    let deps = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
                    spec.computed.extend(deps);
                } else if meta.path.is_ident("constraints") {
                    spec.constraints.extend(expr_list(&meta)?);
                } else if meta.path.is_ident("validate") {
                    spec.validate = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("hidden") {
                    spec.hidden = true;
                } else if meta.path.is_ident("groups") {
                    let content;
                    parenthesized!(content in meta.input);
                    let groups = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
                    spec.groups.extend(groups);
                } else {
                    return Err(meta.error("unsupported prop setting"));
                }
                Ok(())
            })?;
        }

        Ok((!skip).then_some(spec))
    }

    fn set_filter(
        &mut self,
        meta: &syn::meta::ParseNestedMeta<'_>,
        filter: TokenStream2,
    ) -> syn::Result<()> {
        if self.filter.is_some() {
            return Err(meta.error("a property takes a single filter"));
        }
        self.filter = Some(filter);
        Ok(())
    }

    fn to_tokens(&self) -> TokenStream2 {
        let key = &self.key;
        let mut calls = Vec::new();

        // Computed properties hold whatever their map returns, so only
        // plain properties get a filter inferred from the field type.
        let filter = self.filter.clone().or_else(|| {
            if self.computed.is_empty() {
                inferred_filter(&self.ty)
            } else {
                None
            }
        });
        if let Some(filter) = filter {
            calls.push(quote! { .filter(#filter) });
        }
        if let Some(default) = &self.default {
            calls.push(default.clone());
        }
        if !self.computed.is_empty() {
            let deps = &self.computed;
            calls.push(quote! { .computed([#(#deps),*]) });
        }
        for constraint in &self.constraints {
            calls.push(quote! { .constraint(#constraint) });
        }
        if let Some(validate) = &self.validate {
            calls.push(quote! { .validate(#validate) });
        }
        if self.hidden {
            calls.push(quote! { .hidden() });
        }
        if !self.groups.is_empty() {
            let groups = &self.groups;
            calls.push(quote! { .json_groups([#(#groups),*]) });
        }

        quote! {
            .property(#key, ::schema_model::PropertyDescriptor::new() #(#calls)*)
        }
    }
}

fn flag(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<bool> {
    if meta.input.peek(Token![=]) {
        let value: LitBool = meta.value()?.parse()?;
        Ok(value.value)
    } else {
        Ok(true)
    }
}

fn expr_list(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<Vec<Expr>> {
    let content;
    parenthesized!(content in meta.input);
    let exprs = Punctuated::<Expr, Token![,]>::parse_terminated(&content)?;
    Ok(exprs.into_iter().collect())
}

/// Built-in filter matching a field's Rust type, looking through `Option`.
fn inferred_filter(ty: &Type) -> Option<TokenStream2> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    let filter = match segment.ident.to_string().as_str() {
        "String" => quote! { ::schema_model::Filter::String },
        "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize" => {
            quote! { ::schema_model::Filter::Integer }
        }
        "f32" | "f64" => quote! { ::schema_model::Filter::Number },
        "bool" => quote! { ::schema_model::Filter::Boolean },
        "Vec" => quote! { ::schema_model::Filter::Array },
        "Option" => {
            let PathArguments::AngleBracketed(args) = &segment.arguments else {
                return None;
            };
            return match args.args.first()? {
                GenericArgument::Type(inner) => inferred_filter(inner),
                _ => None,
            };
        }
        _ => return None,
    };
    Some(filter)
}

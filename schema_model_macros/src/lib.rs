mod declared;

use proc_macro::TokenStream;

/// Derive macro that declares a model schema on a struct.
///
/// Each named field becomes a schema property. Plain fields get a filter
/// inferred from their type (`String`, integers, floats, `bool`, `Vec`,
/// looking through `Option`); anything else is stored as given.
///
/// # Usage
///
/// ```ignore
/// use schema_model::{required, DeclaredModel};
///
/// #[derive(DeclaredModel)]
/// #[model(strict, throw_on_strict_error, name_strategy = "camel")]
/// struct User {
///     #[prop(default = "Ada", constraints(required(["signup"])))]
///     first_name: String,
///     #[prop(default = "Lovelace")]
///     last_name: String,
///     #[prop(computed("first_name", "last_name"), map = join_words)]
///     full_name: String,
///     #[prop(hidden)]
///     password: String,
///     #[prop(model)]
///     address: Address,
/// }
///
/// let user = User::create()?;
/// ```
///
/// Struct settings, all optional:
/// - `strict`, `throw_on_strict_error`, `immutable`: flags, `= false` to unset
/// - `return_empty_value = bool`, `use_getters = bool`, `use_setters = bool`
/// - `name_strategy = "..."`
/// - `validators(expr, ...)`: whole-model validators
/// - `filters = path`: function returning the `FilterRegistry` for named filters
///
/// Field settings, all optional:
/// - `filter = "name"`, `filter_fn = path`, `map = path`, `model`: one filter
/// - `default = expr` or `default_fn = path`
/// - `computed("dep", ...)`
/// - `constraints(expr, ...)`, `validate = expr`
/// - `hidden`, `groups("group", ...)`
/// - `rename = "key"`, `skip`
#[proc_macro_derive(DeclaredModel, attributes(model, prop))]
pub fn derive_declared_model(input: TokenStream) -> TokenStream {
    declared::derive_declared_model(input)
}

//! Person and address schemas shared by the integration tests.

use schema_model::serde_json::{json, Value};
use schema_model::{
    required, DeclaredModel, Filter, Model, ModelOptions, PropertyDescriptor, Schema,
};

pub fn join_words(deps: &Value) -> Value {
    let words: Vec<&str> = deps
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    Value::String(words.join(" "))
}

/// `first_name`/`last_name` with a computed `full_name`.
pub fn person_schema() -> Schema {
    Schema::new()
        .property("first_name", PropertyDescriptor::new().filter("string").value("A"))
        .property("last_name", PropertyDescriptor::new().filter("string").value("B"))
        .property(
            "full_name",
            PropertyDescriptor::new()
                .computed(["first_name", "last_name"])
                .filter(Filter::map(join_words)),
        )
}

pub fn person(options: ModelOptions) -> Model {
    Model::new(person_schema(), options).unwrap()
}

/// Address declared on a type.
#[derive(DeclaredModel)]
pub struct Address {
    #[prop(default = "Paris")]
    pub city: String,
    pub zip: Option<String>,
}

/// User declared on a type, with an embedded address.
#[derive(DeclaredModel)]
#[model(strict, throw_on_strict_error, name_strategy = "camel")]
pub struct User {
    #[prop(default = "Ada", constraints(required(["signup"])))]
    pub first_name: String,
    #[prop(default = "Lovelace")]
    pub last_name: String,
    #[prop(computed("first_name", "last_name"), map = join_words)]
    pub full_name: String,
    #[prop(default = 36)]
    pub age: i64,
    #[prop(hidden)]
    pub password: String,
    #[prop(groups("admin"), default = "staff")]
    pub role: String,
    #[prop(model)]
    pub address: Address,
    #[prop(skip)]
    pub cache: (),
}

pub fn address_json(city: &str) -> Value {
    json!({ "city": city, "zip": "75001" })
}

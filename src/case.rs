//! Key case conversion for serialized models.

use std::fmt;
use std::str::FromStr;

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToTitleCase, ToTrainCase,
    ToUpperCamelCase,
};
use thiserror::Error;

/// Converts property names for `to_json` output.
///
/// `None` or an unknown strategy must return the name unchanged.
pub trait CaseConverter: Send + Sync {
    fn convert(&self, strategy: Option<&str>, name: &str) -> String;
}

impl<F> CaseConverter for F
where
    F: Fn(Option<&str>, &str) -> String + Send + Sync,
{
    fn convert(&self, strategy: Option<&str>, name: &str) -> String {
        self(strategy, name)
    }
}

/// Naming strategies understood by [`HeckCaseConverter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameStrategy {
    Camel,
    Pascal,
    Snake,
    Kebab,
    Constant,
    Title,
    Train,
    Lower,
    Upper,
    Dot,
    Path,
    Sentence,
}

impl NameStrategy {
    pub fn apply(self, name: &str) -> String {
        match self {
            NameStrategy::Camel => name.to_lower_camel_case(),
            NameStrategy::Pascal => name.to_upper_camel_case(),
            NameStrategy::Snake => name.to_snake_case(),
            NameStrategy::Kebab => name.to_kebab_case(),
            NameStrategy::Constant => name.to_shouty_snake_case(),
            NameStrategy::Title => name.to_title_case(),
            NameStrategy::Train => name.to_train_case(),
            NameStrategy::Lower => name.to_lowercase(),
            NameStrategy::Upper => name.to_uppercase(),
            NameStrategy::Dot => name.to_snake_case().replace('_', "."),
            NameStrategy::Path => name.to_snake_case().replace('_', "/"),
            NameStrategy::Sentence => sentence(name),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NameStrategy::Camel => "camel",
            NameStrategy::Pascal => "pascal",
            NameStrategy::Snake => "snake",
            NameStrategy::Kebab => "kebab",
            NameStrategy::Constant => "constant",
            NameStrategy::Title => "title",
            NameStrategy::Train => "train",
            NameStrategy::Lower => "lower",
            NameStrategy::Upper => "upper",
            NameStrategy::Dot => "dot",
            NameStrategy::Path => "path",
            NameStrategy::Sentence => "sentence",
        }
    }
}

fn sentence(name: &str) -> String {
    let words = name.to_snake_case().replace('_', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown name strategy: {0}")]
pub struct UnknownStrategy(pub String);

impl FromStr for NameStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let strategy = match s.to_ascii_lowercase().as_str() {
            "camel" | "camelcase" => NameStrategy::Camel,
            "pascal" | "pascalcase" => NameStrategy::Pascal,
            "snake" | "snakecase" => NameStrategy::Snake,
            "kebab" | "param" | "paramcase" => NameStrategy::Kebab,
            "constant" | "constantcase" => NameStrategy::Constant,
            "title" | "titlecase" => NameStrategy::Title,
            "train" | "header" | "headercase" => NameStrategy::Train,
            "lower" | "lowercase" => NameStrategy::Lower,
            "upper" | "uppercase" => NameStrategy::Upper,
            "dot" | "dotcase" => NameStrategy::Dot,
            "path" | "pathcase" => NameStrategy::Path,
            "sentence" | "sentencecase" => NameStrategy::Sentence,
            _ => return Err(UnknownStrategy(s.to_string())),
        };
        Ok(strategy)
    }
}

impl fmt::Display for NameStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default converter backed by `heck`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeckCaseConverter;

impl CaseConverter for HeckCaseConverter {
    fn convert(&self, strategy: Option<&str>, name: &str) -> String {
        match strategy.map(str::parse::<NameStrategy>) {
            Some(Ok(strategy)) => strategy.apply(name),
            _ => name.to_string(),
        }
    }
}

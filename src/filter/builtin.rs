//! The five built-in coercions.
//!
//! Each follows the same nullish rule: a `null` input becomes the type's empty
//! value when `return_empty_value` is on and passes through untouched when it
//! is off.

use serde_json::{Number, Value};

use super::{FilterError, FilterSettings};

/// Largest integer a double represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

pub fn string(value: &Value, settings: &FilterSettings) -> Result<Value, FilterError> {
    if value.is_null() {
        return Ok(empty_or(value, settings, Value::String(String::new())));
    }
    Ok(Value::String(stringify(value)))
}

pub fn number(value: &Value, settings: &FilterSettings) -> Result<Value, FilterError> {
    if value.is_null() {
        return Ok(empty_or(value, settings, Value::from(0)));
    }
    if value.is_number() {
        return Ok(value.clone());
    }
    Ok(number_value(to_number(value)))
}

pub fn integer(value: &Value, settings: &FilterSettings) -> Result<Value, FilterError> {
    if value.is_null() {
        return Ok(empty_or(value, settings, Value::from(0)));
    }
    Ok(Value::from(to_safe_integer(to_number(value))))
}

pub fn array(value: &Value, settings: &FilterSettings) -> Result<Value, FilterError> {
    if value.is_array() {
        return Ok(value.clone());
    }
    Ok(empty_or(value, settings, Value::Array(Vec::new())))
}

pub fn boolean(value: &Value, settings: &FilterSettings) -> Result<Value, FilterError> {
    if value.is_null() {
        return Ok(empty_or(value, settings, Value::Bool(false)));
    }
    Ok(Value::Bool(truthy(value)))
}

/// Truthiness of a JSON value: `false`, `0`, `NaN`, `""` and `null` are falsy.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn empty_or(value: &Value, settings: &FilterSettings, empty: Value) -> Value {
    if settings.return_empty_value {
        empty
    } else {
        value.clone()
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => format_number(number),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(stringify)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn format_number(number: &Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    if let Some(uint) = number.as_u64() {
        return uint.to_string();
    }
    number.as_f64().map(format_float).unwrap_or_default()
}

/// Shortest round-trip digits, switching to exponent form (`1e-7`, `1e+21`)
/// outside `[1e-6, 1e21)` the way `String(number)` does.
fn format_float(float: f64) -> String {
    let magnitude = float.abs();
    if magnitude == 0.0 || (1e-6..1e21).contains(&magnitude) {
        return float.to_string();
    }
    let text = format!("{float:e}");
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => text,
    }
}

fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(flag) => f64::from(u8::from(*flag)),
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::String(text) => parse_number(text),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single] => parse_number(&stringify(single)),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    }
}

fn to_safe_integer(number: f64) -> i64 {
    if number.is_nan() {
        return 0;
    }
    number.trunc().clamp(-MAX_SAFE_INTEGER, MAX_SAFE_INTEGER) as i64
}

/// Integral results within the safe range come back as JSON integers so they
/// compare equal to `json!(n)`. `NaN` and infinities have no JSON form and
/// become `null`.
fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() <= MAX_SAFE_INTEGER {
        return Value::from(number as i64);
    }
    Number::from_f64(number).map(Value::Number).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty() -> FilterSettings {
        FilterSettings {
            return_empty_value: true,
        }
    }

    fn raw() -> FilterSettings {
        FilterSettings {
            return_empty_value: false,
        }
    }

    #[test]
    fn string_coerces_like_js() {
        assert_eq!(string(&json!(123), &empty()).unwrap(), json!("123"));
        assert_eq!(string(&json!(1.5), &empty()).unwrap(), json!("1.5"));
        assert_eq!(string(&json!(true), &empty()).unwrap(), json!("true"));
        assert_eq!(string(&json!({}), &empty()).unwrap(), json!("[object Object]"));
        assert_eq!(string(&json!([1, "a", null]), &empty()).unwrap(), json!("1,a,"));
    }

    #[test]
    fn string_uses_exponents_for_extreme_magnitudes() {
        assert_eq!(string(&json!(1e-7), &empty()).unwrap(), json!("1e-7"));
        assert_eq!(string(&json!(-2.5e-8), &empty()).unwrap(), json!("-2.5e-8"));
        assert_eq!(string(&json!(1e21), &empty()).unwrap(), json!("1e+21"));
        assert_eq!(string(&json!(1.5e300), &empty()).unwrap(), json!("1.5e+300"));
        assert_eq!(string(&json!(0.000001), &empty()).unwrap(), json!("0.000001"));
        assert_eq!(string(&json!(1e20), &empty()).unwrap(), json!("100000000000000000000"));
        assert_eq!(string(&json!(0.0), &empty()).unwrap(), json!("0"));
    }

    #[test]
    fn nullish_respects_return_empty_value() {
        assert_eq!(string(&Value::Null, &empty()).unwrap(), json!(""));
        assert_eq!(number(&Value::Null, &empty()).unwrap(), json!(0));
        assert_eq!(integer(&Value::Null, &empty()).unwrap(), json!(0));
        assert_eq!(array(&Value::Null, &empty()).unwrap(), json!([]));
        assert_eq!(boolean(&Value::Null, &empty()).unwrap(), json!(false));

        assert_eq!(string(&Value::Null, &raw()).unwrap(), Value::Null);
        assert_eq!(number(&Value::Null, &raw()).unwrap(), Value::Null);
        assert_eq!(integer(&Value::Null, &raw()).unwrap(), Value::Null);
        assert_eq!(array(&Value::Null, &raw()).unwrap(), Value::Null);
        assert_eq!(boolean(&Value::Null, &raw()).unwrap(), Value::Null);
    }

    #[test]
    fn number_parses_strings() {
        assert_eq!(number(&json!("42"), &empty()).unwrap(), json!(42));
        assert_eq!(number(&json!(" 2.5 "), &empty()).unwrap(), json!(2.5));
        assert_eq!(number(&json!(""), &empty()).unwrap(), json!(0));
        assert_eq!(number(&json!(true), &empty()).unwrap(), json!(1));
        assert_eq!(number(&json!("abc"), &empty()).unwrap(), Value::Null);
    }

    #[test]
    fn integer_truncates_and_clamps() {
        assert_eq!(integer(&json!(3.9), &empty()).unwrap(), json!(3));
        assert_eq!(integer(&json!(-3.9), &empty()).unwrap(), json!(-3));
        assert_eq!(integer(&json!("abc"), &empty()).unwrap(), json!(0));
        assert_eq!(
            integer(&json!(1e300), &empty()).unwrap(),
            json!(9_007_199_254_740_991_i64)
        );
        assert_eq!(
            integer(&json!("-Infinity"), &empty()).unwrap(),
            json!(-9_007_199_254_740_991_i64)
        );
    }

    #[test]
    fn array_passes_arrays_through() {
        assert_eq!(array(&json!([1, 2]), &empty()).unwrap(), json!([1, 2]));
        assert_eq!(array(&json!("x"), &empty()).unwrap(), json!([]));
        assert_eq!(array(&json!("x"), &raw()).unwrap(), json!("x"));
    }

    #[test]
    fn boolean_uses_truthiness() {
        assert_eq!(boolean(&json!(0), &empty()).unwrap(), json!(false));
        assert_eq!(boolean(&json!(""), &empty()).unwrap(), json!(false));
        assert_eq!(boolean(&json!("no"), &empty()).unwrap(), json!(true));
        assert_eq!(boolean(&json!([]), &empty()).unwrap(), json!(true));
    }
}

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::Value;

lazy_static! {
    static ref UPPERCASE: Regex = Regex::new(r"[A-Z]").unwrap();
}

/// Convert a source identifier to snake_case by inserting an underscore
/// before every uppercase letter and lowercasing it. Input that is already
/// snake_case passes through unchanged.
pub fn camel_to_snake(name: &str) -> String {
    UPPERCASE
        .replace_all(name, |caps: &Captures| format!("_{}", caps[0].to_lowercase()))
        .into_owned()
}

pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap()
}

/// Render a JSON value as a schema literal: numbers and booleans bare,
/// strings quoted and escaped.
pub fn json_literal(value: &Value) -> String {
    serde_json::to_string(value).unwrap()
}

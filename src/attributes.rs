// gffiter: Streaming hierarchical parser and printer for GFF/GTF annotations.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//

//! Codec for the attributes stored in column 9 of a GFF/GTF line.
//!
//! The attribute column is a list of `key value` pairs separated by `;`.
//! Quoted values are strings, unquoted values are integers or floats when
//! they parse as such and strings otherwise.
//!
//! ## Usage
//!
//! ```rust
//! use gffiter::attributes::{decode, encode, AttributeValue};
//!
//! let raw = "gene_id \"ENSG001\"; version 2; score_val 3.5;";
//! let attributes = decode(raw).unwrap();
//!
//! assert_eq!(attributes.get("gene_id"), Some(&AttributeValue::String("ENSG001".to_string())));
//! assert_eq!(attributes.get("version"), Some(&AttributeValue::Integer(2)));
//! assert_eq!(attributes.get("score_val"), Some(&AttributeValue::Float(3.5)));
//!
//! assert_eq!(encode(&attributes), raw);
//! ```
//!

use indexmap::map::IndexMap;

type E = Box<dyn std::error::Error>;

#[derive(Debug, Clone)]
pub struct MalformedAttribute {
    pub segment: String,
}

impl std::fmt::Display for MalformedAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "attribute '{}' is not a `key value` pair", self.segment)
    }
}

impl std::error::Error for MalformedAttribute {}

/// Typed value of a single attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Integer(i64),
    Float(f64),
}

impl AttributeValue {
    /// Classifies a raw value token from column 9.
    ///
    /// Quoted tokens are always strings. Unquoted tokens are integers if
    /// they are an optionally negative run of digits, floats if they parse
    /// as a float, and strings otherwise.
    pub fn from_token(token: &str) -> Self {
        if let Some(quoted) = token.strip_prefix('"') {
            let value = quoted.strip_suffix('"').unwrap_or(quoted);
            return AttributeValue::String(value.to_string())
        }

        let digits = token.strip_prefix('-').unwrap_or(token);
        if !digits.is_empty() && digits.bytes().all(|x| x.is_ascii_digit()) {
            if let Ok(value) = token.parse::<i64>() {
                return AttributeValue::Integer(value)
            }
        }

        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => AttributeValue::Float(value),
            _ => AttributeValue::String(token.to_string()),
        }
    }

    /// The value of a string attribute without quotes.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(value) => Some(value),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AttributeValue::String(value) => write!(f, "\"{}\"", value),
            AttributeValue::Integer(value) => write!(f, "{}", value),
            AttributeValue::Float(value) => write!(f, "{}", format_float(*value)),
        }
    }
}

/// Formats a float as plain decimal text.
///
/// Integral values keep a trailing `.0` so they are read back as floats.
pub fn format_float(
    value: f64,
) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Attributes from column 9 in the order they appeared on the line.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    pairs: IndexMap<String, AttributeValue>,
}

// Two attribute lists are only equal if their keys are in the same order.
impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.pairs.iter().eq(other.pairs.iter())
    }
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&AttributeValue> {
        self.pairs.get(key)
    }

    /// Inserts or replaces `key`. A replaced key keeps its original position.
    pub fn insert(
        &mut self,
        key: String,
        value: AttributeValue,
    ) -> Option<AttributeValue> {
        self.pairs.insert(key, value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl std::fmt::Display for Attributes {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", encode(self))
    }
}

impl std::str::FromStr for Attributes {
    type Err = E;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

/// Decode the contents of column 9
///
/// Splits `raw` on `;` and each non-empty segment on its first space into a
/// key and a value token. Empty segments are ignored, so a trailing `;` or
/// blank input is fine.
///
/// Terminates with a [MalformedAttribute] if a segment has no space.
///
pub fn decode(
    raw: &str,
) -> Result<Attributes, E> {
    let separator: char = ';';
    let mut attributes = Attributes::new();

    for segment in raw.split(separator).map(|x| x.trim()) {
        if segment.is_empty() {
            continue;
        }
        let (key, token) = segment.split_once(' ').ok_or_else(|| MalformedAttribute{ segment: segment.to_string() })?;
        attributes.insert(key.to_string(), AttributeValue::from_token(token.trim_start()));
    }

    Ok(attributes)
}

/// Encode attributes as column 9
///
/// Pairs are written in insertion order as `key value`, joined by `; ` and
/// terminated with `;`. Empty attributes encode to an empty string.
///
pub fn encode(
    attributes: &Attributes,
) -> String {
    if attributes.is_empty() {
        return String::new()
    }

    let mut formatted = attributes.iter().map(|(key, value)| {
        format!("{} {}", key, value)
    }).collect::<Vec<String>>().join("; ");
    formatted += ";";

    formatted
}

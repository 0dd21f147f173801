//! Descriptors for derived input and output types

use std::fmt;

use crate::coerce::is_numeric_text;
use crate::domain::Literal;
use crate::value::Value;

/// A derived type, written the way a TypeScript signature would show it
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDesc {
    Never,
    Undefined,
    Null,
    Boolean,
    Number,
    BigInt,
    String,
    Date,
    Structured,
    Literal(Literal),
    /// `${boolean}`
    BooleanText,
    /// `${number}`
    NumericText,
    /// A literal rendered as text, e.g. `"1"`
    LiteralText(String),
    Union(Vec<TypeDesc>),
}

impl TypeDesc {
    /// Build a flattened, deduplicated union. Empty unions are `never`.
    pub fn union(parts: impl IntoIterator<Item = TypeDesc>) -> TypeDesc {
        let mut flat: Vec<TypeDesc> = Vec::new();
        for part in parts {
            let nested = match part {
                TypeDesc::Union(items) => items,
                TypeDesc::Never => Vec::new(),
                other => vec![other],
            };
            for item in nested {
                if !flat.contains(&item) {
                    flat.push(item);
                }
            }
        }
        match flat.len() {
            0 => TypeDesc::Never,
            1 => flat.remove(0),
            _ => TypeDesc::Union(flat),
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, TypeDesc::Never)
    }

    /// Parts of a union, or the type itself
    pub fn parts(&self) -> &[TypeDesc] {
        match self {
            TypeDesc::Union(items) => items,
            TypeDesc::Never => &[],
            other => std::slice::from_ref(other),
        }
    }

    pub fn includes(&self, desc: &TypeDesc) -> bool {
        self.parts().contains(desc)
    }

    /// Whether a runtime value inhabits this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            TypeDesc::Never => false,
            TypeDesc::Undefined => value.is_undefined(),
            TypeDesc::Null => value.is_null(),
            TypeDesc::Boolean => matches!(value, Value::Boolean(_)),
            TypeDesc::Number => matches!(value, Value::Number(_)),
            TypeDesc::BigInt => matches!(value, Value::BigInt(_)),
            TypeDesc::String => matches!(value, Value::String(_)),
            TypeDesc::Date => matches!(value, Value::Date(_)),
            TypeDesc::Structured => matches!(
                value,
                Value::Structured(json) if json.is_object() || json.is_array()
            ),
            TypeDesc::Literal(literal) => value.matches_literal(literal),
            TypeDesc::BooleanText | TypeDesc::NumericText | TypeDesc::LiteralText(_) => {
                value.as_str().is_some_and(|text| self.accepts_text(text))
            }
            TypeDesc::Union(items) => items.iter().any(|item| item.accepts(value)),
        }
    }

    /// Whether stored text inhabits this (output) type
    pub fn accepts_text(&self, text: &str) -> bool {
        match self {
            TypeDesc::String => true,
            TypeDesc::BooleanText => text == "true" || text == "false",
            TypeDesc::NumericText => is_numeric_text(text),
            TypeDesc::LiteralText(expected) => text == expected,
            TypeDesc::Union(items) => items.iter().any(|item| item.accepts_text(text)),
            _ => false,
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Never => f.write_str("never"),
            TypeDesc::Undefined => f.write_str("undefined"),
            TypeDesc::Null => f.write_str("null"),
            TypeDesc::Boolean => f.write_str("boolean"),
            TypeDesc::Number => f.write_str("number"),
            TypeDesc::BigInt => f.write_str("bigint"),
            TypeDesc::String => f.write_str("string"),
            TypeDesc::Date => f.write_str("Date"),
            TypeDesc::Structured => f.write_str("object"),
            TypeDesc::Literal(literal) => write!(f, "{}", literal),
            TypeDesc::BooleanText => f.write_str("`${boolean}`"),
            TypeDesc::NumericText => f.write_str("`${number}`"),
            TypeDesc::LiteralText(text) => {
                write!(f, "{}", serde_json::Value::String(text.clone()))
            }
            TypeDesc::Union(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

//! Logical value domains declared for storage keys
//!
//! A domain is a union of [`Member`]s, the same way a TypeScript declaration
//! such as `number | null | undefined` is a union of three members. Every
//! classification rule is derived from the member set, so the categories the
//! rest of the crate talks about (`DomainKind`) are computed, never declared.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::coerce::number_to_string;

/// A single literal value of a closed literal set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Literal {
    /// The literal rendered through native string coercion (`1` -> `"1"`)
    pub fn to_text(&self) -> String {
        match self {
            Literal::Boolean(b) => b.to_string(),
            Literal::Number(n) => number_to_string(*n),
            Literal::String(s) => s.clone(),
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Literal::String(_))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "{}", serde_json::Value::String(s.clone())),
            other => f.write_str(&other.to_text()),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Number(n)
    }
}

impl From<i32> for Literal {
    fn from(n: i32) -> Self {
        Literal::Number(n as f64)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Boolean(b)
    }
}

/// One member of a logical domain union
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Member {
    Undefined,
    Null,
    Boolean,
    Number,
    BigInt,
    String,
    Literal { value: Literal },
    /// Object or array shaped data
    Structured,
    Date,
    Function,
    Symbol,
}

impl Member {
    /// Undefined and null are absence markers rather than values
    pub fn is_absence(&self) -> bool {
        matches!(self, Member::Undefined | Member::Null)
    }

    /// Callables and unique symbols can never be stored
    pub fn is_unrepresentable(&self) -> bool {
        matches!(self, Member::Function | Member::Symbol)
    }

    /// Members that rule a key out of JSON mode when the whole domain is made of them.
    ///
    /// Strings are ambiguous with JSON text, dates collapse to strings, and
    /// bigints have no JSON encoding.
    pub fn is_json_excluded(&self) -> bool {
        match self {
            Member::Literal { value } => value.is_string(),
            Member::String
            | Member::Date
            | Member::BigInt
            | Member::Undefined
            | Member::Null
            | Member::Function
            | Member::Symbol => true,
            Member::Boolean | Member::Number | Member::Structured => false,
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Undefined => f.write_str("undefined"),
            Member::Null => f.write_str("null"),
            Member::Boolean => f.write_str("boolean"),
            Member::Number => f.write_str("number"),
            Member::BigInt => f.write_str("bigint"),
            Member::String => f.write_str("string"),
            Member::Literal { value } => write!(f, "{}", value),
            Member::Structured => f.write_str("object"),
            Member::Date => f.write_str("Date"),
            Member::Function => f.write_str("Function"),
            Member::Symbol => f.write_str("symbol"),
        }
    }
}

/// Category of a domain, derived from its members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainKind {
    /// Only `undefined` and/or `null`
    Absent,
    Primitive,
    PrimitiveOptional,
    PrimitiveOrNull,
    PrimitiveOrNullOptional,
    Literal,
    Structured,
    Temporal,
    Unrepresentable,
}

/// The logical domain of a storage key: a deduplicated union of members
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain {
    members: Vec<Member>,
}

impl Domain {
    pub fn from_members(members: impl IntoIterator<Item = Member>) -> Self {
        members.into_iter().fold(Domain::default(), Domain::with)
    }

    pub fn undefined() -> Self {
        Self::from_members([Member::Undefined])
    }

    pub fn null() -> Self {
        Self::from_members([Member::Null])
    }

    pub fn boolean() -> Self {
        Self::from_members([Member::Boolean])
    }

    pub fn number() -> Self {
        Self::from_members([Member::Number])
    }

    pub fn bigint() -> Self {
        Self::from_members([Member::BigInt])
    }

    pub fn string() -> Self {
        Self::from_members([Member::String])
    }

    pub fn structured() -> Self {
        Self::from_members([Member::Structured])
    }

    pub fn date() -> Self {
        Self::from_members([Member::Date])
    }

    pub fn function() -> Self {
        Self::from_members([Member::Function])
    }

    pub fn symbol() -> Self {
        Self::from_members([Member::Symbol])
    }

    /// A closed literal set such as `"a" | "b" | "c"`
    pub fn literals<L: Into<Literal>>(values: impl IntoIterator<Item = L>) -> Self {
        Self::from_members(
            values
                .into_iter()
                .map(|value| Member::Literal { value: value.into() }),
        )
    }

    /// Add a member to the union; duplicates are ignored
    pub fn with(mut self, member: Member) -> Self {
        if !self.members.contains(&member) {
            self.members.push(member);
        }
        self
    }

    /// Union of two domains
    pub fn union(self, other: Domain) -> Self {
        other.members.into_iter().fold(self, Domain::with)
    }

    /// `T | null`
    pub fn or_null(self) -> Self {
        self.with(Member::Null)
    }

    /// `T | undefined`, the shape of an optional property
    pub fn or_undefined(self) -> Self {
        self.with(Member::Undefined)
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, member: &Member) -> bool {
        self.members.contains(member)
    }

    pub fn admits_undefined(&self) -> bool {
        self.contains(&Member::Undefined)
    }

    pub fn admits_null(&self) -> bool {
        self.contains(&Member::Null)
    }

    /// Members other than `undefined` and `null`
    pub fn values(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| !m.is_absence())
    }

    pub fn literal_values(&self) -> impl Iterator<Item = &Literal> {
        self.members.iter().filter_map(|m| match m {
            Member::Literal { value } => Some(value),
            _ => None,
        })
    }

    pub fn kind(&self) -> DomainKind {
        let members = &self.members;
        if members.iter().any(Member::is_unrepresentable) {
            return DomainKind::Unrepresentable;
        }
        if self.values().next().is_none() {
            return DomainKind::Absent;
        }
        if members.contains(&Member::Structured) {
            return DomainKind::Structured;
        }
        if members.contains(&Member::Date) {
            return DomainKind::Temporal;
        }
        if self.literal_values().next().is_some() {
            return DomainKind::Literal;
        }
        match (self.admits_undefined(), self.admits_null()) {
            (false, false) => DomainKind::Primitive,
            (true, false) => DomainKind::PrimitiveOptional,
            (false, true) => DomainKind::PrimitiveOrNull,
            (true, true) => DomainKind::PrimitiveOrNullOptional,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.members.is_empty() {
            return f.write_str("never");
        }
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", member)?;
        }
        Ok(())
    }
}

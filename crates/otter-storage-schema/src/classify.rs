//! Per-key access contracts derived from a domain
//!
//! Every function here is a pure function of the domain. Raw mode is legal
//! for everything except unrepresentable domains. JSON mode is legal unless
//! the whole domain is made of members that are excluded from JSON (strings,
//! string literals, dates, bigints, absence markers). A key is nullable when
//! its domain admits `undefined` or `null`.

use std::fmt;

use crate::domain::{Domain, DomainKind, Member};
use crate::desc::TypeDesc;

/// A classification set a key can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyClass {
    RawMode,
    JsonMode,
    Nullable,
}

impl fmt::Display for KeyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyClass::RawMode => f.write_str("raw-mode"),
            KeyClass::JsonMode => f.write_str("JSON-mode"),
            KeyClass::Nullable => f.write_str("nullable"),
        }
    }
}

pub fn is_raw_mode(domain: &Domain) -> bool {
    !domain.is_empty() && !domain.members().iter().any(Member::is_unrepresentable)
}

pub fn is_json_mode(domain: &Domain) -> bool {
    let members = domain.members();
    !members.iter().any(Member::is_unrepresentable)
        && members.iter().any(|member| !member.is_json_excluded())
}

pub fn is_nullable(domain: &Domain) -> bool {
    domain.admits_undefined() || domain.admits_null()
}

/// Values raw-mode `set` accepts. Absence markers are never accepted and
/// structured members accept only pre-serialized text.
pub fn raw_input_type(domain: &Domain) -> Option<TypeDesc> {
    if !is_raw_mode(domain) {
        return None;
    }
    Some(TypeDesc::union(domain.values().map(|member| match member {
        Member::Boolean => TypeDesc::Boolean,
        Member::Number => TypeDesc::Number,
        Member::BigInt => TypeDesc::BigInt,
        Member::String | Member::Structured => TypeDesc::String,
        Member::Literal { value } => TypeDesc::Literal(value.clone()),
        Member::Date => TypeDesc::Date,
        Member::Undefined | Member::Null | Member::Function | Member::Symbol => TypeDesc::Never,
    })))
}

/// Text raw-mode `get` produces. Nullable domains also yield `null` for an absent key.
pub fn raw_output_type(domain: &Domain) -> Option<TypeDesc> {
    if !is_raw_mode(domain) {
        return None;
    }
    Some(TypeDesc::union(domain.members().iter().map(|member| match member {
        Member::Undefined | Member::Null => TypeDesc::Null,
        Member::Boolean => TypeDesc::BooleanText,
        Member::Number | Member::BigInt => TypeDesc::NumericText,
        Member::Literal { value } => TypeDesc::LiteralText(value.to_text()),
        Member::String | Member::Structured | Member::Date => TypeDesc::String,
        Member::Function | Member::Symbol => TypeDesc::Never,
    })))
}

/// Values JSON-mode `set` accepts: the domain itself
pub fn json_input_type(domain: &Domain) -> Option<TypeDesc> {
    if !is_json_mode(domain) {
        return None;
    }
    Some(TypeDesc::union(domain.members().iter().map(member_type)))
}

/// Values JSON-mode `get` produces: the domain, widened with `null` when it
/// admits `undefined` because a removed key also reads back as `null`
pub fn json_output_type(domain: &Domain) -> Option<TypeDesc> {
    let input = json_input_type(domain)?;
    if domain.admits_undefined() {
        Some(TypeDesc::union([input, TypeDesc::Null]))
    } else {
        Some(input)
    }
}

fn member_type(member: &Member) -> TypeDesc {
    match member {
        Member::Undefined => TypeDesc::Undefined,
        Member::Null => TypeDesc::Null,
        Member::Boolean => TypeDesc::Boolean,
        Member::Number => TypeDesc::Number,
        Member::BigInt => TypeDesc::BigInt,
        Member::String => TypeDesc::String,
        Member::Literal { value } => TypeDesc::Literal(value.clone()),
        Member::Structured => TypeDesc::Structured,
        Member::Date => TypeDesc::Date,
        Member::Function | Member::Symbol => TypeDesc::Never,
    }
}

/// Input and output types of one access mode
#[derive(Debug, Clone, PartialEq)]
pub struct ModeContract {
    pub input: TypeDesc,
    pub output: TypeDesc,
}

/// Everything derived for one schema key, computed once at schema load
#[derive(Debug, Clone, PartialEq)]
pub struct KeyContract {
    name: String,
    domain: Domain,
    kind: DomainKind,
    raw: Option<ModeContract>,
    json: Option<ModeContract>,
    nullable: bool,
}

impl KeyContract {
    pub fn classify(name: impl Into<String>, domain: Domain) -> Self {
        let raw = raw_input_type(&domain)
            .zip(raw_output_type(&domain))
            .map(|(input, output)| ModeContract { input, output });
        let json = json_input_type(&domain)
            .zip(json_output_type(&domain))
            .map(|(input, output)| ModeContract { input, output });
        Self {
            name: name.into(),
            kind: domain.kind(),
            nullable: is_nullable(&domain),
            domain,
            raw,
            json,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn kind(&self) -> DomainKind {
        self.kind
    }

    pub fn raw(&self) -> Option<&ModeContract> {
        self.raw.as_ref()
    }

    pub fn json(&self) -> Option<&ModeContract> {
        self.json.as_ref()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_member(&self, class: KeyClass) -> bool {
        match class {
            KeyClass::RawMode => self.raw.is_some(),
            KeyClass::JsonMode => self.json.is_some(),
            KeyClass::Nullable => self.nullable,
        }
    }
}

use otter_storage_schema::{Domain, DomainKind, KeyClass, Schema, SchemaError};

fn schema() -> Schema {
    Schema::builder()
        .key("undefined", Domain::undefined())
        .key("nullOpt", Domain::null().or_undefined())
        .key("string", Domain::string())
        .key("stringOrNullOpt", Domain::string().or_null().or_undefined())
        .key("stringLiteral", Domain::literals(["a", "b", "c"]))
        .key("number", Domain::number())
        .key("numberOpt", Domain::number().or_undefined())
        .key("numberOrNull", Domain::number().or_null())
        .key("numberLiteral", Domain::literals([1, 2, 3]))
        .key("obj", Domain::structured())
        .key("objOrNullOpt", Domain::structured().or_null().or_undefined())
        .key("boolean", Domain::boolean())
        .key("date", Domain::date())
        .key("bigint", Domain::bigint())
        .key("fn", Domain::function())
        .key("symbol", Domain::symbol())
        .build()
        .unwrap()
}

/// (raw input, raw output) for a key, rendered
fn raw(schema: &Schema, key: &str) -> Option<(String, String)> {
    let mode = schema.get(key)?.raw()?;
    Some((mode.input.to_string(), mode.output.to_string()))
}

fn json(schema: &Schema, key: &str) -> Option<(String, String)> {
    let mode = schema.get(key)?.json()?;
    Some((mode.input.to_string(), mode.output.to_string()))
}

fn pair(input: &str, output: &str) -> Option<(String, String)> {
    Some((input.to_string(), output.to_string()))
}

#[test]
fn raw_mode_contracts() {
    let schema = schema();
    assert_eq!(raw(&schema, "number"), pair("number", "`${number}`"));
    assert_eq!(raw(&schema, "numberOpt"), pair("number", "`${number}` | null"));
    assert_eq!(raw(&schema, "boolean"), pair("boolean", "`${boolean}`"));
    assert_eq!(
        raw(&schema, "stringLiteral"),
        pair(r#""a" | "b" | "c""#, r#""a" | "b" | "c""#)
    );
    assert_eq!(raw(&schema, "numberLiteral"), pair("1 | 2 | 3", r#""1" | "2" | "3""#));
    assert_eq!(raw(&schema, "obj"), pair("string", "string"));
    assert_eq!(raw(&schema, "date"), pair("Date", "string"));
    assert_eq!(raw(&schema, "bigint"), pair("bigint", "`${number}`"));
    assert_eq!(raw(&schema, "stringOrNullOpt"), pair("string", "string | null"));
    assert_eq!(raw(&schema, "undefined"), pair("never", "null"));
    assert_eq!(raw(&schema, "fn"), None);
    assert_eq!(raw(&schema, "symbol"), None);
}

#[test]
fn json_mode_contracts() {
    let schema = schema();
    assert_eq!(json(&schema, "number"), pair("number", "number"));
    assert_eq!(
        json(&schema, "numberOpt"),
        pair("number | undefined", "number | undefined | null")
    );
    assert_eq!(json(&schema, "numberOrNull"), pair("number | null", "number | null"));
    assert_eq!(
        json(&schema, "objOrNullOpt"),
        pair("object | null | undefined", "object | null | undefined")
    );
    assert_eq!(json(&schema, "numberLiteral"), pair("1 | 2 | 3", "1 | 2 | 3"));

    for key in ["undefined", "nullOpt", "string", "stringOrNullOpt", "stringLiteral", "date", "bigint", "fn"] {
        assert_eq!(json(&schema, key), None, "{} should not be JSON-mode", key);
    }
}

#[test]
fn classification_sets() {
    let schema = schema();
    let nullable: Vec<_> = schema.nullable_keys().collect();
    assert_eq!(
        nullable,
        ["undefined", "nullOpt", "stringOrNullOpt", "numberOpt", "numberOrNull", "objOrNullOpt"]
    );

    let raw_count = schema.keys_in(KeyClass::RawMode).count();
    assert_eq!(raw_count, schema.len() - 2);
    assert!(!schema.raw_keys().any(|k| k == "fn" || k == "symbol"));
}

#[test]
fn kinds_are_derived() {
    let schema = schema();
    let kind = |key: &str| schema.get(key).unwrap().kind();
    assert_eq!(kind("undefined"), DomainKind::Absent);
    assert_eq!(kind("number"), DomainKind::Primitive);
    assert_eq!(kind("numberOpt"), DomainKind::PrimitiveOptional);
    assert_eq!(kind("numberOrNull"), DomainKind::PrimitiveOrNull);
    assert_eq!(kind("stringOrNullOpt"), DomainKind::PrimitiveOrNullOptional);
    assert_eq!(kind("stringLiteral"), DomainKind::Literal);
    assert_eq!(kind("obj"), DomainKind::Structured);
    assert_eq!(kind("date"), DomainKind::Temporal);
    assert_eq!(kind("fn"), DomainKind::Unrepresentable);
}

#[test]
fn schema_loads_from_json() {
    let schema = Schema::from_json_str(
        r#"{
            "count": [{ "type": "number" }],
            "objOpt": [{ "type": "structured" }, { "type": "undefined" }]
        }"#,
    )
    .unwrap();
    assert_eq!(schema.len(), 2);
    assert_eq!(
        json(&schema, "objOpt"),
        pair("object | undefined", "object | undefined | null")
    );

    assert!(matches!(
        Schema::from_json_str(r#"{ "empty": [] }"#),
        Err(SchemaError::EmptyDomain(_))
    ));
    assert!(matches!(
        Schema::from_json_str(r#"{ "bad": [{ "type": "tuple" }] }"#),
        Err(SchemaError::Parse(_))
    ));
}

#[test]
fn duplicate_keys_are_rejected() {
    let err = Schema::builder()
        .key("count", Domain::number())
        .key("count", Domain::string())
        .build()
        .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateKey(name) if name == "count"));
}

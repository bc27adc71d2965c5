//! Tests for schemas loaded from JSON documents.

use formcheck::{
    summarize, DefinitionError, FieldPath, FieldSchema, SchemaConstructionError, SchemaDef,
};
use serde_json::json;

const ACCOUNT: &str = r#"{
    "type": "object",
    "fields": {
        "email": { "type": "string", "email": { "value": true, "message": "enter a valid email" } },
        "password": { "type": "string", "min_length": 8 },
        "confirmPassword": { "type": "string" },
        "address": {
            "type": "object",
            "fields": {
                "street": { "type": "string", "non_empty": true },
                "zipCode": { "type": "string", "pattern": "^\\d{5}$" }
            }
        },
        "plan": { "type": "enum", "values": ["free", "pro", "enterprise"], "default": "free" },
        "marketing": { "type": "boolean", "required": false }
    },
    "refinements": [
        { "rule": "fields_match", "field": "password", "confirm": "confirmPassword",
          "message": "passwords do not match" }
    ]
}"#;

#[test]
fn test_account_document_accepts_valid_submission() {
    let schema = FieldSchema::from_json_str(ACCOUNT).unwrap();
    let value = schema
        .validate(
            &json!({
                "email": "ops@example.com",
                "password": "correct horse",
                "confirmPassword": "correct horse",
                "address": {"street": "1 Main St", "zipCode": "94110"}
            }),
            &FieldPath::root(),
        )
        .into_result()
        .unwrap();

    assert_eq!(value["plan"], json!("free"));
    assert!(value.get("marketing").is_none());
}

#[test]
fn test_account_document_reports_in_declaration_order() {
    let schema = FieldSchema::from_json_str(ACCOUNT).unwrap();
    let errors = schema
        .validate(
            &json!({
                "email": "nope",
                "password": "short",
                "confirmPassword": "other",
                "address": {"street": "", "zipCode": "1"}
            }),
            &FieldPath::root(),
        )
        .into_result()
        .unwrap_err();

    let lines: Vec<String> = summarize(&schema, &errors)
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        lines,
        vec![
            "email: enter a valid email",
            "password: must be at least 8 characters",
            "confirmPassword: passwords do not match",
            "address.street: is required",
            "address.zipCode: must match pattern '^\\d{5}$'",
        ]
    );
}

#[test]
fn test_document_survives_serialization() {
    let def = SchemaDef::from_json_str(ACCOUNT).unwrap();
    let reparsed = SchemaDef::from_value(serde_json::to_value(&def).unwrap()).unwrap();
    assert_eq!(def, reparsed);
}

#[test]
fn test_refinement_on_unknown_field_is_rejected() {
    let err = FieldSchema::from_json_str(
        r#"{
            "type": "object",
            "fields": { "password": { "type": "string" } },
            "refinements": [
                { "rule": "fields_match", "field": "password", "confirm": "confirm", "message": "x" }
            ]
        }"#,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        DefinitionError::Construction(SchemaConstructionError::UnknownPath(ref p)) if p == "confirm"
    ));
}

#[test]
fn test_nested_array_without_items_names_its_path() {
    let err = FieldSchema::from_json_str(
        r#"{ "type": "object", "fields": { "skills": { "type": "array" } } }"#,
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "array schema at 'skills' is missing its element type"
    );
}

#[test]
fn test_value_document_summarizes_in_declaration_order() {
    let def = SchemaDef::from_value(json!({
        "type": "object",
        "fields": {
            "zeta": { "type": "string", "min_length": 3 },
            "alpha": { "type": "number" },
            "mid": { "type": "boolean" }
        }
    }))
    .unwrap();
    let schema = FieldSchema::try_from(def).unwrap();

    let errors = schema
        .validate(&json!({"zeta": "z", "alpha": "x", "mid": 1}), &FieldPath::root())
        .into_result()
        .unwrap_err();

    let paths: Vec<String> = summarize(&schema, &errors)
        .into_iter()
        .map(|entry| entry.path.to_string())
        .collect();
    assert_eq!(paths, vec!["zeta", "alpha", "mid"]);

    let keys: Vec<String> = errors.to_json().as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
}

//! Integration tests for cross-field refinements and partial validation.

use formcheck::{FieldPath, Refinement, Schema, SchemaConstructionError};
use serde_json::json;

fn unwrap_failure<T: std::fmt::Debug, E>(v: stillwater::Validation<T, E>) -> E {
    v.into_result().unwrap_err()
}

fn signup() -> formcheck::ObjectSchema {
    Schema::object()
        .field("email", Schema::string().email())
        .field("password", Schema::string().min_len(8))
        .field("confirmPassword", Schema::string())
        .fields_match("password", "confirmPassword", "passwords do not match")
        .unwrap()
}

#[test]
fn test_password_mismatch_reported_at_confirmation() {
    let errors = unwrap_failure(signup().validate(
        &json!({"email": "ops@example.com", "password": "secret123", "confirmPassword": "secret124"}),
        &FieldPath::root(),
    ));

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors.messages_at(&"confirmPassword".into()),
        vec!["passwords do not match"]
    );
    assert!(!errors.contains_path(&"password".into()));
    assert_eq!(errors.first().code, "fields_mismatch");
}

#[test]
fn test_senior_experience_rule() {
    let schema = Schema::object()
        .field(
            "experience",
            Schema::enumeration(["junior", "mid", "senior"]).unwrap(),
        )
        .field("yearsOfExperience", Schema::integer().non_negative())
        .refine(
            Refinement::new("senior roles require at least 5 years of experience", |obj| {
                let senior = obj.get("experience").and_then(|v| v.as_str()) == Some("senior");
                let years = obj
                    .get("yearsOfExperience")
                    .and_then(|v| v.as_f64())
                    .unwrap_or(0.0);
                !senior || years >= 5.0
            })
            .depends_on(["experience", "yearsOfExperience"])
            .target("yearsOfExperience"),
        )
        .unwrap();

    let errors = unwrap_failure(schema.validate(
        &json!({"experience": "senior", "yearsOfExperience": 3}),
        &FieldPath::root(),
    ));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().path.to_string(), "yearsOfExperience");

    assert!(schema
        .validate(&json!({"experience": "mid", "yearsOfExperience": 3}), &FieldPath::root())
        .is_success());
}

#[test]
fn test_refinement_sees_raw_values_after_field_failures() {
    let schema = Schema::object()
        .field("startDate", Schema::date())
        .field("endDate", Schema::date())
        .refine(
            Refinement::new("end date must be after start date", |obj| {
                match (
                    obj.get("startDate").and_then(|v| v.as_str()),
                    obj.get("endDate").and_then(|v| v.as_str()),
                ) {
                    (Some(start), Some(end)) => end > start,
                    _ => true,
                }
            })
            .depends_on(["startDate", "endDate"])
            .target("endDate")
            .with_code("date_order"),
        )
        .unwrap();

    let errors = unwrap_failure(schema.validate(
        &json!({"startDate": "2024-05-01", "endDate": "2024-04-01"}),
        &FieldPath::root(),
    ));
    assert_eq!(errors.with_code("date_order").len(), 1);
}

#[test]
fn test_conditional_required_field() {
    let webhook = Schema::object()
        .field("url", Schema::string().pattern(r"^https://").unwrap())
        .field("auth", Schema::enumeration(["none", "basic", "bearer"]).unwrap())
        .optional("token", Schema::string().min_len(16))
        .require_if("auth", |v| v == "bearer", "token", "a token is required for bearer auth")
        .unwrap();

    assert!(webhook
        .validate(
            &json!({"url": "https://hooks.example.com", "auth": "none"}),
            &FieldPath::root()
        )
        .is_success());

    let errors = unwrap_failure(webhook.validate(
        &json!({"url": "https://hooks.example.com", "auth": "bearer", "token": ""}),
        &FieldPath::root(),
    ));
    // field predicate and refinement both attach to `token`
    assert_eq!(
        errors.messages_at(&"token".into()),
        vec!["must be at least 16 characters", "a token is required for bearer auth"]
    );
}

#[test]
fn test_refinements_run_in_declaration_order() {
    let schema = Schema::object()
        .field("a", Schema::number())
        .field("b", Schema::number())
        .refine(Refinement::new("first", |_| false).depends_on(["a"]).target("b"))
        .unwrap()
        .refine(Refinement::new("second", |_| false).depends_on(["b"]).target("b"))
        .unwrap();

    let errors = unwrap_failure(schema.validate(&json!({"a": 1, "b": 2}), &FieldPath::root()));
    assert_eq!(errors.messages_at(&"b".into()), vec!["first", "second"]);
}

#[test]
fn test_refine_validates_target_and_dependencies() {
    let base = Schema::object().field("a", Schema::string());

    assert!(matches!(
        base.clone()
            .refine(Refinement::new("x", |_| true).depends_on(["a"]).target("nope")),
        Err(SchemaConstructionError::UnknownPath(_))
    ));
    assert!(matches!(
        base.clone().fields_match("a", "b", "x"),
        Err(SchemaConstructionError::UnknownPath(p)) if p == "b"
    ));
    assert!(matches!(
        base.refine(Refinement::new("x", |_| true).depends_on(["a", "ghost"])),
        Err(SchemaConstructionError::UnknownDependency(d)) if d == "ghost"
    ));
}

#[test]
fn test_partial_validation_never_reports_excluded_fields() {
    let value = json!({"email": "not-an-email", "password": "short", "confirmPassword": "other"});
    let schema = signup();

    let errors = unwrap_failure(schema.validate_subset(&value, &FieldPath::root(), ["email"]));
    assert_eq!(errors.len(), 1);
    assert!(errors.iter().all(|e| e.path.to_string() == "email"));

    let errors = unwrap_failure(schema.validate_subset(&value, &FieldPath::root(), ["password"]));
    assert!(!errors.contains_path(&"confirmPassword".into()));
    assert!(!errors.contains_path(&"email".into()));
}

#[test]
fn test_partial_validation_runs_refinement_once_dependencies_included() {
    let value = json!({"email": "ops@example.com", "password": "longenough", "confirmPassword": "other"});
    let schema = signup();

    let errors = unwrap_failure(schema.validate_subset(
        &value,
        &FieldPath::root(),
        ["password", "confirmPassword"],
    ));
    assert_eq!(
        errors.messages_at(&"confirmPassword".into()),
        vec!["passwords do not match"]
    );
}

#[test]
fn test_refinement_without_dependencies_only_runs_in_full_validation() {
    let schema = Schema::object()
        .optional("email", Schema::string())
        .optional("phone", Schema::string())
        .refine(Refinement::new("provide an email or a phone number", |obj| {
            obj.contains_key("email") || obj.contains_key("phone")
        }))
        .unwrap();

    assert!(schema
        .validate_subset(&json!({}), &FieldPath::root(), ["email", "phone"])
        .is_success());

    let errors = unwrap_failure(schema.validate(&json!({}), &FieldPath::root()));
    assert!(errors.first().path.is_root());
}

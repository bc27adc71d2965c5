//! Tests for error summaries and inline messages.

use formcheck::{first_messages, inline, summarize, FieldPath, Refinement, Schema};
use serde_json::json;

fn unwrap_failure<T: std::fmt::Debug, E>(v: stillwater::Validation<T, E>) -> E {
    v.into_result().unwrap_err()
}

#[test]
fn test_summary_follows_declaration_order_not_production_order() {
    // the refinement targets `name`, which is declared first but only
    // fails after every field has been checked
    let schema = Schema::object()
        .field("name", Schema::string())
        .field("email", Schema::string().email())
        .field("age", Schema::integer().min(18))
        .refine(
            Refinement::new("name is taken", |_| false)
                .depends_on(["name"])
                .target("name"),
        )
        .unwrap();

    let errors = unwrap_failure(schema.validate(
        &json!({"name": "ops", "email": "nope", "age": 12}),
        &FieldPath::root(),
    ));
    assert_eq!(errors.first().path.to_string(), "email");

    let paths: Vec<String> = summarize(&schema, &errors)
        .into_iter()
        .map(|entry| entry.path.to_string())
        .collect();
    assert_eq!(paths, vec!["name", "email", "age"]);
}

#[test]
fn test_array_errors_before_element_errors() {
    let schema = Schema::object()
        .field("title", Schema::string().non_empty())
        .field(
            "skills",
            Schema::array(Schema::string().non_empty())
                .min_len(4)
                .error("add at least four skills")
                .unique(),
        );

    let errors = unwrap_failure(schema.validate(
        &json!({"title": "", "skills": ["go", "", "go"]}),
        &FieldPath::root(),
    ));
    let lines: Vec<String> = summarize(&schema, &errors)
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        lines,
        vec![
            "title: is required",
            "skills: add at least four skills",
            "skills.1: is required",
            "skills.2: duplicate value",
        ]
    );
}

#[test]
fn test_root_errors_are_listed_without_a_path() {
    let schema = Schema::object()
        .optional("email", Schema::string().email())
        .optional("phone", Schema::string().phone())
        .refine(Refinement::new("provide an email or a phone number", |obj| {
            obj.contains_key("email") || obj.contains_key("phone")
        }))
        .unwrap();

    let errors = unwrap_failure(schema.validate(&json!({}), &FieldPath::root()));
    let summary = summarize(&schema, &errors);
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].to_string(), "provide an email or a phone number");
}

#[test]
fn test_inline_and_first_messages() {
    let schema = Schema::object()
        .field("token", Schema::string().min_len(16))
        .field("auth", Schema::string())
        .require_if("auth", |v| v == "bearer", "token", "a token is required")
        .unwrap();

    let errors = unwrap_failure(schema.validate(
        &json!({"token": "", "auth": "bearer"}),
        &FieldPath::root(),
    ));

    let token = FieldPath::from_field("token");
    assert_eq!(
        inline(&errors)[&token],
        vec!["must be at least 16 characters", "a token is required"]
    );
    assert_eq!(first_messages(&errors)[&token], "must be at least 16 characters");
}

#[test]
fn test_summary_on_field_schema() {
    let schema: formcheck::FieldSchema = Schema::object()
        .field("b", Schema::number())
        .field("a", Schema::number())
        .into();

    let errors = unwrap_failure(schema.validate(&json!({"a": "x", "b": "y"}), &FieldPath::root()));
    let paths: Vec<String> = summarize(&schema, &errors)
        .into_iter()
        .map(|e| e.path.to_string())
        .collect();
    assert_eq!(paths, vec!["b", "a"]);
}

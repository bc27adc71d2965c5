//! Tests for field paths and error collections.

use formcheck::{FieldError, FieldErrors, FieldPath, PathSegment};
use serde_json::json;
use stillwater::Semigroup;

#[test]
fn test_path_parse_and_display() {
    let path: FieldPath = "contacts.0.phone".parse().unwrap();
    assert_eq!(
        path.segments().cloned().collect::<Vec<_>>(),
        vec![
            PathSegment::field("contacts"),
            PathSegment::index(0),
            PathSegment::field("phone"),
        ]
    );
    assert_eq!(path.to_string(), "contacts.0.phone");
    assert_eq!(path.first_field(), Some("contacts"));
    assert_eq!(path.parent().map(|p| p.to_string()), Some("contacts.0".to_string()));
    assert!(FieldPath::parse("").is_root());
}

#[test]
fn test_path_prefixes() {
    let rows = FieldPath::from_field("skills");
    let cell = rows.push_index(3).push_field("name");

    assert!(cell.starts_with(&rows));
    assert!(!rows.starts_with(&cell));
    assert_eq!(cell.strip_prefix(&rows).map(|p| p.to_string()), Some("3.name".to_string()));
    assert_eq!(rows.join(&FieldPath::from_index(3)).to_string(), "skills.3");
}

#[test]
fn test_combine_keeps_order_and_duplicates() {
    let first = FieldErrors::single(FieldError::new("token".into(), "too short").with_code("min_length"));
    let second = FieldErrors::single(FieldError::new("token".into(), "a token is required"))
        .push(FieldError::new("url".into(), "must use https"));

    let all = first.combine(second);
    assert_eq!(all.len(), 3);
    assert_eq!(all.path_count(), 2);
    assert_eq!(
        all.messages_at(&"token".into()),
        vec!["too short", "a token is required"]
    );
    assert_eq!(all.with_code("validation_error").len(), 2);
}

#[test]
fn test_message_map_and_json() {
    let errors = FieldErrors::from_vec(vec![
        FieldError::new("address.zipCode".into(), "must be 5 digits"),
        FieldError::new("email".into(), "invalid email address"),
        FieldError::new("address.zipCode".into(), "unknown zip code"),
    ])
    .unwrap();

    let map = errors.to_message_map();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["address.zipCode", "email"]);
    assert_eq!(
        errors.to_json(),
        json!({
            "address.zipCode": ["must be 5 digits", "unknown zip code"],
            "email": ["invalid email address"]
        })
    );
}

#[test]
fn test_from_vec_empty_and_retain() {
    assert!(FieldErrors::from_vec(Vec::new()).is_none());

    let errors = FieldErrors::from_vec(vec![
        FieldError::new("a".into(), "x"),
        FieldError::new("b".into(), "y"),
    ])
    .unwrap();
    let kept = errors.retain(|e| e.path.to_string() == "b").unwrap();
    assert_eq!(kept.len(), 1);
    assert!(kept.clone().retain(|_| false).is_none());
}

#[test]
fn test_display() {
    let errors = FieldErrors::from_vec(vec![
        FieldError::new(FieldPath::root(), "provide an email or a phone number"),
        FieldError::new("age".into(), "must be at least 18"),
    ])
    .unwrap();

    assert_eq!(
        errors.to_string(),
        "Validation failed with 2 error(s):\n  1. (root): provide an email or a phone number\n  2. age: must be at least 18\n"
    );
}

#[test]
fn test_numeric_field_name_lookup() {
    let schema = formcheck::Schema::object().field("1", formcheck::Schema::string().min_len(2));
    let errors = schema
        .validate(&json!({"1": "a"}), &FieldPath::root())
        .into_result()
        .unwrap_err();

    assert!(errors.messages_at(&"1".into()).is_empty());
    assert_eq!(
        errors.messages_at(&FieldPath::from_field("1")),
        vec!["must be at least 2 characters"]
    );
}

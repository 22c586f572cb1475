//! Tests for the row validator.

use rowtrace_model::{Row, Value};
use rowtrace_validate::{CompareOp, FieldType, Rule, Validator};

fn person_validator() -> Validator {
    Validator::new()
        .field("age", FieldType::Int)
        .field("name", FieldType::Str)
        .field("email", FieldType::Str)
        .rule(Rule::compare("Age must be positive", "age", CompareOp::Gt, 0.0))
        .rule(Rule::new("Name must be at least 3 characters", |row| {
            Ok(row.require_str("name")?.chars().count() > 2)
        }))
        .rule(Rule::new("Email must contain @", |row| {
            Ok(row.require_str("email")?.contains('@'))
        }))
}

fn person(age: impl Into<Value>, name: &str, email: &str) -> Row {
    Row::default()
        .with("age", age)
        .with("name", name)
        .with("email", email)
}

#[test]
fn valid_row_passes() {
    let row = person(25_i64, "Alice", "alice@example.com");
    assert!(person_validator().validate(&row).is_ok());
}

#[test]
fn missing_key_is_reported() {
    let row = Row::default()
        .with("age", 25_i64)
        .with("email", "alice@example.com");
    let error = person_validator().validate(&row).unwrap_err();
    assert_eq!(error.get("name"), Some("Missing key: name"));
}

#[test]
fn wrong_type_is_reported() {
    let row = person("twenty-five", "Alice", "alice@example.com");
    let error = person_validator().validate(&row).unwrap_err();
    assert_eq!(error.get("age"), Some("Expected int, got str"));
}

#[test]
fn rule_violations_are_collected() {
    let row = person(-5_i64, "Jo", "user@example.com");
    let error = person_validator().validate(&row).unwrap_err();
    assert!(error.errors.contains_key("Age must be positive"));
    assert!(error.errors.contains_key("Name must be at least 3 characters"));
    assert!(!error.errors.contains_key("Email must contain @"));
}

#[test]
fn invalid_email_is_reported() {
    let row = person(30_i64, "John", "userexample.com");
    let error = person_validator().validate(&row).unwrap_err();
    insta::assert_snapshot!(
        error.to_string(),
        @r#"Validation failed: {"Email must contain @": "Validation failed: Email must contain @"}"#
    );
}

#[test]
fn rule_evaluation_error_is_reported() {
    let validator = Validator::new()
        .field("age", FieldType::Int)
        .rule(Rule::compare("Invalid rule", "nonexistent", CompareOp::Gt, 0.0));
    let row = Row::default().with("age", 25_i64);
    let error = validator.validate(&row).unwrap_err();
    let message = error.get("Invalid rule").expect("rule error recorded");
    assert!(message.starts_with("Rule evaluation error"));
    assert!(message.contains("missing field: nonexistent"));
}

#[test]
fn field_type_deserializes_from_config() {
    let parsed: FieldType = serde_json::from_str("\"number\"").expect("parse field type");
    assert_eq!(parsed, FieldType::Number);
    assert!(parsed.accepts(&Value::Float(1.5)));
    assert!(parsed.accepts(&Value::Int(1)));
    assert!(!parsed.accepts(&Value::Null));
}

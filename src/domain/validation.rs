//! Request validation rules
//!
//! Each operation declares a table of `(field, rules)` pairs. [`validate`] walks
//! the table over a JSON object and collects every failure before anything is
//! written. Store-backed checks (ISBN uniqueness, author existence) run
//! afterwards in the service layer and add to the same error set.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::{DomainError, SortDirection, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Field must be present and not null
    Required,
    /// Any string
    String,
    /// String with at least one non-whitespace character
    Text,
    /// Non-empty array of positive integer ids
    IdList,
    /// Calendar date in `YYYY-MM-DD` form
    Date,
    /// String (or unsigned integer) of exactly N ASCII digits
    Digits(usize),
    /// Number or numeric string
    Numeric,
    /// Numeric and >= 0
    NotNegative,
    /// true/false, 0/1, or their string forms
    Boolean,
    /// `asc` or `desc`, case-insensitive
    Direction,
}

pub type RuleSet = &'static [(&'static str, &'static [Rule])];

pub const CREATE_BOOK_RULES: RuleSet = &[
    ("title", &[Rule::Required, Rule::Text]),
    ("authors", &[Rule::Required, Rule::IdList]),
    ("publish_date", &[Rule::Required, Rule::Date]),
    ("isbn", &[Rule::Required, Rule::Digits(13)]),
    ("price", &[Rule::Required, Rule::Numeric, Rule::NotNegative]),
];

/// Partial update: every field is optional. `author` is the singular
/// free-text credit, not the `authors` id list used on create.
pub const UPDATE_BOOK_RULES: RuleSet = &[
    ("title", &[Rule::Text]),
    ("author", &[Rule::String]),
    ("isbn", &[Rule::Digits(13)]),
    ("is_available", &[Rule::Boolean]),
];

pub const LIST_BOOKS_RULES: RuleSet = &[
    ("search", &[Rule::String]),
    ("min_price", &[Rule::Numeric]),
    ("max_price", &[Rule::Numeric]),
    ("sort", &[Rule::Direction]),
];

pub const CREATE_AUTHOR_RULES: RuleSet = &[("name", &[Rule::Required, Rule::Text])];

/// Run every rule of `rules` against `input`. Checking a field stops at its
/// first failing rule; a `null` value counts as absent.
pub fn validate(input: &Map<String, Value>, rules: RuleSet) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    for &(field, field_rules) in rules {
        let value = input.get(field).filter(|v| !v.is_null());

        let Some(value) = value else {
            if field_rules.contains(&Rule::Required) {
                errors.add(field, format!("The {} field is required.", label(field)));
            }
            continue;
        };

        for rule in field_rules {
            if let Some(message) = check(*rule, field, value) {
                errors.add(field, message);
                break;
            }
        }
    }

    errors
}

/// Borrow the request body as an object, rejecting arrays and scalars.
pub fn as_object(body: &Value) -> Result<&Map<String, Value>, DomainError> {
    body.as_object()
        .ok_or_else(|| DomainError::BadRequest("request body must be a JSON object".to_string()))
}

/// Fetch a field that [`validate`] has already accepted.
pub fn required<T>(
    input: &Map<String, Value>,
    field: &str,
    extract: fn(&Value) -> Option<T>,
) -> Result<T, DomainError> {
    input
        .get(field)
        .and_then(extract)
        .ok_or_else(|| DomainError::invalid(field, format!("The {} field is invalid.", label(field))))
}

/// Fetch an optional field; absent, null and unconvertible values are `None`.
pub fn optional<T>(
    input: &Map<String, Value>,
    field: &str,
    extract: fn(&Value) -> Option<T>,
) -> Option<T> {
    input.get(field).and_then(extract)
}

pub fn taken_message(field: &str) -> String {
    format!("The {} has already been taken.", label(field))
}

fn check(rule: Rule, field: &str, value: &Value) -> Option<String> {
    let name = label(field);
    let failed = match rule {
        Rule::Required => false,
        Rule::String => value.as_str().is_none(),
        Rule::Text => {
            return match value.as_str() {
                None => Some(format!("The {name} field must be a string.")),
                Some(s) if s.trim().is_empty() => {
                    Some(format!("The {name} field must not be empty."))
                }
                Some(_) => None,
            };
        }
        Rule::IdList => {
            return match value.as_array() {
                None => Some(format!("The {name} field must be an array.")),
                Some(items) if items.is_empty() => {
                    Some(format!("The {name} field must have at least 1 item."))
                }
                Some(items) if items.iter().any(|item| as_id(item).is_none()) => {
                    Some(format!("The {name} field must contain only positive integer ids."))
                }
                Some(_) => None,
            };
        }
        Rule::Date => as_date(value).is_none(),
        Rule::Digits(len) => {
            return match as_digits(value) {
                Some(digits) if digits.len() == len => None,
                _ => Some(format!("The {name} field must be {len} digits.")),
            };
        }
        Rule::Numeric => as_number(value).is_none(),
        Rule::NotNegative => as_number(value).is_some_and(|n| n < 0.0),
        Rule::Boolean => as_boolean(value).is_none(),
        Rule::Direction => as_direction(value).is_none(),
    };

    failed.then(|| match rule {
        Rule::String => format!("The {name} field must be a string."),
        Rule::Date => format!("The {name} field must be a valid date (YYYY-MM-DD)."),
        Rule::Numeric => format!("The {name} field must be a number."),
        Rule::NotNegative => format!("The {name} field must be at least 0."),
        Rule::Boolean => format!("The {name} field must be true or false."),
        Rule::Direction => format!("The {name} field must be one of: asc, desc."),
        _ => format!("The {name} field is invalid."),
    })
}

fn label(field: &str) -> String {
    field.replace('_', " ")
}

pub fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

pub fn as_text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn as_id(value: &Value) -> Option<i32> {
    let id = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    i32::try_from(id).ok().filter(|id| *id > 0)
}

/// Ids in first-seen order with duplicates removed.
pub fn as_ids(value: &Value) -> Option<Vec<i32>> {
    let mut ids = Vec::new();
    for item in value.as_array()? {
        let id = as_id(item)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Some(ids)
}

pub fn as_date(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|date| date.format("%Y-%m-%d").to_string())
}

pub fn as_digits(value: &Value) -> Option<String> {
    let digits = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_u64()?.to_string(),
        _ => return None,
    };
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
}

pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

pub fn as_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64()? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "0" | "false" => Some(false),
            "1" | "true" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

pub fn as_direction(value: &Value) -> Option<SortDirection> {
    value.as_str().and_then(SortDirection::parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn dune() -> Map<String, Value> {
        object(json!({
            "title": "Dune",
            "authors": [1],
            "publish_date": "1965-08-01",
            "isbn": "9780441013593",
            "price": 12.99
        }))
    }

    #[test]
    fn test_valid_create_body_passes() {
        assert!(validate(&dune(), CREATE_BOOK_RULES).is_empty());
    }

    #[test]
    fn test_empty_create_body_reports_every_required_field() {
        let errors = validate(&Map::new(), CREATE_BOOK_RULES);
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(
            fields,
            vec!["authors", "isbn", "price", "publish_date", "title"]
        );
        assert_eq!(
            errors.get("publish_date").unwrap(),
            &["The publish date field is required.".to_string()]
        );
    }

    #[test]
    fn test_short_isbn_is_rejected() {
        let mut body = dune();
        body.insert("isbn".into(), json!("97804410135"));
        let errors = validate(&body, CREATE_BOOK_RULES);
        assert_eq!(
            errors.get("isbn").unwrap(),
            &["The isbn field must be 13 digits.".to_string()]
        );
        assert!(!errors.contains("title"));
    }

    #[test]
    fn test_isbn_with_non_digits_is_rejected() {
        let mut body = dune();
        body.insert("isbn".into(), json!("978-044101359"));
        assert!(validate(&body, CREATE_BOOK_RULES).contains("isbn"));
    }

    #[test]
    fn test_numeric_isbn_is_accepted() {
        let mut body = dune();
        body.insert("isbn".into(), json!(9780441013593u64));
        assert!(validate(&body, CREATE_BOOK_RULES).is_empty());
        assert_eq!(
            as_digits(body.get("isbn").unwrap()).as_deref(),
            Some("9780441013593")
        );
    }

    #[test]
    fn test_authors_must_be_non_empty_id_list() {
        let mut body = dune();
        body.insert("authors".into(), json!([]));
        assert!(validate(&body, CREATE_BOOK_RULES).contains("authors"));

        body.insert("authors".into(), json!("Frank Herbert"));
        assert!(validate(&body, CREATE_BOOK_RULES).contains("authors"));

        body.insert("authors".into(), json!([1, -2]));
        assert!(validate(&body, CREATE_BOOK_RULES).contains("authors"));
    }

    #[test]
    fn test_duplicate_author_ids_are_collapsed() {
        assert_eq!(as_ids(&json!([3, 1, 3, "1"])), Some(vec![3, 1]));
    }

    #[test]
    fn test_invalid_date_and_negative_price() {
        let mut body = dune();
        body.insert("publish_date".into(), json!("1965-02-30"));
        body.insert("price".into(), json!(-1));
        let errors = validate(&body, CREATE_BOOK_RULES);
        assert!(errors.contains("publish_date"));
        assert_eq!(
            errors.get("price").unwrap(),
            &["The price field must be at least 0.".to_string()]
        );
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let mut body = dune();
        body.insert("title".into(), json!("   "));
        assert!(validate(&body, CREATE_BOOK_RULES).contains("title"));
    }

    #[test]
    fn test_update_rules_accept_empty_body() {
        assert!(validate(&Map::new(), UPDATE_BOOK_RULES).is_empty());
    }

    #[test]
    fn test_update_rules_check_present_fields() {
        let body = object(json!({ "is_available": "maybe", "isbn": "123", "author": 5 }));
        let errors = validate(&body, UPDATE_BOOK_RULES);
        assert!(errors.contains("is_available"));
        assert!(errors.contains("isbn"));
        assert!(errors.contains("author"));
    }

    #[test]
    fn test_null_counts_as_absent() {
        let body = object(json!({ "title": null }));
        assert!(validate(&body, UPDATE_BOOK_RULES).is_empty());
        assert!(validate(&body, CREATE_BOOK_RULES).contains("title"));
    }

    #[test]
    fn test_boolean_forms() {
        assert_eq!(as_boolean(&json!(false)), Some(false));
        assert_eq!(as_boolean(&json!(1)), Some(true));
        assert_eq!(as_boolean(&json!("0")), Some(false));
        assert_eq!(as_boolean(&json!(2)), None);
    }

    #[test]
    fn test_list_rules_reject_non_numeric_prices_and_unknown_sort() {
        let query = object(json!({ "min_price": "cheap", "max_price": "20", "sort": "sideways" }));
        let errors = validate(&query, LIST_BOOKS_RULES);
        assert!(errors.contains("min_price"));
        assert!(!errors.contains("max_price"));
        assert!(errors.contains("sort"));
    }

    #[test]
    fn test_required_reports_field_when_extraction_fails() {
        let body = object(json!({ "price": "abc" }));
        match required(&body, "price", as_number) {
            Err(DomainError::Validation(errors)) => assert!(errors.contains("price")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }
}

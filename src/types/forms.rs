//! Posted form bodies and their validation rules.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationErrors};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserInput {
    #[serde(default)]
    #[validate(length(min = 3, code = "min"))]
    pub login: String,
    #[serde(default)]
    #[validate(length(min = 3, code = "min"))]
    pub password: String,
}

/// Edit form: a blank password keeps the stored hash.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdateInput {
    #[serde(default)]
    #[validate(length(min = 3, code = "min"))]
    pub login: String,
    #[serde(default)]
    #[validate(length(min = 3, code = "min"))]
    pub password: Option<String>,
}

impl UserUpdateInput {
    /// Browsers post an empty field rather than omitting it.
    pub fn normalized(mut self) -> Self {
        if self.password.as_deref().is_some_and(str::is_empty) {
            self.password = None;
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PageInput {
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub slug: String,
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

/// One line per failed rule, e.g. `[Validation error] Login: Field is too short`.
/// Sorted by field so re-rendered forms are stable.
pub fn human_validation_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            let label = capitalize(&field);
            errs.iter()
                .map(move |err| format!("[Validation error] {label}: {}", reason(err)))
        })
        .collect()
}

fn reason(err: &validator::ValidationError) -> &'static str {
    let empty = matches!(err.params.get("value"), Some(Value::String(s)) if s.is_empty());
    match &*err.code {
        "required" => "Field is required",
        "min" if empty => "Field is required",
        "min" => "Field is too short",
        _ => "Invalid input",
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_login_is_too_short() {
        let input = UserInput {
            login: "ab".into(),
            password: "secret".into(),
        };
        let errs = input.validate().expect_err("login too short");
        assert_eq!(
            human_validation_errors(&errs),
            vec!["[Validation error] Login: Field is too short"]
        );
    }

    #[test]
    fn empty_fields_are_required() {
        let errs = UserInput::default().validate().expect_err("both empty");
        assert_eq!(
            human_validation_errors(&errs),
            vec![
                "[Validation error] Login: Field is required",
                "[Validation error] Password: Field is required",
            ]
        );

        let errs = PageInput::default().validate().expect_err("both empty");
        let lines = human_validation_errors(&errs);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Content"));
        assert!(lines[1].contains("Slug"));
    }

    #[test]
    fn blank_password_on_update_is_skipped() {
        let input = UserUpdateInput {
            login: "admin".into(),
            password: Some(String::new()),
        }
        .normalized();
        assert!(input.password.is_none());
        assert!(input.validate().is_ok());

        let input = UserUpdateInput {
            login: "admin".into(),
            password: Some("xy".into()),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn valid_page() {
        let input = PageInput {
            slug: "about".into(),
            content: "hello".into(),
        };
        assert!(input.validate().is_ok());
    }
}

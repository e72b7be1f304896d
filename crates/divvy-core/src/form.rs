//! Form field state and bindings.
//!
//! A [`FormState`] owns the values, rules, and errors of a screen's named
//! fields. [`FormField`] is the per-field binding the text input consumes:
//! current value, write-through edits, and the error accent.

use std::collections::HashMap;

use regex::Regex;

/// A validation rule with the message shown when it fails.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Value must be non-empty.
    Required {
        message: String,
    },
    /// Value must be at least this many characters.
    MinLength {
        min: usize,
        message: String,
    },
    /// Value must match the pattern.
    Pattern {
        pattern: Regex,
        message: String,
    },
}

impl Rule {
    /// Rule requiring a non-empty value.
    pub fn required(message: impl Into<String>) -> Self {
        Rule::Required {
            message: message.into(),
        }
    }

    /// Rule requiring a minimum character count.
    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Rule::MinLength {
            min,
            message: message.into(),
        }
    }

    /// Rule requiring the value to match a pattern.
    pub fn pattern(pattern: Regex, message: impl Into<String>) -> Self {
        Rule::Pattern {
            pattern,
            message: message.into(),
        }
    }

    /// Returns the failure message when the value violates this rule.
    fn check(&self, value: &str) -> Option<&str> {
        match self {
            Rule::Required {
                message,
            } => value.is_empty().then_some(message.as_str()),
            Rule::MinLength {
                min,
                message,
            } => (value.chars().count() < *min).then_some(message.as_str()),
            Rule::Pattern {
                pattern,
                message,
            } => (!pattern.is_match(value)).then_some(message.as_str()),
        }
    }
}

/// State of a single named field.
#[derive(Debug, Clone, Default)]
struct FieldState {
    value: String,
    rules: Vec<Rule>,
    error: Option<String>,
}

/// Controller owning a screen's form fields.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    fields: HashMap<String, FieldState>,
}

impl FormState {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a field with its rules. The value starts empty.
    ///
    /// Registering an existing name replaces its rules and keeps its value,
    /// so a remounted screen does not lose what the user typed.
    pub fn register(&mut self, name: &str, rules: Vec<Rule>) {
        let field = self.fields.entry(name.to_string()).or_default();
        field.rules = rules;
    }

    /// Returns the current value, empty for unknown fields.
    pub fn value(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", |f| f.value.as_str())
    }

    /// Sets a field's value, registering the name if needed.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) {
        self.fields.entry(name.to_string()).or_default().value = value.into();
    }

    /// Returns the current error message for a field.
    pub fn error(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|f| f.error.as_deref())
    }

    /// Sets a caller-supplied error message, e.g. from a server response.
    pub fn set_error(&mut self, name: &str, message: impl Into<String>) {
        self.fields.entry(name.to_string()).or_default().error = Some(message.into());
    }

    /// Clears a field's error.
    pub fn clear_error(&mut self, name: &str) {
        if let Some(field) = self.fields.get_mut(name) {
            field.error = None;
        }
    }

    /// Runs every field's rules. The first failing rule sets the field's
    /// error; valid fields have theirs cleared. Returns whether all fields
    /// passed.
    pub fn validate(&mut self) -> bool {
        let mut all_valid = true;
        for field in self.fields.values_mut() {
            let failure = field
                .rules
                .iter()
                .find_map(|rule| rule.check(&field.value))
                .map(str::to_string);
            all_valid &= failure.is_none();
            field.error = failure;
        }
        all_valid
    }

    /// Runs one field's rules. Returns whether it passed.
    pub fn validate_field(&mut self, name: &str) -> bool {
        let Some(field) = self.fields.get_mut(name) else {
            return true;
        };
        let failure = field
            .rules
            .iter()
            .find_map(|rule| rule.check(&field.value))
            .map(str::to_string);
        let valid = failure.is_none();
        field.error = failure;
        valid
    }
}

/// Outline accent of a bound input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Primary,
    Error,
}

/// Live binding of one named field.
///
/// Binding registers the field, so a screen declares its inputs by binding
/// them, the way the mobile client declares them with a controller hook.
pub struct FormField<'a> {
    state: &'a mut FormState,
    name: String,
}

impl<'a> FormField<'a> {
    /// Binds a field on the form, registering it with the given rules.
    pub fn bind(state: &'a mut FormState, name: &str, rules: Vec<Rule>) -> Self {
        state.register(name, rules);
        Self {
            state,
            name: name.to_string(),
        }
    }

    /// Current value of the bound field.
    pub fn value(&self) -> &str {
        self.state.value(&self.name)
    }

    /// Write-through for each edit.
    pub fn on_change(&mut self, value: impl Into<String>) {
        self.state.set_value(&self.name, value);
    }

    /// Current error message, empty when there is none. The screen treats
    /// an empty message as "no error to show".
    pub fn error(&self) -> &str {
        self.state.error(&self.name).unwrap_or("")
    }

    /// Accent for the input outline: error wins whenever a message is set.
    pub fn accent(&self) -> Accent {
        if self.error().is_empty() {
            Accent::Primary
        } else {
            Accent::Error
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: registered fields start with an empty value and no error.
    #[test]
    fn test_register_defaults() {
        let mut form = FormState::new();
        form.register("email", vec![Rule::required("Email is required")]);

        assert_eq!(form.value("email"), "");
        assert_eq!(form.error("email"), None);
    }

    /// Test: binding registers the field and edits write through.
    #[test]
    fn test_bind_writes_through() {
        let mut form = FormState::new();
        {
            let mut field = FormField::bind(&mut form, "username", vec![]);
            field.on_change("ada");
            assert_eq!(field.value(), "ada");
        }

        assert_eq!(form.value("username"), "ada");
    }

    /// Test: rebinding a field keeps the typed value.
    #[test]
    fn test_rebind_keeps_value() {
        let mut form = FormState::new();
        FormField::bind(&mut form, "username", vec![]).on_change("ada");
        let field = FormField::bind(&mut form, "username", vec![Rule::required("required")]);

        assert_eq!(field.value(), "ada");
    }

    /// Test: required catches empty values.
    #[test]
    fn test_validate_required() {
        let mut form = FormState::new();
        form.register("email", vec![Rule::required("Email is required")]);

        assert!(!form.validate());
        assert_eq!(form.error("email"), Some("Email is required"));

        form.set_value("email", "ada@example.com");
        assert!(form.validate());
        assert_eq!(form.error("email"), None);
    }

    /// Test: minimum length counts characters.
    #[test]
    fn test_validate_min_length() {
        let mut form = FormState::new();
        form.register("password", vec![Rule::min_length(8, "Too short")]);
        form.set_value("password", "1234567");

        assert!(!form.validate_field("password"));
        assert_eq!(form.error("password"), Some("Too short"));

        form.set_value("password", "12345678");
        assert!(form.validate_field("password"));
    }

    /// Test: pattern rules apply the regex.
    #[test]
    fn test_validate_pattern() {
        let mut form = FormState::new();
        form.register(
            "email",
            vec![Rule::pattern(
                Regex::new(r"^\S+@\S+\.\S+$").unwrap(),
                "Invalid email address",
            )],
        );
        form.set_value("email", "not-an-email");

        assert!(!form.validate());
        assert_eq!(form.error("email"), Some("Invalid email address"));
    }

    /// Test: the first failing rule's message wins.
    #[test]
    fn test_first_failing_rule_wins() {
        let mut form = FormState::new();
        form.register(
            "password",
            vec![
                Rule::required("Password is required"),
                Rule::min_length(8, "Too short"),
            ],
        );

        form.validate();
        assert_eq!(form.error("password"), Some("Password is required"));
    }

    /// Test: caller-supplied errors drive the accent until cleared.
    #[test]
    fn test_caller_error_and_accent() {
        let mut form = FormState::new();
        form.register("email", vec![]);
        form.set_error("email", "Account not found");

        let field = FormField::bind(&mut form, "email", vec![]);
        assert_eq!(field.error(), "Account not found");
        assert_eq!(field.accent(), Accent::Error);

        form.clear_error("email");
        let field = FormField::bind(&mut form, "email", vec![]);
        assert_eq!(field.error(), "");
        assert_eq!(field.accent(), Accent::Primary);
    }

    /// Test: validate clears errors that no longer apply.
    #[test]
    fn test_validate_clears_stale_errors() {
        let mut form = FormState::new();
        form.register("email", vec![Rule::required("Email is required")]);
        form.set_error("email", "Server rejected the address");
        form.set_value("email", "ada@example.com");

        assert!(form.validate());
        assert_eq!(form.error("email"), None);
    }
}

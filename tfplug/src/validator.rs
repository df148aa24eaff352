use crate::fields::is_exact_int;
use crate::types::{AttributePath, Diagnostic, Dynamic};

pub trait Validator: Send + Sync {
    fn description(&self) -> String;

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>);
}

/// Accepts a string, or every element of a string set, from a fixed list.
/// Null and unknown values are left for later.
pub struct OneOf {
    pub allowed: &'static [&'static str],
}

impl OneOf {
    pub const fn new(allowed: &'static [&'static str]) -> Self {
        Self { allowed }
    }

    fn check(&self, value: &str, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if !self.allowed.contains(&value) {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid Element",
                    format!(
                        "{} is not supported (expected: {})",
                        value,
                        self.allowed.join(", ")
                    ),
                )
                .with_attribute(path.clone()),
            );
        }
    }
}

impl Validator for OneOf {
    fn description(&self) -> String {
        format!("value must be one of: {}", self.allowed.join(", "))
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        match value {
            Dynamic::String(s) => self.check(s, path, diagnostics),
            Dynamic::List(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if let Dynamic::String(s) = item {
                        self.check(s, &path.clone().index(idx as i64), diagnostics);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Accepts numbers that convert to an `i64` without rounding: no fraction
/// and a magnitude within 2^53.
pub struct ExactInteger;

impl Validator for ExactInteger {
    fn description(&self) -> String {
        "value must be a whole number within +/- 2^53".to_string()
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Dynamic::Number(n) = value {
            if !is_exact_int(*n) {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid Number",
                        format!("{} is not a whole number within +/- 2^53", n),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENTS: OneOf = OneOf::new(&["push", "tag", "pull_request"]);

    #[test]
    fn one_of_accepts_allowed_string() {
        let mut diags = Vec::new();
        EVENTS.validate(
            &Dynamic::String("tag".to_string()),
            &AttributePath::new("events"),
            &mut diags,
        );

        assert!(diags.is_empty());
    }

    #[test]
    fn one_of_rejects_unknown_element_in_set() {
        let mut diags = Vec::new();
        let value = Dynamic::List(vec![
            Dynamic::String("push".to_string()),
            Dynamic::String("merge".to_string()),
        ]);
        EVENTS.validate(&value, &AttributePath::new("events"), &mut diags);

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Invalid Element");
        assert_eq!(
            diags[0].detail,
            "merge is not supported (expected: push, tag, pull_request)"
        );
        assert_eq!(diags[0].attribute, Some(AttributePath::new("events").index(1)));
    }

    #[test]
    fn one_of_skips_null_and_unknown() {
        let mut diags = Vec::new();
        EVENTS.validate(&Dynamic::Null, &AttributePath::new("events"), &mut diags);
        EVENTS.validate(&Dynamic::Unknown, &AttributePath::new("events"), &mut diags);

        assert!(diags.is_empty());
    }

    #[test]
    fn exact_integer_rejects_fractions_and_huge_values() {
        let path = AttributePath::new("timeout");
        let mut diags = Vec::new();

        ExactInteger.validate(&Dynamic::Number(60.0), &path, &mut diags);
        ExactInteger.validate(&Dynamic::Unknown, &path, &mut diags);
        assert!(diags.is_empty());

        ExactInteger.validate(&Dynamic::Number(1.5), &path, &mut diags);
        ExactInteger.validate(&Dynamic::Number(2f64.powi(60)), &path, &mut diags);
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].summary, "Invalid Number");
    }
}

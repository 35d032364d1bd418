//! Field validation shared by entity drafts.
//!
//! Violations accumulate as `"field: message"` lines so a single response can
//! report every problem with a request body.

use super::Error;

/// Accumulates field violations and converts them into an
/// [`Error::invalid_request`] carrying one detail line per violation.
///
/// # Examples
/// ```
/// use contactbook::domain::{ErrorCode, Validator};
///
/// let mut validator = Validator::new();
/// validator
///     .required("country", "", 100)
///     .optional("postal_code", Some("0123456789012"), 10);
/// let error = validator.finish().expect_err("invalid");
/// assert_eq!(error.code(), ErrorCode::InvalidRequest);
/// assert_eq!(
///     error.details(),
///     ["country: must not be empty", "postal_code: must be at most 10 characters"]
/// );
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<String>,
}

impl Validator {
    /// Start with no violations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation for `field`.
    pub fn violation(&mut self, field: &str, message: impl AsRef<str>) -> &mut Self {
        self.violations
            .push(format!("{field}: {}", message.as_ref()));
        self
    }

    /// Require a non-blank value of at most `max` characters.
    pub fn required(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.trim().is_empty() {
            return self.violation(field, "must not be empty");
        }
        self.max_length(field, value, max)
    }

    /// Require a value of `min..=max` characters.
    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        if value.chars().count() < min {
            return self.violation(field, format!("must be at least {min} characters"));
        }
        self.max_length(field, value, max)
    }

    /// Check an optional value against a maximum length.
    pub fn optional(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        match value {
            Some(value) => self.max_length(field, value, max),
            None => self,
        }
    }

    /// Check an optional email address: bounded length and an `@`.
    pub fn email(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        let Some(value) = value else {
            return self;
        };
        if !value.contains('@') {
            return self.violation(field, "must be a valid email address");
        }
        self.max_length(field, value, max)
    }

    /// Record `message` against `field` unless `ok` holds.
    pub fn ensure(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if ok { self } else { self.violation(field, message) }
    }

    fn max_length(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            return self.violation(field, format!("must be at most {max} characters"));
        }
        self
    }

    /// Whether no violation has been recorded.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Convert accumulated violations into a validation error.
    pub fn finish(self) -> Result<(), Error> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(Error::invalid_request("validation failed").with_details(self.violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "name: must not be empty")]
    #[case("   ", "name: must not be empty")]
    #[case("abcdefghijk", "name: must be at most 10 characters")]
    fn required_rejects(#[case] value: &str, #[case] expected: &str) {
        let mut validator = Validator::new();
        validator.required("name", value, 10);
        let error = validator.finish().expect_err("invalid");
        assert_eq!(error.details(), [expected]);
    }

    #[rstest]
    fn length_counts_characters_not_bytes() {
        let mut validator = Validator::new();
        validator.length("password", "ééééééé", 8, 100);
        let error = validator.finish().expect_err("too short");
        assert_eq!(error.details(), ["password: must be at least 8 characters"]);

        let mut validator = Validator::new();
        validator.required("title", "éééé", 4);
        assert!(validator.is_valid());
    }

    #[rstest]
    #[case(Some("not-an-email"), false)]
    #[case(Some("ada@example.com"), true)]
    #[case(None, true)]
    fn email_requires_at_sign(#[case] value: Option<&str>, #[case] valid: bool) {
        let mut validator = Validator::new();
        validator.email("email", value, 200);
        assert_eq!(validator.is_valid(), valid);
    }

    #[rstest]
    fn violations_accumulate_in_order() {
        let mut validator = Validator::new();
        validator
            .required("first_name", "", 100)
            .optional("phone", Some("012345678901234567890"), 20)
            .ensure(false, "content_type", "unsupported image type");
        let error = validator.finish().expect_err("invalid");
        assert_eq!(
            error.details(),
            [
                "first_name: must not be empty",
                "phone: must be at most 20 characters",
                "content_type: unsupported image type",
            ]
        );
        assert_eq!(error.message(), "validation failed");
    }
}

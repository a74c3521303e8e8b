//! Issue form validation.
//!
//! [`validate`] is pure: raw form fields in, either a [`CertificateRequest`]
//! or every rule that failed. Callers show only the first error.

use serde::{Deserialize, Serialize};

/// Longest accepted course name or organization, in characters.
pub const MAX_TEXT_LEN: usize = 100;

/// Largest accepted validity period.
pub const MAX_VALIDITY_DAYS: u32 = 10_000;

/// Validity period pre-filled on a fresh form.
pub const DEFAULT_VALIDITY_DAYS: &str = "365";

/// Raw, unvalidated issue form fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueForm {
    pub student_address: String,
    pub course_name: String,
    pub organization: String,
    pub validity_days: String,
}

impl Default for IssueForm {
    fn default() -> Self {
        Self {
            student_address: String::new(),
            course_name: String::new(),
            organization: String::new(),
            validity_days: DEFAULT_VALIDITY_DAYS.to_string(),
        }
    }
}

impl IssueForm {
    pub fn new(
        student_address: impl Into<String>,
        course_name: impl Into<String>,
        organization: impl Into<String>,
        validity_days: impl Into<String>,
    ) -> Self {
        Self {
            student_address: student_address.into(),
            course_name: course_name.into(),
            organization: organization.into(),
            validity_days: validity_days.into(),
        }
    }

    /// Restore the defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A request whose fields all passed validation.
///
/// Only [`validate`] constructs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRequest {
    student_address: String,
    course_name: String,
    organization: String,
    validity_days: u32,
}

impl CertificateRequest {
    /// Trimmed, not checked for address well-formedness.
    pub fn student_address(&self) -> &str {
        &self.student_address
    }

    pub fn course_name(&self) -> &str {
        &self.course_name
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Always within `1..=MAX_VALIDITY_DAYS`.
    pub fn validity_days(&self) -> u32 {
        self.validity_days
    }
}

/// A failed form rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Course name is required")]
    CourseNameRequired,

    #[error("Course name must be less than 100 characters")]
    CourseNameTooLong,

    #[error("Organization is required")]
    OrganizationRequired,

    #[error("Organization must be less than 100 characters")]
    OrganizationTooLong,

    /// Empty, non-numeric, zero or negative.
    #[error("Please enter a valid number of days (greater than 0)")]
    InvalidValidityDays,

    #[error("Validity days cannot exceed 10,000")]
    ValidityDaysTooLarge,
}

/// Validate raw form fields.
///
/// Rules are evaluated independently, in the order course name,
/// organization, validity days.
pub fn validate(form: &IssueForm) -> Result<CertificateRequest, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let course_name = check_text(
        &form.course_name,
        ValidationError::CourseNameRequired,
        ValidationError::CourseNameTooLong,
        &mut errors,
    );
    let organization = check_text(
        &form.organization,
        ValidationError::OrganizationRequired,
        ValidationError::OrganizationTooLong,
        &mut errors,
    );
    let validity_days = match parse_validity_days(&form.validity_days) {
        Ok(days) => Some(days),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    match (course_name, organization, validity_days) {
        (Some(course_name), Some(organization), Some(validity_days)) if errors.is_empty() => {
            Ok(CertificateRequest {
                student_address: form.student_address.trim().to_string(),
                course_name,
                organization,
                validity_days,
            })
        }
        _ => Err(errors),
    }
}

fn check_text(
    raw: &str,
    required: ValidationError,
    too_long: ValidationError,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.push(required);
        None
    } else if trimmed.chars().count() > MAX_TEXT_LEN {
        errors.push(too_long);
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Strict integer parse: ASCII digits only after trimming, no sign.
fn parse_validity_days(raw: &str) -> Result<u32, ValidationError> {
    let digits = raw.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidValidityDays);
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Err(ValidationError::InvalidValidityDays);
    }

    // Anything wider than five digits is past the cap; avoids overflow.
    if significant.len() > 5 {
        return Err(ValidationError::ValidityDaysTooLarge);
    }

    let days: u32 = significant
        .parse()
        .map_err(|_| ValidationError::InvalidValidityDays)?;
    if days > MAX_VALIDITY_DAYS {
        return Err(ValidationError::ValidityDaysTooLarge);
    }
    Ok(days)
}

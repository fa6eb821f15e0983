use crate::data::{
    course::Course,
    form::{FormErrors, FormField, FormValues},
};
use regex::Regex;
use std::sync::LazyLock;

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Please enter a valid email";
pub const COURSE_REQUIRED: &str = "Course selection is required";
pub const COURSE_UNAVAILABLE: &str = "Please select an available course";

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    });
    EMAIL.is_match(email)
}

/// Checks every field and returns the full set of failures.
pub fn validate(values: &FormValues) -> FormErrors {
    let mut errors = FormErrors::default();

    if values.name.trim().is_empty() {
        errors.set(FormField::Name, NAME_REQUIRED);
    }

    if values.email.trim().is_empty() {
        errors.set(FormField::Email, EMAIL_REQUIRED);
    } else if !is_valid_email(&values.email) {
        errors.set(FormField::Email, EMAIL_INVALID);
    }

    if values.course.is_empty() {
        errors.set(FormField::Course, COURSE_REQUIRED);
    }

    errors
}

/// [`validate`], plus a check that the selected course is one we actually have.
///
/// Hands back the resolved course when every field passes.
pub fn validate_against<'a>(
    values: &FormValues,
    courses: &'a [Course],
) -> Result<&'a Course, FormErrors> {
    let mut errors = validate(values);
    let course = Course::resolve(courses, &values.course);
    if errors.get(FormField::Course).is_none() && course.is_none() {
        errors.set(FormField::Course, COURSE_UNAVAILABLE);
    }

    match course {
        Some(course) if errors.is_empty() => Ok(course),
        _ => Err(errors),
    }
}

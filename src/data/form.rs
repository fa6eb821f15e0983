use crate::data::student::{Student, StudentId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Name,
    Email,
    Course,
}

/// The raw, editable values of a student form.
///
/// `course` holds the selected course id in its string form, empty when nothing is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValues {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub profile_image: String,
}

impl FormValues {
    pub fn from_student(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            email: student.email.clone(),
            course: student.course_id.to_string(),
            profile_image: student.profile_image.clone(),
        }
    }
}

/// Field → message. Rebuilt from scratch on every validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<FormField, &'static str>);

impl FormErrors {
    pub fn set(&mut self, field: FormField, message: &'static str) {
        self.0.insert(field, message);
    }

    pub fn get(&self, field: FormField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(StudentId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub mode: FormMode,
    pub values: FormValues,
    pub errors: FormErrors,
    /// Message from the last failed service call, cleared on the next submit.
    pub submit_error: Option<String>,
}

impl FormState {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            values: FormValues::default(),
            errors: FormErrors::default(),
            submit_error: None,
        }
    }

    pub fn edit(student: &Student) -> Self {
        Self {
            mode: FormMode::Edit(student.id),
            values: FormValues::from_student(student),
            errors: FormErrors::default(),
            submit_error: None,
        }
    }
}

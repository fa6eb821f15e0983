use crate::{
    data::course::CourseId,
    error::{MissingCourseSnafu, RosterResult},
};
use jiff::{Timestamp, Zoned, tz::TimeZone};
use serde::{Deserialize, Serialize};
use snafu::OptionExt;
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub i64);

impl Display for StudentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub course_id: CourseId,
    pub course: String,
    pub profile_image: String,
    pub enrolled_date: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A student payload that hasn't been given an id yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub course_id: Option<CourseId>,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub enrolled_date: String,
}

/// What `save_student` resolves with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedStudent {
    #[serde(flatten)]
    pub draft: StudentDraft,
    pub id: StudentId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// What `update_student` resolves with. There's no `createdAt` - the caller keeps its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedStudent {
    #[serde(flatten)]
    pub draft: StudentDraft,
    pub id: StudentId,
    pub updated_at: Timestamp,
}

impl Student {
    pub fn from_saved(saved: SavedStudent) -> RosterResult<Self> {
        let SavedStudent {
            draft,
            id,
            created_at,
            updated_at,
        } = saved;
        let course_id = draft.course_id.context(MissingCourseSnafu)?;

        Ok(Self {
            id,
            name: draft.name,
            email: draft.email,
            course_id,
            course: draft.course,
            profile_image: draft.profile_image.unwrap_or_default(),
            enrolled_date: draft.enrolled_date,
            created_at,
            updated_at,
        })
    }

    /// Replaces everything but `id` and `created_at` with the update's values.
    pub fn apply_update(&mut self, updated: UpdatedStudent) -> RosterResult<()> {
        let UpdatedStudent {
            draft,
            id: _,
            updated_at,
        } = updated;

        self.course_id = draft.course_id.context(MissingCourseSnafu)?;
        self.name = draft.name;
        self.email = draft.email;
        self.course = draft.course;
        if let Some(profile_image) = draft.profile_image {
            self.profile_image = profile_image;
        }
        if !draft.enrolled_date.is_empty() {
            self.enrolled_date = draft.enrolled_date;
        }
        self.updated_at = updated_at;

        Ok(())
    }
}

/// Today's date in the local timezone, formatted like `10/19/2026`.
pub fn enrolment_date_today() -> String {
    Zoned::now().strftime("%-m/%-d/%Y").to_string()
}

/// Human-readable date for the dashboard, e.g. `Oct 19, 2026`.
pub fn format_date(timestamp: Timestamp) -> String {
    format_date_in(timestamp, TimeZone::system())
}

pub fn format_date_in(timestamp: Timestamp, tz: TimeZone) -> String {
    timestamp.to_zoned(tz).strftime("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(course_id: Option<CourseId>) -> SavedStudent {
        let at: Timestamp = "2026-10-19T09:30:00Z".parse().unwrap();
        SavedStudent {
            draft: StudentDraft {
                name: "Ana".into(),
                email: "ana@x.com".into(),
                course_id,
                course: "CSS Mastery".into(),
                profile_image: None,
                enrolled_date: "10/19/2026".into(),
            },
            id: StudentId(1_760_866_200_000),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn from_saved_requires_a_course() {
        assert!(matches!(
            Student::from_saved(saved(None)),
            Err(crate::error::RosterError::MissingCourse)
        ));

        let student = Student::from_saved(saved(Some(CourseId(2)))).unwrap();
        assert_eq!(student.course_id, CourseId(2));
        assert_eq!(student.created_at, student.updated_at);
    }

    #[test]
    fn apply_update_keeps_identity_and_creation_time() {
        let mut student = Student::from_saved(saved(Some(CourseId(2)))).unwrap();
        let created_at = student.created_at;
        let later: Timestamp = "2026-10-20T10:00:00Z".parse().unwrap();

        student
            .apply_update(UpdatedStudent {
                draft: StudentDraft {
                    name: "Ana Lopez".into(),
                    email: "ana@y.com".into(),
                    course_id: Some(CourseId(5)),
                    course: "Node.js Backend".into(),
                    profile_image: Some("https://example.com/ana.png".into()),
                    enrolled_date: String::new(),
                },
                id: StudentId(42),
                updated_at: later,
            })
            .unwrap();

        assert_eq!(student.id, StudentId(1_760_866_200_000));
        assert_eq!(student.name, "Ana Lopez");
        assert_eq!(student.course_id, CourseId(5));
        assert_eq!(student.enrolled_date, "10/19/2026");
        assert_eq!(student.created_at, created_at);
        assert_eq!(student.updated_at, later);
    }

    #[test]
    fn json_uses_camel_case_and_iso_timestamps() {
        let student = Student::from_saved(saved(Some(CourseId(2)))).unwrap();
        let json = serde_json::to_value(&student).unwrap();

        assert_eq!(json["courseId"], 2);
        assert_eq!(json["enrolledDate"], "10/19/2026");
        assert_eq!(json["createdAt"], "2026-10-19T09:30:00Z");
        assert!(json.get("course_id").is_none());
    }

    #[test]
    fn format_date_is_short_month_day_year() {
        let at: Timestamp = "2026-10-09T09:30:00Z".parse().unwrap();
        assert_eq!(format_date_in(at, TimeZone::UTC), "Oct 9, 2026");
    }
}

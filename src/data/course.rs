use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub i64);

impl Display for CourseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
}

impl Course {
    fn new(id: i64, name: &str, description: &str, duration: &str) -> Self {
        Self {
            id: CourseId(id),
            name: name.to_string(),
            description: description.to_string(),
            duration: duration.to_string(),
        }
    }

    /// The full catalogue served by the mock service, in display order.
    pub fn catalogue() -> Vec<Self> {
        vec![
            Self::new(1, "HTML Basics", "Learn the fundamentals of HTML", "4 weeks"),
            Self::new(2, "CSS Mastery", "Master CSS styling and layouts", "6 weeks"),
            Self::new(3, "JavaScript Pro", "Advanced JavaScript concepts", "8 weeks"),
            Self::new(4, "React In Depth", "Build modern React applications", "10 weeks"),
            Self::new(5, "Node.js Backend", "Server-side JavaScript development", "8 weeks"),
            Self::new(6, "Database Design", "SQL and NoSQL database concepts", "6 weeks"),
            Self::new(7, "Full Stack Project", "Complete full-stack application", "12 weeks"),
        ]
    }

    /// What the dashboard shows when the catalogue can't be fetched.
    pub fn fallback() -> Vec<Self> {
        let mut courses = Self::catalogue();
        courses.truncate(4);
        courses
    }

    /// Looks up the course a form's `course` value points at.
    ///
    /// Form values carry the id in its decimal string form, so anything that doesn't parse or isn't
    /// in `courses` is `None`.
    pub fn resolve<'a>(courses: &'a [Self], form_value: &str) -> Option<&'a Self> {
        let id = form_value.trim().parse().ok().map(CourseId)?;
        courses.iter().find(|course| course.id == id)
    }
}

use crate::data::student::StudentId;
use serde::Deserialize;

pub mod course;
pub mod form;
pub mod student;

#[derive(Deserialize)]
pub struct IdForm {
    pub id: StudentId,
}

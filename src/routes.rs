pub mod dashboard;
pub mod index;
pub mod students;

//! Domain aggregates exposed by the student records service layer.

pub mod student;
pub mod types;
pub mod user;

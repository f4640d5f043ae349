//! DTO modules that bridge services with the rendering layer and the API.

pub mod api;
pub mod dashboard;
pub mod students;

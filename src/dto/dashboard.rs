use serde::Serialize;

use crate::domain::student::Student;

/// Data required to render the dashboard.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardData {
    pub total_students: usize,
    pub total_courses: usize,
    pub total_cities: usize,
    /// Newest records first.
    pub recent_students: Vec<Student>,
}

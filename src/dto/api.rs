//! Wire shapes exchanged with the REST backend.

use serde::{Deserialize, Serialize};

use crate::domain::student::Student;
use crate::domain::types::UserId;
use crate::repository::ListResult;

/// Body of `GET /students`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentListResponse {
    pub students: Vec<Student>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl From<StudentListResponse> for ListResult<Student> {
    fn from(response: StudentListResponse) -> Self {
        ListResult {
            items: response.students,
            total: response.total,
            page: response.page,
            page_size: response.page_size,
            // Older backends report zero pages for an empty set.
            total_pages: response.total_pages.max(1),
        }
    }
}

/// Body of `GET /auth/verify`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenVerification {
    pub valid: bool,
    pub user_id: UserId,
    pub email: String,
    pub name: String,
}

/// Acknowledgement returned by destructive endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Error body. `detail` is a string for handled errors and a list of
/// field errors for request validation failures.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub detail: serde_json::Value,
}

impl ApiErrorBody {
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            serde_json::Value::String(detail) => Some(detail.clone()),
            serde_json::Value::Array(errors) => errors
                .iter()
                .filter_map(|e| e.get("msg").and_then(|m| m.as_str()))
                .next()
                .map(str::to_string),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_reads_string_detail() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"detail": "Student not found"}"#).unwrap();
        assert_eq!(body.message().as_deref(), Some("Student not found"));
    }

    #[test]
    fn error_body_reads_first_validation_message() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"detail": [{"loc": ["body", "age"], "msg": "Input should be greater than or equal to 1"}]}"#,
        )
        .unwrap();
        assert_eq!(
            body.message().as_deref(),
            Some("Input should be greater than or equal to 1")
        );
    }

    #[test]
    fn list_response_parses_backend_payload() {
        let json = r#"{
            "students": [{
                "id": 3, "name": "Ada", "email": "ada@example.com", "age": 30,
                "course": "Maths", "city": "London", "created_by": 1,
                "created_at": "2024-05-01T10:00:00", "updated_at": "2024-05-02T11:30:00.125"
            }],
            "total": 1, "page": 1, "page_size": 9, "total_pages": 1
        }"#;

        let response: StudentListResponse = serde_json::from_str(json).unwrap();
        let result = ListResult::from(response);

        assert_eq!(result.items[0].name, "Ada");
        assert_eq!(result.total_pages, 1);
    }
}

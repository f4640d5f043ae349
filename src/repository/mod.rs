use async_trait::async_trait;
use serde::Serialize;

use crate::{
    domain::{
        student::{NewStudent, SortField, SortOrder, Student, UpdateStudent},
        types::StudentId,
        user::{AccessToken, Credentials, NewUser, User},
    },
    dto::api::TokenVerification,
    repository::errors::RepositoryResult,
};

pub mod errors;
#[cfg(feature = "client")]
pub mod http;
pub mod memory;
#[cfg(feature = "test-mocks")]
pub mod mock;

#[cfg(feature = "client")]
pub use http::HttpRepository;
pub use memory::InMemoryRepository;

/// Number of students shown per page in the list view.
pub const DEFAULT_PAGE_SIZE: usize = 9;

/// Normalized parameters describing one page request.
///
/// Serializes to the query string understood by `GET /students`; absent
/// filters are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    pub page: usize,
    pub page_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Trims a filter value, mapping blank input to "no filter".
pub fn normalize_filter(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl ListQuery {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            search: None,
            course: None,
            city: None,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }

    pub fn search(mut self, search: impl AsRef<str>) -> Self {
        self.search = normalize_filter(Some(search.as_ref()));
        self
    }

    pub fn course(mut self, course: impl AsRef<str>) -> Self {
        self.course = normalize_filter(Some(course.as_ref()));
        self
    }

    pub fn city(mut self, city: impl AsRef<str>) -> Self {
        self.city = normalize_filter(Some(city.as_ref()));
        self
    }

    pub fn sort(mut self, sort_by: SortField, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    pub fn paginate(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Whether any of search, course or city narrows the result set.
    pub fn has_filters(&self) -> bool {
        self.search.is_some() || self.course.is_some() || self.city.is_some()
    }

    /// Zero-based offset of the first record on the requested page. Pages
    /// beyond `usize` saturate and read as past the end.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// `ceil(total / page_size)`, never less than one.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// One page of records plus pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<T> ListResult<T> {
    pub fn new(items: Vec<T>, total: usize, page: usize, page_size: usize) -> Self {
        Self {
            items,
            total,
            page,
            page_size,
            total_pages: total_pages(total, page_size),
        }
    }
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self::new(Vec::new(), 0, 1, DEFAULT_PAGE_SIZE)
    }
}

/// Read access to student records. Implementations must tolerate
/// overlapping calls.
#[async_trait]
pub trait StudentReader: Send + Sync {
    async fn list_students(&self, query: &ListQuery) -> RepositoryResult<ListResult<Student>>;
    async fn list_all_students(&self) -> RepositoryResult<Vec<Student>>;
    async fn get_student_by_id(&self, id: StudentId) -> RepositoryResult<Option<Student>>;
    async fn list_courses(&self) -> RepositoryResult<Vec<String>>;
    async fn list_cities(&self) -> RepositoryResult<Vec<String>>;
}

#[async_trait]
pub trait StudentWriter: Send + Sync {
    async fn create_student(&self, new_student: &NewStudent) -> RepositoryResult<Student>;
    async fn update_student(
        &self,
        id: StudentId,
        updates: &UpdateStudent,
    ) -> RepositoryResult<Student>;
    async fn delete_student(&self, id: StudentId) -> RepositoryResult<()>;
}

/// Account and session operations.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> RepositoryResult<AccessToken>;
    async fn register(&self, new_user: &NewUser) -> RepositoryResult<User>;
    async fn current_user(&self) -> RepositoryResult<User>;
    async fn verify_token(&self) -> RepositoryResult<TokenVerification>;
    /// Installs or clears the token attached to subsequent requests.
    fn set_token(&self, token: Option<AccessToken>);
    fn token(&self) -> Option<AccessToken>;
}

//! Mock repository implementations for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;

use crate::domain::student::{NewStudent, Student, UpdateStudent};
use crate::domain::types::StudentId;
use crate::domain::user::{AccessToken, Credentials, NewUser, User};
use crate::dto::api::TokenVerification;
use crate::repository::errors::RepositoryResult;
use crate::repository::{AuthProvider, ListQuery, ListResult, StudentReader, StudentWriter};

mock! {
    pub Repository {}

    #[async_trait]
    impl StudentReader for Repository {
        async fn list_students(&self, query: &ListQuery) -> RepositoryResult<ListResult<Student>>;
        async fn list_all_students(&self) -> RepositoryResult<Vec<Student>>;
        async fn get_student_by_id(&self, id: StudentId) -> RepositoryResult<Option<Student>>;
        async fn list_courses(&self) -> RepositoryResult<Vec<String>>;
        async fn list_cities(&self) -> RepositoryResult<Vec<String>>;
    }

    #[async_trait]
    impl StudentWriter for Repository {
        async fn create_student(&self, new_student: &NewStudent) -> RepositoryResult<Student>;
        async fn update_student(
            &self,
            id: StudentId,
            updates: &UpdateStudent,
        ) -> RepositoryResult<Student>;
        async fn delete_student(&self, id: StudentId) -> RepositoryResult<()>;
    }

    #[async_trait]
    impl AuthProvider for Repository {
        async fn login(&self, credentials: &Credentials) -> RepositoryResult<AccessToken>;
        async fn register(&self, new_user: &NewUser) -> RepositoryResult<User>;
        async fn current_user(&self) -> RepositoryResult<User>;
        async fn verify_token(&self) -> RepositoryResult<TokenVerification>;
        fn set_token(&self, token: Option<AccessToken>);
        fn token(&self) -> Option<AccessToken>;
    }
}
